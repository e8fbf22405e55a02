mod trimmed_string;

pub use trimmed_string::TrimmedString;
