mod intention;
mod language;
mod location;
mod short_code;

pub mod types;

pub use intention::{Comment, Intention, IntentionId, NewIntention, Prayer};
pub use language::Language;
pub use location::Location;
pub use short_code::ShortCode;
