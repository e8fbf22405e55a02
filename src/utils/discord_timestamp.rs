use std::fmt::Display;

use time::OffsetDateTime;

/// Discord renders `<t:unix:style>` in the reader's own time zone.
#[derive(Clone, Copy, Debug)]
pub enum TimestampStyle {
    /// `16:20`
    ShortTime,
    /// `20 April 2021 16:20`
    ShortDateTime,
    /// `in 5 minutes`, `2 months ago`; keeps counting on the client.
    RelativeTime,
}

impl Display for TimestampStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

impl TimestampStyle {
    pub fn suffix(&self) -> &'static str {
        use TimestampStyle::*;

        match self {
            ShortTime => "t",
            ShortDateTime => "f",
            RelativeTime => "R",
        }
    }
}

pub fn timestamp(datetime: OffsetDateTime, style: TimestampStyle) -> String {
    let unix_timestamp = datetime.unix_timestamp();
    format!("<t:{unix_timestamp}:{style}>")
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::{timestamp, TimestampStyle};

    #[test]
    fn formats_markup() {
        let datetime = datetime!(2021-04-20 16:20 UTC);

        assert_eq!(
            timestamp(datetime, TimestampStyle::RelativeTime),
            "<t:1618935600:R>"
        );
        assert_eq!(
            timestamp(datetime, TimestampStyle::ShortDateTime),
            "<t:1618935600:f>"
        );
    }
}
