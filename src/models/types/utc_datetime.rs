use std::ops::Add;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct UtcDateTime(PrimitiveDateTime);

impl UtcDateTime {
    pub fn now() -> UtcDateTime {
        UtcDateTime::from(OffsetDateTime::now_utc())
    }
}

impl From<OffsetDateTime> for UtcDateTime {
    fn from(value: OffsetDateTime) -> Self {
        let value_utc = value.to_offset(UtcOffset::UTC);
        UtcDateTime(PrimitiveDateTime::new(value_utc.date(), value_utc.time()))
    }
}

impl From<UtcDateTime> for OffsetDateTime {
    fn from(value: UtcDateTime) -> Self {
        value.0.assume_utc()
    }
}

impl Add<Duration> for UtcDateTime {
    type Output = UtcDateTime;

    fn add(self, rhs: Duration) -> Self::Output {
        UtcDateTime(self.0 + rhs)
    }
}

#[cfg(test)]
mod tests {
    use time::{macros::datetime, Duration, OffsetDateTime};

    use super::UtcDateTime;

    #[test]
    fn converts_offsets_to_utc() {
        let local = datetime!(2020-05-01 12:00 +03:00);
        let utc = OffsetDateTime::from(UtcDateTime::from(local));

        assert_eq!(utc, datetime!(2020-05-01 09:00 UTC));
    }

    #[test]
    fn adds_durations() {
        let start = UtcDateTime::from(datetime!(2020-05-01 23:58 UTC));

        assert_eq!(
            OffsetDateTime::from(start + Duration::minutes(5)),
            datetime!(2020-05-02 00:03 UTC)
        );
    }
}
