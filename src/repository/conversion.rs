use poise::serenity_prelude::UserId;
use thiserror::Error;
use time::{format_description::well_known::Iso8601, OffsetDateTime};

use crate::models::{types::UtcDateTime, IntentionId, ShortCode};

pub trait DBConvertible: Sized {
    type DBType;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError>;

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError>;
}

#[derive(Debug, Error)]
pub enum DBFromConversionError {
    #[error("Failed to parse datetime: {0}")]
    DateTime(#[from] time::error::Parse),
    #[error("Invalid number: {0}")]
    InvalidNumber(i64),
    #[error("Invalid intention code: {0}")]
    InvalidCode(String),
}

#[derive(Debug, Error)]
pub enum DBToConversionError {
    #[error("Failed to format datetime")]
    DateTime(#[from] time::error::Format),
    #[error("Number does not fit into the database: {0}")]
    NumberOutOfRange(u64),
}

fn to_db_id(value: u64) -> Result<i64, DBToConversionError> {
    i64::try_from(value).map_err(|_| DBToConversionError::NumberOutOfRange(value))
}

fn from_db_id(value: i64) -> Result<u64, DBFromConversionError> {
    u64::try_from(value).map_err(|_| DBFromConversionError::InvalidNumber(value))
}

impl DBConvertible for UtcDateTime {
    type DBType = String;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        let string = OffsetDateTime::from(*self).format(&Iso8601::DEFAULT)?;
        Ok(string)
    }

    fn from_db(db_value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        let datetime = OffsetDateTime::parse(db_value, &Iso8601::DEFAULT)?;
        Ok(UtcDateTime::from(datetime))
    }
}

impl DBConvertible for IntentionId {
    type DBType = i64;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        to_db_id(self.0)
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(IntentionId(from_db_id(*value)?))
    }
}

impl DBConvertible for UserId {
    type DBType = i64;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        to_db_id(self.get())
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        match from_db_id(*value)? {
            0 => Err(DBFromConversionError::InvalidNumber(*value)),
            id => Ok(UserId::new(id)),
        }
    }
}

impl DBConvertible for ShortCode {
    type DBType = String;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(self.as_ref().to_string())
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        value
            .parse()
            .map_err(|_| DBFromConversionError::InvalidCode(value.clone()))
    }
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude::UserId;
    use time::macros::datetime;

    use super::DBConvertible;
    use crate::models::{types::UtcDateTime, IntentionId, ShortCode};

    #[test]
    fn datetime_survives_the_database() {
        let datetime = UtcDateTime::from(datetime!(2020-04-20 16:20:30.5 UTC));

        let stored = datetime.to_db().unwrap();

        assert_eq!(UtcDateTime::from_db(&stored).unwrap(), datetime);
    }

    #[test]
    fn rejects_negative_ids() {
        assert!(IntentionId::from_db(&-1).is_err());
        assert!(UserId::from_db(&0).is_err());
        assert!(IntentionId::to_db(&IntentionId(u64::MAX)).is_err());
    }

    #[test]
    fn rejects_corrupted_codes() {
        assert!(ShortCode::from_db(&"no way".to_string()).is_err());
    }
}
