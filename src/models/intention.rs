use poise::serenity_prelude::UserId;

use super::{types::UtcDateTime, Location, ShortCode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntentionId(pub u64);

/// An anonymous prayer request.
#[derive(Clone, Debug, PartialEq)]
pub struct Intention {
    pub id: IntentionId,
    pub code: ShortCode,
    pub content: String,
    pub created_at: UtcDateTime,
    pub ip: String,
    pub location: Location,
    pub prayers: Vec<Prayer>,
    pub comments: Vec<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewIntention {
    pub code: ShortCode,
    pub content: String,
    pub created_at: UtcDateTime,
    pub ip: String,
    pub location: Location,
    pub prayers: Vec<Prayer>,
    pub comments: Vec<Comment>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prayer {
    pub intercessor: UserId,
    pub prayed_at: UtcDateTime,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub author: UserId,
    pub content: String,
    pub created_at: UtcDateTime,
}
