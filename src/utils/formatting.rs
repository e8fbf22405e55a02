use time::macros::format_description;
use time::{format_description, OffsetDateTime, UtcOffset};

use super::{timestamp, TimestampStyle};

const DATETIME_FORMAT: &[format_description::FormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

pub fn format_utc(date_time: impl Into<OffsetDateTime>) -> String {
    let offset_date_time: OffsetDateTime = date_time.into();
    offset_date_time
        .to_offset(UtcOffset::UTC)
        .format(DATETIME_FORMAT)
        .expect("Hard-coded format should be correct")
}

pub fn format_local(date_time: impl Into<OffsetDateTime>) -> String {
    timestamp(date_time.into(), TimestampStyle::ShortDateTime)
}

/// A countdown that Discord keeps updating, e.g. `in 4 minutes (16:25)`.
pub fn format_countdown(unlock_at: OffsetDateTime) -> String {
    format!(
        "{} ({})",
        timestamp(unlock_at, TimestampStyle::RelativeTime),
        timestamp(unlock_at, TimestampStyle::ShortTime)
    )
}

/// Cuts `text` to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}
