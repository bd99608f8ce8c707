//! # Business Time
//!
//! Instants are persisted as UTC and the salon's timezone is applied only
//! when a calendar day or a display string is needed.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Stored:    2025-06-01T16:00:00Z                  (UTC, RFC3339)        │
//! │                    │                                                    │
//! │                    ▼  business offset (UTC−06:00)                       │
//! │  Displayed: 01/06/2025 10:00                                           │
//! │  Day key:   2025-06-01                            (order listing)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Guatemala has no daylight saving time, so a fixed offset is exact.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Offset, Utc};

/// Offset of America/Guatemala in minutes east of UTC.
pub const GUATEMALA_UTC_OFFSET_MINUTES: i32 = -360;

/// Returns the business offset for `minutes` east of UTC.
///
/// Falls back to UTC−06:00 when `minutes` is outside the valid range.
pub fn business_offset(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .or_else(|| FixedOffset::east_opt(GUATEMALA_UTC_OFFSET_MINUTES * 60))
        .unwrap_or_else(|| Utc.fix())
}

/// Calendar day at the salon for the given instant.
pub fn business_today(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// The day before [`business_today`].
pub fn business_yesterday(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    let today = business_today(now, offset);
    today.pred_opt().unwrap_or(today)
}

/// The seven days (Monday first) of the week containing `date`.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use salon_core::time::week_dates;
///
/// // 2025-06-01 is a Sunday
/// let week = week_dates(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
/// assert_eq!(week[0], NaiveDate::from_ymd_opt(2025, 5, 26).unwrap());
/// assert_eq!(week[6], NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
/// ```
pub fn week_dates(date: NaiveDate) -> Vec<NaiveDate> {
    let back = u64::from(date.weekday().num_days_from_monday());
    let monday = date.checked_sub_days(Days::new(back)).unwrap_or(date);
    monday.iter_days().take(7).collect()
}

/// Renders an instant as `DD/MM/YYYY HH:MM` in the business timezone.
pub fn format_local(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant
        .with_timezone(&offset)
        .format("%d/%m/%Y %H:%M")
        .to_string()
}

/// Renders a calendar day as `DD/MM/YYYY`.
pub fn format_date_display(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
