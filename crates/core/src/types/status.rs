//! Expiry classification of a day count.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Items expiring within this many days are flagged as [`Urgency::Soon`].
pub const SOON_THRESHOLD_DAYS: i64 = 3;

/// Human-facing classification of a days-until-expiry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "days", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpiryStatus {
    /// Past due.
    Expired,
    /// Expires today.
    DueToday,
    /// Expires in the given (positive) number of days.
    DueInNDays(i64),
}

impl ExpiryStatus {
    #[must_use]
    pub const fn from_days(days: i64) -> Self {
        if days < 0 {
            Self::Expired
        } else if days == 0 {
            Self::DueToday
        } else {
            Self::DueInNDays(days)
        }
    }
}

impl fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => f.pad("expired"),
            Self::DueToday => f.pad("expires today"),
            Self::DueInNDays(1) => f.pad("1 day left"),
            Self::DueInNDays(days) => f.pad(&format!("{days} days left")),
        }
    }
}

/// Classify a day count. Equivalent to [`ExpiryStatus::from_days`].
#[must_use]
pub const fn status_label(days: i64) -> ExpiryStatus {
    ExpiryStatus::from_days(days)
}

/// How prominently an item should be highlighted in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Expired,
    Soon,
    Fresh,
}

/// Urgency of a day count: expired below zero, soon up to
/// [`SOON_THRESHOLD_DAYS`], fresh beyond.
#[must_use]
pub const fn urgency(days: i64) -> Urgency {
    if days < 0 {
        Urgency::Expired
    } else if days <= SOON_THRESHOLD_DAYS {
        Urgency::Soon
    } else {
        Urgency::Fresh
    }
}
