//! Pantry records.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::{Category, ExpiryDate, ExpiryStatus, OwnerId, RecordId};

/// A record that has not been persisted yet and so has no ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPantryRecord {
    pub name: String,
    pub expiry_date: ExpiryDate,
    pub category: Category,
    #[serde(rename = "userId")]
    pub owner_id: OwnerId,
}

impl NewPantryRecord {
    /// Attach the ID the record store assigned.
    #[must_use]
    pub fn with_id(self, id: RecordId) -> PantryRecord {
        PantryRecord {
            id,
            name: self.name,
            expiry_date: self.expiry_date,
            category: self.category,
            owner_id: self.owner_id,
        }
    }
}

/// A persisted pantry item.
///
/// Records are never edited in place: the only mutations are create and
/// delete. Duplicate names are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PantryRecord {
    pub id: RecordId,
    pub name: String,
    pub expiry_date: ExpiryDate,
    pub category: Category,
    #[serde(rename = "userId")]
    pub owner_id: OwnerId,
}

impl PantryRecord {
    #[must_use]
    pub fn days_until<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> i64 {
        self.expiry_date.days_until(now)
    }

    #[must_use]
    pub fn status<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> ExpiryStatus {
        ExpiryStatus::from_days(self.days_until(now))
    }

    /// Whether this record belongs to `owner`.
    #[must_use]
    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        &self.owner_id == owner
    }
}
