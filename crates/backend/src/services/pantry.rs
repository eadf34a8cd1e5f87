//! Add, delete, list and watch flows for the signed-in user's pantry.

use chrono::{DateTime, TimeZone};
use smart_pantry_core::{
    CategoryFilter, ItemForm, ListEntry, OwnerId, PantryList, PantryRecord, RecordId,
    ValidationError,
};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::auth::AuthProvider;
use crate::store::{RecordStore, Snapshot, StoreError, Subscription};

/// Errors that can occur in pantry flows.
#[derive(Debug, Error)]
pub enum PantryError {
    #[error("not signed in")]
    NotSignedIn,

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The signed-in user has no record with this ID.
    #[error("no pantry item with id {0}")]
    NotFound(RecordId),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Pantry flows scoped to the signed-in user.
pub struct PantryService<'a, A, S> {
    auth: &'a A,
    store: &'a S,
}

impl<'a, A: AuthProvider, S: RecordStore> PantryService<'a, A, S> {
    #[must_use]
    pub const fn new(auth: &'a A, store: &'a S) -> Self {
        Self { auth, store }
    }

    async fn owner(&self) -> Result<OwnerId, PantryError> {
        self.auth
            .current_user()
            .await
            .map(|user| user.id)
            .ok_or(PantryError::NotSignedIn)
    }

    /// Validate the form and persist it as a record owned by the signed-in
    /// user.
    ///
    /// # Errors
    ///
    /// Returns `PantryError::NotSignedIn` without a session,
    /// `PantryError::Validation` for a blank name or date, or
    /// `PantryError::Store` if the write fails.
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn add_item(&self, form: ItemForm) -> Result<PantryRecord, PantryError> {
        let owner = self.owner().await?;
        let record = form.into_record(owner)?;

        let id = self.store.create(&record).await.map_err(|e| {
            error!(error = %e, "Failed to add pantry item");
            e
        })?;

        info!(id = %id, "Pantry item added");
        Ok(record.with_id(id))
    }

    /// Delete one of the signed-in user's records.
    ///
    /// # Errors
    ///
    /// Returns `PantryError::NotSignedIn` without a session,
    /// `PantryError::NotFound` if the ID is not one of the user's records, or
    /// `PantryError::Store` if the delete fails.
    #[instrument(skip(self, id), fields(id = %id))]
    pub async fn delete_item(&self, id: &RecordId) -> Result<(), PantryError> {
        let owner = self.owner().await?;
        let owned = self.store.fetch(&owner).await?;
        if !owned.iter().any(|record| &record.id == id) {
            warn!("Refusing to delete a record the user does not own");
            return Err(PantryError::NotFound(id.clone()));
        }

        self.store.delete(id).await.map_err(|e| {
            error!(error = %e, "Failed to delete pantry item");
            e
        })?;

        info!("Pantry item deleted");
        Ok(())
    }

    /// Subscribe to the signed-in user's records.
    ///
    /// # Errors
    ///
    /// Returns `PantryError::NotSignedIn` without a session.
    pub async fn watch(&self) -> Result<Subscription, PantryError> {
        let owner = self.owner().await?;
        Ok(self.store.subscribe(&owner))
    }

    /// The signed-in user's records, read once and unranked.
    ///
    /// # Errors
    ///
    /// Returns `PantryError::NotSignedIn` without a session, or
    /// `PantryError::Store` if the read fails.
    pub async fn records(&self) -> Result<Snapshot, PantryError> {
        let owner = self.owner().await?;
        Ok(self.store.fetch(&owner).await?)
    }

    /// The signed-in user's records as ranked display rows.
    ///
    /// # Errors
    ///
    /// Same as [`Self::records`].
    pub async fn list<Tz: TimeZone>(
        &self,
        query: &str,
        filter: CategoryFilter,
        now: &DateTime<Tz>,
    ) -> Result<Vec<ListEntry>, PantryError> {
        let snapshot = self.records().await?;

        let mut list = PantryList::new();
        list.apply_snapshot(snapshot);
        list.set_query(query);
        list.set_category(filter);
        Ok(list.entries(now))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;
    use smart_pantry_core::{Category, Email, ExpiryDate, ExpiryStatus, NewPantryRecord};

    use super::*;
    use crate::memory::{MemoryAuth, MemoryRecordStore};

    async fn signed_in() -> MemoryAuth {
        let auth = MemoryAuth::new();
        auth.sign_up(&Email::parse("cook@example.com").unwrap(), "Kiler1!")
            .await
            .unwrap();
        auth
    }

    fn form(name: &str, date: &str, category: Category) -> ItemForm {
        ItemForm {
            name: name.to_string(),
            expiry_date: ExpiryDate::new(date),
            category,
        }
    }

    #[tokio::test]
    async fn test_add_requires_session() {
        let auth = MemoryAuth::new();
        let store = MemoryRecordStore::new();
        let pantry = PantryService::new(&auth, &store);

        assert!(matches!(
            pantry.add_item(form("Milk", "1/7/2025", Category::Dairy)).await,
            Err(PantryError::NotSignedIn)
        ));
        assert!(store.all().is_empty());
    }

    #[tokio::test]
    async fn test_add_stamps_owner() {
        let auth = signed_in().await;
        let store = MemoryRecordStore::new();
        let pantry = PantryService::new(&auth, &store);

        let record = pantry
            .add_item(form("Milk", "1/7/2025", Category::Dairy))
            .await
            .unwrap();
        let owner = auth.current_user().await.unwrap().id;
        assert_eq!(record.owner_id, owner);
        assert_eq!(store.all(), vec![record]);
    }

    #[tokio::test]
    async fn test_add_rejects_blank_name() {
        let auth = signed_in().await;
        let store = MemoryRecordStore::new();
        assert!(matches!(
            PantryService::new(&auth, &store)
                .add_item(form(" ", "1/7/2025", Category::Dairy))
                .await,
            Err(PantryError::Validation(ValidationError::Blank("name")))
        ));
    }

    #[tokio::test]
    async fn test_store_failures_are_returned() {
        let auth = signed_in().await;
        let store = MemoryRecordStore::new();
        let pantry = PantryService::new(&auth, &store);
        store.fail_writes(true);

        assert!(matches!(
            pantry.add_item(form("Milk", "1/7/2025", Category::Dairy)).await,
            Err(PantryError::Store(StoreError::Api { .. }))
        ));

        store.fail_writes(false);
        let milk = pantry
            .add_item(form("Milk", "1/7/2025", Category::Dairy))
            .await
            .unwrap();
        store.fail_writes(true);
        assert!(matches!(
            pantry.delete_item(&milk.id).await,
            Err(PantryError::Store(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let auth = signed_in().await;
        let store = MemoryRecordStore::new();
        let pantry = PantryService::new(&auth, &store);

        assert!(matches!(
            pantry.delete_item(&RecordId::new("ghost")).await,
            Err(PantryError::NotFound(ref id)) if id.as_str() == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_delete_of_foreign_record_is_refused() {
        let auth = signed_in().await;
        let store = MemoryRecordStore::new();
        let foreign = NewPantryRecord {
            name: "Kefir".to_string(),
            expiry_date: ExpiryDate::new("18/6/2025"),
            category: Category::Dairy,
            owner_id: OwnerId::new("someone-else"),
        }
        .with_id(RecordId::new("kefir-1"));
        store.seed(foreign.clone());

        assert!(matches!(
            PantryService::new(&auth, &store)
                .delete_item(&foreign.id)
                .await,
            Err(PantryError::NotFound(_))
        ));
        assert_eq!(store.all(), vec![foreign]);
    }

    #[tokio::test]
    async fn test_list_is_ranked_and_filtered() {
        let auth = signed_in().await;
        let store = MemoryRecordStore::new();
        let pantry = PantryService::new(&auth, &store);
        let now = Utc.with_ymd_and_hms(2025, 6, 14, 12, 0, 0).unwrap();

        pantry
            .add_item(form("Yogurt", "20/6/2025", Category::Dairy))
            .await
            .unwrap();
        pantry
            .add_item(form("Milk", "14/6/2025", Category::Dairy))
            .await
            .unwrap();
        pantry
            .add_item(form("Apples", "16/6/2025", Category::Fruit))
            .await
            .unwrap();

        let all = pantry.list("", CategoryFilter::All, &now).await.unwrap();
        let names: Vec<_> = all.iter().map(|e| e.record.name.as_str()).collect();
        assert_eq!(names, ["Milk", "Apples", "Yogurt"]);
        assert_eq!(all[0].status, ExpiryStatus::DueToday);

        let dairy = pantry
            .list("YOG", CategoryFilter::Only(Category::Dairy), &now)
            .await
            .unwrap();
        assert_eq!(dairy.len(), 1);
        assert_eq!(dairy[0].days_left, 6);
    }

    #[tokio::test]
    async fn test_records_are_the_unfiltered_snapshot() {
        let auth = signed_in().await;
        let store = MemoryRecordStore::new();
        let pantry = PantryService::new(&auth, &store);
        assert!(pantry.records().await.unwrap().is_empty());

        let milk = pantry
            .add_item(form("Milk", "1/7/2025", Category::Dairy))
            .await
            .unwrap();
        assert_eq!(&*pantry.records().await.unwrap(), [milk].as_slice());
    }

    #[tokio::test]
    async fn test_watch_sees_adds_and_deletes() {
        let auth = signed_in().await;
        let store = MemoryRecordStore::new();
        let pantry = PantryService::new(&auth, &store);

        let mut subscription = pantry.watch().await.unwrap();
        assert!(subscription.next().await.unwrap().is_empty());

        let record = pantry
            .add_item(form("Milk", "1/7/2025", Category::Dairy))
            .await
            .unwrap();
        assert_eq!(subscription.next().await.unwrap()[0], record);

        pantry.delete_item(&record.id).await.unwrap();
        assert!(subscription.next().await.unwrap().is_empty());
        subscription.unsubscribe();
    }
}
