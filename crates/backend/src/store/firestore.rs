//! Cloud Firestore record store.
//!
//! Writes go straight to the documents REST API. Subscriptions poll a
//! structured query on the owner field and emit a snapshot whenever the
//! result set differs from the previous one.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use smart_pantry_core::{NewPantryRecord, OwnerId, PantryRecord, RecordId};
use tokio::time::MissedTickBehavior;
use tracing::{debug, instrument, warn};

use super::documents::{self, Document, RunQueryItem};
use super::{RecordStore, Snapshot, SnapshotDedupe, StoreError, Subscription};
use crate::config::BackendConfig;
use crate::session::SessionHandle;

// =============================================================================
// FirestoreStore
// =============================================================================

/// [`RecordStore`] backed by Cloud Firestore.
///
/// Requests authenticate with the ID token of the shared session, so the
/// project's security rules see the signed-in user.
#[derive(Clone)]
pub struct FirestoreStore {
    inner: Arc<FirestoreStoreInner>,
}

struct FirestoreStoreInner {
    client: reqwest::Client,
    documents_url: String,
    collection: String,
    poll_interval: Duration,
    session: SessionHandle,
}

impl FirestoreStore {
    /// Create a store for the configured project and collection.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig, session: SessionHandle) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            inner: Arc::new(FirestoreStoreInner {
                client,
                documents_url: config.firebase.documents_url(),
                collection: config.collection.clone(),
                poll_interval: config.poll_interval,
                session,
            }),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.inner.documents_url, self.inner.collection)
    }

    fn document_url(&self, id: &RecordId) -> String {
        format!(
            "{}/{}",
            self.collection_url(),
            urlencoding::encode(id.as_str())
        )
    }

    async fn bearer(&self) -> Result<SecretString, StoreError> {
        self.inner
            .session
            .id_token()
            .await
            .ok_or(StoreError::Unauthenticated)
    }

    /// Read the body of `response`, failing on a non-success status.
    async fn body(response: reqwest::Response) -> Result<String, StoreError> {
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            Ok(text)
        } else {
            Err(documents::api_error(status.as_u16(), &text))
        }
    }

    #[instrument(skip(self, owner), fields(owner = %owner))]
    async fn run_query(&self, owner: &OwnerId) -> Result<Vec<PantryRecord>, StoreError> {
        let token = self.bearer().await?;
        let url = format!("{}:runQuery", self.inner.documents_url);
        let query = documents::owner_query(&self.inner.collection, owner);

        let response = self
            .inner
            .client
            .post(&url)
            .bearer_auth(token.expose_secret())
            .json(&query)
            .send()
            .await?;
        let text = Self::body(response).await?;

        let items: Vec<RunQueryItem> =
            serde_json::from_str(&text).map_err(|e| StoreError::Parse(e.to_string()))?;
        let records = documents::decode_query(items);
        debug!(count = records.len(), "Pantry query");
        Ok(records)
    }
}

impl RecordStore for FirestoreStore {
    #[instrument(skip(self, record), fields(name = %record.name))]
    async fn create(&self, record: &NewPantryRecord) -> Result<RecordId, StoreError> {
        let token = self.bearer().await?;
        let response = self
            .inner
            .client
            .post(self.collection_url())
            .bearer_auth(token.expose_secret())
            .json(&documents::encode(record))
            .send()
            .await?;
        let text = Self::body(response).await?;

        let created: Document =
            serde_json::from_str(&text).map_err(|e| StoreError::Parse(e.to_string()))?;
        let name = created
            .name
            .ok_or_else(|| StoreError::Parse("created document has no name".to_string()))?;
        let id = documents::document_id(&name)
            .ok_or_else(|| StoreError::Parse(format!("malformed document name: {name}")))?;

        debug!(id, "Record created");
        Ok(RecordId::new(id))
    }

    #[instrument(skip(self, id), fields(id = %id))]
    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        let token = self.bearer().await?;
        let response = self
            .inner
            .client
            .delete(self.document_url(id))
            .bearer_auth(token.expose_secret())
            .send()
            .await?;
        Self::body(response).await?;

        debug!("Record deleted");
        Ok(())
    }

    async fn fetch(&self, owner: &OwnerId) -> Result<Snapshot, StoreError> {
        Ok(self.run_query(owner).await?.into())
    }

    fn subscribe(&self, owner: &OwnerId) -> Subscription {
        let store = self.clone();
        let owner = owner.clone();

        Subscription::new(async_stream::stream! {
            let mut ticker = tokio::time::interval(store.inner.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut dedupe = SnapshotDedupe::default();

            loop {
                ticker.tick().await;
                match store.run_query(&owner).await {
                    Ok(records) => {
                        if let Some(snapshot) = dedupe.accept(records) {
                            yield snapshot;
                        }
                    }
                    // The list goes stale until the next successful poll.
                    Err(e) => warn!(error = %e, owner = %owner, "Pantry poll failed"),
                }
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use url::Url;

    use super::*;
    use crate::config::FirebaseConfig;

    fn store() -> FirestoreStore {
        let config = BackendConfig {
            firebase: FirebaseConfig {
                api_key: SecretString::from("AIzaSyD3x7kQ9mP2vL8nR4tW6yB1cF5hJ0gZ".to_string()),
                project_id: "kiler-takip".to_string(),
                auth_url: Url::parse("https://identitytoolkit.googleapis.com/v1").unwrap(),
                firestore_url: Url::parse("https://firestore.googleapis.com/v1").unwrap(),
            },
            collection: "pantry".to_string(),
            poll_interval: Duration::from_secs(5),
            sentry_dsn: None,
        };
        FirestoreStore::new(&config, SessionHandle::new()).unwrap()
    }

    #[test]
    fn test_document_url_encodes_id() {
        assert_eq!(
            store().document_url(&RecordId::new("a b/c")),
            "https://firestore.googleapis.com/v1/projects/kiler-takip/databases/(default)/documents/pantry/a%20b%2Fc"
        );
    }

    #[tokio::test]
    async fn test_writes_require_session() {
        let store = store();
        assert!(matches!(
            store.delete(&RecordId::new("x")).await,
            Err(StoreError::Unauthenticated)
        ));
        assert!(matches!(
            store.fetch(&OwnerId::new("uid")).await,
            Err(StoreError::Unauthenticated)
        ));
    }
}
