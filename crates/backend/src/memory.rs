//! In-process auth provider and record store.
//!
//! Both keep state behind an `Arc` so clones share it. Error messages mirror
//! the codes Firebase returns, so callers see the same text either way.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use secrecy::SecretString;
use smart_pantry_core::{Email, NewPantryRecord, OwnerId, PantryRecord, RecordId};
use tokio::sync::{Mutex, watch};
use tracing::debug;
use uuid::Uuid;

use crate::auth::{AuthError, AuthProvider};
use crate::session::{Session, SessionHandle, User};
use crate::store::{RecordStore, Snapshot, SnapshotDedupe, StoreError, Subscription};

/// Shortest password the provider itself accepts.
const PROVIDER_MIN_PASSWORD: usize = 6;

// =============================================================================
// MemoryAuth
// =============================================================================

/// [`AuthProvider`] with accounts held in memory.
///
/// New accounts start unverified; call [`MemoryAuth::verify_email`] to
/// simulate the user following the verification link.
#[derive(Clone, Default)]
pub struct MemoryAuth {
    inner: Arc<MemoryAuthInner>,
}

#[derive(Default)]
struct MemoryAuthInner {
    /// Keyed by [`Email::account_key`].
    accounts: Mutex<HashMap<String, Account>>,
    session: SessionHandle,
    verification_emails: AtomicUsize,
    fail_verification: AtomicBool,
}

#[derive(Debug, Clone)]
struct Account {
    uid: OwnerId,
    email: Email,
    password: String,
    display_name: Option<String>,
    email_verified: bool,
}

impl Account {
    fn user(&self) -> User {
        User {
            id: self.uid.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            email_verified: self.email_verified,
        }
    }
}

impl MemoryAuth {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider that writes into an existing session handle.
    #[must_use]
    pub fn with_session(session: SessionHandle) -> Self {
        Self {
            inner: Arc::new(MemoryAuthInner {
                session,
                ..MemoryAuthInner::default()
            }),
        }
    }

    #[must_use]
    pub fn session(&self) -> SessionHandle {
        self.inner.session.clone()
    }

    /// Mark the account's address as verified. Returns `false` if there is
    /// no such account.
    pub async fn verify_email(&self, email: &Email) -> bool {
        let mut accounts = self.inner.accounts.lock().await;
        if let Some(account) = accounts.get_mut(&email.account_key()) {
            account.email_verified = true;
            true
        } else {
            false
        }
    }

    /// How many verification emails were sent so far.
    #[must_use]
    pub fn verification_emails_sent(&self) -> usize {
        self.inner.verification_emails.load(Ordering::SeqCst)
    }

    /// Make every following verification email fail.
    pub fn fail_verification_emails(&self, fail: bool) {
        self.inner.fail_verification.store(fail, Ordering::SeqCst);
    }

    async fn install(&self, user: User) -> Session {
        let session = Session {
            user,
            id_token: SecretString::from(format!("memory-{}", Uuid::new_v4().simple())),
        };
        self.inner.session.replace(session.clone()).await;
        session
    }

    async fn signed_in_key(&self) -> Result<String, AuthError> {
        self.inner
            .session
            .user()
            .await
            .map(|user| user.email.account_key())
            .ok_or(AuthError::NotSignedIn)
    }
}

impl AuthProvider for MemoryAuth {
    async fn sign_up(&self, email: &Email, password: &str) -> Result<Session, AuthError> {
        if password.chars().count() < PROVIDER_MIN_PASSWORD {
            return Err(AuthError::Provider(
                "WEAK_PASSWORD : Password should be at least 6 characters".to_string(),
            ));
        }

        let account = {
            let mut accounts = self.inner.accounts.lock().await;
            let key = email.account_key();
            if accounts.contains_key(&key) {
                return Err(AuthError::Provider("EMAIL_EXISTS".to_string()));
            }
            let account = Account {
                uid: OwnerId::new(Uuid::new_v4().simple().to_string()),
                email: email.clone(),
                password: password.to_string(),
                display_name: None,
                email_verified: false,
            };
            accounts.insert(key, account.clone());
            account
        };

        debug!(uid = %account.uid, "Account created");
        Ok(self.install(account.user()).await)
    }

    async fn sign_in(&self, email: &Email, password: &str) -> Result<Session, AuthError> {
        let user = {
            let accounts = self.inner.accounts.lock().await;
            accounts
                .get(&email.account_key())
                .filter(|account| account.password == password)
                .map(Account::user)
                .ok_or_else(|| AuthError::Provider("INVALID_LOGIN_CREDENTIALS".to_string()))?
        };
        Ok(self.install(user).await)
    }

    async fn sign_out(&self) {
        self.inner.session.clear().await;
    }

    async fn current_user(&self) -> Option<User> {
        self.inner.session.user().await
    }

    async fn send_verification_email(&self) -> Result<(), AuthError> {
        self.signed_in_key().await?;
        if self.inner.fail_verification.load(Ordering::SeqCst) {
            return Err(AuthError::Provider("TOO_MANY_ATTEMPTS_TRY_LATER".to_string()));
        }
        self.inner.verification_emails.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_display_name(&self, display_name: &str) -> Result<(), AuthError> {
        let key = self.signed_in_key().await?;
        if let Some(account) = self.inner.accounts.lock().await.get_mut(&key) {
            account.display_name = Some(display_name.to_string());
        }
        let name = display_name.to_string();
        self.inner
            .session
            .update_user(move |user| user.display_name = Some(name))
            .await;
        Ok(())
    }
}

// =============================================================================
// MemoryRecordStore
// =============================================================================

/// [`RecordStore`] holding every owner's records in one list.
///
/// Each write notifies all subscribers, which re-filter by owner and skip
/// snapshots that did not change for them.
#[derive(Clone)]
pub struct MemoryRecordStore {
    records: Arc<watch::Sender<Vec<PantryRecord>>>,
    fail_writes: Arc<AtomicBool>,
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self {
            records: Arc::new(watch::Sender::new(Vec::new())),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every owner's records, in insertion order.
    #[must_use]
    pub fn all(&self) -> Vec<PantryRecord> {
        self.records.borrow().clone()
    }

    /// Insert a record with a chosen ID.
    pub fn seed(&self, record: PantryRecord) {
        self.records.send_modify(|records| records.push(record));
    }

    /// Make every following create and delete fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Api {
                status: 503,
                message: "UNAVAILABLE".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn owned_by(records: &[PantryRecord], owner: &OwnerId) -> Vec<PantryRecord> {
        records
            .iter()
            .filter(|record| record.is_owned_by(owner))
            .cloned()
            .collect()
    }
}

impl RecordStore for MemoryRecordStore {
    async fn create(&self, record: &NewPantryRecord) -> Result<RecordId, StoreError> {
        self.check_writable()?;
        let id = RecordId::new(Uuid::new_v4().simple().to_string());
        let record = record.clone().with_id(id.clone());
        self.records.send_modify(|records| records.push(record));
        Ok(id)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        self.check_writable()?;
        self.records.send_if_modified(|records| {
            let before = records.len();
            records.retain(|record| &record.id != id);
            records.len() != before
        });
        Ok(())
    }

    async fn fetch(&self, owner: &OwnerId) -> Result<Snapshot, StoreError> {
        Ok(Self::owned_by(&self.records.borrow(), owner).into())
    }

    fn subscribe(&self, owner: &OwnerId) -> Subscription {
        let mut changes = self.records.subscribe();
        let owner = owner.clone();

        Subscription::new(async_stream::stream! {
            let mut dedupe = SnapshotDedupe::default();
            loop {
                let owned = MemoryRecordStore::owned_by(&changes.borrow_and_update(), &owner);
                if let Some(snapshot) = dedupe.accept(owned) {
                    yield snapshot;
                }
                if changes.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use smart_pantry_core::{Category, ExpiryDate};

    use super::*;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    fn item(name: &str, owner: &str) -> NewPantryRecord {
        NewPantryRecord {
            name: name.to_string(),
            expiry_date: ExpiryDate::new("20/6/2025"),
            category: Category::Other,
            owner_id: OwnerId::new(owner),
        }
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let auth = MemoryAuth::new();
        let created = auth.sign_up(&email("cook@example.com"), "Kiler1!").await.unwrap();
        assert!(!created.user.email_verified);
        assert_eq!(auth.current_user().await.unwrap().id, created.user.id);

        auth.sign_out().await;
        assert!(auth.current_user().await.is_none());

        let signed_in = auth.sign_in(&email("COOK@example.com"), "Kiler1!").await.unwrap();
        assert_eq!(signed_in.user.id, created.user.id);
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_is_rejected() {
        let auth = MemoryAuth::new();
        auth.sign_up(&email("cook@example.com"), "Kiler1!").await.unwrap();
        let err = auth
            .sign_up(&email("cook@example.com"), "Other1!")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "EMAIL_EXISTS");
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let auth = MemoryAuth::new();
        auth.sign_up(&email("cook@example.com"), "Kiler1!").await.unwrap();
        auth.sign_out().await;

        let err = auth.sign_in(&email("cook@example.com"), "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "INVALID_LOGIN_CREDENTIALS");
        assert!(auth.current_user().await.is_none());
    }

    #[tokio::test]
    async fn test_verify_and_display_name_persist() {
        let auth = MemoryAuth::new();
        let cook = email("cook@example.com");
        auth.sign_up(&cook, "Kiler1!").await.unwrap();
        auth.update_display_name("Furkan").await.unwrap();
        auth.send_verification_email().await.unwrap();
        assert_eq!(auth.verification_emails_sent(), 1);
        auth.sign_out().await;

        assert!(auth.verify_email(&cook).await);
        assert!(!auth.verify_email(&email("nobody@example.com")).await);

        let user = auth.sign_in(&cook, "Kiler1!").await.unwrap().user;
        assert!(user.email_verified);
        assert_eq!(user.display_name.as_deref(), Some("Furkan"));
    }

    #[tokio::test]
    async fn test_verification_needs_session() {
        let auth = MemoryAuth::new();
        assert!(matches!(
            auth.send_verification_email().await,
            Err(AuthError::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn test_initial_snapshot_then_changes() {
        let store = MemoryRecordStore::new();
        let owner = OwnerId::new("uid-1");
        let mut subscription = store.subscribe(&owner);
        assert!(subscription.next().await.unwrap().is_empty());

        let id = store.create(&item("Milk", "uid-1")).await.unwrap();
        let snapshot = subscription.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);

        store.delete(&id).await.unwrap();
        assert!(subscription.next().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_owners_are_invisible() {
        let store = MemoryRecordStore::new();
        let mut subscription = store.subscribe(&OwnerId::new("uid-1"));
        assert!(subscription.next().await.unwrap().is_empty());

        store.create(&item("Beer", "uid-2")).await.unwrap();
        store.create(&item("Milk", "uid-1")).await.unwrap();

        let snapshot = subscription.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name, "Milk");
        assert_eq!(store.all().len(), 2);
        assert_eq!(store.fetch(&OwnerId::new("uid-2")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_seeded_records_are_in_first_snapshot() {
        let store = MemoryRecordStore::new();
        store.seed(item("Honey", "uid-1").with_id(RecordId::new("seed-1")));

        let mut subscription = store.subscribe(&OwnerId::new("uid-1"));
        let snapshot = subscription.next().await.unwrap();
        assert_eq!(snapshot[0].id.as_str(), "seed-1");
    }

    #[tokio::test]
    async fn test_shared_session_handle() {
        let session = SessionHandle::new();
        let auth = MemoryAuth::with_session(session.clone());
        auth.sign_up(&email("cook@example.com"), "Kiler1!").await.unwrap();
        assert!(session.id_token().await.is_some());

        auth.sign_out().await;
        assert!(session.user().await.is_none());
    }

    #[tokio::test]
    async fn test_deleting_missing_id_succeeds() {
        let store = MemoryRecordStore::new();
        store.delete(&RecordId::new("ghost")).await.unwrap();
    }

    #[tokio::test]
    async fn test_failing_writes() {
        let store = MemoryRecordStore::new();
        store.fail_writes(true);
        assert!(matches!(
            store.create(&item("Milk", "uid-1")).await,
            Err(StoreError::Api { status: 503, .. })
        ));
        store.fail_writes(false);
        assert!(store.create(&item("Milk", "uid-1")).await.is_ok());
    }
}
