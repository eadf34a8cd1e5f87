//! Record store seam and snapshot subscriptions.
//!
//! A [`RecordStore`] persists pantry records and pushes full snapshots of
//! one owner's records to subscribers. Implementations:
//!
//! - [`FirestoreStore`] - Cloud Firestore over REST, polled
//! - [`MemoryRecordStore`](crate::memory::MemoryRecordStore) - in-process,
//!   pushed on every write

mod documents;
mod error;
mod firestore;

pub use error::StoreError;
pub use firestore::FirestoreStore;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::{BoxStream, Stream, StreamExt};
use smart_pantry_core::{NewPantryRecord, OwnerId, PantryRecord, RecordId};

/// An immutable, complete view of one owner's records.
pub type Snapshot = Arc<[PantryRecord]>;

/// Persistence for pantry records.
pub trait RecordStore: Send + Sync {
    /// Persist a record and return the ID the store assigned.
    fn create(
        &self,
        record: &NewPantryRecord,
    ) -> impl Future<Output = Result<RecordId, StoreError>> + Send;

    /// Delete a record. Deleting an ID that does not exist succeeds.
    fn delete(&self, id: &RecordId) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Read the owner's records once.
    fn fetch(&self, owner: &OwnerId) -> impl Future<Output = Result<Snapshot, StoreError>> + Send;

    /// Subscribe to the owner's records.
    ///
    /// The first item is the current snapshot; every later item is a full
    /// replacement delivered after a change. Records of other owners never
    /// appear.
    fn subscribe(&self, owner: &OwnerId) -> Subscription;
}

/// Live handle to a snapshot feed.
///
/// Dropping the handle, or calling [`Subscription::unsubscribe`], stops the
/// feed and releases whatever the store holds for it.
pub struct Subscription {
    stream: BoxStream<'static, Snapshot>,
}

impl Subscription {
    pub fn new(stream: impl Stream<Item = Snapshot> + Send + 'static) -> Self {
        Self {
            stream: stream.boxed(),
        }
    }

    /// Wait for the next snapshot. `None` once the store has shut down.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.stream.next().await
    }

    /// Stop receiving snapshots.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Stream for Subscription {
    type Item = Snapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.poll_next_unpin(cx)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Suppresses snapshots identical to the last one delivered.
#[derive(Debug, Default)]
pub(crate) struct SnapshotDedupe {
    last: Option<Snapshot>,
}

impl SnapshotDedupe {
    /// Returns the snapshot to deliver, or `None` if nothing changed. The
    /// first call always delivers.
    pub(crate) fn accept(&mut self, records: Vec<PantryRecord>) -> Option<Snapshot> {
        if self.last.as_deref() == Some(records.as_slice()) {
            return None;
        }
        let snapshot: Snapshot = records.into();
        self.last = Some(Arc::clone(&snapshot));
        Some(snapshot)
    }
}
