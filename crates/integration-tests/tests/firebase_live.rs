//! Pantry flows against a real Firebase project.
//!
//! These tests require:
//! - `FIREBASE_API_KEY` and `FIREBASE_PROJECT_ID` for a project with
//!   email/password sign-in and Firestore enabled
//! - `PANTRY_EMAIL` / `PANTRY_PASSWORD` of an account whose email is verified
//! - `deploy/firestore.rules` deployed to that project
//!
//! Run with: cargo test -p smart-pantry-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use smart_pantry_backend::{
    AccountService, BackendConfig, FirebaseAuth, FirestoreStore, PantryService, RecordStore,
};
use smart_pantry_core::{Category, CategoryFilter, RecordId};
use smart_pantry_integration_tests::{item, june_14, next_snapshot};

struct Live {
    auth: FirebaseAuth,
    store: FirestoreStore,
}

async fn signed_in() -> Live {
    let config = BackendConfig::from_env().expect("Firebase configuration");
    let auth = FirebaseAuth::new(&config.firebase).unwrap();
    let store = FirestoreStore::new(&config, auth.session()).unwrap();

    let email = std::env::var("PANTRY_EMAIL").expect("PANTRY_EMAIL");
    let password = std::env::var("PANTRY_PASSWORD").expect("PANTRY_PASSWORD");
    AccountService::new(&auth)
        .login(&email, &password)
        .await
        .expect("login with a verified account");

    Live { auth, store }
}

#[tokio::test]
#[ignore = "Requires Firebase project and verified test account"]
async fn test_live_add_list_delete() {
    let live = signed_in().await;
    let pantry = PantryService::new(&live.auth, &live.store);

    let marker = format!("it-{}", std::process::id());
    let record = pantry
        .add_item(item(&marker, "15/6/2025", Category::Snack))
        .await
        .unwrap();

    let listed = pantry
        .list(&marker, CategoryFilter::All, &june_14())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].record, record);

    pantry.delete_item(&record.id).await.unwrap();
    let after = pantry
        .list(&marker, CategoryFilter::All, &june_14())
        .await
        .unwrap();
    assert!(after.is_empty());
}

#[tokio::test]
#[ignore = "Requires Firebase project and verified test account"]
async fn test_live_watch_initial_snapshot() {
    let live = signed_in().await;
    let pantry = PantryService::new(&live.auth, &live.store);
    let user = AccountService::new(&live.auth)
        .greeting()
        .await
        .expect("signed in");
    assert!(!user.is_empty());

    let mut feed = pantry.watch().await.unwrap();
    let snapshot = next_snapshot(&mut feed).await.expect("initial snapshot");
    let owner = live.auth.session().user().await.unwrap().id;
    assert!(snapshot.iter().all(|record| record.is_owned_by(&owner)));
    feed.unsubscribe();
}

#[tokio::test]
#[ignore = "Requires Firebase project and verified test account"]
async fn test_live_delete_of_missing_document_succeeds() {
    let live = signed_in().await;
    let id = RecordId::new(format!("missing-{}", std::process::id()));
    live.store.delete(&id).await.unwrap();
}
