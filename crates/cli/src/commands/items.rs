//! Pantry item commands.
//!
//! # Usage
//!
//! ```bash
//! pantry add --name Chickpeas --expires 2025-09-01 --category legumes
//! pantry list --category all --json
//! pantry delete 8Gk2aQ
//! pantry watch --query süt
//! ```

use chrono::{Local, NaiveDate};
use smart_pantry_backend::{AccountService, PantryService};
use smart_pantry_core::{
    Category, ExpiryDate, ItemForm, ListEntry, PantryList, RecordId, Urgency,
};

use super::{Backend, CliError, Credentials, FilterArgs, say};

const EMPTY_PANTRY: &str = "Your pantry is empty. Add something with `pantry add`.";

/// Parse `--expires`. `D/M/Y` and `YYYY-MM-DD` are accepted; either is
/// stored in the canonical unpadded `D/M/Y` form.
fn parse_expiry(raw: &str) -> Result<ExpiryDate, CliError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| ExpiryDate::new(raw).to_date())
        .map(ExpiryDate::from_date)
        .ok_or_else(|| CliError::InvalidDate(raw.to_owned()))
}

fn marker(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::Expired => "!!",
        Urgency::Soon => "! ",
        Urgency::Fresh => "  ",
    }
}

fn format_entry(entry: &ListEntry) -> String {
    format!(
        "{} {:<24} {:<14} {:<10} {:<16} {}",
        marker(entry.urgency),
        entry.record.name,
        entry.record.category.label(),
        entry.record.expiry_date.as_str(),
        entry.status,
        entry.record.id,
    )
}

/// Lines for one render of the list; `total` counts records before filtering.
fn render_lines(entries: &[ListEntry], total: usize) -> Vec<String> {
    if total == 0 {
        return vec![EMPTY_PANTRY.to_string()];
    }
    if entries.is_empty() {
        return vec![format!("No items match ({total} in pantry).")];
    }
    entries.iter().map(format_entry).collect()
}

fn render(entries: &[ListEntry], total: usize) -> std::io::Result<()> {
    render_lines(entries, total).into_iter().try_for_each(say)
}

fn filtered(filter: &FilterArgs) -> PantryList {
    let mut list = PantryList::new();
    list.set_query(filter.query.clone());
    list.set_category(filter.category.clone());
    list
}

pub async fn add(
    credentials: &Credentials,
    name: String,
    expires: &str,
    category: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let Ok(category) = category.parse::<Category>();
    let form = ItemForm {
        name,
        expiry_date: parse_expiry(expires)?,
        category,
    };

    let (backend, _user) = Backend::signed_in(credentials).await?;
    let record = PantryService::new(&backend.auth, &backend.store)
        .add_item(form)
        .await?;

    say(format_args!(
        "Added {} ({}), expires {} [{}]",
        record.name,
        record.category,
        record.expiry_date,
        record.id
    ))?;
    Ok(())
}

pub async fn list(
    credentials: &Credentials,
    filter: &FilterArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (backend, _user) = Backend::signed_in(credentials).await?;
    let pantry = PantryService::new(&backend.auth, &backend.store);
    let mut list = filtered(filter);
    list.apply_snapshot(pantry.records().await?);
    let entries = list.entries(&Local::now());

    if json {
        say(serde_json::to_string_pretty(&entries)?)?;
    } else {
        render(&entries, list.records().len())?;
    }
    Ok(())
}

pub async fn delete(
    credentials: &Credentials,
    id: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let (backend, _user) = Backend::signed_in(credentials).await?;
    PantryService::new(&backend.auth, &backend.store)
        .delete_item(&RecordId::new(id))
        .await?;
    say("Deleted.")?;
    Ok(())
}

/// Re-render the list on every snapshot until Ctrl+C or the feed ends.
// TODO: refresh the ID token through securetoken.googleapis.com; Firestore
// rejects polls once the one-hour token expires.
pub async fn watch(
    credentials: &Credentials,
    filter: &FilterArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (backend, user) = Backend::signed_in(credentials).await?;
    let pantry = PantryService::new(&backend.auth, &backend.store);
    say(format_args!(
        "Watching {}'s pantry. Press Ctrl+C to stop.",
        user.greeting_name()
    ))?;

    let mut list = filtered(filter);
    let mut subscription = pantry.watch().await?;
    loop {
        tokio::select! {
            snapshot = subscription.next() => {
                let Some(snapshot) = snapshot else { break };
                list.apply_snapshot(snapshot);
                say(format_args!("--- {} ---", Local::now().format("%H:%M:%S")))?;
                render(&list.entries(&Local::now()), list.records().len())?;
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
        }
    }

    subscription.unsubscribe();
    AccountService::new(&backend.auth).logout().await;
    Ok(())
}

pub fn categories() -> std::io::Result<()> {
    for category in Category::FIXED {
        say(format_args!(
            "{:<14} {}",
            category.label(),
            category.slug().unwrap_or_default()
        ))?;
    }
    Ok(())
}
