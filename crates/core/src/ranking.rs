//! Ranking of a record snapshot into the order the user sees.
//!
//! Records are filtered by a case-insensitive name substring and a category
//! filter, then sorted by days until expiry, soonest first. The sort is
//! stable: snapshots arrive from a live subscription in no meaningful order,
//! and items with the same day count must keep their relative order so the
//! list does not shuffle on every update.

use chrono::{DateTime, TimeZone};

use crate::types::{CategoryFilter, PantryRecord};

/// Filter and order `records` for display.
///
/// Returns a fresh vector; `records` is left untouched.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use smart_pantry_core::{
///     Category, CategoryFilter, ExpiryDate, OwnerId, PantryRecord, RecordId, rank,
/// };
///
/// let record = |id: &str, name: &str, date: &str| PantryRecord {
///     id: RecordId::new(id),
///     name: name.to_string(),
///     expiry_date: ExpiryDate::new(date),
///     category: Category::Dairy,
///     owner_id: OwnerId::new("uid"),
/// };
/// let records = vec![
///     record("a", "Yogurt", "20/6/2025"),
///     record("b", "Milk", "15/6/2025"),
/// ];
///
/// let now = Utc.with_ymd_and_hms(2025, 6, 14, 8, 0, 0).unwrap();
/// let ranked = rank(&records, "", &CategoryFilter::All, &now);
/// assert_eq!(ranked[0].name, "Milk");
/// ```
#[must_use]
pub fn rank<Tz: TimeZone>(
    records: &[PantryRecord],
    query: &str,
    filter: &CategoryFilter,
    now: &DateTime<Tz>,
) -> Vec<PantryRecord> {
    ranked_with_days(records, query, filter, now)
        .into_iter()
        .map(|(_, record)| record.clone())
        .collect()
}

/// Like [`rank`], but keeps each record's computed day count alongside a
/// borrow of the record.
#[must_use]
pub fn ranked_with_days<'a, Tz: TimeZone>(
    records: &'a [PantryRecord],
    query: &str,
    filter: &CategoryFilter,
    now: &DateTime<Tz>,
) -> Vec<(i64, &'a PantryRecord)> {
    let needle: Vec<char> = query.chars().collect();

    let mut ranked: Vec<(i64, &PantryRecord)> = records
        .iter()
        .filter(|record| name_matches(&record.name, &needle))
        .filter(|record| filter.matches(&record.category))
        .map(|record| (record.days_until(now), record))
        .collect();

    // `sort_by_key` is stable.
    ranked.sort_by_key(|(days, _)| *days);
    ranked
}

/// Case-insensitive substring match, compared character by character.
///
/// Whole-string case folding is not used: `"KIRMIZI".to_lowercase()` is
/// `"kirmizi"`, which misses `"Kırmızı"`.
fn name_matches(name: &str, needle: &[char]) -> bool {
    if needle.is_empty() {
        return true;
    }
    let haystack: Vec<char> = name.chars().collect();
    haystack.windows(needle.len()).any(|window| {
        window
            .iter()
            .zip(needle)
            .all(|(&a, &b)| chars_match_ignoring_case(a, b))
    })
}

/// Equal, equal once uppercased, or equal once both uppercase forms are
/// lowercased. An uppercase form that expands to several characters (`ß`)
/// leaves the character unchanged; `İ` lowercases to its base letter `i`.
fn chars_match_ignoring_case(a: char, b: char) -> bool {
    if a == b {
        return true;
    }
    let (upper_a, upper_b) = (single_upper(a), single_upper(b));
    upper_a == upper_b || single_lower(upper_a) == single_lower(upper_b)
}

fn single_upper(c: char) -> char {
    let mut mapped = c.to_uppercase();
    match (mapped.next(), mapped.next()) {
        (Some(upper), None) => upper,
        _ => c,
    }
}

fn single_lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
