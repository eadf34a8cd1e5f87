//! Pantry item categories and the list's category filter.
//!
//! Categories are persisted as their display label (`"Süt Ürünleri"`, not
//! `"dairy"`), so the label strings are part of the storage format and must
//! not change. The store does not enforce the fixed set at write time; any
//! other string round-trips as [`Category::Custom`].

use core::fmt;
use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A pantry item category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    #[default]
    Vegetable,
    Fruit,
    Legumes,
    Dairy,
    MeatProtein,
    Beverage,
    Snack,
    Other,
    /// A label outside the fixed set, kept verbatim.
    Custom(String),
}

impl Category {
    /// The fixed categories, in the order the add-item form offers them.
    pub const FIXED: [Self; 8] = [
        Self::Vegetable,
        Self::Fruit,
        Self::Legumes,
        Self::Dairy,
        Self::MeatProtein,
        Self::Beverage,
        Self::Snack,
        Self::Other,
    ];

    /// The persisted label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Vegetable => "Sebze",
            Self::Fruit => "Meyve",
            Self::Legumes => "Bakliyat",
            Self::Dairy => "Süt Ürünleri",
            Self::MeatProtein => "Et & Protein",
            Self::Beverage => "İçecek",
            Self::Snack => "Atıştırmalık",
            Self::Other => "Diğer",
            Self::Custom(label) => label,
        }
    }

    /// Short ASCII alias accepted on the command line.
    #[must_use]
    pub const fn slug(&self) -> Option<&'static str> {
        match self {
            Self::Vegetable => Some("vegetable"),
            Self::Fruit => Some("fruit"),
            Self::Legumes => Some("legumes"),
            Self::Dairy => Some("dairy"),
            Self::MeatProtein => Some("meat"),
            Self::Beverage => Some("beverage"),
            Self::Snack => Some("snack"),
            Self::Other => Some("other"),
            Self::Custom(_) => None,
        }
    }

    /// Map a persisted label back to a category. Unknown labels become
    /// [`Category::Custom`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        Self::FIXED
            .into_iter()
            .find(|c| c.label() == label)
            .unwrap_or_else(|| Self::Custom(label.to_owned()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        match Self::from_label(&label) {
            Self::Custom(_) => Self::Custom(label),
            known => known,
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Custom(label) => label,
            known => known.label().to_owned(),
        }
    }
}

/// Accepts a persisted label or a case-insensitive slug such as `dairy`.
impl FromStr for Category {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let by_slug = Self::FIXED
            .into_iter()
            .find(|c| c.slug().is_some_and(|slug| slug.eq_ignore_ascii_case(s)));
        Ok(by_slug.unwrap_or_else(|| Self::from_label(s)))
    }
}

/// Category filter applied to the pantry list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    /// The "all" sentinel: no category filtering.
    #[default]
    All,
    /// Only records whose category equals this one.
    Only(Category),
}

impl CategoryFilter {
    /// Label of the "all" sentinel chip.
    pub const ALL_LABEL: &'static str = "Tümü";

    /// Whether a record with `category` passes the filter.
    #[must_use]
    pub fn matches(&self, category: &Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(Self::ALL_LABEL),
            Self::Only(category) => fmt::Display::fmt(category, f),
        }
    }
}

/// `Tümü` and `all` (any case) select [`CategoryFilter::All`]; anything else
/// is parsed as a [`Category`].
impl FromStr for CategoryFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == Self::ALL_LABEL || s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        let Ok(category) = s.parse::<Category>();
        Ok(Self::Only(category))
    }
}

impl From<Option<Category>> for CategoryFilter {
    fn from(category: Option<Category>) -> Self {
        category.map_or(Self::All, Self::Only)
    }
}
