//! Domain records produced by the discovery pipeline
//!
//! These are the typed values that flow from the place search through the
//! per-business pipeline into the final `SearchResult`. They serialize with
//! camelCase field names, which is also the persisted layout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A candidate business returned by the place search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    /// Provider-specific place identifier
    pub id: String,
    /// Business name
    pub name: String,
}

impl Place {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Details looked up for a single place
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceDetails {
    /// The business website, if the provider knows one
    pub website: Option<String>,
}

/// Product category assigned during extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductCategory {
    #[serde(rename = "Bounce House")]
    BounceHouse,
    #[serde(rename = "Water Slide")]
    WaterSlide,
    #[serde(rename = "Obstacle Course")]
    ObstacleCourse,
    #[serde(rename = "Other")]
    Other,
}

impl ProductCategory {
    /// Maps a free-text category to a known category
    ///
    /// Matching ignores case, surrounding whitespace and the separator between
    /// words, so "bounce-house" and "Bounce House" are the same category.
    /// Anything unrecognized is `Other`.
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(|c| c.to_lowercase())
            .collect();

        match normalized.as_str() {
            "bouncehouse" | "bouncehouses" => Self::BounceHouse,
            "waterslide" | "waterslides" => Self::WaterSlide,
            "obstaclecourse" | "obstaclecourses" => Self::ObstacleCourse,
            _ => Self::Other,
        }
    }

    /// Label used in reports and storage keys
    pub fn label(&self) -> &'static str {
        match self {
            Self::BounceHouse => "Bounce House",
            Self::WaterSlide => "Water Slide",
            Self::ObstacleCourse => "Obstacle Course",
            Self::Other => "Other",
        }
    }

    /// Returns all categories in report order
    pub fn all() -> [Self; 4] {
        [
            Self::BounceHouse,
            Self::WaterSlide,
            Self::ObstacleCourse,
            Self::Other,
        ]
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A product offered by a competitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: f64,
    pub url: String,
    pub category: ProductCategory,
}

/// A competitor with at least one extracted product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub website: String,
    pub products: Vec<Product>,
}

impl Competitor {
    /// Assembles a competitor, or `None` when no products were extracted
    pub fn from_products(
        name: impl Into<String>,
        website: impl Into<String>,
        products: Vec<Product>,
    ) -> Option<Self> {
        if products.is_empty() {
            return None;
        }

        Some(Self {
            name: name.into(),
            website: website.into(),
            products,
        })
    }
}

/// Aggregated result of a discovery run for one location
///
/// Competitor order reflects task completion order and carries no meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub competitors: Vec<Competitor>,
    pub location: String,
    pub total_found: usize,
}

impl SearchResult {
    /// Builds a result whose `total_found` matches the competitor count
    pub fn new(location: impl Into<String>, competitors: Vec<Competitor>) -> Self {
        Self {
            total_found: competitors.len(),
            competitors,
            location: location.into(),
        }
    }

    /// Total number of products across all competitors
    pub fn product_count(&self) -> usize {
        self.competitors.iter().map(|c| c.products.len()).sum()
    }
}

/// Persisted form of a location's discovered competitors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub competitors: Vec<Competitor>,
}

impl From<&SearchResult> for Location {
    fn from(result: &SearchResult) -> Self {
        Self {
            name: result.location.clone(),
            competitors: result.competitors.clone(),
        }
    }
}
