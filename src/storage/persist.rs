//! Key layout for persisted discovery results
//!
//! ```text
//! {location}/location.json                            Location
//! {location}/{competitor}/competitor                  Competitor
//! {location}/{competitor}/{category}/{product}.json   Product
//! ```
//!
//! Names are used as path segments after trimming; a `/` inside a name is
//! replaced with `-` so it cannot introduce an extra level.

use super::traits::{StorageResult, Store};
use crate::model::{Competitor, Location, Product, SearchResult};

fn segment(name: &str) -> String {
    name.trim().replace('/', "-")
}

pub fn location_key(location: &str) -> String {
    format!("{}/location.json", segment(location))
}

pub fn competitor_key(location: &str, competitor: &str) -> String {
    format!("{}/{}/competitor", segment(location), segment(competitor))
}

pub fn product_key(location: &str, competitor: &str, product: &Product) -> String {
    format!(
        "{}/{}/{}/{}.json",
        segment(location),
        segment(competitor),
        segment(product.category.label()),
        segment(&product.name)
    )
}

/// Writes a search result under the location's keys
///
/// Returns the number of keys written.
pub fn persist_search_result(store: &dyn Store, result: &SearchResult) -> StorageResult<usize> {
    let location = Location::from(result);
    store.put(
        &location_key(&result.location),
        &serde_json::to_string(&location)?,
    )?;
    let mut written = 1;

    for competitor in &result.competitors {
        written += persist_competitor(store, &result.location, competitor)?;
    }

    tracing::debug!(
        location = %result.location,
        keys = written,
        "Persisted search result"
    );
    Ok(written)
}

fn persist_competitor(
    store: &dyn Store,
    location: &str,
    competitor: &Competitor,
) -> StorageResult<usize> {
    store.put(
        &competitor_key(location, &competitor.name),
        &serde_json::to_string(competitor)?,
    )?;
    let mut written = 1;

    for product in &competitor.products {
        store.put(
            &product_key(location, &competitor.name, product),
            &serde_json::to_string(product)?,
        )?;
        written += 1;
    }

    Ok(written)
}

/// Reads back a location record, or None if it was never stored
pub fn load_location(store: &dyn Store, location: &str) -> StorageResult<Option<Location>> {
    store
        .get(&location_key(location))?
        .map(|raw| serde_json::from_str(&raw).map_err(Into::into))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductCategory;
    use crate::storage::{SqliteStore, StorageError};

    fn sample_result() -> SearchResult {
        let products = vec![
            Product {
                name: "Castle Bouncer".to_string(),
                price: 199.99,
                url: "https://jumpco.com/rentals/castle".to_string(),
                category: ProductCategory::BounceHouse,
            },
            Product {
                name: "Tidal Wave 18/22ft".to_string(),
                price: 349.0,
                url: "https://jumpco.com/rentals/tidal".to_string(),
                category: ProductCategory::WaterSlide,
            },
        ];
        let competitor =
            Competitor::from_products("Jump Co", "https://jumpco.com/", products).unwrap();
        SearchResult::new("Austin, TX", vec![competitor])
    }

    #[test]
    fn test_key_layout() {
        let result = sample_result();
        let competitor = &result.competitors[0];

        assert_eq!(location_key("Austin, TX"), "Austin, TX/location.json");
        assert_eq!(
            competitor_key("Austin, TX", "Jump Co"),
            "Austin, TX/Jump Co/competitor"
        );
        assert_eq!(
            product_key("Austin, TX", "Jump Co", &competitor.products[1]),
            "Austin, TX/Jump Co/Water Slide/Tidal Wave 18-22ft.json"
        );
    }

    #[test]
    fn test_persist_and_load_roundtrip() {
        let store = SqliteStore::new_in_memory().unwrap();
        let result = sample_result();

        let written = persist_search_result(&store, &result).unwrap();
        // location + competitor + two products
        assert_eq!(written, 4);
        assert_eq!(store.count_records("Austin, TX/").unwrap(), 4);

        let location = load_location(&store, "Austin, TX").unwrap().unwrap();
        assert_eq!(location.name, "Austin, TX");
        assert_eq!(location.competitors, result.competitors);
    }

    #[test]
    fn test_load_missing_location() {
        let store = SqliteStore::new_in_memory().unwrap();
        assert!(load_location(&store, "Nowhere").unwrap().is_none());
    }

    #[test]
    fn test_load_corrupt_location() {
        let store = SqliteStore::new_in_memory().unwrap();
        store.put(&location_key("Austin, TX"), "not json").unwrap();

        let result = load_location(&store, "Austin, TX");
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
