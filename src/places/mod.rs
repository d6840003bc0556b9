//! Place search: finding candidate businesses and their websites
//!
//! `PlaceSearch` is the raw provider seam; `PlaceResolver` layers retries and
//! website normalization on top of it.

mod google;
mod resolver;

pub use google::{GooglePlacesClient, SERVICE as PLACES_SERVICE};
pub use resolver::PlaceResolver;

use crate::model::{Place, PlaceDetails};
use crate::Result;
use async_trait::async_trait;

/// Trait for place search provider implementations
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Runs a free-text search, returning matching places in provider order
    async fn text_search(&self, query: &str) -> Result<Vec<Place>>;

    /// Looks up the details of one place
    async fn details(&self, place_id: &str) -> Result<PlaceDetails>;
}
