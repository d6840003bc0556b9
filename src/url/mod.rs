//! URL handling module for Competitor-Scout
//!
//! This module provides website normalization for place-search results and the
//! keyword relevance filter applied to discovered URLs before extraction.

mod filter;
mod normalize;

pub use filter::{filter_relevant_urls, RelevanceFilter, DEFAULT_RELEVANT_KEYWORDS};
pub use normalize::normalize_website;
