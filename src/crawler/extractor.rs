//! Schema-guided product extraction
//!
//! The provider returns an untyped JSON payload per page. The payload must
//! have the `{products: [{name, ...}]}` shape or the whole page is a parse
//! error; within a valid payload each product stands alone, so one bad price
//! only drops that product.

use super::LimitedProvider;
use crate::model::{Product, ProductCategory};
use crate::ScoutError;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use url::Url;

/// JSON schema sent with every extraction request
pub fn product_schema() -> Value {
    let categories: Vec<&str> = ProductCategory::all().iter().map(|c| c.label()).collect();

    json!({
        "type": "object",
        "properties": {
            "products": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "price": {"type": "string"},
                        "url": {"type": "string"},
                        "category": {"type": "string", "enum": categories}
                    },
                    "required": ["name", "price"]
                }
            }
        },
        "required": ["products"]
    })
}

#[derive(Debug, Deserialize)]
struct ExtractedCatalog {
    products: Vec<RawProduct>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    name: String,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

impl RawProduct {
    /// Converts to a Product, or None if the name is blank or the price
    /// does not parse
    fn into_product(self, page_url: &str) -> Option<Product> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }

        let price = self.price.as_ref().and_then(parse_price)?;

        Some(Product {
            name: name.to_string(),
            price,
            url: resolve_product_url(self.url.as_deref(), page_url),
            category: self
                .category
                .as_deref()
                .map(ProductCategory::from_label)
                .unwrap_or(ProductCategory::Other),
        })
    }
}

/// Parses a price from a JSON number or string
pub fn parse_price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().and_then(valid_price),
        Value::String(s) => parse_price_text(s),
        _ => None,
    }
}

/// Parses a price string
///
/// Accepts an optional leading currency symbol and thousands separators. For
/// a range the first bound is taken.
///
/// # Examples
///
/// ```
/// use competitor_scout::crawler::parse_price_text;
///
/// assert_eq!(parse_price_text("$1,299.50"), Some(1299.5));
/// assert_eq!(parse_price_text("$150 - $200"), Some(150.0));
/// assert_eq!(parse_price_text("call for pricing"), None);
/// ```
pub fn parse_price_text(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.starts_with('-') {
        return None;
    }

    let first_bound = text
        .split(|c| matches!(c, '-' | '–' | '—'))
        .next()?
        .split(" to ")
        .next()?;

    let digits: String = first_bound
        .trim()
        .trim_start_matches(|c| matches!(c, '$' | '€' | '£'))
        .trim()
        .chars()
        .filter(|c| *c != ',')
        .collect();

    digits.parse::<f64>().ok().and_then(valid_price)
}

fn valid_price(price: f64) -> Option<f64> {
    (price.is_finite() && price >= 0.0).then_some(price)
}

/// Resolves a product URL against the page it came from
fn resolve_product_url(raw: Option<&str>, page_url: &str) -> String {
    let Some(raw) = raw.map(str::trim).filter(|u| !u.is_empty()) else {
        return page_url.to_string();
    };

    match Url::parse(page_url).and_then(|base| base.join(raw)) {
        Ok(resolved) => resolved.into(),
        Err(_) => raw.to_string(),
    }
}

/// Decodes an extraction payload into products
fn products_from_payload(payload: Value, page_url: &str) -> crate::Result<Vec<Product>> {
    let catalog: ExtractedCatalog = serde_json::from_value(payload).map_err(|e| {
        ScoutError::Parse(format!("Extraction for {} did not match schema: {}", page_url, e))
    })?;

    let total = catalog.products.len();
    let products: Vec<Product> = catalog
        .products
        .into_iter()
        .filter_map(|raw| raw.into_product(page_url))
        .collect();

    if products.len() < total {
        tracing::debug!(
            url = page_url,
            dropped = total - products.len(),
            "Dropped products without a usable name or price"
        );
    }

    Ok(products)
}

/// Outcome of extracting a set of pages
#[derive(Debug, Default)]
pub struct PageExtraction {
    pub products: Vec<Product>,
    /// Pages whose extraction failed, with the error
    pub failures: Vec<(String, ScoutError)>,
}

/// Pulls structured products out of single pages
#[derive(Clone)]
pub struct ProductExtractor {
    provider: LimitedProvider,
    schema: Value,
    prompt: String,
}

impl ProductExtractor {
    pub fn new(provider: LimitedProvider, prompt: impl Into<String>) -> Self {
        Self {
            provider,
            schema: product_schema(),
            prompt: prompt.into(),
        }
    }

    /// Extracts the products of one page
    pub async fn extract(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> crate::Result<Vec<Product>> {
        let payload = self
            .provider
            .acquire(cancel)
            .await?
            .extract(url, &self.schema, &self.prompt)
            .await?;

        products_from_payload(payload, url)
    }

    /// Extracts every page in turn
    ///
    /// A failing page is logged and recorded, and the remaining pages are
    /// still extracted. Only cancellation stops the loop.
    pub async fn extract_all(
        &self,
        urls: &[String],
        cancel: &CancellationToken,
    ) -> crate::Result<PageExtraction> {
        let mut extraction = PageExtraction::default();

        for url in urls {
            match self.extract(url, cancel).await {
                Ok(products) => {
                    tracing::debug!(url = %url, products = products.len(), "Extracted page");
                    extraction.products.extend(products);
                }
                Err(ScoutError::Cancelled) => return Err(ScoutError::Cancelled),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Product extraction failed");
                    extraction.failures.push((url.clone(), e));
                }
            }
        }

        Ok(extraction)
    }
}
