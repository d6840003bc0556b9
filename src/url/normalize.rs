use crate::{UrlError, UrlResult};
use url::Url;

/// Tracking query parameters removed from business websites
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "ref", "source"];

/// Normalizes a business website returned by the place search
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty input
/// 2. Default to `https://` when the value carries no scheme ("jumpco.com")
/// 3. Parse the URL; only HTTP and HTTPS are accepted and a host is required
/// 4. Remove the fragment
/// 5. Remove tracking query parameters (`utm_*`, `fbclid`, `gclid`, ...),
///    keeping the order of the remaining parameters
///
/// The path is left untouched: some sites only serve their catalog under the
/// exact path the listing points at.
///
/// # Examples
///
/// ```
/// use competitor_scout::url::normalize_website;
///
/// let url = normalize_website(" http://JumpCo.com/?utm_source=gmb ").unwrap();
/// assert_eq!(url, "http://jumpco.com/");
/// ```
pub fn normalize_website(raw: &str) -> UrlResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("empty website".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let mut url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS websites are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    Ok(url.into())
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
