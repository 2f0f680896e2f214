use crate::UrlError;
use sha2::{Digest, Sha256};
use std::fmt;
use url::Url;

/// A stable digest of a normalized URL, used for duplicate detection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Returns the hex-encoded SHA-256 digest
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalizes a URL for fingerprinting
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed (scheme and host are lowercased by the parser)
/// 2. Drop query parameters with blank values
/// 3. Sort remaining query parameters by name, then by value
/// 4. Remove empty query string (trailing ?)
/// 5. Remove fragment (everything after #)
///
/// The path, host and every query value are otherwise left untouched, so URLs that
/// differ in any of them normalize differently.
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - Failed to parse the URL
///
/// # Examples
///
/// ```
/// use silene::url::normalize_url;
///
/// let url = normalize_url("http://example.com/test?ghi=jkl&abc=def#fragment").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/test?abc=def&ghi=jkl");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.query().is_some() {
        let params = sorted_query_params(&url);

        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
    }

    url.set_fragment(None);

    Ok(url)
}

/// Computes the duplicate-detection fingerprint of a URL
///
/// Two URLs that differ only in query parameter order or fragment produce the
/// same fingerprint.
///
/// # Examples
///
/// ```
/// use silene::url::fingerprint;
///
/// let a = fingerprint("http://example.com/test?abc=def&ghi=jkl#fragment").unwrap();
/// let b = fingerprint("http://example.com/test?ghi=jkl&abc=def").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn fingerprint(url_str: &str) -> Result<Fingerprint, UrlError> {
    let normalized = normalize_url(url_str)?;

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_str().as_bytes());
    Ok(Fingerprint(hex::encode(hasher.finalize())))
}

/// Collects non-blank query parameters sorted by (name, value)
fn sorted_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(_, value)| !value.is_empty())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    params.sort();

    params
}
