use crate::UrlError;
use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (e.g. `about:blank`), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use silene::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://sub.example.com/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("sub.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Extracts the host of an allowed-domain entry
///
/// Accepts bare hosts (`example.com`) as well as full URLs
/// (`https://www.example.com:80/path`); scheme, port and path are stripped.
/// The host must end in a suffix known to the public suffix list and must
/// carry at least one label in front of it.
///
/// # Arguments
///
/// * `input` - Raw allowed-domain string from configuration
///
/// # Returns
///
/// * `Ok(String)` - The lowercase host
/// * `Err(UrlError)` - The input does not contain a usable host
///
/// # Examples
///
/// ```
/// use silene::url::extract_allowed_host;
///
/// assert_eq!(extract_allowed_host("https://www.example.com:80/").unwrap(), "www.example.com");
/// assert!(extract_allowed_host("example.invalid").is_err());
/// ```
pub fn extract_allowed_host(input: &str) -> Result<String, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::MissingDomain);
    }

    // Bare hosts get a scheme so the URL parser can split host from port/path
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;
    let host = extract_domain(&url).ok_or(UrlError::MissingDomain)?;
    let host = host.trim_end_matches('.').to_string();

    let suffix = psl::suffix(host.as_bytes())
        .ok_or_else(|| UrlError::Malformed(format!("No public suffix in '{}'", host)))?;
    if !suffix.is_known() {
        return Err(UrlError::Malformed(format!(
            "Unknown public suffix in '{}'",
            host
        )));
    }

    if psl::domain(host.as_bytes()).is_none() {
        return Err(UrlError::Malformed(format!(
            "'{}' is a public suffix, not a domain",
            host
        )));
    }

    Ok(host)
}
