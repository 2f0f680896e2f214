/// Checks if a request domain falls under an allowed domain
///
/// A domain matches when it is the allowed domain itself or any subdomain of it:
/// `domain == allowed || domain.ends_with("." + allowed)`.
///
/// # Examples
///
/// ```
/// use silene::url::matches_allowed_domain;
///
/// assert!(matches_allowed_domain("example.com", "example.com"));
/// assert!(matches_allowed_domain("example.com", "sub.example.com"));
/// assert!(!matches_allowed_domain("example.com", "notexample.com"));
/// ```
pub fn matches_allowed_domain(allowed: &str, candidate: &str) -> bool {
    if allowed.is_empty() {
        return false;
    }

    candidate == allowed
        || candidate
            .strip_suffix(allowed)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Checks a domain against every entry of an allow-list
pub fn is_allowed_domain(allowed_domains: &[String], candidate: &str) -> bool {
    allowed_domains
        .iter()
        .any(|allowed| matches_allowed_domain(allowed, candidate))
}
