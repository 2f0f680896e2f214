use super::CrawlHandler;
use crate::url::extract_domain;
use crate::{UrlError, UrlResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// A request to crawl a URL
///
/// The domain is derived once from the URL's host. Handlers are optional per
/// event kind; a request without one falls back to the crawler's hooks.
///
/// # Examples
///
/// ```
/// use silene::CrawlRequest;
///
/// let request = CrawlRequest::new("https://Example.com/docs")
///     .unwrap()
///     .with_priority(5)
///     .with_header("Accept-Language", "en");
///
/// assert_eq!(request.domain(), "example.com");
/// assert_eq!(request.priority(), 5);
/// ```
#[derive(Clone)]
pub struct CrawlRequest {
    url: String,
    domain: String,
    priority: i32,
    headers: HashMap<String, String>,
    redirect_handler: Option<Arc<dyn CrawlHandler>>,
    success_handler: Option<Arc<dyn CrawlHandler>>,
    error_handler: Option<Arc<dyn CrawlHandler>>,
}

impl CrawlRequest {
    /// Creates a request for an absolute http(s) URL
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlRequest)` - Request with priority 0, no headers and no handlers
    /// * `Err(UrlError)` - The URL does not parse, is not http(s), or has no host
    pub fn new(url: &str) -> UrlResult<Self> {
        let parsed = Url::parse(url).map_err(|e| UrlError::Parse(format!("{}: {}", url, e)))?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(UrlError::InvalidScheme(other.to_string())),
        }

        let domain = extract_domain(&parsed).ok_or(UrlError::MissingDomain)?;

        Ok(Self::unchecked(url, domain))
    }

    /// Request for the target of a redirect, whatever its scheme
    ///
    /// The domain is empty when the target has no host. The frontier refuses
    /// targets that are not [crawlable](CrawlRequest::is_crawlable).
    pub(crate) fn redirect_target(url: &str) -> Self {
        let domain = Url::parse(url)
            .ok()
            .and_then(|parsed| extract_domain(&parsed))
            .unwrap_or_default();
        Self::unchecked(url, domain)
    }

    fn unchecked(url: &str, domain: String) -> Self {
        Self {
            url: url.to_string(),
            domain,
            priority: 0,
            headers: HashMap::new(),
            redirect_handler: None,
            success_handler: None,
            error_handler: None,
        }
    }

    /// Whether the URL is an absolute http(s) URL with a host
    pub fn is_crawlable(&self) -> bool {
        Url::parse(&self.url).is_ok_and(|parsed| {
            matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()
        })
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn with_redirect_handler(mut self, handler: Arc<dyn CrawlHandler>) -> Self {
        self.redirect_handler = Some(handler);
        self
    }

    pub fn with_success_handler(mut self, handler: Arc<dyn CrawlHandler>) -> Self {
        self.success_handler = Some(handler);
        self
    }

    pub fn with_error_handler(mut self, handler: Arc<dyn CrawlHandler>) -> Self {
        self.error_handler = Some(handler);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Higher values are fetched first
    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn redirect_handler(&self) -> Option<&Arc<dyn CrawlHandler>> {
        self.redirect_handler.as_ref()
    }

    pub fn success_handler(&self) -> Option<&Arc<dyn CrawlHandler>> {
        self.success_handler.as_ref()
    }

    pub fn error_handler(&self) -> Option<&Arc<dyn CrawlHandler>> {
        self.error_handler.as_ref()
    }

    /// Fills the unset fields of this request from `other`
    ///
    /// The URL and domain always come from `self`. Priority, headers and each
    /// handler are taken from `self` when set (non-zero, non-empty, present)
    /// and from `other` otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use silene::CrawlRequest;
    ///
    /// let original = CrawlRequest::new("http://example.com/old").unwrap().with_priority(3);
    /// let target = CrawlRequest::new("http://example.com/new").unwrap();
    ///
    /// let merged = target.merge(&original);
    /// assert_eq!(merged.url(), "http://example.com/new");
    /// assert_eq!(merged.priority(), 3);
    /// ```
    pub fn merge(&self, other: &CrawlRequest) -> CrawlRequest {
        CrawlRequest {
            url: self.url.clone(),
            domain: self.domain.clone(),
            priority: if self.priority != 0 {
                self.priority
            } else {
                other.priority
            },
            headers: if self.headers.is_empty() {
                other.headers.clone()
            } else {
                self.headers.clone()
            },
            redirect_handler: self
                .redirect_handler
                .clone()
                .or_else(|| other.redirect_handler.clone()),
            success_handler: self
                .success_handler
                .clone()
                .or_else(|| other.success_handler.clone()),
            error_handler: self
                .error_handler
                .clone()
                .or_else(|| other.error_handler.clone()),
        }
    }
}

impl fmt::Display for CrawlRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CrawlRequest(url={}, domain={}, priority={})",
            self.url, self.domain, self.priority
        )
    }
}

impl fmt::Debug for CrawlRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlRequest")
            .field("url", &self.url)
            .field("domain", &self.domain)
            .field("priority", &self.priority)
            .field("headers", &self.headers)
            .field("redirect_handler", &self.redirect_handler.is_some())
            .field("success_handler", &self.success_handler.is_some())
            .field("error_handler", &self.error_handler.is_some())
            .finish()
    }
}
