//! Browser collaborator interface
//!
//! The crawler core never renders pages itself. It consumes a [`Browser`] that
//! can navigate tabs, answer DOM queries, manage cookies and, most importantly,
//! offer every outgoing navigation request to a [`NetworkInterceptor`] before it
//! is sent. This module defines that contract plus the value objects that cross
//! it; [`HttpBrowser`] is the bundled implementation.

mod cookie;
mod dom;
mod element;
mod http;

pub use cookie::Cookie;
pub use element::Element;
pub use http::{HttpBrowser, HttpBrowserSettings};

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default deadline for selector and navigation waits
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Errors raised by a browser collaborator
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Browser has not been launched")]
    NotLaunched,

    #[error("No page exists with index {0}")]
    NoSuchPage(usize),

    #[error("Unable to locate element using selector {0}")]
    NoSuchElement(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Timeout {timeout_ms}ms exceeded waiting for selector {selector}")]
    WaitTimeout { timeout_ms: u64, selector: String },

    #[error("Timeout {timeout_ms}ms exceeded waiting for navigation")]
    NavigationTimeout { timeout_ms: u64 },

    #[error("Cannot close the last page")]
    LastPage,

    #[error("Request to {url} was aborted")]
    Aborted { url: String },

    #[error("Too many redirects from {url}")]
    TooManyRedirects { url: String },

    #[error("Invalid cookie: {0}")]
    InvalidCookie(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// An outgoing network request, as offered to the interceptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequest {
    pub url: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    pub is_navigation: bool,

    /// URLs of the hops the browser already followed to reach this request
    pub redirect_chain: Vec<String>,
}

impl RawRequest {
    /// True when the browser is following a redirect on its own
    pub fn is_redirect_continuation(&self) -> bool {
        self.is_navigation && !self.redirect_chain.is_empty()
    }
}

/// A network response, as reported to the interceptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub url: String,
    pub status: u16,
    pub headers: HashMap<String, String>,
}

/// Changes applied to a request that is allowed to continue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOverrides {
    pub method: Option<String>,
    pub headers: Option<HashMap<String, String>>,
}

/// What the interceptor wants done with an outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptDecision {
    Continue(RequestOverrides),
    Abort,
}

/// Hook invoked by the browser for every request and response of a navigation
///
/// Decisions are returned synchronously so no request can slip through while a
/// decision is pending.
pub trait NetworkInterceptor: Send {
    fn on_request(&mut self, request: &RawRequest) -> InterceptDecision;

    fn on_response(&mut self, response: &RawResponse);
}

/// Interceptor that lets every request through untouched
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl NetworkInterceptor for PassThrough {
    fn on_request(&mut self, _request: &RawRequest) -> InterceptDecision {
        InterceptDecision::Continue(RequestOverrides::default())
    }

    fn on_response(&mut self, _response: &RawResponse) {}
}

/// Snapshot of an open browser tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserPage {
    pub index: usize,
    pub url: String,
    pub title: String,
}

impl BrowserPage {
    pub fn new(index: usize, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            index,
            url: url.into(),
            title: title.into(),
        }
    }
}

impl fmt::Display for BrowserPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BrowserPage(index={}, url={}, title={})",
            self.index, self.url, self.title
        )
    }
}

/// Options for [`Browser::wait_for_selector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Wait for the element to be present and visible
    pub visible: bool,

    /// Wait for the element to be absent or hidden
    pub hidden: bool,

    pub timeout: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            visible: false,
            hidden: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Capabilities the crawler consumes from a browser engine
///
/// Pages are addressed by their index in the browser's tab list. Every
/// operation that targets an element by selector fails with
/// [`BrowserError::NoSuchElement`] when the selector matches nothing.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Starts the browser with a single blank page at index 0
    async fn launch(&mut self) -> Result<(), BrowserError>;

    async fn close(&mut self) -> Result<(), BrowserError>;

    async fn pages(&self) -> Result<Vec<BrowserPage>, BrowserError>;

    async fn bring_to_front(&mut self, page: usize) -> Result<(), BrowserError>;

    /// Closes a page; closing the only remaining page is rejected
    async fn close_page(&mut self, page: usize) -> Result<(), BrowserError>;

    /// Navigates a page, routing every request and response through `interceptor`
    ///
    /// An [`InterceptDecision::Abort`] fails the navigation with
    /// [`BrowserError::Aborted`]. On success the final response is returned and
    /// its document becomes the page content.
    async fn navigate(
        &mut self,
        page: usize,
        url: &str,
        interceptor: &mut dyn NetworkInterceptor,
    ) -> Result<RawResponse, BrowserError>;

    /// Body text of the document currently loaded in a page
    async fn content(&self, page: usize) -> Result<String, BrowserError>;

    async fn title(&self, page: usize) -> Result<String, BrowserError>;

    async fn url(&self, page: usize) -> Result<String, BrowserError>;

    async fn click(
        &mut self,
        page: usize,
        selector: &str,
        click_count: u32,
    ) -> Result<(), BrowserError>;

    /// Clicks and waits for the navigation the click triggers
    async fn click_and_wait(
        &mut self,
        page: usize,
        selector: &str,
        click_count: u32,
        timeout: Duration,
    ) -> Result<(), BrowserError>;

    async fn evaluate(
        &self,
        page: usize,
        selector: &str,
        function: &str,
    ) -> Result<serde_json::Value, BrowserError>;

    async fn query_selector(
        &self,
        page: usize,
        selector: &str,
    ) -> Result<Option<Element>, BrowserError>;

    /// Selects options of a `<select>` element, returning the values selected
    async fn select(
        &mut self,
        page: usize,
        selector: &str,
        values: &[String],
    ) -> Result<Vec<String>, BrowserError>;

    async fn type_text(
        &mut self,
        page: usize,
        selector: &str,
        value: &str,
    ) -> Result<(), BrowserError>;

    async fn wait_for_selector(
        &self,
        page: usize,
        selector: &str,
        options: WaitOptions,
    ) -> Result<(), BrowserError>;

    async fn wait_for_timeout(&self, _page: usize, duration: Duration) -> Result<(), BrowserError> {
        tokio::time::sleep(duration).await;
        Ok(())
    }

    /// Cookies visible to the document loaded in a page
    async fn cookies(&self, page: usize) -> Result<Vec<Cookie>, BrowserError>;

    async fn set_cookie(&mut self, page: usize, cookie: &Cookie) -> Result<(), BrowserError>;

    async fn delete_cookie(&mut self, page: usize, cookie: &Cookie) -> Result<(), BrowserError>;
}
