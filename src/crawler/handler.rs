//! Handler interfaces for crawl outcomes
//!
//! Every classified outcome of a fetch cycle (redirect, success, error) is
//! routed to the handler carried by the request for that event kind, or to
//! the crawler-level [`CrawlHooks`] when the request carries none. The default
//! implementations only log.

use super::{CrawlRequest, CrawlResponse, Crawler};
use crate::Result;
use async_trait::async_trait;

/// Callbacks for the outcome of a single crawl request
///
/// Handlers get mutable access to the running crawler, so they can inspect the
/// page, interact with it, or admit follow-up requests with
/// [`Crawler::crawl`]. An error returned from a handler aborts the crawl loop.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use silene::{CrawlHandler, CrawlRequest, CrawlResponse, Crawler};
///
/// struct FollowLinks;
///
/// #[async_trait]
/// impl CrawlHandler for FollowLinks {
///     async fn on_response_success(
///         &self,
///         crawler: &mut Crawler,
///         response: &CrawlResponse,
///     ) -> silene::Result<()> {
///         let href = crawler.evaluate("a", "a => a.href").await?;
///         if let Some(href) = href.as_str() {
///             let next = response.request().url().to_string() + href;
///             if let Ok(request) = CrawlRequest::new(&next) {
///                 crawler.crawl(request);
///             }
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait CrawlHandler: Send + Sync {
    /// Called when the probe for a request was redirected
    ///
    /// `response` carries the original request with the redirect status and
    /// headers; `redirected_request` targets the redirect location and is
    /// admitted to the frontier after this returns.
    async fn on_request_redirect(
        &self,
        _crawler: &mut Crawler,
        response: &CrawlResponse,
        redirected_request: &CrawlRequest,
    ) -> Result<()> {
        tracing::info!(
            "Request redirect: {} -> {}",
            response.request(),
            redirected_request
        );
        Ok(())
    }

    /// Called when the GET for a request returned a 2xx status
    async fn on_response_success(
        &self,
        _crawler: &mut Crawler,
        response: &CrawlResponse,
    ) -> Result<()> {
        tracing::info!("Response success: {}", response);
        Ok(())
    }

    /// Called when the GET for a request returned any other status
    async fn on_response_error(&self, _crawler: &mut Crawler, response: &CrawlResponse) -> Result<()> {
        tracing::info!("Response error: {}", response);
        Ok(())
    }
}

/// Crawler-level hooks: lifecycle callbacks plus the default outcome handlers
#[async_trait]
pub trait CrawlHooks: CrawlHandler {
    /// Called once the browser is up, before the first request is fetched
    async fn on_start(&self, _crawler: &mut Crawler) -> Result<()> {
        tracing::info!("Crawler is starting");
        Ok(())
    }

    /// Called after the main loop ends, while the browser is still open
    async fn on_stop(&self, _crawler: &mut Crawler) -> Result<()> {
        tracing::info!("Crawler is stopping");
        Ok(())
    }
}

/// Hooks that only log
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

impl CrawlHandler for DefaultHooks {}

impl CrawlHooks for DefaultHooks {}
