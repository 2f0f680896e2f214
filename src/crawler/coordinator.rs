//! Crawler - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the frontier to the browser:
//! - Popping requests from the frontier one at a time
//! - Running the two-phase (HEAD, then GET) fetch cycle for each request
//! - Classifying every cycle as a redirect, success or error
//! - Dispatching outcomes to per-request handlers or the crawler hooks
//! - Exposing page, DOM and cookie operations to those handlers

use super::fetch_cycle::{FetchCycle, FetchPhase};
use super::handler::DefaultHooks;
use super::{CrawlFrontier, CrawlHooks, CrawlRequest, CrawlResponse};
use crate::browser::{Browser, BrowserPage, Cookie, Element, WaitOptions};
use crate::config::CrawlerConfiguration;
use crate::{Result, SileneError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cloneable handle for requesting a cooperative stop
///
/// A stop only takes effect between fetch cycles; a cycle already in flight
/// runs to completion.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Browser-driven crawler
///
/// # Examples
///
/// ```no_run
/// use silene::{CrawlRequest, Crawler, CrawlerConfiguration, HttpBrowser};
///
/// # async fn example() -> silene::Result<()> {
/// let seeds = vec![CrawlRequest::new("https://example.com/")?];
/// let configuration = CrawlerConfiguration::builder(seeds)
///     .filter_offsite_requests(true)
///     .allowed_domains(vec!["example.com".to_string()])
///     .build()?;
///
/// let mut crawler = Crawler::new(configuration, Box::new(HttpBrowser::default()));
/// crawler.start().await?;
/// # Ok(())
/// # }
/// ```
pub struct Crawler {
    frontier: CrawlFrontier,
    browser: Box<dyn Browser>,
    hooks: Arc<dyn CrawlHooks>,
    running: bool,
    stop: StopHandle,

    /// Index of the page fetch cycles and facade operations act on
    page: usize,
}

impl Crawler {
    /// Creates a crawler whose frontier is seeded from `configuration`
    ///
    /// The crawler uses [`DefaultHooks`] until [`Crawler::with_hooks`] replaces them.
    pub fn new(configuration: CrawlerConfiguration, browser: Box<dyn Browser>) -> Self {
        Self::with_frontier(CrawlFrontier::new(&configuration), browser)
    }

    /// Creates a crawler around an existing frontier
    pub fn with_frontier(frontier: CrawlFrontier, browser: Box<dyn Browser>) -> Self {
        Self {
            frontier,
            browser,
            hooks: Arc::new(DefaultHooks),
            running: false,
            stop: StopHandle::default(),
            page: 0,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn CrawlHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frontier(&self) -> &CrawlFrontier {
        &self.frontier
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Requests a stop; the loop exits before the next fetch cycle
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Runs the crawl until the frontier is exhausted or a stop is requested
    ///
    /// This method:
    /// 1. Launches the browser and selects its first page
    /// 2. Calls the `on_start` hook
    /// 3. Runs one fetch cycle per request popped from the frontier
    /// 4. Calls the `on_stop` hook
    /// 5. Closes the browser and resets the running and stop flags
    ///
    /// The browser is closed and the flags are reset even when a handler or
    /// the browser fails; the first error is returned.
    pub async fn start(&mut self) -> Result<()> {
        if self.running {
            tracing::warn!("Crawler is already running");
            return Ok(());
        }

        self.browser.launch().await?;
        self.running = true;
        self.page = 0;

        let result = self.run_session().await;
        let closed = self.browser.close().await;

        self.running = false;
        self.stop.reset();

        result?;
        closed?;
        Ok(())
    }

    /// Offers a request to the frontier
    ///
    /// # Returns
    ///
    /// * `true` - The request was admitted
    /// * `false` - The request was filtered as a duplicate or as off-site
    pub fn crawl(&mut self, request: CrawlRequest) -> bool {
        self.frontier.add_request(request)
    }

    async fn run_session(&mut self) -> Result<()> {
        self.browser.bring_to_front(self.page).await?;

        let hooks = Arc::clone(&self.hooks);
        hooks.on_start(self).await?;
        self.run().await?;
        hooks.on_stop(self).await
    }

    async fn run(&mut self) -> Result<()> {
        while !self.stop.is_stop_requested() {
            let Some(request) = self.frontier.next_request() else {
                break;
            };
            self.fetch(request).await?;
        }

        if self.stop.is_stop_requested() {
            tracing::info!(
                "Stop requested, {} requests left in the frontier",
                self.frontier.len()
            );
        }
        Ok(())
    }

    /// Runs one fetch cycle
    async fn fetch(&mut self, request: CrawlRequest) -> Result<()> {
        tracing::debug!("Fetching {}", request);
        let mut cycle = FetchCycle::new(&request);

        // 1. Probe with HEAD; an aborted redirect continuation ends the cycle
        cycle.transition(FetchPhase::Probing)?;
        match self
            .browser
            .navigate(self.page, request.url(), &mut cycle)
            .await
        {
            Ok(_) => cycle.transition(FetchPhase::ProbeSucceeded)?,
            Err(e) if cycle.redirect_observed() => {
                tracing::debug!("Probe for {} stopped at a redirect: {}", request.url(), e);
                cycle.transition(FetchPhase::Redirected)?;
                return self.handle_redirect(request, &cycle).await;
            }
            Err(e) => return Err(e.into()),
        }

        // 2. Fetch with the real method
        cycle.transition(FetchPhase::Fetching)?;
        let raw = self
            .browser
            .navigate(self.page, request.url(), &mut cycle)
            .await?;
        let text = self.browser.content(self.page).await?;
        cycle.transition(FetchPhase::Completed)?;

        let response = CrawlResponse::new(request, raw.status, raw.headers, Some(text));
        self.handle_response(response).await
    }

    async fn handle_redirect(&mut self, request: CrawlRequest, cycle: &FetchCycle) -> Result<()> {
        let (Some(hop), Some(hop_response)) = (cycle.last_request(), cycle.last_response()) else {
            tracing::warn!("Redirect of {} was not preceded by a response", request);
            return Ok(());
        };

        let redirected = CrawlRequest::redirect_target(&hop.url).merge(&request);
        let response = CrawlResponse::new(
            request,
            hop_response.status,
            hop_response.headers.clone(),
            None,
        );

        match response.request().redirect_handler().cloned() {
            Some(handler) => {
                handler
                    .on_request_redirect(self, &response, &redirected)
                    .await?
            }
            None => {
                let hooks = Arc::clone(&self.hooks);
                hooks
                    .on_request_redirect(self, &response, &redirected)
                    .await?
            }
        }

        self.frontier.add_request(redirected);
        Ok(())
    }

    async fn handle_response(&mut self, response: CrawlResponse) -> Result<()> {
        if response.is_success() {
            match response.request().success_handler().cloned() {
                Some(handler) => handler.on_response_success(self, &response).await,
                None => {
                    let hooks = Arc::clone(&self.hooks);
                    hooks.on_response_success(self, &response).await
                }
            }
        } else {
            match response.request().error_handler().cloned() {
                Some(handler) => handler.on_response_error(self, &response).await,
                None => {
                    let hooks = Arc::clone(&self.hooks);
                    hooks.on_response_error(self, &response).await
                }
            }
        }
    }

    fn ensure_running(&self) -> Result<()> {
        if self.running {
            Ok(())
        } else {
            Err(SileneError::NotRunning)
        }
    }

    pub async fn click(&mut self, selector: &str, click_count: u32) -> Result<()> {
        self.ensure_running()?;
        Ok(self.browser.click(self.page, selector, click_count).await?)
    }

    pub async fn double_click(&mut self, selector: &str) -> Result<()> {
        self.click(selector, 2).await
    }

    /// Clicks an element and waits for the navigation it triggers
    pub async fn click_and_wait(
        &mut self,
        selector: &str,
        click_count: u32,
        timeout: Duration,
    ) -> Result<()> {
        self.ensure_running()?;
        Ok(self
            .browser
            .click_and_wait(self.page, selector, click_count, timeout)
            .await?)
    }

    /// Runs `function` against the first element matching `selector`
    pub async fn evaluate(&self, selector: &str, function: &str) -> Result<serde_json::Value> {
        self.ensure_running()?;
        Ok(self.browser.evaluate(self.page, selector, function).await?)
    }

    pub async fn find_element(&self, selector: &str) -> Result<Option<Element>> {
        self.ensure_running()?;
        Ok(self.browser.query_selector(self.page, selector).await?)
    }

    pub async fn select(&mut self, selector: &str, values: &[String]) -> Result<Vec<String>> {
        self.ensure_running()?;
        Ok(self.browser.select(self.page, selector, values).await?)
    }

    pub async fn type_text(&mut self, selector: &str, value: &str) -> Result<()> {
        self.ensure_running()?;
        Ok(self.browser.type_text(self.page, selector, value).await?)
    }

    pub async fn wait_for_selector(&self, selector: &str, options: WaitOptions) -> Result<()> {
        self.ensure_running()?;
        Ok(self
            .browser
            .wait_for_selector(self.page, selector, options)
            .await?)
    }

    pub async fn wait_for_timeout(&self, duration: Duration) -> Result<()> {
        self.ensure_running()?;
        Ok(self.browser.wait_for_timeout(self.page, duration).await?)
    }

    pub async fn get_title(&self) -> Result<String> {
        self.ensure_running()?;
        Ok(self.browser.title(self.page).await?)
    }

    pub async fn get_url(&self) -> Result<String> {
        self.ensure_running()?;
        Ok(self.browser.url(self.page).await?)
    }

    pub async fn get_current_page(&self) -> Result<BrowserPage> {
        self.ensure_running()?;
        let url = self.browser.url(self.page).await?;
        let title = self.browser.title(self.page).await?;
        Ok(BrowserPage::new(self.page, url, title))
    }

    pub async fn get_pages(&self) -> Result<Vec<BrowserPage>> {
        self.ensure_running()?;
        Ok(self.browser.pages().await?)
    }

    /// Makes `page` the page fetch cycles and facade operations act on
    pub async fn switch_to_page(&mut self, page: &BrowserPage) -> Result<()> {
        self.ensure_running()?;

        let count = self.browser.pages().await?.len();
        if page.index >= count {
            return Err(SileneError::NoSuchPage { index: page.index });
        }

        self.browser.bring_to_front(page.index).await?;
        self.page = page.index;
        Ok(())
    }

    /// Closes a page
    ///
    /// Closing the current page switches to the page before it.
    pub async fn close_page(&mut self, page: &BrowserPage) -> Result<()> {
        self.ensure_running()?;

        let count = self.browser.pages().await?.len();
        if count <= 1 {
            return Err(SileneError::LastPageClose);
        }
        if page.index >= count {
            return Err(SileneError::NoSuchPage { index: page.index });
        }

        self.browser.close_page(page.index).await?;

        if page.index < self.page {
            self.page -= 1;
        } else if page.index == self.page {
            self.page = self.page.saturating_sub(1);
            self.browser.bring_to_front(self.page).await?;
        }
        Ok(())
    }

    pub async fn get_cookies(&self) -> Result<Vec<Cookie>> {
        self.ensure_running()?;
        Ok(self.browser.cookies(self.page).await?)
    }

    pub async fn set_cookie(&mut self, cookie: &Cookie) -> Result<()> {
        self.ensure_running()?;
        Ok(self.browser.set_cookie(self.page, cookie).await?)
    }

    pub async fn delete_cookie(&mut self, cookie: &Cookie) -> Result<()> {
        self.ensure_running()?;
        Ok(self.browser.delete_cookie(self.page, cookie).await?)
    }
}
