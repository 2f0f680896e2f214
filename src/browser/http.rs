//! HTTP-backed browser
//!
//! [`HttpBrowser`] drives pages with a plain HTTP client instead of a rendering
//! engine. It follows redirects itself so that every hop is offered to the
//! network interceptor, keeps a cookie jar across tabs, and answers DOM queries
//! against the static document of each tab.

use super::dom::{self, FieldValue, StaticExpression};
use super::{
    Browser, BrowserError, BrowserPage, Cookie, Element, InterceptDecision, NetworkInterceptor,
    PassThrough, RawRequest, RawResponse, WaitOptions, DEFAULT_TIMEOUT,
};
use async_trait::async_trait;
use cookie_store::{CookieStore, RawCookie};
use reqwest::header::{HeaderMap, COOKIE, SET_COOKIE};
use reqwest::{redirect::Policy, Client, Method, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Redirect hops followed before a navigation is abandoned
const MAX_REDIRECTS: usize = 20;

const BLANK_PAGE: &str = "about:blank";

/// Settings for building the HTTP client behind [`HttpBrowser`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBrowserSettings {
    pub user_agent: String,

    /// Deadline for a single request, including reading the body
    pub navigation_timeout: Duration,
}

impl Default for HttpBrowserSettings {
    fn default() -> Self {
        Self {
            user_agent: format!("Silene/{}", env!("CARGO_PKG_VERSION")),
            navigation_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are never followed by the client; [`HttpBrowser`] follows them
/// hop by hop.
///
/// # Arguments
///
/// * `settings` - User agent and timeout to apply
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(settings: &HttpBrowserSettings) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(settings.user_agent.clone())
        .timeout(settings.navigation_timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

#[derive(Debug, Clone)]
struct Tab {
    url: String,
    body: String,

    /// Typed text and selections, keyed by element ordinal
    fields: HashMap<usize, FieldValue>,
}

impl Tab {
    fn blank() -> Self {
        Self {
            url: BLANK_PAGE.to_string(),
            body: String::new(),
            fields: HashMap::new(),
        }
    }
}

/// A [`Browser`] that fetches documents over HTTP and queries them statically
///
/// Scripts never run. `evaluate` understands simple property reads such as
/// `el => el.textContent` or `el => el.getAttribute('href')`, and clicks only
/// navigate when they land on a link.
///
/// # Examples
///
/// ```no_run
/// use silene::browser::{Browser, HttpBrowser, PassThrough};
///
/// # async fn example() -> Result<(), silene::browser::BrowserError> {
/// let mut browser = HttpBrowser::default();
/// browser.launch().await?;
/// let response = browser
///     .navigate(0, "https://example.com/", &mut PassThrough)
///     .await?;
/// println!("{} -> {}", response.url, response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct HttpBrowser {
    settings: HttpBrowserSettings,
    client: Option<Client>,
    tabs: Vec<Tab>,
    cookies: CookieStore,
}

impl HttpBrowser {
    pub fn new(settings: HttpBrowserSettings) -> Self {
        Self {
            settings,
            client: None,
            tabs: Vec::new(),
            cookies: CookieStore::default(),
        }
    }

    pub fn settings(&self) -> &HttpBrowserSettings {
        &self.settings
    }

    fn client(&self) -> Result<&Client, BrowserError> {
        self.client.as_ref().ok_or(BrowserError::NotLaunched)
    }

    fn tab(&self, page: usize) -> Result<&Tab, BrowserError> {
        self.client()?;
        self.tabs.get(page).ok_or(BrowserError::NoSuchPage(page))
    }

    fn tab_mut(&mut self, page: usize) -> Result<&mut Tab, BrowserError> {
        self.client()?;
        self.tabs.get_mut(page).ok_or(BrowserError::NoSuchPage(page))
    }

    fn locate(&self, page: usize, selector: &str) -> Result<dom::Located, BrowserError> {
        dom::locate(&self.tab(page)?.body, selector)?
            .ok_or_else(|| BrowserError::NoSuchElement(selector.to_string()))
    }

    fn cookie_header(&self, url: &Url) -> Option<String> {
        let pairs: Vec<String> = self
            .cookies
            .get_request_values(url)
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();

        (!pairs.is_empty()).then(|| pairs.join("; "))
    }

    /// URL a cookie is set or deleted against
    ///
    /// The page's own URL when it has a host, otherwise one built from the
    /// cookie's domain and path.
    fn cookie_url(&self, page: usize, cookie: &Cookie) -> Result<Url, BrowserError> {
        if cookie.name.is_empty() || cookie.name.contains(['=', ';']) {
            return Err(BrowserError::InvalidCookie(format!(
                "invalid cookie name {:?}",
                cookie.name
            )));
        }

        let page_url = Url::parse(&self.tab(page)?.url)?;
        if page_url.host_str().is_some() {
            return Ok(page_url);
        }

        let domain = cookie.domain.as_deref().ok_or_else(|| {
            BrowserError::InvalidCookie(format!(
                "cookie {} needs a domain on page {}",
                cookie.name, page_url
            ))
        })?;
        let scheme = if cookie.secure == Some(true) { "https" } else { "http" };
        let path = cookie.path.as_deref().unwrap_or("/");

        Ok(Url::parse(&format!(
            "{}://{}{}",
            scheme,
            domain.trim_start_matches('.'),
            path
        ))?)
    }

    /// Loads `url` into a tab, following redirects hop by hop
    async fn load(
        &mut self,
        page: usize,
        url: &str,
        interceptor: &mut dyn NetworkInterceptor,
    ) -> Result<RawResponse, BrowserError> {
        let client = self.client()?.clone();
        self.tab(page)?;

        let mut current = Url::parse(url)?;
        let mut method = Method::GET;
        let mut redirect_chain = Vec::new();

        loop {
            if redirect_chain.len() > MAX_REDIRECTS {
                return Err(BrowserError::TooManyRedirects {
                    url: url.to_string(),
                });
            }

            // 1. Offer the request to the interceptor
            let request = RawRequest {
                url: current.to_string(),
                method: method.to_string(),
                headers: HashMap::new(),
                is_navigation: true,
                redirect_chain: redirect_chain.clone(),
            };
            let overrides = match interceptor.on_request(&request) {
                InterceptDecision::Continue(overrides) => overrides,
                InterceptDecision::Abort => {
                    tracing::debug!("Request to {} aborted by interceptor", request.url);
                    return Err(BrowserError::Aborted { url: request.url });
                }
            };

            // 2. Apply overrides and send
            let sent_method = match overrides.method {
                Some(name) => Method::from_bytes(name.to_uppercase().as_bytes())
                    .map_err(|_| BrowserError::Unsupported(format!("HTTP method {}", name)))?,
                None => method.clone(),
            };

            let mut builder = client.request(sent_method.clone(), current.clone());
            for (name, value) in overrides.headers.unwrap_or_default() {
                builder = builder.header(name, value);
            }
            if let Some(cookies) = self.cookie_header(&current) {
                builder = builder.header(COOKIE, cookies);
            }

            tracing::debug!("{} {}", sent_method, current);
            let response = builder.send().await?;

            // 3. Record cookies and report the response
            let received: Vec<RawCookie<'static>> = response
                .headers()
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .filter_map(|header| RawCookie::parse(header.to_string()).ok())
                .map(RawCookie::into_owned)
                .collect();
            self.cookies
                .store_response_cookies(received.into_iter(), &current);

            let status = response.status();
            let raw = RawResponse {
                url: current.to_string(),
                status: status.as_u16(),
                headers: header_map(response.headers()),
            };
            interceptor.on_response(&raw);

            // 4. Follow redirects, or commit the document
            if status.is_redirection() {
                if let Some(location) = raw.headers.get("location") {
                    let next = current.join(location)?;
                    if status != StatusCode::TEMPORARY_REDIRECT
                        && status != StatusCode::PERMANENT_REDIRECT
                    {
                        method = Method::GET;
                    }
                    redirect_chain.push(current.to_string());
                    current = next;
                    continue;
                }
            }

            let body = if sent_method == Method::HEAD {
                String::new()
            } else {
                response.text().await?
            };

            let tab = self.tab_mut(page)?;
            tab.url = current.to_string();
            tab.body = body;
            tab.fields.clear();

            return Ok(raw);
        }
    }

    /// Clicks an element, returning the page a link navigation landed on
    async fn activate(
        &mut self,
        page: usize,
        selector: &str,
        click_count: u32,
    ) -> Result<Option<usize>, BrowserError> {
        let located = self.locate(page, selector)?;
        if click_count == 0 {
            return Ok(None);
        }

        let element = &located.element;
        let href = match element.attribute("href") {
            Some(href) if element.tag_name == "a" => href.trim(),
            _ => return Ok(None),
        };
        if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
            return Ok(None);
        }

        let target = Url::parse(&self.tab(page)?.url)?.join(href)?;
        let destination = if element.attribute("target") == Some("_blank") {
            self.tabs.push(Tab::blank());
            self.tabs.len() - 1
        } else {
            page
        };

        self.load(destination, target.as_str(), &mut PassThrough)
            .await?;

        Ok(Some(destination))
    }
}

fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
    let mut map: HashMap<String, String> = HashMap::new();

    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    map
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn launch(&mut self) -> Result<(), BrowserError> {
        self.client = Some(build_http_client(&self.settings)?);
        self.tabs = vec![Tab::blank()];
        self.cookies.clear();

        tracing::debug!("HTTP browser launched as {}", self.settings.user_agent);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.client = None;
        self.tabs.clear();
        self.cookies.clear();
        Ok(())
    }

    async fn pages(&self) -> Result<Vec<BrowserPage>, BrowserError> {
        self.client()?;

        Ok(self
            .tabs
            .iter()
            .enumerate()
            .map(|(index, tab)| BrowserPage::new(index, tab.url.clone(), dom::title(&tab.body)))
            .collect())
    }

    async fn bring_to_front(&mut self, page: usize) -> Result<(), BrowserError> {
        self.tab(page).map(|_| ())
    }

    async fn close_page(&mut self, page: usize) -> Result<(), BrowserError> {
        self.tab(page)?;
        if self.tabs.len() <= 1 {
            return Err(BrowserError::LastPage);
        }

        self.tabs.remove(page);
        Ok(())
    }

    async fn navigate(
        &mut self,
        page: usize,
        url: &str,
        interceptor: &mut dyn NetworkInterceptor,
    ) -> Result<RawResponse, BrowserError> {
        self.load(page, url, interceptor).await
    }

    async fn content(&self, page: usize) -> Result<String, BrowserError> {
        Ok(self.tab(page)?.body.clone())
    }

    async fn title(&self, page: usize) -> Result<String, BrowserError> {
        Ok(dom::title(&self.tab(page)?.body))
    }

    async fn url(&self, page: usize) -> Result<String, BrowserError> {
        Ok(self.tab(page)?.url.clone())
    }

    async fn click(
        &mut self,
        page: usize,
        selector: &str,
        click_count: u32,
    ) -> Result<(), BrowserError> {
        self.activate(page, selector, click_count).await.map(|_| ())
    }

    async fn click_and_wait(
        &mut self,
        page: usize,
        selector: &str,
        click_count: u32,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let timeout_ms = millis(timeout);

        match tokio::time::timeout(timeout, self.activate(page, selector, click_count)).await {
            Ok(Ok(Some(_))) => Ok(()),
            // A static document never navigates after the click itself
            Ok(Ok(None)) | Err(_) => Err(BrowserError::NavigationTimeout { timeout_ms }),
            Ok(Err(e)) => Err(e),
        }
    }

    async fn evaluate(
        &self,
        page: usize,
        selector: &str,
        function: &str,
    ) -> Result<serde_json::Value, BrowserError> {
        let located = self.locate(page, selector)?;
        let expression = StaticExpression::parse(function).ok_or_else(|| {
            BrowserError::Unsupported(format!("cannot evaluate {} without a script engine", function))
        })?;

        let field = self.tab(page)?.fields.get(&located.ordinal);
        expression.evaluate(&located, field)
    }

    async fn query_selector(
        &self,
        page: usize,
        selector: &str,
    ) -> Result<Option<Element>, BrowserError> {
        Ok(dom::locate(&self.tab(page)?.body, selector)?.map(|located| located.element))
    }

    async fn select(
        &mut self,
        page: usize,
        selector: &str,
        values: &[String],
    ) -> Result<Vec<String>, BrowserError> {
        let located = self.locate(page, selector)?;
        if located.element.tag_name != "select" {
            return Err(BrowserError::Unsupported(format!(
                "element {} is not a <select> element",
                selector
            )));
        }

        let mut chosen: Vec<String> = values
            .iter()
            .filter(|value| located.options.contains(value))
            .cloned()
            .collect();
        if located.element.attribute("multiple").is_none() {
            chosen.truncate(1);
        }

        self.tab_mut(page)?
            .fields
            .insert(located.ordinal, FieldValue::Selected(chosen.clone()));

        Ok(chosen)
    }

    async fn type_text(
        &mut self,
        page: usize,
        selector: &str,
        value: &str,
    ) -> Result<(), BrowserError> {
        let located = self.locate(page, selector)?;

        // Replaces whatever the field held before
        self.tab_mut(page)?
            .fields
            .insert(located.ordinal, FieldValue::Text(value.to_string()));

        Ok(())
    }

    async fn wait_for_selector(
        &self,
        page: usize,
        selector: &str,
        options: WaitOptions,
    ) -> Result<(), BrowserError> {
        let satisfied = |browser: &Self| -> Result<bool, BrowserError> {
            let located = dom::locate(&browser.tab(page)?.body, selector)?;
            Ok(match located {
                Some(found) if options.hidden => !found.is_visible(),
                None if options.hidden => true,
                Some(found) if options.visible => found.is_visible(),
                Some(_) => true,
                None => false,
            })
        };

        if satisfied(self)? {
            return Ok(());
        }

        tokio::time::sleep(options.timeout).await;
        if satisfied(self)? {
            return Ok(());
        }

        Err(BrowserError::WaitTimeout {
            timeout_ms: millis(options.timeout),
            selector: selector.to_string(),
        })
    }

    async fn cookies(&self, page: usize) -> Result<Vec<Cookie>, BrowserError> {
        let Ok(page_url) = Url::parse(&self.tab(page)?.url) else {
            return Ok(Vec::new());
        };

        Ok(self
            .cookies
            .matches(&page_url)
            .into_iter()
            .map(Cookie::from)
            .collect())
    }

    async fn set_cookie(&mut self, page: usize, cookie: &Cookie) -> Result<(), BrowserError> {
        let url = self.cookie_url(page, cookie)?;
        let raw = cookie
            .to_raw()
            .map_err(|e| BrowserError::InvalidCookie(format!("{}: {}", cookie.name, e)))?;

        self.cookies
            .insert_raw(&raw, &url)
            .map_err(|e| BrowserError::InvalidCookie(format!("{}: {}", cookie.name, e)))?;
        Ok(())
    }

    async fn delete_cookie(&mut self, page: usize, cookie: &Cookie) -> Result<(), BrowserError> {
        let url = self.cookie_url(page, cookie)?;
        let wanted_domain = cookie
            .domain
            .as_deref()
            .map(|domain| domain.trim_start_matches('.').to_lowercase());

        // Jar keys of every visible cookie with this name, narrowed by the
        // domain and path the caller named
        let doomed: Vec<(String, String)> = self
            .cookies
            .matches(&url)
            .into_iter()
            .filter(|stored| stored.name() == cookie.name)
            .map(|stored| (String::from(&stored.domain), String::from(&stored.path)))
            .filter(|(domain, path)| {
                wanted_domain.as_deref().map_or(true, |wanted| wanted == domain)
                    && cookie.path.as_deref().map_or(true, |wanted| wanted == path)
            })
            .collect();

        for (domain, path) in doomed {
            self.cookies.remove(&domain, &path, &cookie.name);
        }
        Ok(())
    }
}
