//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive the full
//! fetch cycle end-to-end through the bundled HTTP browser.

use async_trait::async_trait;
use silene::config::parse_config;
use silene::{
    Cookie, CrawlHandler, CrawlHooks, CrawlRequest, CrawlResponse, Crawler, CrawlerConfiguration,
    HttpBrowser, SileneError,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Start,
    Stop,
    Redirect {
        url: String,
        status: u16,
        text: Option<String>,
        location: Option<String>,
        target: String,
    },
    Success {
        url: String,
        status: u16,
        text: String,
    },
    Error {
        url: String,
        status: u16,
    },
}

/// Hooks that record every callback they receive
#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl CrawlHandler for Recorder {
    async fn on_request_redirect(
        &self,
        _crawler: &mut Crawler,
        response: &CrawlResponse,
        redirected_request: &CrawlRequest,
    ) -> silene::Result<()> {
        self.record(Event::Redirect {
            url: response.request().url().to_string(),
            status: response.status(),
            text: response.text().map(str::to_string),
            location: response.headers().get("location").cloned(),
            target: redirected_request.url().to_string(),
        });
        Ok(())
    }

    async fn on_response_success(
        &self,
        _crawler: &mut Crawler,
        response: &CrawlResponse,
    ) -> silene::Result<()> {
        self.record(Event::Success {
            url: response.request().url().to_string(),
            status: response.status(),
            text: response.text().unwrap_or_default().to_string(),
        });
        Ok(())
    }

    async fn on_response_error(
        &self,
        _crawler: &mut Crawler,
        response: &CrawlResponse,
    ) -> silene::Result<()> {
        self.record(Event::Error {
            url: response.request().url().to_string(),
            status: response.status(),
        });
        Ok(())
    }
}

#[async_trait]
impl CrawlHooks for Recorder {
    async fn on_start(&self, _crawler: &mut Crawler) -> silene::Result<()> {
        self.record(Event::Start);
        Ok(())
    }

    async fn on_stop(&self, _crawler: &mut Crawler) -> silene::Result<()> {
        self.record(Event::Stop);
        Ok(())
    }
}

/// Mounts a HEAD and a GET mock for an HTML page, each expected exactly once
async fn serve_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .expect(1)
        .mount(server)
        .await;
}

fn request(server: &MockServer, route: &str) -> CrawlRequest {
    CrawlRequest::new(&format!("{}{}", server.uri(), route)).unwrap()
}

fn crawler_with(seeds: Vec<CrawlRequest>, hooks: Arc<dyn CrawlHooks>) -> Crawler {
    Crawler::new(
        CrawlerConfiguration::new(seeds),
        Box::new(HttpBrowser::default()),
    )
    .with_hooks(hooks)
}

#[tokio::test]
async fn test_successful_request_is_probed_then_fetched() {
    let server = MockServer::start().await;
    serve_page(&server, "/page", "Test").await;

    let recorder = Arc::new(Recorder::default());
    let seed = request(&server, "/page");
    let url = seed.url().to_string();

    let mut crawler = crawler_with(vec![seed], recorder.clone());
    crawler.start().await.unwrap();

    assert_eq!(
        recorder.events(),
        vec![
            Event::Start,
            Event::Success {
                url,
                status: 200,
                text: "Test".to_string(),
            },
            Event::Stop,
        ]
    );
    assert!(!crawler.is_running());
}

#[tokio::test]
async fn test_redirect_is_reported_and_target_crawled() {
    let server = MockServer::start().await;
    let target_url = format!("{}/target", server.uri());

    Mock::given(method("HEAD"))
        .and(path("/redirect"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", target_url.as_str()))
        .expect(1)
        .mount(&server)
        .await;

    // The redirected URL itself is never fetched with GET
    Mock::given(method("GET"))
        .and(path("/redirect"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    serve_page(&server, "/target", "").await;

    let recorder = Arc::new(Recorder::default());
    let seed = request(&server, "/redirect");
    let redirect_url = seed.url().to_string();

    let mut crawler = crawler_with(vec![seed], recorder.clone());
    crawler.start().await.unwrap();

    assert_eq!(
        recorder.events(),
        vec![
            Event::Start,
            Event::Redirect {
                url: redirect_url,
                status: 301,
                text: None,
                location: Some(target_url.clone()),
                target: target_url.clone(),
            },
            Event::Success {
                url: target_url,
                status: 200,
                text: String::new(),
            },
            Event::Stop,
        ]
    );
}

#[tokio::test]
async fn test_error_status_goes_to_error_handler() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let recorder = Arc::new(Recorder::default());
    let seed = request(&server, "/broken");
    let url = seed.url().to_string();

    let mut crawler = crawler_with(vec![seed], recorder.clone());
    crawler.start().await.unwrap();

    assert_eq!(
        recorder.events(),
        vec![Event::Start, Event::Error { url, status: 500 }, Event::Stop]
    );
}

#[tokio::test]
async fn test_request_headers_are_sent_in_both_phases() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/page"))
        .and(header("foo", "bar"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("foo", "bar"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let recorder = Arc::new(Recorder::default());
    let seed = request(&server, "/page").with_header("foo", "bar");

    let mut crawler = crawler_with(vec![seed], recorder.clone());
    crawler.start().await.unwrap();

    assert!(matches!(
        recorder.events().as_slice(),
        [Event::Start, Event::Success { status: 200, .. }, Event::Stop]
    ));
}

#[tokio::test]
async fn test_duplicate_seeds_are_fetched_once() {
    let server = MockServer::start().await;
    serve_page(&server, "/page", "Test").await;

    let recorder = Arc::new(Recorder::default());
    let seeds = vec![
        request(&server, "/page?b=2&a=1"),
        request(&server, "/page?a=1&b=2"),
    ];

    let mut crawler = crawler_with(seeds, recorder.clone());
    crawler.start().await.unwrap();

    let successes = recorder
        .events()
        .into_iter()
        .filter(|event| matches!(event, Event::Success { .. }))
        .count();
    assert_eq!(successes, 1);
}

/// Success handler that admits one follow-up request
struct FollowUp {
    next: Mutex<Option<CrawlRequest>>,
    admitted: Mutex<Option<bool>>,
}

#[async_trait]
impl CrawlHandler for FollowUp {
    async fn on_response_success(
        &self,
        crawler: &mut Crawler,
        _response: &CrawlResponse,
    ) -> silene::Result<()> {
        let next = self.next.lock().unwrap().take();
        if let Some(next) = next {
            let admitted = crawler.crawl(next);
            *self.admitted.lock().unwrap() = Some(admitted);
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_request_handler_can_crawl_follow_up() {
    let server = MockServer::start().await;
    serve_page(&server, "/first", "first").await;
    serve_page(&server, "/second", "second").await;

    let follow_up = Arc::new(FollowUp {
        next: Mutex::new(Some(request(&server, "/second"))),
        admitted: Mutex::new(None),
    });
    let recorder = Arc::new(Recorder::default());
    let seed = request(&server, "/first").with_success_handler(follow_up.clone());
    let second_url = format!("{}/second", server.uri());

    let mut crawler = crawler_with(vec![seed], recorder.clone());
    crawler.start().await.unwrap();

    assert_eq!(*follow_up.admitted.lock().unwrap(), Some(true));

    // The first page went to its own handler, the second to the hooks
    assert_eq!(
        recorder.events(),
        vec![
            Event::Start,
            Event::Success {
                url: second_url,
                status: 200,
                text: "second".to_string(),
            },
            Event::Stop,
        ]
    );
}

/// Stops the crawl after the first successful response
struct StopAfterFirst;

#[async_trait]
impl CrawlHandler for StopAfterFirst {
    async fn on_response_success(
        &self,
        crawler: &mut Crawler,
        _response: &CrawlResponse,
    ) -> silene::Result<()> {
        crawler.stop();
        Ok(())
    }
}

impl CrawlHooks for StopAfterFirst {}

#[tokio::test]
async fn test_stop_leaves_remaining_requests_in_frontier() {
    let server = MockServer::start().await;
    serve_page(&server, "/first", "first").await;

    Mock::given(method("HEAD"))
        .and(path("/second"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let seeds = vec![request(&server, "/first"), request(&server, "/second")];
    let mut crawler = crawler_with(seeds, Arc::new(StopAfterFirst));
    crawler.start().await.unwrap();

    assert_eq!(crawler.frontier().len(), 1);
    assert!(!crawler.stop_handle().is_stop_requested());
}

/// Runs page operations from the success handler and records what they return
#[derive(Default)]
struct PageProbe {
    observed: Mutex<Vec<String>>,
}

impl PageProbe {
    fn observe(&self, value: impl Into<String>) {
        self.observed.lock().unwrap().push(value.into());
    }

    fn observed(&self) -> Vec<String> {
        self.observed.lock().unwrap().clone()
    }
}

#[async_trait]
impl CrawlHandler for PageProbe {
    async fn on_response_success(
        &self,
        crawler: &mut Crawler,
        _response: &CrawlResponse,
    ) -> silene::Result<()> {
        self.observe(crawler.get_title().await?);
        self.observe(crawler.get_url().await?);

        let page = crawler.get_current_page().await?;
        self.observe(page.to_string());

        let text = crawler
            .evaluate("#test", "element => element.textContent")
            .await?;
        self.observe(text.as_str().unwrap_or_default());

        let element = crawler.find_element("#test").await?;
        self.observe(format!("{:?}", element.map(|e| (e.tag_name, e.text))));

        let missing = crawler.find_element("#nonexistent").await?;
        self.observe(format!("{:?}", missing.map(|e| e.tag_name)));

        let err = crawler
            .evaluate("#nonexistent", "element => element.textContent")
            .await
            .unwrap_err();
        self.observe(err.to_string());

        Ok(())
    }
}

impl CrawlHooks for PageProbe {}

#[tokio::test]
async fn test_page_inspection_from_handler() {
    let server = MockServer::start().await;
    serve_page(
        &server,
        "/page",
        "<title>Test title</title><div id=\"test\">Test</div>",
    )
    .await;

    let probe = Arc::new(PageProbe::default());
    let seed = request(&server, "/page");
    let url = seed.url().to_string();

    let mut crawler = crawler_with(vec![seed], probe.clone());
    crawler.start().await.unwrap();

    assert_eq!(
        probe.observed(),
        vec![
            "Test title".to_string(),
            url.clone(),
            format!("BrowserPage(index=0, url={}, title=Test title)", url),
            "Test".to_string(),
            "Some((\"div\", \"Test\"))".to_string(),
            "None".to_string(),
            "Unable to locate element using selector #nonexistent".to_string(),
        ]
    );
}

/// Clicks a link and reports where the page ended up
#[derive(Default)]
struct ClickThrough {
    observed: Mutex<Vec<String>>,
}

#[async_trait]
impl CrawlHandler for ClickThrough {
    async fn on_response_success(
        &self,
        crawler: &mut Crawler,
        _response: &CrawlResponse,
    ) -> silene::Result<()> {
        crawler.click("#link", 1).await?;
        let url = crawler.get_url().await?;

        let missing = crawler.click("#nonexistent", 1).await.unwrap_err();

        let mut observed = self.observed.lock().unwrap();
        observed.push(url);
        observed.push(missing.to_string());
        Ok(())
    }
}

impl CrawlHooks for ClickThrough {}

#[tokio::test]
async fn test_click_follows_link() {
    let server = MockServer::start().await;
    serve_page(&server, "/first", "<a id=\"link\" href=\"/second\">Next</a>").await;

    // Clicking navigates without the HEAD probe
    Mock::given(method("GET"))
        .and(path("/second"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>Second</p>", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let clicker = Arc::new(ClickThrough::default());
    let mut crawler = crawler_with(vec![request(&server, "/first")], clicker.clone());
    crawler.start().await.unwrap();

    assert_eq!(
        *clicker.observed.lock().unwrap(),
        vec![
            format!("{}/second", server.uri()),
            "Unable to locate element using selector #nonexistent".to_string(),
        ]
    );
}

/// Opens a second tab, switches to it, closes it, and records what it saw
#[derive(Default)]
struct TabJuggler {
    before_close: Mutex<Vec<(usize, String, String)>>,
    switched_title: Mutex<Option<String>>,
    current_after_close: Mutex<Option<usize>>,
    after_close: Mutex<Vec<(usize, String, String)>>,
    last_page_error: Mutex<Option<String>>,
}

#[async_trait]
impl CrawlHandler for TabJuggler {
    async fn on_response_success(
        &self,
        crawler: &mut Crawler,
        _response: &CrawlResponse,
    ) -> silene::Result<()> {
        crawler
            .click_and_wait("#link", 1, Duration::from_millis(500))
            .await?;

        let pages = crawler.get_pages().await?;
        *self.before_close.lock().unwrap() = pages
            .iter()
            .map(|p| (p.index, p.url.clone(), p.title.clone()))
            .collect();

        crawler.switch_to_page(&pages[1]).await?;
        *self.switched_title.lock().unwrap() = Some(crawler.get_title().await?);

        // Closing the current page falls back to the one before it
        crawler.close_page(&pages[1]).await?;
        let current = crawler.get_current_page().await?;
        *self.current_after_close.lock().unwrap() = Some(current.index);

        let pages = crawler.get_pages().await?;
        *self.after_close.lock().unwrap() = pages
            .iter()
            .map(|p| (p.index, p.url.clone(), p.title.clone()))
            .collect();

        let err = crawler.close_page(&pages[0]).await.unwrap_err();
        *self.last_page_error.lock().unwrap() = Some(err.to_string());
        Ok(())
    }
}

impl CrawlHooks for TabJuggler {}

#[tokio::test]
async fn test_link_with_blank_target_opens_page() {
    let server = MockServer::start().await;
    let first_url = format!("{}/first", server.uri());
    let second_url = format!("{}/second", server.uri());

    serve_page(
        &server,
        "/first",
        &format!(
            "<title>First page</title><a id=\"link\" href=\"{}\" target=\"_blank\">Go</a>",
            second_url
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/second"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<title>Second page</title>", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let juggler = Arc::new(TabJuggler::default());
    let mut crawler = crawler_with(vec![request(&server, "/first")], juggler.clone());
    crawler.start().await.unwrap();

    assert_eq!(
        *juggler.before_close.lock().unwrap(),
        vec![
            (0, first_url.clone(), "First page".to_string()),
            (1, second_url, "Second page".to_string()),
        ]
    );
    assert_eq!(
        juggler.switched_title.lock().unwrap().as_deref(),
        Some("Second page")
    );
    assert_eq!(*juggler.current_after_close.lock().unwrap(), Some(0));
    assert_eq!(
        *juggler.after_close.lock().unwrap(),
        vec![(0, first_url, "First page".to_string())]
    );
    assert_eq!(
        juggler.last_page_error.lock().unwrap().as_deref(),
        Some("Cannot close the last page")
    );
}

/// Fills in a form and reads the field values back
#[derive(Default)]
struct FormFiller {
    observed: Mutex<Vec<serde_json::Value>>,
}

#[async_trait]
impl CrawlHandler for FormFiller {
    async fn on_response_success(
        &self,
        crawler: &mut Crawler,
        _response: &CrawlResponse,
    ) -> silene::Result<()> {
        let selected = crawler
            .select("#choice", &["foo".to_string(), "baz".to_string()])
            .await?;

        crawler.type_text("#query", "crawler").await?;
        let typed = crawler.evaluate("#query", "el => el.value").await?;

        let mut observed = self.observed.lock().unwrap();
        observed.push(serde_json::json!(selected));
        observed.push(typed);
        Ok(())
    }
}

impl CrawlHooks for FormFiller {}

#[tokio::test]
async fn test_form_interaction() {
    let server = MockServer::start().await;
    serve_page(
        &server,
        "/form",
        r#"<select id="choice" multiple>
               <option value="foo">foo</option>
               <option value="bar">bar</option>
               <option value="baz">baz</option>
           </select>
           <input id="query" value="rust">"#,
    )
    .await;

    let filler = Arc::new(FormFiller::default());
    let mut crawler = crawler_with(vec![request(&server, "/form")], filler.clone());
    crawler.start().await.unwrap();

    assert_eq!(
        *filler.observed.lock().unwrap(),
        vec![serde_json::json!(["foo", "baz"]), serde_json::json!("crawler")]
    );
}

#[derive(Clone, Copy)]
enum CookieStep {
    Set,
    CountAndDelete,
    Count,
}

/// Per-request success handler for one step of the cookie scenario
struct CookieHandler {
    step: CookieStep,
    counts: Arc<Mutex<Vec<usize>>>,
}

#[async_trait]
impl CrawlHandler for CookieHandler {
    async fn on_response_success(
        &self,
        crawler: &mut Crawler,
        _response: &CrawlResponse,
    ) -> silene::Result<()> {
        let cookie = Cookie::new("cookie_name", "cookie_value");

        match self.step {
            CookieStep::Set => crawler.set_cookie(&cookie).await?,
            CookieStep::CountAndDelete => {
                let count = crawler.get_cookies().await?.len();
                self.counts.lock().unwrap().push(count);
                crawler.delete_cookie(&cookie).await?;
            }
            CookieStep::Count => {
                let count = crawler.get_cookies().await?.len();
                self.counts.lock().unwrap().push(count);
            }
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_cookies_are_set_sent_and_deleted() {
    let server = MockServer::start().await;
    serve_page(&server, "/first", "").await;
    serve_page(&server, "/third", "").await;

    Mock::given(method("HEAD"))
        .and(path("/second"))
        .and(header("cookie", "cookie_name=cookie_value"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/second"))
        .and(header("cookie", "cookie_name=cookie_value"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let counts = Arc::new(Mutex::new(Vec::new()));
    let step = |step| {
        Arc::new(CookieHandler {
            step,
            counts: counts.clone(),
        })
    };
    let seeds = vec![
        request(&server, "/first").with_success_handler(step(CookieStep::Set)),
        request(&server, "/second").with_success_handler(step(CookieStep::CountAndDelete)),
        request(&server, "/third").with_success_handler(step(CookieStep::Count)),
    ];

    let recorder = Arc::new(Recorder::default());
    let mut crawler = crawler_with(seeds, recorder.clone());
    crawler.start().await.unwrap();

    assert_eq!(*counts.lock().unwrap(), vec![1, 0]);
    assert!(!recorder
        .events()
        .iter()
        .any(|event| matches!(event, Event::Error { .. })));
}

/// Records the cookies visible to the page
#[derive(Default)]
struct CookieReader {
    cookies: Mutex<Vec<Cookie>>,
}

#[async_trait]
impl CrawlHandler for CookieReader {
    async fn on_response_success(
        &self,
        crawler: &mut Crawler,
        _response: &CrawlResponse,
    ) -> silene::Result<()> {
        *self.cookies.lock().unwrap() = crawler.get_cookies().await?;
        Ok(())
    }
}

impl CrawlHooks for CookieReader {}

#[tokio::test]
async fn test_cookies_from_response() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "cookie_name=cookie_value"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let reader = Arc::new(CookieReader::default());
    let mut crawler = crawler_with(vec![request(&server, "/page")], reader.clone());
    crawler.start().await.unwrap();

    let cookies = reader.cookies.lock().unwrap().clone();
    assert_eq!(cookies.len(), 1);

    let cookie = &cookies[0];
    assert_eq!(cookie.name, "cookie_name");
    assert_eq!(cookie.value, "cookie_value");
    assert_eq!(cookie.domain.as_deref(), Some("127.0.0.1"));
    assert_eq!(cookie.path.as_deref(), Some("/"));
    assert_eq!(cookie.expires, Some(-1));
    assert_eq!(cookie.session, Some(true));
    assert!(!cookie.http_only.unwrap_or(false));
    assert!(!cookie.secure.unwrap_or(false));
    assert_eq!(cookie.same_site, None);
}

#[tokio::test]
async fn test_page_operations_require_running_crawler() {
    let crawler = Crawler::new(
        CrawlerConfiguration::new(Vec::new()),
        Box::new(HttpBrowser::default()),
    );

    assert!(matches!(
        crawler.get_url().await,
        Err(SileneError::NotRunning)
    ));
    assert!(matches!(
        crawler.find_element("#test").await,
        Err(SileneError::NotRunning)
    ));
}

#[tokio::test]
async fn test_offsite_requests_are_not_fetched() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let configuration = CrawlerConfiguration::builder(vec![request(&server, "/page")])
        .filter_offsite_requests(true)
        .allowed_domains(vec!["example.com".to_string()])
        .build()
        .unwrap();
    let recorder = Arc::new(Recorder::default());
    let mut crawler =
        Crawler::new(configuration, Box::new(HttpBrowser::default())).with_hooks(recorder.clone());

    assert!(crawler.frontier().is_empty());
    assert!(!crawler.crawl(request(&server, "/other")));

    crawler.start().await.unwrap();
    assert_eq!(recorder.events(), vec![Event::Start, Event::Stop]);
}

#[test]
fn test_invalid_allowed_domain_is_rejected() {
    let err = CrawlerConfiguration::builder(Vec::new())
        .allowed_domains(vec!["invalid".to_string()])
        .build()
        .unwrap_err();

    assert_eq!(err.to_string(), "Could not extract a valid domain from invalid");
}

#[tokio::test]
async fn test_crawl_from_toml_configuration() {
    let server = MockServer::start().await;
    serve_page(&server, "/low", "low").await;
    serve_page(&server, "/high", "high").await;

    let config = parse_config(&format!(
        r#"
[browser]
user-agent = "TestBot/1.0"
navigation-timeout-ms = 5000

[[seed]]
url = "{uri}/low"

[[seed]]
url = "{uri}/high"
priority = 10
"#,
        uri = server.uri()
    ))
    .unwrap();

    let recorder = Arc::new(Recorder::default());
    let mut crawler = Crawler::new(
        config.crawler_configuration().unwrap(),
        Box::new(HttpBrowser::new(config.browser_settings())),
    )
    .with_hooks(recorder.clone());
    crawler.start().await.unwrap();

    let texts: Vec<String> = recorder
        .events()
        .into_iter()
        .filter_map(|event| match event {
            Event::Success { text, .. } => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["high".to_string(), "low".to_string()]);
}
