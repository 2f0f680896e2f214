use super::CrawlRequest;
use std::collections::HashMap;
use std::fmt;

/// The outcome of a crawl request, paired with the request that produced it
#[derive(Debug, Clone)]
pub struct CrawlResponse {
    request: CrawlRequest,
    status: u16,
    headers: HashMap<String, String>,

    /// Body text; absent for redirect responses
    text: Option<String>,
}

impl CrawlResponse {
    pub fn new(
        request: CrawlRequest,
        status: u16,
        headers: HashMap<String, String>,
        text: Option<String>,
    ) -> Self {
        Self {
            request,
            status,
            headers,
            text,
        }
    }

    pub fn request(&self) -> &CrawlRequest {
        &self.request
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// True for statuses in 200..=299
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Display for CrawlResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CrawlResponse(url={}, status={})",
            self.request.url(),
            self.status
        )
    }
}
