//! Crawl frontier: admission control and priority scheduling
//!
//! The frontier holds every request waiting to be fetched. Admission applies
//! two filters in order:
//! 1. Duplicate filter: a request whose normalized URL was admitted before is
//!    rejected. Fingerprints are kept for the frontier's lifetime.
//! 2. Off-site filter: a request whose domain is not an allowed domain (or a
//!    subdomain of one) is rejected.
//!
//! Admitted requests are popped highest priority first; equal priorities come
//! out in admission order.

use super::CrawlRequest;
use crate::config::CrawlerConfiguration;
use crate::url::{fingerprint, is_allowed_domain, Fingerprint};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// A request waiting in the frontier
#[derive(Debug, Clone)]
struct QueuedRequest {
    priority: i32,

    /// Admission counter, used to keep equal priorities in FIFO order
    sequence: u64,
    request: CrawlRequest,
}

// Max-heap: higher priority first, then lower sequence first
impl Ord for QueuedRequest {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueuedRequest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedRequest {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for QueuedRequest {}

/// Priority queue of pending crawl requests with duplicate and off-site filtering
#[derive(Debug)]
pub struct CrawlFrontier {
    queue: BinaryHeap<QueuedRequest>,
    seen: HashSet<Fingerprint>,
    next_sequence: u64,
    filter_duplicate_requests: bool,
    filter_offsite_requests: bool,
    allowed_domains: Vec<String>,
}

impl CrawlFrontier {
    /// Creates a frontier and admits the configuration's seed requests in order
    ///
    /// Seeds go through the same filters as any other request.
    ///
    /// # Examples
    ///
    /// ```
    /// use silene::{CrawlFrontier, CrawlRequest, CrawlerConfiguration};
    ///
    /// let seeds = vec![
    ///     CrawlRequest::new("http://example.com/?a=1&b=2").unwrap(),
    ///     CrawlRequest::new("http://example.com/?b=2&a=1").unwrap(),
    /// ];
    /// let mut frontier = CrawlFrontier::new(&CrawlerConfiguration::new(seeds));
    ///
    /// assert!(frontier.next_request().is_some());
    /// assert!(!frontier.has_next_request());
    /// ```
    pub fn new(configuration: &CrawlerConfiguration) -> Self {
        let mut frontier = Self {
            queue: BinaryHeap::new(),
            seen: HashSet::new(),
            next_sequence: 0,
            filter_duplicate_requests: configuration.filter_duplicate_requests(),
            filter_offsite_requests: configuration.filter_offsite_requests(),
            allowed_domains: configuration.allowed_domains().to_vec(),
        };

        for request in configuration.seed_requests() {
            frontier.add_request(request.clone());
        }

        frontier
    }

    /// Offers a request to the frontier
    ///
    /// # Returns
    ///
    /// * `true` - The request was admitted
    /// * `false` - The request is not an http(s) URL, is a duplicate, or is off-site
    pub fn add_request(&mut self, request: CrawlRequest) -> bool {
        if !request.is_crawlable() {
            tracing::warn!("Rejecting request that cannot be crawled: {}", request);
            return false;
        }

        if self.filter_duplicate_requests {
            let Ok(fp) = fingerprint(request.url()) else {
                tracing::warn!("Rejecting request with unparsable URL: {}", request);
                return false;
            };

            if !self.seen.insert(fp) {
                tracing::debug!("Duplicate request filtered: {}", request);
                return false;
            }
        }

        if self.filter_offsite_requests && !is_allowed_domain(&self.allowed_domains, request.domain())
        {
            tracing::debug!("Off-site request filtered: {}", request);
            return false;
        }

        tracing::debug!("Request admitted: {}", request);
        self.queue.push(QueuedRequest {
            priority: request.priority(),
            sequence: self.next_sequence,
            request,
        });
        self.next_sequence += 1;

        true
    }

    pub fn has_next_request(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Pops the highest-priority pending request
    pub fn next_request(&mut self) -> Option<CrawlRequest> {
        self.queue.pop().map(|queued| queued.request)
    }

    /// Number of pending requests
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
