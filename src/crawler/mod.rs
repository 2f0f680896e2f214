//! Crawler module for scheduling and fetching crawl requests
//!
//! This module contains the core crawling logic, including:
//! - Crawl request and response value objects
//! - The frontier with duplicate and off-site filtering
//! - The two-phase fetch cycle and its state machine
//! - Handler interfaces and the crawl loop

mod coordinator;
mod fetch_cycle;
mod frontier;
mod handler;
mod request;
mod response;

pub use coordinator::{Crawler, StopHandle};
pub use fetch_cycle::{FetchCycle, FetchPhase, PROBE_METHOD};
pub use frontier::CrawlFrontier;
pub use handler::{CrawlHandler, CrawlHooks, DefaultHooks};
pub use request::CrawlRequest;
pub use response::CrawlResponse;

