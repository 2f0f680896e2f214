//! Silene: a programmable, browser-driven web crawler
//!
//! This crate schedules crawl requests through a priority frontier with duplicate
//! and off-site filtering, and drives a browser collaborator through a two-phase
//! (HEAD-then-GET) fetch protocol that surfaces redirects as explicit events.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod url;

use thiserror::Error;

/// Main error type for Silene operations
#[derive(Debug, Error)]
pub enum SileneError {
    #[error("Crawler is not running")]
    NotRunning,

    #[error("No page exists with index {index}")]
    NoSuchPage { index: usize },

    #[error("Unable to locate element using selector {selector}")]
    NoSuchElement { selector: String },

    #[error("Timeout {timeout_ms}ms exceeded waiting for selector {selector}")]
    WaitTimeout { timeout_ms: u64, selector: String },

    #[error("Timeout {timeout_ms}ms exceeded waiting for navigation")]
    NavigationTimeout { timeout_ms: u64 },

    #[error("Cannot close the last page")]
    LastPageClose,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Browser error: {0}")]
    Browser(browser::BrowserError),

    #[error("Invalid fetch phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: crawler::FetchPhase,
        to: crawler::FetchPhase,
    },

    #[error("Handler error: {0}")]
    Handler(#[from] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<browser::BrowserError> for SileneError {
    fn from(error: browser::BrowserError) -> Self {
        use browser::BrowserError;

        match error {
            BrowserError::NoSuchPage(index) => Self::NoSuchPage { index },
            BrowserError::NoSuchElement(selector) => Self::NoSuchElement { selector },
            BrowserError::WaitTimeout {
                timeout_ms,
                selector,
            } => Self::WaitTimeout {
                timeout_ms,
                selector,
            },
            BrowserError::NavigationTimeout { timeout_ms } => Self::NavigationTimeout { timeout_ms },
            BrowserError::LastPage => Self::LastPageClose,
            other => Self::Browser(other),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Could not extract a valid domain from {0}")]
    InvalidDomain(String),

    #[error("Cookie dictionary is missing required key \"{0}\"")]
    MissingCookieField(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Silene operations
pub type Result<T> = std::result::Result<T, SileneError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use browser::{Browser, BrowserPage, Cookie, Element, HttpBrowser, WaitOptions};
pub use config::{load_config, CrawlerConfiguration};
pub use crawler::{
    CrawlFrontier, CrawlHandler, CrawlHooks, CrawlRequest, CrawlResponse, Crawler, StopHandle,
};
pub use crate::url::{extract_domain, fingerprint, normalize_url, Fingerprint};
