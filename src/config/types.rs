use serde::Deserialize;
use std::collections::HashMap;

/// Default navigation timeout in milliseconds
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Main configuration structure for Silene, as read from a TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerSection,

    #[serde(default)]
    pub browser: BrowserSection,

    /// Seed requests, in admission order
    #[serde(default)]
    pub seed: Vec<SeedEntry>,
}

/// Frontier filter policy
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerSection {
    /// Reject requests whose normalized URL was admitted before
    #[serde(rename = "filter-duplicate-requests", default = "default_true")]
    pub filter_duplicate_requests: bool,

    /// Reject requests outside the allowed domains
    #[serde(rename = "filter-offsite-requests", default)]
    pub filter_offsite_requests: bool,

    /// Domains (or URLs) whose hosts and subdomains are on-site
    #[serde(rename = "allowed-domains", default)]
    pub allowed_domains: Vec<String>,
}

impl Default for CrawlerSection {
    fn default() -> Self {
        Self {
            filter_duplicate_requests: true,
            filter_offsite_requests: false,
            allowed_domains: Vec::new(),
        }
    }
}

/// Settings for the bundled HTTP browser
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSection {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(
        rename = "navigation-timeout-ms",
        default = "default_navigation_timeout_ms"
    )]
    pub navigation_timeout_ms: u64,
}

impl Default for BrowserSection {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            navigation_timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
        }
    }
}

/// A seed request
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    /// Absolute http(s) URL
    pub url: String,

    /// Higher values are fetched first
    #[serde(default)]
    pub priority: i32,

    /// Extra headers sent with both the probe and the GET
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    format!("Silene/{}", env!("CARGO_PKG_VERSION"))
}

fn default_navigation_timeout_ms() -> u64 {
    DEFAULT_NAVIGATION_TIMEOUT_MS
}
