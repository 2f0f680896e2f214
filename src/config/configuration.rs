use crate::browser::HttpBrowserSettings;
use crate::config::types::Config;
use crate::crawler::CrawlRequest;
use crate::url::extract_allowed_host;
use crate::{ConfigError, ConfigResult};
use std::time::Duration;

/// Static crawl policy: seed requests and frontier filters
///
/// Allowed domains are normalized to lowercase hosts when the configuration is
/// built; a configuration with an unusable allowed domain is never produced.
#[derive(Debug, Clone)]
pub struct CrawlerConfiguration {
    seed_requests: Vec<CrawlRequest>,
    filter_duplicate_requests: bool,
    filter_offsite_requests: bool,
    allowed_domains: Vec<String>,
}

impl CrawlerConfiguration {
    /// Creates a configuration with the default policy
    ///
    /// Duplicates are filtered, off-site requests are not, and no domains are
    /// allowed.
    pub fn new(seed_requests: Vec<CrawlRequest>) -> Self {
        Self {
            seed_requests,
            filter_duplicate_requests: true,
            filter_offsite_requests: false,
            allowed_domains: Vec::new(),
        }
    }

    pub fn builder(seed_requests: Vec<CrawlRequest>) -> CrawlerConfigurationBuilder {
        CrawlerConfigurationBuilder {
            seed_requests,
            filter_duplicate_requests: true,
            filter_offsite_requests: false,
            allowed_domains: Vec::new(),
        }
    }

    pub fn seed_requests(&self) -> &[CrawlRequest] {
        &self.seed_requests
    }

    pub fn filter_duplicate_requests(&self) -> bool {
        self.filter_duplicate_requests
    }

    pub fn filter_offsite_requests(&self) -> bool {
        self.filter_offsite_requests
    }

    /// Normalized allowed hosts, without duplicates
    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }
}

/// Builder for [`CrawlerConfiguration`]
///
/// # Examples
///
/// ```
/// use silene::CrawlerConfiguration;
///
/// let configuration = CrawlerConfiguration::builder(Vec::new())
///     .filter_offsite_requests(true)
///     .allowed_domains(vec!["https://www.example.com:80/".to_string()])
///     .build()
///     .unwrap();
/// assert_eq!(configuration.allowed_domains(), ["www.example.com"]);
///
/// let invalid = CrawlerConfiguration::builder(Vec::new())
///     .allowed_domains(vec!["example.invalid".to_string()])
///     .build();
/// assert!(invalid.is_err());
/// ```
#[derive(Debug, Clone)]
pub struct CrawlerConfigurationBuilder {
    seed_requests: Vec<CrawlRequest>,
    filter_duplicate_requests: bool,
    filter_offsite_requests: bool,
    allowed_domains: Vec<String>,
}

impl CrawlerConfigurationBuilder {
    pub fn filter_duplicate_requests(mut self, enabled: bool) -> Self {
        self.filter_duplicate_requests = enabled;
        self
    }

    pub fn filter_offsite_requests(mut self, enabled: bool) -> Self {
        self.filter_offsite_requests = enabled;
        self
    }

    pub fn allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = domains;
        self
    }

    /// Validates the allowed domains and builds the configuration
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlerConfiguration)` - Every allowed domain resolved to a host
    /// * `Err(ConfigError::InvalidDomain)` - An allowed domain has no usable host
    pub fn build(self) -> ConfigResult<CrawlerConfiguration> {
        let mut allowed_domains: Vec<String> = Vec::with_capacity(self.allowed_domains.len());

        for raw in &self.allowed_domains {
            let host = extract_allowed_host(raw)
                .map_err(|_| ConfigError::InvalidDomain(raw.clone()))?;
            if !allowed_domains.contains(&host) {
                allowed_domains.push(host);
            }
        }

        Ok(CrawlerConfiguration {
            seed_requests: self.seed_requests,
            filter_duplicate_requests: self.filter_duplicate_requests,
            filter_offsite_requests: self.filter_offsite_requests,
            allowed_domains,
        })
    }
}

impl Config {
    /// Converts the file configuration into a crawl policy
    pub fn crawler_configuration(&self) -> ConfigResult<CrawlerConfiguration> {
        let seeds = self
            .seed
            .iter()
            .map(|entry| {
                CrawlRequest::new(&entry.url)
                    .map(|request| {
                        request
                            .with_priority(entry.priority)
                            .with_headers(entry.headers.clone())
                    })
                    .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", entry.url, e)))
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        CrawlerConfiguration::builder(seeds)
            .filter_duplicate_requests(self.crawler.filter_duplicate_requests)
            .filter_offsite_requests(self.crawler.filter_offsite_requests)
            .allowed_domains(self.crawler.allowed_domains.clone())
            .build()
    }

    /// Settings for the bundled HTTP browser
    pub fn browser_settings(&self) -> HttpBrowserSettings {
        HttpBrowserSettings {
            user_agent: self.browser.user_agent.clone(),
            navigation_timeout: Duration::from_millis(self.browser.navigation_timeout_ms),
        }
    }
}
