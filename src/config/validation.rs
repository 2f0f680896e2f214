use crate::config::types::{BrowserSection, Config, CrawlerSection, SeedEntry};
use crate::crawler::CrawlRequest;
use crate::url::extract_allowed_host;
use crate::ConfigError;

/// Upper bound for the navigation timeout (10 minutes)
const MAX_NAVIGATION_TIMEOUT_MS: u64 = 600_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_section(&config.crawler)?;
    validate_browser_section(&config.browser)?;
    validate_seeds(&config.seed)?;
    Ok(())
}

/// Validates the frontier policy
fn validate_crawler_section(section: &CrawlerSection) -> Result<(), ConfigError> {
    for domain in &section.allowed_domains {
        extract_allowed_host(domain).map_err(|_| ConfigError::InvalidDomain(domain.clone()))?;
    }

    if section.filter_offsite_requests && section.allowed_domains.is_empty() {
        tracing::warn!("Off-site filtering is enabled without allowed domains; every request will be rejected");
    }

    Ok(())
}

/// Validates the browser settings
fn validate_browser_section(section: &BrowserSection) -> Result<(), ConfigError> {
    if section.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if section.user_agent.chars().any(char::is_control) {
        return Err(ConfigError::Validation(format!(
            "user-agent must not contain control characters, got {:?}",
            section.user_agent
        )));
    }

    if section.navigation_timeout_ms < 1 || section.navigation_timeout_ms > MAX_NAVIGATION_TIMEOUT_MS
    {
        return Err(ConfigError::Validation(format!(
            "navigation-timeout-ms must be between 1 and {}, got {}",
            MAX_NAVIGATION_TIMEOUT_MS, section.navigation_timeout_ms
        )));
    }

    Ok(())
}

/// Validates seed URLs
fn validate_seeds(seeds: &[SeedEntry]) -> Result<(), ConfigError> {
    if seeds.is_empty() {
        tracing::warn!("No seed requests configured");
    }

    for seed in seeds {
        CrawlRequest::new(&seed.url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed.url, e)))?;

        if seed.headers.keys().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "Seed '{}' has a header with an empty name",
                seed.url
            )));
        }
    }

    Ok(())
}
