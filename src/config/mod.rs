//! Configuration module for Silene
//!
//! Crawl policy comes in two layers: [`CrawlerConfiguration`], built in code,
//! and the TOML [`Config`] file, which is loaded, validated and then converted
//! into a `CrawlerConfiguration` plus browser settings.
//!
//! # Example
//!
//! ```no_run
//! use silene::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("silene.toml")).unwrap();
//! let configuration = config.crawler_configuration().unwrap();
//! println!("Allowed domains: {:?}", configuration.allowed_domains());
//! ```

mod configuration;
mod parser;
mod types;
mod validation;

pub use configuration::{CrawlerConfiguration, CrawlerConfigurationBuilder};
pub use types::{BrowserSection, Config, CrawlerSection, SeedEntry, DEFAULT_NAVIGATION_TIMEOUT_MS};

pub use parser::{load_config, load_config_with_hash, parse_config};
