//! URL handling module for Silene
//!
//! This module provides URL normalization and fingerprinting for duplicate
//! detection, domain extraction for requests and allow-lists, and the
//! subdomain-aware matching rule used by off-site filtering.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{extract_allowed_host, extract_domain};
pub use matcher::{is_allowed_domain, matches_allowed_domain};
pub use normalize::{fingerprint, normalize_url, Fingerprint};
