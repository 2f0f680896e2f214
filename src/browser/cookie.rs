//! Cookie value object shared by the crawler and its browser collaborator

use crate::ConfigError;
use chrono::{DateTime, Utc};
use cookie_store::{
    Cookie as StoredCookie, CookieDomain, CookieExpiration, RawCookie, RawCookieParseError,
};
use serde_json::{Map, Value};

/// A browser cookie
///
/// Only `name` and `value` are required; every other attribute is left to the
/// browser's defaults when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,

    /// Expiry as a Unix timestamp in seconds; negative for session cookies
    pub expires: Option<i64>,
    pub http_only: Option<bool>,
    pub secure: Option<bool>,
    pub session: Option<bool>,
    pub same_site: Option<String>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            expires: None,
            http_only: None,
            secure: None,
            session: None,
            same_site: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_expires(mut self, expires: i64) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_session(mut self, session: bool) -> Self {
        self.session = Some(session);
        self
    }

    /// Expiry as a UTC timestamp, if the cookie has a non-session expiry
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires
            .filter(|secs| *secs >= 0)
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    }

    /// Serializes the cookie into a map with browser-style keys
    ///
    /// Absent attributes are omitted.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::from(self.name.clone()));
        map.insert("value".to_string(), Value::from(self.value.clone()));

        if let Some(domain) = &self.domain {
            map.insert("domain".to_string(), Value::from(domain.clone()));
        }
        if let Some(path) = &self.path {
            map.insert("path".to_string(), Value::from(path.clone()));
        }
        if let Some(expires) = self.expires {
            map.insert("expires".to_string(), Value::from(expires));
        }
        if let Some(http_only) = self.http_only {
            map.insert("httpOnly".to_string(), Value::from(http_only));
        }
        if let Some(secure) = self.secure {
            map.insert("secure".to_string(), Value::from(secure));
        }
        if let Some(session) = self.session {
            map.insert("session".to_string(), Value::from(session));
        }
        if let Some(same_site) = &self.same_site {
            map.insert("sameSite".to_string(), Value::from(same_site.clone()));
        }

        map
    }

    /// Builds a cookie from a map with browser-style keys
    ///
    /// # Returns
    ///
    /// * `Ok(Cookie)` - The map contained `name` and `value`
    /// * `Err(ConfigError::MissingCookieField)` - A required key is missing
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ConfigError> {
        let required = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| ConfigError::MissingCookieField(key.to_string()))
        };
        let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
        let flag = |key: &str| map.get(key).and_then(Value::as_bool);

        Ok(Self {
            name: required("name")?,
            value: required("value")?,
            domain: text("domain"),
            path: text("path"),
            expires: map.get("expires").and_then(Value::as_i64),
            http_only: flag("httpOnly"),
            secure: flag("secure"),
            session: flag("session"),
            same_site: text("sameSite"),
        })
    }

    /// Renders the cookie as a `Set-Cookie` header value
    ///
    /// A missing or negative `expires` yields a session cookie.
    pub fn to_set_cookie_header(&self) -> String {
        let mut header = format!("{}={}", self.name, self.value);

        if let Some(domain) = &self.domain {
            header.push_str(&format!("; Domain={}", domain));
        }
        if let Some(path) = &self.path {
            header.push_str(&format!("; Path={}", path));
        }
        if let Some(at) = self.expires_at() {
            header.push_str(&format!("; Expires={}", at.format("%a, %d %b %Y %H:%M:%S GMT")));
        }
        if self.http_only == Some(true) {
            header.push_str("; HttpOnly");
        }
        if self.secure == Some(true) {
            header.push_str("; Secure");
        }
        if let Some(same_site) = &self.same_site {
            header.push_str(&format!("; SameSite={}", same_site));
        }

        header
    }

    /// Parses the cookie into the form the cookie jar stores
    pub(crate) fn to_raw(&self) -> Result<RawCookie<'static>, RawCookieParseError> {
        RawCookie::parse(self.to_set_cookie_header()).map(RawCookie::into_owned)
    }
}

impl From<&StoredCookie<'_>> for Cookie {
    /// Snapshot of a jar entry
    ///
    /// Host-only cookies report the bare host; domain cookies report the
    /// domain with a leading dot.
    fn from(stored: &StoredCookie<'_>) -> Self {
        let domain = match &stored.domain {
            CookieDomain::HostOnly(host) => Some(host.clone()),
            CookieDomain::Suffix(suffix) => Some(format!(".{}", suffix)),
            _ => None,
        };
        let expires = match &stored.expires {
            CookieExpiration::AtUtc(at) => Some(at.unix_timestamp()),
            CookieExpiration::SessionEnd => None,
        };

        Self {
            name: stored.name().to_string(),
            value: stored.value().to_string(),
            domain,
            path: Some(String::from(&stored.path)),
            expires: Some(expires.unwrap_or(-1)),
            http_only: Some(stored.http_only().unwrap_or(false)),
            secure: Some(stored.secure().unwrap_or(false)),
            session: Some(expires.is_none()),
            same_site: stored.same_site().map(|same_site| same_site.to_string()),
        }
    }
}
