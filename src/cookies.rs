//! In-memory cookie jar and the cookie input forms accepted from callers.
//!
//! Callers may pass cookies as a jar, a plain name/value mapping, or a list of
//! pairs. All three are normalized into a [`CookieJar`] at the session boundary,
//! so nothing downstream has to branch on the input shape.
//!
//! The jar holds cookies in memory only. Persistence and expiry enforcement
//! belong to the bridge process.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

/// A single cookie as exchanged with the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
        }
    }

    fn same_slot(&self, other: &Cookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }
}

/// Insertion-ordered cookie collection.
///
/// A cookie replaces an existing one when name, domain and path all match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a host-agnostic cookie.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.insert(Cookie::new(name, value));
    }

    pub fn insert(&mut self, cookie: Cookie) {
        if let Some(existing) = self.cookies.iter_mut().find(|c| c.same_slot(&cookie)) {
            *existing = cookie;
        } else {
            self.cookies.push(cookie);
        }
    }

    /// Returns the value of the most recently inserted cookie named `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .rev()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter()
    }

    /// Copies every cookie from `other` into this jar, `other` winning on conflict.
    pub fn merge(&mut self, other: &CookieJar) {
        for cookie in &other.cookies {
            self.insert(cookie.clone());
        }
    }

    /// Builds a jar from `Set-Cookie` header values received for `url`.
    ///
    /// Only `Domain` and `Path` attributes are kept. The domain defaults to the
    /// request host and the path to the directory of the request path.
    /// Values without a `name=` prefix are skipped.
    pub fn from_set_cookie_headers<'a>(
        url: &str,
        values: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let parsed = Url::parse(url).ok();
        let default_domain = parsed
            .as_ref()
            .and_then(|u| u.host_str())
            .map(str::to_string);
        let default_path = parsed
            .as_ref()
            .map(|u| {
                u.path()
                    .rsplit_once('/')
                    .map_or("/", |(dir, _)| if dir.is_empty() { "/" } else { dir })
                    .to_string()
            })
            .unwrap_or_else(|| "/".to_string());

        let mut jar = CookieJar::new();
        for header in values {
            let mut parts = header.split(';');
            let Some((name, value)) = parts.next().and_then(|pair| pair.split_once('=')) else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }

            let mut cookie = Cookie::new(name, value.trim());
            for attribute in parts {
                if let Some((key, val)) = attribute.trim().split_once('=') {
                    match key.trim().to_ascii_lowercase().as_str() {
                        "domain" => {
                            cookie.domain = Some(val.trim().trim_start_matches('.').to_string())
                        }
                        "path" => cookie.path = Some(val.trim().to_string()),
                        _ => {}
                    }
                }
            }
            if cookie.domain.is_none() {
                cookie.domain = default_domain.clone();
            }
            if cookie.path.is_none() {
                cookie.path = Some(default_path.clone());
            }
            jar.insert(cookie);
        }
        jar
    }
}

/// Cookies as supplied by a caller for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieInput {
    Jar(CookieJar),
    Map(HashMap<String, String>),
    Pairs(Vec<(String, String)>),
}

impl CookieInput {
    /// Normalizes any input form into a jar.
    ///
    /// Map entries are inserted in name order so the resulting header is stable.
    pub fn into_jar(self) -> CookieJar {
        match self {
            CookieInput::Jar(jar) => jar,
            CookieInput::Map(map) => {
                let mut entries: Vec<_> = map.into_iter().collect();
                entries.sort();
                Self::Pairs(entries).into_jar()
            }
            CookieInput::Pairs(pairs) => {
                let mut jar = CookieJar::new();
                for (name, value) in pairs {
                    jar.set(name, value);
                }
                jar
            }
        }
    }
}

impl From<CookieJar> for CookieInput {
    fn from(jar: CookieJar) -> Self {
        CookieInput::Jar(jar)
    }
}

impl From<HashMap<String, String>> for CookieInput {
    fn from(map: HashMap<String, String>) -> Self {
        CookieInput::Map(map)
    }
}

impl From<Vec<(String, String)>> for CookieInput {
    fn from(pairs: Vec<(String, String)>) -> Self {
        CookieInput::Pairs(pairs)
    }
}
