//! Per-request state flowing through the middleware chain

use bytes::Bytes;
use gatehouse_core::GatewayConfig;
use http::{Method, StatusCode};
use serde::Serialize;
use std::sync::Arc;

/// Ordered header collection preserving original casing.
///
/// Lookups are case-insensitive with last-value-wins semantics; iteration
/// yields pairs in arrival order with the casing they were recorded under.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value recorded under `name`, compared case-insensitively
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Append a pair, keeping any existing values under the same name
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replace every value under `name` with a single pair, appending when
    /// the name is absent
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.remove(name);
        self.entries.push((name.to_string(), value.into()));
    }

    /// Remove every value recorded under `name`
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    /// Whether any value is recorded under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Pairs in arrival order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of recorded pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no pairs are recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The response under construction for one request
#[derive(Debug, Clone)]
pub struct ResponseState {
    pub status: StatusCode,
    pub headers: Headers,
    pub body: Bytes,
}

impl Default for ResponseState {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }
}

/// Mutable per-request state: the parsed request plus the response being
/// built.
///
/// A context is created when a request arrives, handed through the chain by
/// value, and dropped once the response is written. It is never shared
/// across requests. The configuration snapshot is loaded once at arrival,
/// so a mid-request publish never changes what this request observes.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub raw_query: String,
    pub headers: Headers,
    pub body: Bytes,
    pub config: Arc<GatewayConfig>,
    pub response: ResponseState,
}

impl RequestContext {
    /// Create a context for an incoming request
    pub fn new(
        method: Method,
        path: String,
        raw_query: String,
        headers: Headers,
        body: Bytes,
        config: Arc<GatewayConfig>,
    ) -> Self {
        Self {
            method,
            path,
            raw_query,
            headers,
            body,
            config,
            response: ResponseState::default(),
        }
    }

    /// Full request target: path, plus the query string when one is present
    pub fn request_uri(&self) -> String {
        if self.raw_query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.raw_query)
        }
    }

    /// Case-insensitive request header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Value of the cookie `name` from the `Cookie` header, first match wins
    pub fn cookie(&self, name: &str) -> Option<&str> {
        let raw = self.header("Cookie")?;
        raw.split(';').map(str::trim).find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then_some(value)
        })
    }

    /// First query-string value for `key`, percent-decoded
    pub fn query_param(&self, key: &str) -> Option<String> {
        url::form_urlencoded::parse(self.raw_query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// First form-body value for `key` from an
    /// `application/x-www-form-urlencoded` body
    pub fn form_param(&self, key: &str) -> Option<String> {
        url::form_urlencoded::parse(&self.body)
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// Write an HTML response
    pub fn respond_html(&mut self, status: StatusCode, body: impl Into<String>) {
        self.response.status = status;
        self.response.headers.set("Content-Type", "text/html; charset=utf-8");
        self.response.body = Bytes::from(body.into());
    }

    /// Write a plain-text response
    pub fn respond_text(&mut self, status: StatusCode, body: impl Into<String>) {
        self.response.status = status;
        self.response.headers.set("Content-Type", "text/plain; charset=utf-8");
        self.response.body = Bytes::from(body.into());
    }

    /// Write a JSON response from a serializable value
    pub fn respond_json<T: Serialize>(&mut self, status: StatusCode, value: &T) {
        match serde_json::to_vec(value) {
            Ok(encoded) => {
                self.response.status = status;
                self.response.headers.set("Content-Type", "application/json");
                self.response.body = Bytes::from(encoded);
            }
            Err(err) => {
                warn!(error = %err, "failed to encode response body");
                self.response.status = StatusCode::INTERNAL_SERVER_ERROR;
                self.response.headers.remove("Content-Type");
                self.response.body = Bytes::new();
            }
        }
    }

    /// Write a `302 Found` redirect to `location`
    pub fn respond_redirect(&mut self, location: &str) {
        self.response.status = StatusCode::FOUND;
        self.response.headers.set("Location", location);
    }
}
