//! Normalized view over CGI-style request metadata.
//!
//! # Responsibilities
//! - Expose scheme, method, user agent and query string with sentinels
//!   for missing values
//! - Parse the query string once per request
//! - Build the decoded path used for route matching and the encoded URL
//!   handed to the renderer
//!
//! # Recognized Keys
//! `REQUEST_SCHEME`, `HTTPS`, `REQUEST_METHOD`, `HTTP_USER_AGENT`,
//! `QUERY_STRING`, `HTTP_HOST`, `SERVER_NAME`, `SERVER_PORT`, `SCRIPT_NAME`,
//! `PATH_INFO`. Values are expected in CGI form: `PATH_INFO` decoded,
//! `QUERY_STRING` raw.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use axum::http::{header, Request};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::detection::fragment::{self, Direction, ESCAPED_FRAGMENT};
use crate::detection::query::QueryMap;

/// Sentinel for metadata the request did not carry.
pub const UNKNOWN: &str = "N/A";

/// Characters left literal when encoding a path.
const PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/')
    .remove(b';')
    .remove(b'=')
    .remove(b',');

/// URI scheme reported for the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
    Other(String),
    Unknown,
}

impl Scheme {
    fn parse(raw: &str) -> Self {
        match raw {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => Scheme::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::Other(s) => s,
            Scheme::Unknown => UNKNOWN,
        }
    }

    /// True for `http` and `https`.
    pub fn is_web(&self) -> bool {
        matches!(self, Scheme::Http | Scheme::Https)
    }

    fn default_port(&self) -> Option<&'static str> {
        match self {
            Scheme::Http => Some("80"),
            Scheme::Https => Some("443"),
            _ => None,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view over one request's metadata.
#[derive(Debug, Default)]
pub struct RequestView {
    vars: HashMap<String, String>,
    query: OnceLock<QueryMap>,
    url: OnceLock<String>,
}

impl RequestView {
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            query: OnceLock::new(),
            url: OnceLock::new(),
        }
    }

    /// Build a view from an HTTP request.
    ///
    /// The scheme comes from the request URI, then `X-Forwarded-Proto`, and
    /// defaults to `http` (plain listeners see origin-form URIs).
    pub fn from_http<B>(req: &Request<B>) -> Self {
        let headers = req.headers();
        let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

        let scheme = req
            .uri()
            .scheme_str()
            .map(str::to_string)
            .or_else(|| {
                header_str("x-forwarded-proto")
                    .and_then(|v| v.split(',').next())
                    .map(|v| v.trim().to_ascii_lowercase())
            })
            .unwrap_or_else(|| "http".to_string());

        let mut vars = HashMap::new();
        vars.insert("REQUEST_SCHEME".to_string(), scheme);
        vars.insert("REQUEST_METHOD".to_string(), req.method().as_str().to_string());
        vars.insert(
            "PATH_INFO".to_string(),
            percent_decode_str(req.uri().path())
                .decode_utf8_lossy()
                .into_owned(),
        );
        vars.insert(
            "QUERY_STRING".to_string(),
            req.uri().query().unwrap_or_default().to_string(),
        );
        if let Some(agent) = header_str(header::USER_AGENT.as_str()) {
            vars.insert("HTTP_USER_AGENT".to_string(), agent.to_string());
        }
        let host = header_str(header::HOST.as_str())
            .map(str::to_string)
            .or_else(|| req.uri().authority().map(|a| a.to_string()));
        if let Some(host) = host {
            vars.insert("HTTP_HOST".to_string(), host);
        }

        Self::new(vars)
    }

    fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn scheme(&self) -> Scheme {
        if let Some(scheme) = self.var("REQUEST_SCHEME") {
            return Scheme::parse(scheme);
        }
        match self.var("HTTPS") {
            Some(flag) if ["on", "yes", "1"].iter().any(|on| flag.eq_ignore_ascii_case(on)) => {
                Scheme::Https
            }
            Some(_) => Scheme::Http,
            None => Scheme::Unknown,
        }
    }

    /// HTTP method, or [`UNKNOWN`].
    pub fn method(&self) -> &str {
        self.var("REQUEST_METHOD").unwrap_or(UNKNOWN)
    }

    /// User agent, empty when absent.
    pub fn user_agent(&self) -> &str {
        self.var("HTTP_USER_AGENT").unwrap_or_default()
    }

    /// Raw query string, empty when absent.
    pub fn raw_query(&self) -> &str {
        self.var("QUERY_STRING").unwrap_or_default()
    }

    /// Parsed query string, computed on first access.
    pub fn query(&self) -> &QueryMap {
        self.query.get_or_init(|| QueryMap::parse(self.raw_query()))
    }

    pub fn has_escaped_fragment(&self) -> bool {
        self.query().contains_key(ESCAPED_FRAGMENT)
    }

    /// `HTTP_HOST`, else `SERVER_NAME` with a non-default `SERVER_PORT`.
    pub fn host(&self) -> String {
        if let Some(host) = self.var("HTTP_HOST").filter(|h| !h.is_empty()) {
            return host.to_string();
        }
        let name = self.var("SERVER_NAME").unwrap_or("localhost");
        match self.var("SERVER_PORT") {
            Some(port) if Some(port) != self.scheme().default_port() => format!("{name}:{port}"),
            _ => name.to_string(),
        }
    }

    /// `SCRIPT_NAME` + `PATH_INFO`, rooted at `/`.
    pub fn path(&self) -> String {
        let script = self.var("SCRIPT_NAME").unwrap_or_default();
        let info = self.var("PATH_INFO").unwrap_or_default();
        if !script.is_empty() {
            format!("{script}{info}")
        } else if info.starts_with('/') {
            info.to_string()
        } else {
            format!("/{info}")
        }
    }

    /// Path and percent-decoded query, with any escaped fragment turned
    /// back into its hash-bang form. The path is already decoded.
    pub fn decoded_path(&self) -> String {
        let path = self.path();
        if self.has_escaped_fragment() {
            return path + &fragment::split(self.query(), Direction::Decode).to_string();
        }
        match self.raw_query() {
            "" => path,
            query => format!("{path}?{}", percent_decode_str(query).decode_utf8_lossy()),
        }
    }

    /// Absolute percent-encoded URL, with any escaped fragment turned back
    /// into its hash-bang form. Computed on first access.
    pub fn url(&self) -> &str {
        self.url.get_or_init(|| {
            let base = format!(
                "{}://{}{}",
                self.scheme(),
                self.host(),
                utf8_percent_encode(&self.path(), PATH)
            );
            if self.has_escaped_fragment() {
                return base + &fragment::split(self.query(), Direction::Encode).to_string();
            }
            match self.raw_query() {
                "" => base,
                query => format!("{base}?{query}"),
            }
        })
    }
}
