//! Shared utilities for integration testing.

use crawler_gate::detection::RequestView;
use crawler_gate::error::BackendError;
use crawler_gate::interceptor::{Snapshot, SnapshotBackend};
use std::sync::atomic::{AtomicUsize, Ordering};

pub const ADSBOT: &str = "AdsBot-Google (+http://www.google.com/adsbot.html)";
pub const FIREFOX: &str = "Mozilla/5.0 (Windows NT 6.3; rv:28.0) Gecko/20100101 Firefox/28.0";

/// CGI-style request as a web server would report it.
pub fn cgi_request(method: &str, user_agent: &str, path: &str, query: &str) -> RequestView {
    RequestView::new([
        ("REQUEST_SCHEME", "http"),
        ("REQUEST_METHOD", method),
        ("SERVER_NAME", "localhost"),
        ("SERVER_PORT", "80"),
        ("SCRIPT_NAME", ""),
        ("PATH_INFO", path),
        ("QUERY_STRING", query),
        ("HTTP_USER_AGENT", user_agent),
    ])
}

/// Backend returning a fixed snapshot and counting calls.
#[derive(Debug, Default)]
pub struct StaticBackend {
    pub calls: AtomicUsize,
    pub headers: Vec<(String, String)>,
}

#[allow(dead_code)]
impl StaticBackend {
    pub fn with_headers(headers: &[(&str, &str)]) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SnapshotBackend for StaticBackend {
    async fn render(&self, url: &str) -> Result<Option<Snapshot>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(Snapshot {
            status: 200,
            headers: self.headers.clone(),
            html: format!("<html><body>snapshot of {url}</body></html>"),
        }))
    }
}

/// Backend that always fails.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct FailingBackend;

impl SnapshotBackend for FailingBackend {
    async fn render(&self, _url: &str) -> Result<Option<Snapshot>, BackendError> {
        Err(BackendError::new("renderer unreachable"))
    }
}
