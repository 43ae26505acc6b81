//! Interception orchestration.
//!
//! # Data Flow
//! ```text
//! RequestView
//!     → Classifier::evaluate
//!     → Pass                → None (serve normally)
//!     → Intercept(url)
//!         → before_intercept(url)  (may supply a snapshot and skip the backend)
//!         → backend.render(url)
//!         → after_intercept(url, snapshot)
//!         → Some(snapshot)
//! ```

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::detection::{Classification, Classifier, RequestView};
use crate::error::{BackendError, InterceptError};

/// Rendered page returned by a rendering backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Snapshot {
    /// HTTP status code.
    pub status: u16,
    /// Response headers as name/value pairs.
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Rendered HTML.
    pub html: String,
}

/// Service that renders a URL for a crawler.
pub trait SnapshotBackend: Send + Sync {
    /// Render `url`. `Ok(None)` means the backend declined; the request is
    /// then served normally.
    fn render(&self, url: &str)
        -> impl Future<Output = Result<Option<Snapshot>, BackendError>> + Send;
}

/// Backend that only logs the URL it would render.
#[derive(Debug, Clone, Default)]
pub struct DryRunBackend;

impl SnapshotBackend for DryRunBackend {
    async fn render(&self, url: &str) -> Result<Option<Snapshot>, BackendError> {
        tracing::info!(url = %url, "Dry run: would dispatch to rendering backend");
        Ok(None)
    }
}

type BeforeHook = Arc<dyn Fn(&str) -> Option<Snapshot> + Send + Sync>;
type AfterHook = Arc<dyn Fn(&str, Option<&Snapshot>) + Send + Sync>;

/// Runs the classifier and, for eligible requests, the rendering backend.
pub struct Interceptor<B> {
    classifier: Arc<Classifier>,
    backend: B,
    before: Option<BeforeHook>,
    after: Option<AfterHook>,
}

impl<B: SnapshotBackend> Interceptor<B> {
    pub fn new(classifier: Arc<Classifier>, backend: B) -> Self {
        Self {
            classifier,
            backend,
            before: None,
            after: None,
        }
    }

    /// Hook called with the URL before the backend. Returning a snapshot
    /// skips the backend call.
    pub fn before_intercept<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) -> Option<Snapshot> + Send + Sync + 'static,
    {
        self.before = Some(Arc::new(hook));
        self
    }

    /// Hook called with the URL and the backend result.
    pub fn after_intercept<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, Option<&Snapshot>) + Send + Sync + 'static,
    {
        self.after = Some(Arc::new(hook));
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Classify the request and render it if it is eligible.
    pub async fn intercept(&self, view: &RequestView) -> Result<Option<Snapshot>, InterceptError> {
        let url = match self.classifier.evaluate(view)? {
            Classification::Pass => return Ok(None),
            Classification::Intercept(url) => url,
        };

        if let Some(before) = &self.before {
            if let Some(snapshot) = before(&url) {
                tracing::debug!(url = %url, "Snapshot supplied by before_intercept hook");
                return Ok(Some(snapshot));
            }
        }

        let snapshot = self.backend.render(&url).await?;

        if let Some(after) = &self.after {
            after(&url, snapshot.as_ref());
        }

        Ok(snapshot)
    }
}

impl<B: Clone> Clone for Interceptor<B> {
    fn clone(&self) -> Self {
        Self {
            classifier: self.classifier.clone(),
            backend: self.backend.clone(),
            before: self.before.clone(),
            after: self.after.clone(),
        }
    }
}
