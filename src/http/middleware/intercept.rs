//! Crawler interception middleware.
//! Serves rendered snapshots to eligible crawlers.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::detection::RequestView;
use crate::interceptor::{Interceptor, Snapshot, SnapshotBackend};

/// Snapshot headers forwarded to the crawler.
const FORWARDED_HEADERS: [&str; 3] = ["location", "server", "status"];

/// State required for interception.
pub struct InterceptState<B> {
    pub interceptor: Arc<Interceptor<B>>,
}

impl<B> Clone for InterceptState<B> {
    fn clone(&self) -> Self {
        Self {
            interceptor: self.interceptor.clone(),
        }
    }
}

impl<B> InterceptState<B> {
    pub fn new(interceptor: Interceptor<B>) -> Self {
        Self {
            interceptor: Arc::new(interceptor),
        }
    }
}

pub async fn intercept_middleware<B>(
    State(state): State<InterceptState<B>>,
    req: Request<Body>,
    next: Next,
) -> Response
where
    B: SnapshotBackend + 'static,
{
    let view = RequestView::from_http(&req);

    match state.interceptor.intercept(&view).await {
        Ok(Some(snapshot)) => {
            tracing::info!(
                url = %view.url(),
                status = snapshot.status,
                "Serving snapshot to crawler"
            );
            snapshot_response(snapshot)
        }
        Ok(None) => next.run(req).await,
        Err(e) => {
            tracing::warn!(error = %e, path = %view.path(), "Interception failed, passing through");
            next.run(req).await
        }
    }
}

/// Build the crawler-facing response from a snapshot.
pub fn snapshot_response(snapshot: Snapshot) -> Response {
    let status = StatusCode::from_u16(snapshot.status).unwrap_or(StatusCode::OK);
    let mut response = (status, snapshot.html).into_response();

    let headers = response.headers_mut();
    for (name, value) in &snapshot.headers {
        if !FORWARDED_HEADERS.iter().any(|h| name.eq_ignore_ascii_case(h)) {
            continue;
        }
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) else {
            tracing::warn!(header = %name, "Dropping invalid snapshot header");
            continue;
        };
        headers.append(name, value);
    }
    response
}
