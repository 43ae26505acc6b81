//! HTTP middleware.

pub mod intercept;

pub use intercept::{intercept_middleware, snapshot_response, InterceptState};
