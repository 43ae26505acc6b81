//! Search engine crawler detection and interception library.

pub mod config;
pub mod detection;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod observability;

pub use config::schema::GateConfig;
pub use detection::{Classification, Classifier, RequestView};
pub use error::DetectorError;
pub use http::HttpServer;
pub use interceptor::{Interceptor, Snapshot, SnapshotBackend};
