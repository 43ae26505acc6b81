//! HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing, timeout)
//!     → middleware/intercept.rs (RequestView → Interceptor)
//!         → snapshot for eligible crawlers
//!         → wrapped application otherwise
//! ```

pub mod middleware;
pub mod server;

pub use middleware::{intercept_middleware, InterceptState};
pub use server::{passthrough_app, HttpServer};
