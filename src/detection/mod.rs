//! Crawler detection and URL reconstruction.
//!
//! # Data Flow
//! ```text
//! Incoming request metadata (CGI-style map or http::Request)
//!     → request.rs (RequestView: scheme, method, agent, query)
//!     → classifier.rs (ordered cascade)
//!         ↔ rules.rs (robot / extension tables, validated per call)
//!         ↔ routes.rs (whitelist / blacklist)
//!         ↔ extension.rs (last /file.ext of the path)
//!         ↔ fragment.rs (reverse _escaped_fragment_)
//!     → Classification::Pass | Classification::Intercept(url)
//! ```
//!
//! # Design Decisions
//! - Evaluation is synchronous and side-effect free apart from logging
//! - Rule tables are live; routes are fixed at construction
//! - Decoded paths drive matching; encoded URLs leave the process

pub mod classifier;
pub mod extension;
pub mod fragment;
pub mod query;
pub mod request;
pub mod robots;
pub mod routes;
pub mod rules;

pub use classifier::{evaluate, Classification, Classifier, ClassifierBuilder};
pub use fragment::{Direction, RealLocation, ESCAPED_FRAGMENT};
pub use query::QueryMap;
pub use request::{RequestView, Scheme};
pub use routes::RouteFilter;
pub use rules::{RuleSet, SharedRuleSet};
