//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!
//! Rule files (robots.json / extensions.json, or bundled defaults)
//!     → loader.rs (load_rule_set)
//!     → SharedRuleSet (live, swappable)
//!
//! On rule file change:
//!     watcher.rs detects change
//!     → loader.rs reloads rule files
//!     → atomic swap of the SharedRuleSet snapshot
//!     → next evaluation validates and uses the new rules
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; rule tables are not
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{build_classifier, load_config, load_rule_set, ConfigError};
pub use schema::{DetectorConfig, GateConfig, ObservabilityConfig, ServerConfig};
pub use watcher::RuleWatcher;
