//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject contradictory detector settings
//! - Check that route patterns compile
//! - Validate value ranges (timeouts > 0, non-empty keys)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::detection::routes::compile_route;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("detector.extensions_path is set but detector.check_file_extensions is false")]
    ExtensionsWithoutCheck,

    #[error("detector.{field}: {reason}")]
    InvalidRoute { field: &'static str, reason: String },

    #[error("detector.language must not be empty")]
    EmptyLanguage,

    #[error("server.bind_address must not be empty")]
    EmptyBindAddress,

    #[error("server.request_timeout_secs must be greater than zero")]
    ZeroTimeout,
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let detector = &config.detector;

    if detector.extensions_path.is_some() && !detector.check_file_extensions {
        errors.push(ValidationError::ExtensionsWithoutCheck);
    }

    let routes = [
        ("ignored_routes", &detector.ignored_routes),
        ("matched_routes", &detector.matched_routes),
    ];
    for (field, patterns) in routes {
        for pattern in patterns {
            if let Err(e) = compile_route(pattern) {
                errors.push(ValidationError::InvalidRoute {
                    field,
                    reason: e.to_string(),
                });
            }
        }
    }

    if detector.language.trim().is_empty() {
        errors.push(ValidationError::EmptyLanguage);
    }
    if config.server.bind_address.trim().is_empty() {
        errors.push(ValidationError::EmptyBindAddress);
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GateConfig::default()).is_ok());
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = GateConfig::default();
        config.detector.extensions_path = Some(PathBuf::from("extensions.json"));
        config.detector.ignored_routes = vec!["(".into(), "/ok".into()];
        config.detector.matched_routes = vec!["[z-a]".into()];
        config.detector.language = " ".into();
        config.server.request_timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert_eq!(errors[0], ValidationError::ExtensionsWithoutCheck);
        assert!(matches!(
            errors[1],
            ValidationError::InvalidRoute { field: "ignored_routes", .. }
        ));
        assert!(matches!(
            errors[2],
            ValidationError::InvalidRoute { field: "matched_routes", .. }
        ));
        assert!(errors.contains(&ValidationError::EmptyLanguage));
        assert!(errors.contains(&ValidationError::ZeroTimeout));
    }

    #[test]
    fn test_extensions_with_check_is_valid() {
        let mut config = GateConfig::default();
        config.detector.check_file_extensions = true;
        config.detector.extensions_path = Some(PathBuf::from("extensions.json"));
        assert!(validate_config(&config).is_ok());
    }
}
