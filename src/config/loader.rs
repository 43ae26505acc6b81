//! Configuration and rule file loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::config::schema::{DetectorConfig, GateConfig};
use crate::config::validation::{validate_config, ValidationError};
use crate::detection::rules::{bundled_extensions, bundled_robots, RuleSet, SharedRuleSet};
use crate::detection::Classifier;
use crate::error::DetectorError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Detector(#[from] DetectorError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let content = read(path)?;
    let config: GateConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load the robot and extension documents named by the detector config,
/// falling back to the bundled ones.
pub fn load_rule_set(config: &DetectorConfig) -> Result<RuleSet, ConfigError> {
    let robots = match &config.robots_path {
        Some(path) => read_json(path)?,
        None => bundled_robots(),
    };
    let extensions = match &config.extensions_path {
        Some(path) => read_json(path)?,
        None => bundled_extensions(),
    };
    Ok(RuleSet::new(robots, extensions).with_language(&config.language))
}

/// Build a classifier from the detector config, publishing its rules
/// through `shared`.
pub fn build_classifier(
    config: &DetectorConfig,
    shared: SharedRuleSet,
) -> Result<Classifier, ConfigError> {
    let rules = load_rule_set(config)?;

    let mut builder = Classifier::builder()
        .ignored_routes(config.ignored_routes.iter().cloned())
        .matched_routes(config.matched_routes.iter().cloned())
        .check_file_extensions(config.check_file_extensions)
        .robots(rules.robots().clone())
        .language(rules.language())
        .shared_rules(shared);
    if config.extensions_path.is_some() {
        builder = builder.extensions(rules.extensions().clone());
    }

    let classifier = builder.build()?;
    tracing::info!(
        robots = ?config.robots_path,
        extensions = ?config.extensions_path,
        check_file_extensions = config.check_file_extensions,
        "Classifier configured"
    );
    Ok(classifier)
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json(path: &Path) -> Result<Value, ConfigError> {
    let content = read(path)?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config_validates() {
        let file = temp_file(
            r#"
            [detector]
            extensions_path = "extensions.json"
            "#,
        );
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().contains("check_file_extensions"));
    }

    #[test]
    fn test_load_config_parse_error() {
        let file = temp_file("[detector\n");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/gate.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_custom_rule_files() {
        let robots = temp_file(r#"{"ignore": [], "match": ["Testbot"]}"#);
        let extensions = temp_file(r#"{"generic": ["test"]}"#);
        let config = DetectorConfig {
            robots_path: Some(robots.path().to_path_buf()),
            extensions_path: Some(extensions.path().to_path_buf()),
            check_file_extensions: true,
            ..DetectorConfig::default()
        };

        let rules = load_rule_set(&config).unwrap();
        assert_eq!(rules.robot_rules().unwrap().matched, vec!["Testbot"]);
        assert!(rules.valid_extensions().unwrap().contains("test"));

        let classifier = build_classifier(&config, SharedRuleSet::default()).unwrap();
        assert!(classifier.checks_extensions());
        assert_eq!(
            classifier.rules().load().robot_rules().unwrap().matched,
            vec!["Testbot"]
        );
    }

    #[test]
    fn test_invalid_json_rule_file() {
        let robots = temp_file("{not json");
        let config = DetectorConfig {
            robots_path: Some(robots.path().to_path_buf()),
            ..DetectorConfig::default()
        };
        assert!(matches!(load_rule_set(&config), Err(ConfigError::Json { .. })));
    }

    #[test]
    fn test_extensions_without_check_rejected_by_builder() {
        let extensions = temp_file(r#"{"generic": ["test"]}"#);
        let config = DetectorConfig {
            extensions_path: Some(extensions.path().to_path_buf()),
            ..DetectorConfig::default()
        };
        let err = build_classifier(&config, SharedRuleSet::default()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Detector(DetectorError::InvalidConfiguration(_))
        ));
    }
}
