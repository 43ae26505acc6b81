//! Robot and file extension rule tables.
//!
//! # Responsibilities
//! - Hold the `robots` (`ignore`, `match`) and `extensions` (`generic`,
//!   `<language>`) documents
//! - Validate their shape every time they are read
//! - Share one live rule set between classifier, watcher and host code
//!
//! # Design Decisions
//! - Documents are kept as JSON values so hosts can edit them freely;
//!   a bad edit surfaces as `MalformedRuleData` on the next evaluation
//! - Missing keys are empty lists; present keys must be string arrays
//! - `SharedRuleSet` swaps whole snapshots, so readers never see a
//!   half-applied edit

use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde_json::{Map, Value};

use crate::error::DetectorError;

/// Bundled robot user agents.
pub const BUNDLED_ROBOTS: &str = include_str!("../../resources/robots.json");

/// Bundled valid file extensions.
pub const BUNDLED_EXTENSIONS: &str = include_str!("../../resources/extensions.json");

/// Key of the language-specific extension list.
pub const DEFAULT_LANGUAGE: &str = "rust";

/// Robot and extension rule documents.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    robots: Value,
    extensions: Value,
    language: String,
}

/// Validated view of the `robots` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotRules<'a> {
    pub ignore: Vec<&'a str>,
    pub matched: Vec<&'a str>,
}

impl RuleSet {
    pub fn new(robots: Value, extensions: Value) -> Self {
        Self {
            robots,
            extensions,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Rule set built from the bundled `robots.json` and `extensions.json`.
    pub fn bundled() -> Self {
        Self::new(bundled_robots(), bundled_extensions())
    }

    /// Use a different key for the language-specific extension list.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn robots(&self) -> &Value {
        &self.robots
    }

    pub fn robots_mut(&mut self) -> &mut Value {
        &mut self.robots
    }

    pub fn extensions(&self) -> &Value {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Value {
        &mut self.extensions
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Validate and return the robot token lists.
    pub fn robot_rules(&self) -> Result<RobotRules<'_>, DetectorError> {
        let robots = as_object(&self.robots, "robots")?;
        Ok(RobotRules {
            ignore: string_list(robots, "robots", "ignore")?,
            matched: string_list(robots, "robots", "match")?,
        })
    }

    /// Validate and return the lowercased union of valid extensions.
    pub fn valid_extensions(&self) -> Result<HashSet<String>, DetectorError> {
        let extensions = as_object(&self.extensions, "extensions")?;
        let generic = string_list(extensions, "extensions", "generic")?;
        let specific = string_list(extensions, "extensions", &self.language)?;
        Ok(generic
            .into_iter()
            .chain(specific)
            .map(str::to_lowercase)
            .collect())
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::bundled()
    }
}

/// Parsed bundled robots document.
pub fn bundled_robots() -> Value {
    serde_json::from_str(BUNDLED_ROBOTS).expect("bundled robots.json is valid JSON")
}

/// Parsed bundled extensions document.
pub fn bundled_extensions() -> Value {
    serde_json::from_str(BUNDLED_EXTENSIONS).expect("bundled extensions.json is valid JSON")
}

fn as_object<'a>(doc: &'a Value, name: &str) -> Result<&'a Map<String, Value>, DetectorError> {
    doc.as_object()
        .ok_or_else(|| DetectorError::MalformedRuleData(format!("`{name}` is not an object")))
}

fn string_list<'a>(
    doc: &'a Map<String, Value>,
    name: &str,
    key: &str,
) -> Result<Vec<&'a str>, DetectorError> {
    match doc.get(key) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().ok_or_else(|| {
                    DetectorError::MalformedRuleData(format!(
                        "`{name}.{key}` contains a non-string entry: {item}"
                    ))
                })
            })
            .collect(),
        Some(other) => Err(DetectorError::MalformedRuleData(format!(
            "`{name}.{key}` is not a list: {other}"
        ))),
    }
}

/// A rule set shared between the classifier and whoever mutates it.
///
/// Cloning the handle shares the same underlying cell.
#[derive(Debug, Clone)]
pub struct SharedRuleSet {
    inner: Arc<ArcSwap<RuleSet>>,
}

impl SharedRuleSet {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(rules)),
        }
    }

    /// Current snapshot.
    pub fn load(&self) -> Arc<RuleSet> {
        self.inner.load_full()
    }

    /// Replace the rule set wholesale.
    pub fn store(&self, rules: RuleSet) {
        self.inner.store(Arc::new(rules));
    }

    /// Edit a copy of the current rule set and publish it.
    pub fn update<F>(&self, mut edit: F)
    where
        F: FnMut(&mut RuleSet),
    {
        self.inner.rcu(|current| {
            let mut next = RuleSet::clone(current);
            edit(&mut next);
            next
        });
    }
}

impl Default for SharedRuleSet {
    fn default() -> Self {
        Self::new(RuleSet::bundled())
    }
}
