//! Rule file watcher for hot reload.

use std::path::PathBuf;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::loader::load_rule_set;
use crate::config::schema::DetectorConfig;
use crate::detection::rules::SharedRuleSet;

/// Watches the configured `robots.json` / `extensions.json` files and swaps
/// reloaded rules into a [`SharedRuleSet`].
pub struct RuleWatcher {
    config: DetectorConfig,
    rules: SharedRuleSet,
}

impl RuleWatcher {
    pub fn new(config: DetectorConfig, rules: SharedRuleSet) -> Self {
        Self { config, rules }
    }

    /// Rule files named by the config. Bundled rules are never watched.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.config
            .robots_path
            .iter()
            .chain(self.config.extensions_path.iter())
            .cloned()
            .collect()
    }

    /// Reload the rule files now. Keeps the current rules on failure.
    pub fn reload(&self) -> bool {
        reload(&self.config, &self.rules)
    }

    /// Start watching in a background thread. Dropping the returned watcher
    /// stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let paths = self.paths();
        let config = self.config;
        let rules = self.rules;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(paths = ?event.paths, "Rule file change detected, reloading...");
                        reload(&config, &rules);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        for path in &paths {
            watcher.watch(path, RecursiveMode::NonRecursive)?;
        }

        tracing::info!(paths = ?paths, "Rule watcher started");
        Ok(watcher)
    }
}

fn reload(config: &DetectorConfig, rules: &SharedRuleSet) -> bool {
    match load_rule_set(config) {
        Ok(next) => {
            rules.store(next);
            tracing::info!("Rules reloaded");
            true
        }
        Err(e) => {
            tracing::error!("Failed to reload rules: {}. Keeping current rules.", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_reload_swaps_rules() {
        let dir = tempfile::tempdir().unwrap();
        let robots = dir.path().join("robots.json");
        fs::write(&robots, r#"{"match": ["Firstbot"]}"#).unwrap();

        let config = DetectorConfig {
            robots_path: Some(robots.clone()),
            ..DetectorConfig::default()
        };
        let shared = SharedRuleSet::default();
        let watcher = RuleWatcher::new(config, shared.clone());
        assert_eq!(watcher.paths(), vec![robots.clone()]);

        assert!(watcher.reload());
        assert_eq!(shared.load().robot_rules().unwrap().matched, vec!["Firstbot"]);

        fs::write(&robots, r#"{"match": ["Secondbot"]}"#).unwrap();
        assert!(watcher.reload());
        assert_eq!(shared.load().robot_rules().unwrap().matched, vec!["Secondbot"]);
    }

    #[test]
    fn test_failed_reload_keeps_rules() {
        let dir = tempfile::tempdir().unwrap();
        let robots = dir.path().join("robots.json");
        fs::write(&robots, "{broken").unwrap();

        let config = DetectorConfig {
            robots_path: Some(robots),
            ..DetectorConfig::default()
        };
        let shared = SharedRuleSet::default();
        let watcher = RuleWatcher::new(config, shared.clone());

        assert!(!watcher.reload());
        assert!(shared.load().robot_rules().unwrap().matched.contains(&"Googlebot"));
    }
}
