//! Crawler classification cascade.
//!
//! # Data Flow
//! ```text
//! RequestView
//!     → protocol        (http / https only)
//!     → method          (GET only)
//!     → ignored robot   (robots.ignore, wins over everything below)
//!     → whitelist       (matched routes, if any)
//!     → blacklist       (ignored routes)
//!     → file extension  (only when enabled)
//!     → escaped fragment → Intercept
//!     → matched robot    → Intercept, else Pass
//! ```
//!
//! # Design Decisions
//! - Each stage returns Continue, Pass or Intercept; the first non-Continue
//!   result is final
//! - Rule documents are validated on every call, after the protocol and
//!   method gates, because hosts may edit them at any time
//! - Route and extension stages see the decoded path; interception returns
//!   the encoded URL

use std::cell::OnceCell;

use serde::Serialize;
use serde_json::Value;

use crate::detection::extension::extract_extension;
use crate::detection::request::RequestView;
use crate::detection::robots::RobotMatcher;
use crate::detection::routes::RouteFilter;
use crate::detection::rules::{RuleSet, SharedRuleSet, DEFAULT_LANGUAGE};
use crate::error::DetectorError;

/// Outcome of classifying one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "url", rename_all = "snake_case")]
pub enum Classification {
    /// Not eligible; serve the request normally.
    Pass,
    /// Eligible; carries the canonical URL to render.
    Intercept(String),
}

impl Classification {
    pub fn url(&self) -> Option<&str> {
        match self {
            Classification::Pass => None,
            Classification::Intercept(url) => Some(url),
        }
    }

    pub fn is_intercept(&self) -> bool {
        matches!(self, Classification::Intercept(_))
    }
}

enum Stage {
    Continue,
    Pass,
    Intercept(String),
}

struct Cascade<'a> {
    view: &'a RequestView,
    rules: &'a RuleSet,
    routes: &'a RouteFilter,
    check_extensions: bool,
    robots: &'a RobotMatcher,
    decoded_path: OnceCell<String>,
}

impl Cascade<'_> {
    fn decoded_path(&self) -> &str {
        self.decoded_path.get_or_init(|| self.view.decoded_path())
    }

    fn protocol(&self) -> Result<Stage, DetectorError> {
        Ok(gate(self.view.scheme().is_web()))
    }

    fn method(&self) -> Result<Stage, DetectorError> {
        Ok(gate(self.view.method() == "GET"))
    }

    fn ignored_robot(&self) -> Result<Stage, DetectorError> {
        let robots = self.rules.robot_rules()?;
        let ignored = self.robots.matches(&robots.ignore, self.view.user_agent())?;
        Ok(gate(!ignored))
    }

    fn whitelist(&self) -> Result<Stage, DetectorError> {
        if !self.routes.has_whitelist() {
            return Ok(Stage::Continue);
        }
        Ok(gate(self.routes.is_whitelisted(self.decoded_path())))
    }

    fn blacklist(&self) -> Result<Stage, DetectorError> {
        Ok(gate(!self.routes.is_blacklisted(self.decoded_path())))
    }

    fn file_extension(&self) -> Result<Stage, DetectorError> {
        if !self.check_extensions {
            return Ok(Stage::Continue);
        }
        let valid = self.rules.valid_extensions()?;
        match extract_extension(self.decoded_path()) {
            Some(ext) => Ok(gate(valid.contains(&ext.to_lowercase()))),
            None => Ok(Stage::Continue),
        }
    }

    fn escaped_fragment(&self) -> Result<Stage, DetectorError> {
        if self.view.has_escaped_fragment() {
            return Ok(Stage::Intercept(self.view.url().to_string()));
        }
        Ok(Stage::Continue)
    }

    fn matched_robot(&self) -> Result<Stage, DetectorError> {
        let robots = self.rules.robot_rules()?;
        if self.robots.matches(&robots.matched, self.view.user_agent())? {
            return Ok(Stage::Intercept(self.view.url().to_string()));
        }
        Ok(Stage::Pass)
    }
}

fn gate(proceed: bool) -> Stage {
    if proceed {
        Stage::Continue
    } else {
        Stage::Pass
    }
}

type StageFn<'a> = fn(&Cascade<'a>) -> Result<Stage, DetectorError>;

fn run<'a>(cascade: &Cascade<'a>) -> Result<Classification, DetectorError> {
    let stages: [(&str, StageFn<'a>); 8] = [
        ("protocol", Cascade::protocol),
        ("method", Cascade::method),
        ("ignored_robot", Cascade::ignored_robot),
        ("whitelist", Cascade::whitelist),
        ("blacklist", Cascade::blacklist),
        ("file_extension", Cascade::file_extension),
        ("escaped_fragment", Cascade::escaped_fragment),
        ("matched_robot", Cascade::matched_robot),
    ];

    for (name, stage) in stages {
        match stage(cascade)? {
            Stage::Continue => continue,
            Stage::Pass => {
                tracing::debug!(
                    stage = name,
                    method = %cascade.view.method(),
                    user_agent = %cascade.view.user_agent(),
                    "Request not eligible for interception"
                );
                return Ok(Classification::Pass);
            }
            Stage::Intercept(url) => {
                tracing::info!(
                    stage = name,
                    user_agent = %cascade.view.user_agent(),
                    url = %url,
                    "Request eligible for interception"
                );
                return Ok(Classification::Intercept(url));
            }
        }
    }
    Ok(Classification::Pass)
}

/// Classify a request against explicit rules and routes.
///
/// Compiles robot patterns for this call only; use [`Classifier`] to reuse
/// them across requests.
pub fn evaluate(
    view: &RequestView,
    rules: &RuleSet,
    routes: &RouteFilter,
    check_extensions: bool,
) -> Result<Classification, DetectorError> {
    run(&Cascade {
        view,
        rules,
        routes,
        check_extensions,
        robots: &RobotMatcher::new(),
        decoded_path: OnceCell::new(),
    })
}

/// Decides whether requests come from crawlers and where they are headed.
#[derive(Debug)]
pub struct Classifier {
    rules: SharedRuleSet,
    routes: RouteFilter,
    check_extensions: bool,
    robots: RobotMatcher,
}

impl Classifier {
    pub fn builder() -> ClassifierBuilder {
        ClassifierBuilder::default()
    }

    /// Live rule set. Edits through this handle apply to later evaluations.
    pub fn rules(&self) -> &SharedRuleSet {
        &self.rules
    }

    pub fn checks_extensions(&self) -> bool {
        self.check_extensions
    }

    /// Classify one request against the current rule set.
    pub fn evaluate(&self, view: &RequestView) -> Result<Classification, DetectorError> {
        let rules = self.rules.load();
        run(&Cascade {
            view,
            rules: &rules,
            routes: &self.routes,
            check_extensions: self.check_extensions,
            robots: &self.robots,
            decoded_path: OnceCell::new(),
        })
    }
}

/// Builder for [`Classifier`].
#[derive(Debug, Default)]
pub struct ClassifierBuilder {
    ignored_routes: Vec<String>,
    matched_routes: Vec<String>,
    check_file_extensions: bool,
    robots: Option<Value>,
    extensions: Option<Value>,
    language: Option<String>,
    shared: Option<SharedRuleSet>,
}

impl ClassifierBuilder {
    /// Blacklisted route patterns.
    pub fn ignored_routes<I, S>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_routes = routes.into_iter().map(Into::into).collect();
        self
    }

    /// Whitelisted route patterns.
    pub fn matched_routes<I, S>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matched_routes = routes.into_iter().map(Into::into).collect();
        self
    }

    pub fn check_file_extensions(mut self, enabled: bool) -> Self {
        self.check_file_extensions = enabled;
        self
    }

    /// Custom robots document instead of the bundled one.
    pub fn robots(mut self, robots: Value) -> Self {
        self.robots = Some(robots);
        self
    }

    /// Custom extensions document. Requires extension checking.
    pub fn extensions(mut self, extensions: Value) -> Self {
        self.extensions = Some(extensions);
        self
    }

    /// Key of the language-specific extension list.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Publish the rule set through an existing handle, e.g. one a watcher
    /// also writes to. Its current contents are replaced at build time.
    pub fn shared_rules(mut self, shared: SharedRuleSet) -> Self {
        self.shared = Some(shared);
        self
    }

    pub fn build(self) -> Result<Classifier, DetectorError> {
        if self.extensions.is_some() && !self.check_file_extensions {
            return Err(DetectorError::InvalidConfiguration(
                "custom extensions supplied while file extension checking is disabled".into(),
            ));
        }

        let routes = RouteFilter::new(&self.ignored_routes, &self.matched_routes)?;

        let rules = RuleSet::new(
            self.robots.unwrap_or_else(crate::detection::rules::bundled_robots),
            self.extensions
                .unwrap_or_else(crate::detection::rules::bundled_extensions),
        )
        .with_language(self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE));

        let shared = match self.shared {
            Some(shared) => {
                shared.store(rules);
                shared
            }
            None => SharedRuleSet::new(rules),
        };

        tracing::debug!(
            ignored_routes = self.ignored_routes.len(),
            matched_routes = self.matched_routes.len(),
            check_file_extensions = self.check_file_extensions,
            "Classifier built"
        );

        Ok(Classifier {
            rules: shared,
            routes,
            check_extensions: self.check_file_extensions,
            robots: RobotMatcher::new(),
        })
    }
}
