//! Crawler gate.
//!
//! Decides whether an HTTP request comes from a search engine crawler and,
//! if so, which canonical URL the crawler wants rendered.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────┐
//!                  │                    CRAWLER GATE                       │
//!                  │                                                       │
//!   Request        │  ┌──────────┐   ┌──────────────┐   ┌──────────────┐  │
//!   ───────────────┼─▶│   http   │──▶│ RequestView  │──▶│  Classifier  │  │
//!                  │  │middleware│   │ (detection)  │   │   cascade    │  │
//!                  │  └────┬─────┘   └──────────────┘   └──────┬───────┘  │
//!                  │       │                                   │          │
//!                  │       │ Pass                   Intercept(url)        │
//!                  │       ▼                                   ▼          │
//!                  │  ┌──────────┐                    ┌──────────────┐   │
//!                  │  │   app    │                    │ Snapshot     │───┼──▶ Renderer
//!                  │  └──────────┘                    │ Backend      │   │
//!                  │                                  └──────────────┘   │
//!                  │  ┌────────────────────────────────────────────────┐  │
//!                  │  │ config (TOML, rule files, watcher) · logging   │  │
//!                  │  └────────────────────────────────────────────────┘  │
//!                  └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use url::Url;

use crawler_gate::config::{build_classifier, load_config, GateConfig, RuleWatcher};
use crawler_gate::detection::rules::SharedRuleSet;
use crawler_gate::detection::RequestView;
use crawler_gate::http::{passthrough_app, HttpServer};
use crawler_gate::interceptor::{DryRunBackend, Interceptor};
use crawler_gate::observability::logging;

#[derive(Parser)]
#[command(name = "crawler-gate")]
#[command(about = "Search engine crawler detection for web applications", long_about = None)]
struct Cli {
    /// Configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single request and print the decision as JSON
    Classify {
        /// Absolute request URL
        #[arg(long)]
        url: String,

        /// User-Agent header
        #[arg(long, default_value = "")]
        user_agent: String,

        /// HTTP method
        #[arg(long, default_value = "GET")]
        method: String,
    },
    /// Serve a placeholder application behind the gate (dry run)
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GateConfig::default(),
    };
    logging::init(&config.observability);

    tracing::info!("crawler-gate v0.1.0 starting");

    let shared = SharedRuleSet::default();
    let classifier = Arc::new(build_classifier(&config.detector, shared.clone())?);

    match cli.command {
        Commands::Classify {
            url,
            user_agent,
            method,
        } => {
            let view = request_from_url(&url, &user_agent, &method)?;
            let decision = classifier.evaluate(&view)?;
            println!("{}", serde_json::to_string_pretty(&decision)?);
        }
        Commands::Serve => {
            let _watcher = if config.detector.watch_rules {
                Some(RuleWatcher::new(config.detector.clone(), shared).run()?)
            } else {
                None
            };

            let interceptor = Interceptor::new(classifier, DryRunBackend);
            let server = HttpServer::new(config.server.clone(), interceptor, passthrough_app());

            let listener = TcpListener::bind(&config.server.bind_address).await?;
            tracing::info!(
                address = %listener.local_addr()?,
                "Listening for connections"
            );
            server.run(listener).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Build CGI-style request metadata from an absolute URL.
fn request_from_url(
    raw: &str,
    user_agent: &str,
    method: &str,
) -> Result<RequestView, url::ParseError> {
    let url = Url::parse(raw)?;
    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };
    let path = percent_encoding::percent_decode_str(url.path())
        .decode_utf8_lossy()
        .into_owned();

    Ok(RequestView::new([
        ("REQUEST_SCHEME", url.scheme().to_string()),
        ("REQUEST_METHOD", method.to_string()),
        ("HTTP_USER_AGENT", user_agent.to_string()),
        ("HTTP_HOST", host),
        ("PATH_INFO", path),
        ("QUERY_STRING", url.query().unwrap_or_default().to_string()),
    ]))
}
