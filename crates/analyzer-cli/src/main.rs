//! Portfolio Analyzer CLI
//!
//! Reads a JSON analysis request from a file (or stdin), runs the engine
//! and prints the result.
//!
//! ```text
//! portfolio-analyzer sample-request.json
//! ANALYZER_OUTPUT=text portfolio-analyzer < request.json
//! ```

mod settings;

use std::io::Read;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portfolio_analyzer::{EngineConfig, PortfolioAnalyzer, RegionClassifier, parse_request};

use crate::settings::{OutputFormat, Settings};

fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = Settings::from_env(std::env::args().nth(1))?;
    let config = EngineConfig::from_env().context("Invalid analyzer configuration")?;

    tracing::debug!(?config, "Loaded engine configuration");

    let raw = match &settings.request_path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read request from stdin")?;
            buf
        }
    };

    let request = parse_request(&raw).context("Malformed analysis request")?;

    let analyzer =
        PortfolioAnalyzer::new(RegionClassifier::stablecoins(), config).with_mode(settings.mode);
    let analysis = analyzer.analyze(&request);

    match settings.output {
        OutputFormat::Json => println!("{}", analysis.to_json_pretty()?),
        OutputFormat::Text => print!("{}", analysis.summary()),
    }

    Ok(())
}
