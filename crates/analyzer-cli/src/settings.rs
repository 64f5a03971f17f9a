//! CLI Settings
//!
//! Output and input options read from the environment.

use std::path::PathBuf;
use std::str::FromStr;

use portfolio_analyzer::AggregationMode;

/// How the analysis is printed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "summary" => Ok(Self::Text),
            other => Err(format!("unknown output format '{other}' (expected json or text)")),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Settings {
    pub output: OutputFormat,
    pub mode: AggregationMode,

    /// Request file; stdin when `None` or "-"
    pub request_path: Option<PathBuf>,
}

impl Settings {
    /// Build from the first CLI argument and `ANALYZER_*` variables
    pub fn from_env(arg: Option<String>) -> anyhow::Result<Self> {
        Self::from_lookup(arg, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(arg: Option<String>, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let output = match lookup("ANALYZER_OUTPUT") {
            Some(raw) => raw.parse().map_err(anyhow::Error::msg)?,
            None => OutputFormat::default(),
        };

        let per_chain = lookup("ANALYZER_PER_CHAIN")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let request_path = arg
            .or_else(|| lookup("ANALYZER_REQUEST"))
            .filter(|p| p != "-")
            .map(PathBuf::from);

        Ok(Self {
            output,
            mode: if per_chain {
                AggregationMode::PerChain
            } else {
                AggregationMode::Combined
            },
            request_path,
        })
    }
}
