//! Engine Configuration
//!
//! Tunable thresholds for the analysis pipeline. Every value has a default;
//! `from_env` overrides them from `ANALYZER_*` environment variables.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, Result};
use crate::model::MAX_INFLATION_RATE_PERCENT;

/// Materiality and sizing rules for rebalancing suggestions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RebalanceThresholds {
    /// Minimum inflation gap (percentage points) worth acting on
    pub min_inflation_delta: Decimal,

    /// Holdings smaller than this are never a swap source
    pub min_source_value: Decimal,

    /// Fraction of a holding proposed per swap (0, 1]
    pub swap_fraction: Decimal,

    /// Floor for a suggested amount when the holding itself is at least this big
    pub min_suggested_amount: Decimal,

    /// Opportunities returned; the full count is reported separately
    pub max_opportunities: usize,
}

impl Default for RebalanceThresholds {
    fn default() -> Self {
        Self {
            min_inflation_delta: dec!(1.5),
            min_source_value: dec!(5),
            swap_fraction: dec!(0.5),
            min_suggested_amount: dec!(1),
            max_opportunities: 10,
        }
    }
}

/// Configuration for one analysis pass
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Balances below this USD value are treated as dust
    pub dust_floor: Decimal,

    /// Inflation rate (percent) for regions missing from the table
    pub default_inflation_rate: Decimal,

    /// Region share (percent) above which a region is over-exposed
    pub over_exposure_threshold: Decimal,

    /// Projection horizon in years
    pub projection_years: u32,

    pub rebalance: RebalanceThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dust_floor: dec!(0.01),
            default_inflation_rate: dec!(3.0),
            over_exposure_threshold: dec!(50),
            projection_years: 3,
            rebalance: RebalanceThresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Read overrides from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let rebalance = &defaults.rebalance;

        let config = Self {
            dust_floor: read(&lookup, "ANALYZER_DUST_FLOOR", defaults.dust_floor)?,
            default_inflation_rate: read(
                &lookup,
                "ANALYZER_DEFAULT_INFLATION_RATE",
                defaults.default_inflation_rate,
            )?,
            over_exposure_threshold: read(
                &lookup,
                "ANALYZER_OVER_EXPOSURE_THRESHOLD",
                defaults.over_exposure_threshold,
            )?,
            projection_years: read(&lookup, "ANALYZER_PROJECTION_YEARS", defaults.projection_years)?,
            rebalance: RebalanceThresholds {
                min_inflation_delta: read(
                    &lookup,
                    "ANALYZER_MIN_INFLATION_DELTA",
                    rebalance.min_inflation_delta,
                )?,
                min_source_value: read(
                    &lookup,
                    "ANALYZER_MIN_SOURCE_VALUE",
                    rebalance.min_source_value,
                )?,
                swap_fraction: read(&lookup, "ANALYZER_SWAP_FRACTION", rebalance.swap_fraction)?,
                min_suggested_amount: read(
                    &lookup,
                    "ANALYZER_MIN_SUGGESTED_AMOUNT",
                    rebalance.min_suggested_amount,
                )?,
                max_opportunities: read(
                    &lookup,
                    "ANALYZER_MAX_OPPORTUNITIES",
                    rebalance.max_opportunities,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break the engine's invariants
    pub fn validate(&self) -> Result<()> {
        let fraction = self.rebalance.swap_fraction;
        if fraction <= Decimal::ZERO || fraction > Decimal::ONE {
            return Err(AnalyzerError::config("ANALYZER_SWAP_FRACTION", fraction.to_string()));
        }
        if self.default_inflation_rate.abs() > MAX_INFLATION_RATE_PERCENT {
            return Err(AnalyzerError::config(
                "ANALYZER_DEFAULT_INFLATION_RATE",
                self.default_inflation_rate.to_string(),
            ));
        }
        if self.dust_floor < Decimal::ZERO {
            return Err(AnalyzerError::config("ANALYZER_DUST_FLOOR", self.dust_floor.to_string()));
        }
        if self.over_exposure_threshold < Decimal::ZERO || self.over_exposure_threshold > dec!(100) {
            return Err(AnalyzerError::config(
                "ANALYZER_OVER_EXPOSURE_THRESHOLD",
                self.over_exposure_threshold.to_string(),
            ));
        }
        Ok(())
    }
}

fn read<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| AnalyzerError::config(key, raw)),
        _ => Ok(default),
    }
}
