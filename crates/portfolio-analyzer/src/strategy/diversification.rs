//! Diversification Scoring
//!
//! Concentration (Herfindahl) and entropy measures over region shares,
//! blended into a 0-100 score, plus region-level exposure checks.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::{AggregatedPortfolio, ConcentrationRisk};
use crate::region::RegionClassifier;

/// Any one region above this share (percent) is HIGH concentration
const SINGLE_REGION_LIMIT: Decimal = dec!(70);

const HIGH_HHI: f64 = 0.5;
const MEDIUM_HHI: f64 = 0.25;

/// Output of the diversification scorer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiversificationReport {
    /// 0-100, higher is more diversified
    pub score: u8,
    pub concentration_risk: ConcentrationRisk,
    pub over_exposed_regions: Vec<String>,
    pub missing_regions: Vec<String>,
    /// Sum of squared region shares, 0 for an empty portfolio
    pub hhi: f64,
    /// Shannon entropy over `ln(catalog size)`, in [0, 1]
    pub entropy_ratio: f64,
}

/// Scores how evenly value is spread across regions.
///
/// With `R` regions held and `K` regions in the catalog:
///
/// ```text
/// evenness = 0.5 * clamp((1 - HHI) / (1 - 1/R), 0, 1)
///          + 0.5 * clamp(H / ln R, 0, 1)
/// score    = round(100 * min(1, (R - 1 + evenness) / K))
/// ```
///
/// Each extra region lifts the score by one band of width `100/K` and
/// evenness moves it within the band, so holding a new region never lowers
/// the score. One region scores 0; an even split across all `K` regions
/// scores 100.
pub struct DiversificationScorer<'a> {
    classifier: &'a RegionClassifier,
    over_exposure_threshold: Decimal,
}

impl<'a> DiversificationScorer<'a> {
    pub fn new(classifier: &'a RegionClassifier, over_exposure_threshold: Decimal) -> Self {
        Self {
            classifier,
            over_exposure_threshold,
        }
    }

    pub fn score(&self, portfolio: &AggregatedPortfolio) -> DiversificationReport {
        if portfolio.is_empty() {
            return DiversificationReport {
                score: 0,
                concentration_risk: ConcentrationRisk::Low,
                over_exposed_regions: Vec::new(),
                missing_regions: self.classifier.catalog().to_vec(),
                hhi: 0.0,
                entropy_ratio: 0.0,
            };
        }

        let region_shares = self.region_shares(portfolio);
        let fractions: Vec<f64> = region_shares
            .iter()
            .filter_map(|(_, share)| (*share / dec!(100)).to_f64())
            .filter(|s| *s > 0.0)
            .collect();
        let hhi: f64 = fractions.iter().map(|s| s * s).sum();
        let entropy: f64 = fractions.iter().map(|s| -s * s.ln()).sum();

        let capacity = self.classifier.region_capacity();
        let held = fractions.len();
        let entropy_ratio = if capacity > 1 {
            (entropy / (capacity as f64).ln()).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let score = if capacity > 1 && held > 1 {
            let r = held as f64;
            let evenness = 0.5 * ((1.0 - hhi) / (1.0 - 1.0 / r)).clamp(0.0, 1.0)
                + 0.5 * (entropy / r.ln()).clamp(0.0, 1.0);
            let banded = 100.0 * ((r - 1.0 + evenness) / capacity as f64).min(1.0);
            if banded.is_finite() {
                banded.round().clamp(0.0, 100.0) as u8
            } else {
                0
            }
        } else {
            0
        };

        let top_region_share = region_shares
            .iter()
            .map(|(_, share)| *share)
            .max()
            .unwrap_or(Decimal::ZERO);

        let concentration_risk = if hhi > HIGH_HHI || top_region_share > SINGLE_REGION_LIMIT {
            ConcentrationRisk::High
        } else if hhi > MEDIUM_HHI {
            ConcentrationRisk::Medium
        } else {
            ConcentrationRisk::Low
        };

        let mut over_exposed: Vec<(String, Decimal)> = region_shares
            .iter()
            .filter(|(_, share)| *share > self.over_exposure_threshold)
            .cloned()
            .collect();
        over_exposed.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let region_values = portfolio.region_values();
        let missing_regions = self
            .classifier
            .catalog()
            .iter()
            .filter(|region| {
                region_values
                    .get(region.as_str())
                    .is_none_or(|v| *v <= Decimal::ZERO)
            })
            .cloned()
            .collect();

        DiversificationReport {
            score,
            concentration_risk,
            over_exposed_regions: over_exposed.into_iter().map(|(region, _)| region).collect(),
            missing_regions,
            hhi,
            entropy_ratio,
        }
    }

    /// Region shares in percent
    fn region_shares(&self, portfolio: &AggregatedPortfolio) -> Vec<(String, Decimal)> {
        portfolio
            .region_values()
            .into_iter()
            .map(|(region, value)| {
                (region.to_string(), value / portfolio.total_value * dec!(100))
            })
            .collect()
    }
}
