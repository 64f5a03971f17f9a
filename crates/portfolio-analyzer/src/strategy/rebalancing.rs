//! Rebalancing Opportunities
//!
//! Proposes swaps out of holdings in high-inflation regions into the
//! lowest-inflation regions that have a representative token.

use std::cmp::Ordering;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RebalanceThresholds;
use crate::model::{AggregatedPortfolio, Priority, RebalancingOpportunity, TokenHolding};
use crate::region::RegionClassifier;
use crate::strategy::inflation_risk::InflationRates;

const HIGH_PRIORITY_SAVINGS: Decimal = dec!(20);
const HIGH_PRIORITY_DELTA: Decimal = dec!(5);
const MEDIUM_PRIORITY_SAVINGS: Decimal = dec!(5);

/// Ranked opportunities plus the count before capping
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancingPlan {
    pub opportunities: Vec<RebalancingOpportunity>,
    pub total_count: usize,
}

impl RebalancingPlan {
    pub fn top(&self) -> Option<&RebalancingOpportunity> {
        self.opportunities.first()
    }
}

/// A region value can be moved into
struct Target<'r> {
    region: &'r str,
    token: &'r str,
    rate: Decimal,
}

/// Generates at most one opportunity per source holding
pub struct RebalancingOpportunityGenerator<'a> {
    classifier: &'a RegionClassifier,
    rates: InflationRates<'a>,
    thresholds: &'a RebalanceThresholds,
}

impl<'a> RebalancingOpportunityGenerator<'a> {
    pub fn new(
        classifier: &'a RegionClassifier,
        rates: InflationRates<'a>,
        thresholds: &'a RebalanceThresholds,
    ) -> Self {
        Self {
            classifier,
            rates,
            thresholds,
        }
    }

    pub fn generate(&self, portfolio: &AggregatedPortfolio) -> RebalancingPlan {
        if portfolio.is_empty() {
            return RebalancingPlan::default();
        }

        let targets = self.targets();
        let Some(lowest_rate) = targets.iter().map(|t| t.rate).min() else {
            debug!("No target regions with inflation data");
            return RebalancingPlan::default();
        };

        let mut opportunities: Vec<RebalancingOpportunity> = portfolio
            .holdings
            .iter()
            .filter_map(|holding| self.best_for(holding, &targets, lowest_rate))
            .collect();

        opportunities.sort_by(rank);
        let total_count = opportunities.len();
        opportunities.truncate(self.thresholds.max_opportunities);

        debug!(
            total = total_count,
            returned = opportunities.len(),
            "Generated rebalancing opportunities"
        );

        RebalancingPlan {
            opportunities,
            total_count,
        }
    }

    /// Catalog regions with both a swap token and a real inflation figure
    fn targets(&self) -> Vec<Target<'a>> {
        self.classifier
            .catalog()
            .iter()
            .filter_map(|region| {
                let token = self.classifier.representative(region)?;
                let rate = self.rates.known_rate(region)?;
                Some(Target {
                    region: region.as_str(),
                    token,
                    rate,
                })
            })
            .collect()
    }

    /// Best-delta target for one holding, if the move is material
    fn best_for(
        &self,
        holding: &TokenHolding,
        targets: &[Target<'_>],
        lowest_rate: Decimal,
    ) -> Option<RebalancingOpportunity> {
        let min_delta = self.thresholds.min_inflation_delta;
        if holding.value_usd < self.thresholds.min_source_value {
            return None;
        }

        let from_rate = self.rates.rate(&holding.region);
        if from_rate - lowest_rate < min_delta {
            return None;
        }

        let mut best: Option<(&Target<'_>, Decimal)> = None;
        for target in targets {
            if target.region == holding.region || target.token == holding.symbol {
                continue;
            }
            let delta = from_rate - target.rate;
            if delta <= Decimal::ZERO {
                continue;
            }
            // Strictly greater keeps the first region in catalog order on ties.
            if best.is_none_or(|(_, best_delta)| delta > best_delta) {
                best = Some((target, delta));
            }
        }

        let (target, delta) = best.filter(|(_, delta)| *delta >= min_delta)?;
        let suggested_amount = self.suggested_amount(holding.value_usd);
        let Some(annual_savings) = suggested_amount.checked_mul(delta / dec!(100)) else {
            warn!(symbol = %holding.symbol, "Skipping opportunity whose savings overflow");
            return None;
        };

        Some(RebalancingOpportunity {
            from_token: holding.symbol.clone(),
            to_token: target.token.to_string(),
            from_region: holding.region.clone(),
            to_region: target.region.to_string(),
            from_inflation: from_rate,
            to_inflation: target.rate,
            inflation_delta: delta,
            suggested_amount,
            annual_savings,
            priority: priority_for(annual_savings, delta),
            source_value: holding.value_usd,
        })
    }

    /// A capped fraction of the holding, rounded down to cents
    fn suggested_amount(&self, value: Decimal) -> Decimal {
        let floor = self.thresholds.min_suggested_amount;
        let mut amount = (value * self.thresholds.swap_fraction)
            .round_dp_with_strategy(2, RoundingStrategy::ToZero)
            .min(value);
        if value >= floor {
            amount = amount.max(floor);
        }
        amount
    }
}

fn priority_for(annual_savings: Decimal, inflation_delta: Decimal) -> Priority {
    if annual_savings >= HIGH_PRIORITY_SAVINGS || inflation_delta >= HIGH_PRIORITY_DELTA {
        Priority::High
    } else if annual_savings >= MEDIUM_PRIORITY_SAVINGS {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// Savings desc, then delta desc, then source value desc, then source token
fn rank(a: &RebalancingOpportunity, b: &RebalancingOpportunity) -> Ordering {
    b.annual_savings
        .cmp(&a.annual_savings)
        .then_with(|| b.inflation_delta.cmp(&a.inflation_delta))
        .then_with(|| b.source_value.cmp(&a.source_value))
        .then_with(|| a.from_token.cmp(&b.from_token))
}
