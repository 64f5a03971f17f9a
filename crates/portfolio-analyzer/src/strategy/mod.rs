//! Analysis Strategies
//!
//! Pure scoring stages of the pipeline. Each stage reads its inputs and
//! returns a fresh value.

mod diversification;
mod inflation_risk;
mod projection;
mod rebalancing;

pub use diversification::{DiversificationReport, DiversificationScorer};
pub use inflation_risk::{InflationRates, InflationRiskScorer};
pub use projection::ProjectionEngine;
pub use rebalancing::{RebalancingOpportunityGenerator, RebalancingPlan};
