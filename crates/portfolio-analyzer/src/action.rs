//! Recommended Actions
//!
//! One variant per action kind, each carrying only the fields that make
//! sense for it. Serialized with an `action` tag for the advice layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{Priority, RebalancingOpportunity};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendedAction {
    /// Move value from one token into another
    #[serde(rename_all = "camelCase")]
    Swap {
        from_token: String,
        to_token: String,
        amount_usd: Decimal,
        expected_annual_savings: Decimal,
        priority: Priority,
    },

    /// Keep the portfolio as it is
    #[serde(rename_all = "camelCase")]
    Hold { reason: HoldReason },
}

/// Why no swap is recommended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HoldReason {
    EmptyPortfolio,
    NoMaterialOpportunity,
}

impl From<&RebalancingOpportunity> for RecommendedAction {
    fn from(opportunity: &RebalancingOpportunity) -> Self {
        Self::Swap {
            from_token: opportunity.from_token.clone(),
            to_token: opportunity.to_token.clone(),
            amount_usd: opportunity.suggested_amount,
            expected_annual_savings: opportunity.annual_savings,
            priority: opportunity.priority,
        }
    }
}
