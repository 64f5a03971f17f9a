//! Value Projection
//!
//! Compounds inflation erosion over a horizon for the do-nothing path and
//! for the path where the top opportunity has been executed.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::model::{Projection, RebalancingOpportunity};

pub struct ProjectionEngine {
    years: u32,
}

impl Default for ProjectionEngine {
    fn default() -> Self {
        Self::new(3)
    }
}

impl ProjectionEngine {
    pub fn new(years: u32) -> Self {
        Self { years }
    }

    /// Project `total_value` under `inflation_risk` (percent).
    ///
    /// With no opportunity the optimized path equals the current path.
    pub fn project(
        &self,
        total_value: Decimal,
        inflation_risk: Decimal,
        top: Option<&RebalancingOpportunity>,
    ) -> Projection {
        let current = self.erode(total_value, inflation_risk);

        let optimized = match top {
            Some(opportunity) if total_value > Decimal::ZERO => {
                let moved_share = (opportunity.suggested_amount / total_value).min(Decimal::ONE);
                let shifted = moved_share * (opportunity.from_inflation - opportunity.to_inflation);
                let residual = (inflation_risk - shifted).max(Decimal::ZERO);
                self.erode(total_value, residual)
            }
            _ => current,
        };

        Projection {
            current_path_value: current,
            optimized_path_value: optimized,
            difference: optimized - current,
            timeframe_years: self.years,
        }
    }

    /// `value × (1 − rate/100)^years`, rounded to cents
    fn erode(&self, value: Decimal, rate: Decimal) -> Decimal {
        let factor = (Decimal::ONE - rate / dec!(100)).max(Decimal::ZERO);
        let compounded = factor
            .checked_powi(i64::from(self.years))
            .unwrap_or(Decimal::ZERO);
        (value * compounded).round_dp(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;

    fn opportunity(amount: Decimal, from: Decimal, to: Decimal) -> RebalancingOpportunity {
        RebalancingOpportunity {
            from_token: "CKES".into(),
            to_token: "EURC".into(),
            from_region: "Africa".into(),
            to_region: "Europe".into(),
            from_inflation: from,
            to_inflation: to,
            inflation_delta: from - to,
            suggested_amount: amount,
            annual_savings: amount * (from - to) / dec!(100),
            priority: Priority::High,
            source_value: amount * dec!(2),
        }
    }

    #[test]
    fn test_compounded_erosion() {
        let projection = ProjectionEngine::new(3).project(dec!(1000), dec!(10), None);

        // 1000 × 0.9³, not 1000 × (1 − 0.3)
        assert_eq!(projection.current_path_value, dec!(729));
        assert_eq!(projection.optimized_path_value, projection.current_path_value);
        assert_eq!(projection.difference, Decimal::ZERO);
        assert_eq!(projection.timeframe_years, 3);
    }

    #[test]
    fn test_optimized_path_uses_residual_risk() {
        // $500 at 8% and $500 at 2%: risk 5%. Moving $250 drops it to 3.5%.
        let top = opportunity(dec!(250), dec!(8), dec!(2));
        let projection = ProjectionEngine::new(2).project(dec!(1000), dec!(5), Some(&top));

        assert_eq!(projection.current_path_value, dec!(902.50));
        assert_eq!(projection.optimized_path_value, dec!(931.22));
        assert_eq!(projection.difference, dec!(28.72));
    }

    #[test]
    fn test_zero_value() {
        let top = opportunity(dec!(10), dec!(8), dec!(2));
        let projection = ProjectionEngine::default().project(Decimal::ZERO, Decimal::ZERO, Some(&top));

        assert_eq!(projection.current_path_value, Decimal::ZERO);
        assert_eq!(projection.optimized_path_value, Decimal::ZERO);
    }

    #[test]
    fn test_extreme_inflation_floors_at_zero() {
        let projection = ProjectionEngine::new(3).project(dec!(100), dec!(150), None);
        assert_eq!(projection.current_path_value, Decimal::ZERO);
    }
}
