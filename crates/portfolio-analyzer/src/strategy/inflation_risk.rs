//! Inflation Risk
//!
//! Value-weighted inflation exposure across holdings.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::model::{AggregatedPortfolio, InflationTable, MAX_INFLATION_RATE_PERCENT, to_decimal};

/// Rate lookup with a fallback for missing or unusable records
#[derive(Clone, Copy, Debug)]
pub struct InflationRates<'a> {
    table: &'a InflationTable,
    default_rate: Decimal,
}

impl<'a> InflationRates<'a> {
    pub fn new(table: &'a InflationTable, default_rate: Decimal) -> Self {
        Self {
            table,
            default_rate,
        }
    }

    /// Annual rate in percent for `region`
    pub fn rate(&self, region: &str) -> Decimal {
        self.known_rate(region).unwrap_or(self.default_rate)
    }

    /// Rate from the table only, `None` when absent, not finite or beyond
    /// [`MAX_INFLATION_RATE_PERCENT`]
    pub fn known_rate(&self, region: &str) -> Option<Decimal> {
        let record = self.table.get(region)?;
        let rate = record.annual_rate_percent;
        if !rate.is_finite() {
            debug!(region, "Ignoring non-finite inflation rate");
            return None;
        }
        let usable = to_decimal(rate).filter(|r| r.abs() <= MAX_INFLATION_RATE_PERCENT);
        if usable.is_none() {
            warn!(region, rate, "Ignoring out-of-range inflation rate");
        }
        usable
    }
}

/// Computes `Σ share_i × rate(region_i)` in percent.
///
/// Shares are at most 1 and rates are bounded, so each term stays in range.
pub struct InflationRiskScorer<'a> {
    rates: InflationRates<'a>,
}

impl<'a> InflationRiskScorer<'a> {
    pub fn new(rates: InflationRates<'a>) -> Self {
        Self { rates }
    }

    /// Weighted inflation risk, never negative; 0 for an empty portfolio
    pub fn score(&self, portfolio: &AggregatedPortfolio) -> Decimal {
        if portfolio.is_empty() {
            return Decimal::ZERO;
        }

        let mut weighted = Decimal::ZERO;
        for holding in &portfolio.holdings {
            let share = holding.value_usd / portfolio.total_value;
            let term = share.checked_mul(self.rates.rate(&holding.region));
            match term.and_then(|t| weighted.checked_add(t)) {
                Some(sum) => weighted = sum,
                None => warn!(symbol = %holding.symbol, "Skipping holding whose risk term overflows"),
            }
        }

        weighted.max(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataSource, TokenHolding};
    use rust_decimal_macros::dec;

    fn table() -> InflationTable {
        InflationTable::new()
            .with_rate("USA", 3.0, DataSource::Live)
            .with_rate("Africa", 10.0, DataSource::Cached)
            .with_rate("Asia", f64::NAN, DataSource::Estimated)
    }

    #[test]
    fn test_weighted_average() {
        let table = table();
        let scorer = InflationRiskScorer::new(InflationRates::new(&table, dec!(3)));
        let portfolio = AggregatedPortfolio::from_holdings(vec![
            TokenHolding::new("CUSD", 42220, "USA", dec!(750)),
            TokenHolding::new("CKES", 42220, "Africa", dec!(250)),
        ]);

        assert_eq!(scorer.score(&portfolio), dec!(4.75));
    }

    #[test]
    fn test_fallback_rate() {
        let table = table();
        let rates = InflationRates::new(&table, dec!(2.5));

        assert_eq!(rates.rate("Europe"), dec!(2.5));
        assert_eq!(rates.rate("Asia"), dec!(2.5));
        assert_eq!(rates.known_rate("Asia"), None);
        assert_eq!(rates.rate("Africa"), dec!(10));
    }

    #[test]
    fn test_absurd_rate_falls_back_to_default() {
        let table = InflationTable::new()
            .with_rate("USA", 1e27, DataSource::Live)
            .with_rate("Europe", -1e13, DataSource::Live);
        let rates = InflationRates::new(&table, dec!(3));
        let scorer = InflationRiskScorer::new(rates);
        let portfolio =
            AggregatedPortfolio::from_holdings(vec![TokenHolding::new("USDC", 1, "USA", dec!(1000))]);

        assert_eq!(rates.known_rate("USA"), None);
        assert_eq!(rates.known_rate("Europe"), None);
        assert_eq!(scorer.score(&portfolio), dec!(3));
    }

    #[test]
    fn test_large_holdings_stay_in_range() {
        let table = InflationTable::new().with_rate("USA", 1e12, DataSource::Live);
        let scorer = InflationRiskScorer::new(InflationRates::new(&table, dec!(3)));
        let portfolio = AggregatedPortfolio::from_holdings(vec![
            TokenHolding::new("USDC", 1, "USA", dec!(1000000000000000)),
            TokenHolding::new("USDT", 1, "USA", dec!(1000000000000000)),
        ]);

        assert_eq!(scorer.score(&portfolio), dec!(1000000000000));
    }

    #[test]
    fn test_empty_portfolio_has_no_risk() {
        let table = table();
        let scorer = InflationRiskScorer::new(InflationRates::new(&table, dec!(3)));
        assert_eq!(scorer.score(&AggregatedPortfolio::default()), Decimal::ZERO);
    }

    #[test]
    fn test_deflation_floors_at_zero() {
        let table = InflationTable::new().with_rate("Asia", -1.0, DataSource::Live);
        let scorer = InflationRiskScorer::new(InflationRates::new(&table, dec!(3)));
        let portfolio =
            AggregatedPortfolio::from_holdings(vec![TokenHolding::new("PUSO", 42220, "Asia", dec!(100))]);

        assert_eq!(scorer.score(&portfolio), Decimal::ZERO);
    }
}
