//! Portfolio Aggregation
//!
//! Normalizes per-chain balances into one list of holdings with USD value
//! and region. Bad balances are dropped, never fatal.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::model::{
    AggregatedPortfolio, MAX_BALANCE_USD, PortfolioSnapshot, TokenHolding, to_decimal,
};
use crate::region::RegionClassifier;

/// Whether to expose per-chain holdings next to the merged view
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AggregationMode {
    #[default]
    Combined,
    PerChain,
}

/// Builds an `AggregatedPortfolio` from a raw snapshot
pub struct PortfolioAggregator<'a> {
    classifier: &'a RegionClassifier,
    dust_floor: Decimal,
    mode: AggregationMode,
}

impl<'a> PortfolioAggregator<'a> {
    pub fn new(classifier: &'a RegionClassifier, dust_floor: Decimal) -> Self {
        Self {
            classifier,
            dust_floor,
            mode: AggregationMode::Combined,
        }
    }

    pub fn with_mode(mut self, mode: AggregationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Aggregate a snapshot. Empty or fully invalid input yields an empty portfolio.
    pub fn aggregate(&self, snapshot: &PortfolioSnapshot) -> AggregatedPortfolio {
        let mut per_chain: Vec<TokenHolding> = Vec::new();
        let mut running_total = Decimal::ZERO;

        for chain in &snapshot.chains {
            for balance in &chain.balances {
                let Some(value) = self.accept_value(&balance.symbol, chain.chain_id, balance.value_usd)
                else {
                    continue;
                };
                let Some(total) = running_total.checked_add(value) else {
                    warn!(
                        symbol = %balance.symbol,
                        chain_id = chain.chain_id,
                        "Skipping balance that overflows the portfolio total"
                    );
                    continue;
                };
                running_total = total;

                let symbol = balance.symbol.trim().to_uppercase();
                let region = self.classifier.classify(&symbol);
                per_chain.push(TokenHolding::new(symbol, chain.chain_id, region, value));
            }
        }

        // Every merged value is bounded by the running total.
        let mut merged: Vec<TokenHolding> = Vec::new();
        for holding in &per_chain {
            match merged.iter_mut().find(|h| h.symbol == holding.symbol) {
                Some(existing) => existing.value_usd += holding.value_usd,
                None => merged.push(holding.clone()),
            }
        }
        sort_holdings(&mut merged);

        let mut portfolio = AggregatedPortfolio::from_holdings(merged);
        // Merged holdings only remember their first chain.
        portfolio.chains = per_chain.iter().map(|h| h.chain_id).collect::<BTreeSet<_>>();

        if let Some(claimed) = snapshot.total_value.and_then(to_decimal) {
            if claimed.round_dp(2) != portfolio.total_value.round_dp(2) {
                warn!(
                    claimed = %claimed,
                    computed = %portfolio.total_value,
                    "Caller-supplied total disagrees with balances, using computed total"
                );
            }
        }

        if self.mode == AggregationMode::PerChain {
            sort_holdings(&mut per_chain);
            portfolio.per_chain = Some(per_chain);
        }

        debug!(
            holdings = portfolio.holdings.len(),
            chains = portfolio.chains.len(),
            total = %portfolio.total_value,
            "Aggregated portfolio"
        );

        portfolio
    }

    /// Convert a raw value, rejecting malformed numbers and dust
    fn accept_value(&self, symbol: &str, chain_id: u64, raw: f64) -> Option<Decimal> {
        if !raw.is_finite() || raw < 0.0 {
            warn!(symbol, chain_id, value = raw, "Skipping malformed balance");
            return None;
        }

        let Some(value) = to_decimal(raw).filter(|v| *v <= MAX_BALANCE_USD) else {
            warn!(symbol, chain_id, value = raw, "Skipping out-of-range balance");
            return None;
        };
        if value < self.dust_floor {
            debug!(symbol, chain_id, %value, "Skipping dust balance");
            return None;
        }
        Some(value)
    }
}

/// Value descending, then symbol, then chain
fn sort_holdings(holdings: &mut [TokenHolding]) {
    holdings.sort_by(|a, b| {
        b.value_usd
            .cmp(&a.value_usd)
            .then_with(|| a.symbol.cmp(&b.symbol))
            .then_with(|| a.chain_id.cmp(&b.chain_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChainBalances, RawBalance};
    use rust_decimal_macros::dec;

    fn snapshot() -> PortfolioSnapshot {
        PortfolioSnapshot::new(vec![
            ChainBalances::new(
                42220,
                vec![
                    RawBalance::new("cUSD", 300.0),
                    RawBalance::new("cKES", 120.5),
                    RawBalance::new("cEUR", 0.004),
                ],
            ),
            ChainBalances::new(
                1,
                vec![
                    RawBalance::new("CUSD", 200.0),
                    RawBalance::new("EURC", 80.0),
                    RawBalance::new("MYSTERY", 10.0),
                ],
            ),
        ])
    }

    #[test]
    fn test_merges_symbols_across_chains() {
        let classifier = RegionClassifier::stablecoins();
        let portfolio = PortfolioAggregator::new(&classifier, dec!(0.01)).aggregate(&snapshot());

        assert_eq!(portfolio.total_value, dec!(710.5));
        assert_eq!(portfolio.holdings.len(), 4);
        assert_eq!(portfolio.holdings[0].symbol, "CUSD");
        assert_eq!(portfolio.holdings[0].value_usd, dec!(500));
        assert_eq!(portfolio.holdings[0].chain_id, 42220);
        assert_eq!(portfolio.holdings[3].region, "Global");
        assert_eq!(portfolio.chains.iter().copied().collect::<Vec<_>>(), vec![1, 42220]);
        assert!(portfolio.per_chain.is_none());
    }

    #[test]
    fn test_per_chain_view() {
        let classifier = RegionClassifier::stablecoins();
        let portfolio = PortfolioAggregator::new(&classifier, dec!(0.01))
            .with_mode(AggregationMode::PerChain)
            .aggregate(&snapshot());

        let per_chain = portfolio.per_chain.expect("per-chain view");
        assert_eq!(per_chain.len(), 5);
        assert_eq!(per_chain[0].symbol, "CUSD");
        assert_eq!(per_chain[0].value_usd, dec!(300));
        assert_eq!(portfolio.holdings.len(), 4);
    }

    #[test]
    fn test_drops_malformed_and_dust() {
        let classifier = RegionClassifier::stablecoins();
        let snapshot = PortfolioSnapshot::new(vec![ChainBalances::new(
            42220,
            vec![
                RawBalance::new("cUSD", f64::NAN),
                RawBalance::new("cEUR", -5.0),
                RawBalance::new("cKES", f64::INFINITY),
                RawBalance::new("cREAL", 0.009),
                RawBalance::new("PUSO", 12.0),
            ],
        )])
        .with_total(9_999.0);

        let portfolio = PortfolioAggregator::new(&classifier, dec!(0.01)).aggregate(&snapshot);
        assert_eq!(portfolio.holdings.len(), 1);
        assert_eq!(portfolio.total_value, dec!(12));
    }

    #[test]
    fn test_out_of_range_balances_are_dropped() {
        let classifier = RegionClassifier::stablecoins();
        let snapshot = PortfolioSnapshot::new(vec![ChainBalances::new(
            1,
            vec![
                RawBalance::new("USDC", 6e28),
                RawBalance::new("USDT", 6e28),
                RawBalance::new("DAI", 1e40),
                RawBalance::new("EURC", 250.0),
            ],
        )]);

        let portfolio = PortfolioAggregator::new(&classifier, dec!(0.01)).aggregate(&snapshot);
        assert_eq!(portfolio.holdings.len(), 1);
        assert_eq!(portfolio.holdings[0].symbol, "EURC");
        assert_eq!(portfolio.total_value, dec!(250));
    }

    #[test]
    fn test_balance_at_ceiling_is_kept() {
        let classifier = RegionClassifier::stablecoins();
        let snapshot = PortfolioSnapshot::new(vec![
            ChainBalances::new(1, vec![RawBalance::new("USDC", 1e15)]),
            ChainBalances::new(8453, vec![RawBalance::new("USDC", 1e15)]),
        ]);

        let portfolio = PortfolioAggregator::new(&classifier, dec!(0.01)).aggregate(&snapshot);
        assert_eq!(portfolio.total_value, MAX_BALANCE_USD * dec!(2));
        assert_eq!(portfolio.holdings[0].value_usd, portfolio.total_value);
    }

    #[test]
    fn test_empty_snapshot() {
        let classifier = RegionClassifier::stablecoins();
        let portfolio =
            PortfolioAggregator::new(&classifier, dec!(0.01)).aggregate(&PortfolioSnapshot::default());

        assert_eq!(portfolio.total_value, Decimal::ZERO);
        assert!(portfolio.holdings.is_empty());
        assert!(portfolio.chains.is_empty());
        assert!(portfolio.is_empty());
    }
}
