//! Domain Models
//!
//! Boundary and result types for stablecoin portfolio analysis.
//! Money and rates use `rust_decimal` inside the engine. Raw caller input
//! keeps `f64` so NaN and negative balances can be detected and dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Sentinel region for symbols the classifier does not know
pub const GLOBAL_REGION: &str = "Global";

/// Largest single balance (USD) the engine accepts. Anything above is
/// treated as a malformed value.
pub const MAX_BALANCE_USD: Decimal = dec!(1000000000000000);

/// Largest inflation magnitude (percent) taken from a table record.
/// Records beyond it fall back to the default rate.
pub const MAX_INFLATION_RATE_PERCENT: Decimal = dec!(1000000000000);

/// Convert a caller-supplied float using its shortest decimal form, so
/// `6.8` becomes exactly `6.8`. `None` for NaN, infinities and overflow.
pub(crate) fn to_decimal(raw: f64) -> Option<Decimal> {
    if !raw.is_finite() {
        return None;
    }
    raw.to_string()
        .parse()
        .ok()
        .or_else(|| Decimal::from_f64(raw))
}

// ============================================================================
// Caller Input
// ============================================================================

/// A single token balance as reported by a chain
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBalance {
    pub symbol: String,
    #[serde(rename = "valueUSD", alias = "valueUsd")]
    pub value_usd: f64,
}

impl RawBalance {
    pub fn new(symbol: impl Into<String>, value_usd: f64) -> Self {
        Self {
            symbol: symbol.into(),
            value_usd,
        }
    }
}

/// Balances held on one chain
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainBalances {
    pub chain_id: u64,
    #[serde(default)]
    pub balances: Vec<RawBalance>,
}

impl ChainBalances {
    pub fn new(chain_id: u64, balances: Vec<RawBalance>) -> Self {
        Self { chain_id, balances }
    }
}

/// Point-in-time portfolio snapshot supplied by the orchestration layer
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    /// Caller's idea of the total. Recomputed from balances, never trusted.
    #[serde(default)]
    pub total_value: Option<f64>,

    #[serde(default)]
    pub chains: Vec<ChainBalances>,
}

impl PortfolioSnapshot {
    pub fn new(chains: Vec<ChainBalances>) -> Self {
        Self {
            total_value: None,
            chains,
        }
    }

    pub fn with_total(mut self, total_value: f64) -> Self {
        self.total_value = Some(total_value);
        self
    }
}

/// Where an inflation figure came from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Cached,
    #[default]
    Estimated,
}

/// Annual inflation for one region
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalInflationRecord {
    pub annual_rate_percent: f64,
    #[serde(default)]
    pub data_source: DataSource,
}

impl RegionalInflationRecord {
    pub fn new(annual_rate_percent: f64, data_source: DataSource) -> Self {
        Self {
            annual_rate_percent,
            data_source,
        }
    }
}

/// Regional inflation dataset keyed by region name.
///
/// The region is the map key, so a record never repeats it. [`iter`]
/// yields `(region, record)` pairs in region-name order.
///
/// [`iter`]: InflationTable::iter
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InflationTable {
    records: BTreeMap<String, RegionalInflationRecord>,
}

impl InflationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with_rate(mut self, region: impl Into<String>, rate: f64, source: DataSource) -> Self {
        self.insert(region, RegionalInflationRecord::new(rate, source));
        self
    }

    pub fn insert(&mut self, region: impl Into<String>, record: RegionalInflationRecord) {
        self.records.insert(region.into(), record);
    }

    pub fn get(&self, region: &str) -> Option<&RegionalInflationRecord> {
        self.records.get(region)
    }

    pub fn contains(&self, region: &str) -> bool {
        self.records.contains_key(region)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegionalInflationRecord)> {
        self.records
            .iter()
            .map(|(region, record)| (region.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Versioned macro-economic context threaded through to the advice layer.
///
/// Advisory only: nothing in the scoring reads it. Unknown fields are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroContext {
    #[serde(default = "MacroContext::current_version")]
    pub version: u32,

    #[serde(default)]
    pub as_of: Option<NaiveDate>,

    /// Central bank policy rate by region (percent)
    #[serde(default)]
    pub policy_rates: BTreeMap<String, f64>,

    /// Real GDP growth by region (percent)
    #[serde(default)]
    pub gdp_growth: BTreeMap<String, f64>,

    #[serde(default)]
    pub notes: Vec<String>,
}

impl Default for MacroContext {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            as_of: None,
            policy_rates: BTreeMap::new(),
            gdp_growth: BTreeMap::new(),
            notes: Vec::new(),
        }
    }
}

impl MacroContext {
    pub const CURRENT_VERSION: u32 = 1;

    fn current_version() -> u32 {
        Self::CURRENT_VERSION
    }
}

/// Everything one analysis call consumes
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub portfolio: PortfolioSnapshot,

    #[serde(default, alias = "inflationTable")]
    pub inflation: InflationTable,

    /// Free-form user goal, e.g. "hedge inflation". Does not change scoring.
    #[serde(default)]
    pub goal: Option<String>,

    #[serde(default)]
    pub context: Option<MacroContext>,
}

impl AnalysisRequest {
    pub fn new(portfolio: PortfolioSnapshot, inflation: InflationTable) -> Self {
        Self {
            portfolio,
            inflation,
            goal: None,
            context: None,
        }
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }

    pub fn with_context(mut self, context: MacroContext) -> Self {
        self.context = Some(context);
        self
    }
}

// ============================================================================
// Normalized Holdings
// ============================================================================

/// One logical holding after aggregation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHolding {
    pub symbol: String,
    pub chain_id: u64,
    pub region: String,
    pub value_usd: Decimal,
}

impl TokenHolding {
    pub fn new(
        symbol: impl Into<String>,
        chain_id: u64,
        region: impl Into<String>,
        value_usd: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            chain_id,
            region: region.into(),
            value_usd,
        }
    }
}

/// Normalized view of a portfolio across all chains
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedPortfolio {
    /// Always the sum of `holdings` values
    pub total_value: Decimal,

    /// One entry per symbol, value descending
    pub holdings: Vec<TokenHolding>,

    pub chains: BTreeSet<u64>,

    /// Un-merged holdings, only in per-chain mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_chain: Option<Vec<TokenHolding>>,
}

impl AggregatedPortfolio {
    /// Build from holdings, deriving total and chain set
    pub fn from_holdings(holdings: Vec<TokenHolding>) -> Self {
        let total_value = holdings
            .iter()
            .map(|h| h.value_usd)
            .fold(Decimal::ZERO, Decimal::saturating_add);
        let chains = holdings.iter().map(|h| h.chain_id).collect();
        Self {
            total_value,
            holdings,
            chains,
            per_chain: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_value <= Decimal::ZERO
    }

    /// Summed value per region
    pub fn region_values(&self) -> BTreeMap<&str, Decimal> {
        let mut values: BTreeMap<&str, Decimal> = BTreeMap::new();
        for holding in &self.holdings {
            let value = values.entry(holding.region.as_str()).or_default();
            *value = value.saturating_add(holding.value_usd);
        }
        values
    }

    /// Number of distinct regions with value
    pub fn region_count(&self) -> usize {
        self.region_values()
            .values()
            .filter(|v| **v > Decimal::ZERO)
            .count()
    }
}

// ============================================================================
// Analysis Results
// ============================================================================

/// Qualitative concentration tier
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConcentrationRisk {
    Low,
    Medium,
    High,
}

impl fmt::Display for ConcentrationRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// How urgently an opportunity should be surfaced
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// A proposed swap out of a higher-inflation region
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancingOpportunity {
    pub from_token: String,
    pub to_token: String,
    pub from_region: String,
    pub to_region: String,
    pub from_inflation: Decimal,
    pub to_inflation: Decimal,

    /// `from_inflation - to_inflation`, percentage points
    pub inflation_delta: Decimal,

    pub suggested_amount: Decimal,

    /// `suggested_amount * inflation_delta / 100`
    pub annual_savings: Decimal,

    pub priority: Priority,

    /// Value of the source holding, last ranking tie-break
    pub source_value: Decimal,
}

/// Do-nothing versus rebalance value projection
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub current_path_value: Decimal,
    pub optimized_path_value: Decimal,
    pub difference: Decimal,
    pub timeframe_years: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_aggregated_from_holdings() {
        let portfolio = AggregatedPortfolio::from_holdings(vec![
            TokenHolding::new("cusd", 42220, "USA", dec!(100)),
            TokenHolding::new("EURC", 1, "Europe", dec!(50)),
            TokenHolding::new("USDC", 1, "USA", dec!(25)),
        ]);

        assert_eq!(portfolio.total_value, dec!(175));
        assert_eq!(portfolio.holdings[0].symbol, "CUSD");
        assert_eq!(portfolio.chains.len(), 2);
        assert_eq!(portfolio.region_count(), 2);
        assert_eq!(portfolio.region_values()["USA"], dec!(125));
    }

    #[test]
    fn test_request_ignores_unknown_fields() {
        let json = r#"{
            "portfolio": {
                "totalValue": 10,
                "chains": [{ "chainId": 42220, "balances": [{ "symbol": "cUSD", "valueUSD": 10 }] }],
                "walletLabel": "main"
            },
            "inflation": { "USA": { "annualRatePercent": 3.1, "dataSource": "live" } },
            "goal": "inflation_protection",
            "context": { "version": 1, "asOf": "2026-01-31", "futureField": [1, 2, 3] },
            "somethingNew": true
        }"#;

        let request: AnalysisRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.portfolio.chains[0].balances[0].value_usd, 10.0);
        assert_eq!(request.inflation.get("USA").unwrap().data_source, DataSource::Live);
        assert_eq!(request.goal.as_deref(), Some("inflation_protection"));

        let context = request.context.unwrap();
        assert_eq!(context.version, 1);
        assert_eq!(context.as_of, NaiveDate::from_ymd_opt(2026, 1, 31));
    }

    #[test]
    fn test_inflation_table_iterates_by_region() {
        let table = InflationTable::new()
            .with_rate("USA", 3.1, DataSource::Live)
            .with_rate("Africa", 6.8, DataSource::Cached);

        let regions: Vec<&str> = table.iter().map(|(region, _)| region).collect();
        assert_eq!(regions, vec!["Africa", "USA"]);
        assert_eq!(table.iter().next().unwrap().1.annual_rate_percent, 6.8);
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let portfolio = AggregatedPortfolio::from_holdings(vec![
            TokenHolding::new("USDC", 1, "USA", Decimal::MAX),
            TokenHolding::new("USDT", 1, "USA", Decimal::MAX),
        ]);

        assert_eq!(portfolio.total_value, Decimal::MAX);
        assert_eq!(portfolio.region_values()["USA"], Decimal::MAX);
    }

    #[test]
    fn test_context_version_defaults() {
        let context: MacroContext = serde_json::from_str("{}").unwrap();
        assert_eq!(context.version, MacroContext::CURRENT_VERSION);
        assert!(context.policy_rates.is_empty());
        assert_eq!(context, MacroContext::default());
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(to_decimal(6.8), Some(dec!(6.8)));
        assert_eq!(to_decimal(0.1 + 0.2), Some(dec!(0.30000000000000004)));
        assert_eq!(to_decimal(-2.5), Some(dec!(-2.5)));
        assert_eq!(to_decimal(f64::NAN), None);
        assert_eq!(to_decimal(f64::NEG_INFINITY), None);
        assert_eq!(to_decimal(1e40), None);
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"HIGH\"");
        assert_eq!(serde_json::to_string(&ConcentrationRisk::Low).unwrap(), "\"LOW\"");
        assert_eq!(serde_json::to_string(&DataSource::Cached).unwrap(), "\"cached\"");
    }
}
