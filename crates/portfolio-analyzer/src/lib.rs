//! # portfolio-analyzer
//!
//! Diversification and inflation-hedge analysis for stablecoin portfolios
//! spread across chains and monetary regions.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────┐   ┌───────────────┐   ┌────────────┐
//! │  Aggregator  │──▶│ Diversification      │──▶│  Rebalancing  │──▶│ Projection │
//! │ (per-chain → │   │ + Inflation risk     │   │ opportunities │   │ (3 years)  │
//! │  holdings)   │   │                      │   │ (ranked)      │   │            │
//! └──────────────┘   └──────────────────────┘   └───────────────┘   └────────────┘
//!                                                                         │
//!                                                       PortfolioAnalysis ◀┘
//! ```
//!
//! Every stage is a pure function. The engine does no I/O and holds no
//! state between calls, so identical input always gives identical output.
//!
//! ## Example: $1000 split between two regions
//!
//! ```text
//! │  TOKA  (region A,  8% inflation)  $500
//! │  TOKB  (region B,  2% inflation)  $500
//! │
//! │  Weighted inflation risk: 5%
//! │  Opportunity: TOKA → TOKB, $250, 6 points, saves $15/yr
//! ```

pub mod action;
pub mod aggregator;
pub mod analysis;
pub mod config;
pub mod error;
pub mod model;
pub mod region;
pub mod strategy;

pub use action::{HoldReason, RecommendedAction};
pub use aggregator::{AggregationMode, PortfolioAggregator};
pub use analysis::{PortfolioAnalysis, PortfolioAnalyzer, parse_request, parse_request_value};
pub use config::{EngineConfig, RebalanceThresholds};
pub use error::{AnalyzerError, Result};
pub use model::{
    AggregatedPortfolio, AnalysisRequest, ChainBalances, ConcentrationRisk, DataSource,
    InflationTable, MacroContext, PortfolioSnapshot, Priority, Projection, RawBalance,
    RebalancingOpportunity, RegionalInflationRecord, TokenHolding,
};
pub use region::RegionClassifier;
