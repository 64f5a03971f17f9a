//! Portfolio Analysis
//!
//! Runs the full pipeline (aggregate, score, rank, project) and assembles
//! the immutable result consumed by the advice layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::action::{HoldReason, RecommendedAction};
use crate::aggregator::{AggregationMode, PortfolioAggregator};
use crate::config::EngineConfig;
use crate::error::{AnalyzerError, Result};
use crate::model::{
    AnalysisRequest, ConcentrationRisk, MacroContext, Projection, RebalancingOpportunity,
    TokenHolding,
};
use crate::region::RegionClassifier;
use crate::strategy::{
    DiversificationScorer, InflationRates, InflationRiskScorer, ProjectionEngine,
    RebalancingOpportunityGenerator,
};

/// Complete result of one analysis call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAnalysis {
    pub total_value: Decimal,
    pub token_count: usize,
    pub region_count: usize,

    /// 0-100
    pub diversification_score: u8,

    /// Value-weighted inflation, percent
    pub weighted_inflation_risk: Decimal,

    pub concentration_risk: ConcentrationRisk,
    pub over_exposed_regions: Vec<String>,
    pub missing_regions: Vec<String>,

    /// Highest priority first, capped
    pub rebalancing_opportunities: Vec<RebalancingOpportunity>,

    /// Opportunities found before capping
    pub total_opportunity_count: usize,

    pub projection: Projection,

    pub holdings: Vec<TokenHolding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_chain_holdings: Option<Vec<TokenHolding>>,

    pub goal: Option<String>,
    pub context: Option<MacroContext>,
}

impl PortfolioAnalysis {
    pub fn top_opportunity(&self) -> Option<&RebalancingOpportunity> {
        self.rebalancing_opportunities.first()
    }

    /// Opportunities left out by the cap, for "+N more"
    pub fn hidden_opportunity_count(&self) -> usize {
        self.total_opportunity_count
            .saturating_sub(self.rebalancing_opportunities.len())
    }

    /// Actions for the advice layer, best first
    pub fn recommended_actions(&self) -> Vec<RecommendedAction> {
        if self.total_value <= Decimal::ZERO {
            return vec![RecommendedAction::Hold {
                reason: HoldReason::EmptyPortfolio,
            }];
        }
        if self.rebalancing_opportunities.is_empty() {
            return vec![RecommendedAction::Hold {
                reason: HoldReason::NoMaterialOpportunity,
            }];
        }
        self.rebalancing_opportunities
            .iter()
            .map(RecommendedAction::from)
            .collect()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text report for prompts and terminals
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str("═══ PORTFOLIO INFLATION ANALYSIS ═══\n\n");

        s.push_str(&format!("Total value:        ${:.2}\n", self.total_value));
        s.push_str(&format!(
            "Holdings:           {} tokens across {} regions\n",
            self.token_count, self.region_count
        ));
        s.push_str(&format!("Diversification:    {}/100\n", self.diversification_score));
        s.push_str(&format!("Concentration risk: {}\n", self.concentration_risk));
        s.push_str(&format!(
            "Inflation exposure: {:.2}% per year\n",
            self.weighted_inflation_risk
        ));
        if let Some(goal) = &self.goal {
            s.push_str(&format!("Goal:               {goal}\n"));
        }

        if !self.over_exposed_regions.is_empty() {
            s.push_str(&format!("\nOver-exposed: {}\n", self.over_exposed_regions.join(", ")));
        }
        if !self.missing_regions.is_empty() {
            s.push_str(&format!("Not held:     {}\n", self.missing_regions.join(", ")));
        }

        s.push_str("\nRebalancing Opportunities:\n");
        if self.rebalancing_opportunities.is_empty() {
            s.push_str("  None worth acting on right now\n");
        }
        for (i, o) in self.rebalancing_opportunities.iter().enumerate() {
            s.push_str(&format!(
                "  {}. [{}] {} → {}  ${:.2}  ({}: {:.1}% → {}: {:.1}%, saves ${:.2}/yr)\n",
                i + 1,
                o.priority,
                o.from_token,
                o.to_token,
                o.suggested_amount,
                o.from_region,
                o.from_inflation,
                o.to_region,
                o.to_inflation,
                o.annual_savings
            ));
        }
        let hidden = self.hidden_opportunity_count();
        if hidden > 0 {
            s.push_str(&format!("  +{hidden} more\n"));
        }

        let p = &self.projection;
        s.push_str(&format!("\n{}-Year Projection:\n", p.timeframe_years));
        s.push_str(&format!("  Do nothing:  ${:.2}\n", p.current_path_value));
        s.push_str(&format!("  Rebalance:   ${:.2}\n", p.optimized_path_value));
        s.push_str(&format!("  Difference:  ${:.2}\n", p.difference));

        s
    }
}

/// Entry point for running analyses with a fixed classifier and config
#[derive(Clone, Debug)]
pub struct PortfolioAnalyzer {
    classifier: RegionClassifier,
    config: EngineConfig,
    mode: AggregationMode,
}

impl Default for PortfolioAnalyzer {
    fn default() -> Self {
        Self::new(RegionClassifier::stablecoins(), EngineConfig::default())
    }
}

impl PortfolioAnalyzer {
    pub fn new(classifier: RegionClassifier, config: EngineConfig) -> Self {
        Self {
            classifier,
            config,
            mode: AggregationMode::Combined,
        }
    }

    pub fn with_mode(mut self, mode: AggregationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn classifier(&self) -> &RegionClassifier {
        &self.classifier
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full pipeline. Never fails; bad data degrades to defaults.
    pub fn analyze(&self, request: &AnalysisRequest) -> PortfolioAnalysis {
        let config = &self.config;
        let portfolio = PortfolioAggregator::new(&self.classifier, config.dust_floor)
            .with_mode(self.mode)
            .aggregate(&request.portfolio);

        let diversification =
            DiversificationScorer::new(&self.classifier, config.over_exposure_threshold)
                .score(&portfolio);

        let rates = InflationRates::new(&request.inflation, config.default_inflation_rate);
        let inflation_risk = InflationRiskScorer::new(rates).score(&portfolio);

        let plan = RebalancingOpportunityGenerator::new(&self.classifier, rates, &config.rebalance)
            .generate(&portfolio);

        let projection = ProjectionEngine::new(config.projection_years).project(
            portfolio.total_value,
            inflation_risk,
            plan.top(),
        );

        debug!(
            score = diversification.score,
            hhi = diversification.hhi,
            entropy_ratio = diversification.entropy_ratio,
            risk = %inflation_risk,
            "Scored portfolio"
        );
        info!(
            total = %portfolio.total_value,
            opportunities = plan.total_count,
            "Portfolio analysis complete"
        );

        PortfolioAnalysis {
            total_value: portfolio.total_value,
            token_count: portfolio.holdings.len(),
            region_count: portfolio.region_count(),
            diversification_score: diversification.score,
            weighted_inflation_risk: inflation_risk.round_dp(4),
            concentration_risk: diversification.concentration_risk,
            over_exposed_regions: diversification.over_exposed_regions,
            missing_regions: diversification.missing_regions,
            rebalancing_opportunities: plan.opportunities,
            total_opportunity_count: plan.total_count,
            projection,
            holdings: portfolio.holdings,
            per_chain_holdings: portfolio.per_chain,
            goal: request.goal.clone(),
            context: request.context.clone(),
        }
    }

    /// Parse a JSON request and analyze it
    pub fn analyze_json(&self, json: &str) -> Result<PortfolioAnalysis> {
        let request = parse_request(json)?;
        Ok(self.analyze(&request))
    }
}

/// Parse a JSON analysis request. Wrong types at the boundary are a
/// `Validation` error; unknown fields are ignored.
pub fn parse_request(json: &str) -> Result<AnalysisRequest> {
    serde_json::from_str(json).map_err(|e| AnalyzerError::Validation(e.to_string()))
}

/// Same as [`parse_request`] for an already-decoded JSON value
pub fn parse_request_value(value: serde_json::Value) -> Result<AnalysisRequest> {
    serde_json::from_value(value).map_err(|e| AnalyzerError::Validation(e.to_string()))
}
