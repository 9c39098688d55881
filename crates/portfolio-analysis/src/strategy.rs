use std::collections::HashMap;

use analysis_core::{AnalysisError, BacktestSummary};
use serde::Serialize;

use crate::backtest::{final_value, narrate_summary, RiskTier};
use crate::models::{OptimizationContext, SectorWeight};
use crate::sectors::{aggregate_by_sector, narrate_sectors};

/// Sector composition and historical simulation of the optimized portfolio.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyReport {
    pub sectors: Vec<SectorWeight>,
    pub sector_narrative: String,
    pub backtest: BacktestSummary,
    pub initial_capital: f64,
    pub final_value: f64,
    pub risk_tier: Option<RiskTier>,
    pub backtest_narrative: String,
}

pub struct StrategyAnalyzer {
    initial_capital: f64,
}

impl StrategyAnalyzer {
    pub fn new(initial_capital: f64) -> Self {
        Self { initial_capital }
    }

    /// `sectors` maps ticker to sector label; unknown tickers fall into the catch-all sector.
    pub fn analyze(
        &self,
        context: &OptimizationContext,
        sectors: &HashMap<String, String>,
        backtest: BacktestSummary,
    ) -> Result<StrategyReport, AnalysisError> {
        context.validate()?;
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(AnalysisError::InvalidData(format!(
                "initial capital must be positive, got {}",
                self.initial_capital
            )));
        }

        let allocation = aggregate_by_sector(&context.weights, sectors);
        tracing::debug!(sectors = allocation.len(), "aggregated sector weights");

        Ok(StrategyReport {
            sector_narrative: narrate_sectors(&allocation),
            sectors: allocation,
            final_value: final_value(backtest.total_return, self.initial_capital),
            risk_tier: RiskTier::from_drawdown(backtest.max_drawdown),
            backtest_narrative: narrate_summary(&backtest, self.initial_capital),
            backtest,
            initial_capital: self.initial_capital,
        })
    }
}

impl Default for StrategyAnalyzer {
    fn default() -> Self {
        Self::new(10_000.0)
    }
}
