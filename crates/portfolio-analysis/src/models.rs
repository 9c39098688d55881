use analysis_core::{AnalysisError, Frequency, Period};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weights up to this far outside [0, 1] are accepted as solver rounding noise.
const WEIGHT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedAsset {
    pub ticker: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorWeight {
    pub sector: String,
    pub weight: f64,
}

/// Annualised figures reported by the optimizer for the max-Sharpe portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationPerformance {
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
}

/// The last optimization result, owned by the caller and handed to the reports
/// that build on it (strategy backtest, technical entry points).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationContext {
    pub tickers: Vec<String>,
    pub names: BTreeMap<String, String>,
    pub weights: Vec<WeightedAsset>,
    pub period: Period,
    pub frequency: Frequency,
    pub risk_free_rate: f64,
    pub performance: OptimizationPerformance,
    pub created_at: DateTime<Utc>,
}

impl OptimizationContext {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.weights.is_empty() {
            return Err(AnalysisError::InvalidData("optimization produced no weights".to_string()));
        }
        for asset in &self.weights {
            if !asset.weight.is_finite()
                || asset.weight < -WEIGHT_TOLERANCE
                || asset.weight > 1.0 + WEIGHT_TOLERANCE
            {
                return Err(AnalysisError::InvalidData(format!(
                    "weight for {} must be within [0, 1], got {}",
                    asset.ticker, asset.weight
                )));
            }
        }
        if !self.risk_free_rate.is_finite() {
            return Err(AnalysisError::InvalidData("risk-free rate must be finite".to_string()));
        }
        Ok(())
    }

    /// Display name, falling back to the ticker.
    pub fn name_of<'a>(&'a self, ticker: &'a str) -> &'a str {
        self.names.get(ticker).map(String::as_str).unwrap_or(ticker)
    }

    pub fn has_allocation(&self) -> bool {
        self.allocated().next().is_some()
    }

    /// Assets with a strictly positive weight, in context order.
    pub fn allocated(&self) -> impl Iterator<Item = &WeightedAsset> + '_ {
        self.weights.iter().filter(|w| w.weight > 0.0)
    }
}

#[cfg(test)]
pub(crate) fn sample_context(weights: &[(&str, f64)]) -> OptimizationContext {
    OptimizationContext {
        tickers: weights.iter().map(|(t, _)| t.to_string()).collect(),
        names: weights
            .iter()
            .map(|(t, _)| (t.to_string(), format!("{} Corp", t)))
            .collect(),
        weights: weights
            .iter()
            .map(|(t, w)| WeightedAsset {
                ticker: t.to_string(),
                weight: *w,
            })
            .collect(),
        period: Period::FiveYears,
        frequency: Frequency::Daily,
        risk_free_rate: 0.02,
        performance: OptimizationPerformance {
            expected_return: 0.18,
            volatility: 0.22,
            sharpe_ratio: 0.73,
        },
        created_at: Utc::now(),
    }
}
