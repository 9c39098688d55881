use analysis_core::{PricePoint, TechnicalSnapshot};
use serde::Serialize;

use crate::indicators::{rsi, sma};
use crate::interpreter::{interpret, Interpretation};

pub const RSI_PERIOD: usize = 14;
pub const SMA_SHORT_PERIOD: usize = 50;
pub const SMA_LONG_PERIOD: usize = 200;

/// Latest RSI(14), SMA(50), SMA(200) and close. Indicators without enough history stay `None`.
pub fn snapshot_from_closes(closes: &[f64]) -> TechnicalSnapshot {
    TechnicalSnapshot {
        rsi: rsi(closes, RSI_PERIOD).last().copied(),
        sma_short: sma(closes, SMA_SHORT_PERIOD).last().copied(),
        sma_long: sma(closes, SMA_LONG_PERIOD).last().copied(),
        price: closes.last().copied(),
    }
}

/// Entry-point reading for one ticker.
#[derive(Debug, Clone, Serialize)]
pub struct TechnicalReport {
    pub ticker: String,
    pub snapshot: TechnicalSnapshot,
    pub interpretation: Interpretation,
    /// Set when any indicator could not be computed.
    pub insufficient_history: bool,
}

pub struct TechnicalAnalysisEngine;

impl TechnicalAnalysisEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, ticker: &str, prices: &[PricePoint]) -> TechnicalReport {
        let closes: Vec<f64> = prices
            .iter()
            .map(|p| p.close)
            .filter(|c| c.is_finite())
            .collect();
        let snapshot = snapshot_from_closes(&closes);
        let interpretation = interpret(snapshot.rsi, snapshot.sma_short, snapshot.sma_long, snapshot.price);

        TechnicalReport {
            ticker: ticker.to_string(),
            insufficient_history: snapshot.rsi.is_none()
                || snapshot.sma_short.is_none()
                || snapshot.sma_long.is_none(),
            snapshot,
            interpretation,
        }
    }
}

impl Default for TechnicalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
