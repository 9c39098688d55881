use analysis_core::format::{money, percent};
use analysis_core::BacktestSummary;
use serde::{Deserialize, Serialize};

/// Risk tier derived from the maximum drawdown (a negative fraction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskTier {
    VeryLow,
    Moderate,
    Significant,
}

impl RiskTier {
    /// Boundaries fall into the lower-magnitude tier: -0.10 is moderate, -0.25 significant.
    pub fn from_drawdown(max_drawdown: f64) -> Option<RiskTier> {
        if !max_drawdown.is_finite() {
            None
        } else if max_drawdown > -0.10 {
            Some(RiskTier::VeryLow)
        } else if max_drawdown > -0.25 {
            Some(RiskTier::Moderate)
        } else {
            Some(RiskTier::Significant)
        }
    }
}

pub fn final_value(total_return: f64, initial_capital: f64) -> f64 {
    initial_capital * (1.0 + total_return)
}

/// Narrate the dollar outcome and the risk tier of a backtest.
pub fn narrate_backtest(total_return: f64, max_drawdown: f64, initial_capital: f64) -> String {
    let mut text = if total_return.is_finite() && initial_capital.is_finite() {
        format!(
            "Con un capital inicial de **{}**, la estrategia habría alcanzado un valor final de **{}**, lo que representa un retorno total de **{}** en el período simulado.",
            money(initial_capital),
            money(final_value(total_return, initial_capital)),
            percent(total_return, 2)
        )
    } else {
        "No se dispone del retorno total de la simulación para estimar el capital final.".to_string()
    };

    let drawdown = percent(max_drawdown.abs(), 2);
    let risk = match RiskTier::from_drawdown(max_drawdown) {
        Some(RiskTier::VeryLow) => format!(
            "🟢 **Riesgo muy bajo:** La caída máxima desde un pico fue de solo **{}**, lo que indica un recorrido muy estable del capital.",
            drawdown
        ),
        Some(RiskTier::Moderate) => format!(
            "🟡 **Riesgo moderado:** La caída máxima desde un pico fue de **{}**. El inversor debe estar preparado para retrocesos temporales de esta magnitud.",
            drawdown
        ),
        Some(RiskTier::Significant) => format!(
            "🔴 **Riesgo significativo:** En su peor momento, el portafolio llegó a perder un **{}** desde su pico. Este nivel de caída exige una alta tolerancia al riesgo.",
            drawdown
        ),
        None => "No se dispone de la caída máxima para evaluar el riesgo de la estrategia.".to_string(),
    };

    text.push_str("\n\n");
    text.push_str(&risk);
    text
}

/// Narrate a whole summary; volatility and Sharpe are reported as metrics, not narrated.
pub fn narrate_summary(summary: &BacktestSummary, initial_capital: f64) -> String {
    narrate_backtest(summary.total_return, summary.max_drawdown, initial_capital)
}
