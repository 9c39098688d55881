use analysis_core::format::percent;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{OptimizationContext, OptimizationPerformance, WeightedAsset};

/// Top weight above this share reads as a focused strategy.
pub const FOCUSED_WEIGHT: f64 = 0.5;
/// Assets above this weight count as relevant for the diversified reading.
pub const RELEVANT_WEIGHT: f64 = 0.05;
/// Slices at or below this weight are left out of the distribution chart.
pub const CHART_MIN_WEIGHT: f64 = 0.001;

const NO_POSITIVE_ALLOCATION: &str = "No se pudo generar un portafolio con asignaciones positivas.";

fn display_name<'a>(names: &'a BTreeMap<String, String>, ticker: &'a str) -> &'a str {
    names.get(ticker).map(String::as_str).unwrap_or(ticker)
}

/// Narrate a max-Sharpe allocation.
///
/// The leading asset is the first one holding the maximum weight. Assets with an exact
/// zero weight are listed as excluded.
pub fn narrate_optimization(
    weights: &[WeightedAsset],
    performance: &OptimizationPerformance,
    names: &BTreeMap<String, String>,
) -> String {
    let leader = weights
        .iter()
        .filter(|w| w.weight > 0.0)
        .fold(None::<&WeightedAsset>, |best, w| match best {
            Some(b) if b.weight >= w.weight => Some(b),
            _ => Some(w),
        });
    let leader = match leader {
        Some(l) => l,
        None => return NO_POSITIVE_ALLOCATION.to_string(),
    };
    let leader_name = display_name(names, &leader.ticker);
    let relevant = weights.iter().filter(|w| w.weight > RELEVANT_WEIGHT).count();

    let mut text = format!(
        "El portafolio óptimo, con un Ratio de Sharpe de **{:.2}**, proyecta un rendimiento anual del **{}** y una volatilidad del **{}**.\n\n",
        performance.sharpe_ratio,
        percent(performance.expected_return, 2),
        percent(performance.volatility, 2)
    );

    if leader.weight > FOCUSED_WEIGHT {
        text.push_str(&format!(
            "**Estrategia Enfocada:** El modelo asigna la mayor parte del capital (**{}**) a **{} ({})**. Esto sugiere que este activo presenta el mejor perfil de riesgo-retorno ajustado del grupo.",
            percent(leader.weight, 2),
            leader_name,
            leader.ticker
        ));
    } else if relevant > 2 {
        text.push_str(&format!(
            "**Estrategia Diversificada:** El portafolio distribuye el riesgo entre **{} activos clave**. **{} ({})** lidera la asignación con un **{}**, pero está balanceado por otros activos para mitigar la volatilidad.",
            relevant,
            leader_name,
            leader.ticker,
            percent(leader.weight, 2)
        ));
    }

    let excluded: Vec<String> = weights
        .iter()
        .filter(|w| w.weight == 0.0)
        .map(|w| format!("{} ({})", display_name(names, &w.ticker), w.ticker))
        .collect();
    if !excluded.is_empty() {
        text.push_str(&format!(
            "\n\n**Activos Excluidos:** Las empresas `{}` no fueron incluidas, ya que su inclusión no mejoraba el rendimiento ajustado por riesgo del portafolio global en el período analizado.",
            excluded.join(", ")
        ));
    }

    text
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationRow {
    pub ticker: String,
    pub name: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationReport {
    /// Every optimized asset, zero weights included.
    pub allocation: Vec<AllocationRow>,
    /// Slices for the distribution chart.
    pub distribution: Vec<AllocationRow>,
    pub performance: OptimizationPerformance,
    pub risk_free_rate: f64,
    pub risk_free_notice: String,
    pub narrative: String,
}

impl OptimizationReport {
    pub fn from_context(context: &OptimizationContext) -> Self {
        let allocation: Vec<AllocationRow> = context
            .weights
            .iter()
            .map(|w| AllocationRow {
                ticker: w.ticker.clone(),
                name: context.name_of(&w.ticker).to_string(),
                weight: w.weight,
            })
            .collect();
        let distribution = allocation
            .iter()
            .filter(|row| row.weight > CHART_MIN_WEIGHT)
            .cloned()
            .collect();

        Self {
            distribution,
            allocation,
            performance: context.performance,
            risk_free_rate: context.risk_free_rate,
            risk_free_notice: format!(
                "Cálculos realizados con una Tasa Libre de Riesgo del **{}**.",
                percent(context.risk_free_rate, 2)
            ),
            narrative: narrate_optimization(&context.weights, &context.performance, &context.names),
        }
    }
}
