use analysis_core::format::fixed_or_na;
use serde::{Deserialize, Serialize};

pub const OVERBOUGHT_RSI: f64 = 70.0;
pub const OVERSOLD_RSI: f64 = 30.0;

const CAUTION_WITHOUT_MOMENTUM: &str = "⚠️ **Señal de Precaución:** La tendencia principal es alcista, pero no hay datos suficientes para medir el momento (RSI). Se recomienda confirmar el impulso antes de entrar.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Trend {
    Uptrend,
    Downtrend,
    Undefined,
}

impl Trend {
    /// Short SMA above long SMA is an uptrend; anything else with both defined is a downtrend.
    pub fn from_averages(sma_short: Option<f64>, sma_long: Option<f64>) -> Self {
        match (defined(sma_short), defined(sma_long)) {
            (Some(short), Some(long)) if short > long => Trend::Uptrend,
            (Some(_), Some(_)) => Trend::Downtrend,
            _ => Trend::Undefined,
        }
    }

    fn emoji(&self) -> &'static str {
        match self {
            Trend::Uptrend => "📈",
            Trend::Downtrend => "📉",
            Trend::Undefined => "❔",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Trend::Uptrend => "Alcista",
            Trend::Downtrend => "Bajista",
            Trend::Undefined => "Indeterminada",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Momentum {
    Overbought,
    Oversold,
    Neutral,
    Undefined,
}

impl Momentum {
    pub fn from_rsi(rsi: Option<f64>) -> Self {
        match defined(rsi) {
            Some(r) if r > OVERBOUGHT_RSI => Momentum::Overbought,
            Some(r) if r < OVERSOLD_RSI => Momentum::Oversold,
            Some(_) => Momentum::Neutral,
            None => Momentum::Undefined,
        }
    }

    fn emoji(&self) -> &'static str {
        match self {
            Momentum::Overbought => "🥵",
            Momentum::Oversold => "🥶",
            Momentum::Neutral => "😐",
            Momentum::Undefined => "❔",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Momentum::Overbought => "Sobrecompra",
            Momentum::Oversold => "Sobreventa",
            Momentum::Neutral => "Neutral",
            Momentum::Undefined => "Indeterminado",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    StrongBuy,
    AccumulateHold,
    Caution,
    ElevatedRisk,
    Indeterminate,
}

impl Verdict {
    /// Trend decides first; momentum only refines an uptrend.
    pub fn lookup(trend: Trend, momentum: Momentum) -> Self {
        match (trend, momentum) {
            (Trend::Undefined, _) => Verdict::Indeterminate,
            (Trend::Downtrend, _) => Verdict::ElevatedRisk,
            (Trend::Uptrend, Momentum::Oversold) => Verdict::StrongBuy,
            (Trend::Uptrend, Momentum::Neutral) => Verdict::AccumulateHold,
            (Trend::Uptrend, Momentum::Overbought | Momentum::Undefined) => Verdict::Caution,
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Verdict::StrongBuy => "🟢 **Señal de Compra Fuerte:** La acción está en una tendencia alcista y parece estar en un punto bajo (sobrevendida), lo que podría representar una excelente oportunidad de entrada.",
            Verdict::AccumulateHold => "🟡 **Señal de Acumulación/Mantener:** La acción sigue su tendencia alcista principal sin señales de agotamiento. Es un buen momento para mantener o añadir posiciones de forma gradual.",
            Verdict::Caution => "⚠️ **Señal de Precaución:** Aunque la tendencia principal es fuerte, el activo está sobrecomprado. Existe un riesgo de corrección a corto plazo. Se recomienda esperar un retroceso antes de entrar.",
            Verdict::ElevatedRisk => "🔴 **Señal de Riesgo Elevado:** La acción se encuentra en una tendencia bajista. A pesar de posibles rebotes, el riesgo de que continúe cayendo es alto. Generalmente se recomienda evitar la compra hasta que la tendencia se revierta.",
            Verdict::Indeterminate => "⚪ **Señal Indeterminada:** No hay suficientes datos históricos para establecer la tendencia principal. Se recomienda esperar a disponer de más historial antes de tomar una decisión.",
        }
    }

    /// Verdict text for the momentum that produced it. Caution without an RSI does not
    /// claim the asset is overbought.
    pub fn text_for(&self, momentum: Momentum) -> &'static str {
        match (self, momentum) {
            (Verdict::Caution, Momentum::Undefined) => CAUTION_WITHOUT_MOMENTUM,
            _ => self.text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub trend: Trend,
    pub momentum: Momentum,
    pub verdict: Verdict,
    pub summary: String,
    pub verdict_text: String,
}

fn defined(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

/// Classify trend and momentum and look up the entry-point verdict.
/// Unavailable numbers print as `N/A` in the summary.
pub fn interpret(
    rsi: Option<f64>,
    sma_short: Option<f64>,
    sma_long: Option<f64>,
    price: Option<f64>,
) -> Interpretation {
    let trend = Trend::from_averages(sma_short, sma_long);
    let momentum = Momentum::from_rsi(rsi);
    let verdict = Verdict::lookup(trend, momentum);

    let summary = format!(
        "**Tendencia:** {} {} (SMA50 vs SMA200) | **Momento:** {} {} (RSI: {}) | **Precio:** {}",
        trend.emoji(),
        trend.label(),
        momentum.emoji(),
        momentum.label(),
        fixed_or_na(rsi, 2),
        fixed_or_na(price, 2),
    );

    Interpretation {
        trend,
        momentum,
        verdict,
        summary,
        verdict_text: verdict.text_for(momentum).to_string(),
    }
}
