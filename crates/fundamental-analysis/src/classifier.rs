//! Range-based classification of individual ratios.
//!
//! Each supported ratio owns a ladder: an ordered list of rungs tried top to bottom,
//! the first matching rung wins. The last rung of every ladder accepts any value, so a
//! finite input always lands in exactly one bucket. Adding a bucket means adding a rung.

use analysis_core::format::{grouped, percent};
use analysis_core::Ratio;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bucket {
    NotAvailable,
    Unclassified,
    // Debt/Equity
    LowLeverage,
    OptimalLeverage,
    ElevatedLeverage,
    HighRiskLeverage,
    // ROE
    ExcellentReturn,
    DesirableReturn,
    LowReturn,
    NegativeReturn,
    // Payout
    UnsustainablePayout,
    ElevatedPayout,
    ModeratePayout,
    GrowthPayout,
    NoDividend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioAssessment {
    pub bucket: Bucket,
    pub text: String,
}

struct Rung {
    matches: fn(f64) -> bool,
    bucket: Bucket,
    emoji: &'static str,
    title: &'static str,
    body: &'static str,
}

struct Caveat {
    applies: fn(f64) -> bool,
    text: &'static str,
}

struct Ladder {
    ratio: Ratio,
    /// Short metric name printed next to the value.
    metric: &'static str,
    rungs: &'static [Rung],
    caveat: Option<Caveat>,
}

const DEBT_TO_EQUITY_RUNGS: &[Rung] = &[
    Rung {
        matches: |v| v <= 0.3,
        bucket: Bucket::LowLeverage,
        emoji: "🟢",
        title: "Bajo Apalancamiento",
        body: "Estructura de capital muy conservadora, común en sectores estables. Riesgo financiero mínimo.",
    },
    Rung {
        matches: |v| v <= 1.5,
        bucket: Bucket::OptimalLeverage,
        emoji: "✅",
        title: "Apalancamiento Óptimo",
        body: "Rango saludable que muestra un buen equilibrio entre financiación con deuda y capital propio.",
    },
    Rung {
        matches: |v| v <= 2.0,
        bucket: Bucket::ElevatedLeverage,
        emoji: "🟡",
        title: "Apalancamiento Elevado",
        body: "Requiere vigilancia. La deuda es considerable y podría ser un riesgo si las ganancias caen.",
    },
    Rung {
        matches: |_| true,
        bucket: Bucket::HighRiskLeverage,
        emoji: "🔴",
        title: "Alto Riesgo de Apalancamiento",
        body: "Nivel de deuda muy alto que puede dificultar el acceso a nuevo financiamiento. Común en utilities, pero peligroso en otros sectores.",
    },
];

const ROE_RUNGS: &[Rung] = &[
    Rung {
        matches: |v| v > 0.25,
        bucket: Bucket::ExcellentReturn,
        emoji: "🏆",
        title: "Excelente Rentabilidad",
        body: "Generación de valor excepcional para el accionista, típico de líderes de mercado.",
    },
    Rung {
        matches: |v| v >= 0.10,
        bucket: Bucket::DesirableReturn,
        emoji: "🟢",
        title: "Rentabilidad Deseable",
        body: "La empresa es competitiva y está bien gestionada, generando retornos sólidos.",
    },
    Rung {
        matches: |v| v >= 0.0,
        bucket: Bucket::LowReturn,
        emoji: "🟡",
        title: "Baja Rentabilidad",
        body: "El retorno es pobre y podría no cubrir el costo de capital, indicando ineficiencia o un sector difícil.",
    },
    Rung {
        matches: |_| true,
        bucket: Bucket::NegativeReturn,
        emoji: "🔴",
        title: "Rentabilidad Negativa",
        body: "La empresa está destruyendo valor para el accionista.",
    },
];

const PAYOUT_RUNGS: &[Rung] = &[
    Rung {
        matches: |v| v > 1.0,
        bucket: Bucket::UnsustainablePayout,
        emoji: "🔴",
        title: "Payout Insostenible",
        body: "La empresa paga más en dividendos de lo que gana, financiándolo con deuda o reservas. No es viable a largo plazo.",
    },
    Rung {
        matches: |v| v >= 0.7,
        bucket: Bucket::ElevatedPayout,
        emoji: "🟡",
        title: "Payout Elevado",
        body: "Proporciona un alto rendimiento al inversor, pero deja poco margen para la reinversión y el crecimiento. Común en sectores maduros como utilities o REITs.",
    },
    Rung {
        matches: |v| v >= 0.4,
        bucket: Bucket::ModeratePayout,
        emoji: "✅",
        title: "Payout Moderado",
        body: "Representa un balance saludable entre recompensar a los accionistas y reinvertir para el crecimiento futuro.",
    },
    Rung {
        matches: |v| v > 0.0,
        bucket: Bucket::GrowthPayout,
        emoji: "🟢",
        title: "Payout de Crecimiento",
        body: "La empresa prioriza la reinversión de sus ganancias para impulsar el crecimiento futuro, típico de empresas tecnológicas o en expansión.",
    },
    Rung {
        matches: |_| true,
        bucket: Bucket::NoDividend,
        emoji: "ℹ️",
        title: "Sin Dividendo o Payout Negativo",
        body: "La empresa no paga dividendos, reinvierte todas sus ganancias o tuvo pérdidas.",
    },
];

const LADDERS: &[Ladder] = &[
    Ladder {
        ratio: Ratio::DebtToEquity,
        metric: "D/E",
        rungs: DEBT_TO_EQUITY_RUNGS,
        caveat: None,
    },
    Ladder {
        ratio: Ratio::ReturnOnEquity,
        metric: "ROE",
        rungs: ROE_RUNGS,
        caveat: Some(Caveat {
            applies: |v| v > 0.30,
            text: "*Nota: Un ROE tan alto puede ser señal de apalancamiento excesivo más que de eficiencia pura.*",
        }),
    },
    Ladder {
        ratio: Ratio::PayoutRatio,
        metric: "Payout",
        rungs: PAYOUT_RUNGS,
        caveat: None,
    },
];

/// Ratios that carry a ladder, in the order the per-company narrative lists them.
pub const KEY_RATIOS: [Ratio; 3] = [Ratio::DebtToEquity, Ratio::ReturnOnEquity, Ratio::PayoutRatio];

fn format_value(ratio: Ratio, value: f64) -> String {
    if ratio.is_percentage() {
        percent(value, 0)
    } else {
        format!("{}x", grouped(value, 2))
    }
}

fn not_available(label: &str) -> RatioAssessment {
    RatioAssessment {
        bucket: Bucket::NotAvailable,
        text: format!("**{}:** No disponible.", label),
    }
}

fn unclassified(label: &str) -> RatioAssessment {
    RatioAssessment {
        bucket: Bucket::Unclassified,
        text: format!("**{}:** Sin clasificación disponible.", label),
    }
}

/// Classify one ratio value.
///
/// Missing or non-finite values give [`Bucket::NotAvailable`]; ratios without a ladder
/// give [`Bucket::Unclassified`].
pub fn classify(ratio: Ratio, value: Option<f64>) -> RatioAssessment {
    let value = match value.filter(|v| v.is_finite()) {
        Some(v) => v,
        None => return not_available(ratio.label()),
    };

    let ladder = match LADDERS.iter().find(|l| l.ratio == ratio) {
        Some(l) => l,
        None => return unclassified(ratio.label()),
    };

    // Every ladder ends in a catch-all rung, so this only falls through for an empty ladder.
    let rung = match ladder.rungs.iter().find(|r| (r.matches)(value)) {
        Some(r) => r,
        None => return unclassified(ratio.label()),
    };

    let mut text = format!(
        "{} **{} ({} = {}):** {}",
        rung.emoji,
        rung.title,
        ladder.metric,
        format_value(ratio, value),
        rung.body
    );
    if let Some(caveat) = &ladder.caveat {
        if (caveat.applies)(value) {
            text.push_str("\n\n  ");
            text.push_str(caveat.text);
        }
    }

    RatioAssessment { bucket: rung.bucket, text }
}

/// Classify by display label; labels outside the catalogue are unclassified.
pub fn classify_by_name(name: &str, value: Option<f64>) -> RatioAssessment {
    if !value.map_or(false, f64::is_finite) {
        return not_available(name);
    }
    match Ratio::from_label(name) {
        Some(ratio) => classify(ratio, value),
        None => unclassified(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(ratio: Ratio, v: f64) -> Bucket {
        classify(ratio, Some(v)).bucket
    }

    #[test]
    fn test_debt_to_equity_boundaries() {
        assert_eq!(bucket(Ratio::DebtToEquity, 0.0), Bucket::LowLeverage);
        assert_eq!(bucket(Ratio::DebtToEquity, 0.3), Bucket::LowLeverage);
        assert_eq!(bucket(Ratio::DebtToEquity, 0.31), Bucket::OptimalLeverage);
        assert_eq!(bucket(Ratio::DebtToEquity, 1.5), Bucket::OptimalLeverage);
        assert_eq!(bucket(Ratio::DebtToEquity, 1.51), Bucket::ElevatedLeverage);
        assert_eq!(bucket(Ratio::DebtToEquity, 2.0), Bucket::ElevatedLeverage);
        assert_eq!(bucket(Ratio::DebtToEquity, 2.01), Bucket::HighRiskLeverage);
    }

    #[test]
    fn test_roe_boundaries() {
        assert_eq!(bucket(Ratio::ReturnOnEquity, 0.26), Bucket::ExcellentReturn);
        assert_eq!(bucket(Ratio::ReturnOnEquity, 0.25), Bucket::DesirableReturn);
        assert_eq!(bucket(Ratio::ReturnOnEquity, 0.10), Bucket::DesirableReturn);
        assert_eq!(bucket(Ratio::ReturnOnEquity, 0.0999), Bucket::LowReturn);
        assert_eq!(bucket(Ratio::ReturnOnEquity, 0.0), Bucket::LowReturn);
        assert_eq!(bucket(Ratio::ReturnOnEquity, -0.01), Bucket::NegativeReturn);
    }

    #[test]
    fn test_payout_boundaries() {
        assert_eq!(bucket(Ratio::PayoutRatio, 1.01), Bucket::UnsustainablePayout);
        assert_eq!(bucket(Ratio::PayoutRatio, 1.0), Bucket::ElevatedPayout);
        assert_eq!(bucket(Ratio::PayoutRatio, 0.7), Bucket::ElevatedPayout);
        assert_eq!(bucket(Ratio::PayoutRatio, 0.69), Bucket::ModeratePayout);
        assert_eq!(bucket(Ratio::PayoutRatio, 0.4), Bucket::ModeratePayout);
        assert_eq!(bucket(Ratio::PayoutRatio, 0.39), Bucket::GrowthPayout);
        assert_eq!(bucket(Ratio::PayoutRatio, 0.0), Bucket::NoDividend);
        assert_eq!(bucket(Ratio::PayoutRatio, -0.2), Bucket::NoDividend);
    }

    #[test]
    fn test_roe_caveat_only_above_thirty_percent() {
        let high = classify(Ratio::ReturnOnEquity, Some(0.35));
        assert_eq!(high.bucket, Bucket::ExcellentReturn);
        assert!(high.text.contains("ROE = 35%"));
        assert!(high.text.contains("apalancamiento excesivo"));

        let excellent = classify(Ratio::ReturnOnEquity, Some(0.28));
        assert!(!excellent.text.contains("Nota"));
    }

    #[test]
    fn test_ratio_value_formatting() {
        let de = classify(Ratio::DebtToEquity, Some(1.234));
        assert_eq!(
            de.text,
            "✅ **Apalancamiento Óptimo (D/E = 1.23x):** Rango saludable que muestra un buen equilibrio entre financiación con deuda y capital propio."
        );
        let payout = classify(Ratio::PayoutRatio, Some(0.55));
        assert!(payout.text.contains("(Payout = 55%)"));
    }

    #[test]
    fn test_missing_values_are_not_available() {
        for v in [None, Some(f64::NAN), Some(f64::INFINITY)] {
            let a = classify(Ratio::DebtToEquity, v);
            assert_eq!(a.bucket, Bucket::NotAvailable);
            assert_eq!(a.text, "**Razón Deuda a Patrimonio (D/E):** No disponible.");
        }
    }

    #[test]
    fn test_ratio_without_ladder_is_unclassified() {
        assert_eq!(bucket(Ratio::PriceToEarnings, 12.0), Bucket::Unclassified);
        let a = classify_by_name("Altman Z", Some(3.1));
        assert_eq!(a.bucket, Bucket::Unclassified);
        assert!(a.text.contains("Altman Z"));
        assert_eq!(classify_by_name("Altman Z", None).bucket, Bucket::NotAvailable);
        assert_eq!(classify_by_name("ROE", Some(0.12)).bucket, Bucket::DesirableReturn);
    }

    #[test]
    fn test_classification_is_deterministic() {
        for v in [0.3, 1.5, 2.0, -1.0, 0.0] {
            assert_eq!(classify(Ratio::DebtToEquity, Some(v)), classify(Ratio::DebtToEquity, Some(v)));
        }
    }
}
