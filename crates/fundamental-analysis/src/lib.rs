pub mod classifier;
pub mod narrative;
pub mod ranker;
pub mod table;

pub use classifier::{classify, classify_by_name, Bucket, RatioAssessment, KEY_RATIOS};
pub use narrative::{comparative_conclusion, entity_narrative, summarize, summarize_overall, EntityNarrative};
pub use ranker::{rank, ComparativeProfile};
pub use table::{best_value, ComparisonRow, ComparisonTable};

use analysis_core::{AnalysisError, Entity};
use serde::Serialize;

pub const SINGLE_ENTITY_NOTICE: &str =
    "El análisis por rangos y comparativo solo está disponible al analizar 2 o más empresas.";

/// Everything the fundamental report page shows.
#[derive(Debug, Clone, Serialize)]
pub struct FundamentalReport {
    pub table: ComparisonTable,
    /// `(ratio label, ticker)` pairs to highlight in the table.
    pub highlights: Vec<(&'static str, String)>,
    pub narratives: Vec<EntityNarrative>,
    pub conclusion: Option<String>,
    pub notice: Option<String>,
}

pub struct FundamentalAnalysisEngine;

impl FundamentalAnalysisEngine {
    pub fn new() -> Self {
        Self
    }

    /// Build the report for the companies whose data was retrieved.
    ///
    /// Range narratives and the comparative conclusion need at least two companies;
    /// a single company gets the table and a notice.
    pub fn analyze(&self, entities: &[Entity]) -> Result<FundamentalReport, AnalysisError> {
        if entities.is_empty() {
            return Err(AnalysisError::InsufficientData(
                "No se pudieron obtener datos para ninguno de los tickers seleccionados.".to_string(),
            ));
        }

        let table = ComparisonTable::from_entities(entities);

        if entities.len() == 1 {
            return Ok(FundamentalReport {
                table,
                highlights: Vec::new(),
                narratives: Vec::new(),
                conclusion: None,
                notice: Some(SINGLE_ENTITY_NOTICE.to_string()),
            });
        }

        let highlights = table.highlights();
        let narratives = summarize(entities);
        let conclusion = comparative_conclusion(&table);

        Ok(FundamentalReport {
            table,
            highlights,
            narratives,
            conclusion: Some(conclusion),
            notice: None,
        })
    }
}

impl Default for FundamentalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
