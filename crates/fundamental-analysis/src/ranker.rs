use std::collections::BTreeSet;

use analysis_core::RatioCategory;
use serde::Serialize;

use crate::table::{best_value, ComparisonTable};

/// Categories in which one entity holds the best value of at least one ratio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparativeProfile {
    pub ticker: String,
    pub categories_won: BTreeSet<RatioCategory>,
}

/// Credit every entity holding a row's best value with that row's category.
///
/// Neutral rows and rows without any defined cell are skipped. Ties credit every tied
/// entity. Profiles come back in column order, including entities that won nothing.
/// Callers must not rank fewer than two entities.
pub fn rank(table: &ComparisonTable) -> Vec<ComparativeProfile> {
    let mut profiles: Vec<ComparativeProfile> = table
        .tickers
        .iter()
        .map(|t| ComparativeProfile {
            ticker: t.clone(),
            categories_won: BTreeSet::new(),
        })
        .collect();

    for row in &table.rows {
        let best = match best_value(row.ratio.direction(), &row.values) {
            Some(b) => b,
            None => {
                tracing::trace!(ratio = row.label, "row skipped in ranking");
                continue;
            }
        };

        for (idx, value) in row.values.iter().enumerate() {
            if *value == Some(best) {
                profiles[idx].categories_won.insert(row.category);
            }
        }
    }

    profiles
}
