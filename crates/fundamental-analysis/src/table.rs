use analysis_core::{Direction, Entity, Ratio, RatioCategory};
use serde::Serialize;
use std::io::Write;

/// One row of the comparison table: a ratio and one cell per entity column.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub ratio: Ratio,
    pub category: RatioCategory,
    pub label: &'static str,
    pub values: Vec<Option<f64>>,
}

/// Ratio x entity table. Rows follow catalogue order, columns follow input order.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonTable {
    pub tickers: Vec<String>,
    pub names: Vec<String>,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn from_entities(entities: &[Entity]) -> Self {
        let rows = Ratio::ALL
            .into_iter()
            .map(|ratio| ComparisonRow {
                ratio,
                category: ratio.category(),
                label: ratio.label(),
                values: entities.iter().map(|e| e.value(ratio)).collect(),
            })
            .collect();

        Self {
            tickers: entities.iter().map(|e| e.ticker.clone()).collect(),
            names: entities.iter().map(|e| e.name.clone()).collect(),
            rows,
        }
    }

    pub fn entity_count(&self) -> usize {
        self.tickers.len()
    }

    pub fn row(&self, ratio: Ratio) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.ratio == ratio)
    }

    /// The single column highlighted in the display table for `ratio`: the first
    /// column holding the direction-aware best value. Neutral rows highlight nothing.
    pub fn highlighted(&self, ratio: Ratio) -> Option<&str> {
        let row = self.row(ratio)?;
        let best = best_value(ratio.direction(), &row.values)?;
        row.values
            .iter()
            .position(|v| *v == Some(best))
            .map(|idx| self.tickers[idx].as_str())
    }

    /// `(ratio label, highlighted ticker)` for every row that has one.
    pub fn highlights(&self) -> Vec<(&'static str, String)> {
        self.rows
            .iter()
            .filter_map(|row| {
                self.highlighted(row.ratio)
                    .map(|t| (row.label, t.to_string()))
            })
            .collect()
    }

    /// Write the table as CSV: category and ratio label columns, then one column per
    /// ticker. Unavailable cells are left empty.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = vec!["Categoría".to_string(), "Ratio".to_string()];
        header.extend(self.tickers.iter().cloned());
        csv_writer.write_record(&header)?;

        for row in &self.rows {
            let mut record = Vec::with_capacity(row.values.len() + 2);
            record.push(row.category.label().to_string());
            record.push(row.label.to_string());
            record.extend(row.values.iter().map(|v| v.map(|x| x.to_string()).unwrap_or_default()));
            csv_writer.write_record(&record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Direction-aware extreme of the defined cells; `None` for neutral or empty rows.
pub fn best_value(direction: Direction, values: &[Option<f64>]) -> Option<f64> {
    let defined = values.iter().filter_map(|v| *v).filter(|v| v.is_finite());
    match direction {
        Direction::LowerIsBetter => defined.reduce(f64::min),
        Direction::HigherIsBetter => defined.reduce(f64::max),
        Direction::Neutral => None,
    }
}
