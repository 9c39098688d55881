use analysis_core::{AnalysisError, Frequency, MarketDataProvider, Period, PricePoint};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Closing prices aligned by date, one column per ticker.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    pub tickers: Vec<String>,
    pub rows: BTreeMap<NaiveDate, Vec<Option<f64>>>,
}

impl PriceTable {
    /// Align per-ticker series on calendar date; the last close of a date wins.
    pub fn from_series(series: Vec<(String, Vec<PricePoint>)>) -> Self {
        let width = series.len();
        let mut table = PriceTable {
            tickers: Vec::with_capacity(width),
            rows: BTreeMap::new(),
        };
        for (column, (ticker, points)) in series.into_iter().enumerate() {
            table.tickers.push(ticker);
            for point in points {
                let row = table
                    .rows
                    .entry(point.timestamp.date_naive())
                    .or_insert_with(|| vec![None; width]);
                row[column] = Some(point.close);
            }
        }
        table
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `Date` column followed by one column per ticker; gaps are empty cells.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = vec!["Date".to_string()];
        header.extend(self.tickers.iter().cloned());
        csv_writer.write_record(&header)?;

        for (date, closes) in &self.rows {
            let mut record = Vec::with_capacity(closes.len() + 1);
            record.push(date.format("%Y-%m-%d").to_string());
            record.extend(closes.iter().map(|c| c.map(|v| v.to_string()).unwrap_or_default()));
            csv_writer.write_record(&record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Download closes for every ticker concurrently. Fails if any download fails.
pub async fn fetch_price_table(
    provider: Arc<dyn MarketDataProvider>,
    tickers: &[String],
    period: Period,
    frequency: Frequency,
) -> Result<PriceTable, AnalysisError> {
    let mut tasks = JoinSet::new();
    for (index, ticker) in tickers.iter().cloned().enumerate() {
        let provider = Arc::clone(&provider);
        tasks.spawn(async move {
            let result = provider.closes(&ticker, period, frequency).await;
            (index, ticker, result)
        });
    }

    let mut series = Vec::with_capacity(tickers.len());
    while let Some(joined) = tasks.join_next().await {
        let (index, ticker, result) = joined.map_err(|e| AnalysisError::ApiError(e.to_string()))?;
        series.push((index, ticker, result?));
    }
    series.sort_by_key(|(index, _, _)| *index);

    Ok(PriceTable::from_series(
        series.into_iter().map(|(_, ticker, points)| (ticker, points)).collect(),
    ))
}
