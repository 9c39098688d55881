use async_trait::async_trait;
use crate::{AnalysisError, CompanyFundamentals, CompanyProfile, Frequency, Period, PricePoint};

/// Source of company descriptors, ratios and closing prices.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// `Ok(None)` when the ticker is unknown to the provider.
    async fn profile(&self, ticker: &str) -> Result<Option<CompanyProfile>, AnalysisError>;

    async fn fundamentals(&self, ticker: &str) -> Result<Option<CompanyFundamentals>, AnalysisError>;

    /// Closes in chronological order.
    async fn closes(
        &self,
        ticker: &str,
        period: Period,
        frequency: Frequency,
    ) -> Result<Vec<PricePoint>, AnalysisError>;
}
