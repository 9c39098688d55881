use analysis_core::{
    AnalysisError, CompanyFundamentals, CompanyProfile, Frequency, MarketDataProvider, Period, PricePoint,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::parse::{parse_chart, parse_fundamentals, parse_profile, summary_result, SUMMARY_MODULES};

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

#[derive(Clone)]
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl YahooFinanceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// GET a JSON document; `Ok(None)` on 404, which Yahoo uses for unknown symbols.
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Option<Value>, AnalysisError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AnalysisError::ApiError(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }

        let json = response
            .json::<Value>()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;
        Ok(Some(json))
    }

    async fn quote_summary(&self, ticker: &str) -> Result<Option<Value>, AnalysisError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, ticker);
        let modules = SUMMARY_MODULES.join(",");
        let json = self.get_json(&url, &[("modules", modules.as_str())]).await?;
        Ok(json.as_ref().and_then(summary_result).cloned())
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    async fn profile(&self, ticker: &str) -> Result<Option<CompanyProfile>, AnalysisError> {
        let summary = self.quote_summary(ticker).await?;
        Ok(summary.map(|s| parse_profile(ticker, &s)))
    }

    async fn fundamentals(&self, ticker: &str) -> Result<Option<CompanyFundamentals>, AnalysisError> {
        let summary = self.quote_summary(ticker).await?;
        let fundamentals = summary.and_then(|s| parse_fundamentals(ticker, &s));
        if fundamentals.is_none() {
            tracing::debug!("No fundamentals for {}", ticker);
        }
        Ok(fundamentals)
    }

    async fn closes(
        &self,
        ticker: &str,
        period: Period,
        frequency: Frequency,
    ) -> Result<Vec<PricePoint>, AnalysisError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        let query = [
            ("range", period.as_range()),
            ("interval", frequency.as_interval()),
            ("includePrePost", "false"),
        ];
        match self.get_json(&url, &query).await? {
            Some(json) => match parse_chart(&json) {
                Err(AnalysisError::NotFound(_)) => Ok(Vec::new()),
                other => other,
            },
            None => Ok(Vec::new()),
        }
    }
}
