use analysis_core::{AnalysisError, Frequency, MarketDataProvider, Period};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Split comma-separated input into upper-cased tickers, dropping blanks and repeats.
pub fn parse_ticker_input(input: &str) -> Vec<String> {
    let mut tickers: Vec<String> = Vec::new();
    for raw in input.split(',') {
        let ticker = raw.trim().to_uppercase();
        if !ticker.is_empty() && !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    tickers
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidTicker {
    pub ticker: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickerValidation {
    pub valid: Vec<ValidTicker>,
    pub invalid: Vec<String>,
}

impl TickerValidation {
    pub fn tickers(&self) -> Vec<String> {
        self.valid.iter().map(|v| v.ticker.clone()).collect()
    }

    pub fn has_valid(&self) -> bool {
        !self.valid.is_empty()
    }
}

/// A ticker is valid when the provider knows its name, or failing that, it traded recently.
async fn check_ticker(provider: &dyn MarketDataProvider, ticker: &str) -> Result<Option<String>, AnalysisError> {
    let profile = provider.profile(ticker).await?;
    if let Some(name) = profile.and_then(|p| p.long_name) {
        return Ok(Some(name));
    }
    let recent = provider.closes(ticker, Period::OneYear, Frequency::Daily).await?;
    Ok(if recent.is_empty() { None } else { Some(ticker.to_string()) })
}

/// Validate tickers concurrently. Output keeps input order; provider errors count as invalid.
pub async fn validate_tickers(provider: Arc<dyn MarketDataProvider>, tickers: &[String]) -> TickerValidation {
    let mut tasks = JoinSet::new();
    for (index, ticker) in tickers.iter().cloned().enumerate() {
        let provider = Arc::clone(&provider);
        tasks.spawn(async move {
            let result = check_ticker(provider.as_ref(), &ticker).await;
            (index, ticker, result)
        });
    }

    let mut outcomes: Vec<(usize, String, Option<String>)> = Vec::with_capacity(tickers.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, ticker, Ok(name))) => outcomes.push((index, ticker, name)),
            Ok((index, ticker, Err(e))) => {
                tracing::warn!("Validation of {} failed: {}", ticker, e);
                outcomes.push((index, ticker, None));
            }
            Err(e) => tracing::error!("Task error: {}", e),
        }
    }
    outcomes.sort_by_key(|(index, _, _)| *index);

    let mut validation = TickerValidation::default();
    for (_, ticker, name) in outcomes {
        match name {
            Some(name) => validation.valid.push(ValidTicker { ticker, name }),
            None => validation.invalid.push(ticker),
        }
    }
    validation
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{CompanyFundamentals, CompanyProfile, PricePoint};
    use async_trait::async_trait;
    use chrono::Utc;

    struct FakeProvider;

    #[async_trait]
    impl MarketDataProvider for FakeProvider {
        async fn profile(&self, ticker: &str) -> Result<Option<CompanyProfile>, AnalysisError> {
            Ok(match ticker {
                "AAPL" => Some(CompanyProfile {
                    ticker: ticker.to_string(),
                    long_name: Some("Apple Inc.".to_string()),
                    sector: Some("Technology".to_string()),
                }),
                "ETF" => Some(CompanyProfile {
                    ticker: ticker.to_string(),
                    long_name: None,
                    sector: None,
                }),
                "BOOM" => return Err(AnalysisError::ApiError("HTTP 500".to_string())),
                _ => None,
            })
        }

        async fn fundamentals(&self, _ticker: &str) -> Result<Option<CompanyFundamentals>, AnalysisError> {
            Ok(None)
        }

        async fn closes(
            &self,
            ticker: &str,
            _period: Period,
            _frequency: Frequency,
        ) -> Result<Vec<PricePoint>, AnalysisError> {
            Ok(if ticker == "ETF" {
                vec![PricePoint {
                    timestamp: Utc::now(),
                    close: 10.0,
                }]
            } else {
                Vec::new()
            })
        }
    }

    #[test]
    fn test_parse_ticker_input() {
        assert_eq!(
            parse_ticker_input(" aapl, MSFT,,msft , googl ,"),
            vec!["AAPL", "MSFT", "GOOGL"]
        );
        assert!(parse_ticker_input(" , ").is_empty());
    }

    #[tokio::test]
    async fn test_validate_tickers_splits_and_keeps_order() {
        let provider: Arc<dyn MarketDataProvider> = Arc::new(FakeProvider);
        let tickers = parse_ticker_input("ZZZZ, AAPL, BOOM, ETF");
        let validation = validate_tickers(provider, &tickers).await;

        assert_eq!(
            validation.valid,
            vec![
                ValidTicker {
                    ticker: "AAPL".to_string(),
                    name: "Apple Inc.".to_string()
                },
                ValidTicker {
                    ticker: "ETF".to_string(),
                    name: "ETF".to_string()
                },
            ]
        );
        assert_eq!(validation.invalid, vec!["ZZZZ", "BOOM"]);
        assert!(validation.has_valid());
    }
}
