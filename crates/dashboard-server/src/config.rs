use analysis_core::{Frequency, Period};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardConfig {
    pub bind_addr: SocketAddr,

    // Sidebar defaults
    pub default_tickers: String,
    pub default_period: Period,
    pub default_frequency: Frequency,
    pub risk_free_rate_percent: f64, // 2.0 = 2%
    pub initial_capital: f64,

    // Data provider
    pub yahoo_base_url: String,
    pub request_timeout_secs: u64,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        let period_raw = env::var("DEFAULT_PERIOD").unwrap_or_else(|_| "5y".to_string());
        let frequency_raw = env::var("DEFAULT_FREQUENCY").unwrap_or_else(|_| "daily".to_string());

        let config = Self {
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
                .parse()
                .context("BIND_ADDR must be a socket address")?,
            default_tickers: env::var("DEFAULT_TICKERS")
                .unwrap_or_else(|_| "AAPL, MSFT, GOOGL, JPM, V".to_string()),
            default_period: Period::parse(&period_raw)
                .ok_or_else(|| anyhow!("DEFAULT_PERIOD must be one of 1y, 2y, 5y, 10y, max (got {})", period_raw))?,
            default_frequency: Frequency::parse(&frequency_raw)
                .ok_or_else(|| anyhow!("DEFAULT_FREQUENCY must be daily or monthly (got {})", frequency_raw))?,
            risk_free_rate_percent: env::var("RISK_FREE_RATE_PERCENT")
                .unwrap_or_else(|_| "2.0".to_string())
                .parse()
                .context("RISK_FREE_RATE_PERCENT must be a number")?,
            initial_capital: env::var("INITIAL_CAPITAL")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .context("INITIAL_CAPITAL must be a number")?,
            yahoo_base_url: env::var("YAHOO_BASE_URL")
                .unwrap_or_else(|_| market_data::DEFAULT_BASE_URL.to_string()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.risk_free_rate_percent.is_finite() {
            return Err(anyhow!("RISK_FREE_RATE_PERCENT must be finite"));
        }
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(anyhow!("INITIAL_CAPITAL must be positive"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("REQUEST_TIMEOUT_SECS must be at least 1"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Risk-free rate as a fraction.
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate_percent / 100.0
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            default_tickers: "AAPL, MSFT, GOOGL, JPM, V".to_string(),
            default_period: Period::FiveYears,
            default_frequency: Frequency::Daily,
            risk_free_rate_percent: 2.0,
            initial_capital: 10_000.0,
            yahoo_base_url: market_data::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 20,
        }
    }
}
