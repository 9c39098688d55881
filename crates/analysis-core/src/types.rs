use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ratio families used to group the comparison table and the comparative profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RatioCategory {
    Valoracion,
    Rentabilidad,
    Solvencia,
    Liquidez,
    Dividendos,
    Riesgo,
}

impl RatioCategory {
    pub fn label(&self) -> &'static str {
        match self {
            RatioCategory::Valoracion => "Valoración",
            RatioCategory::Rentabilidad => "Rentabilidad",
            RatioCategory::Solvencia => "Solvencia",
            RatioCategory::Liquidez => "Liquidez",
            RatioCategory::Dividendos => "Dividendos",
            RatioCategory::Riesgo => "Riesgo (Volatilidad)",
        }
    }
}

impl fmt::Display for RatioCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which end of a ratio's range is preferable when comparing companies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
    Neutral,
}

/// Every ratio the dashboard retrieves, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ratio {
    PriceToEarnings,
    Peg,
    PriceToSales,
    PriceToBook,
    EvToRevenue,
    EvToEbitda,
    ReturnOnAssets,
    ReturnOnEquity,
    ProfitMargin,
    DebtToEquity,
    InterestCoverage,
    CurrentRatio,
    QuickRatio,
    DividendYield,
    PayoutRatio,
    Beta,
}

impl Ratio {
    pub const ALL: [Ratio; 16] = [
        Ratio::PriceToEarnings,
        Ratio::Peg,
        Ratio::PriceToSales,
        Ratio::PriceToBook,
        Ratio::EvToRevenue,
        Ratio::EvToEbitda,
        Ratio::ReturnOnAssets,
        Ratio::ReturnOnEquity,
        Ratio::ProfitMargin,
        Ratio::DebtToEquity,
        Ratio::InterestCoverage,
        Ratio::CurrentRatio,
        Ratio::QuickRatio,
        Ratio::DividendYield,
        Ratio::PayoutRatio,
        Ratio::Beta,
    ];

    /// Display label, as shown in the comparison table.
    pub fn label(&self) -> &'static str {
        match self {
            Ratio::PriceToEarnings => "P/E",
            Ratio::Peg => "PEG (esperado 5 años)",
            Ratio::PriceToSales => "P/S",
            Ratio::PriceToBook => "P/B",
            Ratio::EvToRevenue => "EV/Revenue",
            Ratio::EvToEbitda => "EV/EBITDA",
            Ratio::ReturnOnAssets => "ROA",
            Ratio::ReturnOnEquity => "ROE",
            Ratio::ProfitMargin => "Margen de Utilidad",
            Ratio::DebtToEquity => "Razón Deuda a Patrimonio (D/E)",
            Ratio::InterestCoverage => "Cobertura de Intereses",
            Ratio::CurrentRatio => "Razón Corriente",
            Ratio::QuickRatio => "Prueba Ácida",
            Ratio::DividendYield => "Rendimiento del Dividendo (Yield)",
            Ratio::PayoutRatio => "Razón de Pago de Dividendos (Payout)",
            Ratio::Beta => "Beta (5 años, mensual)",
        }
    }

    pub fn from_label(label: &str) -> Option<Ratio> {
        Ratio::ALL.into_iter().find(|r| r.label() == label)
    }

    pub fn category(&self) -> RatioCategory {
        match self {
            Ratio::PriceToEarnings
            | Ratio::Peg
            | Ratio::PriceToSales
            | Ratio::PriceToBook
            | Ratio::EvToRevenue
            | Ratio::EvToEbitda => RatioCategory::Valoracion,
            Ratio::ReturnOnAssets | Ratio::ReturnOnEquity | Ratio::ProfitMargin => {
                RatioCategory::Rentabilidad
            }
            Ratio::DebtToEquity | Ratio::InterestCoverage => RatioCategory::Solvencia,
            Ratio::CurrentRatio | Ratio::QuickRatio => RatioCategory::Liquidez,
            Ratio::DividendYield | Ratio::PayoutRatio => RatioCategory::Dividendos,
            Ratio::Beta => RatioCategory::Riesgo,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Ratio::PriceToEarnings
            | Ratio::Peg
            | Ratio::PriceToSales
            | Ratio::PriceToBook
            | Ratio::EvToRevenue
            | Ratio::EvToEbitda
            | Ratio::DebtToEquity
            | Ratio::Beta => Direction::LowerIsBetter,
            Ratio::ReturnOnAssets
            | Ratio::ReturnOnEquity
            | Ratio::ProfitMargin
            | Ratio::InterestCoverage
            | Ratio::CurrentRatio
            | Ratio::QuickRatio
            | Ratio::DividendYield => Direction::HigherIsBetter,
            Ratio::PayoutRatio => Direction::Neutral,
        }
    }

    /// Field name in the quote provider's payload.
    pub fn provider_key(&self) -> &'static str {
        match self {
            Ratio::PriceToEarnings => "trailingPE",
            Ratio::Peg => "pegRatio",
            Ratio::PriceToSales => "priceToSalesTrailing12Months",
            Ratio::PriceToBook => "priceToBook",
            Ratio::EvToRevenue => "enterpriseToRevenue",
            Ratio::EvToEbitda => "enterpriseToEbitda",
            Ratio::ReturnOnAssets => "returnOnAssets",
            Ratio::ReturnOnEquity => "returnOnEquity",
            Ratio::ProfitMargin => "profitMargins",
            Ratio::DebtToEquity => "debtToEquity",
            Ratio::InterestCoverage => "interestCoverage",
            Ratio::CurrentRatio => "currentRatio",
            Ratio::QuickRatio => "quickRatio",
            Ratio::DividendYield => "dividendYield",
            Ratio::PayoutRatio => "payoutRatio",
            Ratio::Beta => "beta",
        }
    }

    /// Ratios expressed as fractions and rendered as percentages in narratives.
    pub fn is_percentage(&self) -> bool {
        matches!(self, Ratio::ReturnOnEquity | Ratio::PayoutRatio)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One analysed ticker with its resolved ratio values.
///
/// A ratio mapped to `None` was requested but the provider had no value for it;
/// a ratio missing from the map was never requested.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entity {
    pub ticker: String,
    pub name: String,
    #[serde(default)]
    pub ratios: BTreeMap<Ratio, Option<f64>>,
}

impl Entity {
    pub fn new(ticker: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            name: name.into(),
            ratios: BTreeMap::new(),
        }
    }

    pub fn with_ratio(mut self, ratio: Ratio, value: Option<f64>) -> Self {
        self.ratios.insert(ratio, value);
        self
    }

    /// Value for `ratio`, with NaN and infinities folded into `None`.
    pub fn value(&self, ratio: Ratio) -> Option<f64> {
        self.ratios
            .get(&ratio)
            .copied()
            .flatten()
            .filter(|v| v.is_finite())
    }
}

/// Company descriptors used for validation and sector grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub ticker: String,
    pub long_name: Option<String>,
    pub sector: Option<String>,
}

/// Ratio values for one company as returned by the data provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyFundamentals {
    pub ticker: String,
    pub long_name: String,
    pub ratios: BTreeMap<Ratio, Option<f64>>,
}

impl From<CompanyFundamentals> for Entity {
    fn from(f: CompanyFundamentals) -> Self {
        Entity {
            ticker: f.ticker,
            name: f.long_name,
            ratios: f.ratios,
        }
    }
}

/// A single closing price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// Scalars produced once per backtest run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub total_return: f64,
    pub annual_volatility: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
}

impl BacktestSummary {
    /// Annualise monthly volatility and Sharpe figures by sqrt(12).
    pub fn from_monthly(total_return: f64, monthly_vol: f64, max_drawdown: f64, monthly_sharpe: f64) -> Self {
        let scale = 12.0_f64.sqrt();
        Self {
            total_return,
            annual_volatility: monthly_vol * scale,
            max_drawdown,
            sharpe_ratio: monthly_sharpe * scale,
        }
    }
}

/// Indicator values for one ticker at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub rsi: Option<f64>,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub price: Option<f64>,
}

/// History window offered in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub fn as_range(&self) -> &'static str {
        match self {
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::Max => "max",
        }
    }

    pub fn parse(s: &str) -> Option<Period> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1y" => Some(Period::OneYear),
            "2y" => Some(Period::TwoYears),
            "5y" => Some(Period::FiveYears),
            "10y" => Some(Period::TenYears),
            "max" => Some(Period::Max),
            _ => None,
        }
    }
}

/// Bar frequency offered in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Monthly,
}

impl Frequency {
    pub fn as_interval(&self) -> &'static str {
        match self {
            Frequency::Daily => "1d",
            Frequency::Monthly => "1mo",
        }
    }

    pub fn parse(s: &str) -> Option<Frequency> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "diario" | "1d" => Some(Frequency::Daily),
            "monthly" | "mensual" | "1mo" => Some(Frequency::Monthly),
            _ => None,
        }
    }
}
