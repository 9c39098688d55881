//! Extraction of company data from Yahoo Finance JSON payloads.
//!
//! Kept free of I/O so payload handling can be tested against fixed documents.

use analysis_core::{AnalysisError, CompanyFundamentals, CompanyProfile, PricePoint, Ratio};
use chrono::DateTime;
use serde_json::Value;
use std::collections::BTreeMap;

/// quoteSummary modules requested for every company.
pub const SUMMARY_MODULES: [&str; 6] = [
    "price",
    "summaryDetail",
    "defaultKeyStatistics",
    "financialData",
    "assetProfile",
    "incomeStatementHistory",
];

/// Modules searched, in order, for ratio fields.
const RATIO_MODULES: [&str; 3] = ["summaryDetail", "defaultKeyStatistics", "financialData"];

const PEG_FALLBACK_KEY: &str = "trailingPegRatio";

/// Numeric field that Yahoo sends either bare or as `{"raw": .., "fmt": ..}`.
pub fn raw_number(module: &Value, field: &str) -> Option<f64> {
    let value = module.get(field)?;
    let number = match value {
        Value::Object(_) => value.get("raw").and_then(Value::as_f64),
        _ => value.as_f64(),
    };
    number.filter(|n| n.is_finite())
}

fn text_field(module: &Value, field: &str) -> Option<String> {
    module
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// First entry of `quoteSummary.result`, or `None` when Yahoo returned no result.
pub fn summary_result(json: &Value) -> Option<&Value> {
    json.get("quoteSummary")
        .and_then(|v| v.get("result"))
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
}

fn find_ratio_field(summary: &Value, key: &str) -> Option<f64> {
    RATIO_MODULES
        .iter()
        .filter_map(|m| summary.get(*m))
        .find_map(|module| raw_number(module, key))
}

fn long_name(summary: &Value) -> Option<String> {
    let price = summary.get("price")?;
    text_field(price, "longName")
}

pub fn parse_profile(ticker: &str, summary: &Value) -> CompanyProfile {
    CompanyProfile {
        ticker: ticker.to_string(),
        long_name: long_name(summary),
        sector: summary
            .get("assetProfile")
            .and_then(|p| text_field(p, "sector")),
    }
}

/// |EBIT / interest expense| from the most recent annual income statement.
pub fn interest_coverage(summary: &Value) -> Option<f64> {
    let latest = summary
        .get("incomeStatementHistory")
        .and_then(|v| v.get("incomeStatementHistory"))
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())?;
    let ebit = raw_number(latest, "ebit")?;
    let expense = raw_number(latest, "interestExpense")?;
    if expense == 0.0 {
        return None;
    }
    Some((ebit / expense).abs())
}

/// Ratio values for a company, or `None` when the payload carries no company name.
pub fn parse_fundamentals(ticker: &str, summary: &Value) -> Option<CompanyFundamentals> {
    let long_name = long_name(summary)?;

    let ratios: BTreeMap<Ratio, Option<f64>> = Ratio::ALL
        .iter()
        .map(|&ratio| {
            let value = match ratio {
                Ratio::InterestCoverage => interest_coverage(summary),
                Ratio::Peg => find_ratio_field(summary, ratio.provider_key())
                    .or_else(|| find_ratio_field(summary, PEG_FALLBACK_KEY)),
                // reported in percent
                Ratio::DebtToEquity => find_ratio_field(summary, ratio.provider_key()).map(|v| v / 100.0),
                _ => find_ratio_field(summary, ratio.provider_key()),
            };
            (ratio, value)
        })
        .collect();

    Some(CompanyFundamentals {
        ticker: ticker.to_string(),
        long_name,
        ratios,
    })
}

/// Closing prices from a v8 chart payload, skipping null closes.
pub fn parse_chart(json: &Value) -> Result<Vec<PricePoint>, AnalysisError> {
    let chart = json
        .get("chart")
        .and_then(|v| v.get("result"))
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .ok_or_else(|| AnalysisError::NotFound("No chart data found".to_string()))?;

    let timestamps = match chart.get("timestamp").and_then(Value::as_array) {
        Some(ts) => ts,
        // symbols with no trades in range come back without timestamps
        None => return Ok(Vec::new()),
    };

    let closes = chart
        .get("indicators")
        .and_then(|v| v.get("quote"))
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .and_then(|q| q.get("close"))
        .and_then(Value::as_array)
        .ok_or_else(|| AnalysisError::InvalidData("No close prices".to_string()))?;

    let mut points = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.iter().zip(closes.iter()) {
        if let (Some(ts), Some(close)) = (ts.as_i64(), close.as_f64()) {
            let timestamp = DateTime::from_timestamp(ts, 0)
                .ok_or_else(|| AnalysisError::InvalidData(format!("Invalid timestamp {}", ts)))?;
            points.push(PricePoint { timestamp, close });
        }
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary_fixture() -> Value {
        json!({
            "quoteSummary": {
                "result": [{
                    "price": { "longName": "Apple Inc.", "symbol": "AAPL" },
                    "assetProfile": { "sector": "Technology", "industry": "Consumer Electronics" },
                    "summaryDetail": {
                        "trailingPE": { "raw": 29.5, "fmt": "29.50" },
                        "priceToSalesTrailing12Months": { "raw": 7.6, "fmt": "7.60" },
                        "dividendYield": { "raw": 0.0052, "fmt": "0.52%" },
                        "payoutRatio": { "raw": 0.15, "fmt": "15.00%" },
                        "beta": { "raw": 1.24, "fmt": "1.24" }
                    },
                    "defaultKeyStatistics": {
                        "pegRatio": {},
                        "priceToBook": { "raw": 45.1, "fmt": "45.10" },
                        "enterpriseToRevenue": { "raw": 7.8 },
                        "enterpriseToEbitda": { "raw": 22.4 }
                    },
                    "financialData": {
                        "returnOnAssets": { "raw": 0.21 },
                        "returnOnEquity": { "raw": 1.47 },
                        "profitMargins": { "raw": 0.25 },
                        "debtToEquity": { "raw": 181.3, "fmt": "181.30%" },
                        "currentRatio": { "raw": 0.99 },
                        "quickRatio": { "raw": 0.83 }
                    },
                    "incomeStatementHistory": {
                        "incomeStatementHistory": [
                            { "ebit": { "raw": 114_301_000_000.0_f64 }, "interestExpense": { "raw": -3_933_000_000.0_f64 } },
                            { "ebit": { "raw": 1.0 }, "interestExpense": { "raw": 1.0 } }
                        ]
                    }
                }],
                "error": null
            }
        })
    }

    #[test]
    fn test_parse_fundamentals_reads_all_modules() {
        let json = summary_fixture();
        let summary = summary_result(&json).unwrap();
        let f = parse_fundamentals("AAPL", summary).unwrap();

        assert_eq!(f.long_name, "Apple Inc.");
        assert_eq!(f.ratios.len(), Ratio::ALL.len());
        assert_eq!(f.ratios[&Ratio::PriceToEarnings], Some(29.5));
        assert_eq!(f.ratios[&Ratio::QuickRatio], Some(0.83));
        assert_eq!(f.ratios[&Ratio::Peg], None);
        let de = f.ratios[&Ratio::DebtToEquity].unwrap();
        assert!((de - 1.813).abs() < 1e-12);
        let coverage = f.ratios[&Ratio::InterestCoverage].unwrap();
        assert!((coverage - 114_301.0 / 3_933.0).abs() < 1e-9);
    }

    #[test]
    fn test_peg_falls_back_to_trailing() {
        let summary = json!({
            "price": { "longName": "Visa Inc." },
            "defaultKeyStatistics": { "trailingPegRatio": { "raw": 1.9 } }
        });
        let f = parse_fundamentals("V", &summary).unwrap();
        assert_eq!(f.ratios[&Ratio::Peg], Some(1.9));
    }

    #[test]
    fn test_missing_name_means_no_fundamentals() {
        let summary = json!({ "price": { "symbol": "ZZZZ" }, "summaryDetail": { "beta": 1.0 } });
        assert!(parse_fundamentals("ZZZZ", &summary).is_none());
        assert_eq!(parse_profile("ZZZZ", &summary).long_name, None);
    }

    #[test]
    fn test_zero_interest_expense_gives_no_coverage() {
        let summary = json!({
            "incomeStatementHistory": {
                "incomeStatementHistory": [{ "ebit": { "raw": 5.0 }, "interestExpense": { "raw": 0.0 } }]
            }
        });
        assert_eq!(interest_coverage(&summary), None);
    }

    #[test]
    fn test_parse_profile() {
        let json = summary_fixture();
        let profile = parse_profile("AAPL", summary_result(&json).unwrap());
        assert_eq!(profile.long_name.as_deref(), Some("Apple Inc."));
        assert_eq!(profile.sector.as_deref(), Some("Technology"));
    }

    #[test]
    fn test_parse_chart_skips_null_closes() {
        let json = json!({
            "chart": {
                "result": [{
                    "timestamp": [1_704_205_800, 1_704_292_200, 1_704_378_600],
                    "indicators": { "quote": [{ "close": [185.64, null, 181.91] }] }
                }],
                "error": null
            }
        });
        let points = parse_chart(&json).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].close, 185.64);
        assert_eq!(points[1].timestamp.timestamp(), 1_704_378_600);
    }

    #[test]
    fn test_parse_chart_without_result_is_not_found() {
        let json = json!({ "chart": { "result": null, "error": { "code": "Not Found" } } });
        assert!(matches!(parse_chart(&json), Err(AnalysisError::NotFound(_))));
    }
}
