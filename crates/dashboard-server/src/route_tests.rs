#[cfg(test)]
mod tests {
    use super::super::*;
    use analysis_core::{AnalysisError, CompanyFundamentals, CompanyProfile, PricePoint, Ratio};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::{json, Value};
    use std::collections::BTreeMap;
    use tower::ServiceExt; // oneshot

    /// Serves AAPL, MSFT and JPM; everything else is unknown.
    struct StubProvider;

    fn company(ticker: &str) -> Option<(&'static str, &'static str)> {
        match ticker {
            "AAPL" => Some(("Apple Inc.", "Technology")),
            "MSFT" => Some(("Microsoft Corporation", "Technology")),
            "JPM" => Some(("JPMorgan Chase & Co.", "Financial Services")),
            _ => None,
        }
    }

    #[async_trait]
    impl MarketDataProvider for StubProvider {
        async fn profile(&self, ticker: &str) -> Result<Option<CompanyProfile>, AnalysisError> {
            Ok(company(ticker).map(|(name, sector)| CompanyProfile {
                ticker: ticker.to_string(),
                long_name: Some(name.to_string()),
                sector: Some(sector.to_string()),
            }))
        }

        async fn fundamentals(&self, ticker: &str) -> Result<Option<CompanyFundamentals>, AnalysisError> {
            let (name, _) = match company(ticker) {
                Some(c) => c,
                None => return Ok(None),
            };
            let (de, roe, pe) = match ticker {
                "AAPL" => (1.8, 1.47, 29.5),
                "MSFT" => (0.35, 0.38, 35.0),
                _ => (1.2, 0.15, 12.0),
            };
            let mut ratios = BTreeMap::new();
            ratios.insert(Ratio::DebtToEquity, Some(de));
            ratios.insert(Ratio::ReturnOnEquity, Some(roe));
            ratios.insert(Ratio::PriceToEarnings, Some(pe));
            ratios.insert(Ratio::PayoutRatio, None);
            Ok(Some(CompanyFundamentals {
                ticker: ticker.to_string(),
                long_name: name.to_string(),
                ratios,
            }))
        }

        async fn closes(
            &self,
            ticker: &str,
            _period: Period,
            _frequency: Frequency,
        ) -> Result<Vec<PricePoint>, AnalysisError> {
            if ticker != "AAPL" {
                return Ok(Vec::new());
            }
            let start = Utc.with_ymd_and_hms(2023, 1, 2, 21, 0, 0).unwrap();
            Ok((0..260)
                .map(|i| PricePoint {
                    timestamp: start + Duration::days(i),
                    close: 100.0 + i as f64,
                })
                .collect())
        }
    }

    fn make_state() -> AppState {
        AppState::new(DashboardConfig::default(), Arc::new(StubProvider))
    }

    async fn call(state: &AppState, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let resp = build_router(state.clone()).oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    fn post_json(uri: &str, session: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(id) = session {
            builder = builder.header(SESSION_HEADER, id);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn parse_json(body: &[u8]) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    fn optimization_body() -> Value {
        json!({
            "weights": [
                { "ticker": "aapl", "weight": 0.35 },
                { "ticker": "MSFT", "weight": 0.25 },
                { "ticker": "JPM", "weight": 0.4 },
                { "ticker": "V", "weight": 0.0 }
            ],
            "performance": { "expected_return": 0.18, "volatility": 0.22, "sharpe_ratio": 0.73 },
            "names": { "V": "Visa Inc." }
        })
    }

    #[tokio::test]
    async fn test_health_issues_session_id() {
        let state = make_state();
        let (status, headers, body) = call(&state, get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers.get(SESSION_HEADER).is_some());
        let json = parse_json(&body);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_defaults_reflect_config() {
        let state = make_state();
        let (status, _, body) = call(&state, get("/api/defaults")).await;
        assert_eq!(status, StatusCode::OK);
        let json = parse_json(&body);
        assert_eq!(json["data"]["tickers"], "AAPL, MSFT, GOOGL, JPM, V");
        assert_eq!(json["data"]["period"], "5y");
        assert_eq!(json["data"]["frequency"], "daily");
        assert_eq!(json["data"]["periods"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_validate_splits_valid_and_invalid() {
        let state = make_state();
        let req = post_json("/api/tickers/validate", None, json!({ "tickers": "aapl, zzzz, AAPL" }));
        let (status, _, body) = call(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        let json = parse_json(&body);
        assert_eq!(json["data"]["valid"], json!([{ "ticker": "AAPL", "name": "Apple Inc." }]));
        assert_eq!(json["data"]["invalid"], json!(["ZZZZ"]));
    }

    #[tokio::test]
    async fn test_validate_without_valid_tickers_is_rejected() {
        let state = make_state();
        let req = post_json("/api/tickers/validate", None, json!({ "tickers": "zzzz" }));
        let (status, _, body) = call(&state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json = parse_json(&body);
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("ZZZZ"));
    }

    #[tokio::test]
    async fn test_fundamental_report_compares_companies() {
        let state = make_state();
        let req = post_json("/api/reports/fundamental", None, json!({ "tickers": "AAPL, MSFT, ZZZZ" }));
        let (status, _, body) = call(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        let data = &parse_json(&body)["data"];
        assert_eq!(data["unavailable"], json!(["ZZZZ"]));
        assert_eq!(data["narratives"].as_array().unwrap().len(), 2);
        let conclusion = data["conclusion"].as_str().unwrap();
        assert!(conclusion.contains("**Líder en Rentabilidad:** `AAPL`"));
        assert!(data["notice"].is_null());
    }

    #[tokio::test]
    async fn test_fundamental_report_single_company_gets_notice() {
        let state = make_state();
        let req = post_json("/api/reports/fundamental", None, json!({ "tickers": "MSFT" }));
        let (status, _, body) = call(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        let data = &parse_json(&body)["data"];
        assert!(data["notice"].as_str().unwrap().contains("2 o más empresas"));
        assert!(data["conclusion"].is_null());
    }

    #[tokio::test]
    async fn test_fundamental_report_without_data_is_an_error() {
        let state = make_state();
        let req = post_json("/api/reports/fundamental", None, json!({ "tickers": "ZZZZ" }));
        let (status, _, _) = call(&state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_strategy_requires_prior_optimization() {
        let state = make_state();
        let req = post_json(
            "/api/reports/strategy",
            Some("fresh-session"),
            json!({ "backtest": { "total_return": 0.25, "max_drawdown": -0.3, "volatility": 0.2, "sharpe_ratio": 1.0 } }),
        );
        let (status, _, body) = call(&state, req).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(parse_json(&body)["error"].as_str().unwrap().contains("Optimización de Portafolio"));

        let (status, _, _) = call(&state, post_json("/api/reports/technical", Some("fresh-session"), json!({}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_optimization_then_strategy_in_same_session() {
        let state = make_state();
        let req = post_json("/api/reports/optimization", Some("session-1"), optimization_body());
        let (status, headers, body) = call(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers.get(SESSION_HEADER).unwrap(), "session-1");
        let data = &parse_json(&body)["data"];
        assert_eq!(data["session_id"], "session-1");
        assert_eq!(data["allocation"][0]["name"], "Apple Inc.");
        assert_eq!(data["distribution"].as_array().unwrap().len(), 3);
        let narrative = data["narrative"].as_str().unwrap();
        assert!(narrative.contains("**3 activos clave**"));
        assert!(narrative.contains("`Visa Inc. (V)`"));

        let req = post_json(
            "/api/reports/strategy",
            Some("session-1"),
            json!({ "backtest": { "total_return": 0.25, "max_drawdown": -0.3, "volatility": 0.05, "sharpe_ratio": 0.3, "monthly": true } }),
        );
        let (status, _, body) = call(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        let data = &parse_json(&body)["data"];
        assert_eq!(data["sectors"][0]["sector"], "Technology");
        assert_eq!(data["risk_tier"], "significant");
        assert_eq!(data["final_value"], 12_500.0);
        assert!(data["backtest_narrative"].as_str().unwrap().contains("$12,500.00"));
        assert!(data["sector_narrative"].as_str().unwrap().contains("**alta concentración**"));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let state = make_state();
        let req = post_json("/api/reports/optimization", Some("owner"), optimization_body());
        assert_eq!(call(&state, req).await.0, StatusCode::OK);

        let req = post_json("/api/reports/technical", Some("someone-else"), json!({}));
        assert_eq!(call(&state, req).await.0, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_technical_report_covers_allocated_tickers() {
        let state = make_state();
        let req = post_json("/api/reports/optimization", Some("tech"), optimization_body());
        assert_eq!(call(&state, req).await.0, StatusCode::OK);

        let (status, _, body) = call(&state, post_json("/api/reports/technical", Some("tech"), json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        let entries = parse_json(&body)["data"].as_array().unwrap().clone();
        let tickers: Vec<&str> = entries.iter().map(|e| e["ticker"].as_str().unwrap()).collect();
        assert_eq!(tickers, vec!["AAPL", "MSFT", "JPM"]);

        assert_eq!(entries[0]["insufficient_history"], false);
        assert_eq!(entries[0]["interpretation"]["trend"], "uptrend");
        assert!(entries[0]["warning"].is_null());

        assert_eq!(entries[1]["insufficient_history"], true);
        assert_eq!(entries[1]["interpretation"]["verdict"], "indeterminate");
        assert!(entries[1]["warning"].is_string());
    }

    #[tokio::test]
    async fn test_optimization_rejects_out_of_range_weights() {
        let state = make_state();
        let body = json!({
            "weights": [{ "ticker": "AAPL", "weight": 1.5 }],
            "performance": { "expected_return": 0.1, "volatility": 0.2, "sharpe_ratio": 0.4 }
        });
        let (status, _, _) = call(&state, post_json("/api/reports/optimization", Some("bad"), body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_prices_csv_download() {
        let state = make_state();
        let (status, headers, body) = call(&state, get("/api/prices.csv?tickers=aapl&period=1y&frequency=daily")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers["content-type"].to_str().unwrap().starts_with("text/csv"));
        assert!(headers["content-disposition"].to_str().unwrap().contains("precios_AAPL.csv"));
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with("Date,AAPL\n2023-01-02,100\n"));
        assert_eq!(text.lines().count(), 261);
    }

    #[tokio::test]
    async fn test_fundamental_csv_download() {
        let state = make_state();
        let (status, headers, body) = call(&state, get("/api/reports/fundamental.csv?tickers=aapl,ZZZZ,msft")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers["content-type"].to_str().unwrap().starts_with("text/csv"));
        assert!(headers["content-disposition"]
            .to_str()
            .unwrap()
            .contains("comparativa_AAPL_MSFT.csv"));

        let text = String::from_utf8(body).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Categoría,Ratio,AAPL,MSFT");
        assert_eq!(lines[1], "Valoración,P/E,29.5,35");
        assert_eq!(lines.len(), Ratio::ALL.len() + 1);
        let payout = lines.iter().find(|l| l.contains("(Payout)")).unwrap();
        assert!(payout.ends_with(",,"));
    }

    #[tokio::test]
    async fn test_fundamental_csv_without_data_is_bad_request() {
        let state = make_state();
        let (status, _, body) = call(&state, get("/api/reports/fundamental.csv?tickers=ZZZZ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parse_json(&body)["success"], false);
    }

    #[tokio::test]
    async fn test_prices_csv_rejects_unknown_period() {
        let state = make_state();
        let (status, _, _) = call(&state, get("/api/prices.csv?tickers=AAPL&period=3y")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
