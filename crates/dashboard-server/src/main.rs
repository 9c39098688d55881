use dashboard_server::DashboardConfig;

const DEFAULT_LOG_FILTER: &str =
    "dashboard_server=info,fundamental_analysis=info,portfolio_analysis=info,market_data=warn,tower_http=info";

fn init_tracing() {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter()).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter()).init();
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = DashboardConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Default tickers: {}", config.default_tickers);
    tracing::info!(
        "  Period: {} | Interval: {}",
        config.default_period.as_range(),
        config.default_frequency.as_interval()
    );
    tracing::info!("  Risk-free rate: {}%", config.risk_free_rate_percent);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(dashboard_server::run_server(config))
}
