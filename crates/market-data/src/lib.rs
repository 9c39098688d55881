pub mod parse;
pub mod prices;
pub mod tickers;
pub mod yahoo;

pub use prices::{fetch_price_table, PriceTable};
pub use tickers::{parse_ticker_input, validate_tickers, TickerValidation, ValidTicker};
pub use yahoo::{YahooFinanceClient, DEFAULT_BASE_URL};
