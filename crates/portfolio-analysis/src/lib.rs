pub mod backtest;
pub mod models;
pub mod optimization;
pub mod sectors;
pub mod strategy;

pub use backtest::{narrate_backtest, RiskTier};
pub use models::*;
pub use optimization::{narrate_optimization, AllocationRow, OptimizationReport};
pub use sectors::{aggregate_by_sector, narrate_sectors, UNKNOWN_SECTOR};
pub use strategy::{StrategyAnalyzer, StrategyReport};
