pub mod enums;
pub mod error;
pub mod series;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{SignalAction, StrategyId};
pub use error::CoreError;
pub use series::PriceSeries;
pub use structs::{Bar, PortfolioState};
