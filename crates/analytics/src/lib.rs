//! # SignalSprint Analytics Engine
//!
//! This crate derives scalar performance statistics from a simulated portfolio
//! trajectory. It acts as the "unbiased judge" of the system.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** This crate has no knowledge of external systems.
//!   It depends only on `core-types`.
//! - **Stateless Calculation:** The `AnalyticsEngine` takes a slice of
//!   `PortfolioState` rows and produces a `PerformanceReport`. A metric that
//!   cannot be computed (too few returns, zero volatility) is reported as `None`
//!   rather than failing the whole report.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The main struct that contains the calculation logic.
//! - `PerformanceReport`: The standardized struct that holds the metrics.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{AnalyticsEngine, DEFAULT_TRADING_PERIODS_PER_YEAR};
pub use error::AnalyticsError;
pub use report::PerformanceReport;
