//! # atlan-observability
//!
//! Structured logging and API metrics shared by the Atlan SDK crates.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, init_logging_with_config, LoggingConfig};
pub use metrics::register_metrics;
