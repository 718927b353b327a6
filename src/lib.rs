//! secperf - per-security investment performance
//!
//! This library calculates, for one security and one reporting period, the
//! money-weighted and time-weighted returns, risk figures, FIFO cost basis,
//! absolute gain and dividend statistics from its transactions.

pub mod config;
pub mod error;
pub mod importers;
pub mod index;
pub mod model;
pub mod money;
pub mod performance;
pub mod utils;

pub use error::{PerformanceError, Result};
