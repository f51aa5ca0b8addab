//! # FinReport Core
//!
//! Pure statistical calculators behind the FinReport analysis tools.
//!
//! This crate provides:
//!
//! - **Returns**: period-over-period simple returns with total/mean/max/min summaries
//! - **Volatility**: population standard deviation, annualized by reporting period
//! - **Sharpe Ratio**: excess return per unit of volatility, raw and annualized
//!
//! Every calculator is a single-shot function over an in-memory slice. There is
//! no shared state, so calls can run concurrently without coordination.
//!
//! ## Example
//!
//! ```
//! use finreport_core::prelude::*;
//!
//! let summary = compute_returns(&[100.0, 110.0, 121.0]).unwrap();
//! assert_eq!(summary.total_return_pct, 21.0);
//! assert_eq!(summary.return_count, 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]

pub mod analysis;
pub mod error;
pub mod period;
pub mod rounding;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::analysis::{
        compute_returns, compute_sharpe_ratio, compute_volatility, simple_returns,
        ReturnsSummary, SharpeSummary, VolatilitySummary, DEFAULT_RISK_FREE_RATE,
        TRADING_DAYS_PER_YEAR,
    };
    pub use crate::error::{AnalysisError, AnalysisResult};
    pub use crate::period::Period;
}

pub use error::{AnalysisError, AnalysisResult};
pub use period::Period;
