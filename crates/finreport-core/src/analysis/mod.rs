//! Return-series analytics.
//!
//! Three independent calculators sharing one input shape (a slice of `f64`):
//!
//! - [`compute_returns`]: price series to simple-return summary
//! - [`compute_volatility`]: return series to (annualized) volatility
//! - [`compute_sharpe_ratio`]: return series to (annualized) Sharpe ratio
//!
//! All percentages are rounded to two decimals; ratios to three.

mod returns;
mod sharpe;
mod volatility;

pub use returns::*;
pub use sharpe::*;
pub use volatility::*;

use crate::error::{AnalysisError, AnalysisResult};

/// Trading days per year used to de-annualize the risk-free rate.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Default annual risk-free rate (2%).
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Minimum number of observations every calculator needs.
pub const MIN_OBSERVATIONS: usize = 2;

pub(crate) fn ensure_min_len(values: &[f64]) -> AnalysisResult<()> {
    if values.len() < MIN_OBSERVATIONS {
        return Err(AnalysisError::insufficient_data(
            MIN_OBSERVATIONS,
            values.len(),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_finite(values: &[f64], what: &str) -> AnalysisResult<()> {
    if let Some((index, value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(AnalysisError::invalid_input(format!(
            "{what}[{index}] is not a finite number ({value})"
        )));
    }
    Ok(())
}

/// Rejects an intermediate or reported figure that overflowed.
pub(crate) fn finite_result(value: f64, what: &str) -> AnalysisResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalysisError::invalid_input(format!(
            "{what} is not representable ({value}), inputs are out of range"
        )))
    }
}
