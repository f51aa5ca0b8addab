//! Realized volatility of a return series.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use super::{ensure_finite, ensure_min_len, finite_result};
use crate::error::AnalysisResult;
use crate::period::Period;
use crate::rounding::pct2;

/// Per-period and annualized volatility of a return series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilitySummary {
    /// Population standard deviation of the returns, in percent
    pub volatility_pct: f64,
    /// Volatility scaled by the period's annualization factor, in percent
    pub annualized_volatility_pct: f64,
    /// Number of returns used
    pub data_points: usize,
}

/// Population standard deviation (divides by `n`, not `n - 1`).
pub(crate) fn population_std_dev(returns: &[f64]) -> f64 {
    returns.iter().population_std_dev()
}

/// Computes volatility and annualizes it for the given period.
///
/// # Errors
///
/// - [`AnalysisError::InsufficientData`](crate::AnalysisError::InsufficientData)
///   with fewer than two returns
/// - [`AnalysisError::InvalidInput`](crate::AnalysisError::InvalidInput)
///   for non-finite values, or a series whose deviation overflows
pub fn compute_volatility(returns: &[f64], period: Period) -> AnalysisResult<VolatilitySummary> {
    ensure_min_len(returns)?;
    ensure_finite(returns, "returns")?;

    let volatility = finite_result(population_std_dev(returns), "volatility")?;
    let annualized = volatility * period.annualization_factor();

    Ok(VolatilitySummary {
        volatility_pct: finite_result(pct2(volatility), "volatility")?,
        annualized_volatility_pct: finite_result(pct2(annualized), "annualized volatility")?,
        data_points: returns.len(),
    })
}
