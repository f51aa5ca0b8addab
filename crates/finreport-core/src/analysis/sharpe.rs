//! Sharpe ratio.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use super::volatility::population_std_dev;
use super::{ensure_finite, ensure_min_len, finite_result, TRADING_DAYS_PER_YEAR};
use crate::error::{AnalysisError, AnalysisResult};
use crate::period::Period;
use crate::rounding::{pct2, round_to};

/// Sharpe ratio of a return series against a risk-free baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SharpeSummary {
    /// Mean per-period return, in percent
    pub avg_return_pct: f64,
    /// Population standard deviation of the returns, in percent
    pub volatility_pct: f64,
    /// Annual risk-free rate, in percent
    pub risk_free_rate_pct: f64,
    /// Per-period Sharpe ratio
    pub sharpe_ratio: f64,
    /// Sharpe ratio scaled by the daily annualization factor
    pub annualized_sharpe_ratio: f64,
    /// Number of returns used
    pub data_points: usize,
}

/// Computes `(mean - rf / 252) / volatility` and its annualized form.
///
/// The risk-free rate is annual. Annualization always uses the daily
/// factor (√252), whatever the sampling period of `returns`.
///
/// # Errors
///
/// - [`AnalysisError::InsufficientData`] with fewer than two returns
/// - [`AnalysisError::DivisionByZero`] when all returns are identical
/// - [`AnalysisError::InvalidInput`] for non-finite inputs, or a series whose
///   mean or deviation overflows
pub fn compute_sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> AnalysisResult<SharpeSummary> {
    ensure_min_len(returns)?;
    ensure_finite(returns, "returns")?;
    if !risk_free_rate.is_finite() {
        return Err(AnalysisError::invalid_input(format!(
            "risk_free_rate is not a finite number ({risk_free_rate})"
        )));
    }

    // Exact identity of the inputs, not a threshold on the computed deviation
    if returns.windows(2).all(|w| w[0] == w[1]) {
        return Err(AnalysisError::division_by_zero(
            "volatility is zero, all returns are identical",
        ));
    }

    let avg = finite_result(returns.iter().mean(), "average return")?;
    let volatility = finite_result(population_std_dev(returns), "volatility")?;
    if volatility == 0.0 {
        return Err(AnalysisError::division_by_zero("volatility is zero"));
    }

    let per_period_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    let sharpe = finite_result((avg - per_period_rf) / volatility, "sharpe ratio")?;
    let annualized = sharpe * Period::Daily.annualization_factor();

    Ok(SharpeSummary {
        avg_return_pct: finite_result(pct2(avg), "average return")?,
        volatility_pct: finite_result(pct2(volatility), "volatility")?,
        risk_free_rate_pct: finite_result(pct2(risk_free_rate), "risk-free rate")?,
        sharpe_ratio: finite_result(round_to(sharpe, 3), "sharpe ratio")?,
        annualized_sharpe_ratio: finite_result(round_to(annualized, 3), "annualized sharpe ratio")?,
        data_points: returns.len(),
    })
}
