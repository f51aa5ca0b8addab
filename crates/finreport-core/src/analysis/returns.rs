//! Simple period-over-period returns.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use super::{ensure_finite, ensure_min_len, finite_result};
use crate::error::{AnalysisError, AnalysisResult};
use crate::rounding::pct2;

/// Summary of the simple returns of a price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnsSummary {
    /// Last price over first price, minus one, in percent
    pub total_return_pct: f64,
    /// Mean per-period return in percent
    pub avg_return_pct: f64,
    /// Largest per-period return in percent
    pub max_return_pct: f64,
    /// Smallest per-period return in percent
    pub min_return_pct: f64,
    /// Number of per-period returns (prices minus one)
    pub return_count: usize,
}

/// Computes `price[i+1] / price[i] - 1` for each consecutive pair.
///
/// # Errors
///
/// - [`AnalysisError::InsufficientData`] with fewer than two prices
/// - [`AnalysisError::DivisionByZero`] if any price is zero
/// - [`AnalysisError::InvalidInput`] for negative or non-finite prices, or a
///   price ratio that overflows
pub fn simple_returns(prices: &[f64]) -> AnalysisResult<Vec<f64>> {
    ensure_min_len(prices)?;
    ensure_finite(prices, "prices")?;

    if let Some(index) = prices.iter().position(|p| *p == 0.0) {
        return Err(AnalysisError::division_by_zero(format!(
            "price at index {index} is zero"
        )));
    }
    if let Some(index) = prices.iter().position(|p| *p < 0.0) {
        return Err(AnalysisError::invalid_input(format!(
            "price at index {index} is negative ({})",
            prices[index]
        )));
    }

    prices
        .windows(2)
        .enumerate()
        .map(|(i, w)| finite_result(w[1] / w[0] - 1.0, &format!("return at index {i}")))
        .collect()
}

/// Computes total, mean, max and min simple returns of a price series.
///
/// # Example
///
/// ```
/// use finreport_core::analysis::compute_returns;
///
/// let summary = compute_returns(&[100.0, 110.0, 121.0]).unwrap();
/// assert_eq!(summary.avg_return_pct, 10.0);
/// ```
pub fn compute_returns(prices: &[f64]) -> AnalysisResult<ReturnsSummary> {
    let returns = simple_returns(prices)?;
    let first = prices[0];
    let last = prices[prices.len() - 1];

    let summary = ReturnsSummary {
        total_return_pct: finite_result(pct2(last / first - 1.0), "total return")?,
        avg_return_pct: finite_result(pct2(returns.iter().mean()), "average return")?,
        max_return_pct: finite_result(pct2(Statistics::<f64>::max(returns.iter())), "max return")?,
        min_return_pct: finite_result(pct2(Statistics::<f64>::min(returns.iter())), "min return")?,
        return_count: returns.len(),
    };

    tracing::debug!(
        return_count = summary.return_count,
        total_return_pct = summary.total_return_pct,
        "computed returns"
    );

    Ok(summary)
}
