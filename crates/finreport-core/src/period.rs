//! Reporting period tags used for annualization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Observation period of a return series.
///
/// The tag only selects an annualization multiplier; it carries no other
/// meaning for the calculators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// One observation per trading day (252 per year)
    #[default]
    Daily,
    /// One observation per week (52 per year)
    Weekly,
    /// One observation per month (12 per year)
    Monthly,
}

impl Period {
    /// Resolves a caller-supplied tag, falling back to [`Period::Daily`].
    ///
    /// Unrecognized tags are not an error: they use the daily multiplier and
    /// emit a warning.
    pub fn from_tag(tag: &str) -> Self {
        match tag.parse() {
            Ok(period) => period,
            Err(_) => {
                tracing::warn!(tag, "unrecognized period tag, using daily annualization");
                Period::Daily
            }
        }
    }

    /// Returns the number of periods per year.
    #[must_use]
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Period::Daily => 252,
            Period::Weekly => 52,
            Period::Monthly => 12,
        }
    }

    /// Returns the square-root-of-time multiplier converting a per-period
    /// statistic to an annual one.
    #[must_use]
    pub fn annualization_factor(&self) -> f64 {
        f64::from(self.periods_per_year()).sqrt()
    }

    /// Returns the lowercase tag for this period.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            other => Err(AnalysisError::invalid_input(format!(
                "unknown period '{other}', expected daily, weekly or monthly"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_annualization_factors() {
        assert_relative_eq!(Period::Daily.annualization_factor(), 252f64.sqrt());
        assert_relative_eq!(Period::Weekly.annualization_factor(), 52f64.sqrt());
        assert_relative_eq!(Period::Monthly.annualization_factor(), 12f64.sqrt());
    }

    #[test]
    fn test_parse_strict() {
        assert_eq!("weekly".parse::<Period>().unwrap(), Period::Weekly);
        assert_eq!(" Monthly ".parse::<Period>().unwrap(), Period::Monthly);
        assert!("quarterly".parse::<Period>().is_err());
    }

    #[test]
    fn test_unknown_tag_falls_back_to_daily() {
        assert_eq!(Period::from_tag("quarterly"), Period::Daily);
        assert_eq!(Period::from_tag(""), Period::Daily);
        assert_eq!(Period::from_tag("monthly"), Period::Monthly);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Period::Weekly).unwrap();
        assert_eq!(json, "\"weekly\"");
    }
}
