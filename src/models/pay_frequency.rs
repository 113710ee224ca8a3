//! Pay and salary frequency models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TaxError;

/// The cadence at which the net income is reported.
///
/// Parsing is lenient: anything unrecognized is treated as monthly.
///
/// # Example
///
/// ```
/// use taxcalc::models::PayFrequency;
///
/// assert_eq!(PayFrequency::parse_lenient("weekly"), PayFrequency::Weekly);
/// assert_eq!(PayFrequency::parse_lenient("biweekly"), PayFrequency::BiWeekly);
/// assert_eq!(PayFrequency::parse_lenient("fortnightly"), PayFrequency::Monthly);
/// assert_eq!(PayFrequency::BiWeekly.label(), "bi-weekly");
/// assert_eq!(PayFrequency::BiWeekly.code(), "BI_WEEKLY");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayFrequency {
    /// Once a month.
    #[default]
    Monthly,
    /// Twice a month.
    SemiMonthly,
    /// Every two weeks.
    BiWeekly,
    /// Every week.
    Weekly,
}

impl PayFrequency {
    /// Parses a pay frequency, defaulting to monthly for unknown values.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "monthly" => Self::Monthly,
            "semi-monthly" => Self::SemiMonthly,
            "biweekly" | "bi-weekly" => Self::BiWeekly,
            "weekly" => Self::Weekly,
            other => {
                if !other.is_empty() {
                    tracing::debug!(value = other, "unrecognized pay frequency, using monthly");
                }
                Self::Monthly
            }
        }
    }

    /// The code the upstream engine expects.
    pub fn code(self) -> &'static str {
        match self {
            Self::Monthly => "MONTHLY",
            Self::SemiMonthly => "SEMI_MONTHLY",
            Self::BiWeekly => "BI_WEEKLY",
            Self::Weekly => "WEEKLY",
        }
    }

    /// The human-readable label, also used when deriving cache keys.
    pub fn label(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::SemiMonthly => "semi-monthly",
            Self::BiWeekly => "bi-weekly",
            Self::Weekly => "weekly",
        }
    }
}

impl fmt::Display for PayFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a salary amount is per year or per pay period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SalaryFrequency {
    /// The amount is an annual salary.
    Annual,
    /// The amount is paid every pay period.
    Periodic,
}

impl SalaryFrequency {
    /// The alias the upstream engine uses for salary business policies.
    pub fn alias(self) -> &'static str {
        match self {
            Self::Annual => "salary",
            Self::Periodic => "salary_per_period",
        }
    }
}

impl fmt::Display for SalaryFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Annual => "annual",
            Self::Periodic => "periodic",
        })
    }
}

impl FromStr for SalaryFrequency {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "annual" | "salary" => Ok(Self::Annual),
            "periodic" | "salary_per_period" => Ok(Self::Periodic),
            other => Err(TaxError::validation(format!(
                "invalid salary frequency: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient_recognizes_all_frequencies() {
        assert_eq!(PayFrequency::parse_lenient("monthly"), PayFrequency::Monthly);
        assert_eq!(
            PayFrequency::parse_lenient("semi-monthly"),
            PayFrequency::SemiMonthly
        );
        assert_eq!(PayFrequency::parse_lenient("biweekly"), PayFrequency::BiWeekly);
        assert_eq!(PayFrequency::parse_lenient("bi-weekly"), PayFrequency::BiWeekly);
        assert_eq!(PayFrequency::parse_lenient("weekly"), PayFrequency::Weekly);
    }

    #[test]
    fn test_parse_lenient_defaults_unknown_to_monthly() {
        assert_eq!(PayFrequency::parse_lenient(""), PayFrequency::Monthly);
        assert_eq!(PayFrequency::parse_lenient("daily"), PayFrequency::Monthly);
        assert_eq!(PayFrequency::default(), PayFrequency::Monthly);
    }

    #[test]
    fn test_labels_are_distinct() {
        let labels = [
            PayFrequency::Monthly.label(),
            PayFrequency::SemiMonthly.label(),
            PayFrequency::BiWeekly.label(),
            PayFrequency::Weekly.label(),
        ];
        for (i, a) in labels.iter().enumerate() {
            for b in &labels[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_salary_frequency_rejects_unknown_kind() {
        assert_eq!("annual".parse::<SalaryFrequency>(), Ok(SalaryFrequency::Annual));
        assert_eq!(
            "periodic".parse::<SalaryFrequency>(),
            Ok(SalaryFrequency::Periodic)
        );

        let err = "hourly".parse::<SalaryFrequency>().unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "invalid salary frequency: hourly");
    }

    #[test]
    fn test_salary_alias_matches_upstream() {
        assert_eq!(SalaryFrequency::Annual.alias(), "salary");
        assert_eq!(SalaryFrequency::Periodic.alias(), "salary_per_period");
    }
}
