//! Tax jurisdiction model.
//!
//! This module contains the [`Jurisdiction`] type as the upstream engine
//! encodes it, along with the hardcoded federal fallback used when the
//! directory has not been populated.

use serde::{Deserialize, Serialize};

/// Code of the federal jurisdiction.
pub const FEDERAL_CODE: &str = "US";

/// The level of a taxing authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JurisdictionLevel {
    /// The federal government.
    Federal,
    /// A state government.
    State,
}

/// Short and long name of a jurisdiction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionCode {
    /// Long name, e.g. "California".
    pub name: String,
    /// Short code, e.g. "CA".
    pub code: String,
}

/// Wrapper for the level code, mirroring the upstream `{ "code": ... }` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionLevelCode {
    /// The level.
    pub code: JurisdictionLevel,
}

/// A tax jurisdiction as understood by the upstream engine.
///
/// # Example
///
/// ```
/// use taxcalc::models::{Jurisdiction, JurisdictionLevel};
///
/// let california = Jurisdiction::state("CA", "California", "b2c3");
/// assert_eq!(california.code(), "CA");
/// assert_eq!(california.level(), JurisdictionLevel::State);
/// assert!(!california.is_federal());
/// assert!(Jurisdiction::federal_fallback().is_federal());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jurisdiction {
    /// Opaque identifier assigned by the upstream engine.
    #[serde(rename = "jurisdictionID")]
    pub jurisdiction_id: String,
    /// Short and long name.
    #[serde(rename = "jurisdictionCode")]
    pub jurisdiction_code: JurisdictionCode,
    /// Federal or state.
    #[serde(rename = "jurisdictionLevelCode")]
    pub jurisdiction_level_code: JurisdictionLevelCode,
}

impl Jurisdiction {
    /// Creates a state-level jurisdiction.
    pub fn state(
        code: impl Into<String>,
        name: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            jurisdiction_id: id.into(),
            jurisdiction_code: JurisdictionCode {
                name: name.into(),
                code: code.into(),
            },
            jurisdiction_level_code: JurisdictionLevelCode {
                code: JurisdictionLevel::State,
            },
        }
    }

    /// The federal jurisdiction as of upstream version 2024.24.0.
    ///
    /// Discovered data is always preferred; this only exists so callers
    /// that need nothing but the federal entry never block on discovery.
    pub fn federal_fallback() -> Self {
        Self {
            jurisdiction_id: "dea07e6d-9432-4f65-958b-25f09e18117e".to_string(),
            jurisdiction_code: JurisdictionCode {
                name: "United States Federal".to_string(),
                code: FEDERAL_CODE.to_string(),
            },
            jurisdiction_level_code: JurisdictionLevelCode {
                code: JurisdictionLevel::Federal,
            },
        }
    }

    /// Returns the short code.
    pub fn code(&self) -> &str {
        &self.jurisdiction_code.code
    }

    /// Returns the level.
    pub fn level(&self) -> JurisdictionLevel {
        self.jurisdiction_level_code.code
    }

    /// Returns true when this is the federal jurisdiction.
    pub fn is_federal(&self) -> bool {
        self.code() == FEDERAL_CODE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_upstream_field_names() {
        let json = serde_json::to_value(Jurisdiction::federal_fallback()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "jurisdictionID": "dea07e6d-9432-4f65-958b-25f09e18117e",
                "jurisdictionCode": {"name": "United States Federal", "code": "US"},
                "jurisdictionLevelCode": {"code": "FEDERAL"}
            })
        );
    }

    #[test]
    fn test_deserializes_state_level() {
        let json = r#"{
            "jurisdictionID": "abc",
            "jurisdictionCode": {"name": "New York", "code": "NY"},
            "jurisdictionLevelCode": {"code": "STATE"}
        }"#;

        let jurisdiction: Jurisdiction = serde_json::from_str(json).unwrap();
        assert_eq!(jurisdiction, Jurisdiction::state("NY", "New York", "abc"));
    }

    #[test]
    fn test_federal_detection_is_by_code() {
        let mut federal = Jurisdiction::state("US", "United States", "x");
        assert!(federal.is_federal());

        federal.jurisdiction_code.code = "CA".to_string();
        assert!(!federal.is_federal());
    }
}
