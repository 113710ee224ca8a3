//! Pattern-based extraction from the upstream script bundles.
//!
//! The upstream publishes no jurisdiction listing, so the identifiers are
//! scraped out of the minified scripts that power its own web calculator.
//! Format drift surfaces as [`DiscoveryError`], never as a panic.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::DiscoveryError;
use crate::models::Jurisdiction;

/// Sub-component of the loader's version map that carries the calculator.
pub const CALCULATOR_COMPONENT: &str = "pcc";

static LOADER_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"const [[:alpha:]]=JSON\.parse\('(.+?)'\)").expect("valid loader regex")
});

static STATE_JURISDICTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"info = \{\s*shortName: '(.*?)',\s*longName: '(.*?)',\s*jurisdictionID: '(.*?)'\s*\};",
    )
    .expect("valid state regex")
});

static FEDERAL_JURISDICTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"const FEDERAL_JURISDICTION = (\{[\S\s]*?\});").expect("valid federal regex")
});

static UNQUOTED_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([[:alpha:]]+):").expect("valid key regex"));

static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("valid comma regex"));

#[derive(Debug, Deserialize)]
struct LoaderVersions {
    #[serde(rename = "GA", default)]
    ga: HashMap<String, String>,
}

/// Extracts the generally-available calculator version from the loader script.
///
/// # Example
///
/// ```
/// use taxcalc::directory::extract_version;
///
/// let loader = r#"!function(){const e=JSON.parse('{"RC":"2024.25.0","GA":{"pcc":"2024.24.0"}}')}"#;
/// assert_eq!(extract_version(loader).unwrap(), "2024.24.0");
/// ```
pub fn extract_version(loader: &str) -> Result<String, DiscoveryError> {
    let captures =
        LOADER_VERSION_RE
            .captures(loader)
            .ok_or_else(|| DiscoveryError::VersionNotFound {
                message: "no embedded version map".to_string(),
            })?;

    let versions: LoaderVersions = serde_json::from_str(&captures[1]).map_err(|e| {
        DiscoveryError::VersionNotFound {
            message: format!("version map is not valid JSON: {e}"),
        }
    })?;

    versions
        .ga
        .get(CALCULATOR_COMPONENT)
        .cloned()
        .ok_or_else(|| DiscoveryError::VersionNotFound {
            message: format!("no generally-available '{CALCULATOR_COMPONENT}' entry"),
        })
}

/// Extracts every state jurisdiction descriptor from the bundle.
pub fn extract_states(bundle: &str) -> Result<Vec<Jurisdiction>, DiscoveryError> {
    let states: Vec<Jurisdiction> = STATE_JURISDICTION_RE
        .captures_iter(bundle)
        .map(|caps| Jurisdiction::state(&caps[1], &caps[2], &caps[3]))
        .collect();

    if states.is_empty() {
        return Err(DiscoveryError::PatternNotFound {
            what: "state jurisdictions".to_string(),
        });
    }

    Ok(states)
}

/// Extracts the federal jurisdiction object literal from the bundle.
pub fn extract_federal(bundle: &str) -> Result<Jurisdiction, DiscoveryError> {
    let captures =
        FEDERAL_JURISDICTION_RE
            .captures(bundle)
            .ok_or_else(|| DiscoveryError::PatternNotFound {
                what: "federal jurisdiction".to_string(),
            })?;

    let repaired = repair_object_literal(&captures[1]);
    serde_json::from_str(&repaired).map_err(|e| DiscoveryError::MalformedFederal {
        message: e.to_string(),
    })
}

/// Rewrites a JavaScript object literal into strict JSON: bare keys are
/// quoted, single quotes become double quotes and trailing commas go.
///
/// ```
/// use taxcalc::directory::repair_object_literal;
///
/// let literal = "{ code: 'US', level: { code: 'FEDERAL', }, }";
/// assert_eq!(
///     repair_object_literal(literal),
///     r#"{"code": "US","level": {"code": "FEDERAL"}}"#
/// );
/// ```
pub fn repair_object_literal(literal: &str) -> String {
    let quoted = UNQUOTED_KEY_RE.replace_all(literal, "\"${1}\":");
    let quoted = quoted.replace('\'', "\"");
    TRAILING_COMMA_RE.replace_all(&quoted, "${1}").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JurisdictionLevel;

    const BUNDLE: &str = r#"
        class o{constructor(){this.info = {
            shortName: 'CA',
            longName: 'California',
            jurisdictionID: 'ca-id'
        };}}
        class n{constructor(){this.info = { shortName: 'NY', longName: 'New York', jurisdictionID: 'ny-id' };}}
        const FEDERAL_JURISDICTION = {
            jurisdictionID: 'us-id',
            jurisdictionCode: {
                name: 'United States Federal',
                code: 'US'
            },
            jurisdictionLevelCode: {
                code: 'FEDERAL'
            }
        };
    "#;

    #[test]
    fn test_extract_version_selects_ga_component() {
        let loader = r#"var x=1;const t=JSON.parse('{"RC":"9.9.9","GA":{"other":"1.0.0","pcc":"2024.24.0"}}');"#;
        assert_eq!(extract_version(loader).unwrap(), "2024.24.0");
    }

    #[test]
    fn test_extract_version_without_map_is_version_not_found() {
        let err = extract_version("console.log('nothing here')").unwrap_err();
        assert!(matches!(err, DiscoveryError::VersionNotFound { .. }));
    }

    #[test]
    fn test_extract_version_without_component_is_version_not_found() {
        let loader = r#"const t=JSON.parse('{"RC":"1","GA":{"other":"1.0.0"}}')"#;
        let err = extract_version(loader).unwrap_err();
        assert!(matches!(err, DiscoveryError::VersionNotFound { ref message } if message.contains("pcc")));
    }

    #[test]
    fn test_extract_states_finds_all_matches() {
        let states = extract_states(BUNDLE).unwrap();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0], Jurisdiction::state("CA", "California", "ca-id"));
        assert_eq!(states[1].code(), "NY");
        assert!(states.iter().all(|s| s.level() == JurisdictionLevel::State));
    }

    #[test]
    fn test_extract_states_empty_is_pattern_not_found() {
        let err = extract_states("const FEDERAL_JURISDICTION = {};").unwrap_err();
        assert_eq!(
            err,
            DiscoveryError::PatternNotFound {
                what: "state jurisdictions".to_string()
            }
        );
    }

    #[test]
    fn test_extract_federal_repairs_quasi_json() {
        let federal = extract_federal(BUNDLE).unwrap();
        assert_eq!(federal.jurisdiction_id, "us-id");
        assert!(federal.is_federal());
        assert_eq!(federal.level(), JurisdictionLevel::Federal);
    }

    #[test]
    fn test_extract_federal_missing_is_pattern_not_found() {
        let err = extract_federal("info = {};").unwrap_err();
        assert!(matches!(err, DiscoveryError::PatternNotFound { .. }));
    }

    #[test]
    fn test_extract_federal_unparseable_is_malformed() {
        let bundle = "const FEDERAL_JURISDICTION = { jurisdictionID: someVariable };";
        let err = extract_federal(bundle).unwrap_err();
        assert!(matches!(err, DiscoveryError::MalformedFederal { .. }));
    }
}
