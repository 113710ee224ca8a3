//! The breakdown returned by the upstream calculation engine.
//!
//! The structure is treated as already validated by the upstream; only the
//! net amount is interpreted locally.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::jurisdiction::JurisdictionCode;

/// The upstream response for a gross-to-net computation.
///
/// # Example
///
/// ```
/// use taxcalc::models::ComputationResponse;
///
/// let body = r#"{"net": {"amount": 4012.345, "currencyCode": "USD", "label": "Net"}}"#;
/// let response: ComputationResponse = serde_json::from_str(body).unwrap();
/// assert_eq!(response.formatted_net(), "4012.35");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputationResponse {
    /// Income sources making up the gross.
    pub earnings: Earnings,
    /// Taxes subtracted from the gross.
    pub taxes: Taxes,
    /// Gross total.
    pub gross: SummaryEntity,
    /// Net total.
    pub net: SummaryEntity,
    /// Deductions; always empty for the requests this crate sends.
    pub deductions: Deductions,
}

impl ComputationResponse {
    /// The net amount per pay period.
    pub fn net_amount(&self) -> Decimal {
        self.net.amount
    }

    /// The net amount rounded half away from zero to two decimals.
    pub fn formatted_net(&self) -> String {
        let rounded = self
            .net
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{rounded:.2}")
    }
}

/// A labelled total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SummaryEntity {
    /// Amount.
    pub amount: Decimal,
    /// ISO currency code.
    pub currency_code: String,
    /// Display label.
    pub label: String,
}

/// The earnings section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Earnings {
    /// One entry per income source.
    pub entities: Vec<EarningsEntity>,
    /// Total earnings.
    pub summary_entity: SummaryEntity,
}

/// A single income source in the earnings section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EarningsEntity {
    /// Amount.
    pub amount: Decimal,
    /// ISO currency code.
    pub currency_code: String,
    /// Display label.
    pub label: String,
    /// Hours, for hourly sources.
    pub hours: Decimal,
}

/// Taxes grouped by jurisdiction level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Taxes {
    /// Federal taxes.
    pub federal: TaxEntities,
    /// State taxes.
    pub state: TaxEntities,
    /// Local taxes.
    pub local: TaxEntities,
    /// Territory taxes.
    pub territory: TaxEntities,
    /// Total taxes.
    pub summary_entity: SummaryEntity,
}

/// Taxes for one jurisdiction level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaxEntities {
    /// Individual taxes.
    pub entities: Vec<TaxEntity>,
    /// Total for the level.
    pub summary_entity: SummaryEntity,
}

/// A single tax.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaxEntity {
    /// Amount.
    pub amount: Decimal,
    /// ISO currency code.
    pub currency_code: String,
    /// Display label, e.g. "Social Security".
    pub label: String,
    /// The levying jurisdiction.
    pub jurisdiction: Option<TaxJurisdiction>,
    /// The parent of the levying jurisdiction, if any.
    pub parent_jurisdiction: Option<TaxJurisdiction>,
}

/// A jurisdiction as it appears on a tax in the breakdown.
///
/// Unlike [`Jurisdiction`](super::Jurisdiction), which only ever names the
/// federal government or a state, the breakdown may attribute taxes to any
/// level the engine knows (local, territory, ...), so the level is kept as
/// the raw upstream code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxJurisdiction {
    /// Opaque identifier assigned by the upstream engine.
    #[serde(rename = "jurisdictionID")]
    pub jurisdiction_id: String,
    /// Short and long name.
    #[serde(rename = "jurisdictionCode")]
    pub jurisdiction_code: JurisdictionCode,
    /// Level code, e.g. "FEDERAL", "STATE" or "LOCAL".
    #[serde(rename = "jurisdictionLevelCode")]
    pub jurisdiction_level_code: TaxLevelCode,
}

impl TaxJurisdiction {
    /// The short code, e.g. "US".
    pub fn code(&self) -> &str {
        &self.jurisdiction_code.code
    }

    /// The upstream level code.
    pub fn level(&self) -> &str {
        &self.jurisdiction_level_code.code
    }

    /// Whether the tax is levied by the federal government.
    pub fn is_federal(&self) -> bool {
        self.level() == "FEDERAL"
    }
}

/// Wrapper for an uninterpreted level code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxLevelCode {
    /// The level, as sent by the engine.
    pub code: String,
}

/// The deductions section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Deductions {
    /// Deduction entries; their format is not interpreted.
    pub entities: Vec<serde_json::Value>,
    /// Total deductions.
    pub summary_entity: SummaryEntity,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample_body() -> &'static str {
        r#"{
            "earnings": {
                "entities": [{"amount": 5000, "currencyCode": "USD", "label": "Salary", "hours": 0}],
                "summaryEntity": {"amount": 5000, "currencyCode": "USD", "label": "Earnings"}
            },
            "taxes": {
                "federal": {
                    "entities": [{
                        "amount": 310,
                        "currencyCode": "USD",
                        "label": "Social Security",
                        "jurisdiction": {
                            "jurisdictionID": "dea07e6d-9432-4f65-958b-25f09e18117e",
                            "jurisdictionCode": {"name": "United States Federal", "code": "US"},
                            "jurisdictionLevelCode": {"code": "FEDERAL"}
                        }
                    }],
                    "summaryEntity": {"amount": 987.5, "currencyCode": "USD", "label": "Federal"}
                },
                "state": {"entities": [], "summaryEntity": {"amount": 0, "currencyCode": "USD", "label": "State"}},
                "summaryEntity": {"amount": 987.5, "currencyCode": "USD", "label": "Taxes"}
            },
            "gross": {"amount": 5000, "currencyCode": "USD", "label": "Gross"},
            "net": {"amount": 4012.5, "currencyCode": "USD", "label": "Net"},
            "deductions": {"entities": [], "summaryEntity": {"amount": 0, "currencyCode": "USD", "label": "Deductions"}}
        }"#
    }

    #[test]
    fn test_decodes_full_breakdown() {
        let response: ComputationResponse = serde_json::from_str(sample_body()).unwrap();

        assert_eq!(response.gross.amount, Decimal::from(5000));
        assert_eq!(response.net_amount(), Decimal::from_str("4012.5").unwrap());
        assert_eq!(response.taxes.federal.entities.len(), 1);
        assert!(
            response.taxes.federal.entities[0]
                .jurisdiction
                .as_ref()
                .unwrap()
                .is_federal()
        );
        assert!(response.taxes.local.entities.is_empty());
    }

    #[test]
    fn test_decodes_local_and_territory_taxes() {
        let body = r#"{
            "taxes": {
                "local": {
                    "entities": [{
                        "amount": 42.1,
                        "currencyCode": "USD",
                        "label": "City Wage Tax",
                        "jurisdiction": {
                            "jurisdictionID": "7f3e",
                            "jurisdictionCode": {"name": "Philadelphia", "code": "PHL"},
                            "jurisdictionLevelCode": {"code": "LOCAL"}
                        },
                        "parentJurisdiction": {
                            "jurisdictionID": "51aa",
                            "jurisdictionCode": {"name": "Pennsylvania", "code": "PA"},
                            "jurisdictionLevelCode": {"code": "STATE"}
                        }
                    }]
                },
                "territory": {
                    "entities": [{
                        "amount": 3,
                        "label": "Territorial Tax",
                        "jurisdiction": {"jurisdictionLevelCode": {"code": "TERRITORY"}}
                    }]
                }
            },
            "net": {"amount": 1957.9, "currencyCode": "USD", "label": "Net"}
        }"#;

        let response: ComputationResponse = serde_json::from_str(body).unwrap();

        let local = &response.taxes.local.entities[0];
        let city = local.jurisdiction.as_ref().unwrap();
        assert_eq!(city.level(), "LOCAL");
        assert_eq!(city.code(), "PHL");
        assert!(!city.is_federal());
        assert_eq!(local.parent_jurisdiction.as_ref().unwrap().code(), "PA");

        let territory = &response.taxes.territory.entities[0];
        assert_eq!(territory.jurisdiction.as_ref().unwrap().level(), "TERRITORY");
        assert_eq!(response.formatted_net(), "1957.90");
    }

    #[test]
    fn test_formatted_net_has_two_decimals() {
        let response: ComputationResponse = serde_json::from_str(sample_body()).unwrap();
        assert_eq!(response.formatted_net(), "4012.50");
    }

    #[test]
    fn test_formatted_net_rounds_half_away_from_zero() {
        let mut response = ComputationResponse::default();
        response.net.amount = Decimal::from_str("100.125").unwrap();
        assert_eq!(response.formatted_net(), "100.13");
    }

    #[test]
    fn test_rejects_non_object_body() {
        assert!(serde_json::from_str::<ComputationResponse>("[1, 2]").is_err());
    }
}
