//! The canonical payload sent to the upstream calculation engine.
//!
//! These types are pure data. They are assembled by
//! [`RequestBuilder`](crate::request::RequestBuilder) and serialized as
//! camelCase JSON.

use serde::{Deserialize, Serialize};

use super::jurisdiction::Jurisdiction;
use super::pay_frequency::{PayFrequency, SalaryFrequency};

/// Multiplier attached to overtime pay lines.
pub const OVERTIME_FACTOR: f64 = 1.5;

/// Multiplier attached to doubletime pay lines.
pub const DOUBLETIME_FACTOR: f64 = 2.0;

/// The request body POSTed to the upstream engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputationRequest {
    /// Always gross-to-net.
    pub calculation_type_code: CodeValue,
    /// Statutory options such as the W-4 form revision.
    pub statutory_policy_inputs: Vec<StatutoryPolicyInput>,
    /// Lived-in and worked-in jurisdictions.
    pub jurisdictions: Jurisdictions,
    /// Pay date as `YYYY-MM-DD`.
    pub pay_date: String,
    /// Reporting cadence.
    pub pay_frequency_code: CodeValue,
    /// Gross income sources.
    pub business_policies: Vec<BusinessPolicy>,
    /// Overtime and doubletime lines.
    pub additional_earnings: AdditionalEarnings,
    /// Always empty.
    pub deductions: Vec<serde_json::Value>,
}

impl ComputationRequest {
    /// Returns the jurisdiction codes in the lived-in list.
    pub fn jurisdiction_codes(&self) -> Vec<&str> {
        self.jurisdictions
            .lived_in_jurisdictions
            .iter()
            .map(Jurisdiction::code)
            .collect()
    }
}

/// A `{ "code": ... }` wrapper used for several upstream enumerations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeValue {
    /// The code.
    pub code: String,
}

impl CodeValue {
    /// The gross-to-net calculation type.
    pub fn gross_to_net() -> Self {
        Self {
            code: "GROSS_TO_NET".to_string(),
        }
    }
}

impl From<PayFrequency> for CodeValue {
    fn from(frequency: PayFrequency) -> Self {
        Self {
            code: frequency.code().to_string(),
        }
    }
}

/// An option such as filing status or the W-4 revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatutoryPolicyInput {
    /// Identifier.
    pub id: String,
    /// Name, equal to the identifier in practice.
    pub name: String,
    /// Value of the option.
    pub value: serde_json::Value,
    /// Value type, e.g. `boolean`.
    #[serde(rename = "type")]
    pub input_type: String,
    /// Upstream template identifier.
    #[serde(rename = "templateID")]
    pub template_id: String,
}

impl StatutoryPolicyInput {
    /// Selects the 2020-and-later W-4 form.
    pub fn w4_2020() -> Self {
        Self {
            id: "w4Form2020Indicator".to_string(),
            name: "w4Form2020Indicator".to_string(),
            value: serde_json::Value::Bool(true),
            input_type: "boolean".to_string(),
            template_id: "e01a6863-4fc7-4c2a-ac8c-f8d896c6fba2".to_string(),
        }
    }
}

/// Lived-in and worked-in jurisdiction lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Jurisdictions {
    /// Where the income is earned.
    pub worked_in_jurisdictions: Vec<Jurisdiction>,
    /// Where the earner resides.
    pub lived_in_jurisdictions: Vec<Jurisdiction>,
}

/// One gross income source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessPolicy {
    /// Unique per kind, e.g. `salary-1`.
    pub id: String,
    /// Policy alias.
    pub alias: String,
    /// `SALARY` or `HOURLY`.
    pub label: String,
    /// Policy inputs; their names depend on the label.
    pub inputs: Vec<BusinessPolicyInput>,
}

impl BusinessPolicy {
    /// A salary policy. `index` starts at 1.
    pub fn salary(amount: f64, frequency: SalaryFrequency, index: usize) -> Self {
        Self {
            id: format!("salary-{index}"),
            alias: frequency.alias().to_string(),
            label: "SALARY".to_string(),
            inputs: vec![BusinessPolicyInput::new(
                "appliedPayPeriodAmount",
                amount,
                "amount",
            )],
        }
    }

    /// An hourly policy. `index` starts at 1.
    pub fn hourly(hours: f64, rate: f64, index: usize) -> Self {
        Self {
            id: format!("hourly-{index}"),
            alias: "hourly".to_string(),
            label: "HOURLY".to_string(),
            inputs: vec![
                BusinessPolicyInput::new("appliedHourlyRate", rate, "rate"),
                BusinessPolicyInput::new("regularHoursWorked", hours, "quantity"),
            ],
        }
    }
}

/// A single named input of a business policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessPolicyInput {
    /// Input name.
    pub name: String,
    /// Input value.
    pub value: f64,
    /// Input type, e.g. `amount`.
    #[serde(rename = "type")]
    pub input_type: String,
}

impl BusinessPolicyInput {
    fn new(name: &str, value: f64, input_type: &str) -> Self {
        Self {
            name: name.to_string(),
            value,
            input_type: input_type.to_string(),
        }
    }
}

/// Supplemental earnings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalEarnings {
    /// Overtime lines first, then doubletime lines.
    pub pay_lines: Vec<PayLine>,
}

/// A supplemental earning such as overtime.
///
/// `unit` is the hours worked and `amount` the hourly rate before the
/// client factor is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayLine {
    /// Kind of earning.
    pub earning_type: EarningType,
    /// Hours, as a two-decimal string.
    pub unit: StringValue,
    /// Hourly rate.
    pub amount: NumberValue,
    /// Display name.
    pub name: StringValue,
    /// Rate multiplier.
    pub client_factor: NumberValue,
}

impl PayLine {
    /// An overtime line at 1.5x.
    pub fn overtime(hours: f64, rate: f64) -> Self {
        Self {
            earning_type: EarningType {
                value: "OvertimePay".to_string(),
                label: "OVERTIME".to_string(),
                earning_type: "HUR".to_string(),
            },
            unit: StringValue::hours(hours),
            amount: NumberValue { value: rate },
            name: StringValue {
                value: "Overtime".to_string(),
            },
            client_factor: NumberValue {
                value: OVERTIME_FACTOR,
            },
        }
    }

    /// A doubletime line at 2.0x.
    pub fn doubletime(hours: f64, rate: f64) -> Self {
        Self {
            earning_type: EarningType {
                value: "DoubletimePay".to_string(),
                label: "DOUBLE_TIME".to_string(),
                earning_type: "HUR".to_string(),
            },
            unit: StringValue::hours(hours),
            amount: NumberValue { value: rate },
            name: StringValue {
                value: "Double time".to_string(),
            },
            client_factor: NumberValue {
                value: DOUBLETIME_FACTOR,
            },
        }
    }
}

/// Kind of a supplemental earning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningType {
    /// Upstream value, e.g. `OvertimePay`.
    pub value: String,
    /// Upstream label, e.g. `OVERTIME`.
    pub label: String,
    /// Unit type; `HUR` for hourly.
    #[serde(rename = "type")]
    pub earning_type: String,
}

/// A `{ "value": "<string>" }` wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringValue {
    /// The value.
    pub value: String,
}

impl StringValue {
    fn hours(hours: f64) -> Self {
        Self {
            value: format!("{hours:.2}"),
        }
    }
}

/// A `{ "value": <number> }` wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumberValue {
    /// The value.
    pub value: f64,
}
