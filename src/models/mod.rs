//! Domain models for the tax calculator.
//!
//! This module contains the shared data types: jurisdictions, pay
//! frequencies, and the request and response payloads exchanged with the
//! upstream calculation engine.

mod computation_request;
mod computation_response;
mod jurisdiction;
mod pay_frequency;

pub use computation_request::{
    AdditionalEarnings, BusinessPolicy, BusinessPolicyInput, CodeValue, ComputationRequest,
    DOUBLETIME_FACTOR, EarningType, Jurisdictions, NumberValue, OVERTIME_FACTOR, PayLine,
    StatutoryPolicyInput, StringValue,
};
pub use computation_response::{
    ComputationResponse, Deductions, Earnings, EarningsEntity, SummaryEntity, TaxEntities,
    TaxEntity, TaxJurisdiction, TaxLevelCode, Taxes,
};
pub use jurisdiction::{
    FEDERAL_CODE, Jurisdiction, JurisdictionCode, JurisdictionLevel, JurisdictionLevelCode,
};
pub use pay_frequency::{PayFrequency, SalaryFrequency};
