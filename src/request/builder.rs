//! Fluent builder for upstream computation requests.
//!
//! The builder accumulates income sources and jurisdictions into a
//! [`RequestDraft`]. Invalid input does not interrupt the chain: the first
//! error is captured and every later mutating call becomes a no-op, leaving
//! the valid state accumulated before the error untouched. The error
//! surfaces from [`RequestBuilder::send`], [`RequestBuilder::build_request`]
//! or an explicit [`RequestBuilder::take_error`].

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::directory::JurisdictionDirectory;
use crate::error::{TaxError, TaxResult};
use crate::models::{
    AdditionalEarnings, BusinessPolicy, CodeValue, ComputationRequest, ComputationResponse,
    Jurisdiction, Jurisdictions, PayFrequency, PayLine, SalaryFrequency, StatutoryPolicyInput,
};

use super::client::UpstreamClient;

/// Inputs accumulated by a [`RequestBuilder`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestDraft {
    salaries: Vec<BusinessPolicy>,
    hourlies: Vec<BusinessPolicy>,
    overtime: Vec<PayLine>,
    doubletime: Vec<PayLine>,
    jurisdictions: Vec<Jurisdiction>,
    pay_frequency: Option<PayFrequency>,
    pay_date: Option<NaiveDate>,
}

impl RequestDraft {
    /// Salary policies in insertion order.
    pub fn salaries(&self) -> &[BusinessPolicy] {
        &self.salaries
    }

    /// Hourly policies in insertion order.
    pub fn hourlies(&self) -> &[BusinessPolicy] {
        &self.hourlies
    }

    /// Overtime lines in insertion order.
    pub fn overtime(&self) -> &[PayLine] {
        &self.overtime
    }

    /// Doubletime lines in insertion order.
    pub fn doubletime(&self) -> &[PayLine] {
        &self.doubletime
    }

    /// Caller-selected jurisdictions; federal is only added on composition.
    pub fn jurisdictions(&self) -> &[Jurisdiction] {
        &self.jurisdictions
    }

    /// The selected pay frequency, if any was set.
    pub fn pay_frequency(&self) -> Option<PayFrequency> {
        self.pay_frequency
    }
}

#[derive(Debug, Clone)]
enum DraftState {
    Accumulating(RequestDraft),
    Failed { draft: RequestDraft, error: TaxError },
}

/// Builds and sends a request to the upstream calculation engine.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use taxcalc::directory::JurisdictionDirectory;
/// use taxcalc::models::{PayFrequency, SalaryFrequency};
/// use taxcalc::request::{RequestBuilder, UpstreamClient};
///
/// let client = UpstreamClient::new("http://localhost:9/calc", Duration::from_secs(1)).unwrap();
/// let directory = Arc::new(JurisdictionDirectory::preloaded(Vec::new()));
///
/// let builder = RequestBuilder::new(client, directory)
///     .with_salary(-1.0, SalaryFrequency::Annual)
///     .with_salary(50000.0, SalaryFrequency::Annual)
///     .with_pay_frequency(PayFrequency::Weekly);
///
/// // The negative salary poisoned the builder; the later calls were ignored.
/// assert!(builder.error().is_some());
/// assert!(builder.draft().salaries().is_empty());
/// assert!(builder.build_request().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    client: UpstreamClient,
    directory: Arc<JurisdictionDirectory>,
    state: DraftState,
}

impl RequestBuilder {
    /// Creates an empty builder.
    pub fn new(client: UpstreamClient, directory: Arc<JurisdictionDirectory>) -> Self {
        debug!(url = %client.url(), "initializing request builder");
        Self {
            client,
            directory,
            state: DraftState::Accumulating(RequestDraft::default()),
        }
    }

    /// Adds a salary income source. The amount is in dollars per `frequency`.
    pub fn with_salary(self, amount: f64, frequency: SalaryFrequency) -> Self {
        self.apply(|draft| {
            debug!(amount, frequency = %frequency, "adding salary");
            check_amount("salary amount", amount)?;
            let index = draft.salaries.len() + 1;
            draft
                .salaries
                .push(BusinessPolicy::salary(amount, frequency, index));
            Ok(())
        })
    }

    /// Adds an hourly income source. `rate` is in dollars per hour.
    pub fn with_hourly(self, hours: f64, rate: f64) -> Self {
        self.apply(|draft| {
            debug!(hours, rate, "adding hourly");
            check_hours_and_rate("hourly", hours, rate)?;
            let index = draft.hourlies.len() + 1;
            draft
                .hourlies
                .push(BusinessPolicy::hourly(hours, rate, index));
            Ok(())
        })
    }

    /// Adds an overtime line paid at 1.5x `rate`.
    pub fn with_overtime(self, hours: f64, rate: f64) -> Self {
        self.apply(|draft| {
            debug!(hours, rate, "adding overtime");
            check_hours_and_rate("overtime", hours, rate)?;
            draft.overtime.push(PayLine::overtime(hours, rate));
            Ok(())
        })
    }

    /// Adds a doubletime line paid at 2.0x `rate`.
    pub fn with_doubletime(self, hours: f64, rate: f64) -> Self {
        self.apply(|draft| {
            debug!(hours, rate, "adding doubletime");
            check_hours_and_rate("double time", hours, rate)?;
            draft.doubletime.push(PayLine::doubletime(hours, rate));
            Ok(())
        })
    }

    /// Adds already-resolved jurisdictions to both lived-in and worked-in lists.
    pub fn with_jurisdictions(self, jurisdictions: impl IntoIterator<Item = Jurisdiction>) -> Self {
        self.apply(|draft| {
            draft.jurisdictions.extend(jurisdictions);
            Ok(())
        })
    }

    /// Adds jurisdictions by code, discovering the directory on first use.
    ///
    /// If any code is unknown the draft is left as it was and the error is
    /// captured.
    pub async fn with_jurisdictions_by_code<S: AsRef<str>>(self, codes: &[S]) -> Self {
        if self.error().is_some() {
            return self;
        }

        debug!(count = codes.len(), "adding jurisdictions by code");
        let resolved = self.directory.resolve_all(codes).await;
        self.apply(|draft| {
            draft.jurisdictions.extend(resolved?);
            Ok(())
        })
    }

    /// Sets the reporting cadence. Monthly if never called.
    pub fn with_pay_frequency(self, frequency: PayFrequency) -> Self {
        self.apply(|draft| {
            debug!(frequency = %frequency, "setting pay frequency");
            draft.pay_frequency = Some(frequency);
            Ok(())
        })
    }

    /// Sets the pay date. Today if never called.
    pub fn with_pay_date(self, date: NaiveDate) -> Self {
        self.apply(|draft| {
            draft.pay_date = Some(date);
            Ok(())
        })
    }

    /// The accumulated inputs, whether or not an error was captured.
    pub fn draft(&self) -> &RequestDraft {
        match &self.state {
            DraftState::Accumulating(draft) | DraftState::Failed { draft, .. } => draft,
        }
    }

    /// The captured error, if any.
    pub fn error(&self) -> Option<&TaxError> {
        match &self.state {
            DraftState::Accumulating(_) => None,
            DraftState::Failed { error, .. } => Some(error),
        }
    }

    /// Removes and returns the captured error.
    ///
    /// The builder returns to accumulating with the entries it held before
    /// the error.
    pub fn take_error(&mut self) -> Option<TaxError> {
        let state = std::mem::replace(
            &mut self.state,
            DraftState::Accumulating(RequestDraft::default()),
        );
        match state {
            DraftState::Failed { draft, error } => {
                self.state = DraftState::Accumulating(draft);
                Some(error)
            }
            accumulating => {
                self.state = accumulating;
                None
            }
        }
    }

    /// Composes the upstream payload without sending it.
    ///
    /// The federal jurisdiction is appended when the selection lacks it.
    pub fn build_request(&self) -> TaxResult<ComputationRequest> {
        let draft = match &self.state {
            DraftState::Accumulating(draft) => draft,
            DraftState::Failed { error, .. } => return Err(error.clone()),
        };

        let pay_frequency = draft.pay_frequency.unwrap_or_else(|| {
            debug!("no pay frequency specified, defaulting to monthly");
            PayFrequency::Monthly
        });

        let mut jurisdictions = draft.jurisdictions.clone();
        if !jurisdictions.iter().any(Jurisdiction::is_federal) {
            jurisdictions.push(self.directory.federal());
        }

        let pay_date = draft
            .pay_date
            .unwrap_or_else(|| Local::now().date_naive());

        Ok(ComputationRequest {
            calculation_type_code: CodeValue::gross_to_net(),
            statutory_policy_inputs: vec![StatutoryPolicyInput::w4_2020()],
            jurisdictions: Jurisdictions {
                worked_in_jurisdictions: jurisdictions.clone(),
                lived_in_jurisdictions: jurisdictions,
            },
            pay_date: pay_date.format("%Y-%m-%d").to_string(),
            pay_frequency_code: pay_frequency.into(),
            business_policies: draft
                .salaries
                .iter()
                .chain(&draft.hourlies)
                .cloned()
                .collect(),
            additional_earnings: AdditionalEarnings {
                pay_lines: draft
                    .overtime
                    .iter()
                    .chain(&draft.doubletime)
                    .cloned()
                    .collect(),
            },
            deductions: Vec::new(),
        })
    }

    /// Composes the payload, sends it upstream and decodes the response.
    ///
    /// Fails with the captured error before any network traffic if the
    /// builder is poisoned. Does not modify the builder.
    pub async fn send(&self) -> TaxResult<ComputationResponse> {
        let request = self.build_request()?;
        debug!(
            jurisdictions = ?request.jurisdiction_codes(),
            policies = request.business_policies.len(),
            "sending computation request"
        );
        self.client.calculate(&request).await
    }

    fn apply(mut self, f: impl FnOnce(&mut RequestDraft) -> TaxResult<()>) -> Self {
        self.state = match self.state {
            // Every closure validates before it mutates, so on error the
            // draft still holds exactly the state from before the call.
            DraftState::Accumulating(mut draft) => match f(&mut draft) {
                Ok(()) => DraftState::Accumulating(draft),
                Err(error) => {
                    debug!(error = %error, "request builder entered error state");
                    DraftState::Failed { draft, error }
                }
            },
            failed @ DraftState::Failed { .. } => failed,
        };
        self
    }
}

fn check_hours_and_rate(kind: &str, hours: f64, rate: f64) -> TaxResult<()> {
    check_amount(&format!("{kind} hours"), hours)?;
    check_amount(&format!("{kind} rate"), rate)
}

fn check_amount(what: &str, value: f64) -> TaxResult<()> {
    if value.is_nan() || value < 0.0 {
        return Err(TaxError::validation(format!("{what} must be non-negative")));
    }
    // Non-finite numbers serialize as null.
    if value.is_infinite() {
        return Err(TaxError::validation(format!("{what} must be finite")));
    }
    Ok(())
}
