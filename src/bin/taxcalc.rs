//! Offline command-line calculator.
//!
//! Prints the net income per pay period for an annual salary:
//!
//! ```bash
//! taxcalc --state ca --pay-frequency bi-weekly 85000
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgAction, Parser};
use tracing::{debug, error, Level};

use taxcalc::config::{ConfigLoader, ServiceConfig};
use taxcalc::directory::{HttpScriptSource, JurisdictionDirectory};
use taxcalc::error::{TaxError, TaxResult};
use taxcalc::models::{PayFrequency, SalaryFrequency};
use taxcalc::observability::{init_logging, verbosity_level, LogFormat};
use taxcalc::request::{RequestBuilder, UpstreamClient};

/// Calculates the net income less tax per pay period for an annual salary.
#[derive(Debug, Parser)]
#[command(name = "taxcalc", version, allow_negative_numbers = true)]
struct Cli {
    /// Annual salary in dollars.
    salary: f64,

    /// State to calculate income tax for, as a two-letter abbreviation.
    #[arg(short, long, default_value = "")]
    state: String,

    /// Pay frequency: monthly, semi-monthly, bi-weekly or weekly.
    #[arg(short, long, default_value = "monthly")]
    pay_frequency: String,

    /// YAML file overriding the upstream endpoints.
    #[arg(long, env = "TAXCALC_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    // A second subscriber is the only failure mode; nothing to report it to.
    let _ = init_logging(verbosity_level(Level::WARN, cli.verbose), LogFormat::Compact);

    match run(cli).await {
        Ok(net) => {
            println!("{net}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "failed to calculate net income");
            eprintln!("taxcalc: {err}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> TaxResult<String> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load(path)?.into_config(),
        None => ServiceConfig::default(),
    };
    let upstream = &config.upstream;

    let source =
        HttpScriptSource::new(upstream.timeout()).map_err(|message| TaxError::Transport { message })?;
    let directory = JurisdictionDirectory::new(Arc::new(source), upstream.discovery_endpoints());
    let client = UpstreamClient::new(upstream.calculation_url.clone(), upstream.timeout())?;

    let mut builder = RequestBuilder::new(client, Arc::new(directory))
        .with_salary(cli.salary, SalaryFrequency::Annual)
        .with_pay_frequency(PayFrequency::parse_lenient(&cli.pay_frequency));

    let state = cli.state.trim().to_uppercase();
    if !state.is_empty() {
        debug!(state = %state, "adding state");
        builder = builder.with_jurisdictions_by_code(&[state]).await;
    }

    let response = builder.send().await?;
    Ok(response.formatted_net())
}
