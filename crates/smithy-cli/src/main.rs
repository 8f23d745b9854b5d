mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::mortgage::{PaymentArgs, PayoffArgs};
use commands::scenario::ScenarioArgs;
use commands::tax::TaxRateArgs;

/// Smith Manoeuvre mortgage-conversion projections
#[derive(Parser)]
#[command(
    name = "smithy",
    version,
    about = "Smith Manoeuvre mortgage-conversion projections",
    long_about = "Projects the financial outcome of converting non-deductible \
                  primary-residence mortgage interest into tax-deductible \
                  investment-loan interest: marginal tax rates by province, \
                  mortgage amortization, rental cash flow and household-level \
                  income splitting, with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full projection from a JSON/YAML input file or piped stdin
    Calculate(ScenarioArgs),
    /// Resolve a combined federal + provincial marginal tax rate
    TaxRate(TaxRateArgs),
    /// Monthly payment for an amortizing mortgage
    Payment(PaymentArgs),
    /// Months to pay off a balance at a given monthly payment
    Payoff(PayoffArgs),
    /// List the supported provinces and their summary rates
    Provinces,
    /// Print version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::scenario::run_calculate(args),
        Commands::TaxRate(args) => commands::tax::run_tax_rate(args),
        Commands::Payment(args) => commands::mortgage::run_payment(args),
        Commands::Payoff(args) => commands::mortgage::run_payoff(args),
        Commands::Provinces => commands::tax::run_provinces(),
        Commands::Version => {
            println!("smithy {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}
