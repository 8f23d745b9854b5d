use clap::Args;
use serde_json::Value;

use smithy_core::diagnostics::FileSink;
use smithy_core::tax::TaxTables;
use smithy_core::{CalculatorInput, SmithManoeuvreEngine, SmithyError};

use crate::input;

/// Arguments for a full Smith Manoeuvre projection
#[derive(Args)]
pub struct ScenarioArgs {
    /// Path to a JSON or YAML file with the full calculator input
    #[arg(long)]
    pub input: Option<String>,

    /// Write the per-calculation diagnostic snapshot to this file
    #[arg(long)]
    pub debug_log: Option<String>,
}

pub fn run_calculate(args: ScenarioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let calc_input: CalculatorInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err(SmithyError::MissingInput(
            "calculator input: provide --input or pipe JSON on stdin".into(),
        )
        .into());
    };

    let engine = match args.debug_log {
        Some(path) => SmithManoeuvreEngine::new(
            TaxTables::canada_2024(),
            Box::new(FileSink::new(path)),
        ),
        None => SmithManoeuvreEngine::default(),
    };

    let output = engine.calculate(&calc_input)?;
    Ok(serde_json::to_value(output)?)
}
