use clap::Args;
use serde_json::Value;

use mortgage_core::calculator;
use mortgage_core::loan::LoanRequest;

use crate::input;

#[derive(Args)]
pub struct CalculateArgs {
    /// Path to a JSON loan request; piped stdin is used when absent
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to a JSON loan request; piped stdin is used when absent
    #[arg(long)]
    pub input: Option<String>,
}

fn read_request(path: &Option<String>) -> Result<LoanRequest, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        input::file::read_json(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err("--input <file.json> or stdin required for a loan calculation".into())
    }
}

pub fn run_calculate(args: CalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = read_request(&args.input)?;
    let output = calculator::calculate_request(&request)?;
    Ok(serde_json::to_value(output)?)
}

/// The amortization ledger alone, which formats naturally as a table or CSV.
pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = read_request(&args.input)?;
    let output = calculator::calculate_request(&request)?;
    Ok(serde_json::to_value(&output.result.amortization_schedule)?)
}
