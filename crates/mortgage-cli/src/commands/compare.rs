use clap::Args;
use serde_json::Value;

use mortgage_core::calculator;
use mortgage_core::loan::LoanRequest;
use mortgage_core::scenario::ScenarioStore;

use crate::input;

#[derive(Args)]
pub struct CompareArgs {
    /// JSON loan request files, one per scenario. The store holds at most
    /// three scenarios; a fourth distinct name is an error.
    #[arg(long = "input", required = true)]
    pub inputs: Vec<String>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let store = ScenarioStore::new();

    for path in &args.inputs {
        let request: LoanRequest = input::file::read_json(path)?;
        let output = calculator::calculate_request(&request)?;
        let name = output.result.scenario_name.clone();
        store.put(&name, output.result)?;
    }

    Ok(serde_json::to_value(store.list())?)
}
