use std::sync::OnceLock;

use napi::Result as NapiResult;
use napi_derive::napi;

use mortgage_core::calculator::calculate_request;
use mortgage_core::loan::LoanRequest;
use mortgage_core::scenario::ScenarioStore;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Scenarios live for the lifetime of the host process, so comparisons can
/// span multiple calls from the presentation layer.
fn store() -> &'static ScenarioStore {
    static STORE: OnceLock<ScenarioStore> = OnceLock::new();
    STORE.get_or_init(ScenarioStore::new)
}

/// Validate and compute a loan, storing the result under its scenario name.
///
/// Fails if the request is invalid or the scenario store is full; a full
/// store rejects the calculation rather than silently dropping the result.
#[napi]
pub fn calculate_loan(input_json: String) -> NapiResult<String> {
    let request: LoanRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = calculate_request(&request).map_err(to_napi_error)?;
    store()
        .put(&output.result.scenario_name, output.result.clone())
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Snapshot of all stored scenarios, keyed by name.
#[napi]
pub fn list_scenarios() -> NapiResult<String> {
    serde_json::to_string(&store().list()).map_err(to_napi_error)
}

/// Remove a stored scenario, returning the removed result.
#[napi]
pub fn delete_scenario(name: String) -> NapiResult<String> {
    let removed = store().delete(&name).map_err(to_napi_error)?;
    serde_json::to_string(&removed).map_err(to_napi_error)
}
