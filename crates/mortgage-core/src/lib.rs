pub mod calculator;
pub mod error;
pub mod loan;
pub mod phases;
pub mod scenario;
pub mod schedule;
pub mod time_value;
pub mod types;
pub mod valuation;

pub use error::MortgageError;
pub use types::*;

/// Standard result type for all mortgage-engine operations
pub type MortgageResult<T> = Result<T, MortgageError>;
