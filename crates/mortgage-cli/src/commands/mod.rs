pub mod calculate;
pub mod compare;
