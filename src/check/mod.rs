// src/check/mod.rs
mod error;
mod probe;
mod runner;

pub use error::CheckError;
pub use probe::Probe;
pub use runner::{Check, CheckState, CheckStatus};
