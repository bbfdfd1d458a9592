pub mod aggregate;
pub mod assemble;
pub mod calendar;
pub mod commands;
pub mod contracts;
pub mod error;
pub mod inflation;
pub mod projection;
pub mod source;
pub mod types;

pub use contracts::{FailureEnvelope, SuccessEnvelope};
pub use error::{EngineError, EngineResult};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
