use std::io;

use salescope_core::contracts::failure_from_error;
use salescope_core::{EngineError, SuccessEnvelope};

pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    serde_json::to_string_pretty(success).map_err(io::Error::other)
}

pub fn render_error_json(error: &EngineError) -> io::Result<String> {
    serde_json::to_string_pretty(&failure_from_error(error)).map_err(io::Error::other)
}
