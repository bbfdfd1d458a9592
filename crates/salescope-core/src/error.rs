use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct EngineError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
}

impl EngineError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
        }
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `salescope {cmd} --help` for usage."),
            None => "Run `salescope --help` for usage.".to_string(),
        };
        Self::new("invalid_argument", message, vec![help_hint])
    }

    pub fn source_read_failed(path: &str, detail: &str) -> Self {
        Self::new(
            "source_read_failed",
            &format!("Cannot read records from `{path}`: {detail}"),
            vec![
                format!("Check that `{path}` exists and is readable."),
                "Pass a normalized CSV or JSON record file.".to_string(),
            ],
        )
    }

    pub fn invalid_source_format(message: &str) -> Self {
        Self::new(
            "invalid_source_format",
            message,
            vec![
                "Provide a JSON top-level array or a CSV with a header row.".to_string(),
                "Run `salescope chart --help` for the record schema.".to_string(),
            ],
        )
    }

    pub fn source_schema_mismatch(expected_headers: &[&str], actual_headers: Vec<String>) -> Self {
        let expected = expected_headers.join(",");
        let actual = actual_headers.join(",");
        Self::new(
            "source_schema_mismatch",
            "CSV headers do not match the normalized record schema.",
            vec![
                format!("Expected headers: {expected}"),
                format!("Received headers: {actual}"),
                "Rename or reorder columns upstream; the reader does no header guessing."
                    .to_string(),
            ],
        )
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
