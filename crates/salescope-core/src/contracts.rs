use serde::Serialize;
use serde_json::Value;

use crate::API_VERSION;
use crate::assemble::ChartPayload;
use crate::error::{EngineError, EngineResult};

/// Envelope wrapping every successful command result.
#[derive(Debug, Clone, Serialize)]
pub struct SuccessEnvelope {
    pub ok: bool,
    pub command: String,
    pub version: String,
    pub data: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureEnvelope {
    pub ok: bool,
    pub error: ErrorContract,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorContract {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
}

pub fn success<T>(command: &str, data: T) -> EngineResult<SuccessEnvelope>
where
    T: Serialize,
{
    let json_data = serde_json::to_value(data)
        .map_err(|err| EngineError::internal_serialization(&err.to_string()))?;
    Ok(SuccessEnvelope {
        ok: true,
        command: command.to_string(),
        version: API_VERSION.to_string(),
        data: json_data,
    })
}

pub fn failure_from_error(error: &EngineError) -> FailureEnvelope {
    FailureEnvelope {
        ok: false,
        error: ErrorContract {
            code: error.code.clone(),
            message: error.message.clone(),
            recovery_steps: error.recovery_steps.clone(),
        },
    }
}

/// `chart` command payload: the request echo plus the chart itself.
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub granularity: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub category: Option<String>,
    pub article: Option<String>,
    pub metrics: Vec<String>,
    pub projection: bool,
    pub record_count: usize,
    pub chart: ChartPayload,
}

/// `summary` command payload: one row per period bucket.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub granularity: String,
    pub rows: Vec<SummaryRow>,
    pub skipped_undated: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub period: String,
    pub units: f64,
    pub net_amount: f64,
    pub unique_receipts: usize,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::error::EngineError;

    use super::{failure_from_error, success};

    #[test]
    fn success_envelope_carries_command_and_version() {
        let envelope = success("chart", json!({"labels": []}));
        assert!(envelope.is_ok());
        if let Ok(envelope) = envelope {
            assert!(envelope.ok);
            assert_eq!(envelope.command, "chart");
            assert_eq!(envelope.version, crate::API_VERSION);
        }
    }

    #[test]
    fn failure_envelope_mirrors_the_error_contract() {
        let error = EngineError::invalid_argument("bad granularity");
        let envelope = failure_from_error(&error);
        assert!(!envelope.ok);
        assert_eq!(envelope.error.code, "invalid_argument");
        assert_eq!(envelope.error.message, "bad granularity");
    }
}
