use serde::Deserialize;
use serde_json::{Map, Value};

/// Request payload for /analyze.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Table rows as JSON records; the `comment` key holds the free text,
    /// any other keys are ignored.
    pub rows: Vec<Map<String, Value>>,
}
