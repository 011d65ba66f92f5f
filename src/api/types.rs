use serde::{Deserialize, Serialize};

/// A workflow record as returned by the listing endpoint.
///
/// The record is kept as raw JSON; the listing never depends on its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowSummary(serde_json::Value);

impl WorkflowSummary {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn id(&self) -> Option<&str> {
        self.field("id").and_then(|v| v.as_str())
    }

    pub fn name(&self) -> Option<&str> {
        self.field("name").and_then(|v| v.as_str())
    }

    pub fn owner(&self) -> Option<&str> {
        // Accio serializes owners either as a plain string or as a user object
        match self.field("owner")? {
            serde_json::Value::String(s) => Some(s),
            other => other.get("name").and_then(|v| v.as_str()),
        }
    }

    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

/// One page of listing results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    #[serde(default)]
    pub results: Vec<WorkflowSummary>,
    #[serde(default)]
    pub total_count: u64,
}
