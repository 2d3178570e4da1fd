//! Output formatting

use dpp_sdk::TransactionOutcome;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Output builder for formatted CLI output
pub struct Output {
    json_mode: bool,
    fields: Map<String, Value>,
    message: Option<String>,
}

impl Output {
    /// Create a new output builder
    pub fn new(json_mode: bool) -> Self {
        Self {
            json_mode,
            fields: Map::new(),
            message: None,
        }
    }

    /// Add a string field to the output
    pub fn field(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    /// Add a u64 field to the output
    pub fn field_u64(mut self, key: &str, value: u64) -> Self {
        self.fields.insert(key.to_string(), Value::Number(value.into()));
        self
    }

    /// Add any serializable value
    pub fn field_value(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Set the human-readable message
    pub fn message(mut self, msg: &str) -> Self {
        self.message = Some(msg.to_string());
        self
    }

    /// Report a confirmed transaction
    pub fn outcome(json_mode: bool, action: &str, outcome: &TransactionOutcome) -> Self {
        let status = if outcome.is_success() { "success" } else { "failure" };
        let block = outcome
            .block_number
            .map_or_else(|| "-".to_string(), |b| b.to_string());
        Self::new(json_mode)
            .field("action", action)
            .field_value("outcome", outcome)
            .message(&format!(
                "{action}: {status}\n  tx:    {}\n  block: {block}",
                outcome.tx_hash
            ))
    }

    /// Render as it would be printed
    pub fn render(&self) -> Option<String> {
        if self.json_mode {
            serde_json::to_string_pretty(&json!(self.fields)).ok()
        } else {
            self.message.clone()
        }
    }

    /// Print the output
    pub fn print(self) {
        if let Some(text) = self.render() {
            println!("{}", text);
        }
    }
}
