//! Optional post-success observer. The pipeline notifies it after a
//! successful dispatch and before projection; it is never a dependency of
//! the core flow.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde_json::Value;

pub trait InvocationObserver: Send + Sync {
    fn record(&self, operation: &str, request: &Value, response: &Value);
}

#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub operation: String,
    pub request: Value,
    pub response: Value,
    pub at: DateTime<Utc>,
}

/// In-memory call history, one per process.
#[derive(Default)]
pub struct InvocationHistory {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl InvocationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl InvocationObserver for InvocationHistory {
    fn record(&self, operation: &str, request: &Value, response: &Value) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(HistoryEntry {
                operation: operation.to_string(),
                request: request.clone(),
                response: response.clone(),
                at: Utc::now(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_in_call_order() {
        let history = InvocationHistory::new();
        history.record("StartChannel", &json!({"a": 1}), &json!({"State": "STARTING"}));
        history.record("StopChannel", &json!({}), &json!({"State": "STOPPING"}));
        let entries = history.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].operation, "StartChannel");
        assert_eq!(entries[1].operation, "StopChannel");
        assert_eq!(entries[0].response, json!({"State": "STARTING"}));
    }
}
