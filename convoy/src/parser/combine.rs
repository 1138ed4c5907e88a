//! Combining named sub-handlers into one discriminant-dispatching handler.

use super::chain::{Handler, RecordInfo};
use crate::record::ScopeRecord;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Default discriminant field consulted by [`CombinedHandler`].
pub const DEFAULT_DISCRIMINANT: &str = "type";

/// One handler built from a map of named sub-handlers.
///
/// Dispatches on the payload's discriminant field: the sub-handler
/// registered under the field's value handles the record; a payload
/// with no match (or no discriminant at all) passes through
/// unconsumed.
pub struct CombinedHandler {
    field: String,
    handlers: BTreeMap<String, Arc<dyn Handler>>,
}

impl CombinedHandler {
    /// Builds a combined handler dispatching on the `type` field.
    #[must_use]
    pub fn new(handlers: impl IntoIterator<Item = (String, Arc<dyn Handler>)>) -> Self {
        Self::with_discriminant(DEFAULT_DISCRIMINANT, handlers)
    }

    /// Builds a combined handler dispatching on the given field.
    #[must_use]
    pub fn with_discriminant(
        field: impl Into<String>,
        handlers: impl IntoIterator<Item = (String, Arc<dyn Handler>)>,
    ) -> Self {
        Self {
            field: field.into(),
            handlers: handlers.into_iter().collect(),
        }
    }
}

impl Handler for CombinedHandler {
    fn call(
        &self,
        data: Value,
        info: &RecordInfo,
        raw: &ScopeRecord,
    ) -> anyhow::Result<Option<Value>> {
        let discriminant = data
            .get(&self.field)
            .and_then(Value::as_str)
            .map(ToString::to_string);

        match discriminant.and_then(|key| self.handlers.get(&key)) {
            Some(handler) => handler.call(data, info, raw),
            None => Ok(Some(data)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::chain::handler_fn;
    use super::*;
    use crate::parser::ContextRef;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn info() -> RecordInfo {
        RecordInfo {
            context: ContextRef::Unresolved("c1".to_string()),
            timestamp: 0,
        }
    }

    fn consuming_handler(hits: Arc<AtomicUsize>) -> Arc<dyn Handler> {
        handler_fn(move |_data, _info, _raw| {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        })
    }

    #[test]
    fn test_dispatches_on_matching_discriminant() {
        let hits = Arc::new(AtomicUsize::new(0));
        let combined = CombinedHandler::new([(
            "progress".to_string(),
            consuming_handler(hits.clone()),
        )]);

        let raw = ScopeRecord::new("c1", 0);
        let result = combined
            .call(serde_json::json!({"type": "progress", "percent": 50}), &info(), &raw)
            .expect("handler");

        assert!(result.is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unmatched_payload_passes_through() {
        let hits = Arc::new(AtomicUsize::new(0));
        let combined = CombinedHandler::new([(
            "progress".to_string(),
            consuming_handler(hits.clone()),
        )]);

        let raw = ScopeRecord::new("c1", 0);
        let payload = serde_json::json!({"type": "log", "line": "hello"});
        let result = combined
            .call(payload.clone(), &info(), &raw)
            .expect("handler");

        assert_eq!(result, Some(payload));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_discriminant_passes_through() {
        let hits = Arc::new(AtomicUsize::new(0));
        let combined =
            CombinedHandler::new([("progress".to_string(), consuming_handler(hits.clone()))]);

        let raw = ScopeRecord::new("c1", 0);
        let payload = serde_json::json!({"percent": 50});
        let result = combined
            .call(payload.clone(), &info(), &raw)
            .expect("handler");

        assert_eq!(result, Some(payload));
    }

    #[test]
    fn test_custom_discriminant_field() {
        let hits = Arc::new(AtomicUsize::new(0));
        let combined = CombinedHandler::with_discriminant(
            "kind",
            [("done".to_string(), consuming_handler(hits.clone()))],
        );

        let raw = ScopeRecord::new("c1", 0);
        let result = combined
            .call(serde_json::json!({"kind": "done"}), &info(), &raw)
            .expect("handler");

        assert!(result.is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
