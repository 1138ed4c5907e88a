//! Reporters serialize typed events into outgoing scope records.

use super::execution::ExecutionContext;
use super::sink::RecordSink;
use crate::record::ScopeRecord;
use crate::utils::epoch_millis;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Trait for reporters that emit records on behalf of one context.
///
/// A context builds its reporter through the factory stored in its
/// configuration, so a context tree can carry a custom reporter type
/// without the core knowing about it.
pub trait Reporter: Send + Sync {
    /// Emits one typed event for the owning context.
    ///
    /// The owning context's id is merged into the outgoing record; the
    /// event kind lands in the record's `type` field. `type` is
    /// reserved: a `type` key already present in `data` is replaced by
    /// `kind`.
    fn report(&self, kind: &str, data: Map<String, Value>);
}

/// Factory that builds a reporter for a given context.
///
/// Resolved at context construction and inherited by sub-contexts.
pub type ReporterFactory = Arc<dyn Fn(&ExecutionContext) -> Box<dyn Reporter> + Send + Sync>;

/// The default reporter: stamps the record and hands it to the sink.
pub struct RecordReporter {
    context_id: String,
    sink: Arc<dyn RecordSink>,
}

impl RecordReporter {
    /// Creates a reporter for the given context.
    #[must_use]
    pub fn new(context: &ExecutionContext) -> Self {
        Self {
            context_id: context.id().to_string(),
            sink: context.sink(),
        }
    }
}

impl Reporter for RecordReporter {
    fn report(&self, kind: &str, data: Map<String, Value>) {
        let mut fields = data;
        // `type` is reserved for the event kind, see the trait docs.
        fields.insert("type".to_string(), Value::String(kind.to_string()));

        let record = ScopeRecord {
            context: self.context_id.clone(),
            timestamp: epoch_millis(),
            begin: None,
            fields,
        };
        self.sink.try_emit(record);
    }
}

/// Returns the default reporter factory.
#[must_use]
pub fn default_reporter_factory() -> ReporterFactory {
    Arc::new(|context| Box::new(RecordReporter::new(context)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CollectingRecordSink, ContextConfig};

    #[test]
    fn test_record_reporter_stamps_context_and_type() {
        let sink = Arc::new(CollectingRecordSink::new());
        let config = ContextConfig::new().with_sink(sink.clone());
        let context = ExecutionContext::root(config, Map::new());

        let reporter = RecordReporter::new(&context);
        let mut data = Map::new();
        data.insert("message".to_string(), serde_json::json!("beepbop"));
        reporter.report("info", data);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].context, context.id());
        assert_eq!(records[0].fields["type"], serde_json::json!("info"));
        assert_eq!(records[0].fields["message"], serde_json::json!("beepbop"));
    }

    #[test]
    fn test_record_reporter_kind_replaces_caller_type() {
        let sink = Arc::new(CollectingRecordSink::new());
        let config = ContextConfig::new().with_sink(sink.clone());
        let context = ExecutionContext::root(config, Map::new());

        let reporter = RecordReporter::new(&context);
        let mut data = Map::new();
        data.insert("type".to_string(), serde_json::json!("spoofed"));
        data.insert("message".to_string(), serde_json::json!("still here"));
        reporter.report("info", data);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields["type"], serde_json::json!("info"));
        assert_eq!(records[0].fields["message"], serde_json::json!("still here"));
    }
}
