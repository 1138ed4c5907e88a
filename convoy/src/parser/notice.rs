//! Parser meta-notifications.
//!
//! The parser reports its own milestones out-of-band from the handler
//! chain: a context registration, and a record that no handler
//! consumed. Both travel as one tagged union to registered sinks
//! rather than through an inherited event emitter.

use super::chain::RecordInfo;
use super::parsed::ParsedContext;
use crate::record::ScopeRecord;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// A meta-notification emitted by the event parser.
#[derive(Debug, Clone)]
pub enum ParserNotice {
    /// A new context was registered.
    Begin {
        /// The freshly registered context.
        context: Arc<ParsedContext>,
        /// The record that introduced it.
        record: ScopeRecord,
    },
    /// A record reached the synthetic fallback unconsumed.
    Uncaught {
        /// The payload as it reached the fallback.
        data: Value,
        /// The record's context and timestamp.
        info: RecordInfo,
    },
}

/// Trait for sinks that observe parser notices.
pub trait NoticeSink: Send + Sync {
    /// Delivers one notice.
    fn notify(&self, notice: &ParserNotice);
}

impl<F> NoticeSink for F
where
    F: Fn(&ParserNotice) + Send + Sync,
{
    fn notify(&self, notice: &ParserNotice) {
        self(notice);
    }
}

/// A sink that logs notices through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNoticeSink;

impl NoticeSink for LoggingNoticeSink {
    fn notify(&self, notice: &ParserNotice) {
        match notice {
            ParserNotice::Begin { context, .. } => {
                debug!(
                    context = %context.id(),
                    parent = ?context.parent().map(ToString::to_string),
                    "context registered"
                );
            }
            ParserNotice::Uncaught { data, info } => {
                warn!(
                    context = %info.context.id(),
                    timestamp = info.timestamp,
                    data = %data,
                    "record not consumed by any handler"
                );
            }
        }
    }
}

/// A collecting sink for tests.
#[derive(Default)]
pub struct CollectingNoticeSink {
    notices: parking_lot::RwLock<Vec<ParserNotice>>,
}

impl CollectingNoticeSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected notices.
    #[must_use]
    pub fn notices(&self) -> Vec<ParserNotice> {
        self.notices.read().clone()
    }

    /// Returns the registered contexts from `Begin` notices, in order.
    #[must_use]
    pub fn begins(&self) -> Vec<Arc<ParsedContext>> {
        self.notices
            .read()
            .iter()
            .filter_map(|notice| match notice {
                ParserNotice::Begin { context, .. } => Some(context.clone()),
                ParserNotice::Uncaught { .. } => None,
            })
            .collect()
    }

    /// Returns the payloads from `Uncaught` notices, in order.
    #[must_use]
    pub fn uncaught(&self) -> Vec<Value> {
        self.notices
            .read()
            .iter()
            .filter_map(|notice| match notice {
                ParserNotice::Uncaught { data, .. } => Some(data.clone()),
                ParserNotice::Begin { .. } => None,
            })
            .collect()
    }

    /// Returns the number of collected notices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notices.read().len()
    }

    /// Returns true if no notices have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notices.read().is_empty()
    }
}

impl NoticeSink for CollectingNoticeSink {
    fn notify(&self, notice: &ParserNotice) {
        self.notices.write().push(notice.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ContextRef;
    use crate::record::BeginPayload;

    #[test]
    fn test_collecting_sink_partitions_notices() {
        let sink = CollectingNoticeSink::new();
        assert!(sink.is_empty());

        let context = Arc::new(ParsedContext::from_begin(
            "c1",
            100,
            &BeginPayload::default(),
            |id| ContextRef::Unresolved(id.to_string()),
        ));
        sink.notify(&ParserNotice::Begin {
            context: context.clone(),
            record: ScopeRecord::new("c1", 100),
        });
        sink.notify(&ParserNotice::Uncaught {
            data: serde_json::json!({"type": "progress"}),
            info: RecordInfo {
                context: ContextRef::Resolved(context),
                timestamp: 150,
            },
        });

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.begins().len(), 1);
        assert_eq!(sink.begins()[0].id(), "c1");
        assert_eq!(sink.uncaught(), vec![serde_json::json!({"type": "progress"})]);
    }

    #[test]
    fn test_logging_sink_warns_on_uncaught() {
        use std::sync::Mutex;

        #[derive(Clone, Default)]
        struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

        impl std::io::Write for CaptureWriter {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CaptureWriter {
            type Writer = Self;

            fn make_writer(&'a self) -> Self::Writer {
                self.clone()
            }
        }

        let writer = CaptureWriter::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            LoggingNoticeSink.notify(&ParserNotice::Uncaught {
                data: serde_json::json!({"type": "progress"}),
                info: RecordInfo {
                    context: ContextRef::Unresolved("c-warn".to_string()),
                    timestamp: 42,
                },
            });
        });

        let output = String::from_utf8(writer.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("record not consumed by any handler"));
        assert!(output.contains("c-warn"));
        assert!(output.contains("progress"));
    }

    #[test]
    fn test_closure_sink() {
        let seen = Arc::new(parking_lot::RwLock::new(0usize));
        let seen_in_sink = seen.clone();
        let sink = move |_notice: &ParserNotice| {
            *seen_in_sink.write() += 1;
        };

        sink.notify(&ParserNotice::Uncaught {
            data: Value::Null,
            info: RecordInfo {
                context: ContextRef::Unresolved("c1".to_string()),
                timestamp: 0,
            },
        });
        assert_eq!(*seen.read(), 1);
    }
}
