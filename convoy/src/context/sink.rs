//! Record sink trait and implementations.
//!
//! A record sink is the outgoing end of the worker: every record a
//! context reports goes through one. The process boundary itself is a
//! collaborator; the sinks here cover the in-process wiring (channel),
//! the worker's real output channel (stdout NDJSON), logging, and tests.

use crate::record::ScopeRecord;
use async_trait::async_trait;
use std::io::Write;
use tracing::{debug, warn};

/// Trait for sinks that receive outgoing scope records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Emits a record asynchronously.
    async fn emit(&self, record: ScopeRecord);

    /// Emits a record without blocking.
    ///
    /// Must never panic; delivery failures are logged and suppressed.
    fn try_emit(&self, record: ScopeRecord);
}

/// A sink that discards all records.
///
/// The default when no sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpRecordSink;

#[async_trait]
impl RecordSink for NoOpRecordSink {
    async fn emit(&self, _record: ScopeRecord) {}

    fn try_emit(&self, _record: ScopeRecord) {}
}

/// A sink that logs every outgoing record through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRecordSink;

impl TracingRecordSink {
    fn log(record: &ScopeRecord) {
        debug!(
            context = %record.context,
            timestamp = record.timestamp,
            begin = record.begin.is_some(),
            fields = ?record.fields,
            "outgoing scope record"
        );
    }
}

#[async_trait]
impl RecordSink for TracingRecordSink {
    async fn emit(&self, record: ScopeRecord) {
        Self::log(&record);
    }

    fn try_emit(&self, record: ScopeRecord) {
        Self::log(&record);
    }
}

/// A sink that writes records to stdout as NDJSON lines.
///
/// This is the worker's actual output channel: one JSON object per
/// line, in emission order, for the driver to pipe into its parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutRecordSink;

impl StdoutRecordSink {
    fn write_line(record: &ScopeRecord) {
        match serde_json::to_string(record) {
            Ok(line) => {
                let stdout = std::io::stdout();
                let mut lock = stdout.lock();
                if let Err(err) = writeln!(lock, "{line}") {
                    warn!(error = %err, "failed to write scope record to stdout");
                }
            }
            Err(err) => warn!(error = %err, "failed to serialize scope record"),
        }
    }
}

#[async_trait]
impl RecordSink for StdoutRecordSink {
    async fn emit(&self, record: ScopeRecord) {
        Self::write_line(&record);
    }

    fn try_emit(&self, record: ScopeRecord) {
        Self::write_line(&record);
    }
}

/// A sink that forwards records into a tokio channel.
///
/// Used for in-process wiring: the receiving end is typically drained
/// straight into an event parser. Preserves emission order.
#[derive(Debug, Clone)]
pub struct ChannelRecordSink {
    sender: tokio::sync::mpsc::UnboundedSender<ScopeRecord>,
}

impl ChannelRecordSink {
    /// Creates a sink and the receiver that drains it.
    #[must_use]
    pub fn new() -> (
        Self,
        tokio::sync::mpsc::UnboundedReceiver<ScopeRecord>,
    ) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, record: ScopeRecord) {
        if self.sender.send(record).is_err() {
            warn!("record channel closed, dropping scope record");
        }
    }
}

#[async_trait]
impl RecordSink for ChannelRecordSink {
    async fn emit(&self, record: ScopeRecord) {
        self.send(record);
    }

    fn try_emit(&self, record: ScopeRecord) {
        self.send(record);
    }
}

/// A collecting sink for tests.
#[derive(Debug, Default)]
pub struct CollectingRecordSink {
    records: parking_lot::RwLock<Vec<ScopeRecord>>,
}

impl CollectingRecordSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected records.
    #[must_use]
    pub fn records(&self) -> Vec<ScopeRecord> {
        self.records.read().clone()
    }

    /// Returns the number of collected records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if no records have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Clears all collected records.
    pub fn clear(&self) {
        self.records.write().clear();
    }
}

#[async_trait]
impl RecordSink for CollectingRecordSink {
    async fn emit(&self, record: ScopeRecord) {
        self.records.write().push(record);
    }

    fn try_emit(&self, record: ScopeRecord) {
        self.records.write().push(record);
    }
}
