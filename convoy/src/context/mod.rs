//! Producer-side context model.
//!
//! This module provides:
//! - Execution contexts forming a strict tree of nested work scopes
//! - Reporters that serialize typed events into scope records
//! - Record sinks carrying the outgoing record stream

mod execution;
mod reporter;
mod sink;

pub use execution::{ContextConfig, ExecutionContext};
pub use reporter::{default_reporter_factory, RecordReporter, Reporter, ReporterFactory};
pub use sink::{
    ChannelRecordSink, CollectingRecordSink, NoOpRecordSink, RecordSink, StdoutRecordSink,
    TracingRecordSink,
};
