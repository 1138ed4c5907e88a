//! # Convoy
//!
//! The event-routing and context-reconstruction core of a remote-action
//! runner.
//!
//! A driver process invokes long-running actions that may execute
//! inside a worker process. The worker reports progress as a flat,
//! ordered stream of scope records; convoy rebuilds the implied tree of
//! nested execution scopes on the driver side and routes every record
//! through a pluggable, short-circuiting handler chain:
//!
//! - **Producer side**: [`context::ExecutionContext`] trees report
//!   typed events through [`context::Reporter`]s into a
//!   [`context::RecordSink`]
//! - **Wire contract**: [`record::ScopeRecord`], one JSON object per
//!   record with a context id, a timestamp and opaque event fields
//! - **Consumer side**: [`parser::EventParser`] registers contexts from
//!   `begin` records, resolves parent references opportunistically and
//!   walks each record through its handler chain
//!
//! ## Quick Start
//!
//! ```rust
//! use convoy::prelude::*;
//!
//! let mut parser = EventParser::new();
//! parser.use_handler(
//!     handler_fn(|data, info, _raw| {
//!         println!("{} @ {}: {data}", info.context, info.timestamp);
//!         Ok(None) // consumed
//!     }),
//!     false,
//! );
//!
//! convoy::transport::feed_str(
//!     &mut parser,
//!     r#"{"context":"c1","timestamp":100,"begin":{"scope":{"action":"land"}}}"#,
//! )?;
//! # Ok::<(), convoy::ConvoyError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod context;
pub mod errors;
pub mod parser;
pub mod record;
pub mod transport;
pub mod utils;

pub use errors::ConvoyError;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::{
        ChannelRecordSink, CollectingRecordSink, ContextConfig, ExecutionContext, NoOpRecordSink,
        RecordReporter, RecordSink, Reporter, ReporterFactory, StdoutRecordSink,
        TracingRecordSink,
    };
    pub use crate::errors::ConvoyError;
    pub use crate::parser::{
        handler_fn, CollectingNoticeSink, CombinedHandler, ContextRef, EventParser, Handler,
        HandlerChain, LoggingNoticeSink, NoticeSink, ParsedContext, ParserNotice, RecordInfo,
    };
    pub use crate::record::{BeginPayload, ScopeRecord};
    pub use crate::utils::{epoch_millis, generate_context_id};
}
