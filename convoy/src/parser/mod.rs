//! Driver-side record demultiplexing.
//!
//! This module provides:
//! - The parsed-context registry rebuilt from the record stream
//! - The event parser that routes every record through a handler chain
//! - Combined handlers dispatching on a discriminant field
//! - Parser notices for context registration and unconsumed records

mod chain;
mod combine;
mod notice;
mod parsed;

pub use chain::{handler_fn, Handler, HandlerChain, RecordInfo};
pub use combine::{CombinedHandler, DEFAULT_DISCRIMINANT};
pub use notice::{CollectingNoticeSink, LoggingNoticeSink, NoticeSink, ParserNotice};
pub use parsed::{ContextRef, ParsedContext};

use crate::errors::ConvoyError;
use crate::record::ScopeRecord;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Demultiplexes the flat record stream back into a context tree.
///
/// The parser keeps an append-only id-to-context registry, resolves
/// parent references opportunistically at registration time, and walks
/// every record through the handler chain. Records are processed to
/// completion one at a time; feeding happens from one sequential
/// source.
#[derive(Default)]
pub struct EventParser {
    contexts: HashMap<String, Arc<ParsedContext>>,
    chain: HandlerChain,
    sinks: Vec<Arc<dyn NoticeSink>>,
    strict: bool,
}

impl EventParser {
    /// Creates a parser with an empty registry and chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one incoming record.
    ///
    /// A record carrying `begin` registers its context first; every
    /// record, begin or not, is then dispatched through the chain.
    ///
    /// # Errors
    ///
    /// [`ConvoyError::Handler`] when a handler raises, and
    /// [`ConvoyError::UnconsumedRecord`] when strict mode is on and no
    /// handler consumed the record.
    pub fn receive(&mut self, record: &ScopeRecord) -> Result<(), ConvoyError> {
        if record.begin.is_some() {
            self.begin(record);
        }
        self.dispatch(record)
    }

    /// Registers the context introduced by a begin record.
    fn begin(&mut self, record: &ScopeRecord) {
        let Some(ref payload) = record.begin else {
            return;
        };

        let context = Arc::new(ParsedContext::from_begin(
            record.context.clone(),
            record.timestamp,
            payload,
            |parent_id| self.context(parent_id),
        ));

        if self
            .contexts
            .insert(record.context.clone(), context.clone())
            .is_some()
        {
            warn!(context = %record.context, "duplicate begin record, context replaced");
        }

        self.notify(&ParserNotice::Begin {
            context,
            record: record.clone(),
        });
    }

    /// Walks the record through the handler chain.
    fn dispatch(&self, record: &ScopeRecord) -> Result<(), ConvoyError> {
        let info = RecordInfo {
            context: self.context(&record.context),
            timestamp: record.timestamp,
        };
        let mut data = record.initial_data();

        for handler in self.chain.iter() {
            match handler.call(data, &info, record).map_err(ConvoyError::Handler)? {
                Some(next) => data = next,
                // Consumed: stop the walk, fallback included.
                None => return Ok(()),
            }
        }

        // Synthetic fallback: nothing consumed the record.
        self.notify(&ParserNotice::Uncaught {
            data: data.clone(),
            info,
        });
        if self.strict {
            return Err(ConvoyError::UnconsumedRecord { payload: data });
        }
        Ok(())
    }

    /// Installs a handler.
    ///
    /// Lands just before the pinned trailing block, or at the very
    /// front when `front` is set.
    pub fn use_handler(&mut self, handler: Arc<dyn Handler>, front: bool) {
        if front {
            self.chain.push_front(handler);
        } else {
            self.chain.push(handler);
        }
    }

    /// Installs a handler in the pinned trailing block.
    ///
    /// Future plain insertions stay ahead of it.
    pub fn use_final(&mut self, handler: Arc<dyn Handler>) {
        self.chain.push_final(handler);
    }

    /// Installs one handler combined from named sub-handlers.
    ///
    /// The combined handler dispatches on the payload's `type` field;
    /// unmatched payloads pass through unconsumed.
    pub fn use_combine(
        &mut self,
        handlers: impl IntoIterator<Item = (String, Arc<dyn Handler>)>,
        front: bool,
    ) {
        self.use_handler(Arc::new(CombinedHandler::new(handlers)), front);
    }

    /// Toggles strict mode.
    ///
    /// When on, a record no handler consumed makes `receive` fail with
    /// the payload that reached the fallback. Toggling is idempotent.
    pub fn set_strict(&mut self, on: bool) {
        self.strict = on;
    }

    /// Registers a notice sink.
    pub fn subscribe(&mut self, sink: Arc<dyn NoticeSink>) {
        self.sinks.push(sink);
    }

    /// Looks up the context registered for `id`.
    ///
    /// Total: an unknown id comes back as [`ContextRef::Unresolved`].
    #[must_use]
    pub fn context(&self, id: &str) -> ContextRef {
        match self.contexts.get(id) {
            Some(context) => ContextRef::Resolved(context.clone()),
            None => ContextRef::Unresolved(id.to_string()),
        }
    }

    /// Returns the number of registered contexts.
    ///
    /// The registry is append-only and never evicts; long-lived
    /// sessions with many contexts grow without bound.
    #[must_use]
    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    /// Returns the number of installed handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.chain.len()
    }

    fn notify(&self, notice: &ParserNotice) {
        for sink in &self.sinks {
            sink.notify(notice);
        }
    }
}
