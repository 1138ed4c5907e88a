//! Handler chain for ordered, short-circuiting record dispatch.

use super::parsed::ContextRef;
use crate::record::ScopeRecord;
use serde_json::Value;
use std::sync::Arc;

/// Per-record information handed to every handler.
#[derive(Debug, Clone)]
pub struct RecordInfo {
    /// The record's context, resolved when registered.
    pub context: ContextRef,
    /// The record's producer-supplied timestamp.
    pub timestamp: i64,
}

/// Trait for record handlers.
///
/// A handler receives the payload by value together with the record
/// info and the raw record. Returning `Some(next)` passes `next` to the
/// following handler; returning `None` consumes the record and stops
/// the walk, fallback included. An error escapes dispatch untouched.
pub trait Handler: Send + Sync {
    /// Processes one record payload.
    ///
    /// # Errors
    ///
    /// Any failure the handler raises; it propagates out of dispatch.
    fn call(
        &self,
        data: Value,
        info: &RecordInfo,
        raw: &ScopeRecord,
    ) -> anyhow::Result<Option<Value>>;
}

impl<F> Handler for F
where
    F: Fn(Value, &RecordInfo, &ScopeRecord) -> anyhow::Result<Option<Value>> + Send + Sync,
{
    fn call(
        &self,
        data: Value,
        info: &RecordInfo,
        raw: &ScopeRecord,
    ) -> anyhow::Result<Option<Value>> {
        self(data, info, raw)
    }
}

/// Wraps a closure as an installable chain handler.
pub fn handler_fn<F>(f: F) -> Arc<dyn Handler>
where
    F: Fn(Value, &RecordInfo, &ScopeRecord) -> anyhow::Result<Option<Value>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// An ordered handler list with a pinned trailing segment.
///
/// Normal and final handlers live in two separate collections that are
/// concatenated at dispatch time; plain insertions land before the
/// final block, never after it. Handlers are only ever added.
#[derive(Default)]
pub struct HandlerChain {
    normal: Vec<Arc<dyn Handler>>,
    final_handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler to the normal segment.
    pub fn push(&mut self, handler: Arc<dyn Handler>) {
        self.normal.push(handler);
    }

    /// Prepends a handler, ahead of everything else.
    pub fn push_front(&mut self, handler: Arc<dyn Handler>) {
        self.normal.insert(0, handler);
    }

    /// Appends a handler to the pinned trailing segment.
    pub fn push_final(&mut self, handler: Arc<dyn Handler>) {
        self.final_handlers.push(handler);
    }

    /// Iterates handlers in effective dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Handler>> {
        self.normal.iter().chain(self.final_handlers.iter())
    }

    /// Returns the total number of handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.normal.len() + self.final_handlers.len()
    }

    /// Returns true when no handlers are installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normal.is_empty() && self.final_handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ScopeRecord;
    use std::sync::Mutex;

    fn tagging_handler(
        tag: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    ) -> Arc<dyn Handler> {
        handler_fn(move |data, _info, _raw| {
            log.lock().expect("lock").push(tag);
            Ok(Some(data))
        })
    }

    fn walk(chain: &HandlerChain) {
        let info = RecordInfo {
            context: ContextRef::Unresolved("c1".to_string()),
            timestamp: 0,
        };
        let raw = ScopeRecord::new("c1", 0);
        let mut data = Value::Object(serde_json::Map::new());
        for handler in chain.iter() {
            match handler.call(data, &info, &raw).expect("handler") {
                Some(next) => data = next,
                None => break,
            }
        }
    }

    #[test]
    fn test_plain_insert_lands_before_final_block() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = HandlerChain::new();

        chain.push_final(tagging_handler("a", log.clone()));
        chain.push(tagging_handler("b", log.clone()));
        chain.push_front(tagging_handler("c", log.clone()));

        walk(&chain);
        assert_eq!(*log.lock().expect("lock"), vec!["c", "b", "a"]);
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_final_handlers_keep_insertion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = HandlerChain::new();

        chain.push_final(tagging_handler("f1", log.clone()));
        chain.push_final(tagging_handler("f2", log.clone()));
        chain.push(tagging_handler("n1", log.clone()));
        chain.push(tagging_handler("n2", log.clone()));

        walk(&chain);
        assert_eq!(*log.lock().expect("lock"), vec!["n1", "n2", "f1", "f2"]);
    }

    #[test]
    fn test_empty_chain() {
        let chain = HandlerChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.iter().count(), 0);
    }
}
