//! Producer-side execution contexts.
//!
//! An execution context represents one nested scope of work inside the
//! worker. Contexts form a strict tree: each child holds a strong
//! reference to its parent, keeps its own local scope, and inherits the
//! parent's configuration (record sink, reporter factory, options).

use super::reporter::{default_reporter_factory, Reporter, ReporterFactory};
use super::sink::{NoOpRecordSink, RecordSink};
use crate::record::{BeginPayload, ScopeRecord};
use crate::utils::{epoch_millis, generate_context_id};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Configuration shared by a context and all its sub-contexts.
#[derive(Clone)]
pub struct ContextConfig {
    /// Where outgoing records go.
    sink: Arc<dyn RecordSink>,
    /// Builds the reporter for each context in the tree.
    reporter_factory: ReporterFactory,
    /// Free-form options carried to sub-contexts.
    options: Map<String, Value>,
}

impl ContextConfig {
    /// Creates a configuration that discards records.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sink: Arc::new(NoOpRecordSink),
            reporter_factory: default_reporter_factory(),
            options: Map::new(),
        }
    }

    /// Sets the record sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Sets the reporter factory.
    #[must_use]
    pub fn with_reporter_factory(mut self, factory: ReporterFactory) -> Self {
        self.reporter_factory = factory;
        self
    }

    /// Sets a free-form option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Returns an option value.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// One nested scope of work on the producer side.
pub struct ExecutionContext {
    /// Unique id, assigned at creation.
    id: String,
    /// Local scope data, fixed at construction.
    scope: Map<String, Value>,
    /// The enclosing context, or none for a root.
    parent: Option<Arc<ExecutionContext>>,
    /// Monotonic creation instant, for uptime.
    created_at: Instant,
    /// Wall-clock creation time, epoch milliseconds.
    timestamp: i64,
    /// Shared configuration.
    config: ContextConfig,
}

impl ExecutionContext {
    /// Creates a root context with default configuration and empty scope.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::root(ContextConfig::new(), Map::new())
    }

    /// Creates a root context with the given configuration and scope.
    #[must_use]
    pub fn root(config: ContextConfig, scope: Map<String, Value>) -> Arc<Self> {
        Arc::new(Self {
            id: generate_context_id(),
            scope,
            parent: None,
            created_at: Instant::now(),
            timestamp: epoch_millis(),
            config,
        })
    }

    /// Creates a child context with exactly the given scope.
    ///
    /// The child inherits the caller's configuration and links back to
    /// it as parent. Neither the argument nor the caller's scope is
    /// touched; the local scopes stay disjoint.
    #[must_use]
    pub fn create_sub_context(self: &Arc<Self>, scope: Map<String, Value>) -> Arc<Self> {
        Arc::new(Self {
            id: generate_context_id(),
            scope,
            parent: Some(self.clone()),
            created_at: Instant::now(),
            timestamp: epoch_millis(),
            config: self.config.clone(),
        })
    }

    /// Runs `f` inside a sub-context carrying the given scope.
    pub fn with_scope<R>(
        self: &Arc<Self>,
        scope: Map<String, Value>,
        f: impl FnOnce(&Arc<ExecutionContext>) -> R,
    ) -> R {
        let sub = self.create_sub_context(scope);
        f(&sub)
    }

    /// Returns this context's id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns this context's local scope.
    #[must_use]
    pub fn scope(&self) -> &Map<String, Value> {
        &self.scope
    }

    /// Returns the enclosing context, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<ExecutionContext>> {
        self.parent.as_ref()
    }

    /// Returns this context's wall-clock creation time, epoch ms.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Returns the shared configuration.
    #[must_use]
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Returns the record sink.
    #[must_use]
    pub fn sink(&self) -> Arc<dyn RecordSink> {
        self.config.sink.clone()
    }

    /// Returns the elapsed time since this context was constructed.
    ///
    /// Backed by a monotonic clock, so successive calls never decrease.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Looks up a scope key, walking the parent chain.
    ///
    /// The child's effective scope is the chain walk; local scopes are
    /// never merged or copied.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.scope.get(key) {
            return Some(value);
        }
        self.parent.as_deref().and_then(|parent| parent.lookup(key))
    }

    /// Materializes the effective scope, nearest context winning.
    #[must_use]
    pub fn effective_scope(&self) -> Map<String, Value> {
        let mut merged = self
            .parent
            .as_deref()
            .map(ExecutionContext::effective_scope)
            .unwrap_or_default();
        for (key, value) in &self.scope {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Builds a reporter for this context via the configured factory.
    #[must_use]
    pub fn make_reporter(&self) -> Box<dyn Reporter> {
        (self.config.reporter_factory)(self)
    }

    /// Reports one typed event through a freshly made reporter.
    pub fn report(&self, kind: &str, data: Map<String, Value>) {
        self.make_reporter().report(kind, data);
    }

    /// Emits the record that introduces this context on the wire.
    ///
    /// Carries the parent id (when nested) and the local scope, stamped
    /// with this context's creation time.
    pub fn report_begin(&self) {
        let begin = BeginPayload {
            parent: self.parent.as_deref().map(|p| p.id.clone()),
            scope: Some(self.scope.clone()),
            extra: Map::new(),
        };
        let record = ScopeRecord::begin(self.id.clone(), self.timestamp, begin);
        self.config.sink.try_emit(record);
    }
}
