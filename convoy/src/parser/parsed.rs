//! Driver-side reconstruction of worker execution contexts.

use crate::record::BeginPayload;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Result of a registry lookup.
///
/// A context id either resolves to a registered [`ParsedContext`] or
/// stays an opaque id. The variants are explicit so callers cannot
/// mistake a raw id for a context.
#[derive(Debug, Clone)]
pub enum ContextRef {
    /// The id was registered when looked up.
    Resolved(Arc<ParsedContext>),
    /// The id was unknown when looked up; carries the raw id.
    Unresolved(String),
}

impl ContextRef {
    /// Returns the context id, resolved or not.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Resolved(context) => context.id(),
            Self::Unresolved(id) => id,
        }
    }

    /// Returns the parsed context when resolved.
    #[must_use]
    pub fn resolved(&self) -> Option<&Arc<ParsedContext>> {
        match self {
            Self::Resolved(context) => Some(context),
            Self::Unresolved(_) => None,
        }
    }

    /// Returns true when the id resolved to a registered context.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

impl fmt::Display for ContextRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One worker context as reconstructed from the record stream.
///
/// Built exactly once, from the record whose `begin` field introduces
/// the id; its attributes never change afterwards. In particular the
/// parent reference is resolved once at creation and never fixed up,
/// even if the true parent registers later.
#[derive(Debug, Clone)]
pub struct ParsedContext {
    id: String,
    timestamp: i64,
    parent: Option<ContextRef>,
    scope: Map<String, Value>,
    extra: Map<String, Value>,
}

impl ParsedContext {
    /// Builds a parsed context from a begin payload.
    ///
    /// `resolve` is the registry lookup at registration time; a parent
    /// id unknown at that moment stays [`ContextRef::Unresolved`].
    #[must_use]
    pub fn from_begin(
        id: impl Into<String>,
        timestamp: i64,
        begin: &BeginPayload,
        resolve: impl FnOnce(&str) -> ContextRef,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp,
            parent: begin.parent.as_deref().map(resolve),
            scope: begin.scope.clone().unwrap_or_default(),
            extra: begin.extra.clone(),
        }
    }

    /// Returns the context id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the creation time carried by the begin record.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Returns the parent reference as resolved at registration time.
    #[must_use]
    pub fn parent(&self) -> Option<&ContextRef> {
        self.parent.as_ref()
    }

    /// Returns the scope carried by the begin record.
    #[must_use]
    pub fn scope(&self) -> &Map<String, Value> {
        &self.scope
    }

    /// Returns any additional begin fields, preserved as-is.
    #[must_use]
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}
