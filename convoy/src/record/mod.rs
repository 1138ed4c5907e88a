//! The scope record wire contract.
//!
//! A scope record is the flat unit the worker writes and the driver
//! reads: a context id, a producer-supplied timestamp, an optional
//! `begin` payload that introduces a new context, and arbitrary
//! event-specific fields the core treats as opaque keyed data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload carried by the record that introduces a new context.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BeginPayload {
    /// Id of the enclosing context, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Local scope data of the new context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Map<String, Value>>,

    /// Additional begin fields, preserved as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BeginPayload {
    /// Creates a begin payload with the given scope and no parent.
    #[must_use]
    pub fn with_scope(scope: Map<String, Value>) -> Self {
        Self {
            parent: None,
            scope: Some(scope),
            extra: Map::new(),
        }
    }

    /// Creates a begin payload referencing a parent context.
    #[must_use]
    pub fn with_parent(parent: impl Into<String>) -> Self {
        Self {
            parent: Some(parent.into()),
            scope: None,
            extra: Map::new(),
        }
    }

    /// Sets the scope.
    #[must_use]
    pub fn scope(mut self, scope: Map<String, Value>) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Returns the payload as the JSON object it serializes to.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = self.extra.clone();
        if let Some(ref parent) = self.parent {
            map.insert("parent".to_string(), Value::String(parent.clone()));
        }
        if let Some(ref scope) = self.scope {
            map.insert("scope".to_string(), Value::Object(scope.clone()));
        }
        Value::Object(map)
    }
}

/// One record on the wire between worker and driver.
///
/// `context` and `timestamp` are always present; deserialization fails
/// without them. Everything else is the event's own payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScopeRecord {
    /// Id of the context this record belongs to.
    pub context: String,

    /// Producer-supplied time, epoch milliseconds.
    pub timestamp: i64,

    /// Present only on the record that introduces a new context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin: Option<BeginPayload>,

    /// Arbitrary event-specific fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ScopeRecord {
    /// Creates a record with no event fields.
    #[must_use]
    pub fn new(context: impl Into<String>, timestamp: i64) -> Self {
        Self {
            context: context.into(),
            timestamp,
            begin: None,
            fields: Map::new(),
        }
    }

    /// Creates the record that introduces a new context.
    #[must_use]
    pub fn begin(context: impl Into<String>, timestamp: i64, begin: BeginPayload) -> Self {
        Self {
            context: context.into(),
            timestamp,
            begin: Some(begin),
            fields: Map::new(),
        }
    }

    /// Adds an event field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Returns the initial handler-chain payload for this record.
    ///
    /// Strips exactly `context` and `timestamp`; everything else,
    /// including `begin` when present, stays in the payload. The result
    /// is an owned value, so the chain moves it from handler to handler
    /// and no handler can mutate another's view.
    #[must_use]
    pub fn initial_data(&self) -> Value {
        let mut map = self.fields.clone();
        if let Some(ref begin) = self.begin {
            map.insert("begin".to_string(), begin.to_value());
        }
        Value::Object(map)
    }
}
