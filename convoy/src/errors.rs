//! Error types for the convoy core.
//!
//! The taxonomy is deliberately small. An unresolved parent reference is
//! not an error at all (lookup falls back to the raw id), and malformed
//! records are rejected at the transport boundary before they reach the
//! parser, so the core itself only fails on an unconsumed record in
//! strict mode or on a handler-supplied failure.

use thiserror::Error;

/// The main error type for convoy operations.
#[derive(Debug, Error)]
pub enum ConvoyError {
    /// No handler in the chain consumed the record and strict mode is on.
    ///
    /// Carries the payload as it reached the fallback, i.e. after every
    /// handler's transformation.
    #[error("unhandled record in event parser: {payload}")]
    UnconsumedRecord {
        /// The fully-transformed payload that reached the fallback.
        payload: serde_json::Value,
    },

    /// A handler raised while processing a record.
    ///
    /// Handler failures escape `receive` synchronously; there is no
    /// internal recovery. Callers isolate failures per record if needed.
    #[error("record handler failed: {0}")]
    Handler(#[source] anyhow::Error),

    /// A line on the wire did not decode into a scope record.
    ///
    /// Raised by the transport layer; records missing `context` or
    /// `timestamp` are unrepresentable past this point.
    #[error("malformed scope record: {0}")]
    MalformedRecord(#[source] serde_json::Error),

    /// An IO error while reading the record stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconsumed_record_message_includes_payload() {
        let err = ConvoyError::UnconsumedRecord {
            payload: serde_json::json!({"type": "progress", "percent": 50}),
        };
        let message = err.to_string();
        assert!(message.starts_with("unhandled record in event parser:"));
        assert!(message.contains("progress"));
    }

    #[test]
    fn test_handler_error_wraps_source() {
        let err = ConvoyError::Handler(anyhow::anyhow!("boom"));
        assert!(err.to_string().contains("boom"));
    }
}
