//! Driver-side transport glue.
//!
//! The worker writes one JSON record per line; the functions here
//! decode those lines and push them through a parser in arrival order.
//! Validation happens at this boundary: a line that does not decode
//! into a scope record is reported as malformed before the core ever
//! sees it. Process spawning and supervision live elsewhere.

use crate::errors::ConvoyError;
use crate::parser::EventParser;
use crate::record::ScopeRecord;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Decodes one NDJSON line and feeds it to the parser.
///
/// # Errors
///
/// [`ConvoyError::MalformedRecord`] when the line does not decode,
/// plus whatever `receive` itself reports.
pub fn feed_line(parser: &mut EventParser, line: &str) -> Result<(), ConvoyError> {
    let record: ScopeRecord =
        serde_json::from_str(line).map_err(ConvoyError::MalformedRecord)?;
    parser.receive(&record)
}

/// Feeds every non-blank line of `input` to the parser.
///
/// Returns the number of records processed. Stops at the first
/// failure.
///
/// # Errors
///
/// Same as [`feed_line`].
pub fn feed_str(parser: &mut EventParser, input: &str) -> Result<usize, ConvoyError> {
    let mut count = 0;
    for line in input.lines() {
        if line.trim().is_empty() {
            continue;
        }
        feed_line(parser, line)?;
        count += 1;
    }
    Ok(count)
}

/// Reads NDJSON lines from an async reader and feeds them to the
/// parser until end of stream.
///
/// This is the driver's end of the worker's output channel. Returns
/// the number of records processed.
///
/// # Errors
///
/// IO failures from the reader, plus the same failures as
/// [`feed_line`].
pub async fn feed_lines<R>(reader: R, parser: &mut EventParser) -> Result<usize, ConvoyError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut count = 0;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        feed_line(parser, &line)?;
        count += 1;
    }
    Ok(count)
}

/// Drains a record channel into the parser until all senders close.
///
/// The in-process wiring: pair with a
/// [`ChannelRecordSink`](crate::context::ChannelRecordSink) on the
/// producer side. Returns the number of records processed.
///
/// # Errors
///
/// Whatever `receive` reports for a drained record.
pub async fn pump(
    mut receiver: tokio::sync::mpsc::UnboundedReceiver<ScopeRecord>,
    parser: &mut EventParser,
) -> Result<usize, ConvoyError> {
    let mut count = 0;
    while let Some(record) = receiver.recv().await {
        parser.receive(&record)?;
        count += 1;
    }
    Ok(count)
}
