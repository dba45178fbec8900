//! Streaming transport: turns an [`ExecutionEvent`] stream into newline
//! delimited JSON frames (spec §4.9), the same wire shape as the source's
//! `json.dumps(...) + "\n"` generator responses.

use futures::Stream;
use futures::StreamExt;

use crate::domain::models::ExecutionEvent;

/// Serialize one event to a single NDJSON line (including the trailing
/// newline). Malformed events can't occur since `ExecutionEvent` always
/// serializes; this never fails in practice but returns `Result` to keep
/// the call site honest about the serialization boundary.
pub fn encode_frame(event: &ExecutionEvent) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(event)?;
    line.push('\n');
    Ok(line)
}

/// Adapt a stream of events into a stream of NDJSON frames, dropping any
/// event that somehow fails to serialize rather than aborting the stream.
pub fn frame_stream(
    events: impl Stream<Item = ExecutionEvent> + Send + 'static,
) -> impl Stream<Item = String> + Send + 'static {
    events.filter_map(|event| async move { encode_frame(&event).ok() })
}
