//! Server-Sent Events (SSE) parsing for Chat Completions streams.
//!
//! The OpenAI API streams responses as `data:` lines carrying one JSON
//! chunk each, terminated by a literal `data: [DONE]` sentinel. There is
//! no `event:` field; comment and blank lines are ignored.

use futures_util::StreamExt;
use tokio::io::AsyncBufReadExt;
use tokio_util::io::StreamReader;

/// Parse an SSE stream from a reqwest response, calling `on_data` for each
/// JSON data payload. Stops at the `[DONE]` sentinel.
pub async fn parse_sse_stream(
    response: reqwest::Response,
    mut on_data: impl FnMut(&str),
) -> Result<(), crate::AiError> {
    let byte_stream = response
        .bytes_stream()
        .map(|result| result.map_err(std::io::Error::other));
    let reader = tokio::io::BufReader::new(StreamReader::new(byte_stream));
    let mut lines = reader.lines();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| crate::AiError::NetworkError(e.to_string()))?
    {
        let Some(data) = line.strip_prefix("data: ") else {
            continue;
        };
        if data == "[DONE]" {
            break;
        }
        on_data(data);
    }

    Ok(())
}
