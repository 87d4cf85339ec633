use anyhow::Result;
use futures::{Stream, StreamExt};
use reqwest::Response;
use std::fmt::Display;

use super::line_buffer::SseLineBuffer;
use crate::streaming::StreamEvent;
use crate::traits::RunEventStream;

/// Strategy pattern for parsing different SSE response types
pub trait SseLineParser: Send {
    /// Parse a data line into stream events
    fn parse_data_line(&self, data: &str) -> Result<Vec<StreamEvent>>;

    /// Check if this line signals end of stream
    fn is_done_marker(&self, data: &str) -> bool {
        data == "[DONE]"
    }
}

/// Generic SSE stream parser using circular buffer
pub fn parse_sse_stream<P: SseLineParser + 'static>(
    response: Response,
    parser: P,
) -> RunEventStream {
    parse_sse_bytes(response.bytes_stream(), parser)
}

/// Parse any byte stream carrying SSE frames.
/// Only `data:` lines are interpreted; `event:` and comment lines are skipped.
pub fn parse_sse_bytes<S, B, E, P>(stream: S, parser: P) -> RunEventStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
    P: SseLineParser + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut buffer = SseLineBuffer::with_capacity(4096);

        'outer: while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes.as_ref());

                    // Process all complete lines in buffer
                    while let Some(line_result) = buffer.next_line() {
                        match line_result {
                            Ok(line) => {
                                let Some(data) = line.strip_prefix("data:") else {
                                    continue;
                                };
                                let data = data.trim_start();

                                if parser.is_done_marker(data) {
                                    yield Ok(StreamEvent::Done { finish_reason: None });
                                    break 'outer;
                                }

                                match parser.parse_data_line(data) {
                                    Ok(events) => {
                                        for event in events {
                                            yield Ok(event);
                                        }
                                    }
                                    Err(e) => yield Err(e),
                                }
                            }
                            Err(e) => yield Err(e),
                        }
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::RunStreamParser;
    use futures::stream;

    fn frames(chunks: Vec<&'static str>) -> impl Stream<Item = std::result::Result<&'static [u8], String>> + Send {
        stream::iter(chunks.into_iter().map(|c| Ok(c.as_bytes())))
    }

    #[tokio::test]
    async fn test_frames_split_across_chunks() {
        let body = frames(vec![
            "event: thread.message.delta\ndata: {\"object\":\"thread.message.delta\",\"delta\":{\"content\":[{\"type\":\"text\",\"text\":{\"value\":\"Hel",
            "lo\"}}]}}\n\nevent: done\ndata: [DONE]\n\n",
        ]);

        let events: Vec<_> = parse_sse_bytes(body, RunStreamParser).collect().await;
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0].as_ref().unwrap(),
            &StreamEvent::Message { content: "Hello".to_string() }
        );
        assert_eq!(events[1].as_ref().unwrap(), &StreamEvent::Done { finish_reason: None });
    }

    #[tokio::test]
    async fn test_nothing_after_done_marker() {
        let body = frames(vec![
            "data: [DONE]\n\ndata: {\"object\":\"thread.message.delta\",\"delta\":{\"content\":[{\"text\":{\"value\":\"late\"}}]}}\n\n",
        ]);

        let events: Vec<_> = parse_sse_bytes(body, RunStreamParser).collect().await;
        assert_eq!(events.len(), 1);
    }
}
