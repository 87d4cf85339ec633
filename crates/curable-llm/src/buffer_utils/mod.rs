mod line_buffer;
mod sse_parser;

pub use line_buffer::SseLineBuffer;
pub use sse_parser::{SseLineParser, parse_sse_stream};
