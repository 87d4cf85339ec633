use anyhow::Result;
use std::collections::VecDeque;

/// Line buffer for SSE frames that arrive split across network chunks
pub struct SseLineBuffer {
    buffer: VecDeque<u8>,
}

impl SseLineBuffer {
    /// Create a new buffer with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    /// Add bytes to the buffer
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract next line (up to \n) from buffer, trimmed.
    /// Returns None if no complete line is available
    pub fn next_line(&mut self) -> Option<Result<String>> {
        // Find newline position
        let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;

        let line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();

        // Convert to UTF-8 string
        match std::str::from_utf8(&line_bytes) {
            Ok(line_str) => Some(Ok(line_str.trim().to_string())),
            Err(e) => Some(Err(anyhow::anyhow!("Invalid UTF-8: {}", e))),
        }
    }

    /// Current buffer size
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
