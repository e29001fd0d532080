//! In-memory, line-oriented text channels.
//!
//! A [`Channel`] is the unit of data flow between steps: simultaneously
//! writable (append-only) and readable (line by line, tracking an internal
//! read offset). Whole-buffer accessors never disturb the read offset, so
//! a channel can be inspected after a run without breaking later rewinds.

use crate::error::PipeError;

/// An in-memory text buffer with an independent read offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Channel {
    buf: String,
    pos: usize,
}

impl Channel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a channel pre-filled with the given contents.
    ///
    /// The read offset starts at the beginning.
    pub fn from_string(contents: impl Into<String>) -> Self {
        Self {
            buf: contents.into(),
            pos: 0,
        }
    }

    /// Append text to the channel.
    pub fn write_str(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    /// Append one line to the channel, adding the trailing newline.
    pub fn write_line(&mut self, line: &str) {
        self.buf.push_str(line);
        self.buf.push('\n');
    }

    /// The full contents of the channel, regardless of the read offset.
    pub fn string(&self) -> &str {
        &self.buf
    }

    /// The full contents with leading and trailing whitespace removed.
    pub fn trimmed_string(&self) -> &str {
        self.buf.trim()
    }

    /// The full contents as raw bytes.
    pub fn bytes(&self) -> &[u8] {
        self.buf.as_bytes()
    }

    /// The full contents split into lines.
    ///
    /// Lines are split on `\n`; a single trailing empty segment (from a
    /// final newline) is dropped, so `"a\nb\n"` yields `["a", "b"]`.
    pub fn strings(&self) -> Vec<String> {
        if self.buf.is_empty() {
            return Vec::new();
        }
        let mut lines: Vec<String> = self.buf.split('\n').map(str::to_string).collect();
        if lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        lines
    }

    /// Parse the (trimmed) contents as a base-10 integer.
    pub fn parse_int(&self) -> Result<i64, PipeError> {
        let text = self.buf.trim();
        text.parse::<i64>()
            .map_err(|_| PipeError::NotANumber(text.to_string()))
    }

    /// Read the next unconsumed line, advancing the read offset.
    ///
    /// The trailing newline is not included. Returns `None` once the
    /// whole buffer has been consumed.
    pub fn read_line(&mut self) -> Option<String> {
        if self.pos >= self.buf.len() {
            return None;
        }
        match self.buf[self.pos..].find('\n') {
            Some(offset) => {
                let line = self.buf[self.pos..self.pos + offset].to_string();
                self.pos += offset + 1;
                Some(line)
            }
            None => {
                let line = self.buf[self.pos..].to_string();
                self.pos = self.buf.len();
                Some(line)
            }
        }
    }

    /// Consume and return all remaining lines.
    pub fn take_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = self.read_line() {
            lines.push(line);
        }
        lines
    }

    /// Consume and return the remaining raw text.
    pub fn take_remaining(&mut self) -> String {
        let rest = self.buf[self.pos..].to_string();
        self.pos = self.buf.len();
        rest
    }

    /// Copy all remaining lines into another channel, line by line.
    ///
    /// Only this channel's read offset moves; the destination's offset is
    /// untouched, so it can still be rewound and re-read later.
    pub fn drain_to(&mut self, other: &mut Channel) {
        while let Some(line) = self.read_line() {
            other.write_line(&line);
        }
    }

    /// Reset the read offset back to the start of the buffer.
    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    /// Number of bytes held in the channel.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if the channel holds no text at all.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl From<&str> for Channel {
    fn from(contents: &str) -> Self {
        Channel::from_string(contents)
    }
}
