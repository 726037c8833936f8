//! Newline framing of the control stream.

use bytes::BytesMut;

const DELIMITER: u8 = b'\n';

/// Splits an inbound byte stream into `\n`-terminated lines.
///
/// Bytes after the last delimiter are kept until a later read completes the
/// line. The delimiter itself is not part of the returned line.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: BytesMut,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends bytes read from the connection.
    pub fn push(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Pops the next complete line, if any.
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|&b| b == DELIMITER)?;
        let mut line = self.buf.split_to(pos + 1);
        line.truncate(pos);
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Bytes held back waiting for a delimiter.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}
