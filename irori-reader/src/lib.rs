//! Asynchronous IRC line reading.
//!
//! Incoming bytes are accumulated in a [`LineBuffer`] and split on message
//! terminators: CR-LF, or a bare LF for clients that do not send the CR.  A
//! CR immediately before the LF belongs to the terminator; any other byte is
//! part of the line.  [`IrcReader`] drives a `LineBuffer` from any
//! `AsyncRead`.

use memchr::memchr;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

const READ_BUFFER_LENGTH: usize = 4096;

/// Accumulates raw bytes and splits off complete lines.
///
/// There is no bound on the accumulated length; the transport is trusted to
/// disconnect peers that misbehave.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> LineBuffer {
        LineBuffer::default()
    }

    /// Appends raw bytes to the accumulator.
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Removes and returns the first complete line, without its terminator.
    ///
    /// Returns `None` when no terminator is buffered; the partial input is
    /// kept for the next `append`.  Lines are decoded lossily, so a line is
    /// always valid UTF-8.
    pub fn next_line(&mut self) -> Option<String> {
        let end = memchr(b'\n', &self.buf)?;
        let mut line_end = end;
        if line_end > 0 && self.buf[line_end - 1] == b'\r' {
            line_end -= 1;
        }
        let line = String::from_utf8_lossy(&self.buf[..line_end]).into_owned();
        self.buf.drain(..=end);
        Some(line)
    }

    /// Iterator that drains every complete line.
    pub fn lines(&mut self) -> Lines<'_> {
        Lines { inner: self }
    }

    /// Whether the accumulator holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Draining iterator over the complete lines of a [`LineBuffer`].
pub struct Lines<'a> {
    inner: &'a mut LineBuffer,
}

impl Iterator for Lines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.inner.next_line()
    }
}

/// Reads framed IRC lines from an `AsyncRead`.
pub struct IrcReader<R> {
    inner: R,
    buf: LineBuffer,
    read_buf: [u8; READ_BUFFER_LENGTH],
}

impl<R> IrcReader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(inner: R) -> IrcReader<R> {
        IrcReader {
            inner,
            buf: LineBuffer::new(),
            read_buf: [0; READ_BUFFER_LENGTH],
        }
    }

    /// Returns the next framed line, or `None` at end of stream.
    ///
    /// Unterminated bytes pending when the stream ends are discarded.  The
    /// future is cancel-safe: a dropped call loses no input.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(line) = self.buf.next_line() {
                return Ok(Some(line));
            }
            let n = self.inner.read(&mut self.read_buf).await?;
            if n == 0 {
                return Ok(None);
            }
            self.buf.append(&self.read_buf[..n]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(buf: &mut LineBuffer) -> Vec<String> {
        buf.lines().collect()
    }

    #[test]
    fn test_splits_crlf_lines() {
        let mut buf = LineBuffer::new();
        buf.append(b"NICK alice\r\nUSER a 0 * :A\r\n");
        assert_eq!(drain(&mut buf), ["NICK alice", "USER a 0 * :A"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_splits_bare_lf_lines() {
        let mut buf = LineBuffer::new();
        buf.append(b"PASS pw\nNICK alice\n");
        assert_eq!(drain(&mut buf), ["PASS pw", "NICK alice"]);
    }

    #[test]
    fn test_keeps_partial_input() {
        let mut buf = LineBuffer::new();
        buf.append(b"NICK al");
        assert_eq!(buf.next_line(), None);
        buf.append(b"ice\r\nUS");
        assert_eq!(buf.next_line().as_deref(), Some("NICK alice"));
        assert_eq!(buf.next_line(), None);
        buf.append(b"ER a 0 * :A\n");
        assert_eq!(buf.next_line().as_deref(), Some("USER a 0 * :A"));
    }

    #[test]
    fn test_folds_cr_before_lf_across_appends() {
        let mut buf = LineBuffer::new();
        buf.append(b"QUIT\r");
        assert_eq!(buf.next_line(), None);
        buf.append(b"\n");
        assert_eq!(buf.next_line().as_deref(), Some("QUIT"));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_interior_cr_is_kept() {
        let mut buf = LineBuffer::new();
        buf.append(b"a\rb\n");
        assert_eq!(drain(&mut buf), ["a\rb"]);
    }

    #[test]
    fn test_emits_empty_lines() {
        let mut buf = LineBuffer::new();
        buf.append(b"\r\n\nPING\r\n");
        assert_eq!(drain(&mut buf), ["", "", "PING"]);
    }

    #[test]
    fn test_framing_does_not_depend_on_chunking() {
        let bytes = b"PASS pw\r\nNICK alice\nUSER a 0 * :A\r\n";
        let mut whole = LineBuffer::new();
        whole.append(bytes);
        let expected = drain(&mut whole);
        for split in 0..bytes.len() {
            let mut buf = LineBuffer::new();
            let mut lines = Vec::new();
            buf.append(&bytes[..split]);
            lines.extend(buf.lines());
            buf.append(&bytes[split..]);
            lines.extend(buf.lines());
            assert_eq!(lines, expected, "split at {}", split);
        }
    }

    #[tokio::test]
    async fn test_reads_lines_from_async_source() {
        let data: &[u8] = b"PASS pw\r\nNICK alice\nUSER a 0 * :A\r\n";
        let mut reader = IrcReader::new(data);
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("PASS pw"));
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("NICK alice"));
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("USER a 0 * :A"));
        assert_eq!(reader.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_end_of_stream_discards_partial_line() {
        let data: &[u8] = b"PING token\r\nPART";
        let mut reader = IrcReader::new(data);
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("PING token"));
        assert_eq!(reader.read_line().await.unwrap(), None);
    }
}
