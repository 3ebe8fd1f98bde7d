//! OutputBuffer, what every command writes into and every pipe carries.
//!
//! A buffer is an ordered list of tagged chunks plus an exit code. Order is
//! kept across streams, so the rendered reply interleaves stdout and stderr
//! exactly as the command wrote them:
//!
//! ```
//! use shbot_kernel::interpreter::OutputBuffer;
//!
//! let mut out = OutputBuffer::new();
//! out.write_stdout("a").write_stderr("b").write_stdout(1).set_exit_code(2);
//! assert_eq!(out.to_bytes(), b"ab1");
//! assert_eq!(out.stdout_bytes(), b"a1");
//! assert_eq!(out.exit_code(), 2);
//! ```

use std::fmt;

/// Which stream a chunk was written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// One write to a buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Chunk {
    pub stream: Stream,
    pub data: Vec<u8>,
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.stream {
            Stream::Stdout => "out",
            Stream::Stderr => "err",
        };
        write!(f, "{tag}<{:?}>", String::from_utf8_lossy(&self.data))
    }
}

/// Anything a command can write to a buffer.
///
/// Bytes and strings are written as-is; other values are written as their
/// textual representation.
pub trait IntoChunk {
    fn into_chunk(self) -> Vec<u8>;
}

impl IntoChunk for Vec<u8> {
    fn into_chunk(self) -> Vec<u8> {
        self
    }
}

impl IntoChunk for &[u8] {
    fn into_chunk(self) -> Vec<u8> {
        self.to_vec()
    }
}

impl<const N: usize> IntoChunk for &[u8; N] {
    fn into_chunk(self) -> Vec<u8> {
        self.to_vec()
    }
}

impl IntoChunk for String {
    fn into_chunk(self) -> Vec<u8> {
        self.into_bytes()
    }
}

impl IntoChunk for &String {
    fn into_chunk(self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl IntoChunk for &str {
    fn into_chunk(self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

macro_rules! into_chunk_via_display {
    ($($ty:ty),*) => {
        $(
            impl IntoChunk for $ty {
                fn into_chunk(self) -> Vec<u8> {
                    self.to_string().into_bytes()
                }
            }
        )*
    };
}

into_chunk_via_display!(char, bool, i32, i64, u32, u64, usize, f64);

/// Tagged stdout/stderr accumulator with an exit code.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct OutputBuffer {
    chunks: Vec<Chunk>,
    code: i64,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer holding `content` as a single stdout chunk.
    ///
    /// This is how attachments are fed to a command as input.
    pub fn from_stdout(content: impl IntoChunk) -> Self {
        let mut buffer = Self::new();
        buffer.write_stdout(content);
        buffer
    }

    pub fn write_stdout(&mut self, content: impl IntoChunk) -> &mut Self {
        self.push(Stream::Stdout, content.into_chunk())
    }

    pub fn write_stderr(&mut self, content: impl IntoChunk) -> &mut Self {
        self.push(Stream::Stderr, content.into_chunk())
    }

    pub fn set_exit_code(&mut self, code: i64) -> &mut Self {
        self.code = code;
        self
    }

    pub fn exit_code(&self) -> i64 {
        self.code
    }

    /// True if the exit code is 0.
    pub fn ok(&self) -> bool {
        self.code == 0
    }

    fn push(&mut self, stream: Stream, data: Vec<u8>) -> &mut Self {
        self.chunks.push(Chunk { stream, data });
        self
    }

    /// All chunks in write order.
    pub fn chunks(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.chunks.iter().map(|c| c.data.as_slice())
    }

    /// Stdout chunks in write order.
    pub fn stdout(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.filtered(Stream::Stdout)
    }

    /// Stderr chunks in write order.
    pub fn stderr(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.filtered(Stream::Stderr)
    }

    fn filtered(&self, stream: Stream) -> impl Iterator<Item = &[u8]> + '_ {
        self.chunks
            .iter()
            .filter(move |c| c.stream == stream)
            .map(|c| c.data.as_slice())
    }

    /// Tagged chunks, for callers that care which stream wrote what.
    pub fn tagged(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Drop every chunk and reset the exit code.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.code = 0;
    }

    pub fn clear_stdout(&mut self) {
        self.chunks.retain(|c| c.stream != Stream::Stdout);
    }

    pub fn clear_stderr(&mut self) {
        self.chunks.retain(|c| c.stream != Stream::Stderr);
    }

    /// Remove every chunk and return them concatenated. The exit code stays.
    pub fn take_all(&mut self) -> Vec<u8> {
        let bytes = self.to_bytes();
        self.chunks.clear();
        bytes
    }

    /// Remove the stdout chunks and return them concatenated.
    pub fn take_stdout(&mut self) -> Vec<u8> {
        let bytes = self.stdout_bytes();
        self.clear_stdout();
        bytes
    }

    /// Remove the stderr chunks and return them concatenated.
    pub fn take_stderr(&mut self) -> Vec<u8> {
        let bytes = self.stderr_bytes();
        self.clear_stderr();
        bytes
    }

    /// All chunks concatenated in write order.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.chunks().flatten().copied().collect()
    }

    pub fn stdout_bytes(&self) -> Vec<u8> {
        self.stdout().flatten().copied().collect()
    }

    pub fn stderr_bytes(&self) -> Vec<u8> {
        self.stderr().flatten().copied().collect()
    }

    /// All chunks decoded as UTF-8, with invalid sequences replaced.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.to_bytes()).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.iter().all(|c| c.data.is_empty())
    }
}

impl fmt::Debug for OutputBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<stds={:?} code={}>", self.chunks, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_keep_order_across_streams() {
        let mut out = OutputBuffer::new();
        out.write_stdout("one ").write_stderr("two ").write_stdout("three");
        assert_eq!(out.to_bytes(), b"one two three");
        assert_eq!(out.stdout_bytes(), b"one three");
        assert_eq!(out.stderr_bytes(), b"two ");
    }

    #[test]
    fn non_bytes_are_written_as_text() {
        let mut out = OutputBuffer::new();
        out.write_stdout(42).write_stdout(' ').write_stdout(true);
        assert_eq!(out.to_string_lossy(), "42 true");
    }

    #[test]
    fn filters_are_restartable() {
        let mut out = OutputBuffer::new();
        out.write_stdout("a").write_stderr("b");
        assert_eq!(out.stdout().count(), 1);
        assert_eq!(out.stdout().count(), 1);
        assert_eq!(out.chunks().collect::<Vec<_>>(), [b"a", b"b"]);
    }

    #[test]
    fn clear_stdout_keeps_stderr() {
        let mut out = OutputBuffer::new();
        out.write_stdout("a").write_stderr("b").write_stdout("c");
        out.set_exit_code(3);
        out.clear_stdout();
        assert_eq!(out.to_bytes(), b"b");
        assert_eq!(out.exit_code(), 3);
    }

    #[test]
    fn clear_stderr_keeps_stdout() {
        let mut out = OutputBuffer::new();
        out.write_stdout("a").write_stderr("b");
        out.clear_stderr();
        assert_eq!(out.to_bytes(), b"a");
    }

    #[test]
    fn take_drains_only_the_requested_stream() {
        let mut out = OutputBuffer::new();
        out.write_stdout("a").write_stderr("b").write_stdout("c");
        assert_eq!(out.take_stderr(), b"b");
        assert_eq!(out.to_bytes(), b"ac");
        assert_eq!(out.take_stdout(), b"ac");
        assert!(out.is_empty());
    }

    #[test]
    fn take_all_keeps_exit_code() {
        let mut out = OutputBuffer::new();
        out.write_stdout("a").write_stderr("b").set_exit_code(4);
        assert_eq!(out.take_all(), b"ab");
        assert!(out.is_empty());
        assert_eq!(out.exit_code(), 4);
    }

    #[test]
    fn clear_resets_exit_code() {
        let mut out = OutputBuffer::new();
        out.write_stderr("boom").set_exit_code(1);
        out.clear();
        assert!(out.is_empty());
        assert!(out.ok());
    }

    #[test]
    fn from_stdout_wraps_bytes() {
        let out = OutputBuffer::from_stdout(b"\xffraw".to_vec());
        assert_eq!(out.stdout_bytes(), b"\xffraw");
        assert_eq!(out.to_string_lossy(), "\u{fffd}raw");
    }

    #[test]
    fn debug_rendering() {
        let mut out = OutputBuffer::new();
        out.write_stdout("hi").write_stderr("no").set_exit_code(1);
        insta::assert_snapshot!(format!("{out:?}"), @r#"<stds=[out<"hi">, err<"no">] code=1>"#);
    }

    #[test]
    fn empty_writes_leave_buffer_empty() {
        let mut out = OutputBuffer::new();
        out.write_stdout("");
        assert!(out.is_empty());
        assert_eq!(out.tagged().len(), 1);
    }
}
