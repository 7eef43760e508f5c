//! The scheduler's load sensor line protocol.
//!
//! The scheduler writes one line per load report interval. `quit` asks the
//! sensor to exit; any other line (empty included) requests a report. A report
//! is framed by `begin` and `end` lines, with one `host:resource:value` line per
//! measurement in between:
//!
//! ```text
//! begin
//! node01:load_short:0.42
//! node01:mem_free:11823M
//! end
//! ```

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::sensors::Measurement;

pub const BEGIN: &str = "begin";
pub const END: &str = "end";
pub const QUIT: &str = "quit";

/// Bytes of a trigger line kept in memory. Longer lines are still one poll.
pub const MAX_LINE_LEN: usize = 1024;

/// What the scheduler asked for with one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Produce a report.
    Poll,
    /// Exit cleanly.
    Quit,
}

impl Command {
    /// Interprets a line with its terminator already removed. Only the exact
    /// token `quit` shuts down; case and surrounding whitespace matter. The line
    /// is not required to be valid UTF-8.
    pub fn parse(line: &[u8]) -> Self {
        if line == QUIT.as_bytes() {
            Command::Quit
        } else {
            Command::Poll
        }
    }
}

/// Reads scheduler commands, one per line.
pub struct CommandReader<R> {
    inner: R,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> CommandReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(64),
        }
    }

    /// Waits for the next line. Returns `Ok(None)` once the input is exhausted.
    ///
    /// A trailing `\n` or `\r\n` is stripped. A final line without terminator
    /// still counts as a command. Only the first `MAX_LINE_LEN` bytes of a line
    /// are kept; the rest is read and discarded.
    pub async fn next_command(&mut self) -> io::Result<Option<Command>> {
        self.buf.clear();
        let mut read = 0;
        loop {
            let chunk = self.inner.fill_buf().await?;
            if chunk.is_empty() {
                if read == 0 {
                    return Ok(None);
                }
                break;
            }

            let newline = chunk.iter().position(|&b| b == b'\n');
            let used = newline.map_or(chunk.len(), |i| i + 1);
            let room = MAX_LINE_LEN.saturating_sub(self.buf.len());
            self.buf.extend_from_slice(&chunk[..used.min(room)]);
            self.inner.consume(used);
            read += used;

            if newline.is_some() {
                break;
            }
        }

        let mut line = self.buf.as_slice();
        if let Some(rest) = line.strip_suffix(b"\n") {
            line = rest.strip_suffix(b"\r").unwrap_or(rest);
        }
        Ok(Some(Command::parse(line)))
    }
}

/// Writes framed reports to the scheduler.
pub struct ReportWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> ReportWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub async fn begin(&mut self) -> io::Result<()> {
        self.write_line(BEGIN).await
    }

    pub async fn measurement(&mut self, measurement: &Measurement) -> io::Result<()> {
        self.write_line(&measurement.to_string()).await
    }

    /// Closes the report and flushes it; the scheduler reads until `end`.
    pub async fn end(&mut self) -> io::Result<()> {
        self.write_line(END).await?;
        self.inner.flush().await
    }

    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.inner.write_all(line.as_bytes()).await?;
        self.inner.write_all(b"\n").await
    }
}
