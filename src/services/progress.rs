//! Upload progress rendering
//!
//! [`ProgressReader`] wraps the encoded request body and redraws a single
//! progress line on the diagnostic stream while the HTTP client pulls bytes
//! out of it.

use std::io::Write;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, ReadBuf};

/// Number of cells in the progress bar.
pub const PROGRESS_BAR_WIDTH: usize = 20;

/// Minimum time between two intermediate redraws.
pub const RENDER_INTERVAL: Duration = Duration::from_millis(150);

const DONE_SUFFIX: &str = "(sent) - waiting response...";

/// Format one progress line for `read` of `total` bytes.
pub fn render_line(read: u64, total: u64) -> String {
    let percent = if total == 0 {
        100.0
    } else {
        read as f64 * 100.0 / total as f64
    };
    let cell = 100.0 / PROGRESS_BAR_WIDTH as f64;
    let filled = ((percent / cell) as usize).min(PROGRESS_BAR_WIDTH);

    format!("\rProgress: [{}] {:6.2}%", bar(filled), percent)
}

/// Format the line shown once every byte has left the client.
pub fn render_done_line() -> String {
    format!("\rProgress: [{}] 100.00% {}", bar(PROGRESS_BAR_WIDTH), DONE_SUFFIX)
}

fn bar(filled: usize) -> String {
    let mut bar = "=".repeat(filled);
    bar.push_str(&" ".repeat(PROGRESS_BAR_WIDTH - filled));
    bar
}

/// Pass-through reader that renders upload progress.
///
/// Reads are forwarded to the inner reader untouched: no buffering, no extra
/// reads, errors and end-of-stream are returned as-is.
pub struct ProgressReader<R> {
    inner: R,
    sink: Box<dyn Write + Send>,
    total: u64,
    read: u64,
    last_render: Option<Instant>,
    renders: usize,
    finished: bool,
}

impl<R> ProgressReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Wrap `reader`, which is expected to yield exactly `total` bytes.
    /// Progress is drawn on stderr.
    pub fn new(reader: R, total: u64) -> Self {
        Self {
            inner: reader,
            sink: Box::new(std::io::stderr()),
            total,
            read: 0,
            last_render: None,
            renders: 0,
            finished: false,
        }
    }

    /// Draw progress somewhere other than stderr
    pub fn with_sink(mut self, sink: Box<dyn Write + Send>) -> Self {
        self.sink = sink;
        self
    }

    pub fn bytes_read(&self) -> u64 {
        self.read
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of lines drawn so far, including the final one
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// True once every declared byte has been read or end-of-stream was seen
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn record(&mut self, n: usize) {
        self.read = self.read.saturating_add(n as u64).min(self.total);

        let now = Instant::now();
        let due = self
            .last_render
            .map_or(true, |last| now.duration_since(last) >= RENDER_INTERVAL);

        if due || self.read == self.total {
            let line = render_line(self.read, self.total);
            self.draw(&line);
            self.last_render = Some(now);
        }

        // A client sending a fixed Content-Length stops polling at the last
        // byte and never asks for end-of-stream.
        if self.read == self.total {
            self.finish();
        }
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.draw(&render_done_line());
    }

    fn draw(&mut self, line: &str) {
        // Progress output is cosmetic, a broken terminal must not fail the upload
        let _ = self.sink.write_all(line.as_bytes());
        let _ = self.sink.flush();
        self.renders += 1;
    }
}

impl<R> AsyncRead for ProgressReader<R>
where
    R: AsyncRead + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let this = self.get_mut();
        let initial_len = buf.filled().len();
        let had_room = buf.remaining() > 0;

        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                let bytes_read = buf.filled().len() - initial_len;

                if bytes_read > 0 {
                    this.record(bytes_read);
                } else if had_room {
                    this.finish();
                }

                Poll::Ready(Ok(()))
            }
            Poll::Ready(Err(e)) => Poll::Ready(Err(e)),
            Poll::Pending => Poll::Pending,
        }
    }
}
