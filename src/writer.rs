//! Bounded row queue and the buffered CSV writer that drains it.
//!
//! The sampler pushes formatted rows into a [`RowSender`]; a single worker
//! owns the matching [`RowReceiver`] and the output file. Rows are kept in
//! memory until more than [`FLUSH_THRESHOLD`] bytes have accumulated, and
//! whatever is left is flushed once the queue closes.

use std::io::{self, Write};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};

/// One minute of rows at one row per second
pub const QUEUE_CAPACITY: usize = 60;

/// Flush once strictly more than this many bytes are buffered
pub const FLUSH_THRESHOLD: usize = 1024;

/// Create the bounded FIFO queue between sampler and writer
pub fn row_queue(capacity: usize) -> (RowSender, RowReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (RowSender { tx }, RowReceiver { rx })
}

/// Producer half. Dropping the last sender closes the queue.
#[derive(Debug)]
pub struct RowSender {
    tx: mpsc::Sender<String>,
}

impl RowSender {
    /// Enqueue a row, waiting while the queue is full
    pub async fn push(&self, row: String) -> Result<()> {
        self.tx.send(row).await.map_err(|_| Error::QueueClosed)
    }

    /// Same as [`push`](Self::push) for callers outside the async runtime
    pub fn blocking_push(&self, row: String) -> Result<()> {
        self.tx.blocking_send(row).map_err(|_| Error::QueueClosed)
    }

    /// Free slots left before a push would block
    pub fn remaining(&self) -> usize {
        self.tx.capacity()
    }
}

/// Consumer half, owned by exactly one writer
#[derive(Debug)]
pub struct RowReceiver {
    rx: mpsc::Receiver<String>,
}

impl RowReceiver {
    pub async fn pop(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Returns `None` once the queue is closed and drained
    pub fn blocking_pop(&mut self) -> Option<String> {
        self.rx.blocking_recv()
    }
}

/// Totals reported by the writer when it shuts down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterSummary {
    pub rows: u64,
    pub flushes: u64,
    pub bytes: u64,
}

/// In-memory row buffer in front of a sink
pub struct BufferedWriter<W: Write> {
    sink: W,
    buffer: Vec<u8>,
    buffered: usize,
    threshold: usize,
    summary: WriterSummary,
}

impl<W: Write> BufferedWriter<W> {
    pub fn new(sink: W) -> Self {
        Self::with_threshold(sink, FLUSH_THRESHOLD)
    }

    pub fn with_threshold(sink: W, threshold: usize) -> Self {
        Self {
            sink,
            buffer: Vec::with_capacity(threshold * 2),
            buffered: 0,
            threshold,
            summary: WriterSummary::default(),
        }
    }

    /// Buffer one row. Returns whether this push triggered a flush.
    pub fn push(&mut self, row: &str) -> io::Result<bool> {
        self.buffer.extend_from_slice(row.as_bytes());
        self.buffered += row.len();
        self.summary.rows += 1;

        if self.buffered > self.threshold {
            self.flush()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Write out everything buffered so far.
    ///
    /// The buffer is emptied even when the write fails so a broken disk
    /// cannot make memory grow without bound.
    pub fn flush(&mut self) -> io::Result<()> {
        self.buffered = 0;
        if self.buffer.is_empty() {
            return self.sink.flush();
        }

        let result = self
            .sink
            .write_all(&self.buffer)
            .and_then(|_| self.sink.flush());
        let written = self.buffer.len() as u64;
        self.buffer.clear();

        result?;
        self.summary.flushes += 1;
        self.summary.bytes += written;
        Ok(())
    }

    /// Bytes waiting for the next flush
    pub fn buffered(&self) -> usize {
        self.buffered
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Final flush, then hand back the totals
    pub fn finish(mut self) -> io::Result<WriterSummary> {
        self.flush()?;
        Ok(self.summary)
    }
}

/// Drain the queue into the writer until the queue is closed.
///
/// Intermediate write failures are logged and the loop keeps consuming;
/// only the final flush error is returned.
pub fn run_writer<W: Write>(
    mut queue: RowReceiver,
    mut writer: BufferedWriter<W>,
) -> io::Result<WriterSummary> {
    while let Some(row) = queue.blocking_pop() {
        match writer.push(&row) {
            Ok(true) => tracing::trace!("flushed buffered rows"),
            Ok(false) => {}
            Err(e) => tracing::error!(error = %e, "failed to write buffered rows"),
        }
    }

    tracing::debug!("row queue closed, flushing remaining rows");
    writer.finish()
}

/// Run [`run_writer`] on a dedicated blocking thread that owns `sink`
pub fn spawn_writer<W>(queue: RowReceiver, sink: W) -> JoinHandle<io::Result<WriterSummary>>
where
    W: Write + Send + 'static,
{
    tokio::task::spawn_blocking(move || run_writer(queue, BufferedWriter::new(sink)))
}
