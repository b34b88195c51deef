//! Buffered socket reader with CRLF-line and length-delimited reads.

use crate::errors::ErrorKind;
use memchr::memmem;
use std::time::Duration;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    time::{sleep_until, Instant},
};

const CHUNK: usize = 8 * 1024;

pub(crate) struct ByteReader<R> {
    inner: R,
    buffer: Vec<u8>,
    start: usize,
    end: usize,
    // Bytes after `start` already known to hold no CRLF.
    scanned: usize,
    read_timeout: Duration,
    request_timeout: Option<Duration>,
    // Set by the first byte of the current request.
    deadline: Option<Instant>,
}

impl<R: AsyncRead + Unpin> ByteReader<R> {
    #[inline]
    pub(crate) fn new(inner: R, read_timeout: Duration) -> Self {
        Self {
            inner,
            buffer: vec![0; CHUNK],
            start: 0,
            end: 0,
            scanned: 0,
            read_timeout,
            request_timeout: None,
            deadline: None,
        }
    }

    /// Bounds the total time one request may take to arrive, counted from its
    /// first byte. Without it only single reads are bounded.
    #[inline]
    pub(crate) fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Starts the clock for a new request. Bytes already buffered belong to
    /// it, so they start the clock immediately.
    pub(crate) fn begin_request(&mut self) {
        self.deadline = None;
        if self.start != self.end {
            self.arm_deadline();
        }
    }

    #[inline]
    fn arm_deadline(&mut self) {
        if self.deadline.is_none() {
            self.deadline = self.request_timeout.map(|timeout| Instant::now() + timeout);
        }
    }

    #[inline(always)]
    fn buffered(&self) -> &[u8] {
        &self.buffer[self.start..self.end]
    }

    /// Returns the next line without its CRLF terminator.
    ///
    /// `Ok(None)` means the peer closed the stream cleanly before sending a
    /// single byte of the line. A close in the middle of a line is
    /// [`ErrorKind::UnexpectedEof`]. A line longer than `max_len` bytes
    /// (terminator included) is [`ErrorKind::HeadTooLarge`].
    pub(crate) async fn read_line(&mut self, max_len: usize) -> Result<Option<Vec<u8>>, ErrorKind> {
        loop {
            // A CR may already be buffered right before the scan window.
            let from = self.scanned.saturating_sub(1);

            if let Some(pos) = memmem::find(&self.buffered()[from..], b"\r\n") {
                let len = from + pos;
                if len + 2 > max_len {
                    return Err(ErrorKind::HeadTooLarge(max_len));
                }

                let line = self.buffered()[..len].to_vec();
                self.consume(len + 2);
                return Ok(Some(line));
            }

            self.scanned = self.end - self.start;
            if self.scanned >= max_len {
                return Err(ErrorKind::HeadTooLarge(max_len));
            }

            if self.fill_buffer().await? == 0 {
                return match self.start == self.end {
                    true => Ok(None),
                    false => Err(ErrorKind::UnexpectedEof),
                };
            }
        }
    }

    /// Reads up to `len` bytes of body.
    ///
    /// Stops early only if the peer closes the stream, in which case the bytes
    /// obtained so far are returned.
    pub(crate) async fn read_body(&mut self, len: usize) -> Result<Vec<u8>, ErrorKind> {
        let mut body = vec![0; len];

        let buffered = self.buffered().len().min(len);
        body[..buffered].copy_from_slice(&self.buffered()[..buffered]);
        self.consume(buffered);

        let mut filled = buffered;
        while filled < len {
            let n = read_timed(
                &mut self.inner,
                &mut body[filled..],
                self.read_timeout,
                self.deadline,
            )
            .await?;
            if n == 0 {
                tracing::debug!(expected = len, received = filled, "body cut short by peer");
                body.truncate(filled);
                break;
            }
            self.arm_deadline();
            filled += n;
        }

        Ok(body)
    }

    #[inline]
    fn consume(&mut self, n: usize) {
        self.start += n;
        self.scanned = 0;

        if self.start == self.end {
            self.start = 0;
            self.end = 0;
        }
    }

    async fn fill_buffer(&mut self) -> Result<usize, ErrorKind> {
        if self.end == self.buffer.len() {
            if self.start > 0 {
                self.buffer.copy_within(self.start..self.end, 0);
                self.end -= self.start;
                self.start = 0;
            } else {
                self.buffer.resize(self.buffer.len() + CHUNK, 0);
            }
        }

        let n = read_timed(
            &mut self.inner,
            &mut self.buffer[self.end..],
            self.read_timeout,
            self.deadline,
        )
        .await?;
        if n > 0 {
            self.arm_deadline();
        }
        self.end += n;

        Ok(n)
    }
}

// A read ends at whichever comes first: its own timeout or the request deadline.
#[inline]
async fn read_timed<R: AsyncRead + Unpin>(
    inner: &mut R,
    buf: &mut [u8],
    time: Duration,
    deadline: Option<Instant>,
) -> Result<usize, ErrorKind> {
    let read_deadline = Instant::now() + time;
    let (until, whole_request) = match deadline {
        Some(deadline) if deadline < read_deadline => (deadline, true),
        _ => (read_deadline, false),
    };

    tokio::select! {
        biased;

        read_result = inner.read(buf) => Ok(read_result?),
        _ = sleep_until(until) => match whole_request {
            true => Err(ErrorKind::RequestTimeout),
            false => Err(ErrorKind::ReadTimeout),
        },
    }
}
