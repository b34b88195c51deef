//! Buffered HTTP/1.1 response builder.

use crate::http::types::StatusCode;

const DEFAULT_CAPACITY: usize = 1024;
// Buffers grown past this by a large file body are dropped between requests.
const MAX_KEPT_CAPACITY: usize = 64 * 1024;

/// HTTP response builder for constructing server responses.
///
/// The full response is serialized into an internal buffer before anything
/// is written to the socket, so a peer never observes partial headers.
///
/// Build responses by chaining methods in strict order:
/// [`status()`](Response::status) -> headers -> [`body()`](Response::body)
/// or [`finish()`](Response::finish).
///
/// Instances are created automatically by the server and passed to
/// [`Handler::handle`](crate::Handler::handle).
///
/// # Examples
/// ```
/// use hearth_http::{Handled, Request, Response, StatusCode};
///
/// // In your implementation `Handler`
/// async fn handle(_req: &Request, resp: &mut Response) -> Handled {
///     resp.status(StatusCode::Ok)
///         .header("Content-Type", "text/plain")
///         .body("Hello World")
/// }
/// ```
///
/// # Panics
/// All methods perform ordering checks in `debug` mode that panic on violations.
#[derive(Debug)]
pub struct Response {
    buffer: Vec<u8>,
    status: Option<StatusCode>,
    state: ResponseState,
}

/// Proof that a [`Response`] was completed.
///
/// Only [`Response::body`] and [`Response::finish`] produce it, so a handler
/// cannot return without writing a full response.
#[derive(Debug)]
pub struct Handled(());

#[derive(Debug, Clone, Copy, PartialEq)]
enum ResponseState {
    Clean,
    Headers,
    Complete,
}

impl Response {
    #[inline(always)]
    pub(crate) fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(DEFAULT_CAPACITY),
            status: None,
            state: ResponseState::Clean,
        }
    }

    #[inline(always)]
    pub(crate) fn reset(&mut self) {
        if self.buffer.capacity() > MAX_KEPT_CAPACITY {
            self.buffer = Vec::with_capacity(DEFAULT_CAPACITY);
        } else {
            self.buffer.clear();
        }

        self.status = None;
        self.state = ResponseState::Clean;
    }

    #[inline(always)]
    pub(crate) fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    #[inline(always)]
    pub(crate) fn status_code(&self) -> Option<StatusCode> {
        self.status
    }
}

impl Response {
    /// Writes the status line. The version is always `HTTP/1.1`.
    ///
    /// # Panics
    /// Error message: `Must be first and called only once`
    #[inline]
    #[track_caller]
    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        debug_assert!(
            self.state == ResponseState::Clean,
            "Must be first and called only once"
        );

        self.buffer.extend_from_slice(status.into_first_line());
        self.status = Some(status);
        self.state = ResponseState::Headers;
        self
    }

    /// Adds a header. Headers are emitted in call order.
    ///
    /// Do not add `Content-Length`: [`body()`](Response::body) writes it.
    ///
    /// # Panics
    /// Error message: `Must be called after status() and before any body method`
    #[inline]
    #[track_caller]
    pub fn header<V: AsRef<[u8]>>(&mut self, name: &str, value: V) -> &mut Self {
        debug_assert!(
            self.state == ResponseState::Headers,
            "Must be called after status() and before any body method"
        );

        self.buffer.extend_from_slice(name.as_bytes());
        self.buffer.extend_from_slice(b": ");
        self.buffer.extend_from_slice(value.as_ref());
        self.buffer.extend_from_slice(b"\r\n");
        self
    }

    /// Sets the body and finalizes the response.
    ///
    /// Always writes `Content-Length`, also for an empty body.
    ///
    /// # Examples
    /// ```
    /// use hearth_http::{Handled, Request, Response, StatusCode};
    ///
    /// async fn fail(_req: &Request, resp: &mut Response) -> Handled {
    ///     // HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\n\r\n
    ///     resp.status(StatusCode::InternalServerError).body("")
    /// }
    /// ```
    ///
    /// # Panics
    /// Error message: `Must be called after status() and before any body method`
    #[inline]
    #[track_caller]
    pub fn body<T: AsRef<[u8]>>(&mut self, data: T) -> Handled {
        let data = data.as_ref();
        self.header("Content-Length", data.len().to_string());

        self.buffer.extend_from_slice(b"\r\n");
        self.buffer.extend_from_slice(data);
        self.complete()
    }

    /// Finalizes the response without a body or `Content-Length`.
    ///
    /// Used for the bare responses (`200` on `/`, `201`, `400`, `403`, `404`).
    ///
    /// # Panics
    /// Error message: `Must be called after status() and any header methods`
    #[inline]
    #[track_caller]
    pub fn finish(&mut self) -> Handled {
        debug_assert!(
            self.state == ResponseState::Headers,
            "Must be called after status() and any header methods"
        );

        self.buffer.extend_from_slice(b"\r\n");
        self.complete()
    }

    #[inline(always)]
    fn complete(&mut self) -> Handled {
        self.state = ResponseState::Complete;
        Handled(())
    }
}
