use crate::{
    errors::ErrorKind,
    http::{
        reader::ByteReader,
        types::{slice_to_usize, trim_whitespace, HeaderMap, Method},
    },
    limits::ReqLimits,
};
use memchr::{memchr, memchr2, memrchr};
use tokio::io::AsyncRead;

/// A parsed HTTP/1.1 request.
///
/// # Input data requirements
///
/// #### General designations
/// - `SP`: ASCII space (0x20)
/// - `CRLF`: Carriage return + line feed (`"\r\n"`) - **exactly this sequence required**.
///   A bare `LF` does not end a line.
///
/// ## First line
///
/// ```text
/// [METHOD] SP [TARGET] SP "HTTP/" [VERSION] CRLF
/// ```
///
/// The line is split at its first and last space, so the target may itself
/// contain spaces (`POST /files/a b.txt HTTP/1.1`). The method must be a
/// non-empty run of visible ASCII and is kept verbatim; it is never
/// case-folded. The target is kept as raw bytes without percent-decoding.
///
/// **Invalid** (the connection is closed without a response):
/// ```text
/// GARBAGE                  // one field
/// GET /                    // two fields
/// GET / HTTP/1.1 extra     // last field is not a version
/// GET  / HTTP/1.1          // redundant whitespace
/// ```
///
/// ## Header
///
/// ```text
/// [NAME] ":" [VALUE] CRLF
/// ```
///
/// The line is split at the first `:`. Names are stored lower-cased and must
/// be non-empty visible ASCII. Values have surrounding whitespace removed. A
/// repeated name replaces the earlier value, except `Content-Length`, which
/// may appear only once.
///
/// ## Body
///
/// Only `Content-Length` framing is understood. A value that is not a
/// non-negative integer leaves the body empty; handlers that need the length
/// check [`content_length`](Request::content_length) themselves. A body cut
/// short by the peer closing the stream is kept as far as it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    target: Box<[u8]>,
    version: Box<[u8]>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Request {
    /// Returns the request method.
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the raw request target, exactly as sent.
    #[inline]
    pub fn target(&self) -> &[u8] {
        &self.target
    }

    /// Returns the request target as `&str` if it is valid UTF-8.
    #[inline]
    pub fn target_str(&self) -> Option<&str> {
        simdutf8::basic::from_utf8(&self.target).ok()
    }

    /// Returns the protocol version token (e.g. `HTTP/1.1`). Informational only.
    #[inline]
    pub fn version(&self) -> &[u8] {
        &self.version
    }

    /// Case-insensitive header lookup. The value is already trimmed.
    #[inline]
    pub fn header(&self, name: &str) -> Option<&[u8]> {
        self.headers.get(name)
    }

    /// Like [`header`](Request::header), but only for values that are valid UTF-8.
    #[inline]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.header(name)
            .and_then(|value| simdutf8::basic::from_utf8(value).ok())
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the `Content-Length` value if present and a valid non-negative integer.
    #[inline]
    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length").and_then(slice_to_usize)
    }

    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns `true` if the client sent `Connection: close`.
    pub fn wants_close(&self) -> bool {
        self.header("connection").is_some_and(|value| {
            value
                .split(|&b| b == b',')
                .any(|token| trim_whitespace(token).eq_ignore_ascii_case(b"close"))
        })
    }
}

impl Request {
    /// Reads one complete request from `reader`.
    ///
    /// Returns `Ok(None)` if the peer closed the stream before starting a new
    /// request. Every error is fatal for the connection.
    pub(crate) async fn read_from<R: AsyncRead + Unpin>(
        reader: &mut ByteReader<R>,
        limits: &ReqLimits,
    ) -> Result<Option<Self>, ErrorKind> {
        reader.begin_request();
        let mut head = HeadBudget::new(limits.head_size);

        let Some(line) = head.read_line(reader).await? else {
            return Ok(None);
        };
        let (method, target, version) = parse_request_line(&line)?;

        let mut headers = HeaderMap::with_capacity(8);
        let mut count = 0;
        loop {
            let line = head
                .read_line(reader)
                .await?
                .ok_or(ErrorKind::UnexpectedEof)?;
            if line.is_empty() {
                break;
            }

            count += 1;
            if count > limits.header_count {
                return Err(ErrorKind::TooManyHeaders(limits.header_count));
            }

            let (name, value) = parse_header(&line)?;
            if headers.insert(name, value) && name.eq_ignore_ascii_case("content-length") {
                return Err(ErrorKind::DuplicateContentLength);
            }
        }

        let body = match headers.get("content-length").and_then(slice_to_usize) {
            Some(len) if len > limits.body_size => return Err(ErrorKind::BodyTooLarge(len)),
            Some(len) => reader.read_body(len).await?,
            None => Vec::new(),
        };

        Ok(Some(Self {
            method: Method::from_bytes(method),
            target: target.into(),
            version: version.into(),
            headers,
            body,
        }))
    }
}

// Tracks how much of `ReqLimits::head_size` is left across the head lines.
struct HeadBudget {
    limit: usize,
    left: usize,
}

impl HeadBudget {
    #[inline]
    fn new(limit: usize) -> Self {
        Self { limit, left: limit }
    }

    async fn read_line<R: AsyncRead + Unpin>(
        &mut self,
        reader: &mut ByteReader<R>,
    ) -> Result<Option<Vec<u8>>, ErrorKind> {
        let line = reader.read_line(self.left).await.map_err(|err| match err {
            ErrorKind::HeadTooLarge(_) => ErrorKind::HeadTooLarge(self.limit),
            err => err,
        })?;

        if let Some(line) = &line {
            self.left -= line.len() + 2;
        }
        Ok(line)
    }
}

fn parse_request_line(line: &[u8]) -> Result<(&[u8], &[u8], &[u8]), ErrorKind> {
    if memchr2(b'\r', b'\n', line).is_some() {
        return Err(ErrorKind::InvalidRequestLine);
    }

    let (Some(first), Some(last)) = (memchr(b' ', line), memrchr(b' ', line)) else {
        return Err(ErrorKind::InvalidRequestLine);
    };
    if first == last {
        return Err(ErrorKind::InvalidRequestLine);
    }

    let method = &line[..first];
    let target = &line[first + 1..last];
    let version = &line[last + 1..];

    let valid = !method.is_empty()
        && method.iter().all(u8::is_ascii_graphic)
        && !target.is_empty()
        && !target.starts_with(b" ")
        && !target.ends_with(b" ")
        && version.len() > b"HTTP/".len()
        && version.starts_with(b"HTTP/")
        && version.iter().all(u8::is_ascii_graphic);

    match valid {
        true => Ok((method, target, version)),
        false => Err(ErrorKind::InvalidRequestLine),
    }
}

fn parse_header(line: &[u8]) -> Result<(&str, &[u8]), ErrorKind> {
    let colon = memchr(b':', line).ok_or(ErrorKind::InvalidHeader)?;
    let (name, value) = (&line[..colon], &line[colon + 1..]);

    if name.is_empty()
        || !name.iter().all(u8::is_ascii_graphic)
        || memchr2(b'\r', b'\n', value).is_some()
    {
        return Err(ErrorKind::InvalidHeader);
    }

    let name = simdutf8::basic::from_utf8(name).map_err(|_| ErrorKind::InvalidHeader)?;
    Ok((name, trim_whitespace(value)))
}
