use std::io;
use thiserror::Error;

/// Failures that end a single connection.
///
/// None of these produce a response: the connection is closed and the
/// listener keeps accepting.
#[derive(Debug, Error)]
pub(crate) enum ErrorKind {
    #[error("malformed request line")]
    InvalidRequestLine,

    #[error("malformed header line")]
    InvalidHeader,
    #[error("more than {0} headers")]
    TooManyHeaders(usize),
    #[error("request head exceeds {0} bytes")]
    HeadTooLarge(usize),
    #[error("conflicting Content-Length headers")]
    DuplicateContentLength,

    #[error("declared body of {0} bytes exceeds the limit")]
    BodyTooLarge(usize),

    #[error("peer closed the connection mid-request")]
    UnexpectedEof,
    #[error("socket read timed out")]
    ReadTimeout,
    #[error("request not received in time")]
    RequestTimeout,
    #[error("socket write timed out")]
    WriteTimeout,
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ErrorKind {
    /// Errors caused by the peer going away rather than by what it sent.
    #[inline]
    pub(crate) fn is_disconnect(&self) -> bool {
        match self {
            Self::UnexpectedEof => true,
            Self::Io(err) => matches!(
                err.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}
