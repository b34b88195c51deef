use crate::{
    errors::ErrorKind,
    http::{reader::ByteReader, request::Request, response::Response},
    limits::{ConnLimits, ReqLimits},
    server::server_impl::Handler,
};
use std::sync::Arc;
use tokio::io::{split, AsyncRead, AsyncWrite};

/// Serves requests from one accepted stream, strictly one at a time.
pub(crate) struct HttpConnection<H: Handler> {
    handler: Arc<H>,
    response: Response,

    conn_limits: ConnLimits,
    req_limits: ReqLimits,
}

impl<H: Handler> HttpConnection<H> {
    #[inline]
    pub(crate) fn new(handler: Arc<H>, conn_limits: ConnLimits, req_limits: ReqLimits) -> Self {
        Self {
            handler,
            response: Response::new(),
            conn_limits,
            req_limits,
        }
    }

    /// Runs until the peer closes, a request asks to close, the request limit
    /// is reached, or an error occurs. Errors are never answered: the stream
    /// is simply dropped.
    pub(crate) async fn run<S>(&mut self, stream: S) -> Result<(), ErrorKind>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (read_half, mut write_half) = split(stream);
        let mut reader = ByteReader::new(read_half, self.conn_limits.socket_read_timeout)
            .request_timeout(self.conn_limits.request_timeout);

        for _ in 0..self.conn_limits.max_requests_per_connection {
            let Some(request) = Request::read_from(&mut reader, &self.req_limits).await? else {
                break;
            };

            self.response.reset();
            self.handler.handle(&request, &mut self.response).await;

            tracing::debug!(
                method = %request.method(),
                target = %String::from_utf8_lossy(request.target()),
                status = self.response.status_code().map(|status| status.as_u16()),
                "request handled"
            );

            writer::write_bytes(
                &mut write_half,
                self.response.buffer(),
                self.conn_limits.socket_write_timeout,
            )
            .await?;

            if request.wants_close() {
                break;
            }
        }

        Ok(())
    }
}

pub(crate) mod writer {
    use crate::errors::ErrorKind;
    use tokio::{
        io::{AsyncWrite, AsyncWriteExt},
        time::{timeout, Duration},
    };

    #[inline(always)]
    pub(crate) async fn write_bytes<W: AsyncWrite + Unpin>(
        stream: &mut W,
        response: &[u8],
        time: Duration,
    ) -> Result<(), ErrorKind> {
        let write = async {
            stream.write_all(response).await?;
            stream.flush().await
        };

        match timeout(time, write).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ErrorKind::WriteTimeout),
        }
    }
}
