use crate::{
    http::{
        request::Request,
        response::{Handled, Response},
    },
    limits::{ConnLimits, ReqLimits},
    server::connection::HttpConnection,
};
use std::{future::Future, io, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::Instrument;

/// A trait for handling HTTP requests and generating responses.
///
/// One instance is shared by every connection, so `&self` holds only
/// read-only data such as configuration.
///
/// # Examples
///
/// ```
/// use hearth_http::{Handler, Request, Response, Handled, StatusCode};
///
/// struct MyHandler;
///
/// impl Handler for MyHandler {
///     async fn handle(&self, req: &Request, resp: &mut Response) -> Handled {
///         if req.target() == b"/ping" {
///             resp.status(StatusCode::Ok).body("pong")
///         } else {
///             resp.status(StatusCode::NotFound).finish()
///         }
///     }
/// }
/// ```
pub trait Handler
where
    Self: Sync + Send + 'static,
{
    /// Processes one request and completes the response.
    ///
    /// Implementations handle their own errors and choose a status code for
    /// them. A panic ends only the connection it happened on.
    fn handle(
        &self,
        request: &Request,
        response: &mut Response,
    ) -> impl Future<Output = Handled> + Send;
}

/// An HTTP server that accepts connections and serves each one on its own task.
///
/// # Examples
///
/// ```no_run
/// use hearth_http::{Server, Router, ServerConfig};
/// use tokio::net::TcpListener;
///
/// #[tokio::main]
/// async fn main() {
///     Server::builder()
///         .listener(TcpListener::bind("127.0.0.1:4221").await.unwrap())
///         .handler(Router::new(ServerConfig::default()))
///         .build()
///         .launch()
///         .await
/// }
/// ```
pub struct Server<H: Handler> {
    listener: TcpListener,
    handler: Arc<H>,
    conn_limits: ConnLimits,
    req_limits: ReqLimits,
}

impl<H: Handler> Server<H> {
    /// Creates a new builder for configuring the server instance.
    #[inline]
    pub fn builder() -> ServerBuilder<H> {
        ServerBuilder {
            listener: None,
            handler: None,
            request_limits: None,
            connection_limits: None,
        }
    }

    /// Returns the address the listener is bound to.
    #[inline]
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Starts accepting connections. Never returns.
    ///
    /// Each connection runs on its own task; a failing or slow connection does
    /// not hold up the accept loop or any other connection.
    pub async fn launch(self) {
        loop {
            let (stream, addr) = match self.listener.accept().await {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(error = %err, "failed to accept connection");
                    continue;
                }
            };

            if let Err(err) = stream.set_nodelay(true) {
                tracing::debug!(peer = %addr, error = %err, "failed to set TCP_NODELAY");
            }
            let mut conn = HttpConnection::new(
                self.handler.clone(),
                self.conn_limits.clone(),
                self.req_limits.clone(),
            );

            let span = tracing::debug_span!("connection", peer = %addr);
            tokio::spawn(
                async move {
                    tracing::debug!("connection opened");

                    match conn.run(stream).await {
                        Ok(()) => tracing::debug!("connection closed"),
                        Err(err) if err.is_disconnect() => {
                            tracing::debug!(error = %err, "peer disconnected")
                        }
                        Err(err) => tracing::debug!(error = %err, "connection dropped"),
                    }
                }
                .instrument(span),
            );
        }
    }
}

/// Builder for configuring and creating [`Server`] instances.
pub struct ServerBuilder<H: Handler> {
    listener: Option<TcpListener>,
    handler: Option<Arc<H>>,

    request_limits: Option<ReqLimits>,
    connection_limits: Option<ConnLimits>,
}

impl<H: Handler> ServerBuilder<H> {
    /// Sets the TCP listener that the server will use to accept connections.
    ///
    /// **This is a required component.**
    #[inline(always)]
    pub fn listener(mut self, listener: TcpListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Sets the request handler shared by all connections.
    ///
    /// **This is a required component.**
    #[inline(always)]
    pub fn handler(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Configures request parsing limits.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # #[tokio::main]
    /// # async fn main() {
    /// use hearth_http::{limits::ReqLimits, Router, Server};
    /// use tokio::net::TcpListener;
    ///
    /// let server = Server::builder()
    ///     .listener(TcpListener::bind("127.0.0.1:4221").await.unwrap())
    ///     .handler(Router::default())
    ///     .request_limits(ReqLimits {
    ///         header_count: 32,
    ///         body_size: 1024 * 1024,
    ///         ..ReqLimits::default() // Required line
    ///     })
    ///     .build();
    /// # }
    /// ```
    #[inline(always)]
    pub fn request_limits(mut self, limits: ReqLimits) -> Self {
        self.request_limits = Some(limits);
        self
    }

    /// Configures connection timeouts and the per-connection request cap.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # #[tokio::main]
    /// # async fn main() {
    /// use hearth_http::{limits::ConnLimits, Router, Server};
    /// use tokio::net::TcpListener;
    /// use std::time::Duration;
    ///
    /// let server = Server::builder()
    ///     .listener(TcpListener::bind("127.0.0.1:4221").await.unwrap())
    ///     .handler(Router::default())
    ///     .connection_limits(ConnLimits {
    ///         socket_read_timeout: Duration::from_secs(5),
    ///         max_requests_per_connection: 100,
    ///         ..ConnLimits::default() // Required line
    ///     })
    ///     .build();
    /// # }
    /// ```
    #[inline(always)]
    pub fn connection_limits(mut self, limits: ConnLimits) -> Self {
        self.connection_limits = Some(limits);
        self
    }

    /// Builds the server.
    ///
    /// # Panics
    ///
    /// Error messages:
    /// - ``The `listener` method must be called to create``
    /// - ``The `handler` method must be called to create``
    #[inline]
    #[track_caller]
    pub fn build(self) -> Server<H> {
        Server {
            listener: self
                .listener
                .expect("The `listener` method must be called to create"),
            handler: self
                .handler
                .expect("The `handler` method must be called to create"),
            conn_limits: self.connection_limits.unwrap_or_default(),
            req_limits: self.request_limits.unwrap_or_default(),
        }
    }
}
