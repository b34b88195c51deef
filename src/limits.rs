//! Connection and request limits
//!
//! # Security-First Defaults
//!
//! Defaults are sized for a small file server and exist to prevent:
//! - Slowloris-style peers that never finish a request
//! - Unbounded memory growth from huge heads or declared bodies
//! - Header flooding
//!
//! Exceeding any request limit is treated like any other malformed request:
//! the connection is closed without a response.
//!
//! # Examples
//!
//! ```no_run
//! use hearth_http::{limits::{ConnLimits, ReqLimits}, Router, Server, ServerConfig};
//! use tokio::net::TcpListener;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     Server::builder()
//!         .listener(TcpListener::bind("127.0.0.1:4221").await.unwrap())
//!         .handler(Router::new(ServerConfig::default()))
//!         .connection_limits(ConnLimits {
//!             socket_read_timeout: Duration::from_secs(5),
//!             ..ConnLimits::default()
//!         })
//!         .request_limits(ReqLimits {
//!             body_size: 1024 * 1024,
//!             ..ReqLimits::default()
//!         })
//!         .build()
//!         .launch()
//!         .await;
//! }
//! ```

use std::time::Duration;

/// Connection-level limits and timeouts
///
/// Controls how long a single TCP connection may wait on its peer and how many
/// requests it may serve.
#[derive(Debug, Clone)]
pub struct ConnLimits {
    /// Maximum duration of a single socket read (default: `30 seconds`)
    ///
    /// Applies both to the idle wait for the next request and to every read
    /// inside a request, including the wait for a declared body. When it
    /// expires the connection is closed.
    pub socket_read_timeout: Duration,

    /// Maximum time for one whole request to arrive, head and body
    /// (default: `120 seconds`)
    ///
    /// Counted from the first byte of the request, so idle keep-alive time is
    /// not included. Stops peers that keep every read just under
    /// `socket_read_timeout` from holding a connection and its body buffer.
    pub request_timeout: Duration,

    /// Maximum duration to write one complete response (default: `10 seconds`)
    pub socket_write_timeout: Duration,

    /// Maximum number of requests served per connection (default: `1000`)
    ///
    /// The connection closes after the response to the last allowed request.
    pub max_requests_per_connection: usize,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for ConnLimits {
    #[inline(always)]
    fn default() -> Self {
        Self {
            socket_read_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(120),
            socket_write_timeout: Duration::from_secs(10),
            max_requests_per_connection: 1000,

            _priv: (),
        }
    }
}

/// HTTP request parsing limits
///
/// | Limit         | Default | Covers                                      |
/// |---------------|---------|---------------------------------------------|
/// | `head_size`   | 64 KiB  | Request line + all header lines + blank line |
/// | `header_count`| 100     | Number of header lines                      |
/// | `body_size`   | 64 MiB  | Declared `Content-Length`                   |
#[derive(Debug, Clone)]
pub struct ReqLimits {
    /// Maximum size of the request head in bytes, CRLFs included (default: `64 KiB`)
    pub head_size: usize,

    /// Maximum number of header lines per request (default: `100`)
    ///
    /// Duplicates count individually even though only the last one is kept.
    pub header_count: usize,

    /// Maximum declared `Content-Length` in bytes (default: `64 MiB`)
    ///
    /// Uploads through `POST /files/` are held in memory before they are
    /// written, so this also bounds per-connection memory.
    pub body_size: usize,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for ReqLimits {
    fn default() -> Self {
        Self {
            head_size: 64 * 1024,
            header_count: 100,
            body_size: 64 * 1024 * 1024,

            _priv: (),
        }
    }
}
