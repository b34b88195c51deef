//! hearth_http - Minimal HTTP/1.1 server with echo, header reflection and file routes
//!
//! Accepts connections on a pre-opened listener, serves each one on its own
//! task, and answers a fixed set of routes (see [`Router`]).
//!
//! # Protocol Support
//!
//! - **HTTP/1.1** request framing with `CRLF` lines and `Content-Length` bodies
//! - **Persistent connections**: requests on one connection are served in
//!   order until the peer closes or sends `Connection: close`
//! - Not supported: chunked transfer-encoding, HTTP/2, TLS
//!
//! Malformed requests close their connection without a response. Other
//! connections and the listener are unaffected.
//!
//! # Examples
//!
//! Serving the fixed routes with file access:
//! ```no_run
//! use hearth_http::{Router, Server, ServerConfig};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     Server::builder()
//!         .listener(TcpListener::bind("127.0.0.1:4221").await?)
//!         .handler(Router::new(ServerConfig::with_directory("/tmp/files")?))
//!         .build()
//!         .launch()
//!         .await;
//!     Ok(())
//! }
//! ```
//! A custom handler:
//! ```no_run
//! use hearth_http::{Handled, Handler, Request, Response, Server, StatusCode};
//! use tokio::net::TcpListener;
//!
//! struct MyHandler;
//!
//! impl Handler for MyHandler {
//!     async fn handle(&self, req: &Request, resp: &mut Response) -> Handled {
//!         match req.target() {
//!             b"/" => resp.status(StatusCode::Ok).finish(),
//!             target => resp.status(StatusCode::Ok).body(target),
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     Server::builder()
//!         .listener(TcpListener::bind("127.0.0.1:8080").await.unwrap())
//!         .handler(MyHandler)
//!         .build()
//!         .launch()
//!         .await;
//! }
//! ```

pub(crate) mod http {
    pub(crate) mod reader;
    pub(crate) mod request;
    pub(crate) mod response;
    pub(crate) mod types;
}
pub(crate) mod server {
    pub(crate) mod connection;
    pub(crate) mod server_impl;
}
pub(crate) mod config;
pub(crate) mod errors;
pub(crate) mod files;
pub(crate) mod handlers;
pub mod limits;
pub(crate) mod router;

pub use crate::{
    config::ServerConfig,
    http::{
        request::Request,
        response::{Handled, Response},
        types::{HeaderMap, Method, StatusCode},
    },
    router::Router,
    server::server_impl::{Handler, Server, ServerBuilder},
};
