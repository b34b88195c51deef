//! Fixed route table.
//!
//! | Pattern             | Methods | Handler       |
//! |---------------------|---------|---------------|
//! | `/` (exact)         | any     | root          |
//! | `/echo/` (prefix)   | `GET`   | echo          |
//! | `/user-agent`       | `GET`   | user-agent    |
//! | `/files/` (prefix)  | `GET`   | file read     |
//! | `/files/` (prefix)  | `POST`  | file write    |
//!
//! Routes are tried in order and the first match wins. Anything unmatched,
//! and the `/files/` routes when no base directory is configured, ends in
//! `404 Not Found`. Prefixes are compared as raw bytes, so `/echo` does not
//! match `/echo/` and method names are case-sensitive.

use crate::{
    config::ServerConfig,
    handlers,
    http::{
        request::Request,
        response::{Handled, Response},
        types::Method,
    },
    server::server_impl::Handler,
};
use std::path::Path;

#[derive(Debug, Clone, Copy)]
enum Pattern {
    Exact(&'static [u8]),
    Prefix(&'static [u8]),
}

impl Pattern {
    /// Returns the part of `target` after the pattern on a match.
    #[inline]
    fn matches(self, target: &[u8]) -> Option<&[u8]> {
        match self {
            Pattern::Exact(path) => (target == path).then_some(&target[target.len()..]),
            Pattern::Prefix(prefix) => target.strip_prefix(prefix),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Allow {
    Any,
    Get,
    Post,
}

impl Allow {
    #[inline]
    fn matches(self, method: &Method) -> bool {
        match self {
            Allow::Any => true,
            Allow::Get => *method == Method::Get,
            Allow::Post => *method == Method::Post,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteKind {
    Root,
    Echo,
    UserAgent,
    FileRead,
    FileWrite,
}

struct Route {
    pattern: Pattern,
    allow: Allow,
    kind: RouteKind,
}

#[rustfmt::skip]
const ROUTES: [Route; 5] = [
    Route { pattern: Pattern::Exact(b"/"),           allow: Allow::Any,  kind: RouteKind::Root },
    Route { pattern: Pattern::Prefix(b"/echo/"),     allow: Allow::Get,  kind: RouteKind::Echo },
    Route { pattern: Pattern::Exact(b"/user-agent"), allow: Allow::Get,  kind: RouteKind::UserAgent },
    Route { pattern: Pattern::Prefix(b"/files/"),    allow: Allow::Get,  kind: RouteKind::FileRead },
    Route { pattern: Pattern::Prefix(b"/files/"),    allow: Allow::Post, kind: RouteKind::FileWrite },
];

/// Outcome of matching one request against the route table.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Resolved<'a> {
    Root,
    Echo(&'a [u8]),
    UserAgent,
    FileRead { dir: &'a Path, name: &'a [u8] },
    FileWrite { dir: &'a Path, name: &'a [u8] },
    NotFound,
}

/// The server's request handler: dispatches through the fixed route table.
///
/// # Examples
/// ```no_run
/// use hearth_http::{Router, Server, ServerConfig};
/// use tokio::net::TcpListener;
///
/// #[tokio::main]
/// async fn main() -> std::io::Result<()> {
///     let config = ServerConfig::with_directory("/tmp/files")?;
///
///     Server::builder()
///         .listener(TcpListener::bind("127.0.0.1:4221").await?)
///         .handler(Router::new(config))
///         .build()
///         .launch()
///         .await;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Router {
    config: ServerConfig,
}

impl Router {
    #[inline]
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub(crate) fn resolve<'a>(&'a self, method: &Method, target: &'a [u8]) -> Resolved<'a> {
        let dir = self.config.directory();

        for route in &ROUTES {
            if !route.allow.matches(method) {
                continue;
            }
            let Some(rest) = route.pattern.matches(target) else {
                continue;
            };

            return match (route.kind, dir) {
                (RouteKind::Root, _) => Resolved::Root,
                (RouteKind::Echo, _) => Resolved::Echo(rest),
                (RouteKind::UserAgent, _) => Resolved::UserAgent,
                (RouteKind::FileRead, Some(dir)) => Resolved::FileRead { dir, name: rest },
                (RouteKind::FileWrite, Some(dir)) => Resolved::FileWrite { dir, name: rest },
                (RouteKind::FileRead | RouteKind::FileWrite, None) => continue,
            };
        }

        Resolved::NotFound
    }
}

impl Handler for Router {
    async fn handle(&self, request: &Request, response: &mut Response) -> Handled {
        match self.resolve(request.method(), request.target()) {
            Resolved::Root => handlers::root(response),
            Resolved::Echo(value) => handlers::echo(value, response),
            Resolved::UserAgent => handlers::user_agent(request, response),
            Resolved::FileRead { dir, name } => handlers::file_read(dir, name, response).await,
            Resolved::FileWrite { dir, name } => {
                handlers::file_write(dir, name, request, response).await
            }
            Resolved::NotFound => handlers::not_found(response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn method(raw: &str) -> Method {
        Method::from_bytes(raw.as_bytes())
    }

    #[test]
    fn without_directory() {
        let router = Router::default();

        #[rustfmt::skip]
        let cases: [(&str, &[u8], Resolved); 14] = [
            ("GET",    b"/",                Resolved::Root),
            ("POST",   b"/",                Resolved::Root),
            ("BREW",   b"/",                Resolved::Root),
            ("GET",    b"/echo/abc",        Resolved::Echo(b"abc")),
            ("GET",    b"/echo/",           Resolved::Echo(b"")),
            ("GET",    b"/echo/a/b%20c",    Resolved::Echo(b"a/b%20c")),
            ("GET",    b"/echo",            Resolved::NotFound),
            ("POST",   b"/echo/abc",        Resolved::NotFound),
            ("get",    b"/echo/abc",        Resolved::NotFound),
            ("GET",    b"/user-agent",      Resolved::UserAgent),
            ("GET",    b"/user-agent/",     Resolved::NotFound),
            ("GET",    b"/files/a.txt",     Resolved::NotFound),
            ("POST",   b"/files/a.txt",     Resolved::NotFound),
            ("GET",    b"/abcdefg",         Resolved::NotFound),
        ];

        for (name, target, expected) in cases {
            assert_eq!(
                router.resolve(&method(name), target),
                expected,
                "{name} {}",
                String::from_utf8_lossy(target)
            );
        }
    }

    #[test]
    fn with_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let router = Router::new(ServerConfig::with_directory(tmp.path()).unwrap());
        let dir: PathBuf = router.config().directory().unwrap().to_path_buf();

        #[rustfmt::skip]
        let cases: [(&str, &[u8], Resolved); 7] = [
            ("GET",    b"/files/a.txt",     Resolved::FileRead { dir: &dir, name: b"a.txt" }),
            ("GET",    b"/files/",          Resolved::FileRead { dir: &dir, name: b"" }),
            ("GET",    b"/files/../x",      Resolved::FileRead { dir: &dir, name: b"../x" }),
            ("POST",   b"/files/a b.txt",   Resolved::FileWrite { dir: &dir, name: b"a b.txt" }),
            ("PUT",    b"/files/a.txt",     Resolved::NotFound),
            ("post",   b"/files/a.txt",     Resolved::NotFound),
            ("GET",    b"/files",           Resolved::NotFound),
        ];

        for (name, target, expected) in cases {
            assert_eq!(router.resolve(&method(name), target), expected);
        }
    }

    #[tokio::test]
    async fn dispatch() {
        use crate::tools::{parse, str_op};

        #[rustfmt::skip]
        let cases = [
            ("GET / HTTP/1.1\r\n\r\n",                          "HTTP/1.1 200 OK\r\n\r\n"),
            ("DELETE / HTTP/1.1\r\nX: y\r\n\r\n",               "HTTP/1.1 200 OK\r\n\r\n"),
            ("GET /echo/hi HTTP/1.1\r\n\r\n",                   "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 2\r\n\r\nhi"),
            ("GET /user-agent HTTP/1.1\r\nUser-Agent: ua\r\n\r\n", "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 2\r\n\r\nua"),
            ("POST /files/a HTTP/1.1\r\nContent-Length: 1\r\n\r\nx", "HTTP/1.1 404 Not Found\r\n\r\n"),
            ("GET /nope HTTP/1.1\r\n\r\n",                      "HTTP/1.1 404 Not Found\r\n\r\n"),
        ];

        let router = Router::default();
        for (raw, expected) in cases {
            let req = parse(raw.as_bytes()).await;
            let mut resp = Response::new();
            router.handle(&req, &mut resp).await;
            assert_eq!(str_op(resp.buffer()), expected);
        }
    }
}
