//! Route handlers. Each one completes the response it is given.

use crate::{
    files::{self, FileError},
    http::{request::Request, response::Handled, response::Response, types::StatusCode},
};
use std::path::Path;

pub(crate) fn root(resp: &mut Response) -> Handled {
    resp.status(StatusCode::Ok).finish()
}

pub(crate) fn not_found(resp: &mut Response) -> Handled {
    resp.status(StatusCode::NotFound).finish()
}

/// Sends the target remainder back unchanged.
pub(crate) fn echo(value: &[u8], resp: &mut Response) -> Handled {
    resp.status(StatusCode::Ok)
        .header("Content-Type", "text/plain")
        .body(value)
}

/// Reflects the `User-Agent` header, or an empty body if there is none.
pub(crate) fn user_agent(req: &Request, resp: &mut Response) -> Handled {
    resp.status(StatusCode::Ok)
        .header("Content-Type", "text/plain")
        .body(req.header("user-agent").unwrap_or_default())
}

/// `GET /files/{name}`
///
/// Traversal attempts are answered exactly like missing files.
pub(crate) async fn file_read(dir: &Path, raw_name: &[u8], resp: &mut Response) -> Handled {
    let Some(name) = files::decode_name(raw_name) else {
        return not_found(resp);
    };

    match files::read_file(dir, &name).await {
        Ok(content) => resp
            .status(StatusCode::Ok)
            .header("Content-Type", "application/octet-stream")
            .body(content),
        Err(FileError::Traversal) => {
            tracing::debug!(name = %name, "rejected read outside the base directory");
            not_found(resp)
        }
        Err(FileError::NotFound) => not_found(resp),
        Err(FileError::Io(err)) => {
            tracing::error!(name = %name, error = %err, "file read failed");
            server_error(resp)
        }
    }
}

/// `POST /files/{name}`
///
/// A missing or invalid `Content-Length` is rejected before the filesystem is touched.
pub(crate) async fn file_write(
    dir: &Path,
    raw_name: &[u8],
    req: &Request,
    resp: &mut Response,
) -> Handled {
    if req.content_length().is_none() {
        return resp.status(StatusCode::BadRequest).finish();
    }

    let Some(name) = files::decode_name(raw_name) else {
        return forbidden(resp);
    };

    match files::write_file(dir, &name, req.body().to_vec()).await {
        Ok(()) => resp.status(StatusCode::Created).finish(),
        Err(FileError::Traversal) => {
            tracing::debug!(name = %name, "rejected write outside the base directory");
            forbidden(resp)
        }
        Err(FileError::NotFound) => not_found(resp),
        Err(FileError::Io(err)) => {
            tracing::error!(name = %name, error = %err, "file write failed");
            server_error(resp)
        }
    }
}

#[inline]
fn forbidden(resp: &mut Response) -> Handled {
    resp.status(StatusCode::Forbidden).finish()
}

#[inline]
fn server_error(resp: &mut Response) -> Handled {
    resp.status(StatusCode::InternalServerError).body("")
}
