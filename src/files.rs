//! Path resolution and I/O under the base directory.
//!
//! Names arrive as the raw `/files/` remainder. They are percent-decoded,
//! normalized lexically, and then checked again after symlinks are resolved.
//! Nothing outside the base directory is ever read or created.

use std::{
    borrow::Cow,
    io::{self, Write},
    path::{Component, Path, PathBuf},
};
use thiserror::Error;
use tokio::{fs, task};

#[derive(Debug, Error)]
pub(crate) enum FileError {
    #[error("path escapes the base directory")]
    Traversal,
    #[error("file not found")]
    NotFound,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Percent-decodes a raw target remainder into a file name.
///
/// Returns `None` if the decoded bytes are not UTF-8.
pub(crate) fn decode_name(raw: &[u8]) -> Option<String> {
    match urlencoding::decode_binary(raw) {
        Cow::Borrowed(bytes) => simdutf8::basic::from_utf8(bytes).ok().map(str::to_owned),
        Cow::Owned(bytes) => String::from_utf8(bytes).ok(),
    }
}

/// Lexically normalizes `name` into a path relative to the base directory.
///
/// `.` segments and repeated separators are dropped and `..` removes the
/// previous segment. Returns `None` if `..` climbs above the base, or the
/// name is absolute or contains a NUL byte. An empty result addresses the
/// base directory itself.
pub(crate) fn relative_path(name: &str) -> Option<PathBuf> {
    if name.contains('\0') {
        return None;
    }

    let mut rel = PathBuf::new();
    for comp in Path::new(name).components() {
        match comp {
            Component::Normal(s) => rel.push(s),
            Component::CurDir => {}
            Component::ParentDir => {
                if !rel.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(rel)
}

/// Reads a regular file below `base`.
///
/// `base` must be canonical. Symlinks are followed only while they stay inside it.
pub(crate) async fn read_file(base: &Path, name: &str) -> Result<Vec<u8>, FileError> {
    let rel = relative_path(name).ok_or(FileError::Traversal)?;
    if rel.as_os_str().is_empty() {
        return Err(FileError::NotFound);
    }

    let path = match fs::canonicalize(base.join(rel)).await {
        Ok(path) => path,
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => return Err(err.into()),
        Err(_) => return Err(FileError::NotFound),
    };
    if !path.starts_with(base) {
        return Err(FileError::Traversal);
    }

    if !fs::metadata(&path).await.map_err(not_found)?.is_file() {
        return Err(FileError::NotFound);
    }
    fs::read(&path).await.map_err(not_found)
}

/// Creates or replaces a file below `base` with `body`.
///
/// The content goes to a temporary file in the target directory first and is
/// renamed over the target, so concurrent readers see either the old or the
/// new content in full. Missing parent directories are created. A new file gets
/// the usual mode (`0o666` less the umask), a replaced one keeps its mode.
pub(crate) async fn write_file(base: &Path, name: &str, body: Vec<u8>) -> Result<(), FileError> {
    let rel = relative_path(name)
        .filter(|rel| !rel.as_os_str().is_empty())
        .ok_or(FileError::Traversal)?;
    let base = base.to_path_buf();

    task::spawn_blocking(move || write_atomic(&base, &rel, &body))
        .await
        .map_err(io::Error::other)?
}

fn write_atomic(base: &Path, rel: &Path, body: &[u8]) -> Result<(), FileError> {
    let path = base.join(rel);
    let (Some(parent), Some(file_name)) = (path.parent(), path.file_name()) else {
        return Err(FileError::Traversal);
    };

    // Check before creating anything, then again once the parent exists.
    if let Some(existing) = parent.ancestors().find(|dir| dir.exists()) {
        ensure_inside(base, existing)?;
    }
    std::fs::create_dir_all(parent)?;
    let parent = ensure_inside(base, parent)?;

    let target = parent.join(file_name);

    let mut builder = tempfile::Builder::new();
    builder.prefix(".upload-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    let mut file = builder.tempfile_in(&parent)?;
    match std::fs::symlink_metadata(&target) {
        Ok(meta) if meta.is_file() => file.as_file().set_permissions(meta.permissions())?,
        _ => {}
    }
    file.write_all(body)?;
    file.as_file().sync_all()?;
    file.persist(target)
        .map_err(|err| FileError::Io(err.error))?;

    Ok(())
}

fn ensure_inside(base: &Path, dir: &Path) -> Result<PathBuf, FileError> {
    let real = std::fs::canonicalize(dir)?;
    match real.starts_with(base) {
        true => Ok(real),
        false => Err(FileError::Traversal),
    }
}

#[inline]
fn not_found(err: io::Error) -> FileError {
    match err.kind() {
        io::ErrorKind::NotFound => FileError::NotFound,
        _ => FileError::Io(err),
    }
}
