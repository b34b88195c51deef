//! Immutable server configuration.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Settings shared read-only by every connection.
///
/// Built once at startup and moved into the [`Router`](crate::Router).
/// Without a base directory the `/files/` routes are disabled and answer
/// `404 Not Found`.
///
/// # Examples
/// ```no_run
/// use hearth_http::ServerConfig;
///
/// let config = ServerConfig::with_directory("/tmp/uploads").unwrap();
/// assert!(config.directory().unwrap().is_absolute());
///
/// assert!(ServerConfig::default().directory().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
    directory: Option<PathBuf>,
}

impl ServerConfig {
    /// Enables the `/files/` routes rooted at `path`.
    ///
    /// The directory is created if missing and stored in canonical form, so
    /// containment checks compare against the real location.
    pub fn with_directory<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        fs::create_dir_all(path)?;

        Ok(Self {
            directory: Some(fs::canonicalize(path)?),
        })
    }

    /// Returns the canonical base directory, if one is configured.
    #[inline]
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }
}
