// Application state module
// Read-only data shared by every connection

use std::path::PathBuf;

use super::types::Config;
use crate::error::ServerError;
use crate::http::MimeTable;

/// Application state
///
/// Built once before the listener starts and shared through `Arc`; nothing
/// in it changes afterwards, so handlers read it without locking.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Canonical form of `config.server.root`
    pub root: PathBuf,
    pub mime: MimeTable,
}

impl AppState {
    /// Create `AppState`, resolving the served directory.
    ///
    /// The root must exist and be a directory.
    pub fn new(config: &Config) -> Result<Self, ServerError> {
        Self::with_mime_table(config, MimeTable::default())
    }

    pub fn with_mime_table(config: &Config, mime: MimeTable) -> Result<Self, ServerError> {
        let configured = &config.server.root;
        let root = configured
            .canonicalize()
            .map_err(|source| ServerError::Root {
                path: configured.clone(),
                source,
            })?;
        if !root.is_dir() {
            return Err(ServerError::Root {
                path: configured.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a directory",
                ),
            });
        }

        Ok(Self {
            config: config.clone(),
            root,
            mime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_canonicalized() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a");
        std::fs::create_dir(&nested).unwrap();

        let cfg = Config::with_root(nested.join("..").join("a"));
        let state = AppState::new(&cfg).unwrap();
        assert_eq!(state.root, nested.canonicalize().unwrap());
    }

    #[test]
    fn test_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::with_root(dir.path().join("nope"));
        assert!(matches!(AppState::new(&cfg), Err(ServerError::Root { .. })));
    }

    #[test]
    fn test_file_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, "x").unwrap();
        let cfg = Config::with_root(file);
        assert!(matches!(AppState::new(&cfg), Err(ServerError::Root { .. })));
    }
}
