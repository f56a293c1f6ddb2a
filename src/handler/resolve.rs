//! Path resolution module
//!
//! Maps a request path onto the served directory. Nothing outside the root
//! is ever returned: `..` segments that climb above it and symlinks that
//! point out of it both resolve to `NotFound`.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tokio::fs;

use crate::logger;

/// A regular file beneath the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTarget {
    /// Canonical absolute path
    pub path: PathBuf,
    /// Path as named by the request, before symlinks are followed; its
    /// extension picks the content type
    pub requested: PathBuf,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// Outcome of mapping a request path onto the filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    File(FileTarget),
    /// Directory without an index file; answered with a listing
    Directory(PathBuf),
    /// Directory named without its trailing `/`; answered with a redirect
    AddSlash,
    NotFound,
}

/// Resolve `url_path` against `root`.
///
/// `root` must already be canonical. Directories are answered with the
/// first entry of `index_files` that is a regular file, if any, but only
/// once the request path ends in `/` so relative links resolve inside them.
pub async fn resolve(root: &Path, url_path: &str, index_files: &[String]) -> ResolvedTarget {
    let Some(segments) = normalize(url_path) else {
        logger::log_warning(&format!("Path traversal attempt blocked: {url_path}"));
        return ResolvedTarget::NotFound;
    };

    let candidate = segments.iter().fold(root.to_path_buf(), |p, s| p.join(s));

    // File not found is common (404), no need to log
    let Ok(canonical) = fs::canonicalize(&candidate).await else {
        return ResolvedTarget::NotFound;
    };
    if !canonical.starts_with(root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            url_path,
            canonical.display()
        ));
        return ResolvedTarget::NotFound;
    }

    let Ok(metadata) = fs::metadata(&canonical).await else {
        return ResolvedTarget::NotFound;
    };

    if metadata.is_dir() {
        if !request_path(url_path).ends_with('/') {
            return ResolvedTarget::AddSlash;
        }
        for index_file in index_files {
            if let Some(target) = index_target(root, &canonical, index_file).await {
                return ResolvedTarget::File(target);
            }
        }
        return ResolvedTarget::Directory(canonical);
    }

    // "/file.html/" names a directory that does not exist
    if metadata.is_file() && !request_path(url_path).ends_with('/') {
        return ResolvedTarget::File(FileTarget {
            path: canonical,
            requested: candidate,
            size: metadata.len(),
            modified: metadata.modified().ok(),
        });
    }

    ResolvedTarget::NotFound
}

/// Index file of `dir`, if it is a regular file that stays inside `root`
async fn index_target(root: &Path, dir: &Path, index_file: &str) -> Option<FileTarget> {
    let requested = dir.join(index_file);
    let path = fs::canonicalize(&requested).await.ok()?;
    if !path.starts_with(root) {
        return None;
    }
    let metadata = fs::metadata(&path).await.ok()?;
    metadata.is_file().then(|| FileTarget {
        path,
        requested,
        size: metadata.len(),
        modified: metadata.modified().ok(),
    })
}

/// Path part of a request target, without query string or fragment
fn request_path(url_path: &str) -> &str {
    let end = url_path.find(['?', '#']).unwrap_or(url_path.len());
    &url_path[..end]
}

/// Decode and normalize a request path into safe relative segments.
///
/// Returns `None` when the path cannot be decoded, contains segments that
/// are unsafe on disk, or climbs above the root.
pub fn normalize(url_path: &str) -> Option<Vec<String>> {
    let decoded = urlencoding::decode(request_path(url_path)).ok()?;

    let mut segments: Vec<String> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            s if s.contains(['\0', '\\']) => return None,
            s => segments.push(s.to_string()),
        }
    }
    Some(segments)
}
