//! MIME type detection module
//!
//! Maps file extensions to the `Content-Type` sent with file responses.

use std::collections::HashMap;
use std::path::Path;

/// Content type for anything the table does not know
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Extension to MIME type entries served by default.
///
/// Keys carry the leading dot; the empty key is the fallback.
const DEFAULT_ENTRIES: &[(&str, &str)] = &[
    (".manifest", "text/cache-manifest"),
    (".html", "text/html"),
    (".png", "image/png"),
    (".jpg", "image/jpg"),
    (".svg", "image/svg+xml"),
    (".css", "text/css"),
    (".js", "application/x-javascript"),
    ("", DEFAULT_CONTENT_TYPE),
];

/// Immutable extension to MIME type table
#[derive(Debug, Clone)]
pub struct MimeTable {
    entries: HashMap<String, String>,
}

impl MimeTable {
    /// Build a table from `(extension, mime)` pairs.
    ///
    /// A missing `""` entry is filled with `application/octet-stream`.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: HashMap<String, String> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        entries
            .entry(String::new())
            .or_insert_with(|| DEFAULT_CONTENT_TYPE.to_string());
        Self { entries }
    }

    /// Look up the MIME type for an extension such as `".html"`.
    ///
    /// Matching is exact and case-sensitive. Unknown extensions get the
    /// value registered under the empty key.
    ///
    /// # Examples
    /// ```
    /// use servedir::http::mime::MimeTable;
    /// let table = MimeTable::default();
    /// assert_eq!(table.lookup(".html"), "text/html");
    /// assert_eq!(table.lookup(".xyz"), "application/octet-stream");
    /// ```
    pub fn lookup(&self, extension: &str) -> &str {
        self.entries
            .get(extension)
            .or_else(|| self.entries.get(""))
            .map_or(DEFAULT_CONTENT_TYPE, String::as_str)
    }

    /// MIME type for a file path.
    ///
    /// Tries the extension as written, then lowercased, then the default.
    pub fn for_path(&self, path: &Path) -> &str {
        let extension = extension_of(path);
        if let Some(mime) = self.entries.get(&extension) {
            return mime;
        }
        self.lookup(&extension.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MimeTable {
    fn default() -> Self {
        Self::from_entries(DEFAULT_ENTRIES.iter().copied())
    }
}

/// Extension of the final path component, including the dot.
///
/// Names that only start with a dot (`.bashrc`) have no extension.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
