//! Directory listing module
//!
//! Renders the HTML page returned for a directory that has no index file.

use std::fmt::Write as _;
use std::io;
use std::path::Path;

use tokio::fs;

/// One row of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl ListingEntry {
    /// Relative link target; directories keep a trailing slash
    fn href(&self) -> String {
        let encoded = urlencoding::encode(&self.name);
        if self.is_dir {
            format!("{encoded}/")
        } else {
            encoded.into_owned()
        }
    }

    fn display_name(&self) -> String {
        if self.is_symlink {
            format!("{}@", self.name)
        } else if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Read the immediate entries of `dir`, sorted case-insensitively
pub async fn read_entries(dir: &Path) -> io::Result<Vec<ListingEntry>> {
    let mut reader = fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let is_symlink = entry
            .file_type()
            .await
            .is_ok_and(|t| t.is_symlink());
        // Follows symlinks, so a link to a directory lists as one
        let is_dir = fs::metadata(entry.path())
            .await
            .is_ok_and(|m| m.is_dir());
        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
            is_symlink,
        });
    }

    entries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(entries)
}

/// Render the listing page for `url_path`, which ends in `/`
pub fn render(url_path: &str, entries: &[ListingEntry]) -> String {
    let display_path = urlencoding::decode(url_path)
        .map_or_else(|_| url_path.to_string(), std::borrow::Cow::into_owned);
    let title = format!("Directory listing for {}", escape_html(&display_path));

    let mut html = String::with_capacity(256 + entries.len() * 64);
    html.push_str("<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{title}</title>\n</head>\n<body>");
    let _ = writeln!(html, "<h1>{title}</h1>\n<hr>\n<ul>");
    for entry in entries {
        let _ = writeln!(
            html,
            "<li><a href=\"{}\">{}</a></li>",
            escape_html(&entry.href()),
            escape_html(&entry.display_name())
        );
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    html
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> ListingEntry {
        ListingEntry {
            name: name.to_string(),
            is_dir: false,
            is_symlink: false,
        }
    }

    #[test]
    fn test_render_links_entries() {
        let entries = vec![
            file("a.html"),
            ListingEntry {
                name: "img".to_string(),
                is_dir: true,
                is_symlink: false,
            },
        ];
        let html = render("/docs/", &entries);
        assert!(html.contains("<title>Directory listing for /docs/</title>"));
        assert!(html.contains("<li><a href=\"a.html\">a.html</a></li>"));
        assert!(html.contains("<li><a href=\"img/\">img/</a></li>"));
    }

    #[test]
    fn test_render_escapes_and_encodes_names() {
        let html = render("/", &[file("<b>&x.txt"), file("my file.txt")]);
        assert!(html.contains("&lt;b&gt;&amp;x.txt</a>"));
        assert!(html.contains("href=\"%3Cb%3E%26x.txt\""));
        assert!(html.contains("href=\"my%20file.txt\""));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_render_decodes_title() {
        let html = render("/my%20dir/", &[]);
        assert!(html.contains("Directory listing for /my dir/"));
    }

    #[test]
    fn test_symlink_display() {
        let entry = ListingEntry {
            name: "current".to_string(),
            is_dir: true,
            is_symlink: true,
        };
        assert_eq!(entry.display_name(), "current@");
        assert_eq!(entry.href(), "current/");
    }

    #[tokio::test]
    async fn test_read_entries_sorted_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::write(dir.path().join("A.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("c")).unwrap();

        let entries = read_entries(dir.path()).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A.txt", "b.txt", "c"]);
        assert!(entries[2].is_dir);
        assert!(!entries[0].is_dir);
    }

    #[tokio::test]
    async fn test_read_entries_missing_dir_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_entries(&dir.path().join("gone")).await.is_err());
    }
}
