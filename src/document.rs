//! Markdown document model
//!
//! Source text, the file it came from, and whether it has unsaved changes.
//! Files are read and written verbatim as UTF-8.

use crate::error::{Error, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Content of a new, unsaved document.
pub const WELCOME_MARKDOWN: &str = r#"# Welcome to Styledown

Styledown is a **what you see is what you get** markdown editor with *styles you control*.

## What you can do

- Edit rendered text directly and the markdown follows
- Restyle any element type and share the stylesheet as JSON
- Type in the source pane and watch the preview catch up

### Code

```rust
let greeting = "Hello, World!";
println!("{greeting}");
```

> Quotes have a style of their own.

Inline `code` sits inside ordinary paragraphs.

---

#### Smaller headings

##### Level five

###### Level six

### Formatting

Mix **bold**, *italic*, ***both***, ~~strikethrough~~ and `code` freely.

### Links

Read the [CommonMark spec](https://commonmark.org) or jump back to [the top](#welcome-to-styledown).

### Tasks

- [x] Headings and paragraphs
- [x] Emphasis and code
- [ ] Footnotes

### Steps

1. Open a file
2. Click a paragraph
3. Start typing

### Table

| Element    | Editable | Notes              |
|------------|----------|--------------------|
| Paragraph  | Yes      | Inline formatting  |
| Table cell | Yes      | One cell at a time |

### HTML

Inline <em>HTML</em> shows as written.

<div class="note">
HTML blocks show as code.
</div>
"#;

/// A markdown file being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownDocument {
    pub source_text: String,
    pub path: Option<PathBuf>,
    pub is_dirty: bool,
}

impl Default for MarkdownDocument {
    fn default() -> Self {
        Self::new(WELCOME_MARKDOWN)
    }
}

impl MarkdownDocument {
    /// Unsaved document with `source_text`.
    pub fn new(source_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            path: None,
            is_dirty: false,
        }
    }

    /// Read a document from disk. Never dirty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source_text = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        info!("Opened document: {}", path.display());
        Ok(Self {
            source_text,
            path: Some(path.to_path_buf()),
            is_dirty: false,
        })
    }

    /// File name, or "Untitled" for a document that was never saved.
    pub fn display_name(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("Untitled")
            .to_string()
    }

    /// Write to the current path. The dirty flag only clears on success.
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(Error::NoDocumentPath)?;
        self.write_to(&path)
    }

    /// Write to `path` and adopt it as the document's path.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        self.write_to(&path)?;
        self.path = Some(path);
        Ok(())
    }

    /// Replace the text with what is on disk.
    pub fn revert(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(Error::NoDocumentPath)?;
        *self = Self::open(path)?;
        Ok(())
    }

    fn write_to(&mut self, path: &Path) -> Result<()> {
        fs::write(path, &self.source_text).map_err(|e| Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.is_dirty = false;
        info!("Saved document: {}", path.display());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_document_is_untitled_welcome() {
        let doc = MarkdownDocument::default();
        assert_eq!(doc.display_name(), "Untitled");
        assert!(doc.source_text.starts_with("# Welcome to Styledown"));
        assert!(!doc.is_dirty);
    }

    #[test]
    fn test_open_and_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "# Notes\n").unwrap();

        let mut doc = MarkdownDocument::open(&path).unwrap();
        assert_eq!(doc.display_name(), "notes.md");
        assert_eq!(doc.source_text, "# Notes\n");

        doc.source_text.push_str("\nmore\n");
        doc.is_dirty = true;
        doc.save().unwrap();
        assert!(!doc.is_dirty);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Notes\n\nmore\n");
    }

    #[test]
    fn test_open_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = MarkdownDocument::open(dir.path().join("missing.md")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[test]
    fn test_save_without_path() {
        let mut doc = MarkdownDocument::new("text");
        doc.is_dirty = true;
        assert!(matches!(doc.save(), Err(Error::NoDocumentPath)));
        assert!(doc.is_dirty);
    }

    #[test]
    fn test_failed_save_keeps_dirty_flag() {
        let dir = TempDir::new().unwrap();
        let mut doc = MarkdownDocument::new("text");
        doc.path = Some(dir.path().join("no-such-dir").join("doc.md"));
        doc.is_dirty = true;
        assert!(matches!(doc.save(), Err(Error::FileWrite { .. })));
        assert!(doc.is_dirty);
    }

    #[test]
    fn test_save_as_then_revert() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("copy.md");
        let mut doc = MarkdownDocument::new("original");
        doc.save_as(&path).unwrap();
        assert_eq!(doc.path.as_deref(), Some(path.as_path()));

        doc.source_text = "changed".into();
        doc.is_dirty = true;
        doc.revert().unwrap();
        assert_eq!(doc.source_text, "original");
        assert!(!doc.is_dirty);
    }
}
