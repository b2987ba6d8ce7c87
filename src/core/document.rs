//! The markdown document shown in the viewer

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Markdown loaded into a fresh viewer
pub const WELCOME_MARKDOWN: &str = r#"# Welcome to the Markdown Viewer

This is a simple markdown viewer that supports all the common markdown syntax.

## Features

- **Bold** and *italic* text
- Lists (ordered and unordered)
- [Links](https://example.com)
- Code blocks
- And more!

### Code Example

```js
function greeting() {
  console.log("Hello, world!");
}
```

> This is a blockquote. It can span multiple lines and can contain other markdown elements.

#### Table Example

| Name | Description |
| ---- | ----------- |
| Item 1 | Description of item 1 |
| Item 2 | Description of item 2 |

Try editing this markdown to see the changes in real-time!
"#;

/// A markdown document
#[derive(Debug, Clone)]
pub struct Document {
    /// File the document was opened from or last saved to
    pub path: Option<PathBuf>,
    /// Markdown source
    pub content: String,
    /// Whether the document has unsaved changes
    pub modified: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::welcome()
    }
}

impl Document {
    /// Create an unsaved document with the given content
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            path: None,
            content: content.into(),
            modified: false,
        }
    }

    /// The built-in welcome document
    pub fn welcome() -> Self {
        Self::new(WELCOME_MARKDOWN)
    }

    /// Open a document from a file
    pub fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            content,
            modified: false,
        })
    }

    /// Save the document to its path
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Document has no file path"))?;
        self.save_as(&path)
    }

    /// Save the document to a new path and remember it
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        fs::write(path, &self.content)
            .with_context(|| format!("Failed to save file: {}", path.display()))?;
        tracing::info!("Saved document: {}", path.display());

        self.path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    /// Get the document title (first heading, file name, or "Untitled")
    pub fn title(&self) -> String {
        self.content
            .lines()
            .find_map(|line| line.strip_prefix("# "))
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .or_else(|| {
                self.path
                    .as_ref()
                    .and_then(|p| p.file_stem())
                    .map(|s| s.to_string_lossy().to_string())
            })
            .unwrap_or_else(|| "Untitled".to_string())
    }

    /// Update content and mark as modified
    pub fn set_content(&mut self, content: String) {
        if self.content != content {
            self.content = content;
            self.modified = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_heading() {
        let doc = Document::welcome();
        assert_eq!(doc.title(), "Welcome to the Markdown Viewer");
    }

    #[test]
    fn test_title_fallbacks() {
        assert_eq!(Document::new("no heading here").title(), "Untitled");

        let mut doc = Document::new("plain");
        doc.path = Some(PathBuf::from("/tmp/notes.md"));
        assert_eq!(doc.title(), "notes");
    }

    #[test]
    fn test_set_content_marks_modified() {
        let mut doc = Document::new("a");
        doc.set_content("a".to_string());
        assert!(!doc.modified);
        doc.set_content("b".to_string());
        assert!(doc.modified);
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");

        let mut doc = Document::new("# Saved\n");
        doc.modified = true;
        assert!(doc.save().is_err());

        doc.save_as(&path).unwrap();
        assert!(!doc.modified);

        let reopened = Document::open(&path).unwrap();
        assert_eq!(reopened.content, "# Saved\n");
        assert_eq!(reopened.path.as_deref(), Some(path.as_path()));
    }
}
