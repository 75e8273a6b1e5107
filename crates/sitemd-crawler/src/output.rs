use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::OutputError;
use crate::result::PageResult;

/// Longest file stem written to disk.
const MAX_FILE_STEM_LEN: usize = 200;

/// Storage key of a URL: every character outside `[A-Za-z0-9]` becomes `_`,
/// and the result is lowercased.
///
/// ```
/// assert_eq!(
///     sitemd_crawler::output::storage_key("https://Example.com/docs"),
///     "https___example_com_docs"
/// );
/// ```
pub fn storage_key(url: &str) -> String {
    url.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() {
                ch.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn file_name(key: &str) -> String {
    let stem: String = if key.is_empty() {
        "index".to_string()
    } else {
        key.chars().take(MAX_FILE_STEM_LEN).collect()
    };
    format!("{}.md", stem)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    Directory(PathBuf),
}

/// Persists crawled Markdown either as one file per page or on stdout.
#[derive(Debug, Clone)]
pub struct MarkdownWriter {
    target: OutputTarget,
}

impl MarkdownWriter {
    pub fn stdout() -> Self {
        Self {
            target: OutputTarget::Stdout,
        }
    }

    /// Writer into `dir`, created if missing.
    pub fn directory(dir: impl AsRef<Path>) -> Result<Self, OutputError> {
        let dir = dir.as_ref();
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| OutputError::io(dir, e))?;
            tracing::info!("Created output directory: {:?}", dir);
        } else if !dir.is_dir() {
            return Err(OutputError::NotADirectory(dir.to_path_buf()));
        }

        Ok(Self {
            target: OutputTarget::Directory(dir.to_path_buf()),
        })
    }

    pub fn target(&self) -> &OutputTarget {
        &self.target
    }

    pub fn write_page(&self, page: &PageResult) -> Result<(), OutputError> {
        self.write_document(&storage_key(&page.url), &page.markdown)
    }

    /// Writes `markdown` under the file name derived from `key`.
    pub fn write_document(&self, key: &str, markdown: &str) -> Result<(), OutputError> {
        let name = file_name(key);

        match &self.target {
            OutputTarget::Directory(dir) => {
                let path = dir.join(&name);
                tracing::info!("Saving markdown to: {:?}", path);
                fs::write(&path, markdown).map_err(|e| OutputError::io(&path, e))?;
                tracing::debug!("Successfully wrote {} bytes to {:?}", markdown.len(), path);
                Ok(())
            }
            OutputTarget::Stdout => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                write_with_header(&mut handle, &name, markdown)
                    .map_err(|e| OutputError::io("<stdout>", e))
            }
        }
    }
}

fn write_with_header<W: Write>(out: &mut W, name: &str, markdown: &str) -> io::Result<()> {
    writeln!(out, "Filename: {} --", name)?;
    out.write_all(markdown.as_bytes())?;
    writeln!(out)?;
    out.flush()
}
