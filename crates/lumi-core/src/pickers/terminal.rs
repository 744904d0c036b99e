//! Line-based pickers for terminals.
//!
//! Prompts go to stderr, answers are read line by line. For save dialogs an
//! empty answer accepts the suggested path; `-` or end of input cancels. For
//! open dialogs an empty answer or end of input cancels.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use crate::error::Result;

use super::{FilePickers, OpenDialog, SaveDialog};

/// Pickers prompting on a terminal.
#[derive(Debug)]
pub struct TerminalPickers<R = BufReader<Stdin>> {
    lines: Mutex<Lines<R>>,
}

impl TerminalPickers {
    /// Pickers reading answers from stdin.
    #[must_use]
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin + Send> TerminalPickers<R> {
    /// Pickers reading answers from `reader`.
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
        }
    }

    async fn ask(&self, prompt: &str) -> Result<Option<String>> {
        eprint!("{prompt}");
        let line = self.lines.lock().await.next_line().await?;
        Ok(line.map(|l| l.trim().to_string()))
    }
}

fn resolve(base: &Path, answer: &str) -> PathBuf {
    let path = PathBuf::from(answer);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> FilePickers for TerminalPickers<R> {
    async fn save_file(&self, dialog: SaveDialog) -> Result<Option<PathBuf>> {
        let prompt = format!(
            "{} ({}) [{}]: ",
            dialog.title,
            dialog.format_name,
            dialog.suggested_path.display()
        );
        let base = dialog
            .suggested_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        Ok(match self.ask(&prompt).await?.as_deref() {
            None | Some("-") => None,
            Some("") => Some(dialog.suggested_path),
            Some(answer) => Some(resolve(&base, answer)),
        })
    }

    async fn open_single_file(&self, dialog: OpenDialog) -> Result<Option<PathBuf>> {
        let prompt = format!(
            "Open {} (*.{}) from {}: ",
            dialog.format_name,
            dialog.extensions.join(", *."),
            dialog.default_directory.display()
        );

        loop {
            match self.ask(&prompt).await?.as_deref() {
                None | Some("") => return Ok(None),
                Some(answer) => {
                    let path = resolve(&dialog.default_directory, answer);
                    if dialog.accepts(&path) {
                        return Ok(Some(path));
                    }
                    eprintln!("  {} is not a {} file", path.display(), dialog.format_name);
                }
            }
        }
    }

    async fn open_multiple_files(&self, dialog: OpenDialog) -> Result<Option<Vec<PathBuf>>> {
        eprintln!(
            "Open {} files from {} (one per line, empty line to finish):",
            dialog.format_name,
            dialog.default_directory.display()
        );

        let mut paths = Vec::new();
        while let Some(answer) = self.ask("  > ").await? {
            if answer.is_empty() {
                break;
            }
            let path = resolve(&dialog.default_directory, &answer);
            if dialog.accepts(&path) {
                paths.push(path);
            } else {
                eprintln!("  skipping {}", path.display());
            }
        }

        Ok((!paths.is_empty()).then_some(paths))
    }
}
