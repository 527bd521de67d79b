use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::html::{escape_text, standalone_page};

const UNTITLED: &str = "Untitled Note";

#[derive(Debug, thiserror::Error)]
pub enum NotesError {
    #[error("failed to read notes export {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid notes export {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A markdown note attached to a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub subject_id: String,
    pub title: String,
    pub content: String,
    /// Milliseconds since the Unix epoch
    pub last_modified: i64,
}

/// A rendered note ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub file_name: String,
    pub title: String,
    pub html: String,
}

/// Either a bare array of notes or the planner's storage object.
#[derive(Deserialize)]
#[serde(untagged)]
enum Export {
    Notes(Vec<Note>),
    Storage { notes: Vec<Note> },
}

impl Note {
    pub fn display_title(&self) -> &str {
        match self.title.trim() {
            "" => UNTITLED,
            title => title,
        }
    }

    /// Render the note content as an HTML fragment.
    pub fn render_body(&self, config: &Config) -> String {
        crate::render_with_config(self.content.as_str(), config)
    }

    /// Filesystem-safe stem derived from the note id.
    pub fn file_stem(&self) -> String {
        let stem: String = self
            .id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if stem.is_empty() { "note".to_string() } else { stem }
    }
}

/// Read notes from a JSON export file.
pub fn load_export(path: &Path) -> Result<Vec<Note>, NotesError> {
    let content = fs::read_to_string(path).map_err(|source| NotesError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let export: Export = serde_json::from_str(&content).map_err(|source| NotesError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let notes = match export {
        Export::Notes(notes) | Export::Storage { notes } => notes,
    };
    tracing::debug!(path = %path.display(), count = notes.len(), "loaded notes export");
    Ok(notes)
}

/// Notes for one subject (or all), most recently modified first.
pub fn select<'a>(notes: &'a [Note], subject: Option<&str>) -> Vec<&'a Note> {
    let mut selected: Vec<&Note> = notes
        .iter()
        .filter(|note| subject.is_none_or(|id| note.subject_id == id))
        .collect();
    selected.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    selected
}

/// Render each note to a standalone page with a unique file name.
pub fn export_pages(notes: &[&Note], config: &Config) -> Vec<Page> {
    let mut used = HashSet::new();
    notes
        .iter()
        .map(|note| {
            let stem = note.file_stem();
            let mut file_name = format!("{}.html", stem);
            let mut suffix = 2;
            while !used.insert(file_name.clone()) {
                file_name = format!("{}-{}.html", stem, suffix);
                suffix += 1;
            }

            let title = note.display_title().to_string();
            let html = standalone_page(&title, &note.render_body(config));
            Page {
                file_name,
                title,
                html,
            }
        })
        .collect()
}

/// Index page linking every exported page in order.
pub fn index_page(pages: &[Page]) -> String {
    let mut body = String::from("<h1>Study Notes</h1>");
    if pages.is_empty() {
        body.push_str("<p>No notes found.</p>");
    } else {
        body.push_str("<ul>");
        for page in pages {
            // File names only contain [A-Za-z0-9_.-]
            body.push_str(&format!("<li><a href=\"{}\">", page.file_name));
            escape_text(&page.title, &mut body);
            body.push_str("</a></li>");
        }
        body.push_str("</ul>");
    }
    standalone_page("Study Notes", &body)
}
