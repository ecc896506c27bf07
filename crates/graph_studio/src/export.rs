//! JSON export of a graph to a local file.

use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;
use serde::Serialize;
use thiserror::Error;

use crate::model::{FileRef, GraphEdge, GraphNode, Timestamp};

/// Used while a new graph has no name yet.
pub const UNNAMED_EXPORT_STEM: &str = "file-network";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize graph: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// Document written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub files: Vec<FileRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    pub exported_at: Timestamp,
}

impl ExportDocument {
    pub fn to_pretty_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Lowercases and replaces every non-alphanumeric character with `_`.
pub fn slug(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                '_'
            }
        })
        .collect()
}

/// `<slug>-<YYYY-MM-DD>.json`, or `file-network-<YYYY-MM-DD>.json` for a blank name.
pub fn export_filename(name: &str, date: NaiveDate) -> String {
    let stem = if name.trim().is_empty() {
        UNNAMED_EXPORT_STEM.to_string()
    } else {
        slug(name)
    };
    format!("{stem}-{}.json", date.format("%Y-%m-%d"))
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn write_json(path: &Path, doc: &ExportDocument) -> Result<(), ExportError> {
    let json = doc.to_pretty_json()?;
    std::fs::write(path, json).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("exported graph to {}", path.display());
    Ok(())
}

/// Asks for a destination and writes the document there.
/// Returns `None` when the dialog was dismissed.
pub fn save_with_dialog(
    filename: &str,
    doc: &ExportDocument,
) -> Result<Option<PathBuf>, ExportError> {
    let Some(path) = rfd::FileDialog::new()
        .set_file_name(filename)
        .add_filter("JSON", &["json"])
        .save_file()
    else {
        return Ok(None);
    };
    write_json(&path, doc)?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    #[test]
    fn filenames() {
        assert_eq!(export_filename("Sales Q1", date()), "sales_q1-2024-05-17.json");
        assert_eq!(export_filename("   ", date()), "file-network-2024-05-17.json");
        assert_eq!(export_filename("a/b:c", date()), "a_b_c-2024-05-17.json");
    }

    #[test]
    fn writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let doc = ExportDocument {
            name: Some("g".into()),
            description: None,
            nodes: vec![],
            edges: vec![],
            files: vec![],
            created_at: None,
            updated_at: None,
            exported_at: Timestamp::now(),
        };
        write_json(&path, &doc).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"name\": \"g\""));
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(v.get("description").is_none());
        assert_eq!(v["nodes"], serde_json::json!([]));
    }
}
