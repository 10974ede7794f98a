//! Document loading from files, directories and seed manifests.

use crate::types::{Category, Document, Metadata};
use pqrs_core::{AppError, AppResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Content type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Markdown,
    Html,
    PlainText,
    Other,
}

impl ContentType {
    /// Detect content type from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("md") | Some("markdown") => Self::Markdown,
            Some("html") | Some("htm") => Self::Html,
            Some("txt") => Self::PlainText,
            _ => Self::Other,
        }
    }

    /// MIME-style name recorded in document metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "text/markdown",
            Self::Html => "text/html",
            Self::PlainText => "text/plain",
            Self::Other => "application/octet-stream",
        }
    }
}

/// Load one file as a document.
///
/// Text formats are decoded as UTF-8 (markdown and HTML are stripped of
/// markup); anything else gets a short descriptive body. The title defaults
/// to the file name.
pub fn load_file(
    path: &Path,
    title: Option<&str>,
    category: Category,
    metadata: Metadata,
) -> AppResult<Document> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());
    let content_type = ContentType::from_path(path);
    let size = bytes.len();

    let body = match content_type {
        ContentType::Other => format!(
            "Archivo: {}\nTipo: {}\nTamaño: {} bytes",
            filename,
            content_type.as_str(),
            size
        ),
        _ => {
            let raw = String::from_utf8(bytes).map_err(|_| {
                AppError::Validation(format!("{:?} is not valid UTF-8 text", path))
            })?;
            match content_type {
                ContentType::Markdown => clean_markdown(&raw),
                ContentType::Html => clean_html(&raw),
                _ => raw,
            }
        }
    };

    let mut metadata = metadata;
    metadata.insert("filename".to_string(), filename.clone().into());
    metadata.insert("content_type".to_string(), content_type.as_str().into());
    metadata.insert("size".to_string(), size.into());

    tracing::debug!("Loaded {:?} as {} ({} bytes)", path, content_type.as_str(), size);

    Document::new(title.unwrap_or(&filename), body, category, metadata)
}

/// Expand files and directories into the list of files to ingest.
///
/// Directories are walked recursively; hidden entries are skipped.
pub fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            files.extend(
                WalkDir::new(path)
                    .follow_links(false)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .map(|e| e.into_path()),
            );
        } else {
            tracing::warn!("Skipping missing path: {:?}", path);
        }
    }

    files
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// One document in a seed manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub title: String,
    pub category: Category,

    /// Inline body
    #[serde(default)]
    pub body: Option<String>,

    /// File to read the body from, relative to the manifest
    #[serde(default)]
    pub file: Option<PathBuf>,

    #[serde(default)]
    pub metadata: Metadata,
}

/// Load every document listed in a YAML or JSON manifest.
///
/// Entries whose `file` does not exist are skipped with a warning.
pub fn load_manifest(path: &Path) -> AppResult<Vec<Document>> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to read manifest {:?}: {}", path, e)))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let entries: Vec<ManifestEntry> = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut documents = Vec::with_capacity(entries.len());

    for entry in entries {
        match (entry.body, entry.file) {
            (Some(body), _) => {
                documents.push(Document::new(
                    entry.title,
                    body.trim().to_string(),
                    entry.category,
                    entry.metadata,
                )?);
            }
            (None, Some(file)) => {
                let file = base_dir.join(file);
                if !file.exists() {
                    tracing::warn!(title = %entry.title, "Manifest file not found: {:?}", file);
                    continue;
                }
                documents.push(load_file(
                    &file,
                    Some(&entry.title),
                    entry.category,
                    entry.metadata,
                )?);
            }
            (None, None) => {
                return Err(AppError::Validation(format!(
                    "Manifest entry '{}' needs a body or a file",
                    entry.title
                )));
            }
        }
    }

    tracing::debug!("Loaded {} documents from manifest {:?}", documents.len(), path);
    Ok(documents)
}

/// Strip markdown headers, fences and rules, keeping the prose.
fn clean_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in text.lines() {
        let trimmed = line.trim_start_matches('#').trim();

        if trimmed.starts_with("---") || trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            continue;
        }

        if !trimmed.is_empty() {
            result.push_str(trimmed);
            result.push('\n');
        }
    }

    result.trim().to_string()
}

/// Strip HTML tags, dropping script and style contents.
fn clean_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    let mut skip_until: Option<&str> = None;

    for (i, ch) in text.char_indices() {
        let rest = &text[i..];

        if let Some(closing) = skip_until {
            if starts_with_ignore_case(rest, closing) {
                skip_until = None;
                in_tag = true;
            }
            continue;
        }

        match ch {
            '<' => {
                in_tag = true;
                if starts_with_ignore_case(rest, "<script") {
                    skip_until = Some("</script");
                } else if starts_with_ignore_case(rest, "<style") {
                    skip_until = Some("</style");
                }
            }
            '>' if in_tag => {
                in_tag = false;
                result.push(' ');
            }
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
