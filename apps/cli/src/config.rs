//! Loading configuration, mapping specs and documents from disk

use anyhow::{bail, Context, Result};
use fieldmap_document::{Document, DocumentFormat};
use fieldmap_engine::{EngineConfig, SourceDocument};
use fieldmap_model::MappingSpec;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Deserialize a YAML or JSON file, chosen by extension (JSON otherwise).
fn load_structured<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = match extension(path).as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&text)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?,
        _ => serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?,
    };
    Ok(value)
}

pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => load_structured(path),
        None => Ok(EngineConfig::default()),
    }
}

pub fn load_spec(path: &Path) -> Result<MappingSpec> {
    load_structured(path)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Format from an explicit flag, else from the file extension.
pub fn detect_format(path: &Path, explicit: Option<DocumentFormat>) -> Result<DocumentFormat> {
    if let Some(format) = explicit {
        return Ok(format);
    }
    match extension(path).as_deref() {
        Some("json") => Ok(DocumentFormat::Json),
        Some("xml") => Ok(DocumentFormat::Xml),
        _ => bail!(
            "Cannot tell the format of {}; pass --format json|xml",
            path.display()
        ),
    }
}

pub fn load_document(path: &Path, format: Option<DocumentFormat>) -> Result<Document> {
    let format = detect_format(path, format)?;
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Document::parse(format, &text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// A `--source` argument: `ID=PATH`, or just `PATH` with the file stem as id.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceArg {
    pub id: String,
    pub path: String,
}

impl std::str::FromStr for SourceArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (id, path) = match s.split_once('=') {
            Some((id, path)) => (id.trim().to_string(), path.trim().to_string()),
            None => {
                let id = Path::new(s)
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .unwrap_or(s)
                    .to_string();
                (id, s.to_string())
            }
        };
        if id.is_empty() || path.is_empty() {
            return Err(format!("invalid source '{}', expected ID=PATH or PATH", s));
        }
        Ok(Self { id, path })
    }
}

impl SourceArg {
    pub fn load(&self, format: Option<DocumentFormat>) -> Result<SourceDocument> {
        let document = load_document(Path::new(&self.path), format)?;
        Ok(SourceDocument::new(self.id.clone(), document))
    }
}
