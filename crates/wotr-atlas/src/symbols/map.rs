//! The symbol map: template filename to symbol metadata.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::naming::{check_template_name, NamingViolation};
use crate::error::{AtlasError, Result};

/// Metadata describing one symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolMeta {
    /// Human readable name, e.g. `Swords`.
    pub name: String,
    /// Unicode glyph written into region text, e.g. `⚔`.
    pub glyph: String,
    /// Short identifier, e.g. `SWORDS`.
    pub token: String,
    pub description: String,
}

/// Symbol map loaded from `symbols_map.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SymbolMap {
    entries: BTreeMap<String, SymbolMeta>,
}

/// A problem found while linting a symbol directory against its map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SymbolIssue {
    BadName {
        filename: String,
        violation: NamingViolation,
    },
    MissingTemplate {
        filename: String,
        path: PathBuf,
    },
    EmptyGlyph {
        filename: String,
    },
    EmptyToken {
        filename: String,
    },
    UnmappedTemplate {
        filename: String,
    },
}

impl SymbolIssue {
    /// Missing templates are skipped at runtime; everything else is a warning.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::BadName { .. } | Self::MissingTemplate { .. })
    }
}

impl std::fmt::Display for SymbolIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadName {
                filename,
                violation,
            } => write!(f, "{filename}: {violation}"),
            Self::MissingTemplate { filename, path } => {
                write!(f, "{filename}: template not found at {}", path.display())
            }
            Self::EmptyGlyph { filename } => write!(f, "{filename}: empty glyph"),
            Self::EmptyToken { filename } => write!(f, "{filename}: empty token"),
            Self::UnmappedTemplate { filename } => {
                write!(f, "{filename}: template has no symbol map entry")
            }
        }
    }
}

impl SymbolMap {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s).map_err(|e| AtlasError::json("symbol map", e))?;
        let Value::Object(obj) = value else {
            return Err(AtlasError::SymbolMap(
                "expected an object keyed by template filename".to_string(),
            ));
        };

        let mut entries = BTreeMap::new();
        for (filename, meta) in obj {
            if !meta.is_object() {
                return Err(AtlasError::SymbolMap(format!(
                    "entry {filename:?} must be an object"
                )));
            }
            let meta: SymbolMeta = serde_json::from_value(meta)
                .map_err(|e| AtlasError::json(format!("symbol map entry {filename:?}"), e))?;
            entries.insert(filename, meta);
        }

        Ok(Self { entries })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| AtlasError::io(path, e))?;
        Self::from_json_str(&contents)
    }

    pub fn insert(&mut self, filename: impl Into<String>, meta: SymbolMeta) {
        self.entries.insert(filename.into(), meta);
    }

    pub fn get(&self, filename: &str) -> Option<&SymbolMeta> {
        self.entries.get(filename)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by filename.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymbolMeta)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Check names, template presence and metadata against a template directory.
    pub fn lint(&self, dir: impl AsRef<Path>) -> Result<Vec<SymbolIssue>> {
        let dir = dir.as_ref();
        let mut issues = Vec::new();

        for (filename, meta) in self.iter() {
            if let Err(violation) = check_template_name(filename) {
                issues.push(SymbolIssue::BadName {
                    filename: filename.to_string(),
                    violation,
                });
            }
            let path = dir.join(filename);
            if !path.is_file() {
                issues.push(SymbolIssue::MissingTemplate {
                    filename: filename.to_string(),
                    path,
                });
            }
            if meta.glyph.is_empty() {
                issues.push(SymbolIssue::EmptyGlyph {
                    filename: filename.to_string(),
                });
            }
            if meta.token.is_empty() {
                issues.push(SymbolIssue::EmptyToken {
                    filename: filename.to_string(),
                });
            }
        }

        if dir.is_dir() {
            let read = std::fs::read_dir(dir).map_err(|e| AtlasError::io(dir, e))?;
            let mut unmapped: Vec<String> = read
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_file())
                .filter_map(|entry| entry.file_name().into_string().ok())
                .filter(|name| name.to_ascii_lowercase().ends_with(".png"))
                .filter(|name| !self.entries.contains_key(name))
                .collect();
            unmapped.sort();
            issues.extend(
                unmapped
                    .into_iter()
                    .map(|filename| SymbolIssue::UnmappedTemplate { filename }),
            );
        }

        Ok(issues)
    }
}
