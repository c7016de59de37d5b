//! The parsed source-map model.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::file::{File, FileCollection};
use crate::path::{parent, resolve, AbsolutePath, DirectoryPath};

/// A version 3 source map whose sources are resolved to absolute references.
///
/// `sources`, `sources_content` and `attached_sources` are parallel: entry
/// `i` of each describes the same original. A source is attached when it
/// resolved to a path and a collection was available to look it up in.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    file: Option<String>,
    mappings: String,
    names: Vec<String>,
    sources: Vec<String>,
    sources_content: Vec<Option<Arc<str>>>,
    attached_sources: Vec<Option<File>>,
}

/// The fields the encoder hands back after building a map.
#[derive(Deserialize)]
struct Encoded {
    #[serde(default)]
    sources: Vec<String>,
    #[serde(default)]
    names: Vec<String>,
    #[serde(default)]
    mappings: String,
}

impl SourceMap {
    /// A map with no sources and no mappings.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a source-map document that lives at `map_path`.
    ///
    /// Relative sources resolve against the directory of `map_path`, after
    /// `sourceRoot` has been prepended. Sources that resolve to a path are
    /// attached through `collection` when one is given. Returns `None` for a
    /// document that is not version 3.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSourceMap` if the document is not a JSON object or if
    /// a `sources` or `names` entry is not a string. Optional fields that are
    /// missing or malformed default to empty.
    pub fn parse(
        json: &str,
        map_path: &AbsolutePath,
        collection: Option<&FileCollection>,
    ) -> Result<Option<Self>> {
        let invalid = |reason: String| Error::InvalidSourceMap {
            path: map_path.as_path().to_path_buf(),
            reason,
        };

        let value: Value =
            serde_json::from_str(json).map_err(|e| invalid(format!("not JSON: {e}")))?;
        let Value::Object(object) = value else {
            return Err(invalid("not a JSON object".to_string()));
        };

        let version = match object.get("version") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        if version != Some(3) {
            log::warn!("ignoring source map {map_path}: unsupported version");
            return Ok(None);
        }

        let names = string_entries(&object, "names")
            .map_err(|i| invalid(format!("names[{i}] is not a string")))?;
        let raw_sources = string_entries(&object, "sources")
            .map_err(|i| invalid(format!("sources[{i}] is not a string")))?;
        let source_root = object
            .get("sourceRoot")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let mappings = object
            .get("mappings")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let file = object.get("file").and_then(Value::as_str).map(str::to_string);

        let embedded = object.get("sourcesContent").and_then(Value::as_array);
        let base = parent(map_path);
        let mut sources = Vec::with_capacity(raw_sources.len());
        let mut sources_content = Vec::with_capacity(raw_sources.len());
        let mut attached_sources = Vec::with_capacity(raw_sources.len());

        for (i, raw) in raw_sources.iter().enumerate() {
            let joined = join_source_root(source_root, raw);
            let resolved = resolve_source(&base, &joined);
            attached_sources.push(match (&resolved, collection) {
                (Some(path), Some(collection)) => Some(collection.get_absolute(path)),
                _ => None,
            });
            sources.push(resolved.map_or(joined, |path| path.to_string_lossy()));
            sources_content.push(
                embedded
                    .and_then(|contents| contents.get(i))
                    .and_then(Value::as_str)
                    .map(Arc::from),
            );
        }

        Ok(Some(Self {
            file,
            mappings,
            names,
            sources,
            sources_content,
            attached_sources,
        }))
    }

    /// Build from a map produced by the encoder, with the content and
    /// attachment of each of its sources.
    pub(crate) fn from_encoded(
        encoded: &::sourcemap::SourceMap,
        file: Option<String>,
        sources_content: Vec<Option<Arc<str>>>,
        attached_sources: Vec<Option<File>>,
    ) -> Result<Self> {
        let mut buffer = Vec::new();
        encoded
            .to_writer(&mut buffer)
            .map_err(|e| Error::InvalidSourceMap {
                path: file.clone().unwrap_or_default().into(),
                reason: e.to_string(),
            })?;
        let Encoded {
            sources,
            names,
            mappings,
        } = serde_json::from_slice(&buffer)?;

        let mut sources_content = sources_content;
        let mut attached_sources = attached_sources;
        sources_content.resize(sources.len(), None);
        attached_sources.resize(sources.len(), None);
        Ok(Self {
            file,
            mappings,
            names,
            sources,
            sources_content,
            attached_sources,
        })
    }

    /// Decode the mappings into tokens.
    pub(crate) fn decode(&self, owner: &Path) -> Result<::sourcemap::SourceMap> {
        let document = serde_json::json!({
            "version": 3,
            "sources": self.sources,
            "names": self.names,
            "mappings": self.mappings,
        });
        let bytes = serde_json::to_vec(&document)?;
        ::sourcemap::SourceMap::from_slice(&bytes).map_err(|e| Error::InvalidSourceMap {
            path: owner.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// The `file` field, if present.
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// The encoded mappings.
    #[must_use]
    pub fn mappings(&self) -> &str {
        &self.mappings
    }

    /// Symbol names, in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Absolute source references; URLs are kept as written.
    #[must_use]
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Embedded source text, parallel to [`sources`](Self::sources).
    #[must_use]
    pub fn sources_content(&self) -> &[Option<Arc<str>>] {
        &self.sources_content
    }

    /// Entities for resolvable sources, parallel to [`sources`](Self::sources).
    #[must_use]
    pub fn attached_sources(&self) -> &[Option<File>] {
        &self.attached_sources
    }
}

/// The string entries of an optional array field, or the index of the first
/// entry that is not a string.
fn string_entries(
    object: &Map<String, Value>,
    field: &str,
) -> std::result::Result<Vec<String>, usize> {
    let Some(entries) = object.get(field).and_then(Value::as_array) else {
        return Ok(Vec::new());
    };
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| entry.as_str().map(str::to_string).ok_or(i))
        .collect()
}

fn join_source_root(root: &str, source: &str) -> String {
    if root.is_empty() || has_scheme(source) || source.starts_with('/') {
        source.to_string()
    } else if root.ends_with('/') {
        format!("{root}{source}")
    } else {
        format!("{root}/{source}")
    }
}

/// Resolve a source reference to a path, if it names one.
fn resolve_source(base: &DirectoryPath, source: &str) -> Option<AbsolutePath> {
    let local = match source.strip_prefix("file://") {
        Some(path) => path,
        None if has_scheme(source) => return None,
        None => source,
    };
    resolve(base, Path::new(local)).ok()
}

fn has_scheme(reference: &str) -> bool {
    static SCHEME: OnceLock<Option<Regex>> = OnceLock::new();
    SCHEME
        .get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").ok())
        .as_ref()
        .is_some_and(|scheme| scheme.is_match(reference))
}
