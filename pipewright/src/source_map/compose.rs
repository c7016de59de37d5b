//! Producing source maps for output files.
//!
//! [`produce`] turns the map carried by a file into the JSON written next to
//! an output. In combined mode every attached source that carries a map of
//! its own is folded in, depth-first, so the result points at the earliest
//! originals in the chain.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::file::File;
use crate::path::{parent, relativize, AbsolutePath};

use super::comment::inline_source_map_url;
use super::map::SourceMap;

/// How [`File::produce_source_map`] builds its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProduceOptions {
    /// Fold the maps of attached sources into the result.
    pub combine_source_maps: bool,
    /// Embed the text of every source.
    pub sources_content: bool,
}

impl Default for ProduceOptions {
    fn default() -> Self {
        Self {
            combine_source_maps: true,
            sources_content: true,
        }
    }
}

/// A version 3 source-map document, fields in their conventional order.
///
/// # Examples
///
/// ```
/// use pipewright::source_map::SourceMapJson;
///
/// let map = SourceMapJson {
///     version: 3,
///     file: "a.js".to_string(),
///     source_root: None,
///     sources: vec!["a.ts".to_string()],
///     sources_content: None,
///     names: vec![],
///     mappings: "AAAA".to_string(),
/// };
/// assert_eq!(
///     map.to_json().unwrap(),
///     r#"{"version":3,"file":"a.js","sources":["a.ts"],"names":[],"mappings":"AAAA"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapJson {
    /// Always 3.
    pub version: u8,
    /// The generated file, relative to the map.
    #[serde(default)]
    pub file: String,
    /// Prefix for every source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    /// Sources relative to the map.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Source text, parallel to `sources`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    /// Symbol names.
    #[serde(default)]
    pub names: Vec<String>,
    /// Encoded mappings.
    #[serde(default)]
    pub mappings: String,
}

impl SourceMapJson {
    /// Serialize compactly.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize as a base64 `data:` URL.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if serialization fails.
    pub fn to_data_url(&self) -> Result<String> {
        Ok(inline_source_map_url(&self.to_json()?))
    }
}

/// The map to write for `file` at `target`, if `file` carries one.
pub(crate) fn produce(
    file: &File,
    target: &AbsolutePath,
    options: &ProduceOptions,
) -> Result<Option<SourceMapJson>> {
    let Some(map) = file.source_map_sync()? else {
        return Ok(None);
    };

    let map = if options.combine_source_maps {
        let mut visiting = HashSet::from([file.content_id()]);
        combine(&map, file.absolute_path(), &mut visiting)?
    } else {
        (*map).clone()
    };

    render(&map, target, options).map(Some)
}

/// Fold the maps of `map`'s attached sources into it.
///
/// `visiting` holds the content cells on the current path; a source already
/// on it is treated as having no map, which ends cycles.
fn combine(
    map: &SourceMap,
    owner: &AbsolutePath,
    visiting: &mut HashSet<usize>,
) -> Result<SourceMap> {
    let mut children = Vec::with_capacity(map.attached_sources().len());
    for attached in map.attached_sources() {
        children.push(match attached {
            Some(source) if !visiting.contains(&source.content_id()) => {
                combined_child(source, visiting)?
            }
            _ => None,
        });
    }
    if children.iter().all(Option::is_none) {
        return Ok(map.clone());
    }

    let parent_tokens = map.decode(owner.as_path())?;
    let mut decoded_children = Vec::with_capacity(children.len());
    for (child, source) in children.iter().zip(map.attached_sources()) {
        decoded_children.push(match (child, source) {
            (Some(child), Some(source)) => {
                Some((child.decode(source.absolute_path().as_path())?, child))
            }
            _ => None,
        });
    }

    let mut builder = ::sourcemap::SourceMapBuilder::new(map.file());
    let mut origins = Origins::default();

    for token in parent_tokens.tokens() {
        let raw = token.get_raw_token();
        let (dst_line, dst_col) = (token.get_dst_line(), token.get_dst_col());
        if token.get_source().is_none() {
            builder.add(dst_line, dst_col, 0, 0, None, None, false);
            continue;
        }

        let src_index = raw.src_id as usize;
        let substitute = decoded_children
            .get(src_index)
            .and_then(Option::as_ref)
            .and_then(|(decoded, child)| {
                let hit = decoded.lookup_token(token.get_src_line(), token.get_src_col())?;
                let same_line = hit.get_dst_line() == token.get_src_line();
                (same_line && hit.get_source().is_some()).then_some((hit, *child))
            });

        match substitute {
            Some((hit, child)) => {
                let added = builder.add(
                    dst_line,
                    dst_col,
                    hit.get_src_line(),
                    hit.get_src_col(),
                    hit.get_source(),
                    hit.get_name().or(token.get_name()),
                    false,
                );
                origins.record(added.src_id, child, hit.get_raw_token().src_id as usize);
            }
            None => {
                let added = builder.add(
                    dst_line,
                    dst_col,
                    token.get_src_line(),
                    token.get_src_col(),
                    token.get_source(),
                    token.get_name(),
                    false,
                );
                origins.record(added.src_id, map, src_index);
            }
        }
    }

    let encoded = builder.into_sourcemap();
    SourceMap::from_encoded(
        &encoded,
        map.file().map(str::to_string),
        origins.contents,
        origins.attached,
    )
}

/// The combined map of `source`, if it carries one.
fn combined_child(source: &File, visiting: &mut HashSet<usize>) -> Result<Option<SourceMap>> {
    let own = match source.source_map_sync() {
        Ok(own) => own,
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e),
    };
    let Some(own) = own else {
        return Ok(None);
    };

    let id = source.content_id();
    visiting.insert(id);
    let combined = combine(&own, source.absolute_path(), visiting);
    visiting.remove(&id);
    combined.map(Some)
}

/// Content and attachment per source id of the map being built.
#[derive(Default)]
struct Origins {
    contents: Vec<Option<Arc<str>>>,
    attached: Vec<Option<File>>,
}

impl Origins {
    fn record(&mut self, built_id: u32, from: &SourceMap, index: usize) {
        if built_id == u32::MAX {
            return;
        }
        let slot = built_id as usize;
        if self.contents.len() <= slot {
            self.contents.resize(slot + 1, None);
            self.attached.resize(slot + 1, None);
        }
        if self.contents[slot].is_none() {
            self.contents[slot] = from.sources_content().get(index).cloned().flatten();
        }
        if self.attached[slot].is_none() {
            self.attached[slot] = from.attached_sources().get(index).cloned().flatten();
        }
    }
}

/// Express `map` relative to `target`.
fn render(
    map: &SourceMap,
    target: &AbsolutePath,
    options: &ProduceOptions,
) -> Result<SourceMapJson> {
    let dir = parent(target);
    let sources = map
        .sources()
        .iter()
        .map(|source| match AbsolutePath::new(source.as_str()) {
            Ok(path) => relativize(&dir, &path).to_slash_string(),
            _ => source.clone(),
        })
        .collect();

    let sources_content = if options.sources_content {
        let mut contents = Vec::with_capacity(map.sources().len());
        for (carried, attached) in map.sources_content().iter().zip(map.attached_sources()) {
            contents.push(match (carried, attached) {
                (Some(text), _) => Some(text.to_string()),
                (None, Some(file)) => match file.contents_sync() {
                    Ok(text) => Some(text.to_string()),
                    Err(e) if e.is_not_found() => None,
                    Err(e) => return Err(e),
                },
                (None, None) => None,
            });
        }
        Some(contents)
    } else {
        None
    };

    Ok(SourceMapJson {
        version: 3,
        file: target.file_name().unwrap_or_default().to_string(),
        source_root: None,
        sources,
        sources_content,
        names: map.names().to_vec(),
        mappings: map.mappings().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{AddOptions, FileCollection, MemoryReader};
    use crate::path::DirectoryPath;

    fn abs(p: &str) -> AbsolutePath {
        AbsolutePath::new(p).unwrap()
    }

    fn memory(root: &str) -> (FileCollection, Arc<MemoryReader>) {
        let reader = Arc::new(MemoryReader::new());
        (
            FileCollection::with_reader(DirectoryPath::new(root).unwrap(), reader.clone()),
            reader,
        )
    }

    #[test]
    fn test_no_map_produces_nothing() {
        let (files, _) = memory("/p");
        let file = files.add("a.js", AddOptions::contents("a();")).unwrap();
        let produced = file
            .produce_source_map_sync(&abs("/p/dist/a.js"), &ProduceOptions::default())
            .unwrap();
        assert!(produced.is_none());
    }

    #[test]
    fn test_simple_mode_relativizes_and_inlines() {
        let (files, reader) = memory("/p");
        reader.insert(&abs("/p/src/a.ts"), "let a = 1;");
        files
            .add(
                "build/a.js.map",
                AddOptions::contents(
                    r#"{"version":3,"mappings":"AAAA","sources":["../src/a.ts","../src/gone.ts"],"names":["a"]}"#,
                ),
            )
            .unwrap();
        let file = files
            .add("build/a.js", AddOptions::contents("var a = 1;\n//# sourceMappingURL=a.js.map"))
            .unwrap();

        let options = ProduceOptions {
            combine_source_maps: false,
            sources_content: true,
        };
        let produced = file
            .produce_source_map_sync(&abs("/p/dist/out/a.js"), &options)
            .unwrap()
            .unwrap();
        assert_eq!(produced.file, "a.js");
        assert_eq!(produced.sources, ["../../src/a.ts", "../../src/gone.ts"]);
        assert_eq!(produced.names, ["a"]);
        assert_eq!(produced.mappings, "AAAA");
        assert_eq!(
            produced.sources_content,
            Some(vec![Some("let a = 1;".to_string()), None])
        );
    }

    #[test]
    fn test_sources_content_can_be_omitted() {
        let (files, _) = memory("/p");
        files
            .add(
                "a.js.map",
                AddOptions::contents(r#"{"version":3,"mappings":"AAAA","sources":["a.ts"],"names":[]}"#),
            )
            .unwrap();
        let file = files
            .add("a.js", AddOptions::contents("//# sourceMappingURL=a.js.map"))
            .unwrap();
        let options = ProduceOptions {
            combine_source_maps: true,
            sources_content: false,
        };
        let produced = file
            .produce_source_map_sync(&abs("/p/a.js"), &options)
            .unwrap()
            .unwrap();
        assert!(produced.sources_content.is_none());
        assert!(!produced.to_json().unwrap().contains("sourcesContent"));
    }

    #[test]
    fn test_carried_content_is_not_reread() {
        let (files, reader) = memory("/p");
        files
            .add(
                "a.js.map",
                AddOptions::contents(
                    r#"{"version":3,"mappings":"AAAA","sources":["a.ts"],"names":[],"sourcesContent":["carried"]}"#,
                ),
            )
            .unwrap();
        let file = files
            .add("a.js", AddOptions::contents("//# sourceMappingURL=a.js.map"))
            .unwrap();
        let before = reader.reads();
        let produced = file
            .produce_source_map_sync(&abs("/p/a.js"), &ProduceOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(produced.sources_content, Some(vec![Some("carried".to_string())]));
        // a.ts is looked at for its own map but its content is not needed.
        assert!(reader.reads() <= before + 1);
    }

    #[test]
    fn test_self_reference_terminates() {
        let (files, _) = memory("/p");
        files
            .add(
                "a.js.map",
                AddOptions::contents(r#"{"version":3,"mappings":"AAAA","sources":["a.js"],"names":[]}"#),
            )
            .unwrap();
        let file = files
            .add("a.js", AddOptions::contents("x\n//# sourceMappingURL=a.js.map"))
            .unwrap();
        let produced = file
            .produce_source_map_sync(&abs("/p/a.js"), &ProduceOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(produced.sources, ["a.js"]);
    }

    #[test]
    fn test_field_order() {
        let json = SourceMapJson {
            version: 3,
            file: "a.js".to_string(),
            source_root: Some("/".to_string()),
            sources: vec!["a.ts".to_string()],
            sources_content: Some(vec![None]),
            names: vec!["n".to_string()],
            mappings: "AAAA".to_string(),
        }
        .to_json()
        .unwrap();
        assert_eq!(
            json,
            r#"{"version":3,"file":"a.js","sourceRoot":"/","sources":["a.ts"],"sourcesContent":[null],"names":["n"],"mappings":"AAAA"}"#
        );
    }
}
