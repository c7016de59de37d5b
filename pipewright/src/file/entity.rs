//! File entities.
//!
//! A [`File`] is one addressable unit of content plus an optional source
//! map. Content is read lazily, exactly once, and shared by the sync and
//! async accessors. Reading also extracts the trailing `sourceMappingURL`
//! reference, so the cached contents never carry it.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock, Weak};

use crate::error::{Error, Result, SharedError};
use crate::path::{canonicalize, parent, resolve, AbsolutePath, CanonicalPath};
use crate::source_map::{comment, compose, ProduceOptions, SourceMap, SourceMapJson};

use super::collection::{CollectionInner, FileCollection};
use super::reader::ContentReader;

type LoadResult = std::result::Result<Loaded, SharedError>;

/// Contents and source map, parsed together.
#[derive(Debug, Clone)]
struct Loaded {
    contents: Arc<str>,
    source_map: Option<Arc<SourceMap>>,
}

/// Where the bytes of a content cell come from.
#[derive(Debug)]
enum ContentSource {
    Disk(AbsolutePath),
    Raw(String),
}

/// The read-once state shared by an entity and every re-hosted copy of it.
#[derive(Debug)]
pub(crate) struct ContentCell {
    source: ContentSource,
    loaded: OnceLock<LoadResult>,
}

impl ContentCell {
    pub(crate) fn disk(path: AbsolutePath) -> Arc<Self> {
        Arc::new(Self {
            source: ContentSource::Disk(path),
            loaded: OnceLock::new(),
        })
    }

    pub(crate) fn raw(contents: String) -> Arc<Self> {
        Arc::new(Self {
            source: ContentSource::Raw(contents),
            loaded: OnceLock::new(),
        })
    }

    pub(crate) fn preset(contents: String, source_map: SourceMap) -> Arc<Self> {
        let loaded = Loaded {
            contents: Arc::from(contents.as_str()),
            source_map: Some(Arc::new(source_map)),
        };
        Arc::new(Self {
            source: ContentSource::Raw(contents),
            loaded: OnceLock::from(Ok(loaded)),
        })
    }
}

/// A single file, virtual or on disk.
///
/// `File` is a cheap handle; clones refer to the same entity. Use
/// [`File::ptr_eq`] to compare identity.
#[derive(Clone)]
pub struct File {
    inner: Arc<FileInner>,
}

struct FileInner {
    absolute_path: AbsolutePath,
    original_path: AbsolutePath,
    canonical_path: CanonicalPath,
    collection: Weak<CollectionInner>,
    reader: Arc<dyn ContentReader>,
    content: Arc<ContentCell>,
}

impl File {
    pub(crate) fn new(
        collection: &FileCollection,
        absolute_path: AbsolutePath,
        original_path: AbsolutePath,
        content: Arc<ContentCell>,
    ) -> Self {
        let canonical_path = canonicalize(&absolute_path);
        Self {
            inner: Arc::new(FileInner {
                absolute_path,
                original_path,
                canonical_path,
                collection: collection.downgrade(),
                reader: Arc::clone(collection.reader()),
                content,
            }),
        }
    }

    /// Host this entity's content in `collection` under `path`.
    ///
    /// The new entity shares the read-once cell, so nothing is read again.
    pub(crate) fn rehost(&self, collection: &FileCollection, path: AbsolutePath) -> Self {
        Self::new(
            collection,
            path,
            self.inner.original_path.clone(),
            Arc::clone(&self.inner.content),
        )
    }

    /// Where this file lives.
    #[must_use]
    pub fn absolute_path(&self) -> &AbsolutePath {
        &self.inner.absolute_path
    }

    /// Where its content comes from; differs from
    /// [`absolute_path`](Self::absolute_path) after a rename or relocation.
    #[must_use]
    pub fn original_path(&self) -> &AbsolutePath {
        &self.inner.original_path
    }

    /// The identity key of [`absolute_path`](Self::absolute_path).
    #[must_use]
    pub fn canonical_path(&self) -> &CanonicalPath {
        &self.inner.canonical_path
    }

    /// The collection this entity belongs to, if it is still alive.
    #[must_use]
    pub fn collection(&self) -> Option<FileCollection> {
        self.inner.collection.upgrade().map(FileCollection::from_inner)
    }

    /// Whether content has been read (or supplied) already.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.inner.content.loaded.get().is_some()
    }

    /// Whether both handles refer to the same entity.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Identity of the shared content cell, stable across re-hosting.
    pub(crate) fn content_id(&self) -> usize {
        Arc::as_ptr(&self.inner.content) as usize
    }

    /// The file text, read on first use.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing file, `NotAFile` for a directory, any other
    /// read failure, or `InvalidSourceMap` if the referenced map is malformed.
    pub fn contents_sync(&self) -> Result<Arc<str>> {
        Ok(self.load()?.contents)
    }

    /// The file text, read on first use without blocking the runtime.
    ///
    /// # Errors
    ///
    /// See [`contents_sync`](Self::contents_sync).
    pub async fn contents(&self) -> Result<Arc<str>> {
        Ok(self.load_async().await?.contents)
    }

    /// The parsed source map, if the file references one.
    ///
    /// # Errors
    ///
    /// See [`contents_sync`](Self::contents_sync).
    pub fn source_map_sync(&self) -> Result<Option<Arc<SourceMap>>> {
        Ok(self.load()?.source_map)
    }

    /// The parsed source map, if the file references one.
    ///
    /// # Errors
    ///
    /// See [`contents_sync`](Self::contents_sync).
    pub async fn source_map(&self) -> Result<Option<Arc<SourceMap>>> {
        Ok(self.load_async().await?.source_map)
    }

    /// Whether the file can be read.
    ///
    /// # Errors
    ///
    /// Any read failure other than "not found".
    pub fn exists_sync(&self) -> Result<bool> {
        Self::presence(self.load())
    }

    /// Whether the file can be read.
    ///
    /// # Errors
    ///
    /// Any read failure other than "not found".
    pub async fn exists(&self) -> Result<bool> {
        match self.load_async().await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Produce the source map to write next to `target`.
    ///
    /// # Errors
    ///
    /// Read failures of this file or of sources whose content must be
    /// inlined, and malformed mappings.
    pub fn produce_source_map_sync(
        &self,
        target: &AbsolutePath,
        options: &ProduceOptions,
    ) -> Result<Option<SourceMapJson>> {
        compose::produce(self, target, options)
    }

    /// Produce the source map to write next to `target` without blocking
    /// the runtime.
    ///
    /// # Errors
    ///
    /// See [`produce_source_map_sync`](Self::produce_source_map_sync).
    pub async fn produce_source_map(
        &self,
        target: AbsolutePath,
        options: ProduceOptions,
    ) -> Result<Option<SourceMapJson>> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.produce_source_map_sync(&target, &options))
            .await
            .map_err(|e| Error::Join(e.to_string()))?
    }

    fn presence(result: LoadResult) -> Result<bool> {
        match result {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(Error::Shared(e)),
        }
    }

    fn load(&self) -> LoadResult {
        self.inner
            .content
            .loaded
            .get_or_init(|| self.read_and_extract().map_err(Arc::new))
            .clone()
    }

    async fn load_async(&self) -> Result<Loaded> {
        if let Some(done) = self.inner.content.loaded.get() {
            return done.clone().map_err(Error::Shared);
        }
        // Concurrent callers all land in the same `get_or_init`, which runs
        // the read once and makes the others wait for it.
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.load())
            .await
            .map_err(|e| Error::Join(e.to_string()))?
            .map_err(Error::Shared)
    }

    fn read_and_extract(&self) -> Result<Loaded> {
        let raw = match &self.inner.content.source {
            ContentSource::Disk(path) => self.inner.reader.read(path)?,
            ContentSource::Raw(text) => text.clone(),
        };

        // Map files never reference maps of their own.
        if is_map_file(&self.inner.original_path) {
            return Ok(Loaded {
                contents: Arc::from(raw),
                source_map: None,
            });
        }

        let Some(reference) = comment::find_reference(&raw) else {
            return Ok(Loaded {
                contents: Arc::from(raw),
                source_map: None,
            });
        };

        let source_map = self.resolve_reference(reference.url())?.map(Arc::new);
        Ok(Loaded {
            contents: Arc::from(reference.strip(&raw)),
            source_map,
        })
    }

    fn resolve_reference(&self, url: &str) -> Result<Option<SourceMap>> {
        let collection = self.collection();
        if let Some(decoded) = comment::decode_data_url(url) {
            let json = decoded.map_err(|reason| Error::InvalidSourceMap {
                path: self.inner.original_path.as_path().to_path_buf(),
                reason,
            })?;
            return SourceMap::parse(&json, &self.inner.original_path, collection.as_ref());
        }

        let relative = url.split(['?', '#']).next().unwrap_or(url);
        let map_path = match resolve(&parent(&self.inner.original_path), Path::new(relative)) {
            Ok(path) => path,
            Err(e) => {
                log::debug!("ignoring source map reference in {}: {e}", self.inner.original_path);
                return Ok(None);
            }
        };
        if canonicalize(&map_path) == canonicalize(&self.inner.original_path) {
            return Ok(None);
        }

        let text = match &collection {
            Some(collection) => {
                let target = collection.get_absolute(&map_path);
                if target.content_id() == self.content_id() {
                    log::debug!("{} references its own content as a source map", self.inner.original_path);
                    return Ok(None);
                }
                target.map_text()
            }
            None => self.inner.reader.read(&map_path).map(Arc::from),
        };
        match text {
            Ok(json) => SourceMap::parse(&json, &map_path, collection.as_ref()),
            Err(e) if e.is_not_found() => {
                log::debug!("source map {map_path} referenced by {} is missing", self.inner.original_path);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// This entity's text, read as a referenced source map.
    ///
    /// Only `.map` entities are loaded through their cell, since their own
    /// load never follows a reference. Anything else is read without
    /// touching its cell, so mutually referencing files cannot wait on each
    /// other's first read.
    fn map_text(&self) -> Result<Arc<str>> {
        if let Some(done) = self.inner.content.loaded.get() {
            return done
                .clone()
                .map(|loaded| loaded.contents)
                .map_err(Error::Shared);
        }
        if is_map_file(&self.inner.original_path) {
            return self.contents_sync();
        }
        match &self.inner.content.source {
            ContentSource::Disk(path) => self.inner.reader.read(path).map(Arc::from),
            ContentSource::Raw(text) => Ok(Arc::from(text.as_str())),
        }
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("absolute_path", &self.inner.absolute_path)
            .field("original_path", &self.inner.original_path)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

fn is_map_file(path: &AbsolutePath) -> bool {
    path.file_name().is_some_and(|name| name.ends_with(".map"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{AddOptions, MemoryReader};
    use crate::path::DirectoryPath;

    fn abs(p: &str) -> AbsolutePath {
        AbsolutePath::new(p).unwrap()
    }

    fn memory_collection(root: &str) -> (FileCollection, Arc<MemoryReader>) {
        let reader = Arc::new(MemoryReader::new());
        let collection =
            FileCollection::with_reader(DirectoryPath::new(root).unwrap(), reader.clone());
        (collection, reader)
    }

    #[test]
    fn test_sync_reads_once() {
        let (files, reader) = memory_collection("/p");
        reader.insert(&abs("/p/a.txt"), "alpha");
        let file = files.get("a.txt").unwrap();

        assert!(!file.is_loaded());
        assert_eq!(&*file.contents_sync().unwrap(), "alpha");
        assert_eq!(&*file.contents_sync().unwrap(), "alpha");
        assert!(file.is_loaded());
        assert_eq!(reader.reads(), 1);
    }

    #[tokio::test]
    async fn test_mixed_sync_async_reads_once() {
        let (files, reader) = memory_collection("/p");
        reader.insert(&abs("/p/a.txt"), "alpha");
        let file = files.get("a.txt").unwrap();

        let (a, b) = tokio::join!(file.contents(), file.contents());
        assert_eq!(&*a.unwrap(), "alpha");
        assert_eq!(&*b.unwrap(), "alpha");
        assert_eq!(&*file.contents_sync().unwrap(), "alpha");
        assert_eq!(reader.reads(), 1);
    }

    #[test]
    fn test_exists_translates_not_found() {
        let (files, reader) = memory_collection("/p");
        reader.insert(&abs("/p/dir/a.txt"), "a");

        assert!(!files.get("missing.txt").unwrap().exists_sync().unwrap());
        assert!(files.get("dir/a.txt").unwrap().exists_sync().unwrap());
        let err = files.get("dir").unwrap().exists_sync().unwrap_err();
        assert!(err.is_not_a_file());
    }

    #[test]
    fn test_failure_is_cached() {
        let (files, reader) = memory_collection("/p");
        let file = files.get("late.txt").unwrap();
        assert!(file.contents_sync().unwrap_err().is_not_found());

        reader.insert(&abs("/p/late.txt"), "too late");
        assert!(file.contents_sync().unwrap_err().is_not_found());
        assert_eq!(reader.reads(), 1);
    }

    #[test]
    fn test_sibling_map_is_extracted_and_comment_stripped() {
        let (files, _) = memory_collection("/foo");
        files
            .add(
                "/foo/bar.js.map",
                AddOptions::contents(r#"{"version":3,"mappings":"","sources":[],"names":[]}"#),
            )
            .unwrap();
        let file = files
            .add(
                "/foo/bar.js",
                AddOptions::contents("//# sourceMappingURL=bar.js.map\n// foo"),
            )
            .unwrap();

        assert_eq!(&*file.contents_sync().unwrap(), "\n// foo");
        let map = file.source_map_sync().unwrap().unwrap();
        assert_eq!(map.mappings(), "");
        assert!(map.sources().is_empty());
    }

    #[test]
    fn test_missing_sibling_map_means_no_map() {
        let (files, _) = memory_collection("/foo");
        let file = files
            .add(
                "bar.js",
                AddOptions::contents("code();\n//# sourceMappingURL=bar.js.map"),
            )
            .unwrap();

        assert_eq!(&*file.contents_sync().unwrap(), "code();\n");
        assert!(file.source_map_sync().unwrap().is_none());
    }

    #[test]
    fn test_inline_map_is_decoded() {
        use base64::Engine;

        let (files, _) = memory_collection("/foo");
        let json = r#"{"version":"3","mappings":"AAAA","sources":["src/a.ts"],"names":[]}"#;
        let encoded = base64::engine::general_purpose::STANDARD.encode(json);
        let file = files
            .add(
                "bar.js",
                AddOptions::contents(format!(
                    "a();\n//# sourceMappingURL=data:application/json;charset=utf-8;base64,{encoded}\n"
                )),
            )
            .unwrap();

        let map = file.source_map_sync().unwrap().unwrap();
        assert_eq!(map.sources(), ["/foo/src/a.ts"]);
        assert_eq!(&*file.contents_sync().unwrap(), "a();\n\n");
    }

    #[test]
    fn test_map_file_is_not_scanned() {
        let (files, _) = memory_collection("/foo");
        let file = files
            .add("x.js.map", AddOptions::contents("//# sourceMappingURL=x.js.map"))
            .unwrap();
        assert_eq!(&*file.contents_sync().unwrap(), "//# sourceMappingURL=x.js.map");
        assert!(file.source_map_sync().unwrap().is_none());
    }

    #[test]
    fn test_invalid_map_fails_loudly() {
        let (files, _) = memory_collection("/foo");
        files
            .add(
                "bad.js.map",
                AddOptions::contents(r#"{"version":3,"mappings":"","sources":[1],"names":[]}"#),
            )
            .unwrap();
        let file = files
            .add("bad.js", AddOptions::contents("//# sourceMappingURL=bad.js.map"))
            .unwrap();

        let err = file.source_map_sync().unwrap_err();
        assert!(matches!(err, Error::Shared(_)));
        assert!(matches!(err.root(), Error::InvalidSourceMap { .. }));
    }

    /// Loads `file` on another thread, failing instead of hanging.
    fn contents_within(file: &File, limit: std::time::Duration) -> Result<Arc<str>> {
        let (tx, rx) = std::sync::mpsc::channel();
        let file = file.clone();
        std::thread::spawn(move || {
            let _ = tx.send(file.contents_sync());
        });
        rx.recv_timeout(limit).expect("loading did not terminate")
    }

    #[test]
    fn test_mutual_references_terminate() {
        let (files, reader) = memory_collection("/p");
        reader.insert(&abs("/p/a.js"), "a();\n//# sourceMappingURL=b.js");
        reader.insert(&abs("/p/b.js"), "b();\n//# sourceMappingURL=a.js");

        let a = files.get("a.js").unwrap();
        let err = contents_within(&a, std::time::Duration::from_secs(2)).unwrap_err();
        assert!(matches!(err.root(), Error::InvalidSourceMap { .. }));

        // The other side is still readable and reaches the same verdict.
        let b = files.get("b.js").unwrap();
        let err = contents_within(&b, std::time::Duration::from_secs(2)).unwrap_err();
        assert!(matches!(err.root(), Error::InvalidSourceMap { .. }));
    }

    #[test]
    fn test_reference_to_a_wrapper_of_itself_is_no_map() {
        let (files, _) = memory_collection("/p");
        let a = files
            .add("a.js", AddOptions::contents("x();\n//# sourceMappingURL=a.js.map"))
            .unwrap();
        files.add_file("a.js.map", &a).unwrap();

        let contents = contents_within(&a, std::time::Duration::from_secs(2)).unwrap();
        assert_eq!(&*contents, "x();\n");
        assert!(a.source_map_sync().unwrap().is_none());
    }

    #[test]
    fn test_rehost_shares_content() {
        let (files, reader) = memory_collection("/p");
        reader.insert(&abs("/p/a.txt"), "alpha");
        let original = files.get("a.txt").unwrap();
        original.contents_sync().unwrap();

        let moved = original.rehost(&files, abs("/p/b.txt"));
        assert_eq!(moved.absolute_path(), &abs("/p/b.txt"));
        assert_eq!(moved.original_path(), &abs("/p/a.txt"));
        assert!(moved.is_loaded());
        assert_eq!(&*moved.contents_sync().unwrap(), "alpha");
        assert_eq!(reader.reads(), 1);
        assert_eq!(moved.content_id(), original.content_id());
    }
}
