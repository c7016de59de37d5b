//! File collections.
//!
//! A [`FileCollection`] is a directory-rooted lookup cache plus an ordered
//! membership list. Looking a path up creates (and caches) an unread entity;
//! only [`add`](FileCollection::add) and [`add_file`](FileCollection::add_file)
//! make an entity a member.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::path::{
    canonicalize, is_child, relativize, resolve, AbsolutePath, CanonicalPath, DirectoryPath,
    PathRelationship,
};
use crate::source_map::SourceMap;

use super::entity::{ContentCell, File};
use super::reader::{ContentReader, DiskReader};

/// Options for [`FileCollection::add`].
///
/// With no `contents` the entity reads from disk on first access. With
/// `contents` it never touches disk; a `source_map` may then be supplied
/// alongside.
#[derive(Debug, Default, Clone)]
pub struct AddOptions {
    /// Content supplied up front.
    pub contents: Option<String>,
    /// A source map for `contents`.
    pub source_map: Option<SourceMap>,
    /// Where the content came from, if not the added path.
    pub original_path: Option<AbsolutePath>,
}

impl AddOptions {
    /// Options for an entity with eager contents.
    #[must_use]
    pub fn contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
            ..Self::default()
        }
    }

    /// Attach a source map to the eager contents.
    #[must_use]
    pub fn with_source_map(mut self, source_map: SourceMap) -> Self {
        self.source_map = Some(source_map);
        self
    }

    /// Record where the contents originally came from.
    #[must_use]
    pub fn with_original_path(mut self, original_path: AbsolutePath) -> Self {
        self.original_path = Some(original_path);
        self
    }
}

/// A directory-rooted set of file entities.
///
/// `FileCollection` is a cheap handle; clones refer to the same collection.
/// [`clone_view`](Self::clone_view) is the operation that creates a new one.
///
/// # Examples
///
/// ```
/// use pipewright::file::{AddOptions, FileCollection};
/// use pipewright::path::DirectoryPath;
///
/// let files = FileCollection::new(DirectoryPath::new("/project").unwrap());
///
/// // Lookups are cached but do not make an entity a member.
/// let a = files.get("src/a.js").unwrap();
/// let b = files.get("/project/src/../src/a.js").unwrap();
/// assert!(pipewright::File::ptr_eq(&a, &b));
/// assert!(files.list().is_empty());
///
/// files.add("src/b.js", AddOptions::contents("b();")).unwrap();
/// assert_eq!(files.list().len(), 1);
/// ```
#[derive(Clone)]
pub struct FileCollection {
    inner: Arc<CollectionInner>,
}

pub(crate) struct CollectionInner {
    root: DirectoryPath,
    reader: Arc<dyn ContentReader>,
    cache: RwLock<HashMap<CanonicalPath, File>>,
    members: RwLock<Members>,
    parent: Option<FileCollection>,
}

#[derive(Default)]
struct Members {
    order: Vec<File>,
    index: HashMap<CanonicalPath, usize>,
}

impl Members {
    /// Insert `file`, replacing a member with the same canonical path in place.
    fn upsert(&mut self, file: File) {
        match self.index.get(file.canonical_path()) {
            Some(&slot) => self.order[slot] = file,
            None => {
                self.index
                    .insert(file.canonical_path().clone(), self.order.len());
                self.order.push(file);
            }
        }
    }
}

impl FileCollection {
    /// Create an empty collection reading from disk.
    #[must_use]
    pub fn new(root: DirectoryPath) -> Self {
        Self::with_reader(root, Arc::new(DiskReader))
    }

    /// Create an empty collection reading through `reader`.
    #[must_use]
    pub fn with_reader(root: DirectoryPath, reader: Arc<dyn ContentReader>) -> Self {
        Self::build(root, reader, None)
    }

    fn build(
        root: DirectoryPath,
        reader: Arc<dyn ContentReader>,
        parent: Option<FileCollection>,
    ) -> Self {
        Self {
            inner: Arc::new(CollectionInner {
                root,
                reader,
                cache: RwLock::new(HashMap::new()),
                members: RwLock::new(Members::default()),
                parent,
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<CollectionInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<CollectionInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn reader(&self) -> &Arc<dyn ContentReader> {
        &self.inner.reader
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &DirectoryPath {
        &self.inner.root
    }

    /// Whether both handles refer to the same collection.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Resolve `path` against the root.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if the path climbs above the filesystem root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<AbsolutePath> {
        resolve(&self.inner.root, path.as_ref())
    }

    /// Look `path` up, creating an unread entity on a miss.
    ///
    /// Paths that canonicalize equal always yield the same instance. Nothing
    /// is read from disk.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if the path climbs above the filesystem root.
    pub fn get(&self, path: impl AsRef<Path>) -> Result<File> {
        let path = self.resolve(path)?;
        Ok(self.get_absolute(&path))
    }

    /// [`get`](Self::get) for a path that is already absolute.
    #[must_use]
    pub fn get_absolute(&self, path: &AbsolutePath) -> File {
        let key = canonicalize(path);
        if let Some(file) = self.inner.cache.read().get(&key) {
            return file.clone();
        }

        // Copy on read: the parent resolves (and keeps) the entity.
        let inherited = self
            .inner
            .parent
            .as_ref()
            .map(|parent| parent.get_absolute(path));

        self.inner
            .cache
            .write()
            .entry(key)
            .or_insert_with(|| {
                inherited.unwrap_or_else(|| {
                    File::new(self, path.clone(), path.clone(), ContentCell::disk(path.clone()))
                })
            })
            .clone()
    }

    /// Make the entity at `path` a member.
    ///
    /// Without contents this is the cached (on-disk) entity. With contents a
    /// new entity replaces whatever was cached at that path.
    ///
    /// # Errors
    ///
    /// - `OutOfScope` if `path` is not below the root
    /// - `Validation` if a source map is supplied without contents
    /// - `InvalidPath` if the path climbs above the filesystem root
    pub fn add(&self, path: impl AsRef<Path>, options: AddOptions) -> Result<File> {
        let path = self.scoped(path.as_ref())?;
        let AddOptions {
            contents,
            source_map,
            original_path,
        } = options;

        let file = match (contents, source_map) {
            (None, Some(_)) => {
                return Err(Error::Validation {
                    field: "source_map".to_string(),
                    message: format!("{path} was given a source map without contents"),
                })
            }
            (None, None) => match original_path {
                Some(original) if original != path => {
                    let content = ContentCell::disk(original.clone());
                    self.replace(File::new(self, path, original, content))
                }
                _ => self.get_absolute(&path),
            },
            (Some(contents), source_map) => {
                let content = match source_map {
                    Some(map) => ContentCell::preset(contents, map),
                    None => ContentCell::raw(contents),
                };
                let original = original_path.unwrap_or_else(|| path.clone());
                self.replace(File::new(self, path, original, content))
            }
        };

        self.inner.members.write().upsert(file.clone());
        Ok(file)
    }

    /// Make `file` a member under `path`.
    ///
    /// Adding the entity this collection already holds at `path` only
    /// ensures membership. Anything else produces a wrapper that reports
    /// `path` but shares `file`'s content.
    ///
    /// # Errors
    ///
    /// - `OutOfScope` if `path` is not below the root
    /// - `InvalidPath` if the path climbs above the filesystem root
    pub fn add_file(&self, path: impl AsRef<Path>, file: &File) -> Result<File> {
        let path = self.scoped(path.as_ref())?;
        let key = canonicalize(&path);

        let existing = self.inner.cache.read().get(&key).cloned();
        let member = match existing {
            Some(existing) if File::ptr_eq(&existing, file) => existing,
            _ => self.replace(file.rehost(self, path)),
        };

        let mut members = self.inner.members.write();
        if let Some(&slot) = members.index.get(&key) {
            if !File::ptr_eq(&members.order[slot], &member) {
                log::debug!("{} replaces an earlier member", member.absolute_path());
            }
        }
        members.upsert(member.clone());
        Ok(member)
    }

    /// Members in the order they were first added.
    #[must_use]
    pub fn list(&self) -> Vec<File> {
        self.inner.members.read().order.clone()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.members.read().order.len()
    }

    /// Whether there are no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the entity at `path` is a member.
    #[must_use]
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        match self.resolve(path) {
            Ok(path) => self
                .inner
                .members
                .read()
                .index
                .contains_key(&canonicalize(&path)),
            Err(_) => false,
        }
    }

    /// A new collection that knows every cached entity but has no members.
    ///
    /// With `new_root`, entities below the current root are re-hosted at the
    /// same relative position under `new_root`. Content is never re-read.
    #[must_use]
    pub fn clone_view(&self, new_root: Option<DirectoryPath>) -> Self {
        let old_root = &self.inner.root;
        let root = new_root.clone().unwrap_or_else(|| old_root.clone());
        let view = Self::build(
            root.clone(),
            Arc::clone(&self.inner.reader),
            self.inner.parent.clone(),
        );

        let entries: Vec<File> = self.inner.cache.read().values().cloned().collect();
        {
            let mut cache = view.inner.cache.write();
            for file in entries {
                let path = match &new_root {
                    Some(new_root)
                        if PathRelationship::is_within(file.absolute_path(), old_root.as_absolute()) =>
                    {
                        let relative = relativize(old_root, file.absolute_path());
                        match resolve(new_root, relative.as_path()) {
                            Ok(path) => path,
                            Err(_) => continue,
                        }
                    }
                    _ => file.absolute_path().clone(),
                };
                let rehosted = file.rehost(&view, path);
                cache.insert(rehosted.canonical_path().clone(), rehosted);
            }
        }
        view
    }

    /// A child collection with the same root that defers cache misses to
    /// this one.
    #[must_use]
    pub fn fork(&self) -> Self {
        self.fork_at(self.inner.root.clone())
    }

    /// A child collection rooted at `root` that defers cache misses to this
    /// one.
    #[must_use]
    pub fn fork_at(&self, root: DirectoryPath) -> Self {
        Self::build(root, Arc::clone(&self.inner.reader), Some(self.clone()))
    }

    /// Cache `file` at its own path, replacing any previous entry.
    fn replace(&self, file: File) -> File {
        self.inner
            .cache
            .write()
            .insert(file.canonical_path().clone(), file.clone());
        file
    }

    fn scoped(&self, path: &Path) -> Result<AbsolutePath> {
        let path = self.resolve(path)?;
        if is_child(&self.inner.root, &path) {
            Ok(path)
        } else {
            Err(Error::OutOfScope {
                path: path.into_path_buf(),
                root: PathBuf::from(self.inner.root.as_path()),
            })
        }
    }
}

impl fmt::Debug for FileCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileCollection")
            .field("root", &self.inner.root)
            .field("members", &self.len())
            .field("forked", &self.inner.parent.is_some())
            .finish()
    }
}
