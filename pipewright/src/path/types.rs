//! Core types for path handling.
//!
//! Every file operation in the library speaks in terms of these branded
//! path types so that absolute, relative, canonical and directory paths can
//! never be confused with one another.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

use super::normalize::resolve_components;

/// A normalized absolute path.
///
/// Construction resolves `.` and `..` components, so two `AbsolutePath`s
/// naming the same location compare equal byte-for-byte (modulo case, see
/// [`CanonicalPath`]).
///
/// # Examples
///
/// ```
/// use pipewright::path::AbsolutePath;
///
/// let path = AbsolutePath::new("/project/./src/../lib/a.js").unwrap();
/// assert_eq!(path.as_path(), std::path::Path::new("/project/lib/a.js"));
/// assert!(AbsolutePath::new("relative/a.js").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AbsolutePath(PathBuf);

impl AbsolutePath {
    /// Create a new absolute path, normalizing its components.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if the path is relative or escapes the root.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_absolute() {
            return Err(Error::InvalidPath {
                path,
                reason: "Path must be absolute".to_string(),
            });
        }
        Ok(Self(resolve_components(&path)?))
    }

    /// Get a reference to the path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Convert into the underlying `PathBuf`.
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// The final component, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name().and_then(|n| n.to_str())
    }

    /// The path as a string, lossily converted.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        self.0.to_string_lossy().into_owned()
    }

    /// Append a suffix to the final component (`a.js` -> `a.js.map`).
    #[must_use]
    pub fn with_suffix(&self, suffix: &str) -> Self {
        let mut raw = self.0.clone().into_os_string();
        raw.push(suffix);
        Self(PathBuf::from(raw))
    }

    /// Replace the extension of the final component.
    #[must_use]
    pub fn with_extension(&self, extension: &str) -> Self {
        Self(self.0.with_extension(extension))
    }

    /// Whether this path is the filesystem root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.parent().is_none()
    }
}

impl AsRef<Path> for AbsolutePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for AbsolutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// A path relative to some directory.
///
/// # Examples
///
/// ```
/// use pipewright::path::RelativePath;
///
/// let rel = RelativePath::new("../src/a.ts").unwrap();
/// assert_eq!(rel.to_slash_string(), "../src/a.ts");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    /// Create a relative path.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if the path is absolute.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.has_root() {
            return Err(Error::InvalidPath {
                path,
                reason: "Path must be relative".to_string(),
            });
        }
        Ok(Self(path))
    }

    pub(crate) fn from_components(components: Vec<String>) -> Self {
        Self(components.into_iter().collect())
    }

    /// Get a reference to the path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Whether the path is empty (base and target were the same).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.as_os_str().is_empty()
    }

    /// Render with `/` separators regardless of platform, as source maps expect.
    #[must_use]
    pub fn to_slash_string(&self) -> String {
        self.0
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                Component::ParentDir => Some("..".to_string()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_slash_string())
    }
}

/// The identity key of an absolute path under the current case policy.
///
/// Equal to the absolute path on case-sensitive filesystems and to its
/// case-folded form otherwise. Produced only by
/// [`canonicalize`](super::canonicalize::canonicalize).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    pub(crate) fn from_folded(folded: String) -> Self {
        Self(folded)
    }

    /// The canonical key as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An absolute path known to be used as a directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DirectoryPath(AbsolutePath);

impl DirectoryPath {
    /// Create a directory path from anything absolute.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if the path is relative or escapes the root.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        AbsolutePath::new(path).map(Self)
    }

    /// The directory as an absolute path.
    #[must_use]
    pub fn as_absolute(&self) -> &AbsolutePath {
        &self.0
    }

    /// Get a reference to the path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        self.0.as_path()
    }
}

impl From<AbsolutePath> for DirectoryPath {
    fn from(path: AbsolutePath) -> Self {
        Self(path)
    }
}

impl AsRef<Path> for DirectoryPath {
    fn as_ref(&self) -> &Path {
        self.0.as_path()
    }
}

impl fmt::Display for DirectoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
