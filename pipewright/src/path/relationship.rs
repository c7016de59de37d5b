//! Path relationship checking.
//!
//! This module determines how two absolute paths relate in the directory
//! hierarchy, comparing components under the current case policy.

use std::path::{Component, Path};

use super::canonicalize::components_equal;
use super::types::{AbsolutePath, DirectoryPath};

/// Relationship between two paths.
///
/// # Examples
///
/// ```
/// use pipewright::path::{AbsolutePath, PathRelationship};
///
/// let parent = AbsolutePath::new("/home/user").unwrap();
/// let child = AbsolutePath::new("/home/user/project").unwrap();
///
/// assert_eq!(
///     PathRelationship::between(&parent, &child),
///     PathRelationship::Ancestor
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathRelationship {
    /// The first path is an ancestor of the second.
    Ancestor,

    /// The first path is a descendant of the second.
    Descendant,

    /// The paths name the same location.
    Same,

    /// Neither path is beneath the other.
    Unrelated,
}

impl PathRelationship {
    /// Determine the relationship between two paths.
    #[must_use]
    pub fn between(path1: &AbsolutePath, path2: &AbsolutePath) -> Self {
        let p1 = components(path1.as_path());
        let p2 = components(path2.as_path());

        let common = p1
            .iter()
            .zip(p2.iter())
            .take_while(|(a, b)| components_equal(a, b))
            .count();

        match (common == p1.len(), common == p2.len()) {
            (true, true) => Self::Same,
            (true, false) => Self::Ancestor,
            (false, true) => Self::Descendant,
            (false, false) => Self::Unrelated,
        }
    }

    /// Check if the relationship is hierarchical (not unrelated).
    #[must_use]
    pub fn is_hierarchical(&self) -> bool {
        matches!(self, Self::Ancestor | Self::Descendant | Self::Same)
    }

    /// Check if a path is within a directory (descendant or same).
    ///
    /// # Examples
    ///
    /// ```
    /// use pipewright::path::{AbsolutePath, PathRelationship};
    ///
    /// let dir = AbsolutePath::new("/home/user").unwrap();
    /// let file = AbsolutePath::new("/home/user/file.txt").unwrap();
    ///
    /// assert!(PathRelationship::is_within(&file, &dir));
    /// assert!(PathRelationship::is_within(&dir, &dir));
    /// ```
    #[must_use]
    pub fn is_within(path: &AbsolutePath, directory: &AbsolutePath) -> bool {
        matches!(
            Self::between(path, directory),
            Self::Descendant | Self::Same
        )
    }
}

/// Whether `path` lies strictly beneath `dir`.
///
/// # Examples
///
/// ```
/// use pipewright::path::{is_child, AbsolutePath, DirectoryPath};
///
/// let root = DirectoryPath::new("/project").unwrap();
/// assert!(is_child(&root, &AbsolutePath::new("/project/a.js").unwrap()));
/// assert!(!is_child(&root, &AbsolutePath::new("/project").unwrap()));
/// assert!(!is_child(&root, &AbsolutePath::new("/outside/path").unwrap()));
/// ```
#[must_use]
pub fn is_child(dir: &DirectoryPath, path: &AbsolutePath) -> bool {
    PathRelationship::between(path, dir.as_absolute()) == PathRelationship::Descendant
}

/// The deepest directory containing both `a` and `b`.
///
/// # Examples
///
/// ```
/// use pipewright::path::{common_ancestor, DirectoryPath};
///
/// let a = DirectoryPath::new("/project/dist/js").unwrap();
/// let b = DirectoryPath::new("/project/dist/css").unwrap();
/// assert_eq!(common_ancestor(&a, &b), DirectoryPath::new("/project/dist").unwrap());
/// ```
#[must_use]
pub fn common_ancestor(a: &DirectoryPath, b: &DirectoryPath) -> DirectoryPath {
    let pa = components(a.as_path());
    let pb = components(b.as_path());
    let common = pa
        .iter()
        .zip(pb.iter())
        .take_while(|(x, y)| components_equal(x, y))
        .count();

    a.as_path()
        .ancestors()
        .nth(pa.len() - common)
        .and_then(|dir| DirectoryPath::new(dir).ok())
        .unwrap_or_else(|| a.clone())
}

fn components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}
