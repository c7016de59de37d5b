//! Pure path arithmetic.
//!
//! This module provides the total functions of the path model:
//! - Expanding tilde (~) to the home directory
//! - Resolving `.` and `..` components
//! - Resolving a path against a base directory
//! - Expressing one path relative to a directory
//! - Taking the parent directory of a path

use std::env;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

use super::canonicalize::components_equal;
use super::types::{AbsolutePath, DirectoryPath, RelativePath};

/// Expand tilde (~) to the home directory.
///
/// This function handles `~` and `~/path` but does not support `~user` syntax.
///
/// # Errors
///
/// Returns an error if:
/// - The path contains invalid UTF-8
/// - The home directory cannot be determined
/// - The path uses `~user` syntax (not supported)
///
/// # Examples
///
/// ```
/// use pipewright::path::normalize::expand_tilde;
/// use std::path::Path;
///
/// let expanded = expand_tilde(Path::new("/absolute")).unwrap();
/// assert_eq!(expanded, Path::new("/absolute"));
/// ```
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_str().ok_or_else(|| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: "Path contains invalid UTF-8".to_string(),
    })?;

    if !path_str.starts_with('~') {
        return Ok(path.to_path_buf());
    }

    let home = home::home_dir().ok_or_else(|| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: "Cannot determine home directory".to_string(),
    })?;

    if path_str == "~" {
        Ok(home)
    } else if path_str.starts_with("~/") || path_str.starts_with("~\\") {
        Ok(home.join(&path_str[2..]))
    } else {
        Err(Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "~user syntax is not supported; use ~ or ~/path".to_string(),
        })
    }
}

/// Resolve `.` and `..` components in an absolute path.
///
/// # Errors
///
/// Returns an error if the path contains too many `..` components that would
/// escape the root directory.
///
/// # Examples
///
/// ```
/// use pipewright::path::normalize::resolve_components;
/// use std::path::{Path, PathBuf};
///
/// let resolved = resolve_components(Path::new("/a/./b/../c")).unwrap();
/// assert_eq!(resolved, PathBuf::from("/a/c"));
/// ```
pub fn resolve_components(path: &Path) -> Result<PathBuf> {
    let mut result = PathBuf::new();
    let mut has_root = false;
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::RootDir => {
                result.push(component);
                has_root = true;
            }
            Component::Prefix(prefix) => {
                result.push(prefix.as_os_str());
                has_root = true;
            }
            Component::Normal(c) => {
                result.push(c);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(Error::InvalidPath {
                        path: path.to_path_buf(),
                        reason: "Path contains too many '..' components (escapes root)".to_string(),
                    });
                }
                result.pop();
                depth -= 1;
            }
        }
    }

    if has_root && result.as_os_str().is_empty() {
        result.push(Component::RootDir);
    }

    Ok(result)
}

/// Resolve `path` against `base`.
///
/// Absolute inputs are only normalized; relative inputs are joined onto the
/// base first.
///
/// # Errors
///
/// Returns `InvalidPath` if the result would escape the filesystem root.
///
/// # Examples
///
/// ```
/// use pipewright::path::{normalize::resolve, DirectoryPath};
/// use std::path::Path;
///
/// let base = DirectoryPath::new("/project/src").unwrap();
/// let file = resolve(&base, Path::new("../lib/a.js")).unwrap();
/// assert_eq!(file.as_path(), Path::new("/project/lib/a.js"));
/// assert!(resolve(&base, Path::new("../../../x")).is_err());
/// ```
pub fn resolve(base: &DirectoryPath, path: &Path) -> Result<AbsolutePath> {
    if path.has_root() {
        AbsolutePath::new(path)
    } else {
        AbsolutePath::new(base.as_path().join(path))
    }
}

/// Express `target` relative to the directory `base`.
///
/// Components are compared under the current case policy. The result is
/// empty when both name the same location.
///
/// # Examples
///
/// ```
/// use pipewright::path::{normalize::relativize, AbsolutePath, DirectoryPath};
///
/// let base = DirectoryPath::new("/project/dist").unwrap();
/// let target = AbsolutePath::new("/project/src/a.ts").unwrap();
/// assert_eq!(relativize(&base, &target).to_slash_string(), "../src/a.ts");
/// ```
#[must_use]
pub fn relativize(base: &DirectoryPath, target: &AbsolutePath) -> RelativePath {
    let base_parts = normal_components(base.as_path());
    let target_parts = normal_components(target.as_path());

    let common = base_parts
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| components_equal(a, b))
        .count();

    let mut parts: Vec<String> = std::iter::repeat("..".to_string())
        .take(base_parts.len() - common)
        .collect();
    parts.extend(target_parts[common..].iter().cloned());
    RelativePath::from_components(parts)
}

/// The directory containing `path`. The root is its own parent.
///
/// # Examples
///
/// ```
/// use pipewright::path::{normalize::parent, AbsolutePath};
/// use std::path::Path;
///
/// let file = AbsolutePath::new("/foo/bar.js").unwrap();
/// assert_eq!(parent(&file).as_path(), Path::new("/foo"));
/// ```
#[must_use]
pub fn parent(path: &AbsolutePath) -> DirectoryPath {
    match path.as_path().parent() {
        // The parent of a normalized absolute path is itself normalized.
        Some(dir) => DirectoryPath::from(
            AbsolutePath::new(dir).unwrap_or_else(|_| path.clone()),
        ),
        None => DirectoryPath::from(path.clone()),
    }
}

/// Normalize a path to absolute form relative to the process working
/// directory, expanding `~`.
///
/// # Errors
///
/// Returns an error if tilde expansion fails, the current directory cannot
/// be determined or the path escapes the root.
pub fn normalize(path: &Path) -> Result<AbsolutePath> {
    let expanded = expand_tilde(path)?;

    if expanded.is_absolute() {
        return AbsolutePath::new(expanded);
    }

    let cwd = env::current_dir().map_err(|e| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: format!("Cannot get current directory: {e}"),
    })?;
    AbsolutePath::new(cwd.join(expanded))
}

fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(p: &str) -> DirectoryPath {
        DirectoryPath::new(p).unwrap()
    }

    fn abs(p: &str) -> AbsolutePath {
        AbsolutePath::new(p).unwrap()
    }

    #[test]
    fn test_expand_tilde_with_path() {
        let home = home::home_dir().unwrap();
        let expanded = expand_tilde(Path::new("~/test")).unwrap();
        assert_eq!(expanded, home.join("test"));
    }

    #[test]
    fn test_expand_tilde_user_syntax_not_supported() {
        assert!(expand_tilde(Path::new("~user/path")).is_err());
    }

    #[test]
    fn test_resolve_components_multiple_parent() {
        let resolved = resolve_components(Path::new("/a/b/../../c")).unwrap();
        assert_eq!(resolved, PathBuf::from("/c"));
    }

    #[test]
    fn test_resolve_components_root_only() {
        let resolved = resolve_components(Path::new("/")).unwrap();
        assert_eq!(resolved, PathBuf::from("/"));
    }

    #[test]
    fn test_resolve_components_too_many_parent() {
        assert!(resolve_components(Path::new("/a/../..")).is_err());
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let base = dir("/project");
        assert_eq!(resolve(&base, Path::new("src/a.js")).unwrap(), abs("/project/src/a.js"));
        assert_eq!(resolve(&base, Path::new("/other/b.js")).unwrap(), abs("/other/b.js"));
        assert_eq!(resolve(&base, Path::new("./x/../y")).unwrap(), abs("/project/y"));
    }

    #[test]
    fn test_resolve_escaping_root_fails() {
        let err = resolve(&dir("/a"), Path::new("../../b")).unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
    }

    #[test]
    fn test_relativize_sibling_directories() {
        let rel = relativize(&dir("/project/dist"), &abs("/project/src/a.ts"));
        assert_eq!(rel.to_slash_string(), "../src/a.ts");
    }

    #[test]
    fn test_relativize_child() {
        let rel = relativize(&dir("/project"), &abs("/project/src/a.ts"));
        assert_eq!(rel.to_slash_string(), "src/a.ts");
    }

    #[test]
    fn test_relativize_same() {
        assert!(relativize(&dir("/project"), &abs("/project")).is_empty());
    }

    #[test]
    fn test_parent() {
        assert_eq!(parent(&abs("/foo/bar.js")), dir("/foo"));
        assert_eq!(parent(&abs("/")), dir("/"));
    }

    #[test]
    fn test_normalize_relative() {
        let cwd = env::current_dir().unwrap();
        let normalized = normalize(Path::new("relative/path")).unwrap();
        assert!(normalized.as_path().starts_with(&cwd));
        assert!(normalized.as_path().ends_with("relative/path"));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn path_strategy() -> impl Strategy<Value = String> {
            prop::collection::vec("[a-z0-9_-]{1,10}", 1..=5)
                .prop_map(|parts| format!("/{}", parts.join("/")))
        }

        proptest! {
            /// Resolving a relativized path yields the original target
            #[test]
            fn relativize_then_resolve_round_trips(b in path_strategy(), t in path_strategy()) {
                let base = DirectoryPath::new(b.as_str()).unwrap();
                let target = AbsolutePath::new(t.as_str()).unwrap();
                let rel = relativize(&base, &target);
                let back = resolve(&base, rel.as_path()).unwrap();
                prop_assert_eq!(back, target);
            }

            /// Normalized paths contain no `.` or `..` components
            #[test]
            fn normalized_has_no_dot_components(s in path_strategy()) {
                let path = AbsolutePath::new(format!("{s}/./x/..")).unwrap();
                for component in path.as_path().components() {
                    prop_assert_ne!(component, Component::CurDir);
                    prop_assert_ne!(component, Component::ParentDir);
                }
            }
        }
    }
}
