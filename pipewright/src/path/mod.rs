//! The path model.
//!
//! Branded path types and the pure functions that relate them. All file
//! operations accept and return [`AbsolutePath`]s; identity comparisons go
//! through [`canonicalize`], which folds case only when the process-wide
//! [`CaseSensitivity`] policy says the filesystem is case-insensitive.
//!
//! # Examples
//!
//! ```
//! use pipewright::path::{normalize, AbsolutePath, DirectoryPath};
//! use std::path::Path;
//!
//! let root = DirectoryPath::new("/project").unwrap();
//! let file = normalize::resolve(&root, Path::new("src/../lib/a.js")).unwrap();
//! assert_eq!(file, AbsolutePath::new("/project/lib/a.js").unwrap());
//!
//! let dist = DirectoryPath::new("/project/dist").unwrap();
//! assert_eq!(normalize::relativize(&dist, &file).to_slash_string(), "../lib/a.js");
//! ```

pub mod canonicalize;
pub mod normalize;
pub mod relationship;
mod types;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use canonicalize::{canonicalize, case_sensitivity, set_case_sensitivity, CaseSensitivity};
pub use normalize::{parent, relativize, resolve};
pub use relationship::{common_ancestor, is_child, PathRelationship};
pub use types::{AbsolutePath, CanonicalPath, DirectoryPath, RelativePath};
