//! Property-based tests for the path model.
//!
//! Note: normalize and relationship already carry light property tests.
//! This module runs heavier cases across the functions together.

use super::normalize::{parent, relativize, resolve};
use super::relationship::{is_child, PathRelationship};
use super::types::{AbsolutePath, DirectoryPath};
use proptest::prelude::*;
use std::path::PathBuf;

fn path_component_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,20}"
}

fn absolute_path_strategy() -> impl Strategy<Value = PathBuf> {
    prop::collection::vec(path_component_strategy(), 1..8).prop_map(|parts| {
        let mut path = PathBuf::from("/");
        for part in parts {
            path.push(part);
        }
        path
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 10000,
        max_shrink_iters: 10000,
        .. ProptestConfig::default()
    })]

    // Normalization is idempotent
    #[test]
    fn absolute_path_idempotent(path in absolute_path_strategy()) {
        let once = AbsolutePath::new(&path).unwrap();
        let twice = AbsolutePath::new(once.as_path()).unwrap();
        prop_assert_eq!(once, twice);
    }

    // A path is always a child of its parent (unless it is the root)
    #[test]
    fn path_is_child_of_parent(path in absolute_path_strategy()) {
        let path = AbsolutePath::new(&path).unwrap();
        prop_assert!(is_child(&parent(&path), &path));
    }

    // Relativizing against an ancestor never climbs
    #[test]
    fn relativize_within_ancestor_has_no_parent_refs(path in absolute_path_strategy()) {
        let path = AbsolutePath::new(&path).unwrap();
        let dir = parent(&path);
        let rel = relativize(&dir, &path);
        prop_assert!(!rel.to_slash_string().contains(".."));
    }

    // Resolution of a relativized path returns to the target
    #[test]
    fn resolve_relativize_inverse(a in absolute_path_strategy(), b in absolute_path_strategy()) {
        let base = DirectoryPath::new(&a).unwrap();
        let target = AbsolutePath::new(&b).unwrap();
        let back = resolve(&base, relativize(&base, &target).as_path()).unwrap();
        prop_assert_eq!(PathRelationship::between(&back, &target), PathRelationship::Same);
    }
}
