//! Identity under both case policies.
//!
//! The policy is process-wide, so every test here runs serially and puts
//! the detected policy back when done.

mod common;

use common::{abs, memory_collection};
use pipewright::file::AddOptions;
use pipewright::path::{canonicalize, set_case_sensitivity, CaseSensitivity};
use pipewright::File;
use serial_test::serial;

struct PolicyGuard;

impl PolicyGuard {
    fn set(policy: CaseSensitivity) -> Self {
        set_case_sensitivity(Some(policy));
        Self
    }
}

impl Drop for PolicyGuard {
    fn drop(&mut self) {
        set_case_sensitivity(None);
    }
}

#[test]
#[serial]
fn test_insensitive_spellings_share_an_entity() {
    let _guard = PolicyGuard::set(CaseSensitivity::Insensitive);
    let (files, _) = memory_collection("/Project", &[]);

    let lower = files.get("/project/src/a.js").unwrap();
    let upper = files.get("/PROJECT/SRC/A.JS").unwrap();
    assert!(File::ptr_eq(&lower, &upper));
    assert_eq!(canonicalize(&abs("/Project/A.js")).as_str(), "/project/a.js");

    // Membership follows identity too.
    files.add("src/a.js", AddOptions::contents("a")).unwrap();
    assert!(files.contains("SRC/A.JS"));
}

#[test]
#[serial]
fn test_sensitive_spellings_are_distinct() {
    let _guard = PolicyGuard::set(CaseSensitivity::Sensitive);
    let (files, _) = memory_collection("/project", &[]);

    let lower = files.get("a.js").unwrap();
    let upper = files.get("A.js").unwrap();
    assert!(!File::ptr_eq(&lower, &upper));

    files.add("a.js", AddOptions::contents("a")).unwrap();
    files.add("A.js", AddOptions::contents("b")).unwrap();
    assert_eq!(files.len(), 2);
}

#[test]
#[serial]
fn test_insensitive_scope_check() {
    let _guard = PolicyGuard::set(CaseSensitivity::Insensitive);
    let (files, _) = memory_collection("/Project", &[]);
    files.add("/project/a.js", AddOptions::contents("a")).unwrap();
    assert_eq!(files.len(), 1);
}

#[test]
#[serial]
fn test_override_can_be_cleared() {
    set_case_sensitivity(Some(CaseSensitivity::Insensitive));
    assert_eq!(pipewright::path::case_sensitivity(), CaseSensitivity::Insensitive);
    set_case_sensitivity(None);
    // Back to whatever the host filesystem reports.
    let detected = pipewright::path::case_sensitivity();
    assert_eq!(
        detected,
        pipewright::path::canonicalize::detect_case_sensitivity(&std::env::temp_dir())
    );
}
