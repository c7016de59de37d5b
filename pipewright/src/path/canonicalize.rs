//! Case-sensitivity policy and path canonicalization.
//!
//! Whether two spellings of a path name the same file depends on the
//! filesystem. The policy is process-wide: it is detected once, on first
//! use, by probing the temporary directory, and can be overridden (tests do
//! this to exercise both behaviours on any host).

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};

use super::types::{AbsolutePath, CanonicalPath};

const UNDETECTED: u8 = 0;
const SENSITIVE: u8 = 1;
const INSENSITIVE: u8 = 2;

static DETECTED: AtomicU8 = AtomicU8::new(UNDETECTED);
static OVERRIDE: AtomicU8 = AtomicU8::new(UNDETECTED);

/// How the filesystem compares path spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseSensitivity {
    /// `A.js` and `a.js` are different files.
    Sensitive,
    /// `A.js` and `a.js` are the same file.
    Insensitive,
}

impl CaseSensitivity {
    const fn encode(self) -> u8 {
        match self {
            Self::Sensitive => SENSITIVE,
            Self::Insensitive => INSENSITIVE,
        }
    }

    const fn decode(raw: u8) -> Option<Self> {
        match raw {
            SENSITIVE => Some(Self::Sensitive),
            INSENSITIVE => Some(Self::Insensitive),
            _ => None,
        }
    }
}

/// The policy currently in force.
///
/// An override wins; otherwise the filesystem is probed on first call and
/// the answer is kept for the rest of the process.
pub fn case_sensitivity() -> CaseSensitivity {
    if let Some(policy) = CaseSensitivity::decode(OVERRIDE.load(Ordering::Acquire)) {
        return policy;
    }
    if let Some(policy) = CaseSensitivity::decode(DETECTED.load(Ordering::Acquire)) {
        return policy;
    }
    let detected = detect_case_sensitivity(&std::env::temp_dir());
    // Concurrent first callers probe the same directory and agree.
    DETECTED.store(detected.encode(), Ordering::Release);
    detected
}

/// Force a policy, or pass `None` to go back to the detected one.
pub fn set_case_sensitivity(policy: Option<CaseSensitivity>) {
    let raw = policy.map_or(UNDETECTED, CaseSensitivity::encode);
    OVERRIDE.store(raw, Ordering::Release);
    log::debug!("case sensitivity override set to {policy:?}");
}

/// Probe `dir` by creating a lower-case file and looking it up upper-cased.
///
/// Falls back to the platform convention when the directory is not writable.
#[must_use]
pub fn detect_case_sensitivity(dir: &Path) -> CaseSensitivity {
    let probe = dir.join(format!("pipewright-case-probe-{}", std::process::id()));
    let upper = dir.join(format!("PIPEWRIGHT-CASE-PROBE-{}", std::process::id()));

    if fs::write(&probe, b"").is_err() {
        return platform_default();
    }
    let insensitive = upper.exists();
    let _ = fs::remove_file(&probe);

    if insensitive {
        CaseSensitivity::Insensitive
    } else {
        CaseSensitivity::Sensitive
    }
}

fn platform_default() -> CaseSensitivity {
    if cfg!(any(target_os = "macos", target_os = "windows")) {
        CaseSensitivity::Insensitive
    } else {
        CaseSensitivity::Sensitive
    }
}

/// The identity key of `path` under the current policy.
///
/// # Examples
///
/// ```
/// use pipewright::path::{canonicalize, AbsolutePath};
///
/// let path = AbsolutePath::new("/project/a.js").unwrap();
/// assert!(canonicalize(&path).as_str().ends_with("a.js"));
/// ```
#[must_use]
pub fn canonicalize(path: &AbsolutePath) -> CanonicalPath {
    let raw = path.to_string_lossy();
    match case_sensitivity() {
        CaseSensitivity::Sensitive => CanonicalPath::from_folded(raw),
        CaseSensitivity::Insensitive => CanonicalPath::from_folded(raw.to_lowercase()),
    }
}

/// Whether two path components name the same entry under the current policy.
#[must_use]
pub fn components_equal(a: &str, b: &str) -> bool {
    match case_sensitivity() {
        CaseSensitivity::Sensitive => a == b,
        CaseSensitivity::Insensitive => a.to_lowercase() == b.to_lowercase(),
    }
}
