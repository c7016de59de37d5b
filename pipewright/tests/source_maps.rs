//! Source-map extraction and composition across files.

mod common;

use common::{abs, memory_collection};
use pipewright::file::AddOptions;
use pipewright::{ProduceOptions, SourceMap};

const SIMPLE: ProduceOptions = ProduceOptions {
    combine_source_maps: false,
    sources_content: true,
};

/// `a.js` maps to `b.js`, which maps to `c.ts`.
fn chain() -> pipewright::FileCollection {
    let (files, _) = memory_collection(
        "/p",
        &[
            ("/p/c.ts", "let c: number = 1;"),
            ("/p/b.js", "let c = 1;\n//# sourceMappingURL=b.js.map"),
            (
                "/p/b.js.map",
                r#"{"version":3,"file":"b.js","sources":["c.ts"],"names":["c"],"mappings":"AAAIA"}"#,
            ),
            ("/p/a.js", "let c=1;\n//# sourceMappingURL=a.js.map"),
            (
                "/p/a.js.map",
                r#"{"version":3,"file":"a.js","sources":["b.js"],"names":[],"mappings":"AAAA,IAAI"}"#,
            ),
        ],
    );
    files
}

#[test]
fn test_combined_sources_reach_the_original() {
    let files = chain();
    let a = files.get("a.js").unwrap();
    assert_eq!(&*a.contents_sync().unwrap(), "let c=1;\n");

    let combined = a
        .produce_source_map_sync(&abs("/p/a.js"), &ProduceOptions::default())
        .unwrap()
        .unwrap();
    assert_eq!(combined.sources, ["c.ts"]);
    assert_eq!(
        combined.sources_content,
        Some(vec![Some("let c: number = 1;".to_string())])
    );
    assert_eq!(combined.names, ["c"]);
}

#[test]
fn test_simple_mode_stops_at_the_parent() {
    let files = chain();
    let a = files.get("a.js").unwrap();
    let simple = a
        .produce_source_map_sync(&abs("/p/a.js"), &SIMPLE)
        .unwrap()
        .unwrap();
    assert_eq!(simple.sources, ["b.js"]);
    // The attached source is read with its comment stripped.
    assert_eq!(simple.sources_content, Some(vec![Some("let c = 1;\n".to_string())]));
    assert_eq!(simple.mappings, "AAAA,IAAI");
}

#[test]
fn test_simple_mode_round_trip() {
    let files = chain();
    let a = files.get("a.js").unwrap();
    let written = a
        .produce_source_map_sync(&abs("/p/out/a.js"), &SIMPLE)
        .unwrap()
        .unwrap();
    assert_eq!(written.sources, ["../b.js"]);

    let parsed = SourceMap::parse(&written.to_json().unwrap(), &abs("/p/out/a.js.map"), Some(&files))
        .unwrap()
        .unwrap();
    assert_eq!(parsed.sources(), ["/p/b.js"]);
    let copy = files
        .add(
            "out/a.js",
            AddOptions::contents("let c=1;\n").with_source_map(parsed),
        )
        .unwrap();

    let again = copy
        .produce_source_map_sync(&abs("/p/a.js"), &SIMPLE)
        .unwrap()
        .unwrap();
    assert_eq!(again.mappings, written.mappings);
    assert_eq!(again.names, written.names);
    assert_eq!(again.sources, ["b.js"]);
    assert_eq!(again.sources_content, written.sources_content);
}

#[test]
fn test_missing_link_keeps_parent_entry() {
    let (files, _) = memory_collection(
        "/p",
        &[
            ("/p/a.js", "x\n//# sourceMappingURL=a.js.map"),
            (
                "/p/a.js.map",
                r#"{"version":3,"sources":["gone.js"],"names":[],"mappings":"AAAA"}"#,
            ),
        ],
    );
    let map = files
        .get("a.js")
        .unwrap()
        .produce_source_map_sync(&abs("/p/a.js"), &ProduceOptions::default())
        .unwrap()
        .unwrap();
    assert_eq!(map.sources, ["gone.js"]);
    assert_eq!(map.sources_content, Some(vec![None]));
}

#[test]
fn test_file_without_map_produces_none() {
    let (files, _) = memory_collection("/p", &[("/p/a.js", "x")]);
    let produced = files
        .get("a.js")
        .unwrap()
        .produce_source_map_sync(&abs("/p/a.js"), &ProduceOptions::default())
        .unwrap();
    assert!(produced.is_none());
}

#[test]
fn test_unsupported_version_is_no_map() {
    let (files, _) = memory_collection(
        "/p",
        &[
            ("/p/a.js", "x\n//# sourceMappingURL=a.js.map"),
            ("/p/a.js.map", r#"{"version":2,"sources":[],"names":[],"mappings":""}"#),
        ],
    );
    let a = files.get("a.js").unwrap();
    assert!(a.source_map_sync().unwrap().is_none());
    assert_eq!(&*a.contents_sync().unwrap(), "x\n");
}

#[test]
fn test_non_string_source_is_rejected() {
    let (files, _) = memory_collection(
        "/p",
        &[
            ("/p/a.js", "x\n//# sourceMappingURL=a.js.map"),
            ("/p/a.js.map", r#"{"version":"3","sources":[1],"names":[],"mappings":""}"#),
        ],
    );
    let err = files.get("a.js").unwrap().source_map_sync().unwrap_err();
    assert!(matches!(err.root(), pipewright::Error::InvalidSourceMap { .. }));
}
