//! The source-map engine.
//!
//! Maps are parsed once, when a file's contents are first read, into a
//! [`SourceMap`] whose sources are absolute and attached to file entities.
//! [`File::produce_source_map`](crate::File::produce_source_map) then
//! renders (and by default combines) them for an output location.
//!
//! Position arithmetic is delegated to the `sourcemap` crate.

pub(crate) mod comment;
pub(crate) mod compose;
mod map;

pub use comment::{append_source_map_comment, inline_source_map_url};
pub use compose::{ProduceOptions, SourceMapJson};
pub use map::SourceMap;
