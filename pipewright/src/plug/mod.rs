//! Built-in pipeline sources and plugs.
//!
//! [`Src`] discovers files and is the usual start of a pipeline. The plugs
//! each return a new collection and leave their input untouched:
//!
//! - [`Banner`] and [`Footer`] add text and a map back to the input
//! - [`Rename`] changes extensions
//! - [`Relocate`] moves the collection to another directory
//! - [`Dest`] writes files and their source maps to disk

mod banner;
mod dest;
mod relocate;
mod rename;
mod src;

pub use banner::{Banner, Footer};
pub use dest::{Dest, SourceMapOutput};
pub use relocate::Relocate;
pub use rename::Rename;
pub use src::{discover, DiscoverOptions, Src, DEFAULT_EXCLUDES};
