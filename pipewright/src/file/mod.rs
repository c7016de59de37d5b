//! File entities, collections and the readers behind them.

mod collection;
mod entity;
mod reader;

pub use collection::{AddOptions, FileCollection};
pub use entity::File;
pub use reader::{ContentReader, DiskReader, MemoryReader};
