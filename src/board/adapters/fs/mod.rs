//! Filesystem-backed bucket definition source.

mod json;
mod read;

pub use json::JsonFileBucketDefinitions;
pub use read::read_utf8_file;
