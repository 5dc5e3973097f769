//! Capability-scoped file reads.

use std::io;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

/// Reads a UTF-8 file by opening its parent directory as a capability.
///
/// A bare file name resolves against the working directory.
///
/// # Errors
///
/// Returns an I/O error when `path` has no file name, or the directory or
/// file cannot be read.
pub fn read_utf8_file(path: &Utf8Path) -> io::Result<String> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("path must include a file name"))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    Dir::open_ambient_dir(parent, ambient_authority())?.read_to_string(file_name)
}
