//! `file://` URIs for workspace paths.
//!
//! Workspace paths are virtual: they are never resolved against the local filesystem, so a
//! command can be rendered for a project that is not checked out on this machine.

use std::fmt::Write as _;
use std::path::Path;

/// Convert a workspace path to a `file://` URI.
///
/// Bytes outside the unreserved set (and `/`) are percent-encoded; Windows separators become
/// `/`.
pub fn path_to_file_uri(path: &Path) -> String {
    let path = path.to_string_lossy();
    let mut uri = String::with_capacity(path.len() + 8);
    uri.push_str("file://");
    if !path.starts_with(['/', '\\']) {
        uri.push('/');
    }
    for byte in path.bytes() {
        match byte {
            b'\\' => uri.push('/'),
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                uri.push(byte as char)
            }
            _ => {
                let _ = write!(uri, "%{byte:02X}");
            }
        }
    }
    uri
}
