//! Link-pointer detection over JSON values.
//!
//! A link pointer is a single-key object `{ "/": <target> }` denoting "this
//! value lives elsewhere". It is the only recognized indirection form; any
//! other shape is inline data. The target is either a content reference
//! (before materialization) or a relative file path (after).

use serde_json::{json, Value};

use crate::reference::ContentRef;

/// The key marking a link pointer.
pub const LINK_KEY: &str = "/";

/// The key used for rewritten, file-local links.
pub const PATH_KEY: &str = "path";

/// Returns the pointer target if `value` is a link pointer.
///
/// Only a single-key object whose key is `"/"` and whose value is a string
/// qualifies. Extra keys disqualify the object: it is then inline data that
/// merely happens to contain a `/` field.
pub fn link_target(value: &Value) -> Option<&str> {
    let map = value.as_object()?;
    if map.len() != 1 {
        return None;
    }
    map.get(LINK_KEY)?.as_str()
}

/// Returns the validated content reference if `value` is a link pointer whose
/// target is a CID (as opposed to a relative path).
pub fn link_reference(value: &Value) -> Option<ContentRef> {
    ContentRef::parse(link_target(value)?).ok()
}

/// Build the cycle-marker form of a pointer: `{ "/": <cid> }`.
///
/// Used where a target was already visited and must not be descended into
/// again; the marker preserves the reference for the reader.
pub fn cycle_marker(reference: &ContentRef) -> Value {
    json!({ LINK_KEY: reference.as_str() })
}

/// Build a rewritten, file-local link: `{ "path": <relative-path> }`.
pub fn path_link(relative: &str) -> Value {
    json!({ PATH_KEY: relative })
}
