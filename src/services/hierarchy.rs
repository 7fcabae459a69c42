//! Virtual folder reconstruction over a flat key space.
//!
//! Folders are never stored. They are inferred on every call from three
//! sources: store-reported common prefixes, keys that continue past the queried
//! path, and sentinel objects (which are themselves hidden from the file list).

use crate::models::listing::{DELIMITER, StoredObject, VirtualFile, VirtualListing};
use std::collections::BTreeSet;

/// Name of the zero-byte object that keeps an otherwise empty folder visible.
pub const SENTINEL_NAME: &str = ".placeholder";

/// Normalize a virtual path so it ends with exactly one delimiter.
/// The empty path stays empty.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_start_matches(DELIMITER);
    if trimmed.is_empty() || trimmed.ends_with(DELIMITER) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, DELIMITER)
    }
}

/// Last non-empty segment of a path, or `""` when there is none.
pub fn last_segment(path: &str) -> &str {
    path.split(DELIMITER)
        .filter(|segment| !segment.is_empty())
        .next_back()
        .unwrap_or("")
}

/// Build the view one level below `prefix`.
///
/// `flat` is every object under the root; anything outside `prefix` is ignored.
/// `common_prefixes` comes from a delimiter-grouped listing of `prefix`.
/// Classification is always relative to `prefix`, never by absolute segment index.
pub fn reconstruct<'a, O>(prefix: &str, flat: O, common_prefixes: &[String]) -> VirtualListing
where
    O: IntoIterator<Item = &'a StoredObject>,
{
    let mut folders = BTreeSet::new();
    let mut files = Vec::new();
    let parent = last_segment(prefix);

    for common in common_prefixes {
        if let Some(rest) = common.strip_prefix(prefix) {
            let name = last_segment(rest);
            if !name.is_empty() {
                folders.insert(name.to_string());
            }
        }
    }

    for object in flat {
        let Some(relative) = object.key.strip_prefix(prefix) else {
            continue;
        };

        match relative.split_once(DELIMITER) {
            None if relative.is_empty() || relative == SENTINEL_NAME => {}
            None => files.push(VirtualFile {
                name: relative.to_string(),
                folder: parent.to_string(),
                size: object.size,
                uploaded_at: object.uploaded_at,
            }),
            Some((first, _)) if !first.is_empty() => {
                folders.insert(first.to_string());
            }
            Some(_) => {}
        }
    }

    VirtualListing {
        folders: folders.into_iter().collect(),
        files,
    }
}
