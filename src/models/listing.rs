//! Listing contracts: what the flat store returns and the virtual folder view
//! derived from it.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Path separator imposed on keys by convention. The store itself knows nothing about it.
pub const DELIMITER: char = '/';

/// One object as reported by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// A single listing request against the flat store.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub prefix: String,
    /// When set, keys sharing a prefix up to the next delimiter are folded into
    /// `ListingPage::common_prefixes`.
    pub delimiter: Option<char>,
    pub cursor: Option<String>,
    pub max_keys: usize,
}

/// One page of a flat store listing.
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    pub objects: Vec<StoredObject>,
    /// Only populated when the query used a delimiter.
    pub common_prefixes: Vec<String>,
    pub truncated: bool,
    pub cursor: Option<String>,
}

/// A file logically inside a virtual folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualFile {
    pub name: String,
    pub folder: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// Everything one level below a queried virtual path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VirtualListing {
    /// Sorted, unique, single-segment names.
    pub folders: Vec<String>,
    pub files: Vec<VirtualFile>,
}
