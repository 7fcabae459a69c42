//! Empty virtual folders, made visible by a zero-byte sentinel object.

use crate::{
    errors::AdminError,
    services::{
        hierarchy::SENTINEL_NAME,
        upload_router::{compose_key, validate_segment},
    },
};

pub const SENTINEL_CONTENT_TYPE: &str = "text/plain";

/// Key of the sentinel for `folder` under `root`.
pub fn sentinel_key(root: &str, folder: &str) -> Result<String, AdminError> {
    let folder = validate_segment("folder", folder)?;
    compose_key("folder", root, folder, SENTINEL_NAME)
}
