//! Shared state handed to every handler.

use crate::{
    auth::SessionValidator,
    services::{
        asset_service::AssetService, object_client::BucketClient, storage_service::StorageService,
    },
};

#[derive(Clone)]
pub struct AppState {
    /// Embedded flat store, used directly by health checks and public asset reads.
    pub storage: StorageService,
    /// Bucket every asset key lives in.
    pub bucket: String,
    /// The admin operations.
    pub assets: AssetService<BucketClient>,
    pub sessions: SessionValidator,
}

impl AppState {
    pub fn new(
        storage: StorageService,
        bucket: impl Into<String>,
        assets: AssetService<BucketClient>,
        sessions: SessionValidator,
    ) -> Self {
        Self {
            storage,
            bucket: bucket.into(),
            assets,
            sessions,
        }
    }
}
