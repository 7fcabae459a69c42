//! AssetService: the three admin operations over a flat object store rooted
//! at a fixed prefix (`configs` by default).
//!
//! Every call is stateless. Listings are drained to completion before the
//! hierarchy is rebuilt, and every store call is bounded by a timeout.

use crate::{
    errors::AdminError,
    models::{
        listing::{DELIMITER, ListQuery, StoredObject, VirtualListing},
        upload::{UploadReceipt, UploadRequest},
    },
    services::{
        folder_creator::{SENTINEL_CONTENT_TYPE, sentinel_key},
        hierarchy::{normalize_prefix, reconstruct},
        object_client::ObjectStoreClient,
        storage_service::{StorageError, StorageResult},
        upload_router::route_upload,
    },
};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use std::{future::Future, time::Duration};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderCreated {
    pub success: bool,
}

#[derive(Clone)]
pub struct AssetService<C> {
    client: C,
    root: String,
    timeout: Duration,
    page_size: usize,
}

/// Everything a drained listing returned.
#[derive(Default)]
struct Drained {
    objects: Vec<StoredObject>,
    common_prefixes: Vec<String>,
}

impl<C: ObjectStoreClient> AssetService<C> {
    pub fn new(client: C, root: impl Into<String>, timeout: Duration, page_size: usize) -> Self {
        Self {
            client,
            root: root.into().trim_matches(DELIMITER).to_string(),
            timeout,
            page_size: page_size.max(1),
        }
    }

    /// The root as a virtual path, e.g. `configs/`.
    pub fn root_prefix(&self) -> String {
        format!("{}{}", self.root, DELIMITER)
    }

    /// Folders and files one level below `prefix` (the root when `None` or empty).
    pub async fn list_virtual_path(
        &self,
        prefix: Option<&str>,
    ) -> Result<VirtualListing, AdminError> {
        let root_prefix = self.root_prefix();
        let prefix = match prefix.map(normalize_prefix) {
            Some(p) if !p.is_empty() => p,
            _ => root_prefix.clone(),
        };
        if !prefix.starts_with(&root_prefix) {
            return Err(AdminError::invalid(
                "prefix",
                format!("must start with `{root_prefix}`"),
            ));
        }

        let (flat, grouped) = tokio::try_join!(
            self.drain(&root_prefix, None),
            self.drain(&prefix, Some(DELIMITER)),
        )?;

        let listing = reconstruct(&prefix, &flat.objects, &grouped.common_prefixes);
        info!(
            prefix = %prefix,
            folders = listing.folders.len(),
            files = listing.files.len(),
            "listed virtual path"
        );
        Ok(listing)
    }

    /// Route and write one asset. Overwrites whatever was at the computed key.
    pub async fn upload_asset(&self, request: UploadRequest) -> Result<UploadReceipt, AdminError> {
        let category = request.category;
        let routed = route_upload(&self.root, request, Utc::now())?;

        let stored = self
            .bounded(
                "upload",
                self.client
                    .put_object(&routed.key, &routed.content_type, routed.body),
            )
            .await?;

        info!(
            key = %stored.key,
            %category,
            content_type = %routed.content_type,
            size = stored.size,
            "uploaded asset"
        );
        Ok(UploadReceipt {
            key: stored.key,
            category,
        })
    }

    /// Write the folder's sentinel. Calling it again just rewrites the same empty object.
    pub async fn create_folder(&self, folder: &str) -> Result<FolderCreated, AdminError> {
        let key = sentinel_key(&self.root, folder)?;
        self.bounded(
            "create-folder",
            self.client
                .put_object(&key, SENTINEL_CONTENT_TYPE, Bytes::new()),
        )
        .await?;

        info!(%key, "created virtual folder");
        Ok(FolderCreated { success: true })
    }

    /// Follow `cursor` until the store stops reporting truncation.
    async fn drain(&self, prefix: &str, delimiter: Option<char>) -> Result<Drained, AdminError> {
        let mut drained = Drained::default();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let query = ListQuery {
                prefix: prefix.to_string(),
                delimiter,
                cursor: cursor.clone(),
                max_keys: self.page_size,
            };
            let page = self.bounded("list", self.client.list_page(query)).await?;
            pages += 1;
            drained.objects.extend(page.objects);
            drained.common_prefixes.extend(page.common_prefixes);

            if !page.truncated {
                break;
            }
            match page.cursor {
                Some(next) if cursor.as_ref() != Some(&next) => cursor = Some(next),
                other => {
                    warn!(
                        prefix,
                        cursor = ?other,
                        "store reported a truncated page without a usable cursor; listing is partial"
                    );
                    break;
                }
            }
        }

        debug!(
            prefix,
            grouped = delimiter.is_some(),
            pages,
            objects = drained.objects.len(),
            "drained listing"
        );
        Ok(drained)
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, AdminError>
    where
        F: Future<Output = StorageResult<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(AdminError::storage(operation)),
            Err(_) => Err(AdminError::StorageUnavailable {
                operation,
                source: StorageError::Timeout(self.timeout),
            }),
        }
    }
}
