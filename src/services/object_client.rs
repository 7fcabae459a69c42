//! The seam between the asset core and whatever flat store sits underneath.
//!
//! The core only ever needs two primitives, `put_object` and `list_page`.
//! `BucketClient` provides them over the embedded `StorageService`.

use crate::{
    models::listing::{ListQuery, ListingPage, StoredObject},
    services::storage_service::{ListObjectsParams, StorageError, StorageResult, StorageService},
};
use bytes::Bytes;
use std::{future::Future, io};

pub trait ObjectStoreClient: Clone + Send + Sync + 'static {
    /// Unconditional single-key write. The store's last write wins.
    fn put_object(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> impl Future<Output = StorageResult<StoredObject>> + Send;

    /// One page of a prefix listing.
    fn list_page(&self, query: ListQuery) -> impl Future<Output = StorageResult<ListingPage>> + Send;
}

/// A `StorageService` scoped to a single bucket.
#[derive(Clone)]
pub struct BucketClient {
    storage: StorageService,
    bucket: String,
}

impl BucketClient {
    pub fn new(storage: StorageService, bucket: impl Into<String>) -> Self {
        Self {
            storage,
            bucket: bucket.into(),
        }
    }
}

impl ObjectStoreClient for BucketClient {
    async fn put_object(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> StorageResult<StoredObject> {
        // Detached so a caller that stops waiting cannot cut the write short.
        let storage = self.storage.clone();
        let bucket = self.bucket.clone();
        let key = key.to_string();
        let content_type = content_type.to_string();
        let object = tokio::spawn(async move {
            storage
                .put_object(&bucket, &key, Some(content_type), body)
                .await
        })
        .await
        .map_err(|err| StorageError::Io(io::Error::other(err)))??;
        Ok(object.into())
    }

    async fn list_page(&self, query: ListQuery) -> StorageResult<ListingPage> {
        let params = ListObjectsParams {
            prefix: Some(query.prefix),
            delimiter: query.delimiter.map(String::from),
            continuation_token: query.cursor,
            max_keys: query.max_keys,
        };
        let result = self.storage.list_objects_v2(&self.bucket, params).await?;
        Ok(ListingPage {
            objects: result.objects.into_iter().map(StoredObject::from).collect(),
            common_prefixes: result.common_prefixes,
            truncated: result.is_truncated,
            cursor: result.next_continuation_token,
        })
    }
}

/// In-memory store used to drive the core in tests, with hooks for
/// failures and slow calls.
#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use chrono::Utc;
    use std::{
        collections::{BTreeMap, BTreeSet},
        sync::{
            Arc, Mutex,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
        time::Duration,
    };

    #[derive(Debug, Clone)]
    pub(crate) struct Written {
        pub object: StoredObject,
        pub content_type: String,
        pub body: Bytes,
    }

    /// How a misbehaving store reports the cursor of a truncated page.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) enum CursorFault {
        Missing,
        Repeated,
    }

    #[derive(Clone, Default)]
    pub(crate) struct MemoryStore {
        objects: Arc<Mutex<BTreeMap<String, Written>>>,
        fail: Arc<AtomicBool>,
        delay: Arc<Mutex<Option<Duration>>>,
        cursor_fault: Arc<Mutex<Option<CursorFault>>>,
        list_calls: Arc<AtomicUsize>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&self, key: &str, size: u64) {
            let object = StoredObject {
                key: key.to_string(),
                size,
                uploaded_at: Utc::now(),
            };
            self.objects.lock().unwrap().insert(
                key.to_string(),
                Written {
                    object,
                    content_type: "application/octet-stream".into(),
                    body: Bytes::from(vec![0u8; size as usize]),
                },
            );
        }

        pub fn get(&self, key: &str) -> Option<Written> {
            self.objects.lock().unwrap().get(key).cloned()
        }

        pub fn keys(&self) -> Vec<String> {
            self.objects.lock().unwrap().keys().cloned().collect()
        }

        pub fn fail_all(&self) {
            self.fail.store(true, Ordering::SeqCst);
        }

        pub fn delay_all(&self, delay: Duration) {
            *self.delay.lock().unwrap() = Some(delay);
        }

        pub fn fault_cursors(&self, fault: CursorFault) {
            *self.cursor_fault.lock().unwrap() = Some(fault);
        }

        pub fn list_calls(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }

        async fn before_call(&self) -> StorageResult<()> {
            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(StorageError::Io(io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    "memory store offline at 10.0.0.7:9000",
                )));
            }
            Ok(())
        }
    }

    impl ObjectStoreClient for MemoryStore {
        async fn put_object(
            &self,
            key: &str,
            content_type: &str,
            body: Bytes,
        ) -> StorageResult<StoredObject> {
            self.before_call().await?;
            let object = StoredObject {
                key: key.to_string(),
                size: body.len() as u64,
                uploaded_at: Utc::now(),
            };
            self.objects.lock().unwrap().insert(
                key.to_string(),
                Written {
                    object: object.clone(),
                    content_type: content_type.to_string(),
                    body,
                },
            );
            Ok(object)
        }

        async fn list_page(&self, query: ListQuery) -> StorageResult<ListingPage> {
            self.before_call().await?;
            self.list_calls.fetch_add(1, Ordering::SeqCst);

            let max_keys = query.max_keys.max(1);
            let objects = self.objects.lock().unwrap();
            let mut matching = objects
                .values()
                .map(|w| &w.object)
                .filter(|o| o.key.starts_with(&query.prefix))
                .filter(|o| query.cursor.as_ref().is_none_or(|c| o.key > *c));

            let mut page = ListingPage::default();
            let mut prefixes = BTreeSet::new();
            let mut taken = 0;
            let mut last_key = None;
            for obj in matching.by_ref() {
                if taken == max_keys {
                    page.truncated = true;
                    break;
                }
                taken += 1;
                last_key = Some(obj.key.clone());
                let rest = &obj.key[query.prefix.len()..];
                match query.delimiter.and_then(|d| rest.find(d)) {
                    Some(pos) => {
                        prefixes.insert(format!("{}{}", query.prefix, &rest[..=pos]));
                    }
                    None => page.objects.push(obj.clone()),
                }
            }
            if page.truncated {
                page.cursor = match *self.cursor_fault.lock().unwrap() {
                    None => last_key,
                    Some(CursorFault::Missing) => None,
                    Some(CursorFault::Repeated) => query.cursor.clone().or(last_key),
                };
            }
            page.common_prefixes = prefixes.into_iter().collect();
            Ok(page)
        }
    }
}
