use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::adapters::object_store::{
    next_continuation, ListingMode, ObjectStore, StoreError, StoreOperation,
};

type Buckets = BTreeMap<String, BTreeMap<String, Vec<u8>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct InjectedFailure {
    operation: StoreOperation,
    target: String,
    message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ListPage {
    keys: Vec<String>,
    is_truncated: bool,
    next_continuation_token: Option<String>,
}

/// Bucket store kept in process memory.
///
/// Mirrors the S3 behaviors the move relies on: keys are listed in
/// lexicographic order, listing is paged with continuation tokens, writes and
/// reads against an unknown bucket fail, and deleting an absent key succeeds. Failures can be injected
/// per operation and target (the prefix for listings, the source key for
/// copies, the key for deletes).
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    buckets: Mutex<Buckets>,
    page_size: Option<usize>,
    failures: Mutex<Vec<InjectedFailure>>,
    operations: Mutex<Vec<String>>,
    pages_listed: Mutex<usize>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    pub fn with_bucket(self, bucket: &str) -> Self {
        self.lock_buckets().entry(bucket.to_string()).or_default();
        self
    }

    pub fn with_object(self, bucket: &str, key: &str, body: &[u8]) -> Self {
        self.put_object(bucket, key, body);
        self
    }

    pub fn put_object(&self, bucket: &str, key: &str, body: &[u8]) {
        self.lock_buckets()
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), body.to_vec());
    }

    pub fn fail_on(&self, operation: StoreOperation, target: &str, message: &str) {
        lock(&self.failures).push(InjectedFailure {
            operation,
            target: target.to_string(),
            message: message.to_string(),
        });
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.lock_buckets()
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.lock_buckets()
            .get(bucket)
            .and_then(|objects| objects.get(key).cloned())
    }

    /// Successful mutating calls in the order they were applied, formatted as
    /// `"<operation> <bucket>/<key>"`.
    pub fn operations(&self) -> Vec<String> {
        lock(&self.operations).clone()
    }

    /// Number of listing pages served so far.
    pub fn pages_listed(&self) -> usize {
        *lock(&self.pages_listed)
    }

    // The continuation token is the last key of the previous page.
    fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let buckets = self.lock_buckets();
        let Some(objects) = buckets.get(bucket) else {
            return Err(no_such_bucket(StoreOperation::List, bucket, None));
        };

        let mut remaining = objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .filter(|key| continuation_token.map_or(true, |token| key.as_str() > token));
        let keys: Vec<String> = match self.page_size {
            Some(page_size) => remaining.by_ref().take(page_size).cloned().collect(),
            None => remaining.by_ref().cloned().collect(),
        };
        let is_truncated = remaining.next().is_some();
        drop(buckets);

        *lock(&self.pages_listed) += 1;
        Ok(ListPage {
            next_continuation_token: if is_truncated {
                keys.last().cloned()
            } else {
                None
            },
            keys,
            is_truncated,
        })
    }

    fn lock_buckets(&self) -> MutexGuard<'_, Buckets> {
        lock(&self.buckets)
    }

    fn check_failure(
        &self,
        operation: StoreOperation,
        bucket: &str,
        target: &str,
    ) -> Result<(), StoreError> {
        let failures = lock(&self.failures);
        match failures
            .iter()
            .find(|failure| failure.operation == operation && failure.target == target)
        {
            Some(failure) => Err(StoreError::new(
                operation,
                bucket,
                Some(target),
                failure.message.clone(),
            )),
            None => Ok(()),
        }
    }

    fn record(&self, operation: StoreOperation, bucket: &str, key: &str) {
        lock(&self.operations).push(format!("{} {bucket}/{key}", operation.as_str()));
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn no_such_bucket(operation: StoreOperation, bucket: &str, key: Option<&str>) -> StoreError {
    StoreError::new(
        operation,
        bucket,
        key,
        format!("NoSuchBucket: The specified bucket '{bucket}' does not exist"),
    )
}

impl ObjectStore for InMemoryObjectStore {
    fn list_keys(
        &self,
        bucket: &str,
        prefix: &str,
        mode: ListingMode,
    ) -> Result<Vec<String>, StoreError> {
        self.check_failure(StoreOperation::List, bucket, prefix)?;

        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;
        loop {
            let page = self.list_page(bucket, prefix, continuation_token.as_deref())?;
            keys.extend(page.keys);
            continuation_token =
                match next_continuation(mode, page.is_truncated, page.next_continuation_token) {
                    Some(token) => Some(token),
                    None => break,
                };
        }
        Ok(keys)
    }

    fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        destination_bucket: &str,
        destination_key: &str,
    ) -> Result<(), StoreError> {
        self.check_failure(StoreOperation::Copy, source_bucket, source_key)?;

        let mut buckets = self.lock_buckets();
        let body = match buckets.get(source_bucket) {
            None => {
                return Err(no_such_bucket(
                    StoreOperation::Copy,
                    source_bucket,
                    Some(source_key),
                ))
            }
            Some(objects) => objects.get(source_key).cloned().ok_or_else(|| {
                StoreError::new(
                    StoreOperation::Copy,
                    source_bucket,
                    Some(source_key),
                    "NoSuchKey: The specified key does not exist.",
                )
            })?,
        };

        let Some(destination) = buckets.get_mut(destination_bucket) else {
            return Err(no_such_bucket(
                StoreOperation::Copy,
                destination_bucket,
                Some(destination_key),
            ));
        };
        destination.insert(destination_key.to_string(), body);
        drop(buckets);

        self.record(StoreOperation::Copy, destination_bucket, destination_key);
        Ok(())
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        self.check_failure(StoreOperation::Delete, bucket, key)?;

        let mut buckets = self.lock_buckets();
        let Some(objects) = buckets.get_mut(bucket) else {
            return Err(no_such_bucket(StoreOperation::Delete, bucket, Some(key)));
        };
        objects.remove(key);
        drop(buckets);

        self.record(StoreOperation::Delete, bucket, key);
        Ok(())
    }
}
