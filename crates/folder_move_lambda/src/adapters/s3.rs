use std::future::Future;

use aws_sdk_s3::error::DisplayErrorContext;

use crate::adapters::object_store::{
    next_continuation, ListingMode, ObjectStore, StoreError, StoreOperation,
};

/// [`ObjectStore`] backed by Amazon S3 (or any S3-compatible endpoint the
/// SDK config points at). The client is cheap to clone and meant to be built
/// once per process.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    max_keys: Option<i32>,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self {
            client,
            max_keys: None,
        }
    }

    pub fn with_max_keys(mut self, max_keys: Option<i32>) -> Self {
        self.max_keys = max_keys;
        self
    }

    async fn list_keys_async(
        &self,
        bucket: &str,
        prefix: &str,
        mode: ListingMode,
    ) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .set_max_keys(self.max_keys);
            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(|error| {
                StoreError::new(
                    StoreOperation::List,
                    bucket,
                    None,
                    DisplayErrorContext(&error).to_string(),
                )
            })?;

            keys.extend(
                response
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            continuation_token = match next_continuation(
                mode,
                response.is_truncated().unwrap_or(false),
                response.next_continuation_token().map(str::to_string),
            ) {
                Some(token) => Some(token),
                None => break,
            };
        }

        Ok(keys)
    }
}

impl ObjectStore for S3ObjectStore {
    fn list_keys(
        &self,
        bucket: &str,
        prefix: &str,
        mode: ListingMode,
    ) -> Result<Vec<String>, StoreError> {
        block_on(self.list_keys_async(bucket, prefix, mode))
    }

    fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        destination_bucket: &str,
        destination_key: &str,
    ) -> Result<(), StoreError> {
        block_on(async {
            self.client
                .copy_object()
                .copy_source(copy_source(source_bucket, source_key))
                .bucket(destination_bucket)
                .key(destination_key)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    StoreError::new(
                        StoreOperation::Copy,
                        source_bucket,
                        Some(source_key),
                        DisplayErrorContext(&error).to_string(),
                    )
                })
        })
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        block_on(async {
            self.client
                .delete_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    StoreError::new(
                        StoreOperation::Delete,
                        bucket,
                        Some(key),
                        DisplayErrorContext(&error).to_string(),
                    )
                })
        })
    }
}

/// `CopySource` header value: the source bucket followed by the URL-encoded
/// key, with `/` separators left intact.
pub fn copy_source(bucket: &str, key: &str) -> String {
    let encoded_key = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("{bucket}/{encoded_key}")
}

// The handler runs on the multi-threaded Lambda runtime, so blocking a worker
// for the duration of one SDK call is allowed.
fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
