#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingMode {
    /// A single listing request, at most one page of keys.
    #[default]
    FirstPage,
    /// Follow continuation tokens until the listing is exhausted.
    AllPages,
}

/// Continuation token for the next listing request, or `None` once the
/// listing is done for `mode`.
pub fn next_continuation(
    mode: ListingMode,
    is_truncated: bool,
    next_token: Option<String>,
) -> Option<String> {
    match mode {
        ListingMode::FirstPage => None,
        ListingMode::AllPages if is_truncated => next_token,
        ListingMode::AllPages => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    List,
    Copy,
    Delete,
}

impl StoreOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Copy => "copy",
            Self::Delete => "delete",
        }
    }
}

/// Failure reported by the object store. `Display` renders only the
/// underlying message; the operation and target are kept for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub operation: StoreOperation,
    pub bucket: String,
    pub key: Option<String>,
    pub message: String,
}

impl StoreError {
    pub fn new(
        operation: StoreOperation,
        bucket: impl Into<String>,
        key: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            bucket: bucket.into(),
            key: key.map(str::to_string),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StoreError {}

pub trait ObjectStore {
    fn list_keys(
        &self,
        bucket: &str,
        prefix: &str,
        mode: ListingMode,
    ) -> Result<Vec<String>, StoreError>;

    fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        destination_bucket: &str,
        destination_key: &str,
    ) -> Result<(), StoreError>;

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_never_continues() {
        for is_truncated in [false, true] {
            for next_token in [None, Some("token".to_string())] {
                assert_eq!(
                    next_continuation(ListingMode::FirstPage, is_truncated, next_token),
                    None
                );
            }
        }
    }

    #[test]
    fn all_pages_continues_while_truncated() {
        assert_eq!(
            next_continuation(ListingMode::AllPages, true, Some("token".to_string())),
            Some("token".to_string())
        );
    }

    #[test]
    fn all_pages_stops_on_last_page() {
        assert_eq!(
            next_continuation(ListingMode::AllPages, false, Some("token".to_string())),
            None
        );
        assert_eq!(next_continuation(ListingMode::AllPages, false, None), None);
    }

    #[test]
    fn all_pages_stops_when_truncated_page_has_no_token() {
        assert_eq!(next_continuation(ListingMode::AllPages, true, None), None);
    }
}
