use std::time::Instant;

use folder_move_core::contract::{
    folder_not_found_message, move_succeeded_message, parse_move_request, request_fingerprint,
    storage_error_message, MoveRequest, MoveResponse, ValidationError,
};
use folder_move_core::storage_keys::{destination_key, folder_prefix};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::adapters::object_store::{ObjectStore, StoreError};
use crate::config::HandlerConfig;
use crate::logging::COMPONENT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    Validation(ValidationError),
    FolderNotFound(String),
    Storage(StoreError),
}

impl MoveError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::FolderNotFound(_) => 404,
            Self::Storage(_) => 500,
        }
    }

    pub fn into_response(self) -> MoveResponse {
        MoveResponse::with_message(self.status_code(), &self.to_string())
    }
}

impl std::fmt::Display for MoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(error) => write!(f, "{error}"),
            Self::FolderNotFound(message) => f.write_str(message),
            Self::Storage(error) => f.write_str(&storage_error_message(&error.message)),
        }
    }
}

impl std::error::Error for MoveError {}

impl From<StoreError> for MoveError {
    fn from(error: StoreError) -> Self {
        Self::Storage(error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSummary {
    pub keys: Vec<String>,
}

/// Entry point for one invocation: always answers with a status/body pair.
pub fn handle_move_event(
    event: Value,
    config: &HandlerConfig,
    store: &impl ObjectStore,
) -> MoveResponse {
    info!(component = COMPONENT, event = "event_received", payload = %event);

    let request = match parse_move_request(&event) {
        Ok(value) => value,
        Err(error) => {
            warn!(
                component = COMPONENT,
                event = "move_rejected",
                reason = %error
            );
            return MoveError::Validation(error).into_response();
        }
    };

    match move_folder(&request, config, store) {
        Ok(_) => MoveResponse::with_message(200, &move_succeeded_message(&request)),
        Err(error) => error.into_response(),
    }
}

/// Copies every object under the game folder to the destination bucket, then
/// deletes the originals. All copies are attempted before the first delete;
/// the first storage failure stops the move wherever it happens.
pub fn move_folder(
    request: &MoveRequest,
    config: &HandlerConfig,
    store: &impl ObjectStore,
) -> Result<MoveSummary, MoveError> {
    let started_at = Instant::now();
    let fingerprint = request_fingerprint(request);
    let prefix = folder_prefix(&request.game_name);

    let result = copy_then_delete(request, &prefix, config, store, &fingerprint);
    match &result {
        Ok(summary) => info!(
            component = COMPONENT,
            event = "move_completed",
            fingerprint = %fingerprint,
            game_name = %request.game_name,
            source_bucket = %request.source_bucket,
            destination_bucket = %request.destination_bucket,
            objects_moved = summary.keys.len(),
            duration_ms = started_at.elapsed().as_millis() as u64
        ),
        Err(MoveError::FolderNotFound(_)) => info!(
            component = COMPONENT,
            event = "folder_not_found",
            fingerprint = %fingerprint,
            game_name = %request.game_name,
            source_bucket = %request.source_bucket
        ),
        Err(MoveError::Storage(store_error)) => error!(
            component = COMPONENT,
            event = "move_failed",
            fingerprint = %fingerprint,
            phase = store_error.operation.as_str(),
            bucket = %store_error.bucket,
            key = store_error.key.as_deref().unwrap_or(""),
            error = %store_error.message,
            duration_ms = started_at.elapsed().as_millis() as u64
        ),
        _ => {}
    }
    result
}

fn copy_then_delete(
    request: &MoveRequest,
    prefix: &str,
    config: &HandlerConfig,
    store: &impl ObjectStore,
    fingerprint: &str,
) -> Result<MoveSummary, MoveError> {
    let keys = store.list_keys(&request.source_bucket, prefix, config.listing_mode)?;
    if keys.is_empty() {
        return Err(MoveError::FolderNotFound(folder_not_found_message(request)));
    }
    info!(
        component = COMPONENT,
        event = "listing_completed",
        fingerprint = %fingerprint,
        prefix = %prefix,
        object_count = keys.len()
    );

    for key in &keys {
        store.copy_object(
            &request.source_bucket,
            key,
            &request.destination_bucket,
            &destination_key(key),
        )?;
        debug!(component = COMPONENT, event = "object_copied", key = %key);
    }

    for key in &keys {
        store.delete_object(&request.source_bucket, key)?;
        debug!(component = COMPONENT, event = "object_deleted", key = %key);
    }

    Ok(MoveSummary { keys })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::adapters::memory::InMemoryObjectStore;
    use crate::adapters::object_store::{ListingMode, StoreOperation};
    use crate::logging::setup_test_logging;

    fn move_event(source: &str, destination: &str, game_name: &str) -> Value {
        json!({
            "body": json!({
                "source_bucket": source,
                "destination_bucket": destination,
                "game_name": game_name,
            })
            .to_string()
        })
    }

    fn seeded_store() -> InMemoryObjectStore {
        InMemoryObjectStore::new()
            .with_bucket("games-archive")
            .with_object("games-raw", "mygame/a.bin", b"alpha")
            .with_object("games-raw", "mygame/b.bin", b"beta")
    }

    #[test]
    fn moves_every_object_and_reports_success() {
        setup_test_logging();
        let store = seeded_store();

        let response = handle_move_event(
            move_event("games-raw", "games-archive", "mygame"),
            &HandlerConfig::default(),
            &store,
        );

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.message().as_deref(),
            Some("Game folder 'mygame' successfully moved from 'games-raw' to 'games-archive'."),
        );
        assert_eq!(
            store.keys("games-archive"),
            vec!["mygame/a.bin", "mygame/b.bin"],
        );
        assert_eq!(
            store.object("games-archive", "mygame/b.bin").as_deref(),
            Some(&b"beta"[..]),
        );
        assert!(store.keys("games-raw").is_empty());
    }

    #[test]
    fn copies_all_objects_before_deleting_any() {
        let store = seeded_store();

        handle_move_event(
            move_event("games-raw", "games-archive", "mygame"),
            &HandlerConfig::default(),
            &store,
        );

        assert_eq!(
            store.operations(),
            vec![
                "copy games-archive/mygame/a.bin",
                "copy games-archive/mygame/b.bin",
                "delete games-raw/mygame/a.bin",
                "delete games-raw/mygame/b.bin",
            ],
        );
    }

    #[test]
    fn missing_body_is_rejected_without_storage_calls() {
        let store = seeded_store();
        store.fail_on(StoreOperation::List, "mygame/", "listing must not happen");

        let response = handle_move_event(json!({}), &HandlerConfig::default(), &store);

        assert_eq!(response.status_code, 400);
        assert_eq!(
            response.message().as_deref(),
            Some("Missing required body in the request."),
        );
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let store = seeded_store();
        for body in [
            "not json",
            r#"{"destination_bucket":"games-archive","game_name":"mygame"}"#,
            r#"{"source_bucket":"games-raw","game_name":"mygame"}"#,
            r#"{"source_bucket":"games-raw","destination_bucket":"games-archive"}"#,
        ] {
            let response =
                handle_move_event(json!({ "body": body }), &HandlerConfig::default(), &store);
            assert_eq!(response.status_code, 400, "body: {body}");
            let message = response.message().expect("body should be a JSON string");
            assert!(message.starts_with("Missing or invalid parameter: "));
        }
        assert!(store.operations().is_empty());
        assert_eq!(store.keys("games-raw").len(), 2);
    }

    #[test]
    fn empty_folder_is_not_found() {
        let store = seeded_store().with_object("games-raw", "mygame2/c.bin", b"c");

        let response = handle_move_event(
            move_event("games-raw", "games-archive", "other"),
            &HandlerConfig::default(),
            &store,
        );

        assert_eq!(response.status_code, 404);
        assert_eq!(
            response.message().as_deref(),
            Some("Game folder 'other' not found in bucket 'games-raw'."),
        );
        assert!(store.operations().is_empty());
    }

    #[test]
    fn sibling_folders_sharing_the_name_are_left_alone() {
        let store = seeded_store().with_object("games-raw", "mygame2/c.bin", b"c");

        let response = handle_move_event(
            move_event("games-raw", "games-archive", "mygame"),
            &HandlerConfig::default(),
            &store,
        );

        assert_eq!(response.status_code, 200);
        assert_eq!(store.keys("games-raw"), vec!["mygame2/c.bin"]);
        assert_eq!(store.keys("games-archive").len(), 2);
    }

    #[test]
    fn repeating_a_successful_move_yields_not_found() {
        let store = seeded_store();
        let event = move_event("games-raw", "games-archive", "mygame");

        let first = handle_move_event(event.clone(), &HandlerConfig::default(), &store);
        let second = handle_move_event(event, &HandlerConfig::default(), &store);

        assert_eq!(first.status_code, 200);
        assert_eq!(second.status_code, 404);
    }

    #[test]
    fn copy_failure_stops_before_any_delete() {
        let store = seeded_store();
        store.fail_on(
            StoreOperation::Copy,
            "mygame/b.bin",
            "AccessDenied: Access Denied",
        );

        let response = handle_move_event(
            move_event("games-raw", "games-archive", "mygame"),
            &HandlerConfig::default(),
            &store,
        );

        assert_eq!(response.status_code, 500);
        assert_eq!(
            response.message().as_deref(),
            Some("Error occurred: AccessDenied: Access Denied"),
        );
        // Partial copies remain; nothing was deleted from the source.
        assert_eq!(store.keys("games-archive"), vec!["mygame/a.bin"]);
        assert_eq!(store.keys("games-raw").len(), 2);
    }

    #[test]
    fn delete_failure_is_reported_as_server_error() {
        let store = seeded_store();
        store.fail_on(StoreOperation::Delete, "mygame/a.bin", "SlowDown");

        let response = handle_move_event(
            move_event("games-raw", "games-archive", "mygame"),
            &HandlerConfig::default(),
            &store,
        );

        assert_eq!(response.status_code, 500);
        let message = response.message().expect("body should be a JSON string");
        assert!(message.contains("SlowDown"));
    }

    #[test]
    fn missing_source_bucket_is_reported_as_server_error() {
        let store = InMemoryObjectStore::new().with_bucket("games-archive");

        let response = handle_move_event(
            move_event("games-missing", "games-archive", "mygame"),
            &HandlerConfig::default(),
            &store,
        );

        assert_eq!(response.status_code, 500);
        let message = response.message().expect("body should be a JSON string");
        assert!(message.starts_with("Error occurred: NoSuchBucket"));
    }

    #[test]
    fn first_page_listing_moves_only_the_first_page() {
        let store = InMemoryObjectStore::new()
            .with_page_size(2)
            .with_bucket("games-archive")
            .with_object("games-raw", "mygame/1", b"1")
            .with_object("games-raw", "mygame/2", b"2")
            .with_object("games-raw", "mygame/3", b"3");
        let request = MoveRequest {
            source_bucket: "games-raw".to_string(),
            destination_bucket: "games-archive".to_string(),
            game_name: "mygame".to_string(),
        };

        let summary =
            move_folder(&request, &HandlerConfig::default(), &store).expect("move should pass");

        assert_eq!(summary.keys, vec!["mygame/1", "mygame/2"]);
        assert_eq!(store.keys("games-raw"), vec!["mygame/3"]);
        assert_eq!(store.pages_listed(), 1);
    }

    #[test]
    fn all_pages_listing_moves_the_whole_folder() {
        let store = InMemoryObjectStore::new()
            .with_page_size(2)
            .with_bucket("games-archive")
            .with_object("games-raw", "mygame/1", b"1")
            .with_object("games-raw", "mygame/2", b"2")
            .with_object("games-raw", "mygame/3", b"3");
        let config = HandlerConfig {
            listing_mode: ListingMode::AllPages,
            max_keys: Some(2),
        };

        let response =
            handle_move_event(move_event("games-raw", "games-archive", "mygame"), &config, &store);

        assert_eq!(response.status_code, 200);
        assert!(store.keys("games-raw").is_empty());
        assert_eq!(store.keys("games-archive").len(), 3);
        assert_eq!(store.pages_listed(), 2);
    }

    #[test]
    fn move_error_maps_to_status_codes() {
        let validation = MoveError::Validation(ValidationError::MissingBody);
        let not_found = MoveError::FolderNotFound("gone".to_string());
        let storage = MoveError::from(StoreError::new(
            StoreOperation::List,
            "games-raw",
            None,
            "timeout",
        ));

        assert_eq!(validation.status_code(), 400);
        assert_eq!(not_found.status_code(), 404);
        assert_eq!(storage.status_code(), 500);
        assert_eq!(storage.to_string(), "Error occurred: timeout");
        assert_eq!(not_found.into_response().message().as_deref(), Some("gone"));
    }
}
