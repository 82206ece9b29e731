use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

pub const MISSING_BODY_MESSAGE: &str = "Missing required body in the request.";
pub const SOURCE_BUCKET_FIELD: &str = "source_bucket";
pub const DESTINATION_BUCKET_FIELD: &str = "destination_bucket";
pub const GAME_NAME_FIELD: &str = "game_name";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveRequest {
    pub source_bucket: String,
    pub destination_bucket: String,
    pub game_name: String,
}

/// API Gateway proxy response returned by every invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoveResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

impl MoveResponse {
    /// Builds a response whose body is the JSON encoding of `message`.
    pub fn with_message(status_code: u16, message: &str) -> Self {
        Self {
            status_code,
            headers: json!({"Content-Type": "application/json"}),
            body: Value::String(message.to_string()).to_string(),
        }
    }

    /// Decodes the JSON-encoded message carried in `body`.
    pub fn message(&self) -> Option<String> {
        serde_json::from_str(&self.body).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingBody,
    InvalidParameter(String),
}

impl ValidationError {
    pub fn invalid(detail: impl Into<String>) -> Self {
        Self::InvalidParameter(detail.into())
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBody => f.write_str(MISSING_BODY_MESSAGE),
            Self::InvalidParameter(detail) => {
                write!(f, "Missing or invalid parameter: {detail}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Extracts a [`MoveRequest`] from an API Gateway style event.
///
/// The `body` may be a JSON-encoded string or, for console test events, an
/// already decoded object. Fields are checked in declaration order so the
/// first offending key is the one reported.
pub fn parse_move_request(event: &Value) -> Result<MoveRequest, ValidationError> {
    let Some(body) = event.as_object().and_then(|object| object.get("body")) else {
        return Err(ValidationError::MissingBody);
    };

    let payload = match body {
        Value::String(text) => serde_json::from_str::<Value>(text)
            .map_err(|error| ValidationError::invalid(error.to_string()))?,
        Value::Object(_) => body.clone(),
        _ => {
            return Err(ValidationError::invalid(
                "request body must be a JSON string or object",
            ))
        }
    };

    let Some(fields) = payload.as_object() else {
        return Err(ValidationError::invalid("request body must be a JSON object"));
    };

    Ok(MoveRequest {
        source_bucket: required_string(fields, SOURCE_BUCKET_FIELD)?,
        destination_bucket: required_string(fields, DESTINATION_BUCKET_FIELD)?,
        game_name: required_string(fields, GAME_NAME_FIELD)?,
    })
}

fn required_string(fields: &Map<String, Value>, name: &str) -> Result<String, ValidationError> {
    match fields.get(name) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(ValidationError::invalid(format!("'{name}' must be a string"))),
        None => Err(ValidationError::invalid(format!("'{name}'"))),
    }
}

pub fn folder_not_found_message(request: &MoveRequest) -> String {
    format!(
        "Game folder '{}' not found in bucket '{}'.",
        request.game_name, request.source_bucket
    )
}

pub fn move_succeeded_message(request: &MoveRequest) -> String {
    format!(
        "Game folder '{}' successfully moved from '{}' to '{}'.",
        request.game_name, request.source_bucket, request.destination_bucket
    )
}

pub fn storage_error_message(detail: &str) -> String {
    format!("Error occurred: {detail}")
}

/// Stable identifier of a move request, used to correlate log records.
pub fn request_fingerprint(request: &MoveRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_request_json(request));
    format!("{:x}", hasher.finalize())
}

/// Compact request JSON with keys in sorted order.
pub fn canonical_request_json(request: &MoveRequest) -> String {
    json!({
        "destination_bucket": request.destination_bucket,
        "game_name": request.game_name,
        "source_bucket": request.source_bucket,
    })
    .to_string()
}
