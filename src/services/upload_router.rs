//! Maps a declared asset category and payload to the key, content type and
//! body that get written.
//!
//! Image payloads travel over JSON as base64 text (plain or `data:` URL) and
//! are decoded here, so the store only ever holds raw image bytes.

use crate::{
    errors::AdminError,
    models::{
        listing::DELIMITER,
        upload::{AssetCategory, Payload, UploadRequest},
    },
    services::{hierarchy::SENTINEL_NAME, storage_service::MAX_OBJECT_KEY_LEN},
};
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use chrono::{DateTime, Utc};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const DEFAULT_FILE_NAME: &str = "combined_data.json";

#[derive(Debug, Clone, PartialEq)]
pub struct RoutedUpload {
    pub key: String,
    pub content_type: String,
    pub body: Bytes,
}

/// Accept `value` only if it is usable as a single key segment. The rules
/// match what the store accepts in a key.
pub fn validate_segment<'a>(field: &'static str, value: &'a str) -> Result<&'a str, AdminError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AdminError::missing(field));
    }
    if value.contains(DELIMITER) || value.contains('\\') {
        return Err(AdminError::invalid(field, "must not contain `/` or `\\`"));
    }
    if value == "." || value.contains("..") {
        return Err(AdminError::invalid(field, "must not be `.` or contain `..`"));
    }
    if value.chars().any(char::is_control) {
        return Err(AdminError::invalid(field, "must not contain control characters"));
    }
    Ok(value)
}

/// Join `root/folder/name`, rejecting keys the store would refuse as too long.
pub fn compose_key(
    field: &'static str,
    root: &str,
    folder: &str,
    name: &str,
) -> Result<String, AdminError> {
    let key = format!("{root}/{folder}/{name}");
    if key.len() > MAX_OBJECT_KEY_LEN {
        return Err(AdminError::invalid(
            field,
            format!("makes the key longer than {MAX_OBJECT_KEY_LEN} bytes"),
        ));
    }
    Ok(key)
}

/// Compute what to write for `request` under `root`. `now` feeds generated image names.
pub fn route_upload(
    root: &str,
    request: UploadRequest,
    now: DateTime<Utc>,
) -> Result<RoutedUpload, AdminError> {
    let folder = validate_segment("folder", &request.folder)?;
    if request.payload.is_empty() {
        return Err(AdminError::missing("payload"));
    }
    let explicit = request
        .explicit_file_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .map(|name| validate_segment("fileName", name))
        .transpose()?;
    if explicit == Some(SENTINEL_NAME) {
        return Err(AdminError::invalid(
            "fileName",
            format!("`{SENTINEL_NAME}` is reserved for folder markers"),
        ));
    }

    let (name, content_type, body) = match request.category {
        AssetCategory::Image => {
            let (body, embedded_mime) = image_bytes(request.payload)?;
            let mime = request
                .mime_type
                .filter(|m| !m.trim().is_empty())
                .or(embedded_mime)
                .ok_or_else(|| AdminError::missing("mimeType"))?;
            let subtype = image_subtype(&mime)?;
            let name = match explicit {
                Some(name) => name.to_string(),
                None => format!("image_{}.{}", now.timestamp_millis(), subtype),
            };
            (name, mime.trim().to_string(), body)
        }
        AssetCategory::StructuredFolder => {
            let name = explicit.ok_or_else(|| AdminError::missing("fileName"))?;
            (
                name.to_string(),
                JSON_CONTENT_TYPE.to_string(),
                json_bytes(request.payload)?,
            )
        }
        AssetCategory::Default => (
            DEFAULT_FILE_NAME.to_string(),
            JSON_CONTENT_TYPE.to_string(),
            json_bytes(request.payload)?,
        ),
    };

    let field = if explicit.is_some() { "fileName" } else { "folder" };
    Ok(RoutedUpload {
        key: compose_key(field, root, folder, &name)?,
        content_type,
        body,
    })
}

fn json_bytes(payload: Payload) -> Result<Bytes, AdminError> {
    match payload {
        Payload::Structured(value) => serde_json::to_vec(&value)
            .map(Bytes::from)
            .map_err(|err| AdminError::invalid("payload", format!("is not serializable: {err}"))),
        Payload::Binary(_) => Err(AdminError::invalid(
            "payload",
            "must be a JSON value for this category",
        )),
    }
}

/// Raw image bytes plus the MIME type a data URL carried, if any.
fn image_bytes(payload: Payload) -> Result<(Bytes, Option<String>), AdminError> {
    let text = match payload {
        Payload::Binary(bytes) => return Ok((bytes, None)),
        Payload::Structured(serde_json::Value::String(text)) => text,
        Payload::Structured(_) => {
            return Err(AdminError::invalid(
                "payload",
                "must be base64 text for image uploads",
            ));
        }
    };

    let (encoded, mime) = match text.trim().strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest
                .split_once(',')
                .ok_or_else(|| AdminError::invalid("payload", "malformed data URL"))?;
            let mime = meta.strip_suffix(";base64").ok_or_else(|| {
                AdminError::invalid("payload", "data URL must be base64 encoded")
            })?;
            let mime = (!mime.is_empty()).then(|| mime.to_string());
            (data.to_string(), mime)
        }
        None => (text, None),
    };

    let decoded = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|_| AdminError::invalid("payload", "is not valid base64"))?;
    if decoded.is_empty() {
        return Err(AdminError::missing("payload"));
    }
    Ok((Bytes::from(decoded), mime))
}

/// `image/png` -> `png`, ignoring any `;` parameters.
fn image_subtype(mime: &str) -> Result<&str, AdminError> {
    let essence = mime.split(';').next().unwrap_or("").trim();
    match essence.split_once('/') {
        Some((top, sub)) if top.eq_ignore_ascii_case("image") && !sub.is_empty() => Ok(sub),
        _ => Err(AdminError::invalid("mimeType", "must be an image/* type")),
    }
}
