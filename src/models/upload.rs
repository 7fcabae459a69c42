//! Upload contracts for configuration assets.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared by the caller; never inferred from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetCategory {
    Image,
    StructuredFolder,
    #[default]
    Default,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Image => "image",
            AssetCategory::StructuredFolder => "structuredFolder",
            AssetCategory::Default => "default",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upload body as received.
///
/// Images normally arrive as `Structured(Value::String)` holding base64 text
/// (optionally a `data:` URL) and are decoded to raw bytes before the write.
/// `Binary` is already-decoded bytes and is stored as provided. The HTTP
/// dispatcher never builds it; it is for in-process callers of `AssetService`
/// that hold raw bytes already.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Binary(Bytes),
    Structured(serde_json::Value),
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Binary(bytes) => bytes.is_empty(),
            Payload::Structured(serde_json::Value::Null) => true,
            Payload::Structured(serde_json::Value::String(s)) => s.is_empty(),
            Payload::Structured(_) => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub folder: String,
    pub payload: Payload,
    pub category: AssetCategory,
    pub explicit_file_name: Option<String>,
    pub mime_type: Option<String>,
}

/// Result returned to the caller after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    pub key: String,
    pub category: AssetCategory,
}
