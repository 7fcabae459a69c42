//! Admin dispatcher: `POST /admin/{action}`.
//!
//! The action name is parsed into a closed `AdminAction` set and routed through
//! a single `match`; unknown names are `NotFound`. Bodies are parsed by hand so
//! malformed input comes back as a structured `InvalidRequest`.

use crate::{
    auth::AdminSession,
    errors::{AdminError, AppError},
    models::upload::{AssetCategory, Payload, UploadRequest},
    state::AppState,
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, de::DeserializeOwned};
use std::{fmt, str::FromStr};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    List,
    Upload,
    CreateFolder,
}

impl AdminAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminAction::List => "list",
            AdminAction::Upload => "upload",
            AdminAction::CreateFolder => "create-folder",
        }
    }
}

impl FromStr for AdminAction {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(AdminAction::List),
            "upload" => Ok(AdminAction::Upload),
            "create-folder" => Ok(AdminAction::CreateFolder),
            other => Err(AdminError::NotFound(other.to_string())),
        }
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListBody {
    pub prefix: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadBody {
    pub folder: Option<String>,
    pub payload: Option<serde_json::Value>,
    pub category: Option<String>,
    #[serde(alias = "explicitFileName")]
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateFolderBody {
    pub folder: Option<String>,
}

impl TryFrom<UploadBody> for UploadRequest {
    type Error = AdminError;

    fn try_from(body: UploadBody) -> Result<Self, Self::Error> {
        let folder = body.folder.ok_or_else(|| AdminError::missing("folder"))?;
        let payload = body.payload.ok_or_else(|| AdminError::missing("payload"))?;
        let category = match body.category.as_deref() {
            None | Some("") => AssetCategory::default(),
            Some(raw) => serde_json::from_value(serde_json::Value::String(raw.to_string()))
                .map_err(|_| {
                    AdminError::invalid("category", "must be image, structuredFolder or default")
                })?,
        };

        Ok(UploadRequest {
            folder,
            payload: Payload::Structured(payload),
            category,
            explicit_file_name: body.file_name,
            mime_type: body.mime_type,
        })
    }
}

/// `POST /admin/{action}`. The session is checked before the action is even parsed.
pub async fn admin_action(
    State(state): State<AppState>,
    session: AdminSession,
    Path(action): Path<String>,
    body: Bytes,
) -> Result<Response, AppError> {
    let action: AdminAction = action.parse()?;
    debug!(role = ?session.role, %action, "dispatching admin action");

    let response = match action {
        AdminAction::List => {
            let body: ListBody = parse_body(&body)?;
            let listing = state
                .assets
                .list_virtual_path(body.prefix.as_deref())
                .await?;
            Json(listing).into_response()
        }
        AdminAction::Upload => {
            let body: UploadBody = parse_body(&body)?;
            let receipt = state.assets.upload_asset(body.try_into()?).await?;
            Json(receipt).into_response()
        }
        AdminAction::CreateFolder => {
            let body: CreateFolderBody = parse_body(&body)?;
            let folder = body.folder.ok_or_else(|| AdminError::missing("folder"))?;
            let created = state.assets.create_folder(&folder).await?;
            Json(created).into_response()
        }
    };

    Ok(response)
}

/// An empty body is the all-defaults body.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, AdminError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|_| AdminError::invalid("body", "must be a JSON object"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_names_are_a_closed_set() {
        assert_eq!("list".parse::<AdminAction>().unwrap(), AdminAction::List);
        assert_eq!("upload".parse::<AdminAction>().unwrap(), AdminAction::Upload);
        assert_eq!(
            "create-folder".parse::<AdminAction>().unwrap(),
            AdminAction::CreateFolder
        );
        assert!(matches!(
            "delete".parse::<AdminAction>(),
            Err(AdminError::NotFound(name)) if name == "delete"
        ));
    }

    #[test]
    fn upload_body_defaults_category() {
        let body: UploadBody = parse_body(br#"{"folder":"demo","payload":{"a":1}}"#).unwrap();
        let request = UploadRequest::try_from(body).unwrap();
        assert_eq!(request.category, AssetCategory::Default);
        assert_eq!(request.payload, Payload::Structured(json!({"a": 1})));
    }

    #[test]
    fn upload_body_accepts_explicit_file_name_alias() {
        let body: UploadBody = parse_body(
            br#"{"folder":"demo","payload":"AAEC","category":"image","explicitFileName":"logo.png","mimeType":"image/png"}"#,
        )
        .unwrap();
        let request = UploadRequest::try_from(body).unwrap();
        assert_eq!(request.category, AssetCategory::Image);
        assert_eq!(request.explicit_file_name.as_deref(), Some("logo.png"));
    }

    #[test]
    fn upload_body_reports_missing_fields() {
        let missing_payload: UploadBody = parse_body(br#"{"folder":"demo"}"#).unwrap();
        assert!(matches!(
            UploadRequest::try_from(missing_payload),
            Err(AdminError::InvalidRequest { field: "payload", .. })
        ));

        let bad_category: UploadBody =
            parse_body(br#"{"folder":"demo","payload":{},"category":"video"}"#).unwrap();
        assert!(matches!(
            UploadRequest::try_from(bad_category),
            Err(AdminError::InvalidRequest { field: "category", .. })
        ));
    }

    #[test]
    fn malformed_json_is_invalid_request() {
        assert!(matches!(
            parse_body::<ListBody>(b"{not json"),
            Err(AdminError::InvalidRequest { field: "body", .. })
        ));
        assert!(parse_body::<ListBody>(b"  ").unwrap().prefix.is_none());
    }
}
