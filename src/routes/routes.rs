//! Defines every route the service exposes.
//!
//! ## Structure
//! - **Admin endpoints** (bearer session required)
//!   - `POST /admin/list`         : folders and files below a virtual path
//!   - `POST /admin/upload`       : write one asset, routed by category
//!   - `POST /admin/create-folder`: make an empty virtual folder visible
//!
//! - **Public endpoints**
//!   - `GET  /assets/{*key}`: stream a stored asset
//!   - `GET  /healthz`, `GET /readyz`
//!
//! The wildcard `*key` allows nested keys like `configs/residential/logo.png`.

use crate::{
    handlers::{
        admin_handlers::admin_action,
        asset_handlers::get_asset,
        health_handlers::{healthz, readyz},
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router. Handlers share `AppState`.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/admin/{action}", post(admin_action))
        .route("/assets/{*key}", get(get_asset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::SessionValidator,
        services::{
            asset_service::AssetService,
            object_client::BucketClient,
            storage_service::tests::{BUCKET, test_storage},
        },
    };
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        response::Response,
    };
    use serde_json::{Value, json};
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const TOKEN: &str = "test-admin-token";

    async fn app() -> (Router, TempDir) {
        let (storage, dir) = test_storage().await;
        let assets = AssetService::new(
            BucketClient::new(storage.clone(), BUCKET),
            "configs",
            Duration::from_secs(5),
            1000,
        );
        let state = AppState::new(
            storage,
            BUCKET,
            assets,
            SessionValidator::new(Some(TOKEN.into())),
        );
        (routes().with_state(state), dir)
    }

    fn admin(action: &str, body: Value) -> Request<Body> {
        Request::post(format!("/admin/{action}"))
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let (app, _dir) = app().await;
        let response = app
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn readyz_checks_sqlite_and_disk() {
        let (app, _dir) = app().await;
        let response = app
            .oneshot(Request::get("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["checks"]["sqlite"]["ok"], json!(true));
        assert_eq!(body["checks"]["disk"]["ok"], json!(true));
    }

    #[tokio::test]
    async fn admin_requires_session() {
        let (app, _dir) = app().await;
        let request = Request::post("/admin/list")
            .header(header::AUTHORIZATION, "Bearer wrong")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["kind"], json!("Unauthorized"));
    }

    #[tokio::test]
    async fn unknown_action_is_not_found() {
        let (app, _dir) = app().await;
        let response = app.oneshot(admin("delete", json!({}))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["kind"], json!("NotFound"));
    }

    #[tokio::test]
    async fn create_folder_then_list() {
        let (app, _dir) = app().await;

        let response = app
            .clone()
            .oneshot(admin("create-folder", json!({"folder": "demo"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"success": true}));

        let response = app
            .oneshot(admin("list", json!({"prefix": "configs/"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"folders": ["demo"], "files": []})
        );
    }

    #[tokio::test]
    async fn upload_then_list_and_fetch() {
        let (app, _dir) = app().await;

        let response = app
            .clone()
            .oneshot(admin(
                "upload",
                json!({"folder": "demo", "payload": {"a": 1}, "category": "default"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"key": "configs/demo/combined_data.json", "category": "default"})
        );

        let response = app
            .clone()
            .oneshot(admin("list", json!({"prefix": "configs/demo/"})))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["folders"], json!([]));
        assert_eq!(body["files"][0]["name"], json!("combined_data.json"));
        assert_eq!(body["files"][0]["folder"], json!("demo"));
        assert_eq!(body["files"][0]["size"], json!(7));
        assert!(body["files"][0]["uploadedAt"].is_string());

        let response = app
            .oneshot(
                Request::get("/assets/configs/demo/combined_data.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(json_body(response).await, json!({"a": 1}));
    }

    #[tokio::test]
    async fn image_upload_stores_decoded_bytes() {
        let (app, _dir) = app().await;
        let response = app
            .clone()
            .oneshot(admin(
                "upload",
                json!({
                    "folder": "residential",
                    "payload": "iVBORw==",
                    "category": "image",
                    "fileName": "logo.png",
                    "mimeType": "image/png"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::get("/assets/configs/residential/logo.png")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"\x89PNG");
    }

    #[tokio::test]
    async fn missing_field_is_reported() {
        let (app, _dir) = app().await;
        let response = app
            .oneshot(admin("upload", json!({"payload": {"a": 1}})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["kind"], json!("InvalidRequest"));
        assert!(body["error"].as_str().unwrap().contains("`folder`"));
    }

    #[tokio::test]
    async fn assets_outside_root_are_hidden() {
        let (app, _dir) = app().await;
        let response = app
            .oneshot(
                Request::get("/assets/private/secret.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn refused_names_are_bad_requests() {
        let (app, _dir) = app().await;
        let response = app
            .clone()
            .oneshot(admin("create-folder", json!({"folder": "a..b"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["kind"], json!("InvalidRequest"));

        let response = app
            .oneshot(admin(
                "upload",
                json!({
                    "folder": "demo",
                    "payload": {},
                    "category": "structuredFolder",
                    "fileName": "v1..2.json"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"]
            .as_str()
            .unwrap()
            .contains("`fileName`"));
    }
}
