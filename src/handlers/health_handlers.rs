//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that checks the metadata DB and payload disk

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::BTreeMap;
use tokio::fs;
use uuid::Uuid;

/// `GET /healthz`
///
/// Liveness only. Never performs I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// 1. Runs `SELECT 1` against SQLite.
/// 2. Writes, reads back and deletes a probe file under the payload directory.
///
/// HTTP 200 when all checks pass, 503 otherwise. Failure reasons stay in the
/// server log; the body only says which check failed.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let sqlite_ok = match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&*state.storage.db)
        .await
    {
        Ok(1) => true,
        Ok(v) => {
            tracing::warn!("readiness: unexpected SELECT 1 result {}", v);
            false
        }
        Err(e) => {
            tracing::warn!("readiness: sqlite check failed: {}", e);
            false
        }
    };

    let disk_ok = match disk_probe(&state).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("readiness: disk check failed: {}", e);
            false
        }
    };

    let overall_ok = sqlite_ok && disk_ok;
    let checks = BTreeMap::from([
        ("sqlite", CheckStatus { ok: sqlite_ok }),
        ("disk", CheckStatus { ok: disk_ok }),
    ]);

    let body = ReadyResponse {
        status: if overall_ok { "ok" } else { "error" }.into(),
        checks,
    };

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

async fn disk_probe(state: &AppState) -> std::io::Result<()> {
    fs::create_dir_all(&state.storage.base_path).await?;
    let tmp_path = state
        .storage
        .base_path
        .join(format!(".readyz-{}", Uuid::new_v4()));

    let result = async {
        fs::write(&tmp_path, b"readyz").await?;
        let bytes = fs::read(&tmp_path).await?;
        if bytes != b"readyz" {
            return Err(std::io::Error::other("file content mismatch"));
        }
        Ok(())
    }
    .await;

    // best-effort cleanup
    let _ = fs::remove_file(&tmp_path).await;
    result
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: BTreeMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
}
