//! Session check in front of the admin routes.
//!
//! Credentials are `Authorization: Bearer <token>` headers compared against the
//! configured admin token. Everything past this extractor may assume an
//! authorized caller.

use crate::{
    errors::{AdminError, AppError},
    state::AppState,
};
use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
}

#[derive(Clone, Default)]
pub struct SessionValidator {
    admin_token: Option<Arc<str>>,
}

impl SessionValidator {
    /// With no token configured every credential is refused.
    pub fn new(admin_token: Option<String>) -> Self {
        Self {
            admin_token: admin_token.map(Arc::from),
        }
    }

    pub fn role_for(&self, credential: Option<&str>) -> Option<Role> {
        let expected = self.admin_token.as_deref()?;
        let presented = credential?;
        constant_time_eq(expected.as_bytes(), presented.as_bytes()).then_some(Role::Admin)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Extractor proving the request carried a valid admin session.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession {
    pub role: Role,
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credential = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        match state.sessions.role_for(credential) {
            Some(role) => Ok(AdminSession { role }),
            None => Err(AdminError::Unauthorized.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_token_maps_to_admin() {
        let validator = SessionValidator::new(Some("s3cret".into()));
        assert_eq!(validator.role_for(Some("s3cret")), Some(Role::Admin));
        assert_eq!(validator.role_for(Some("s3cre")), None);
        assert_eq!(validator.role_for(None), None);
    }

    #[test]
    fn no_configured_token_refuses_everyone() {
        let validator = SessionValidator::new(None);
        assert_eq!(validator.role_for(Some("")), None);
        assert_eq!(validator.role_for(Some("anything")), None);
    }
}
