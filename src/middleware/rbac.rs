// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::auth::Role,
};

/// A set of roles allowed through a route.
pub trait RoleSet: Send + Sync + 'static {
    fn allowed() -> &'static [Role];
}

/// Extractor guard: rejects callers whose role is not in `R::allowed()`.
pub struct RequireRole<R>(pub PhantomData<R>);

impl<R, S> FromRequestParts<S> for RequireRole<R>
where
    R: RoleSet,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        if !R::allowed().contains(&user.0.role) {
            return Err(AppError::Forbidden(
                "You do not have permission to perform this action".into(),
            ));
        }

        Ok(RequireRole(PhantomData))
    }
}

pub struct AdminOnly;
impl RoleSet for AdminOnly {
    fn allowed() -> &'static [Role] { &[Role::Admin] }
}

pub struct Staff;
impl RoleSet for Staff {
    fn allowed() -> &'static [Role] { &[Role::Admin, Role::Panitia] }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::auth::User;

    fn parts_for(role: Option<Role>) -> Parts {
        let (mut parts, _) = Request::new(()).into_parts();
        if let Some(role) = role {
            parts.extensions.insert(AuthenticatedUser(User {
                id: Uuid::new_v4(),
                username: "tester".into(),
                name: "Tester".into(),
                email: "tester@example.com".into(),
                password_hash: String::new(),
                role,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }));
        }
        parts
    }

    #[tokio::test]
    async fn staff_guard_admits_admin_and_panitia() {
        for role in [Role::Admin, Role::Panitia] {
            let mut parts = parts_for(Some(role));
            assert!(RequireRole::<Staff>::from_request_parts(&mut parts, &()).await.is_ok());
        }
        let mut parts = parts_for(Some(Role::User));
        assert!(matches!(
            RequireRole::<Staff>::from_request_parts(&mut parts, &()).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn admin_guard_rejects_panitia() {
        let mut parts = parts_for(Some(Role::Panitia));
        assert!(RequireRole::<AdminOnly>::from_request_parts(&mut parts, &()).await.is_err());
    }

    #[tokio::test]
    async fn missing_user_is_unauthorized() {
        let mut parts = parts_for(None);
        assert!(matches!(
            RequireRole::<AdminOnly>::from_request_parts(&mut parts, &()).await,
            Err(AppError::InvalidToken)
        ));
    }
}
