// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, Role, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self { user_repo, jwt_secret, pool }
    }

    pub async fn register_user(
        &self,
        username: &str,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<String, AppError> {
        let user = self.create_user(username, name, email, password, Role::User).await?;
        tracing::info!(user_id = %user.id, "✅ User registered");
        self.create_token(&user)
    }

    pub async fn login_user(&self, identifier: &str, password: &str) -> Result<String, AppError> {
        let user = self.user_repo
            .find_by_identifier(identifier)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // bcrypt is CPU bound, keep it off the runtime threads
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
            .await
            .map_err(|e| anyhow::anyhow!("password verification task failed: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(&user)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
            .map_err(|_| AppError::InvalidToken)?;

        // The role is always read back from the database, never trusted from the token
        self.user_repo
            .find_by_id(&self.pool, token_data.claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.user_repo.list().await
    }

    pub async fn change_role(&self, actor: &User, user_id: Uuid, role: Role) -> Result<User, AppError> {
        if actor.id == user_id && role != Role::Admin {
            return Err(AppError::Conflict("Admins cannot demote themselves".into()));
        }

        let user = self.user_repo
            .update_role(&self.pool, user_id, role)
            .await?
            .ok_or(AppError::UserNotFound)?;

        tracing::info!(user_id = %user.id, role = ?user.role, "User role changed");
        Ok(user)
    }

    /// Creates the configured admin account unless a user with that e-mail exists.
    pub async fn seed_admin(&self, email: &str, password: &str) -> Result<(), AppError> {
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Ok(());
        }

        let username = email.split('@').next().unwrap_or(email);
        self.create_user(username, "Administrator", email, password, Role::Admin).await?;
        tracing::info!("✅ Admin account seeded for {}", email);
        Ok(())
    }

    async fn create_user(
        &self,
        username: &str,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AppError> {
        let password_clone = password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || {
            hash(&password_clone, bcrypt::DEFAULT_COST)
        })
            .await
            .map_err(|e| anyhow::anyhow!("password hashing task failed: {}", e))??;

        self.user_repo
            .create_user(&self.pool, username, name, email, &hashed_password, role)
            .await
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user.id,
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
