// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::UserStore,
    models::auth::{Claims, CurrentUser, User},
};

const TOKEN_LIFETIME_DAYS: i64 = 7;

/// The identity collaborator: password accounts and bearer tokens.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: String) -> Self {
        Self { users, jwt_secret, bcrypt_cost: bcrypt::DEFAULT_COST }
    }

    #[cfg(test)]
    fn with_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub async fn register_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        // Hashing is CPU bound; keep it off the async workers.
        let password_clone = password.to_owned();
        let cost = self.bcrypt_cost;
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Hashing task failed: {}", e))??;

        let user = self.users.create_user(email.trim(), &hashed_password).await?;
        tracing::info!("User {} registered", user.id);
        self.create_token(&user)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .users
            .find_by_email(email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(&user)
    }

    /// Resolves a bearer token to the user it was issued for.
    pub async fn current_user(&self, token: &str) -> Result<CurrentUser, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.users
            .find_by_id(token_data.claims.sub)
            .await?
            .map(CurrentUser::from)
            .ok_or(AppError::UserNotFound)
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(TOKEN_LIFETIME_DAYS);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Stores;

    fn service() -> AuthService {
        AuthService::new(Stores::memory().users, "test-secret".to_string()).with_cost(4)
    }

    #[tokio::test]
    async fn register_login_and_resolve() {
        let auth = service();
        let token = auth.register_user("owner@shop.ng", "correct horse").await.unwrap();

        let me = auth.current_user(&token).await.unwrap();
        assert_eq!(me.email, "owner@shop.ng");

        let again = auth.login_user("owner@shop.ng", "correct horse").await.unwrap();
        assert_eq!(auth.current_user(&again).await.unwrap().id, me.id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email() {
        let auth = service();
        auth.register_user("owner@shop.ng", "correct horse").await.unwrap();

        assert!(matches!(
            auth.login_user("owner@shop.ng", "battery staple").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login_user("nobody@shop.ng", "correct horse").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn duplicate_registration() {
        let auth = service();
        auth.register_user("owner@shop.ng", "correct horse").await.unwrap();
        assert!(matches!(
            auth.register_user("owner@shop.ng", "another one").await,
            Err(AppError::EmailAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn garbage_and_foreign_tokens_are_rejected() {
        let auth = service();
        assert!(matches!(auth.current_user("not-a-jwt").await, Err(AppError::InvalidToken)));

        let other = AuthService::new(Stores::memory().users, "other-secret".to_string()).with_cost(4);
        let token = other.register_user("owner@shop.ng", "correct horse").await.unwrap();
        assert!(matches!(auth.current_user(&token).await, Err(AppError::InvalidToken)));
    }
}
