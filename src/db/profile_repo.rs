// src/db/profile_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::ProfileStore,
    models::profile::{ProfileInput, UserProfile},
};

const PROFILE_COLUMNS: &str = "user_id, email, full_name, business_name, business_type, phone, \
     location, logo_url, created_at, updated_at";

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = $1");
        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn upsert_profile(&self, user_id: Uuid, input: &ProfileInput) -> Result<UserProfile, AppError> {
        let sql = format!(
            "INSERT INTO user_profiles (
                user_id, email, full_name, business_name, business_type, phone, location, logo_url
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (user_id) DO UPDATE SET
                email = EXCLUDED.email,
                full_name = EXCLUDED.full_name,
                business_name = EXCLUDED.business_name,
                business_type = EXCLUDED.business_type,
                phone = EXCLUDED.phone,
                location = EXCLUDED.location,
                logo_url = EXCLUDED.logo_url,
                updated_at = NOW()
             RETURNING {PROFILE_COLUMNS}"
        );

        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(user_id)
            .bind(&input.email)
            .bind(&input.full_name)
            .bind(&input.business_name)
            .bind(&input.business_type)
            .bind(&input.phone)
            .bind(&input.location)
            .bind(&input.logo_url)
            .fetch_one(&self.pool)
            .await?;
        Ok(profile)
    }
}
