// src/services/profile_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProfileStore,
    models::profile::{ProfileInput, UserProfile},
};

#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<UserProfile, AppError> {
        self.profiles
            .find_profile(user_id)
            .await?
            .ok_or(AppError::NotFound("Profile"))
    }

    /// Business details shown on invoices. `None` until the owner fills them in.
    pub async fn find(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        self.profiles.find_profile(user_id).await
    }

    pub async fn save(&self, user_id: Uuid, input: &ProfileInput) -> Result<UserProfile, AppError> {
        let profile = self.profiles.upsert_profile(user_id, input).await?;
        tracing::info!("Business profile saved for user {}", user_id);
        Ok(profile)
    }
}
