// src/models/profile.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[schema(ignore)]
    pub user_id: Uuid,

    #[schema(example = "owner@business.ng")]
    pub email: String,

    #[schema(example = "Chidi Okafor")]
    pub full_name: String,

    #[schema(example = "Okafor Prints")]
    pub business_name: String,

    #[schema(example = "Printing")]
    pub business_type: String,

    #[schema(example = "+2348012345678")]
    pub phone: String,

    #[schema(example = "Lagos")]
    pub location: String,

    #[schema(example = "https://cdn.example.com/logos/okafor.png")]
    pub logo_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    #[validate(email(message = "The e-mail address is invalid."))]
    pub email: String,

    #[validate(length(min = 1, message = "required"))]
    pub full_name: String,

    #[validate(length(min = 1, message = "required"))]
    pub business_name: String,

    #[validate(length(min = 1, message = "required"))]
    pub business_type: String,

    #[validate(length(min = 1, message = "required"))]
    pub phone: String,

    #[validate(length(min = 1, message = "required"))]
    pub location: String,

    pub logo_url: Option<String>,
}
