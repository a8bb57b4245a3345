// src/models/customer.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(ignore)]
    pub user_id: Uuid,

    #[schema(example = "Adaeze Stores Ltd")]
    pub name: String,

    #[schema(example = "accounts@adaeze.ng")]
    pub email: String,

    #[schema(example = "+2348012345678")]
    pub phone: String,

    #[schema(example = "12345678-0001")]
    pub tax_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Adaeze Stores Ltd")]
    pub name: String,

    #[validate(email(message = "The e-mail address is invalid."))]
    #[schema(example = "accounts@adaeze.ng")]
    pub email: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "+2348012345678")]
    pub phone: String,

    pub tax_id: Option<String>,
}

impl CustomerInput {
    /// Blank tax ids are stored as NULL.
    pub fn normalized_tax_id(&self) -> Option<&str> {
        self.tax_id.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Customer detail view figures.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub customer_id: Uuid,
    pub invoice_count: usize,
    pub total_invoiced: Decimal,
    pub total_paid: Decimal,
    pub total_outstanding: Decimal,
    pub paid_count: usize,
    pub unpaid_count: usize,
}
