// src/db/customer_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{decode_rows, unique_violation},
        error::AppError,
    },
    db::store::CustomerStore,
    models::customer::{Customer, CustomerInput},
};

const CUSTOMER_COLUMNS: &str = "id, user_id, name, email, phone, tax_id, created_at, updated_at";

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_customer_error(e: sqlx::Error) -> AppError {
    match unique_violation(&e).as_deref() {
        Some("customers_user_id_email_key") => AppError::CustomerEmailTaken,
        _ => e.into(),
    }
}

#[async_trait]
impl CustomerStore for CustomerRepository {
    async fn insert_customer(&self, user_id: Uuid, input: &CustomerInput) -> Result<Customer, AppError> {
        let sql = format!(
            "INSERT INTO customers (user_id, name, email, phone, tax_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {CUSTOMER_COLUMNS}"
        );

        sqlx::query_as::<_, Customer>(&sql)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.normalized_tax_id())
            .fetch_one(&self.pool)
            .await
            .map_err(map_customer_error)
    }

    async fn update_customer(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: &CustomerInput,
    ) -> Result<Option<Customer>, AppError> {
        let sql = format!(
            "UPDATE customers
             SET name = $3, email = $4, phone = $5, tax_id = $6, updated_at = NOW()
             WHERE user_id = $1 AND id = $2
             RETURNING {CUSTOMER_COLUMNS}"
        );

        sqlx::query_as::<_, Customer>(&sql)
            .bind(user_id)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.normalized_tax_id())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_customer_error)
    }

    async fn delete_customer(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM customers WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_customer(&self, user_id: Uuid, id: Uuid) -> Result<Option<Customer>, AppError> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE user_id = $1 AND id = $2");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    async fn list_customers(&self, user_id: Uuid) -> Result<Vec<Customer>, AppError> {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?;
        Ok(decode_rows(rows, "customers"))
    }
}
