// src/db/expense_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::decode_rows, error::AppError},
    db::store::{ExpenseStore, NewExpense},
    models::expense::Expense,
};

const EXPENSE_COLUMNS: &str = "id, user_id, description, amount, category, expense_date, apply_vat, \
     vat_amount, total_amount, notes, receipt_url, status, created_at, updated_at";

#[derive(Clone)]
pub struct ExpenseRepository {
    pool: PgPool,
}

impl ExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExpenseStore for ExpenseRepository {
    async fn insert_expense(&self, new: &NewExpense) -> Result<Expense, AppError> {
        let sql = format!(
            "INSERT INTO expenses (
                user_id, description, amount, category, expense_date, apply_vat,
                vat_amount, total_amount, notes, receipt_url, status
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {EXPENSE_COLUMNS}"
        );

        let expense = sqlx::query_as::<_, Expense>(&sql)
            .bind(new.user_id)
            .bind(&new.description)
            .bind(new.amount)
            .bind(new.category)
            .bind(new.expense_date)
            .bind(new.apply_vat)
            .bind(new.vat_amount)
            .bind(new.total_amount)
            .bind(&new.notes)
            .bind(&new.receipt_url)
            .bind(new.status)
            .fetch_one(&self.pool)
            .await?;
        Ok(expense)
    }

    async fn save_expense(&self, expense: &Expense) -> Result<Option<Expense>, AppError> {
        let sql = format!(
            "UPDATE expenses
             SET description = $3, amount = $4, category = $5, expense_date = $6,
                 apply_vat = $7, vat_amount = $8, total_amount = $9, notes = $10,
                 receipt_url = $11, status = $12, updated_at = NOW()
             WHERE user_id = $1 AND id = $2
             RETURNING {EXPENSE_COLUMNS}"
        );

        let saved = sqlx::query_as::<_, Expense>(&sql)
            .bind(expense.user_id)
            .bind(expense.id)
            .bind(&expense.description)
            .bind(expense.amount)
            .bind(expense.category)
            .bind(expense.expense_date)
            .bind(expense.apply_vat)
            .bind(expense.vat_amount)
            .bind(expense.total_amount)
            .bind(&expense.notes)
            .bind(&expense.receipt_url)
            .bind(expense.status)
            .fetch_optional(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn delete_expense(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM expenses WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_expense(&self, user_id: Uuid, id: Uuid) -> Result<Option<Expense>, AppError> {
        let sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE user_id = $1 AND id = $2");
        let expense = sqlx::query_as::<_, Expense>(&sql)
            .bind(user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(expense)
    }

    async fn list_expenses(&self, user_id: Uuid) -> Result<Vec<Expense>, AppError> {
        let sql = format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses
             WHERE user_id = $1
             ORDER BY expense_date DESC, created_at DESC"
        );
        let rows = sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?;
        Ok(decode_rows(rows, "expenses"))
    }
}
