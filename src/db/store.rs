// src/db/store.rs
//
// The persistence collaborator. Every operation is scoped by the owning
// user's id and either fully succeeds or returns an error.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::{
    auth::User,
    customer::{Customer, CustomerInput},
    expense::{Expense, ExpenseCategory, ExpenseStatus},
    invoice::{Invoice, InvoiceStatus, LineItem},
    profile::{ProfileInput, UserProfile},
};

/// An invoice ready to be stored; id and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub user_id: Uuid,
    pub customer_id: Uuid,
    pub invoice_number: String,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub line_items: Vec<LineItem>,
    pub apply_vat: bool,
    pub subtotal: Decimal,
    pub vat_amount: Decimal,
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
    pub status: InvoiceStatus,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub user_id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub category: ExpenseCategory,
    pub expense_date: Option<NaiveDate>,
    pub apply_vat: bool,
    pub vat_amount: Decimal,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub receipt_url: Option<String>,
    pub status: ExpenseStatus,
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Fails with `CustomerEmailTaken` when the owner already has a customer with that email.
    async fn insert_customer(&self, user_id: Uuid, input: &CustomerInput) -> Result<Customer, AppError>;
    async fn update_customer(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: &CustomerInput,
    ) -> Result<Option<Customer>, AppError>;
    async fn delete_customer(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError>;
    async fn find_customer(&self, user_id: Uuid, id: Uuid) -> Result<Option<Customer>, AppError>;
    /// Newest first.
    async fn list_customers(&self, user_id: Uuid) -> Result<Vec<Customer>, AppError>;
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Fails with `InvoiceNumberTaken` when the number is already used by the owner.
    async fn insert_invoice(&self, invoice: &NewInvoice) -> Result<Invoice, AppError>;
    /// Overwrites every mutable column. Last write wins.
    async fn save_invoice(&self, invoice: &Invoice) -> Result<Option<Invoice>, AppError>;
    async fn delete_invoice(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError>;
    async fn find_invoice(&self, user_id: Uuid, id: Uuid) -> Result<Option<Invoice>, AppError>;
    /// Newest first.
    async fn list_invoices(&self, user_id: Uuid) -> Result<Vec<Invoice>, AppError>;
}

#[async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn insert_expense(&self, expense: &NewExpense) -> Result<Expense, AppError>;
    async fn save_expense(&self, expense: &Expense) -> Result<Option<Expense>, AppError>;
    async fn delete_expense(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError>;
    async fn find_expense(&self, user_id: Uuid, id: Uuid) -> Result<Option<Expense>, AppError>;
    /// Latest expense date first.
    async fn list_expenses(&self, user_id: Uuid) -> Result<Vec<Expense>, AppError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError>;
    async fn upsert_profile(&self, user_id: Uuid, input: &ProfileInput) -> Result<UserProfile, AppError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    /// Fails with `EmailAlreadyExists` when the email is registered.
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, AppError>;
}
