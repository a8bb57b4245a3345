// src/db/memory.rs

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::{
    CustomerStore, ExpenseStore, InvoiceStore, NewExpense, NewInvoice, ProfileStore, UserStore,
};
use crate::models::{
    auth::User,
    customer::{Customer, CustomerInput},
    expense::Expense,
    invoice::Invoice,
    profile::{ProfileInput, UserProfile},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    profiles: Vec<UserProfile>,
    customers: Vec<Customer>,
    invoices: Vec<Invoice>,
    expenses: Vec<Expense>,
}

/// A process-local store with the same contracts as the Postgres repositories.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn email_taken(customers: &[Customer], user_id: Uuid, email: &str, except: Option<Uuid>) -> bool {
    customers.iter().any(|c| {
        c.user_id == user_id && c.email.eq_ignore_ascii_case(email) && Some(c.id) != except
    })
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn insert_customer(&self, user_id: Uuid, input: &CustomerInput) -> Result<Customer, AppError> {
        let mut tables = self.tables();
        if email_taken(&tables.customers, user_id, &input.email, None) {
            return Err(AppError::CustomerEmailTaken);
        }

        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4(),
            user_id,
            name: input.name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            tax_id: input.normalized_tax_id().map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        tables.customers.push(customer.clone());
        Ok(customer)
    }

    async fn update_customer(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: &CustomerInput,
    ) -> Result<Option<Customer>, AppError> {
        let mut tables = self.tables();
        if email_taken(&tables.customers, user_id, &input.email, Some(id)) {
            return Err(AppError::CustomerEmailTaken);
        }

        let Some(customer) = tables
            .customers
            .iter_mut()
            .find(|c| c.user_id == user_id && c.id == id)
        else {
            return Ok(None);
        };
        customer.name = input.name.clone();
        customer.email = input.email.clone();
        customer.phone = input.phone.clone();
        customer.tax_id = input.normalized_tax_id().map(str::to_string);
        customer.updated_at = Utc::now();
        Ok(Some(customer.clone()))
    }

    async fn delete_customer(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables();
        let before = tables.customers.len();
        tables.customers.retain(|c| !(c.user_id == user_id && c.id == id));
        Ok(tables.customers.len() < before)
    }

    async fn find_customer(&self, user_id: Uuid, id: Uuid) -> Result<Option<Customer>, AppError> {
        Ok(self
            .tables()
            .customers
            .iter()
            .find(|c| c.user_id == user_id && c.id == id)
            .cloned())
    }

    async fn list_customers(&self, user_id: Uuid) -> Result<Vec<Customer>, AppError> {
        let mut customers: Vec<Customer> = self
            .tables()
            .customers
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(customers)
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn insert_invoice(&self, new: &NewInvoice) -> Result<Invoice, AppError> {
        let mut tables = self.tables();
        let taken = tables
            .invoices
            .iter()
            .any(|i| i.user_id == new.user_id && i.invoice_number == new.invoice_number);
        if taken {
            return Err(AppError::InvoiceNumberTaken);
        }

        let now = Utc::now();
        let invoice = Invoice {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            customer_id: new.customer_id,
            invoice_number: new.invoice_number.clone(),
            invoice_date: new.invoice_date,
            due_date: new.due_date,
            notes: new.notes.clone(),
            line_items: new.line_items.clone(),
            apply_vat: new.apply_vat,
            subtotal: new.subtotal,
            vat_amount: new.vat_amount,
            total_amount: new.total_amount,
            amount_paid: new.amount_paid,
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        tables.invoices.push(invoice.clone());
        Ok(invoice)
    }

    async fn save_invoice(&self, invoice: &Invoice) -> Result<Option<Invoice>, AppError> {
        let mut tables = self.tables();
        let Some(stored) = tables
            .invoices
            .iter_mut()
            .find(|i| i.user_id == invoice.user_id && i.id == invoice.id)
        else {
            return Ok(None);
        };
        *stored = Invoice {
            invoice_number: stored.invoice_number.clone(),
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..invoice.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn delete_invoice(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables();
        let before = tables.invoices.len();
        tables.invoices.retain(|i| !(i.user_id == user_id && i.id == id));
        Ok(tables.invoices.len() < before)
    }

    async fn find_invoice(&self, user_id: Uuid, id: Uuid) -> Result<Option<Invoice>, AppError> {
        Ok(self
            .tables()
            .invoices
            .iter()
            .find(|i| i.user_id == user_id && i.id == id)
            .cloned())
    }

    async fn list_invoices(&self, user_id: Uuid) -> Result<Vec<Invoice>, AppError> {
        let mut invoices: Vec<Invoice> = self
            .tables()
            .invoices
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invoices)
    }
}

#[async_trait]
impl ExpenseStore for MemoryStore {
    async fn insert_expense(&self, new: &NewExpense) -> Result<Expense, AppError> {
        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            description: new.description.clone(),
            amount: new.amount,
            category: new.category,
            expense_date: new.expense_date,
            apply_vat: new.apply_vat,
            vat_amount: new.vat_amount,
            total_amount: new.total_amount,
            notes: new.notes.clone(),
            receipt_url: new.receipt_url.clone(),
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        self.tables().expenses.push(expense.clone());
        Ok(expense)
    }

    async fn save_expense(&self, expense: &Expense) -> Result<Option<Expense>, AppError> {
        let mut tables = self.tables();
        let Some(stored) = tables
            .expenses
            .iter_mut()
            .find(|e| e.user_id == expense.user_id && e.id == expense.id)
        else {
            return Ok(None);
        };
        *stored = Expense {
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..expense.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn delete_expense(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables();
        let before = tables.expenses.len();
        tables.expenses.retain(|e| !(e.user_id == user_id && e.id == id));
        Ok(tables.expenses.len() < before)
    }

    async fn find_expense(&self, user_id: Uuid, id: Uuid) -> Result<Option<Expense>, AppError> {
        Ok(self
            .tables()
            .expenses
            .iter()
            .find(|e| e.user_id == user_id && e.id == id)
            .cloned())
    }

    async fn list_expenses(&self, user_id: Uuid) -> Result<Vec<Expense>, AppError> {
        let mut expenses: Vec<Expense> = self
            .tables()
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        // Postgres sorts NULL dates first in DESC order; mirror that.
        expenses.sort_by(|a, b| match (a.expense_date, b.expense_date) {
            (None, None) => b.created_at.cmp(&a.created_at),
            (None, Some(_)) => std::cmp::Ordering::Less,
            (Some(_), None) => std::cmp::Ordering::Greater,
            (Some(x), Some(y)) => y.cmp(&x).then_with(|| b.created_at.cmp(&a.created_at)),
        });
        Ok(expenses)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        Ok(self
            .tables()
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn upsert_profile(&self, user_id: Uuid, input: &ProfileInput) -> Result<UserProfile, AppError> {
        let mut tables = self.tables();
        let now = Utc::now();

        if let Some(profile) = tables.profiles.iter_mut().find(|p| p.user_id == user_id) {
            profile.email = input.email.clone();
            profile.full_name = input.full_name.clone();
            profile.business_name = input.business_name.clone();
            profile.business_type = input.business_type.clone();
            profile.phone = input.phone.clone();
            profile.location = input.location.clone();
            profile.logo_url = input.logo_url.clone();
            profile.updated_at = now;
            return Ok(profile.clone());
        }

        let profile = UserProfile {
            user_id,
            email: input.email.clone(),
            full_name: input.full_name.clone(),
            business_name: input.business_name.clone(),
            business_type: input.business_type.clone(),
            phone: input.phone.clone(),
            location: input.location.clone(),
            logo_url: input.logo_url.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.profiles.push(profile.clone());
        Ok(profile)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .tables()
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        let mut tables = self.tables();
        if tables.users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(AppError::EmailAlreadyExists);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }
}
