// src/services/customer_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerStore, InvoiceStore},
    models::customer::{Customer, CustomerInput, CustomerSummary},
    services::reporting,
};

#[derive(Clone)]
pub struct CustomerService {
    customers: Arc<dyn CustomerStore>,
    invoices: Arc<dyn InvoiceStore>,
}

impl CustomerService {
    pub fn new(customers: Arc<dyn CustomerStore>, invoices: Arc<dyn InvoiceStore>) -> Self {
        Self { customers, invoices }
    }

    pub async fn create(&self, user_id: Uuid, input: &CustomerInput) -> Result<Customer, AppError> {
        let customer = self.customers.insert_customer(user_id, input).await?;
        tracing::info!("Customer {} added", customer.id);
        Ok(customer)
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, input: &CustomerInput) -> Result<Customer, AppError> {
        self.customers
            .update_customer(user_id, id, input)
            .await?
            .ok_or(AppError::NotFound("Customer"))
    }

    /// Invoices keep pointing at a deleted customer; they report it as unknown.
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.customers.delete_customer(user_id, id).await? {
            return Err(AppError::NotFound("Customer"));
        }

        let orphaned = self
            .invoices
            .list_invoices(user_id)
            .await?
            .iter()
            .filter(|i| i.customer_id == id)
            .count();
        if orphaned > 0 {
            tracing::warn!("Customer {} deleted with {} invoice(s) still referencing it", id, orphaned);
        } else {
            tracing::info!("Customer {} deleted", id);
        }
        Ok(())
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Customer, AppError> {
        self.customers
            .find_customer(user_id, id)
            .await?
            .ok_or(AppError::NotFound("Customer"))
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Customer>, AppError> {
        self.customers.list_customers(user_id).await
    }

    pub async fn summary(&self, user_id: Uuid, id: Uuid) -> Result<CustomerSummary, AppError> {
        let customer = self.get(user_id, id).await?;
        let invoices = self.invoices.list_invoices(user_id).await?;
        Ok(reporting::customer_summary(customer.id, &invoices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Stores;

    fn service() -> CustomerService {
        let stores = Stores::memory();
        CustomerService::new(stores.customers, stores.invoices)
    }

    fn input(name: &str, email: &str) -> CustomerInput {
        CustomerInput {
            name: name.to_string(),
            email: email.to_string(),
            phone: "+2348000000000".to_string(),
            tax_id: None,
        }
    }

    #[tokio::test]
    async fn create_update_and_delete() {
        let svc = service();
        let owner = Uuid::new_v4();

        let created = svc.create(owner, &input("Adaeze", "a@shop.ng")).await.unwrap();
        let updated = svc
            .update(owner, created.id, &input("Adaeze Stores", "a@shop.ng"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Adaeze Stores");

        svc.delete(owner, created.id).await.unwrap();
        assert!(matches!(svc.get(owner, created.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(svc.delete(owner, created.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let svc = service();
        let owner = Uuid::new_v4();
        svc.create(owner, &input("One", "same@shop.ng")).await.unwrap();

        let err = svc.create(owner, &input("Two", "same@shop.ng")).await.unwrap_err();
        assert!(matches!(err, AppError::CustomerEmailTaken));
    }

    #[tokio::test]
    async fn other_owners_cannot_see_customers() {
        let svc = service();
        let created = svc.create(Uuid::new_v4(), &input("A", "a@shop.ng")).await.unwrap();

        let stranger = Uuid::new_v4();
        assert!(svc.list(stranger).await.unwrap().is_empty());
        assert!(svc.get(stranger, created.id).await.is_err());
    }

    #[tokio::test]
    async fn summary_of_customer_without_invoices() {
        let svc = service();
        let owner = Uuid::new_v4();
        let created = svc.create(owner, &input("A", "a@shop.ng")).await.unwrap();

        let summary = svc.summary(owner, created.id).await.unwrap();
        assert_eq!(summary.invoice_count, 0);
        assert_eq!(summary.total_invoiced, rust_decimal::Decimal::ZERO);
    }
}
