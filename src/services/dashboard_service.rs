// src/services/dashboard_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerStore, ExpenseStore, InvoiceStore},
    models::dashboard::{CustomerRevenue, DashboardSummary},
    services::reporting,
};

#[derive(Clone)]
pub struct DashboardService {
    invoices: Arc<dyn InvoiceStore>,
    expenses: Arc<dyn ExpenseStore>,
    customers: Arc<dyn CustomerStore>,
}

impl DashboardService {
    pub fn new(
        invoices: Arc<dyn InvoiceStore>,
        expenses: Arc<dyn ExpenseStore>,
        customers: Arc<dyn CustomerStore>,
    ) -> Self {
        Self { invoices, expenses, customers }
    }

    pub async fn summary(&self, user_id: Uuid) -> Result<DashboardSummary, AppError> {
        let invoices = self.invoices.list_invoices(user_id).await?;
        let expenses = self.expenses.list_expenses(user_id).await?;
        Ok(reporting::dashboard_summary(&invoices, &expenses))
    }

    pub async fn revenue_by_customer(&self, user_id: Uuid) -> Result<Vec<CustomerRevenue>, AppError> {
        let invoices = self.invoices.list_invoices(user_id).await?;
        let customers = self.customers.list_customers(user_id).await?;
        Ok(reporting::revenue_by_customer(&invoices, &customers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewExpense, NewInvoice, Stores};
    use crate::models::expense::{ExpenseCategory, ExpenseStatus};
    use crate::models::invoice::InvoiceStatus;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn empty_dashboard_is_all_zero() {
        let stores = Stores::memory();
        let svc = DashboardService::new(stores.invoices, stores.expenses, stores.customers);

        let summary = svc.summary(Uuid::new_v4()).await.unwrap();
        assert_eq!(summary.total_revenue, Decimal::ZERO);
        assert_eq!(summary.payable_vat, Decimal::ZERO);
        assert!(summary.recent_activity.is_empty());
    }

    #[tokio::test]
    async fn vat_credit_shows_as_negative_payable() {
        let stores = Stores::memory();
        let owner = Uuid::new_v4();

        stores
            .invoices
            .insert_invoice(&NewInvoice {
                user_id: owner,
                customer_id: Uuid::new_v4(),
                invoice_number: "INV-20240110-0001".to_string(),
                invoice_date: None,
                due_date: None,
                notes: None,
                line_items: vec![],
                apply_vat: true,
                subtotal: Decimal::from(66_666),
                vat_amount: Decimal::from(5_000),
                total_amount: Decimal::from(71_666),
                amount_paid: Decimal::ZERO,
                status: InvoiceStatus::Unpaid,
            })
            .await
            .unwrap();
        stores
            .expenses
            .insert_expense(&NewExpense {
                user_id: owner,
                description: "Generator".to_string(),
                amount: Decimal::from(106_666),
                category: ExpenseCategory::Equipment,
                expense_date: None,
                apply_vat: true,
                vat_amount: Decimal::from(8_000),
                total_amount: Decimal::from(114_666),
                notes: None,
                receipt_url: None,
                status: ExpenseStatus::Approved,
            })
            .await
            .unwrap();

        let svc = DashboardService::new(stores.invoices, stores.expenses, stores.customers);
        let summary = svc.summary(owner).await.unwrap();
        assert_eq!(summary.payable_vat, Decimal::from(-3_000));

        let revenue = svc.revenue_by_customer(owner).await.unwrap();
        assert_eq!(revenue.len(), 1);
        assert_eq!(revenue[0].customer_id, None);
    }
}
