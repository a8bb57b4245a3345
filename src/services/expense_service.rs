// src/services/expense_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ExpenseStore, NewExpense},
    models::{
        dashboard::MonthGroup,
        expense::{Expense, ExpenseFilter, ExpenseInput, ExpenseStatus, ExpenseSummary, ExpenseUpdate},
    },
    services::{calculator::Calculator, reporting},
};

#[derive(Clone)]
pub struct ExpenseService {
    expenses: Arc<dyn ExpenseStore>,
    calculator: Calculator,
}

impl ExpenseService {
    pub fn new(expenses: Arc<dyn ExpenseStore>, calculator: Calculator) -> Self {
        Self { expenses, calculator }
    }

    /// New expenses always start as drafts.
    pub async fn create(&self, user_id: Uuid, input: &ExpenseInput) -> Result<Expense, AppError> {
        let amount = self.calculator.sanitize("amount", input.amount)?;
        let totals = self.calculator.expense_totals(amount, input.apply_vat)?;

        let expense = self
            .expenses
            .insert_expense(&NewExpense {
                user_id,
                description: input.description.trim().to_string(),
                amount,
                category: input.category,
                expense_date: Some(input.expense_date),
                apply_vat: input.apply_vat,
                vat_amount: totals.vat_amount,
                total_amount: totals.total_amount,
                notes: input.notes.clone(),
                receipt_url: input.receipt_url.clone(),
                status: ExpenseStatus::Draft,
            })
            .await?;

        tracing::info!("Expense {} recorded (total {})", expense.id, expense.total_amount);
        Ok(expense)
    }

    async fn find(&self, user_id: Uuid, id: Uuid) -> Result<Expense, AppError> {
        self.expenses
            .find_expense(user_id, id)
            .await?
            .ok_or(AppError::NotFound("Expense"))
    }

    async fn save(&self, expense: &Expense) -> Result<Expense, AppError> {
        self.expenses
            .save_expense(expense)
            .await?
            .ok_or(AppError::NotFound("Expense"))
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Expense, AppError> {
        self.find(user_id, id).await
    }

    /// Applies the fields present in `update`. VAT and total are only
    /// recomputed when the amount or the VAT flag changes.
    pub async fn update(&self, user_id: Uuid, id: Uuid, update: &ExpenseUpdate) -> Result<Expense, AppError> {
        let mut expense = self.find(user_id, id).await?;

        if let Some(description) = &update.description {
            expense.description = description.trim().to_string();
        }
        if let Some(category) = update.category {
            expense.category = category;
        }
        if let Some(date) = update.expense_date {
            expense.expense_date = Some(date);
        }
        if let Some(notes) = &update.notes {
            expense.notes = Some(notes.clone());
        }
        if let Some(receipt_url) = &update.receipt_url {
            expense.receipt_url = Some(receipt_url.clone());
        }

        if update.amount.is_some() || update.apply_vat.is_some() {
            let amount = self
                .calculator
                .sanitize("amount", update.amount.unwrap_or(expense.amount))?;
            let apply_vat = update.apply_vat.unwrap_or(expense.apply_vat);
            let totals = self.calculator.expense_totals(amount, apply_vat)?;

            expense.amount = amount;
            expense.apply_vat = apply_vat;
            expense.vat_amount = totals.vat_amount;
            expense.total_amount = totals.total_amount;
        }

        self.save(&expense).await
    }

    /// Any status may follow any other.
    pub async fn update_status(&self, user_id: Uuid, id: Uuid, next: ExpenseStatus) -> Result<Expense, AppError> {
        let mut expense = self.find(user_id, id).await?;
        let previous = expense.status;
        expense.status = next;

        let saved = self.save(&expense).await?;
        tracing::info!("Expense {} moved from {:?} to {:?}", saved.id, previous, saved.status);
        Ok(saved)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.expenses.delete_expense(user_id, id).await? {
            return Err(AppError::NotFound("Expense"));
        }
        tracing::info!("Expense {} deleted", id);
        Ok(())
    }

    pub async fn list(&self, user_id: Uuid, filter: &ExpenseFilter) -> Result<Vec<Expense>, AppError> {
        Ok(self
            .expenses
            .list_expenses(user_id)
            .await?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect())
    }

    pub async fn by_month(&self, user_id: Uuid, filter: &ExpenseFilter) -> Result<Vec<MonthGroup<Expense>>, AppError> {
        let expenses = self.list(user_id, filter).await?;
        Ok(reporting::group_by_month(&expenses))
    }

    pub async fn summary(&self, user_id: Uuid) -> Result<ExpenseSummary, AppError> {
        let expenses = self.expenses.list_expenses(user_id).await?;
        Ok(reporting::expense_summary(&expenses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Stores;
    use crate::models::expense::ExpenseCategory;
    use crate::services::calculator::{AmountPolicy, VatRate};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn input(description: &str, amount: &str, day: u32) -> ExpenseInput {
        ExpenseInput {
            description: description.to_string(),
            amount: dec(amount),
            category: ExpenseCategory::Travel,
            expense_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            apply_vat: true,
            notes: None,
            receipt_url: None,
        }
    }

    fn service() -> ExpenseService {
        ExpenseService::new(Stores::memory().expenses, Calculator::default())
    }

    #[tokio::test]
    async fn new_expense_is_draft_with_vat() {
        let svc = service();
        let owner = Uuid::new_v4();
        let expense = svc.create(owner, &input("Flight to Abuja", "12000", 3)).await.unwrap();

        assert_eq!(expense.status, ExpenseStatus::Draft);
        assert_eq!(expense.vat_amount, dec("900"));
        assert_eq!(expense.total_amount, dec("12900"));
    }

    #[tokio::test]
    async fn update_recomputes_only_when_amount_or_vat_change() {
        let svc = service();
        let owner = Uuid::new_v4();
        let expense = svc.create(owner, &input("Taxi", "1000", 3)).await.unwrap();

        let renamed = svc
            .update(
                owner,
                expense.id,
                &ExpenseUpdate { description: Some("Taxi to client".to_string()), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(renamed.total_amount, dec("1075"));

        let no_vat = svc
            .update(owner, expense.id, &ExpenseUpdate { apply_vat: Some(false), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(no_vat.vat_amount, Decimal::ZERO);
        assert_eq!(no_vat.total_amount, dec("1000"));

        let bigger = svc
            .update(owner, expense.id, &ExpenseUpdate { amount: Some(dec("2500")), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(bigger.total_amount, dec("2500"));
    }

    #[tokio::test]
    async fn status_is_free_form() {
        let svc = service();
        let owner = Uuid::new_v4();
        let expense = svc.create(owner, &input("Fuel", "100", 3)).await.unwrap();

        for next in [
            ExpenseStatus::Approved,
            ExpenseStatus::Draft,
            ExpenseStatus::Rejected,
            ExpenseStatus::Pending,
        ] {
            let saved = svc.update_status(owner, expense.id, next).await.unwrap();
            assert_eq!(saved.status, next);
        }
    }

    #[tokio::test]
    async fn negative_amount_under_reject_policy() {
        let svc = ExpenseService::new(
            Stores::memory().expenses,
            Calculator::new(VatRate::default(), AmountPolicy::Reject),
        );
        let err = svc.create(Uuid::new_v4(), &input("Refund", "-5", 3)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidAmount { .. }));
    }

    #[tokio::test]
    async fn list_filters_and_groups() {
        let svc = service();
        let owner = Uuid::new_v4();
        svc.create(owner, &input("Flight", "100", 3)).await.unwrap();
        let mut plain = input("Stationery", "50", 20);
        plain.apply_vat = false;
        plain.category = ExpenseCategory::OfficeSupplies;
        svc.create(owner, &plain).await.unwrap();

        let all = svc.list(owner, &ExpenseFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].description, "Stationery");

        let vat_only = ExpenseFilter { vat_only: true, ..Default::default() };
        assert_eq!(svc.list(owner, &vat_only).await.unwrap().len(), 1);

        let by_label = ExpenseFilter { search: Some("office".to_string()), ..Default::default() };
        let found = svc.list(owner, &by_label).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category, ExpenseCategory::OfficeSupplies);

        let months = svc.by_month(owner, &ExpenseFilter::default()).await.unwrap();
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].label, "January 2024");
    }

    #[tokio::test]
    async fn delete_missing_expense() {
        let svc = service();
        let err = svc.delete(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("Expense")));
    }
}
