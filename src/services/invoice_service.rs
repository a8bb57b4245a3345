// src/services/invoice_service.rs

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerStore, InvoiceStore, NewInvoice},
    models::{
        dashboard::MonthGroup,
        invoice::{
            CreateInvoicePayload, Invoice, InvoiceInput, InvoiceList, InvoiceTab, InvoiceView,
            LineItem, SaveMode,
        },
    },
    services::{
        calculator::{Calculator, InvoiceTotals},
        reporting, status,
    },
};

const NUMBER_ATTEMPTS: usize = 5;

/// `INV-YYYYMMDD-NNNN` with a random four digit suffix.
pub fn generate_invoice_number(date: NaiveDate) -> String {
    let suffix = Uuid::new_v4().as_u128() % 10_000;
    format!("INV-{}-{:04}", date.format("%Y%m%d"), suffix)
}

#[derive(Clone)]
pub struct InvoiceService {
    invoices: Arc<dyn InvoiceStore>,
    customers: Arc<dyn CustomerStore>,
    calculator: Calculator,
}

impl InvoiceService {
    pub fn new(
        invoices: Arc<dyn InvoiceStore>,
        customers: Arc<dyn CustomerStore>,
        calculator: Calculator,
    ) -> Self {
        Self { invoices, customers, calculator }
    }

    pub fn preview_totals(&self, items: &[LineItem], apply_vat: bool) -> Result<InvoiceTotals, AppError> {
        self.calculator.invoice_totals(items, apply_vat)
    }

    // Shared by create and update: the customer must exist and the line items
    // are priced from scratch.
    async fn price(&self, user_id: Uuid, input: &InvoiceInput) -> Result<(Vec<LineItem>, InvoiceTotals), AppError> {
        if input.line_items.is_empty() {
            return Err(AppError::MissingField("lineItems"));
        }

        if self
            .customers
            .find_customer(user_id, input.customer_id)
            .await?
            .is_none()
        {
            return Err(AppError::DanglingReference(input.customer_id));
        }

        let line_items = self.calculator.price_line_items(&input.line_items)?;
        let totals = self.calculator.invoice_totals(&line_items, input.apply_vat)?;
        Ok((line_items, totals))
    }

    pub async fn create(&self, user_id: Uuid, payload: &CreateInvoicePayload) -> Result<Invoice, AppError> {
        let input = &payload.invoice;
        if payload.mode == SaveMode::Send && input.due_date.is_none() {
            return Err(AppError::MissingField("dueDate"));
        }

        let (line_items, totals) = self.price(user_id, input).await?;
        let invoice_date = input.invoice_date.unwrap_or_else(|| Utc::now().date_naive());

        let mut new = NewInvoice {
            user_id,
            customer_id: input.customer_id,
            invoice_number: String::new(),
            invoice_date: Some(invoice_date),
            due_date: input.due_date,
            notes: input.notes.clone(),
            line_items,
            apply_vat: input.apply_vat,
            subtotal: totals.subtotal,
            vat_amount: totals.vat_amount,
            total_amount: totals.total_amount,
            amount_paid: Decimal::ZERO,
            status: status::initial_status(payload.mode, Decimal::ZERO, totals.total_amount),
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            new.invoice_number = generate_invoice_number(invoice_date);
            match self.invoices.insert_invoice(&new).await {
                Ok(invoice) => {
                    tracing::info!(
                        "Invoice {} created as {} (total {})",
                        invoice.invoice_number,
                        invoice.status.as_str(),
                        invoice.total_amount
                    );
                    return Ok(invoice);
                }
                Err(AppError::InvoiceNumberTaken) if attempt < NUMBER_ATTEMPTS => {
                    tracing::debug!("Invoice number {} already taken, retrying", new.invoice_number);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn find(&self, user_id: Uuid, id: Uuid) -> Result<Invoice, AppError> {
        self.invoices
            .find_invoice(user_id, id)
            .await?
            .ok_or(AppError::NotFound("Invoice"))
    }

    async fn save(&self, invoice: &Invoice) -> Result<Invoice, AppError> {
        self.invoices
            .save_invoice(invoice)
            .await?
            .ok_or(AppError::NotFound("Invoice"))
    }

    /// Replaces customer, dates, notes and line items of a draft. Totals are
    /// recomputed before anything is written.
    pub async fn update_draft(&self, user_id: Uuid, id: Uuid, input: &InvoiceInput) -> Result<Invoice, AppError> {
        let mut invoice = self.find(user_id, id).await?;
        status::ensure_editable(invoice.status)?;

        let (line_items, totals) = self.price(user_id, input).await?;

        invoice.customer_id = input.customer_id;
        invoice.invoice_date = input.invoice_date.or(invoice.invoice_date);
        invoice.due_date = input.due_date;
        invoice.notes = input.notes.clone();
        invoice.line_items = line_items;
        invoice.apply_vat = input.apply_vat;
        invoice.subtotal = totals.subtotal;
        invoice.vat_amount = totals.vat_amount;
        invoice.total_amount = totals.total_amount;

        self.save(&invoice).await
    }

    pub async fn finalize(&self, user_id: Uuid, id: Uuid) -> Result<Invoice, AppError> {
        let mut invoice = self.find(user_id, id).await?;
        let next = status::finalize(&invoice)?;
        if invoice.due_date.is_none() {
            return Err(AppError::MissingField("dueDate"));
        }

        invoice.status = next;
        let saved = self.save(&invoice).await?;
        tracing::info!("Invoice {} finalised as {}", saved.invoice_number, saved.status.as_str());
        Ok(saved)
    }

    pub async fn record_payment(&self, user_id: Uuid, id: Uuid, amount_paid: Decimal) -> Result<Invoice, AppError> {
        let mut invoice = self.find(user_id, id).await?;
        status::apply_payment(&self.calculator, &mut invoice, amount_paid)?;

        let saved = self.save(&invoice).await?;
        tracing::info!(
            "Payment of {} recorded on invoice {} ({})",
            saved.amount_paid,
            saved.invoice_number,
            saved.status.as_str()
        );
        Ok(saved)
    }

    /// Only drafts can be deleted.
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let invoice = self.find(user_id, id).await?;
        status::ensure_editable(invoice.status)?;

        if !self.invoices.delete_invoice(user_id, id).await? {
            return Err(AppError::NotFound("Invoice"));
        }
        tracing::info!("Draft invoice {} deleted", invoice.invoice_number);
        Ok(())
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<InvoiceView, AppError> {
        let invoice = self.find(user_id, id).await?;
        let customers = self.customers.list_customers(user_id).await?;
        let index = reporting::index_customers(&customers);
        Ok(InvoiceView {
            customer_name: reporting::customer_name(&index, invoice.customer_id),
            invoice,
        })
    }

    async fn views(&self, user_id: Uuid, invoices: Vec<Invoice>) -> Result<Vec<InvoiceView>, AppError> {
        let customers = self.customers.list_customers(user_id).await?;
        let index = reporting::index_customers(&customers);
        Ok(invoices
            .into_iter()
            .map(|invoice| InvoiceView {
                customer_name: reporting::customer_name(&index, invoice.customer_id),
                invoice,
            })
            .collect())
    }

    pub async fn list(&self, user_id: Uuid, tab: InvoiceTab) -> Result<InvoiceList, AppError> {
        let all = self.invoices.list_invoices(user_id).await?;
        let counts = reporting::invoice_tab_counts(&all);
        let totals = reporting::invoice_list_totals(&all);

        let shown: Vec<Invoice> = all.into_iter().filter(|i| tab.matches(i.status)).collect();
        Ok(InvoiceList {
            invoices: self.views(user_id, shown).await?,
            counts,
            totals,
        })
    }

    pub async fn by_month(&self, user_id: Uuid, tab: InvoiceTab) -> Result<Vec<MonthGroup<InvoiceView>>, AppError> {
        let shown: Vec<Invoice> = self
            .invoices
            .list_invoices(user_id)
            .await?
            .into_iter()
            .filter(|i| tab.matches(i.status))
            .collect();

        let groups = reporting::group_by_month(&shown);
        let mut out = Vec::with_capacity(groups.len());
        for group in groups {
            out.push(MonthGroup {
                label: group.label,
                items: self.views(user_id, group.items).await?,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Stores;
    use crate::models::customer::CustomerInput;
    use crate::models::invoice::InvoiceStatus;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(quantity: &str, unit_price: &str) -> LineItem {
        LineItem {
            description: "Design work".to_string(),
            quantity: dec(quantity),
            unit_price: dec(unit_price),
            line_total: Decimal::ZERO,
        }
    }

    struct Fixture {
        stores: Stores,
        service: InvoiceService,
        owner: Uuid,
        customer_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let stores = Stores::memory();
        let owner = Uuid::new_v4();
        let customer = stores
            .customers
            .insert_customer(
                owner,
                &CustomerInput {
                    name: "Adaeze Stores".to_string(),
                    email: "a@shop.ng".to_string(),
                    phone: "0800".to_string(),
                    tax_id: None,
                },
            )
            .await
            .unwrap();
        let service = InvoiceService::new(stores.invoices.clone(), stores.customers.clone(), Calculator::default());
        Fixture { stores, service, owner, customer_id: customer.id }
    }

    fn payload(customer_id: Uuid, mode: SaveMode, due: Option<&str>) -> CreateInvoicePayload {
        CreateInvoicePayload {
            invoice: InvoiceInput {
                customer_id,
                invoice_date: Some(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
                due_date: due.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
                notes: None,
                line_items: vec![item("2", "500"), item("1", "1500")],
                apply_vat: true,
            },
            mode,
        }
    }

    #[test]
    fn invoice_number_format() {
        let number = generate_invoice_number(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert!(number.starts_with("INV-20240115-"));
        assert_eq!(number.len(), "INV-20240115-0000".len());
        assert!(number[13..].chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn draft_is_created_with_recomputed_totals() {
        let f = fixture().await;
        let invoice = f
            .service
            .create(f.owner, &payload(f.customer_id, SaveMode::Draft, None))
            .await
            .unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.subtotal, dec("2500"));
        assert_eq!(invoice.vat_amount, dec("187.50"));
        assert_eq!(invoice.total_amount, dec("2687.50"));
        assert_eq!(invoice.line_items[0].line_total, dec("1000"));
    }

    #[tokio::test]
    async fn sending_requires_due_date() {
        let f = fixture().await;
        let err = f
            .service
            .create(f.owner, &payload(f.customer_id, SaveMode::Send, None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingField("dueDate")));

        let sent = f
            .service
            .create(f.owner, &payload(f.customer_id, SaveMode::Send, Some("2024-02-15")))
            .await
            .unwrap();
        assert_eq!(sent.status, InvoiceStatus::Unpaid);
    }

    #[tokio::test]
    async fn unknown_customer_is_a_dangling_reference() {
        let f = fixture().await;
        let ghost = Uuid::new_v4();
        let err = f
            .service
            .create(f.owner, &payload(ghost, SaveMode::Draft, None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DanglingReference(id) if id == ghost));
    }

    #[tokio::test]
    async fn empty_line_items_are_rejected() {
        let f = fixture().await;
        let mut p = payload(f.customer_id, SaveMode::Draft, None);
        p.invoice.line_items.clear();

        let err = f.service.create(f.owner, &p).await.unwrap_err();
        assert!(matches!(err, AppError::MissingField("lineItems")));
    }

    #[tokio::test]
    async fn editing_a_sent_invoice_leaves_it_untouched() {
        let f = fixture().await;
        let sent = f
            .service
            .create(f.owner, &payload(f.customer_id, SaveMode::Send, Some("2024-02-15")))
            .await
            .unwrap();

        let mut edit = payload(f.customer_id, SaveMode::Draft, Some("2024-02-15")).invoice;
        edit.line_items = vec![item("10", "10000")];
        let err = f.service.update_draft(f.owner, sent.id, &edit).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        let stored = f.stores.invoices.find_invoice(f.owner, sent.id).await.unwrap().unwrap();
        assert_eq!(stored.total_amount, dec("2687.50"));
        assert_eq!(stored.line_items, sent.line_items);
    }

    #[tokio::test]
    async fn draft_edit_recomputes_totals() {
        let f = fixture().await;
        let draft = f
            .service
            .create(f.owner, &payload(f.customer_id, SaveMode::Draft, None))
            .await
            .unwrap();

        let mut edit = payload(f.customer_id, SaveMode::Draft, None).invoice;
        edit.line_items = vec![item("4", "250")];
        edit.apply_vat = false;
        let updated = f.service.update_draft(f.owner, draft.id, &edit).await.unwrap();

        assert_eq!(updated.subtotal, dec("1000"));
        assert_eq!(updated.vat_amount, Decimal::ZERO);
        assert_eq!(updated.total_amount, dec("1000"));
        assert_eq!(updated.invoice_number, draft.invoice_number);
    }

    #[tokio::test]
    async fn finalize_then_pay() {
        let f = fixture().await;
        let draft = f
            .service
            .create(f.owner, &payload(f.customer_id, SaveMode::Draft, Some("2024-02-15")))
            .await
            .unwrap();

        let err = f.service.record_payment(f.owner, draft.id, dec("100")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        let issued = f.service.finalize(f.owner, draft.id).await.unwrap();
        assert_eq!(issued.status, InvoiceStatus::Unpaid);
        assert!(matches!(
            f.service.finalize(f.owner, draft.id).await,
            Err(AppError::InvalidState(_))
        ));

        let partial = f.service.record_payment(f.owner, draft.id, dec("1000")).await.unwrap();
        assert_eq!(partial.status, InvoiceStatus::PartiallyPaid);

        let paid = f.service.record_payment(f.owner, draft.id, dec("2687.50")).await.unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);

        let refunded = f.service.record_payment(f.owner, draft.id, Decimal::ZERO).await.unwrap();
        assert_eq!(refunded.status, InvoiceStatus::Unpaid);
    }

    #[tokio::test]
    async fn finalize_without_due_date_is_rejected() {
        let f = fixture().await;
        let draft = f
            .service
            .create(f.owner, &payload(f.customer_id, SaveMode::Draft, None))
            .await
            .unwrap();

        let err = f.service.finalize(f.owner, draft.id).await.unwrap_err();
        assert!(matches!(err, AppError::MissingField("dueDate")));
    }

    #[tokio::test]
    async fn only_drafts_can_be_deleted() {
        let f = fixture().await;
        let sent = f
            .service
            .create(f.owner, &payload(f.customer_id, SaveMode::Send, Some("2024-02-15")))
            .await
            .unwrap();
        let draft = f
            .service
            .create(f.owner, &payload(f.customer_id, SaveMode::Draft, None))
            .await
            .unwrap();

        assert!(matches!(f.service.delete(f.owner, sent.id).await, Err(AppError::InvalidState(_))));
        f.service.delete(f.owner, draft.id).await.unwrap();
        assert!(matches!(f.service.get(f.owner, draft.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_filters_by_tab_and_names_deleted_customers() {
        let f = fixture().await;
        f.service
            .create(f.owner, &payload(f.customer_id, SaveMode::Draft, None))
            .await
            .unwrap();
        f.service
            .create(f.owner, &payload(f.customer_id, SaveMode::Send, Some("2024-02-15")))
            .await
            .unwrap();
        f.stores.customers.delete_customer(f.owner, f.customer_id).await.unwrap();

        let list = f.service.list(f.owner, InvoiceTab::Unpaid).await.unwrap();
        assert_eq!(list.invoices.len(), 1);
        assert_eq!(list.counts.all, 2);
        assert_eq!(list.counts.draft, 1);
        assert_eq!(list.totals.invoiced, dec("5375.00"));
        assert_eq!(list.invoices[0].customer_name, reporting::UNKNOWN_CUSTOMER);

        let months = f.service.by_month(f.owner, InvoiceTab::All).await.unwrap();
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].label, "January 2024");
        assert_eq!(months[0].items.len(), 2);
    }

    #[test]
    fn preview_is_pure() {
        let service = InvoiceService::new(
            Stores::memory().invoices,
            Stores::memory().customers,
            Calculator::default(),
        );
        let totals = service.preview_totals(&[item("2", "500"), item("1", "1500")], true).unwrap();
        assert_eq!(totals.total_amount, dec("2687.50"));
    }
}
