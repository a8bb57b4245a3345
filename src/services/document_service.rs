// src/services/document_service.rs

use std::path::PathBuf;

use genpdf::{elements, style, Element};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{invoice::InvoiceView, profile::UserProfile},
    services::{InvoiceService, ProfileService},
};

const FONT_FAMILY: &str = "Roboto";

fn money(amount: Decimal) -> String {
    format!("NGN {:.2}", amount)
}

fn pdf_error(e: genpdf::error::Error) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}

/// The label/value pairs printed under the line item table.
pub fn totals_block(view: &InvoiceView) -> Vec<(&'static str, String)> {
    let invoice = &view.invoice;
    let mut rows = vec![("Subtotal", money(invoice.subtotal))];
    if invoice.apply_vat {
        rows.push(("VAT", money(invoice.vat_amount)));
    }
    rows.push(("Total", money(invoice.total_amount)));
    if invoice.amount_paid > Decimal::ZERO {
        rows.push(("Amount paid", money(invoice.amount_paid)));
        rows.push(("Balance due", money(invoice.outstanding())));
    }
    rows
}

#[derive(Clone)]
pub struct DocumentService {
    invoices: InvoiceService,
    profiles: ProfileService,
    fonts_dir: PathBuf,
}

impl DocumentService {
    pub fn new(invoices: InvoiceService, profiles: ProfileService, fonts_dir: PathBuf) -> Self {
        Self { invoices, profiles, fonts_dir }
    }

    pub async fn generate_invoice_pdf(&self, user_id: Uuid, invoice_id: Uuid) -> Result<Vec<u8>, AppError> {
        let view = self.invoices.get(user_id, invoice_id).await?;
        let profile = self.profiles.find(user_id).await?;
        self.render(&view, profile.as_ref())
    }

    fn render(&self, view: &InvoiceView, profile: Option<&UserProfile>) -> Result<Vec<u8>, AppError> {
        let invoice = &view.invoice;

        let font_family = genpdf::fonts::from_files(&self.fonts_dir, FONT_FAMILY, None).map_err(|_| {
            AppError::FontNotFound(format!("{} fonts missing from {}", FONT_FAMILY, self.fonts_dir.display()))
        })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Invoice {}", invoice.invoice_number));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // Header: the business issuing the invoice.
        match profile {
            Some(p) => {
                doc.push(elements::Paragraph::new(p.business_name.clone())
                    .styled(style::Style::new().bold().with_font_size(18)));
                doc.push(elements::Paragraph::new(format!("{} | {}", p.location, p.phone))
                    .styled(style::Style::new().with_font_size(10)));
                doc.push(elements::Paragraph::new(p.email.clone())
                    .styled(style::Style::new().with_font_size(10)));
            }
            None => {
                doc.push(elements::Paragraph::new("INVOICE")
                    .styled(style::Style::new().bold().with_font_size(18)));
            }
        }

        doc.push(elements::Break::new(1.5));

        doc.push(elements::Paragraph::new(format!("Invoice {}", invoice.invoice_number))
            .styled(style::Style::new().bold().with_font_size(14)));
        if let Some(date) = invoice.invoice_date {
            doc.push(elements::Paragraph::new(format!("Date: {}", date.format("%d %B %Y"))));
        }
        if let Some(due) = invoice.due_date {
            doc.push(elements::Paragraph::new(format!("Due: {}", due.format("%d %B %Y"))));
        }
        doc.push(elements::Paragraph::new(format!("Bill to: {}", view.customer_name)));
        doc.push(elements::Paragraph::new(format!("Status: {}", invoice.status.as_str())));

        doc.push(elements::Break::new(2));

        // Column weights: description (4), qty (1), unit price (2), total (2)
        let mut table = elements::TableLayout::new(vec![4, 1, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let style_bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Description").styled(style_bold))
            .element(elements::Paragraph::new("Qty").styled(style_bold))
            .element(elements::Paragraph::new("Unit price").styled(style_bold))
            .element(elements::Paragraph::new("Amount").styled(style_bold))
            .push()
            .map_err(pdf_error)?;

        for item in &invoice.line_items {
            table
                .row()
                .element(elements::Paragraph::new(item.description.clone()))
                .element(elements::Paragraph::new(item.quantity.normalize().to_string()))
                .element(elements::Paragraph::new(money(item.unit_price)))
                .element(elements::Paragraph::new(money(item.line_total)))
                .push()
                .map_err(pdf_error)?;
        }

        doc.push(table);
        doc.push(elements::Break::new(2));

        for (label, value) in totals_block(view) {
            let mut line = elements::Paragraph::new(format!("{}: {}", label, value));
            line.set_alignment(genpdf::Alignment::Right);
            if label == "Total" {
                doc.push(line.styled(style::Style::new().bold().with_font_size(12)));
            } else {
                doc.push(line);
            }
        }

        if let Some(notes) = invoice.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            doc.push(elements::Break::new(2));
            doc.push(elements::Paragraph::new(notes.to_string())
                .styled(style::Style::new().italic().with_font_size(8)));
        }

        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(pdf_error)?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Stores;
    use crate::models::invoice::{Invoice, InvoiceStatus};
    use crate::services::Calculator;
    use chrono::Utc;
    use std::str::FromStr;

    fn view(paid: &str, apply_vat: bool) -> InvoiceView {
        InvoiceView {
            invoice: Invoice {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                customer_id: Uuid::new_v4(),
                invoice_number: "INV-20240115-0042".to_string(),
                invoice_date: None,
                due_date: None,
                notes: None,
                line_items: vec![],
                apply_vat,
                subtotal: Decimal::from(2500),
                vat_amount: Decimal::from_str("187.50").unwrap(),
                total_amount: Decimal::from_str("2687.50").unwrap(),
                amount_paid: Decimal::from_str(paid).unwrap(),
                status: InvoiceStatus::Unpaid,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            customer_name: "Adaeze Stores".to_string(),
        }
    }

    #[test]
    fn totals_block_lists_balance_only_after_payment() {
        let unpaid = totals_block(&view("0", true));
        assert_eq!(
            unpaid,
            vec![
                ("Subtotal", "NGN 2500.00".to_string()),
                ("VAT", "NGN 187.50".to_string()),
                ("Total", "NGN 2687.50".to_string()),
            ]
        );

        let partial = totals_block(&view("1000", true));
        assert_eq!(partial.last().unwrap(), &("Balance due", "NGN 1687.50".to_string()));
    }

    #[test]
    fn vat_line_hidden_without_vat() {
        let rows = totals_block(&view("0", false));
        assert!(rows.iter().all(|(label, _)| *label != "VAT"));
    }

    #[test]
    fn missing_fonts_are_reported() {
        let stores = Stores::memory();
        let service = DocumentService::new(
            InvoiceService::new(stores.invoices.clone(), stores.customers.clone(), Calculator::default()),
            ProfileService::new(stores.profiles.clone()),
            PathBuf::from("/nonexistent/fonts"),
        );

        let err = service.render(&view("0", true), None).unwrap_err();
        assert!(matches!(err, AppError::FontNotFound(_)));
    }
}
