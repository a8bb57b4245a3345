// src/services/status.rs

use rust_decimal::Decimal;

use crate::common::error::AppError;
use crate::models::invoice::{Invoice, InvoiceStatus, SaveMode};
use crate::services::calculator::Calculator;

/// Payment status from what has been paid against what is owed.
/// Over-payment counts as paid.
pub fn resolve_payment_status(amount_paid: Decimal, total_amount: Decimal) -> InvoiceStatus {
    if amount_paid <= Decimal::ZERO {
        InvoiceStatus::Unpaid
    } else if amount_paid >= total_amount {
        InvoiceStatus::Paid
    } else {
        InvoiceStatus::PartiallyPaid
    }
}

/// Status a brand new invoice is stored with.
pub fn initial_status(mode: SaveMode, amount_paid: Decimal, total_amount: Decimal) -> InvoiceStatus {
    match mode {
        SaveMode::Draft => InvoiceStatus::Draft,
        SaveMode::Send => resolve_payment_status(amount_paid, total_amount),
    }
}

/// Line items, customer and dates may only change while an invoice is a draft.
pub fn ensure_editable(status: InvoiceStatus) -> Result<(), AppError> {
    if status.is_draft() {
        Ok(())
    } else {
        Err(AppError::invalid_state(format!(
            "invoice is {} and can no longer be edited",
            status.as_str()
        )))
    }
}

/// The one-way draft exit. Returns the status the invoice takes once issued.
pub fn finalize(invoice: &Invoice) -> Result<InvoiceStatus, AppError> {
    if !invoice.status.is_draft() {
        return Err(AppError::invalid_state(format!(
            "invoice is already {}",
            invoice.status.as_str()
        )));
    }
    Ok(resolve_payment_status(invoice.amount_paid, invoice.total_amount))
}

/// Sets the paid amount on an issued invoice and re-derives its status.
/// Lowering the amount (a refund or correction) is allowed.
pub fn apply_payment(calc: &Calculator, invoice: &mut Invoice, amount_paid: Decimal) -> Result<(), AppError> {
    if invoice.status.is_draft() {
        return Err(AppError::invalid_state(
            "payments can only be recorded on issued invoices",
        ));
    }

    let amount_paid = calc.sanitize("amountPaid", amount_paid)?;
    invoice.amount_paid = amount_paid;
    invoice.status = resolve_payment_status(amount_paid, invoice.total_amount);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::calculator::{AmountPolicy, VatRate};
    use chrono::Utc;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn invoice(status: InvoiceStatus, total: &str, paid: &str) -> Invoice {
        Invoice {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            invoice_number: "INV-20240115-0001".to_string(),
            invoice_date: None,
            due_date: None,
            notes: None,
            line_items: vec![],
            apply_vat: true,
            subtotal: dec(total),
            vat_amount: Decimal::ZERO,
            total_amount: dec(total),
            amount_paid: dec(paid),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn payment_status_formula() {
        let total = dec("1000");
        assert_eq!(resolve_payment_status(dec("0"), total), InvoiceStatus::Unpaid);
        assert_eq!(resolve_payment_status(dec("1000"), total), InvoiceStatus::Paid);
        assert_eq!(resolve_payment_status(dec("400"), total), InvoiceStatus::PartiallyPaid);
        assert_eq!(resolve_payment_status(dec("1000.01"), total), InvoiceStatus::Paid);
        assert_eq!(resolve_payment_status(dec("-5"), total), InvoiceStatus::Unpaid);
    }

    #[test]
    fn zero_total_with_nothing_paid_is_unpaid() {
        assert_eq!(resolve_payment_status(Decimal::ZERO, Decimal::ZERO), InvoiceStatus::Unpaid);
    }

    #[test]
    fn new_invoice_status_depends_on_mode() {
        assert_eq!(initial_status(SaveMode::Draft, Decimal::ZERO, dec("10")), InvoiceStatus::Draft);
        assert_eq!(initial_status(SaveMode::Send, Decimal::ZERO, dec("10")), InvoiceStatus::Unpaid);
    }

    #[test]
    fn only_drafts_are_editable() {
        assert!(ensure_editable(InvoiceStatus::Draft).is_ok());
        for status in [
            InvoiceStatus::Unpaid,
            InvoiceStatus::PartiallyPaid,
            InvoiceStatus::Paid,
            InvoiceStatus::Overdue,
        ] {
            assert!(matches!(ensure_editable(status), Err(AppError::InvalidState(_))));
        }
    }

    #[test]
    fn finalize_is_one_way() {
        let draft = invoice(InvoiceStatus::Draft, "1000", "0");
        assert_eq!(finalize(&draft).unwrap(), InvoiceStatus::Unpaid);

        let sent = invoice(InvoiceStatus::Unpaid, "1000", "0");
        assert!(matches!(finalize(&sent), Err(AppError::InvalidState(_))));
    }

    #[test]
    fn payments_move_status_both_ways() {
        let calc = Calculator::default();
        let mut inv = invoice(InvoiceStatus::Unpaid, "1000", "0");

        apply_payment(&calc, &mut inv, dec("400")).unwrap();
        assert_eq!(inv.status, InvoiceStatus::PartiallyPaid);

        apply_payment(&calc, &mut inv, dec("1000")).unwrap();
        assert_eq!(inv.status, InvoiceStatus::Paid);

        apply_payment(&calc, &mut inv, dec("0")).unwrap();
        assert_eq!(inv.status, InvoiceStatus::Unpaid);
        assert_eq!(inv.amount_paid, Decimal::ZERO);
    }

    #[test]
    fn payment_rederives_overdue_invoices() {
        let calc = Calculator::default();
        let mut inv = invoice(InvoiceStatus::Overdue, "1000", "0");
        apply_payment(&calc, &mut inv, dec("1000")).unwrap();
        assert_eq!(inv.status, InvoiceStatus::Paid);
    }

    #[test]
    fn payment_on_draft_is_rejected() {
        let calc = Calculator::default();
        let mut inv = invoice(InvoiceStatus::Draft, "1000", "0");

        let err = apply_payment(&calc, &mut inv, dec("100")).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        assert_eq!(inv.amount_paid, Decimal::ZERO);
        assert_eq!(inv.status, InvoiceStatus::Draft);
    }

    #[test]
    fn negative_payment_follows_amount_policy() {
        let mut inv = invoice(InvoiceStatus::PartiallyPaid, "1000", "400");
        apply_payment(&Calculator::default(), &mut inv, dec("-10")).unwrap();
        assert_eq!(inv.status, InvoiceStatus::Unpaid);

        let strict = Calculator::new(VatRate::default(), AmountPolicy::Reject);
        let mut inv = invoice(InvoiceStatus::PartiallyPaid, "1000", "400");
        assert!(apply_payment(&strict, &mut inv, dec("-10")).is_err());
        assert_eq!(inv.amount_paid, dec("400"));
    }
}
