// src/services/reporting.rs
//
// Pure reductions over invoices and expenses. Every function recomputes from
// the collection it is given; nothing is cached between calls.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::customer::{Customer, CustomerSummary};
use crate::models::dashboard::{
    ActivityKind, CustomerRevenue, DashboardSummary, MonthGroup, RecentActivity,
};
use crate::models::expense::{Expense, ExpenseStatus, ExpenseStatusCounts, ExpenseSummary};
use crate::models::invoice::{Invoice, InvoiceListTotals, InvoiceStatus, InvoiceTab, InvoiceTabCounts};

pub const UNKNOWN_CUSTOMER: &str = "Unknown customer";
const RECENT_ACTIVITY_LIMIT: usize = 5;

/// A dated record with a lifecycle status.
pub trait Document {
    type Status: Copy + PartialEq;

    /// The date the record belongs to for reporting; `None` when unknown.
    fn business_date(&self) -> Option<NaiveDate>;
    fn status(&self) -> Self::Status;
}

impl Document for Invoice {
    type Status = InvoiceStatus;

    fn business_date(&self) -> Option<NaiveDate> {
        self.invoice_date
    }

    fn status(&self) -> InvoiceStatus {
        self.status
    }
}

impl Document for Expense {
    type Status = ExpenseStatus;

    fn business_date(&self) -> Option<NaiveDate> {
        self.expense_date
    }

    fn status(&self) -> ExpenseStatus {
        self.status
    }
}

pub fn total_revenue(invoices: &[Invoice]) -> Decimal {
    invoices.iter().map(|i| i.amount_paid).sum()
}

pub fn total_vat_collected(invoices: &[Invoice]) -> Decimal {
    invoices.iter().map(|i| i.vat_amount).sum()
}

/// VAT on approved expenses only.
pub fn total_vat_paid(expenses: &[Expense]) -> Decimal {
    expenses
        .iter()
        .filter(|e| e.status == ExpenseStatus::Approved)
        .map(|e| e.vat_amount)
        .sum()
}

/// Collected minus paid. A negative result is a reclaimable credit and is kept as is.
pub fn payable_vat(vat_collected: Decimal, vat_paid: Decimal) -> Decimal {
    vat_collected - vat_paid
}

pub fn total_outstanding(invoices: &[Invoice]) -> Decimal {
    invoices.iter().map(Invoice::outstanding).sum()
}

pub fn total_expenses(expenses: &[Expense]) -> Decimal {
    expenses.iter().map(|e| e.total_amount).sum()
}

pub fn profit(invoices: &[Invoice], expenses: &[Expense]) -> Decimal {
    total_revenue(invoices) - total_expenses(expenses)
}

pub fn count_by_status<D: Document>(documents: &[D], status: D::Status) -> usize {
    documents.iter().filter(|d| d.status() == status).count()
}

/// Buckets documents by `{Month Year}` of their business date, latest month
/// first. Undated documents are left out of every bucket.
pub fn group_by_month<D: Document + Clone>(documents: &[D]) -> Vec<MonthGroup<D>> {
    let mut buckets: BTreeMap<(i32, u32), (NaiveDate, Vec<D>)> = BTreeMap::new();

    for document in documents {
        let Some(date) = document.business_date() else {
            continue;
        };
        let bucket = buckets
            .entry((date.year(), date.month()))
            .or_insert_with(|| (date, Vec::new()));
        if date < bucket.0 {
            bucket.0 = date;
        }
        bucket.1.push(document.clone());
    }

    let mut groups: Vec<(NaiveDate, Vec<D>)> = buckets.into_values().collect();
    groups.sort_by(|a, b| b.0.cmp(&a.0));

    groups
        .into_iter()
        .map(|(earliest, items)| MonthGroup {
            label: earliest.format("%B %Y").to_string(),
            items,
        })
        .collect()
}

fn is_open(status: InvoiceStatus) -> bool {
    matches!(status, InvoiceStatus::Unpaid | InvoiceStatus::PartiallyPaid)
}

pub fn recent_activity(invoices: &[Invoice], expenses: &[Expense], limit: usize) -> Vec<RecentActivity> {
    let mut activity: Vec<RecentActivity> = invoices
        .iter()
        .map(|inv| RecentActivity {
            id: inv.id,
            kind: if inv.amount_paid > Decimal::ZERO {
                ActivityKind::Income
            } else {
                ActivityKind::Pending
            },
            description: format!("Invoice {}", inv.invoice_number),
            amount: inv.amount_paid,
            created_at: inv.created_at,
        })
        .chain(expenses.iter().map(|exp| RecentActivity {
            id: exp.id,
            kind: ActivityKind::Expense,
            description: if exp.description.trim().is_empty() {
                "Expense - Untitled".to_string()
            } else {
                format!("Expense - {}", exp.description)
            },
            amount: exp.total_amount,
            created_at: exp.created_at,
        }))
        .collect();

    activity.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    activity.truncate(limit);
    activity
}

pub fn dashboard_summary(invoices: &[Invoice], expenses: &[Expense]) -> DashboardSummary {
    let vat_collected = total_vat_collected(invoices);
    let vat_paid = total_vat_paid(expenses);

    DashboardSummary {
        total_revenue: total_revenue(invoices),
        vat_collected,
        vat_paid,
        payable_vat: payable_vat(vat_collected, vat_paid),
        total_outstanding: total_outstanding(invoices),
        paid_invoices: count_by_status(invoices, InvoiceStatus::Paid),
        unpaid_invoices: invoices.iter().filter(|i| is_open(i.status)).count(),
        total_expenses: total_expenses(expenses),
        approved_expenses: expenses
            .iter()
            .filter(|e| e.status == ExpenseStatus::Approved)
            .map(|e| e.total_amount)
            .sum(),
        pending_expenses: count_by_status(expenses, ExpenseStatus::Pending),
        profit: profit(invoices, expenses),
        recent_activity: recent_activity(invoices, expenses, RECENT_ACTIVITY_LIMIT),
    }
}

pub fn invoice_list_totals(invoices: &[Invoice]) -> InvoiceListTotals {
    InvoiceListTotals {
        received: total_revenue(invoices),
        outstanding: total_outstanding(invoices),
        invoiced: invoices.iter().map(|i| i.total_amount).sum(),
    }
}

pub fn invoice_tab_counts(invoices: &[Invoice]) -> InvoiceTabCounts {
    let count = |tab: InvoiceTab| invoices.iter().filter(|i| tab.matches(i.status)).count();
    InvoiceTabCounts {
        all: invoices.len(),
        draft: count(InvoiceTab::Draft),
        unpaid: count(InvoiceTab::Unpaid),
        paid: count(InvoiceTab::Paid),
    }
}

pub fn expense_summary(expenses: &[Expense]) -> ExpenseSummary {
    let approved = || expenses.iter().filter(|e| e.status == ExpenseStatus::Approved);

    ExpenseSummary {
        total_expenses: total_expenses(expenses),
        approved_amount: approved().map(|e| e.total_amount).sum(),
        approved_vat: approved().map(|e| e.vat_amount).sum(),
        pending_count: count_by_status(expenses, ExpenseStatus::Pending),
        counts: ExpenseStatusCounts {
            draft: count_by_status(expenses, ExpenseStatus::Draft),
            pending: count_by_status(expenses, ExpenseStatus::Pending),
            approved: count_by_status(expenses, ExpenseStatus::Approved),
            rejected: count_by_status(expenses, ExpenseStatus::Rejected),
        },
    }
}

/// Figures for one customer's detail view. Invoices of other customers are ignored.
pub fn customer_summary(customer_id: Uuid, invoices: &[Invoice]) -> CustomerSummary {
    let own: Vec<&Invoice> = invoices.iter().filter(|i| i.customer_id == customer_id).collect();

    let total_invoiced: Decimal = own.iter().map(|i| i.total_amount).sum();
    let total_paid: Decimal = own.iter().map(|i| i.amount_paid).sum();

    CustomerSummary {
        customer_id,
        invoice_count: own.len(),
        total_invoiced,
        total_paid,
        total_outstanding: total_invoiced - total_paid,
        paid_count: own.iter().filter(|i| i.status == InvoiceStatus::Paid).count(),
        unpaid_count: own.iter().filter(|i| is_open(i.status)).count(),
    }
}

/// Looks up a customer's display name. A dangling id is logged and reported
/// as the unknown customer rather than failing the caller.
pub fn customer_name(customers: &HashMap<Uuid, &Customer>, customer_id: Uuid) -> String {
    match customers.get(&customer_id) {
        Some(customer) => customer.name.clone(),
        None => {
            tracing::warn!("{}", AppError::DanglingReference(customer_id));
            UNKNOWN_CUSTOMER.to_string()
        }
    }
}

pub fn index_customers(customers: &[Customer]) -> HashMap<Uuid, &Customer> {
    customers.iter().map(|c| (c.id, c)).collect()
}

/// Invoiced and paid totals per customer, largest invoiced total first.
/// Invoices whose customer no longer exists are pooled under one unknown entry.
pub fn revenue_by_customer(invoices: &[Invoice], customers: &[Customer]) -> Vec<CustomerRevenue> {
    let index = index_customers(customers);
    let mut rows: HashMap<Option<Uuid>, CustomerRevenue> = HashMap::new();

    for invoice in invoices {
        let key = index.contains_key(&invoice.customer_id).then_some(invoice.customer_id);
        let row = rows.entry(key).or_insert_with(|| CustomerRevenue {
            customer_id: key,
            customer_name: customer_name(&index, invoice.customer_id),
            invoice_count: 0,
            total_invoiced: Decimal::ZERO,
            total_paid: Decimal::ZERO,
        });
        row.invoice_count += 1;
        row.total_invoiced += invoice.total_amount;
        row.total_paid += invoice.amount_paid;
    }

    let mut rows: Vec<CustomerRevenue> = rows.into_values().collect();
    rows.sort_by(|a, b| {
        b.total_invoiced
            .cmp(&a.total_invoiced)
            .then_with(|| a.customer_name.cmp(&b.customer_name))
    });
    rows
}
