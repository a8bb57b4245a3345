// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Profile ---
        handlers::profile::get_profile,
        handlers::profile::save_profile,

        // --- Customers ---
        handlers::customers::create_customer,
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,
        handlers::customers::get_customer_summary,

        // --- Invoices ---
        handlers::invoices::create_invoice,
        handlers::invoices::list_invoices,
        handlers::invoices::list_invoices_by_month,
        handlers::invoices::preview_totals,
        handlers::invoices::get_invoice,
        handlers::invoices::update_invoice,
        handlers::invoices::delete_invoice,
        handlers::invoices::finalize_invoice,
        handlers::invoices::record_payment,
        handlers::documents::generate_invoice_pdf,

        // --- Expenses ---
        handlers::expenses::create_expense,
        handlers::expenses::list_expenses,
        handlers::expenses::list_expenses_by_month,
        handlers::expenses::get_expense_summary,
        handlers::expenses::get_expense,
        handlers::expenses::update_expense,
        handlers::expenses::update_expense_status,
        handlers::expenses::delete_expense,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_revenue_by_customer,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::CurrentUser,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Profile ---
            models::profile::UserProfile,
            models::profile::ProfileInput,

            // --- Customers ---
            models::customer::Customer,
            models::customer::CustomerInput,
            models::customer::CustomerSummary,

            // --- Invoices ---
            models::invoice::InvoiceStatus,
            models::invoice::SaveMode,
            models::invoice::LineItem,
            models::invoice::Invoice,
            models::invoice::InvoiceView,
            models::invoice::InvoiceInput,
            models::invoice::CreateInvoicePayload,
            models::invoice::RecordPaymentPayload,
            models::invoice::PreviewTotalsPayload,
            models::invoice::InvoiceTab,
            models::invoice::InvoiceTabCounts,
            models::invoice::InvoiceListTotals,
            models::invoice::InvoiceList,
            services::calculator::InvoiceTotals,

            // --- Expenses ---
            models::expense::ExpenseCategory,
            models::expense::ExpenseStatus,
            models::expense::Expense,
            models::expense::ExpenseInput,
            models::expense::ExpenseUpdate,
            models::expense::ExpenseStatusPayload,
            models::expense::ExpenseStatusCounts,
            models::expense::ExpenseSummary,

            // --- Dashboard ---
            models::dashboard::ActivityKind,
            models::dashboard::RecentActivity,
            models::dashboard::DashboardSummary,
            models::dashboard::CustomerRevenue,
        )
    ),
    tags(
        (name = "Auth", description = "Sign up and sign in"),
        (name = "Users", description = "The signed-in user"),
        (name = "Profile", description = "Business profile printed on invoices"),
        (name = "Customers", description = "Customer records"),
        (name = "Invoices", description = "Invoices, payments and PDFs"),
        (name = "Expenses", description = "Expenses and input VAT"),
        (name = "Dashboard", description = "Revenue, VAT and outstanding balances")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/register",
            "/api/customers/{id}/summary",
            "/api/invoices/{id}/payment",
            "/api/invoices/{id}/pdf",
            "/api/expenses/{id}/status",
            "/api/dashboard/revenue-by-customer",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing from OpenAPI document");
        }
    }
}
