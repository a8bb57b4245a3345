pub mod auth;
pub mod calculator;
pub mod customer_service;
pub mod dashboard_service;
pub mod document_service;
pub mod expense_service;
pub mod invoice_service;
pub mod profile_service;
pub mod reporting;
pub mod status;

pub use auth::AuthService;
pub use calculator::Calculator;
pub use customer_service::CustomerService;
pub use dashboard_service::DashboardService;
pub use document_service::DocumentService;
pub use expense_service::ExpenseService;
pub use invoice_service::InvoiceService;
pub use profile_service::ProfileService;
