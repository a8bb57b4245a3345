pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod documents;
pub mod expenses;
pub mod invoices;
pub mod profile;
