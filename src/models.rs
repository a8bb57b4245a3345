pub mod auth;
pub mod customer;
pub mod dashboard;
pub mod expense;
pub mod invoice;
pub mod profile;
