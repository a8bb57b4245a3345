pub mod customer_repo;
pub mod expense_repo;
pub mod invoice_repo;
pub mod memory;
pub mod profile_repo;
pub mod store;
pub mod user_repo;

use std::sync::Arc;

use sqlx::PgPool;

pub use customer_repo::CustomerRepository;
pub use expense_repo::ExpenseRepository;
pub use invoice_repo::InvoiceRepository;
pub use memory::MemoryStore;
pub use profile_repo::ProfileRepository;
pub use store::{CustomerStore, ExpenseStore, InvoiceStore, NewExpense, NewInvoice, ProfileStore, UserStore};
pub use user_repo::UserRepository;

/// Every persistence collaborator the services are built from.
#[derive(Clone)]
pub struct Stores {
    pub customers: Arc<dyn CustomerStore>,
    pub invoices: Arc<dyn InvoiceStore>,
    pub expenses: Arc<dyn ExpenseStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            customers: Arc::new(CustomerRepository::new(pool.clone())),
            invoices: Arc::new(InvoiceRepository::new(pool.clone())),
            expenses: Arc::new(ExpenseRepository::new(pool.clone())),
            profiles: Arc::new(ProfileRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool)),
        }
    }

    /// All five collaborators backed by one shared in-memory store.
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::default());
        Self {
            customers: store.clone(),
            invoices: store.clone(),
            expenses: store.clone(),
            profiles: store.clone(),
            users: store,
        }
    }
}
