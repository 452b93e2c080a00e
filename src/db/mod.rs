//! Credential store: the user-record trait and its PostgreSQL and in-memory backends.

mod memory;
mod pool;
mod users;

pub use memory::MemoryUserStore;
pub use pool::{create_pool, migrate, DbPool};
pub use users::{PgUserStore, StoreError, UserRecord, UserStore};
