//! Durable-tier store implementations

mod factory;
mod in_memory;
mod postgres;

pub use factory::{DurableBackend, DurableSettings, DurableStoreFactory};
pub use in_memory::InMemoryDurableStore;
pub use postgres::{PostgresConfig, PostgresDurableStore};
