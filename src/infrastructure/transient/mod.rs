//! Transient-tier store implementations

mod factory;
mod in_memory;
mod redis;

pub use factory::{TransientBackend, TransientSettings, TransientStoreFactory};
pub use in_memory::InMemoryTransientStore;
pub use redis::{RedisTransientConfig, RedisTransientStore};
