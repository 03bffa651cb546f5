//! Infrastructure layer: store backends, services, supervision

pub mod blob;
pub mod durable;
pub mod observability;
pub mod probe;
pub mod services;
pub mod supervisor;
pub mod transient;
