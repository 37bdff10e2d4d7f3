pub mod connection;
pub mod error;
#[cfg(test)]
pub mod memory_store;
pub mod models;
pub mod pg_store;
pub mod schema;
pub mod store;
