pub mod memory_store;
pub mod sqlite_store;
