pub mod error;
pub mod query;
pub mod store;
pub mod task;
