pub(crate) mod rows;
pub mod schema;
pub mod store;
pub(crate) mod store_internal;

pub use schema::RUNS_SCHEMA;
pub use store::{InsertOutcome, Store};
