//! Service layer: record CRUD on top of a remote table store.
//! - `store` is the seam to the hosted database (PostgREST or in-memory).
//! - `records` maps record kinds onto table calls, one call per operation.

pub mod errors;
pub mod store;
pub mod records;

pub use records::RecordService;
pub use store::{Filter, TableStore};
