//! Record shapes for the `logs` and `tickets` collections.
//!
//! Both collections share one base shape. Each kind is described by a
//! [`record::RecordFields`] implementation so that the service and HTTP layers
//! can be written once and mounted per collection.

pub mod errors;
pub mod record;
pub mod log;
pub mod ticket;

pub use log::LogFields;
pub use record::{Collection, RecordFields, RecordId, StoredRecord};
pub use ticket::TicketFields;
