//! Folio event bus.
//!
//! Revision lifecycle notifications (recorded, restored, restore failed) are
//! published on an in-process [`EventBus`] backed by
//! `tokio::sync::broadcast`. [`AuditLog`] is the built-in subscriber.

pub mod audit;
pub mod bus;

pub use audit::AuditLog;
pub use bus::{ContentEvent, EventBus};
