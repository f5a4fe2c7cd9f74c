//! # Contracts
//!
//! Frozen interface contracts shared by every streamcast crate: the record
//! data model, the delivery client and sink traits, client configuration and
//! the unified error type.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Delivery Model
//! - A `RecordUnit` is handed to a `DeliveryClient`, which owns it from then on
//! - The client reports the outcome exactly once through a `CompletionCallback`
//! - Completion order is unspecified and may differ from submission order

mod client;
mod client_config;
mod error;
mod record;
mod sink;

pub use client::*;
pub use client_config::*;
pub use error::*;
pub use record::*;
pub use sink::*;
