//! DeliveryClient trait - asynchronous record delivery abstraction
//!
//! Decouples the dispatch coordinator from whatever actually transmits records.

use crate::{ContractError, DeliveryReceipt, RecordUnit};

/// Delivery outcome for one submitted record
pub type DeliveryResult = Result<DeliveryReceipt, ContractError>;

/// Completion callback type
///
/// Invoked exactly once per submitted record, from the client's own task,
/// with the record handed back and its outcome. `FnOnce` makes a second
/// invocation impossible.
pub type CompletionCallback = Box<dyn FnOnce(RecordUnit, DeliveryResult) + Send + 'static>;

/// Asynchronous delivery client
///
/// # Design Principles
///
/// 1. **Fire-and-forget submit**: `submit` returns once the record is accepted,
///    never after it is delivered. It may wait for queue space.
/// 2. **Out-of-band completion**: the outcome arrives through the callback, in
///    any order relative to submission.
///
/// # Example
///
/// ```ignore
/// client
///     .submit(unit, Box::new(|unit, result| {
///         println!("{} -> {:?}", unit.topic, result);
///     }))
///     .await?;
/// ```
#[trait_variant::make(DeliveryClient: Send)]
pub trait LocalDeliveryClient {
    /// Client name (used for logging)
    fn name(&self) -> &str;

    /// Hand a record to the client for delivery
    ///
    /// # Errors
    /// Returns an error if the client can no longer accept records. In that
    /// case the callback is dropped without being invoked.
    async fn submit(
        &self,
        unit: RecordUnit,
        on_complete: CompletionCallback,
    ) -> Result<(), ContractError>;
}
