//! Command implementations.

mod produce;
mod validate;

pub use produce::run_produce;
pub use validate::run_validate;
