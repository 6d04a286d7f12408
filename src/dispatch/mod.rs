//! Request dispatch.
//!
//! [`RequestExecutor`] sends one request; [`BatchExecutor`] sends a pool of
//! them through a single bridge round-trip and pairs each result back to its
//! request in order.

mod batch;
mod single;

pub use batch::BatchExecutor;
pub use single::RequestExecutor;
