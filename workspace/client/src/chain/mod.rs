//! Everything touching the registry contract (`§4.5`): generated
//! bindings, the read-only/signing clients, and revert translation.
pub mod abi;
mod client;
pub mod translate;

pub use client::{ReadOnlyClient, SigningClient};
