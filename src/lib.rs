//! Library for the `tpkm` executable: the thin command layer that
//! turns parsed CLI verbs into client-core calls.
#![deny(missing_docs)]
#![forbid(unsafe_code)]

pub mod commands;
mod error;

pub use error::{Error, Result};
