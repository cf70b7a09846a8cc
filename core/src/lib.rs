//! Core components for signing Azure Storage requests.
//!
//! This crate provides the service-independent substrate used by the
//! signing crates in this workspace:
//!
//! - [`Error`] and [`Result`]: the shared error type, distinguishing
//!   invalid arguments from fatal credential/configuration failures.
//! - [`hash`]: Base64 and HMAC-SHA256 primitives.
//! - [`time`]: the timestamp formats Azure Storage signs over.
//! - [`SigningRequest`]: a deconstructed HTTP request with the
//!   canonicalization helpers signers need.
//!
//! Everything here is a pure, synchronous computation over its inputs;
//! no network I/O and no ambient state.

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};
mod request;
pub use request::SigningRequest;
