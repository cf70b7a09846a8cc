//! Shared Key and Shared Access Signature (SAS) signing for Azure Storage.
//!
//! This crate covers the two ways a request against Azure Storage gets
//! authorized with account key material:
//!
//! - **Shared Key**: canonicalize the live request and attach an
//!   `Authorization: SharedKey {account}:{signature}` header
//!   ([`RequestSigner`]).
//! - **SAS tokens**: sign a set of signature values (permissions,
//!   validity window, resource identity, ...) into a query string that
//!   grants scoped, time-limited access ([`sas`]).
//!
//! All signing is pure and synchronous; transport, retries and
//! credential loading live elsewhere.
//!
//! # Example
//!
//! ```rust,no_run
//! use azsign_storage::{RequestSigner, SharedKeyCredential};
//!
//! let cred = SharedKeyCredential::new("account", "YWNjb3VudF9rZXkK");
//! let signer = RequestSigner::new();
//!
//! let mut parts = http::Request::get("https://account.blob.core.windows.net/container/blob")
//!     .body(())
//!     .unwrap()
//!     .into_parts()
//!     .0;
//! signer.sign(&mut parts, &cred).unwrap();
//! ```

mod constants;

mod connection_string;
mod credential;
pub use credential::{SharedKeyCredential, UserDelegationKey};

mod shared_key;
pub use shared_key::RequestSigner;

pub mod sas;

mod url;
pub use crate::url::{BlobUrlParts, FileUrlParts};
