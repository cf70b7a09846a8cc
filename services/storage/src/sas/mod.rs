//! Shared Access Signature (SAS) generation.
//!
//! A SAS token is a signed query string granting scoped, time-limited
//! access to a resource without sharing the account key. Callers fill a
//! signature-values struct, generate [`SasQueryParameters`] with a
//! credential, and append the encoded result to a URL:
//!
//! ```rust,no_run
//! use azsign_core::time::parse_rfc3339;
//! use azsign_storage::sas::{blob_canonical_name, BlobSasPermissions, BlobSasValues};
//! use azsign_storage::SharedKeyCredential;
//!
//! let cred = SharedKeyCredential::new("account", "YWNjb3VudF9rZXkK");
//! let values = BlobSasValues {
//!     expiry_time: Some(parse_rfc3339("2022-03-01T08:17:34Z").unwrap()),
//!     permissions: Some(BlobSasPermissions { read: true, ..Default::default() }.to_string()),
//!     canonical_name: Some(blob_canonical_name("account", "container", Some("blob.txt"))),
//!     resource: Some("b".to_string()),
//!     ..Default::default()
//! };
//! let token = values.generate(&cred).unwrap().encode();
//! ```

mod account;
pub use account::AccountSasValues;
mod blob;
pub use blob::{blob_canonical_name, BlobSasValues};
mod file;
pub use file::{file_canonical_name, FileSasValues};
mod ip_range;
pub use ip_range::SasIpRange;
mod permissions;
pub use permissions::{
    AccountSasPermissions, AccountSasResourceTypes, AccountSasServices, BlobSasPermissions,
    ContainerSasPermissions, FileSasPermissions, ShareSasPermissions,
};
mod protocol;
pub use protocol::SasProtocol;
mod query;
pub use query::SasQueryParameters;
