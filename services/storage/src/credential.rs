use std::fmt::{Debug, Formatter};

use azsign_core::hash::{base64_decode, base64_hmac_sha256};
use azsign_core::time::DateTime;
use azsign_core::utils::Redact;
use azsign_core::{Error, Result};

use crate::connection_string;

/// Credential for Shared Key authorization: the storage account name and
/// its Base64-encoded master key.
///
/// Immutable after construction. Held for the lifetime of a client and
/// used to sign many requests and SAS tokens.
#[derive(Clone)]
pub struct SharedKeyCredential {
    account_name: String,
    account_key: String,
}

impl SharedKeyCredential {
    /// Create a new credential from an account name and Base64-encoded key.
    pub fn new(account_name: impl Into<String>, account_key: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
            account_key: account_key.into(),
        }
    }

    /// Create a credential from an [Azure connection string][1].
    ///
    /// Requires `AccountName` and `AccountKey` fields.
    ///
    /// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
    pub fn from_connection_string(conn_str: &str) -> Result<Self> {
        connection_string::parse(conn_str)
    }

    /// The storage account name.
    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// Sign a string-to-sign: Base64-decode the account key, HMAC-SHA256
    /// the UTF-8 input, Base64-encode the result.
    pub fn sign(&self, string_to_sign: &str) -> Result<String> {
        let key = base64_decode(&self.account_key)
            .map_err(|e| Error::credential_invalid("account key is not valid base64").with_source(e))?;
        Ok(base64_hmac_sha256(&key, string_to_sign.as_bytes()))
    }
}

impl Debug for SharedKeyCredential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKeyCredential")
            .field("account_name", &self.account_name)
            .field("account_key", &Redact::from(&self.account_key))
            .finish()
    }
}

/// A user delegation key, obtained from the service with an Azure AD
/// token, used to sign blob SAS tokens instead of the account key.
#[derive(Clone)]
pub struct UserDelegationKey {
    /// Object id of the AAD principal the key was issued to (`skoid`).
    pub signed_oid: String,
    /// Tenant id of the AAD principal (`sktid`).
    pub signed_tid: String,
    /// Start of the key's validity window (`skt`).
    pub signed_start: DateTime,
    /// End of the key's validity window (`ske`).
    pub signed_expiry: DateTime,
    /// Service the key is valid for (`sks`).
    pub signed_service: String,
    /// Service version the key was requested with (`skv`).
    pub signed_version: String,
    /// The Base64-encoded key value itself. Never logged.
    pub value: String,
}

impl UserDelegationKey {
    /// Sign a string-to-sign with the delegation key value.
    pub fn sign(&self, string_to_sign: &str) -> Result<String> {
        let key = base64_decode(&self.value).map_err(|e| {
            Error::credential_invalid("user delegation key is not valid base64").with_source(e)
        })?;
        Ok(base64_hmac_sha256(&key, string_to_sign.as_bytes()))
    }
}

impl Debug for UserDelegationKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDelegationKey")
            .field("signed_oid", &self.signed_oid)
            .field("signed_tid", &self.signed_tid)
            .field("signed_start", &self.signed_start)
            .field("signed_expiry", &self.signed_expiry)
            .field("signed_service", &self.signed_service)
            .field("signed_version", &self.signed_version)
            .field("value", &Redact::from(&self.value))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azsign_core::hash::base64_encode;

    #[test]
    fn test_sign_is_deterministic() {
        let cred = SharedKeyCredential::new("account", base64_encode(b"key"));
        let a = cred.sign("payload").unwrap();
        let b = cred.sign("payload").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sign_rejects_malformed_key() {
        let cred = SharedKeyCredential::new("account", "!!not base64!!");
        assert!(cred.sign("payload").is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let cred = SharedKeyCredential::new("account", "a-very-long-account-key");
        let repr = format!("{cred:?}");
        assert!(repr.contains("account"));
        assert!(!repr.contains("a-very-long-account-key"));
    }
}
