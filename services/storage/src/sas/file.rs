use log::debug;

use azsign_core::time::{format_rfc3339_zulu, DateTime};
use azsign_core::{Error, Result};

use crate::constants::SAS_VERSION;
use crate::credential::SharedKeyCredential;
use crate::sas::{SasIpRange, SasProtocol, SasQueryParameters};

/// The canonical resource name a file service SAS signs over:
/// `/file/{account}/{share}` or `/file/{account}/{share}/{path}`.
pub fn file_canonical_name(account_name: &str, share_name: &str, file_path: Option<&str>) -> String {
    match file_path {
        Some(file_path) => format!("/file/{account_name}/{share_name}/{file_path}"),
        None => format!("/file/{account_name}/{share_name}"),
    }
}

/// The signed fields of a file service SAS, scoped to one share or one
/// file.
///
/// Unlike the blob variant the resource code is not part of the signed
/// input, only of the emitted query parameters.
#[derive(Debug, Clone)]
pub struct FileSasValues {
    /// Service version to sign with (`sv`).
    pub version: String,
    /// Allowed protocols (`spr`).
    pub protocol: Option<SasProtocol>,
    /// Start of the validity window (`st`).
    pub start_time: Option<DateTime>,
    /// End of the validity window (`se`).
    pub expiry_time: Option<DateTime>,
    /// Encoded permissions (`sp`); build with
    /// [`super::FileSasPermissions`] or [`super::ShareSasPermissions`].
    pub permissions: Option<String>,
    /// Canonical resource name, from [`file_canonical_name`].
    pub canonical_name: Option<String>,
    /// Resource type code (`sr`): `"f"` for a file, `"s"` for a share.
    pub resource: Option<String>,
    /// Stored access policy reference (`si`).
    pub identifier: Option<String>,
    /// IP restriction (`sip`).
    pub ip_range: Option<SasIpRange>,
    /// Cache-Control response override (`rscc`).
    pub cache_control: Option<String>,
    /// Content-Disposition response override (`rscd`).
    pub content_disposition: Option<String>,
    /// Content-Encoding response override (`rsce`).
    pub content_encoding: Option<String>,
    /// Content-Language response override (`rscl`).
    pub content_language: Option<String>,
    /// Content-Type response override (`rsct`).
    pub content_type: Option<String>,
}

impl Default for FileSasValues {
    fn default() -> Self {
        FileSasValues {
            version: SAS_VERSION.to_string(),
            protocol: None,
            start_time: None,
            expiry_time: None,
            permissions: None,
            canonical_name: None,
            resource: None,
            identifier: None,
            ip_range: None,
            cache_control: None,
            content_disposition: None,
            content_encoding: None,
            content_language: None,
            content_type: None,
        }
    }
}

impl FileSasValues {
    /// Sign the values with the account key and produce the query
    /// parameters of the finished token.
    pub fn generate(&self, credential: &SharedKeyCredential) -> Result<SasQueryParameters> {
        self.validate()?;

        let string_to_sign = self.string_to_sign();
        debug!("file sas string to sign: {:?}", &string_to_sign);
        let signature = credential.sign(&string_to_sign)?;

        Ok(SasQueryParameters {
            version: Some(self.version.clone()),
            protocol: self.protocol,
            start_time: self.start_time,
            expiry_time: self.expiry_time,
            ip_range: self.ip_range.clone(),
            identifier: self.identifier.clone(),
            resource: self.resource.clone(),
            permissions: self.permissions.clone(),
            signature: Some(signature),
            cache_control: self.cache_control.clone(),
            content_disposition: self.content_disposition.clone(),
            content_encoding: self.content_encoding.clone(),
            content_language: self.content_language.clone(),
            content_type: self.content_type.clone(),
            ..Default::default()
        })
    }

    fn validate(&self) -> Result<()> {
        if self.version.is_empty() {
            return Err(missing("version"));
        }
        if self.canonical_name.is_none() {
            return Err(missing("canonical_name"));
        }
        if self.resource.is_none() {
            return Err(missing("resource"));
        }
        if self.identifier.is_none() {
            if self.expiry_time.is_none() {
                return Err(missing("expiry_time"));
            }
            if self.permissions.is_none() {
                return Err(missing("permissions"));
            }
        }
        Ok(())
    }

    fn string_to_sign(&self) -> String {
        [
            self.permissions.clone().unwrap_or_default(),
            self.start_time.map(format_rfc3339_zulu).unwrap_or_default(),
            self.expiry_time.map(format_rfc3339_zulu).unwrap_or_default(),
            self.canonical_name.clone().unwrap_or_default(),
            self.identifier.clone().unwrap_or_default(),
            self.ip_range
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            self.protocol.map(|v| v.to_string()).unwrap_or_default(),
            self.version.clone(),
            self.cache_control.clone().unwrap_or_default(),
            self.content_disposition.clone().unwrap_or_default(),
            self.content_encoding.clone().unwrap_or_default(),
            self.content_language.clone().unwrap_or_default(),
            self.content_type.clone().unwrap_or_default(),
        ]
        .join("\n")
    }
}

fn missing(field: &str) -> Error {
    Error::request_invalid(format!("file SAS field {field} is required"))
}
