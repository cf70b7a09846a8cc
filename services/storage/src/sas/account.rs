use log::debug;

use azsign_core::time::{format_rfc3339_zulu, DateTime};
use azsign_core::{Error, Result};

use crate::constants::SAS_VERSION;
use crate::credential::SharedKeyCredential;
use crate::sas::{SasIpRange, SasProtocol, SasQueryParameters};

/// The signed fields of an account-level SAS, which grants access across
/// one or more services rather than to a single resource.
///
/// `permissions`, `services` and `resource_types` hold the already
/// encoded strings; build them with [`super::AccountSasPermissions`],
/// [`super::AccountSasServices`] and [`super::AccountSasResourceTypes`].
#[derive(Debug, Clone)]
pub struct AccountSasValues {
    /// Service version to sign with (`sv`).
    pub version: String,
    /// Allowed protocols (`spr`).
    pub protocol: Option<SasProtocol>,
    /// Start of the validity window (`st`).
    pub start_time: Option<DateTime>,
    /// End of the validity window (`se`), required.
    pub expiry_time: Option<DateTime>,
    /// Encoded permissions (`sp`), required.
    pub permissions: Option<String>,
    /// Encoded services (`ss`), required.
    pub services: Option<String>,
    /// Encoded resource types (`srt`), required.
    pub resource_types: Option<String>,
    /// IP restriction (`sip`).
    pub ip_range: Option<SasIpRange>,
}

impl Default for AccountSasValues {
    fn default() -> Self {
        AccountSasValues {
            version: SAS_VERSION.to_string(),
            protocol: None,
            start_time: None,
            expiry_time: None,
            permissions: None,
            services: None,
            resource_types: None,
            ip_range: None,
        }
    }
}

impl AccountSasValues {
    /// Sign the values with the account key and produce the query
    /// parameters of the finished token.
    pub fn generate(&self, credential: &SharedKeyCredential) -> Result<SasQueryParameters> {
        self.validate()?;

        let string_to_sign = self.string_to_sign(credential.account_name());
        debug!("account sas string to sign: {:?}", &string_to_sign);
        let signature = credential.sign(&string_to_sign)?;

        Ok(SasQueryParameters {
            version: Some(self.version.clone()),
            services: self.services.clone(),
            resource_types: self.resource_types.clone(),
            protocol: self.protocol,
            start_time: self.start_time,
            expiry_time: self.expiry_time,
            ip_range: self.ip_range.clone(),
            permissions: self.permissions.clone(),
            signature: Some(signature),
            ..Default::default()
        })
    }

    fn validate(&self) -> Result<()> {
        if self.version.is_empty() {
            return Err(missing("version"));
        }
        if self.expiry_time.is_none() {
            return Err(missing("expiry_time"));
        }
        if self.permissions.is_none() {
            return Err(missing("permissions"));
        }
        if self.services.is_none() {
            return Err(missing("services"));
        }
        if self.resource_types.is_none() {
            return Err(missing("resource_types"));
        }
        Ok(())
    }

    // The account SAS input ends with a trailing newline, unlike the
    // service SAS variants.
    fn string_to_sign(&self, account_name: &str) -> String {
        let mut fields = vec![
            account_name.to_string(),
            self.permissions.clone().unwrap_or_default(),
            self.services.clone().unwrap_or_default(),
            self.resource_types.clone().unwrap_or_default(),
            self.start_time.map(format_rfc3339_zulu).unwrap_or_default(),
            self.expiry_time.map(format_rfc3339_zulu).unwrap_or_default(),
            self.ip_range
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            self.protocol.map(|v| v.to_string()).unwrap_or_default(),
            self.version.clone(),
        ];
        fields.push(String::new());
        fields.join("\n")
    }
}

fn missing(field: &str) -> Error {
    Error::request_invalid(format!("account SAS field {field} is required"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use azsign_core::hash::base64_encode;
    use azsign_core::time::parse_rfc3339;
    use pretty_assertions::assert_eq;

    use crate::sas::{AccountSasPermissions, AccountSasResourceTypes, AccountSasServices};

    fn credential() -> SharedKeyCredential {
        SharedKeyCredential::new("account", base64_encode(b"key"))
    }

    fn values() -> AccountSasValues {
        AccountSasValues {
            expiry_time: Some(parse_rfc3339("2022-03-01T08:17:34Z").unwrap()),
            permissions: Some(
                AccountSasPermissions {
                    read: true,
                    write: true,
                    delete: true,
                    list: true,
                    add: true,
                    create: true,
                    update: true,
                    process_messages: false,
                }
                .to_string(),
            ),
            services: Some(
                AccountSasServices {
                    blob: true,
                    queue: true,
                    table: true,
                    file: true,
                }
                .to_string(),
            ),
            resource_types: Some(
                AccountSasResourceTypes {
                    service: true,
                    container: true,
                    object: true,
                }
                .to_string(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_string_to_sign() {
        assert_eq!(
            values().string_to_sign("account"),
            "account\nrwdlacu\nbqtf\nsco\n\n2022-03-01T08:17:34Z\n\n\n2018-11-09\n"
        );
    }

    #[test]
    fn test_generate() {
        let params = values().generate(&credential()).unwrap();

        assert_eq!(
            params.signature.as_deref(),
            Some("jgK9nDUT0ntH/p28LPs0jzwxsk91W6hePLPlfrElv4k=")
        );
        assert_eq!(
            params.encode(),
            "sv=2018-11-09&ss=bqtf&srt=sco&se=2022-03-01T08%3A17%3A34Z&sp=rwdlacu\
             &sig=jgK9nDUT0ntH%2Fp28LPs0jzwxsk91W6hePLPlfrElv4k%3D"
        );
    }

    #[test]
    fn test_generate_requires_fields() {
        for strip in [
            "version",
            "expiry_time",
            "permissions",
            "services",
            "resource_types",
        ] {
            let mut v = values();
            match strip {
                "version" => v.version = String::new(),
                "expiry_time" => v.expiry_time = None,
                "permissions" => v.permissions = None,
                "services" => v.services = None,
                _ => v.resource_types = None,
            }
            let err = v.generate(&credential()).unwrap_err();
            assert!(err.to_string().contains(strip), "{err}");
        }
    }
}
