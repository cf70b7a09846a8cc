use log::debug;

use azsign_core::time::{format_rfc3339_zulu, DateTime};
use azsign_core::{Error, Result};

use crate::constants::SAS_VERSION;
use crate::credential::{SharedKeyCredential, UserDelegationKey};
use crate::sas::{SasIpRange, SasProtocol, SasQueryParameters};

/// The canonical resource name a blob service SAS signs over:
/// `/blob/{account}/{container}` or `/blob/{account}/{container}/{blob}`.
pub fn blob_canonical_name(account_name: &str, container_name: &str, blob_name: Option<&str>) -> String {
    match blob_name {
        Some(blob_name) => format!("/blob/{account_name}/{container_name}/{blob_name}"),
        None => format!("/blob/{account_name}/{container_name}"),
    }
}

/// The signed fields of a blob service SAS, scoped to one container or
/// one blob.
///
/// Either `identifier` (a stored access policy carrying the grant) or
/// both `expiry_time` and `permissions` must be set.
#[derive(Debug, Clone)]
pub struct BlobSasValues {
    /// Service version to sign with (`sv`).
    pub version: String,
    /// Allowed protocols (`spr`).
    pub protocol: Option<SasProtocol>,
    /// Start of the validity window (`st`).
    pub start_time: Option<DateTime>,
    /// End of the validity window (`se`).
    pub expiry_time: Option<DateTime>,
    /// Encoded permissions (`sp`); build with
    /// [`super::BlobSasPermissions`] or [`super::ContainerSasPermissions`].
    pub permissions: Option<String>,
    /// Canonical resource name, from [`blob_canonical_name`].
    pub canonical_name: Option<String>,
    /// Resource type code (`sr`): `"b"` for a blob, `"c"` for a
    /// container, `"bs"` for a blob snapshot.
    pub resource: Option<String>,
    /// Snapshot timestamp when `resource` is `"bs"`.
    pub snapshot_id: Option<String>,
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

impl Default for BlobSasValues {
    fn default() -> Self {
        BlobSasValues {
            version: SAS_VERSION.to_string(),
            protocol: None,
            start_time: None,
            expiry_time: None,
            permissions: None,
            canonical_name: None,
            resource: None,
            snapshot_id: None,
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

impl BlobSasValues {
    /// Sign the values with the account key and produce the query
    /// parameters of the finished token.
    pub fn generate(&self, credential: &SharedKeyCredential) -> Result<SasQueryParameters> {
        self.validate()?;

        let string_to_sign = self.string_to_sign();
        debug!("blob sas string to sign: {:?}", &string_to_sign);
        let signature = credential.sign(&string_to_sign)?;

        Ok(self.query_parameters(signature))
    }

    /// Sign the values with a user delegation key instead of the account
    /// key. Stored access policies cannot carry a delegation grant, so
    /// `identifier` must be unset.
    pub fn generate_with_user_delegation_key(
        &self,
        delegation_key: &UserDelegationKey,
    ) -> Result<SasQueryParameters> {
        if self.identifier.is_some() {
            return Err(Error::request_invalid(
                "identifier cannot be combined with a user delegation key",
            ));
        }
        self.validate()?;

        let string_to_sign = self.delegation_string_to_sign(delegation_key);
        debug!("blob delegation sas string to sign: {:?}", &string_to_sign);
        let signature = delegation_key.sign(&string_to_sign)?;

        let mut params = self.query_parameters(signature);
        params.signed_oid = Some(delegation_key.signed_oid.clone());
        params.signed_tid = Some(delegation_key.signed_tid.clone());
        params.signed_start = Some(delegation_key.signed_start);
        params.signed_expiry = Some(delegation_key.signed_expiry);
        params.signed_service = Some(delegation_key.signed_service.clone());
        params.signed_version = Some(delegation_key.signed_version.clone());
        Ok(params)
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
        // A stored access policy may carry the expiry and permissions.
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
            self.resource.clone().unwrap_or_default(),
            self.snapshot_id.clone().unwrap_or_default(),
            self.cache_control.clone().unwrap_or_default(),
            self.content_disposition.clone().unwrap_or_default(),
            self.content_encoding.clone().unwrap_or_default(),
            self.content_language.clone().unwrap_or_default(),
            self.content_type.clone().unwrap_or_default(),
        ]
        .join("\n")
    }

    // The delegation variant replaces the identifier slot with the six
    // signed key fields.
    fn delegation_string_to_sign(&self, key: &UserDelegationKey) -> String {
        [
            self.permissions.clone().unwrap_or_default(),
            self.start_time.map(format_rfc3339_zulu).unwrap_or_default(),
            self.expiry_time.map(format_rfc3339_zulu).unwrap_or_default(),
            self.canonical_name.clone().unwrap_or_default(),
            key.signed_oid.clone(),
            key.signed_tid.clone(),
            format_rfc3339_zulu(key.signed_start),
            format_rfc3339_zulu(key.signed_expiry),
            key.signed_service.clone(),
            key.signed_version.clone(),
            self.ip_range
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            self.protocol.map(|v| v.to_string()).unwrap_or_default(),
            self.version.clone(),
            self.resource.clone().unwrap_or_default(),
            self.snapshot_id.clone().unwrap_or_default(),
            self.cache_control.clone().unwrap_or_default(),
            self.content_disposition.clone().unwrap_or_default(),
            self.content_encoding.clone().unwrap_or_default(),
            self.content_language.clone().unwrap_or_default(),
            self.content_type.clone().unwrap_or_default(),
        ]
        .join("\n")
    }

    fn query_parameters(&self, signature: String) -> SasQueryParameters {
        SasQueryParameters {
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
        }
    }
}

fn missing(field: &str) -> Error {
    Error::request_invalid(format!("blob SAS field {field} is required"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use azsign_core::hash::base64_encode;
    use azsign_core::time::parse_rfc3339;
    use pretty_assertions::assert_eq;

    fn credential() -> SharedKeyCredential {
        SharedKeyCredential::new("account", base64_encode(b"key"))
    }

    fn delegation_key() -> UserDelegationKey {
        UserDelegationKey {
            signed_oid: "11111111-1111-1111-1111-111111111111".to_string(),
            signed_tid: "22222222-2222-2222-2222-222222222222".to_string(),
            signed_start: parse_rfc3339("2022-03-01T08:12:34Z").unwrap(),
            signed_expiry: parse_rfc3339("2022-03-02T08:12:34Z").unwrap(),
            signed_service: "b".to_string(),
            signed_version: "2018-11-09".to_string(),
            value: "ZGVsZWdhdGlvbmtleQ==".to_string(),
        }
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(
            blob_canonical_name("account", "container", Some("dir/blob.txt")),
            "/blob/account/container/dir/blob.txt"
        );
        assert_eq!(
            blob_canonical_name("account", "container", None),
            "/blob/account/container"
        );
    }

    #[test]
    fn test_snapshot_string_to_sign() {
        let values = BlobSasValues {
            expiry_time: Some(parse_rfc3339("2017-01-01T00:00:00Z").unwrap()),
            permissions: Some("r".to_string()),
            canonical_name: Some("containerName/blobName".to_string()),
            resource: Some("bs".to_string()),
            ..Default::default()
        };

        assert_eq!(
            values.string_to_sign(),
            "r\n\n2017-01-01T00:00:00Z\ncontainerName/blobName\n\n\n\n2018-11-09\nbs\n\n\n\n\n\n"
        );
        assert_eq!(
            values.generate(&credential()).unwrap().signature.as_deref(),
            Some("lzFMkrSijmREe5wjFH28V4Q7nBUD58Mo7Hv38pYgK5s=")
        );
    }

    #[test]
    fn test_generate_container_all_fields() {
        let values = BlobSasValues {
            protocol: Some(SasProtocol::Https),
            start_time: Some(parse_rfc3339("2022-03-01T08:12:34Z").unwrap()),
            expiry_time: Some(parse_rfc3339("2022-03-01T08:17:34Z").unwrap()),
            permissions: Some("racwd".to_string()),
            canonical_name: Some(blob_canonical_name("account", "container", None)),
            resource: Some("c".to_string()),
            ip_range: Some(SasIpRange::parse("168.1.5.60-168.1.5.70")),
            cache_control: Some("cache".to_string()),
            content_disposition: Some("disposition".to_string()),
            content_encoding: Some("encoding".to_string()),
            content_language: Some("language".to_string()),
            content_type: Some("type".to_string()),
            ..Default::default()
        };

        assert_eq!(
            values.string_to_sign(),
            "racwd\n2022-03-01T08:12:34Z\n2022-03-01T08:17:34Z\n/blob/account/container\n\
             \n168.1.5.60-168.1.5.70\nhttps\n2018-11-09\nc\n\
             \ncache\ndisposition\nencoding\nlanguage\ntype"
        );

        let params = values.generate(&credential()).unwrap();
        assert_eq!(
            params.signature.as_deref(),
            Some("iiy8vW2aW0fd79j+PqrWFPYT8OB1Mzqxfhf6lWgNCUs=")
        );
        assert_eq!(
            params.encode(),
            "sv=2018-11-09&spr=https&st=2022-03-01T08%3A12%3A34Z&se=2022-03-01T08%3A17%3A34Z\
             &sip=168.1.5.60-168.1.5.70&sr=c&sp=racwd\
             &sig=iiy8vW2aW0fd79j%2BPqrWFPYT8OB1Mzqxfhf6lWgNCUs%3D\
             &rscc=cache&rscd=disposition&rsce=encoding&rscl=language&rsct=type"
        );
    }

    #[test]
    fn test_generate_with_user_delegation_key() {
        let values = BlobSasValues {
            expiry_time: Some(parse_rfc3339("2022-03-01T08:17:34Z").unwrap()),
            permissions: Some("r".to_string()),
            canonical_name: Some(blob_canonical_name(
                "account",
                "container",
                Some("blob.txt"),
            )),
            resource: Some("b".to_string()),
            ..Default::default()
        };

        let params = values
            .generate_with_user_delegation_key(&delegation_key())
            .unwrap();
        assert_eq!(
            params.signature.as_deref(),
            Some("/1SgyAe0bVChQstESKq0q9Ezu5bUIFxJ5hJP3SHuhYo=")
        );
        assert_eq!(
            params.signed_oid.as_deref(),
            Some("11111111-1111-1111-1111-111111111111")
        );
        assert_eq!(params.signed_service.as_deref(), Some("b"));
    }

    #[test]
    fn test_delegation_rejects_identifier() {
        let values = BlobSasValues {
            identifier: Some("policy".to_string()),
            canonical_name: Some("/blob/account/container".to_string()),
            resource: Some("c".to_string()),
            ..Default::default()
        };

        let err = values
            .generate_with_user_delegation_key(&delegation_key())
            .unwrap_err();
        assert!(err.to_string().contains("identifier"));
    }

    #[test]
    fn test_identifier_stands_in_for_expiry_and_permissions() {
        let values = BlobSasValues {
            identifier: Some("policy".to_string()),
            canonical_name: Some("/blob/account/container".to_string()),
            resource: Some("c".to_string()),
            ..Default::default()
        };

        let params = values.generate(&credential()).unwrap();
        assert_eq!(params.identifier.as_deref(), Some("policy"));
        assert!(params.expiry_time.is_none());
    }

    #[test]
    fn test_generate_requires_fields() {
        let base = BlobSasValues {
            expiry_time: Some(parse_rfc3339("2022-03-01T08:17:34Z").unwrap()),
            permissions: Some("r".to_string()),
            canonical_name: Some("/blob/account/container".to_string()),
            resource: Some("c".to_string()),
            ..Default::default()
        };

        for strip in [
            "version",
            "canonical_name",
            "resource",
            "expiry_time",
            "permissions",
        ] {
            let mut v = base.clone();
            match strip {
                "version" => v.version = String::new(),
                "canonical_name" => v.canonical_name = None,
                "resource" => v.resource = None,
                "expiry_time" => v.expiry_time = None,
                _ => v.permissions = None,
            }
            let err = v.generate(&credential()).unwrap_err();
            assert!(err.to_string().contains(strip), "{err}");
        }
    }
}
