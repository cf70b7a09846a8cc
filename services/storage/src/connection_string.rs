use azsign_core::{Error, Result};

use crate::SharedKeyCredential;

/// Parses an [Azure connection string][1] into a Shared Key credential.
///
/// Endpoint and SAS fields are ignored here: this crate only signs, so
/// the credential is all it needs.
///
/// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
pub(crate) fn parse(conn_str: &str) -> Result<SharedKeyCredential> {
    let mut account_name = None;
    let mut account_key = None;

    for field in conn_str
        .trim()
        .replace('\n', "")
        .split(';')
        .filter(|field| !field.is_empty())
    {
        // Split on the first '=' only: AccountKey values are Base64 and
        // may end with '=' padding.
        let (key, value) = field.trim().split_once('=').ok_or_else(|| {
            Error::config_invalid(format!(
                "invalid connection string, expected '=' in field: {field}"
            ))
        })?;

        match key {
            "AccountName" => account_name = Some(value.to_string()),
            "AccountKey" => account_key = Some(value.to_string()),
            _ => {}
        }
    }

    let account_name = account_name
        .ok_or_else(|| Error::config_invalid("connection string is missing AccountName"))?;
    let account_key = account_key
        .ok_or_else(|| Error::config_invalid("connection string is missing AccountKey"))?;

    Ok(SharedKeyCredential::new(account_name, account_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_connection_string() {
        let cred = parse(
            "DefaultEndpointsProtocol=https;AccountName=testaccount;\
             AccountKey=dGVzdGtleQ==;EndpointSuffix=core.windows.net",
        )
        .unwrap();

        assert_eq!(cred.account_name(), "testaccount");
        // The key survives intact, '=' padding included.
        assert!(cred.sign("x").is_ok());
    }

    #[test]
    fn test_parse_requires_account_fields() {
        assert!(parse("DefaultEndpointsProtocol=https").is_err());
        assert!(parse("AccountName=testaccount").is_err());
    }

    #[test]
    fn test_parse_rejects_field_without_separator() {
        assert!(parse("AccountName").is_err());
    }
}
