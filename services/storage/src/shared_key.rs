use std::collections::BTreeMap;
use std::fmt::Write;

use http::header;
use http::header::HeaderName;
use http::HeaderValue;
use log::debug;
use percent_encoding::percent_encode;

use azsign_core::time::{format_http_date, now, DateTime};
use azsign_core::{Result, SigningRequest};

use crate::constants::{AZURE_QUERY_ENCODE_SET, X_MS_DATE};
use crate::SharedKeyCredential;

/// Signer that implements Azure Storage Shared Key authorization.
///
/// - [Authorize with Shared Key](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
#[derive(Debug, Default)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign the request: insert `x-ms-date` and the computed
    /// `Authorization: SharedKey {account}:{signature}` header.
    pub fn sign(&self, parts: &mut http::request::Parts, cred: &SharedKeyCredential) -> Result<()> {
        let mut ctx = SigningRequest::build(parts)?;
        let authorization = self.build(&mut ctx, cred)?;

        ctx.headers.insert(header::AUTHORIZATION, {
            let mut value: HeaderValue = authorization.parse()?;
            value.set_sensitive(true);
            value
        });

        self.apply(ctx, parts)
    }

    /// Compute the `Authorization` header value for the request without
    /// attaching it.
    ///
    /// `x-ms-date` is still inserted into the request, since it is part
    /// of the signed material.
    pub fn authorization(
        &self,
        parts: &mut http::request::Parts,
        cred: &SharedKeyCredential,
    ) -> Result<String> {
        let mut ctx = SigningRequest::build(parts)?;
        let authorization = self.build(&mut ctx, cred)?;
        self.apply(ctx, parts)?;

        Ok(authorization)
    }

    fn build(&self, ctx: &mut SigningRequest, cred: &SharedKeyCredential) -> Result<String> {
        ctx.headers.insert(
            X_MS_DATE,
            format_http_date(self.time.unwrap_or_else(now)).parse()?,
        );

        let string_to_sign = string_to_sign(ctx, cred.account_name())?;
        let signature = cred.sign(&string_to_sign)?;

        Ok(format!("SharedKey {}:{signature}", cred.account_name()))
    }

    fn apply(&self, mut ctx: SigningRequest, parts: &mut http::request::Parts) -> Result<()> {
        // Query values were percent-decoded on build.
        for (_, v) in ctx.query.iter_mut() {
            *v = percent_encode(v.as_bytes(), &AZURE_QUERY_ENCODE_SET).to_string();
        }
        ctx.apply(parts)
    }
}

/// Construct string to sign.
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-Encoding + "\n" +
/// Content-Language + "\n" +
/// Content-Length + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// If-Modified-Since + "\n" +
/// If-Match + "\n" +
/// If-None-Match + "\n" +
/// If-Unmodified-Since + "\n" +
/// Range + "\n" +
/// CanonicalizedHeaders + "\n" +
/// CanonicalizedResource;
/// ```
///
/// A `Content-Length` of `"0"` is signed as the empty string, and the
/// `Date` line is empty whenever an `x-ms-date` header is present.
///
/// ## Reference
///
/// - [Blob, Queue, and File Services (Shared Key authorization)](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
fn string_to_sign(ctx: &SigningRequest, account_name: &str) -> Result<String> {
    const CONTENT_MD5: HeaderName = HeaderName::from_static("content-md5");

    let mut s = String::with_capacity(128);

    writeln!(&mut s, "{}", ctx.method.as_str())?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_ENCODING)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_LANGUAGE)?)?;
    writeln!(
        &mut s,
        "{}",
        ctx.header_get_or_default(&header::CONTENT_LENGTH)
            .map(|v| if v == "0" { "" } else { v })?
    )?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&CONTENT_MD5)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_TYPE)?)?;
    writeln!(&mut s, "{}", {
        if ctx.headers.contains_key(X_MS_DATE) {
            ""
        } else {
            ctx.header_get_or_default(&header::DATE)?
        }
    })?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_MODIFIED_SINCE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_MATCH)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_NONE_MATCH)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_UNMODIFIED_SINCE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::RANGE)?)?;
    writeln!(&mut s, "{}", canonicalize_headers(ctx)?)?;
    write!(&mut s, "{}", canonicalize_resource(ctx, account_name))?;

    debug!("string to sign: {}", &s);

    Ok(s)
}

/// ## Reference
///
/// - [Constructing the canonicalized headers string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-headers-string)
fn canonicalize_headers(ctx: &SigningRequest) -> Result<String> {
    Ok(SigningRequest::header_to_string(
        ctx.header_to_vec_with_prefix("x-ms-")?,
        ":",
        "\n",
    ))
}

/// `/{account}{path}` followed by one line per query parameter name:
/// names lowercased and sorted, each parameter's values sorted and
/// comma-joined.
///
/// ## Reference
///
/// - [Constructing the canonicalized resource string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-resource-string)
fn canonicalize_resource(ctx: &SigningRequest, account_name: &str) -> String {
    let path = if ctx.path.is_empty() { "/" } else { &ctx.path };
    let mut s = format!("/{account_name}{path}");

    let mut grouped: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for (k, v) in &ctx.query {
        grouped.entry(k.to_lowercase()).or_default().push(v);
    }

    for (name, mut values) in grouped {
        values.sort_unstable();
        s.push('\n');
        s.push_str(&name);
        s.push(':');
        s.push_str(&values.join(","));
    }

    s
}
