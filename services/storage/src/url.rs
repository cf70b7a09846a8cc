use std::fmt::Write;

use http::Uri;
use percent_encoding::percent_encode;

use azsign_core::{Error, Result};

use crate::constants::SAS_ENCODE_SET;
use crate::sas::SasQueryParameters;

const SNAPSHOT: &str = "snapshot";
const SHARE_SNAPSHOT: &str = "sharesnapshot";

/// A blob URL decomposed into its addressable pieces.
///
/// [`parse`](Self::parse) pulls a URL apart, recognizing the container
/// and blob path segments, the `snapshot` parameter and any SAS token;
/// [`to_uri`](Self::to_uri) reassembles it. Query parameters that are
/// none of those survive a round trip in `unparsed_parameters`, in
/// their original order, with repeated names grouped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobUrlParts {
    /// URL scheme, `http` or `https`.
    pub scheme: String,
    /// Host, including any port.
    pub host: String,
    /// First path segment.
    pub container_name: Option<String>,
    /// Remaining path segments joined back with `/`.
    pub blob_name: Option<String>,
    /// The `snapshot` query parameter.
    pub snapshot: Option<String>,
    /// SAS token recovered from the query, if any of its parameters
    /// were present.
    pub sas: Option<SasQueryParameters>,
    /// Query parameters not claimed by `snapshot` or the SAS token.
    pub unparsed_parameters: Vec<(String, Vec<String>)>,
}

impl BlobUrlParts {
    /// Decompose a blob URL.
    pub fn parse(uri: &Uri) -> Result<Self> {
        let (scheme, host) = scheme_and_host(uri)?;
        let (first, rest) = split_path(uri);
        let query = SplitQuery::parse(uri, SNAPSHOT)?;

        Ok(BlobUrlParts {
            scheme,
            host,
            container_name: first,
            blob_name: rest,
            snapshot: query.snapshot,
            sas: query.sas,
            unparsed_parameters: query.unparsed,
        })
    }

    /// Reassemble the URL. Unrecognized parameters come first, then the
    /// snapshot, then the SAS token in its wire order.
    pub fn to_uri(&self) -> Result<Uri> {
        build_uri(
            &self.scheme,
            &self.host,
            self.container_name.as_deref(),
            self.blob_name.as_deref(),
            &self.unparsed_parameters,
            SNAPSHOT,
            self.snapshot.as_deref(),
            self.sas.as_ref(),
        )
    }
}

/// A file share URL decomposed into its addressable pieces.
///
/// The share flavor of [`BlobUrlParts`]: the first path segment is the
/// share, the rest the file or directory path, and the service names
/// the snapshot parameter `sharesnapshot`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileUrlParts {
    /// URL scheme, `http` or `https`.
    pub scheme: String,
    /// Host, including any port.
    pub host: String,
    /// First path segment.
    pub share_name: Option<String>,
    /// Remaining path segments joined back with `/`.
    pub path: Option<String>,
    /// The `sharesnapshot` query parameter.
    pub share_snapshot: Option<String>,
    /// SAS token recovered from the query, if any of its parameters
    /// were present.
    pub sas: Option<SasQueryParameters>,
    /// Query parameters not claimed by `sharesnapshot` or the SAS token.
    pub unparsed_parameters: Vec<(String, Vec<String>)>,
}

impl FileUrlParts {
    /// Decompose a file share URL.
    pub fn parse(uri: &Uri) -> Result<Self> {
        let (scheme, host) = scheme_and_host(uri)?;
        let (first, rest) = split_path(uri);
        let query = SplitQuery::parse(uri, SHARE_SNAPSHOT)?;

        Ok(FileUrlParts {
            scheme,
            host,
            share_name: first,
            path: rest,
            share_snapshot: query.snapshot,
            sas: query.sas,
            unparsed_parameters: query.unparsed,
        })
    }

    /// Reassemble the URL. Unrecognized parameters come first, then the
    /// share snapshot, then the SAS token in its wire order.
    pub fn to_uri(&self) -> Result<Uri> {
        build_uri(
            &self.scheme,
            &self.host,
            self.share_name.as_deref(),
            self.path.as_deref(),
            &self.unparsed_parameters,
            SHARE_SNAPSHOT,
            self.share_snapshot.as_deref(),
            self.sas.as_ref(),
        )
    }
}

fn scheme_and_host(uri: &Uri) -> Result<(String, String)> {
    let scheme = uri
        .scheme_str()
        .ok_or_else(|| Error::request_invalid("storage url has no scheme"))?
        .to_string();
    let host = uri
        .authority()
        .ok_or_else(|| Error::request_invalid("storage url has no host"))?
        .to_string();
    Ok((scheme, host))
}

fn split_path(uri: &Uri) -> (Option<String>, Option<String>) {
    let path = uri.path().trim_start_matches('/');
    if path.is_empty() {
        return (None, None);
    }
    match path.split_once('/') {
        Some((first, rest)) => (Some(first.to_string()), Some(rest.to_string())),
        None => (Some(path.to_string()), None),
    }
}

struct SplitQuery {
    snapshot: Option<String>,
    sas: Option<SasQueryParameters>,
    unparsed: Vec<(String, Vec<String>)>,
}

impl SplitQuery {
    fn parse(uri: &Uri, snapshot_name: &str) -> Result<Self> {
        let mut snapshot = None;
        let mut sas_pairs = Vec::new();
        let mut unparsed: Vec<(String, Vec<String>)> = Vec::new();

        for (name, value) in form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes()) {
            let (name, value) = (name.into_owned(), value.into_owned());
            if name == snapshot_name {
                snapshot = Some(value);
            } else if SasQueryParameters::is_sas_parameter(&name) {
                sas_pairs.push((name, value));
            } else {
                match unparsed.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, values)) => values.push(value),
                    None => unparsed.push((name, vec![value])),
                }
            }
        }

        let sas = if sas_pairs.is_empty() {
            None
        } else {
            Some(SasQueryParameters::from_pairs(&sas_pairs)?)
        };

        Ok(SplitQuery {
            snapshot,
            sas,
            unparsed,
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn build_uri(
    scheme: &str,
    host: &str,
    first_segment: Option<&str>,
    rest: Option<&str>,
    unparsed: &[(String, Vec<String>)],
    snapshot_name: &str,
    snapshot: Option<&str>,
    sas: Option<&SasQueryParameters>,
) -> Result<Uri> {
    let mut path = String::new();
    if let Some(first) = first_segment {
        write!(path, "/{first}")?;
        if let Some(rest) = rest {
            write!(path, "/{rest}")?;
        }
    }
    if path.is_empty() {
        path.push('/');
    }

    let mut query = String::new();
    let mut push = |s: &str| {
        if !s.is_empty() {
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str(s);
        }
    };

    for (name, values) in unparsed {
        for value in values {
            push(&format!(
                "{}={}",
                percent_encode(name.as_bytes(), &SAS_ENCODE_SET),
                percent_encode(value.as_bytes(), &SAS_ENCODE_SET)
            ));
        }
    }
    if let Some(snapshot) = snapshot {
        push(&format!(
            "{snapshot_name}={}",
            percent_encode(snapshot.as_bytes(), &SAS_ENCODE_SET)
        ));
    }
    if let Some(sas) = sas {
        push(&sas.encode());
    }

    let path_and_query = if query.is_empty() {
        path
    } else {
        format!("{path}?{query}")
    };

    Ok(Uri::builder()
        .scheme(scheme)
        .authority(host)
        .path_and_query(path_and_query)
        .build()?)
}
