use std::str::FromStr;

use percent_encoding::percent_encode;

use azsign_core::time::{format_rfc3339_zulu, parse_rfc3339, DateTime};
use azsign_core::{Error, Result};

use crate::constants::SAS_ENCODE_SET;
use crate::sas::{SasIpRange, SasProtocol};

// SAS query parameter names, in the wire order `encode` emits them.
const SV: &str = "sv";
const SS: &str = "ss";
const SRT: &str = "srt";
const SPR: &str = "spr";
const ST: &str = "st";
const SE: &str = "se";
const SIP: &str = "sip";
const SI: &str = "si";
const SKOID: &str = "skoid";
const SKTID: &str = "sktid";
const SKT: &str = "skt";
const SKE: &str = "ske";
const SKS: &str = "sks";
const SKV: &str = "skv";
const SR: &str = "sr";
const SP: &str = "sp";
const SIG: &str = "sig";
const RSCC: &str = "rscc";
const RSCD: &str = "rscd";
const RSCE: &str = "rsce";
const RSCL: &str = "rscl";
const RSCT: &str = "rsct";

/// The signed fields of a SAS token plus the computed signature.
///
/// Produced by the signature-value builders in this module, or recovered
/// from a URL by [`crate::BlobUrlParts::parse`]. Immutable by
/// convention: construct it once, then `encode` it onto a URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SasQueryParameters {
    /// Service version the token targets (`sv`).
    pub version: Option<String>,
    /// Account SAS only: the services granted (`ss`).
    pub services: Option<String>,
    /// Account SAS only: the resource types granted (`srt`).
    pub resource_types: Option<String>,
    /// Allowed protocols (`spr`).
    pub protocol: Option<SasProtocol>,
    /// Start of the validity window (`st`).
    pub start_time: Option<DateTime>,
    /// End of the validity window (`se`).
    pub expiry_time: Option<DateTime>,
    /// IP restriction (`sip`).
    pub ip_range: Option<SasIpRange>,
    /// Stored access policy reference (`si`).
    pub identifier: Option<String>,
    /// Delegation key: signed object id (`skoid`).
    pub signed_oid: Option<String>,
    /// Delegation key: signed tenant id (`sktid`).
    pub signed_tid: Option<String>,
    /// Delegation key: start of key validity (`skt`).
    pub signed_start: Option<DateTime>,
    /// Delegation key: end of key validity (`ske`).
    pub signed_expiry: Option<DateTime>,
    /// Delegation key: signed service (`sks`).
    pub signed_service: Option<String>,
    /// Delegation key: signed version (`skv`).
    pub signed_version: Option<String>,
    /// Service SAS only: the resource type code (`sr`).
    pub resource: Option<String>,
    /// Granted permissions (`sp`).
    pub permissions: Option<String>,
    /// The Base64 HMAC-SHA256 signature (`sig`).
    pub signature: Option<String>,
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

impl SasQueryParameters {
    /// Encode the token as a URL query string, fields in the fixed wire
    /// order, every value percent-encoded with the SAS encode set.
    pub fn encode(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::with_capacity(8);

        let mut push = |name: &'static str, value: Option<String>| {
            if let Some(value) = value {
                pairs.push((name, value));
            }
        };

        push(SV, self.version.clone());
        push(SS, self.services.clone());
        push(SRT, self.resource_types.clone());
        push(SPR, self.protocol.map(|v| v.to_string()));
        push(ST, self.start_time.map(format_rfc3339_zulu));
        push(SE, self.expiry_time.map(format_rfc3339_zulu));
        push(SIP, self.ip_range.as_ref().map(ToString::to_string));
        push(SI, self.identifier.clone());
        push(SKOID, self.signed_oid.clone());
        push(SKTID, self.signed_tid.clone());
        push(SKT, self.signed_start.map(format_rfc3339_zulu));
        push(SKE, self.signed_expiry.map(format_rfc3339_zulu));
        push(SKS, self.signed_service.clone());
        push(SKV, self.signed_version.clone());
        push(SR, self.resource.clone());
        push(SP, self.permissions.clone());
        push(SIG, self.signature.clone());
        push(RSCC, self.cache_control.clone());
        push(RSCD, self.content_disposition.clone());
        push(RSCE, self.content_encoding.clone());
        push(RSCL, self.content_language.clone());
        push(RSCT, self.content_type.clone());

        let mut s = String::with_capacity(128);
        for (idx, (name, value)) in pairs.into_iter().enumerate() {
            if idx != 0 {
                s.push('&');
            }
            s.push_str(name);
            s.push('=');
            s.extend(percent_encode(value.as_bytes(), &SAS_ENCODE_SET));
        }

        s
    }

    /// Whether a query parameter name belongs to a SAS token.
    pub(crate) fn is_sas_parameter(name: &str) -> bool {
        matches!(
            name,
            SV | SS
                | SRT
                | SPR
                | ST
                | SE
                | SIP
                | SI
                | SKOID
                | SKTID
                | SKT
                | SKE
                | SKS
                | SKV
                | SR
                | SP
                | SIG
                | RSCC
                | RSCD
                | RSCE
                | RSCL
                | RSCT
        )
    }

    /// Rebuild from percent-decoded query pairs; names outside the SAS
    /// set are ignored.
    pub(crate) fn from_pairs(pairs: &[(String, String)]) -> Result<Self> {
        let mut out = SasQueryParameters::default();

        for (name, value) in pairs {
            match name.as_str() {
                SV => out.version = Some(value.clone()),
                SS => out.services = Some(value.clone()),
                SRT => out.resource_types = Some(value.clone()),
                SPR => out.protocol = Some(parse_component(SPR, value)?),
                ST => out.start_time = Some(parse_time(ST, value)?),
                SE => out.expiry_time = Some(parse_time(SE, value)?),
                SIP => out.ip_range = Some(SasIpRange::parse(value)),
                SI => out.identifier = Some(value.clone()),
                SKOID => out.signed_oid = Some(value.clone()),
                SKTID => out.signed_tid = Some(value.clone()),
                SKT => out.signed_start = Some(parse_time(SKT, value)?),
                SKE => out.signed_expiry = Some(parse_time(SKE, value)?),
                SKS => out.signed_service = Some(value.clone()),
                SKV => out.signed_version = Some(value.clone()),
                SR => out.resource = Some(value.clone()),
                SP => out.permissions = Some(value.clone()),
                SIG => out.signature = Some(value.clone()),
                RSCC => out.cache_control = Some(value.clone()),
                RSCD => out.content_disposition = Some(value.clone()),
                RSCE => out.content_encoding = Some(value.clone()),
                RSCL => out.content_language = Some(value.clone()),
                RSCT => out.content_type = Some(value.clone()),
                _ => {}
            }
        }

        Ok(out)
    }
}

fn parse_time(name: &str, value: &str) -> Result<DateTime> {
    parse_rfc3339(value).map_err(|e| {
        Error::request_invalid(format!("failed to parse SAS parameter {name}")).with_source(e)
    })
}

fn parse_component<T: FromStr<Err = Error>>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|e: Error| {
        Error::request_invalid(format!("failed to parse SAS parameter {name}")).with_source(e)
    })
}
