use std::fmt;
use std::str::FromStr;

use azsign_core::Error;

/// Protocols a SAS grants access over (`spr`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SasProtocol {
    /// HTTPS only.
    Https,
    /// HTTPS or HTTP.
    HttpsHttp,
}

impl fmt::Display for SasProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SasProtocol::Https => f.write_str("https"),
            SasProtocol::HttpsHttp => f.write_str("https,http"),
        }
    }
}

impl FromStr for SasProtocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "https" => Ok(SasProtocol::Https),
            "https,http" => Ok(SasProtocol::HttpsHttp),
            _ => Err(Error::request_invalid(format!("invalid SAS protocol: {s}"))),
        }
    }
}
