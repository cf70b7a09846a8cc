use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

// Headers used in azure services.
pub const X_MS_DATE: &str = "x-ms-date";

/// Storage service version newly built SAS tokens target.
pub const SAS_VERSION: &str = "2018-11-09";

/// AsciiSet for re-encoding query values of a request signed with Shared Key.
pub static AZURE_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'/')
    .remove(b'~');

/// AsciiSet for SAS token values.
///
/// Unlike [`AZURE_QUERY_ENCODE_SET`], `/` stays escaped: signatures are
/// Base64 and the service expects `+`, `/` and `=` percent-encoded in
/// tokens. Commas (in `https,http` and residual values) are escaped too.
pub static SAS_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
