use std::fmt;

/// An IP address range restriction on a SAS (`sip`), either a single
/// address or an inclusive `min-max` span.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SasIpRange {
    /// Lowest address of the range.
    pub min: Option<String>,
    /// Highest address of the range.
    pub max: Option<String>,
}

impl fmt::Display for SasIpRange {
    /// `"min-max"` when both ends are set, `"min"` with only a minimum,
    /// and `""` whenever `min` is absent, regardless of `max`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(min) = &self.min else {
            return Ok(());
        };

        f.write_str(min)?;
        if let Some(max) = &self.max {
            write!(f, "-{max}")?;
        }
        Ok(())
    }
}

impl SasIpRange {
    /// Parse a range by splitting on the first `-`.
    ///
    /// An absent minimum parses to the empty string, not `None`: the
    /// empty input round-trips through `to_string` as `""`. This
    /// asymmetry with construction (a `None` min also renders `""`) is
    /// the service's historical contract and is kept on purpose.
    pub fn parse(s: &str) -> Self {
        match s.split_once('-') {
            Some((min, max)) => SasIpRange {
                min: Some(min.to_string()),
                max: Some(max.to_string()),
            },
            None => SasIpRange {
                min: Some(s.to_string()),
                max: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let both = SasIpRange {
            min: Some("168.1.5.60".to_string()),
            max: Some("168.1.5.70".to_string()),
        };
        assert_eq!(both.to_string(), "168.1.5.60-168.1.5.70");

        let min_only = SasIpRange {
            min: Some("168.1.5.60".to_string()),
            max: None,
        };
        assert_eq!(min_only.to_string(), "168.1.5.60");

        // max without min renders empty.
        let max_only = SasIpRange {
            min: None,
            max: Some("168.1.5.70".to_string()),
        };
        assert_eq!(max_only.to_string(), "");
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            SasIpRange::parse("168.1.5.60-168.1.5.70"),
            SasIpRange {
                min: Some("168.1.5.60".to_string()),
                max: Some("168.1.5.70".to_string()),
            }
        );
        assert_eq!(
            SasIpRange::parse("168.1.5.60"),
            SasIpRange {
                min: Some("168.1.5.60".to_string()),
                max: None,
            }
        );
        // Empty input parses to an empty-string min, not None.
        assert_eq!(
            SasIpRange::parse(""),
            SasIpRange {
                min: Some(String::new()),
                max: None,
            }
        );
    }

    #[test]
    fn test_parse_round_trips_rendering() {
        for s in ["168.1.5.60-168.1.5.70", "168.1.5.60", ""] {
            assert_eq!(SasIpRange::parse(s).to_string(), s);
        }
    }
}
