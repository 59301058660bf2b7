use alloc::string::String;

/// All recoverable errors that can occur during HDB and FITS keyword operations.
///
/// Invariant violations (states the FITS format or this crate's type system
/// guarantees cannot occur) are not represented here; they panic.
#[derive(Debug)]
pub enum Error {
    /// Malformed FITS header block.
    InvalidHeader(&'static str),
    /// Premature end of data while reading.
    UnexpectedEof,
    /// Unrecognized BITPIX value.
    InvalidBitpix(i64),
    /// Malformed keyword name in a header card.
    InvalidKeyword,
    /// A keyword was constructed with an empty name.
    EmptyKeywordName,
    /// Unknown or unsupported XTENSION type.
    UnsupportedExtension(&'static str),
    /// A header value could not be parsed correctly.
    InvalidValue,
    /// A required keyword was not found in the header.
    MissingKeyword(&'static str),
    /// A keyword lookup by name found no matching entry.
    KeywordNotFound(String),
    /// A stored value does not fit the range of the requested type.
    CastOutOfRange,
    /// The requested conversion is not defined for the stored keyword kind.
    CastNotApplicable,
    /// An axis number outside the FITS limit of 1..=999.
    AxisOutOfRange(usize),
    /// An axis number within 1..=999 but beyond the declared NAXIS.
    AxisNotDefined(usize),
    /// SIMPLE was queried on a non-primary HDB.
    NotPrimary,
    /// An I/O error from the standard library.
    #[cfg(feature = "std")]
    Io(std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidHeader(msg) => write!(f, "invalid FITS header: {msg}"),
            Error::UnexpectedEof => write!(f, "unexpected end of file"),
            Error::InvalidBitpix(v) => write!(f, "invalid BITPIX value: {v}"),
            Error::InvalidKeyword => write!(f, "invalid keyword name"),
            Error::EmptyKeywordName => write!(f, "keyword name must not be empty"),
            Error::UnsupportedExtension(kind) => write!(f, "unsupported XTENSION type: {kind}"),
            Error::InvalidValue => write!(f, "invalid header value"),
            Error::MissingKeyword(kw) => write!(f, "missing required keyword: {kw}"),
            Error::KeywordNotFound(name) => write!(f, "keyword not found: {name}"),
            Error::CastOutOfRange => write!(f, "value out of range for requested type"),
            Error::CastNotApplicable => write!(f, "type cast not applicable to stored kind"),
            Error::AxisOutOfRange(n) => write!(f, "axis number {n} outside 1..=999"),
            Error::AxisNotDefined(n) => write!(f, "axis {n} exceeds declared NAXIS"),
            Error::NotPrimary => write!(f, "SIMPLE is only valid on the primary HDB"),
            #[cfg(feature = "std")]
            Error::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_cast_errors() {
        assert_eq!(
            Error::CastOutOfRange.to_string(),
            "value out of range for requested type"
        );
        assert_eq!(
            Error::CastNotApplicable.to_string(),
            "type cast not applicable to stored kind"
        );
    }

    #[test]
    fn display_axis_errors() {
        assert_eq!(
            Error::AxisOutOfRange(1000).to_string(),
            "axis number 1000 outside 1..=999"
        );
        assert_eq!(
            Error::AxisNotDefined(4).to_string(),
            "axis 4 exceeds declared NAXIS"
        );
    }

    #[test]
    fn display_keyword_not_found() {
        let e = Error::KeywordNotFound("EXPTIME".to_string());
        assert_eq!(e.to_string(), "keyword not found: EXPTIME");
    }

    #[test]
    fn display_not_primary() {
        assert_eq!(
            Error::NotPrimary.to_string(),
            "SIMPLE is only valid on the primary HDB"
        );
    }

    #[cfg(feature = "std")]
    #[test]
    fn io_error_from_conversion() {
        let io_err = std::io::Error::other("oops");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
    }

    #[cfg(feature = "std")]
    #[test]
    fn std_error_source() {
        use std::error::Error as StdError;

        let e = Error::InvalidKeyword;
        assert!(e.source().is_none());

        let io_err = std::io::Error::other("inner");
        let e = Error::Io(io_err);
        assert!(e.source().is_some());
    }

    #[test]
    fn debug_formatting() {
        let e = Error::InvalidBitpix(99);
        let debug = alloc::format!("{e:?}");
        assert!(debug.contains("InvalidBitpix"));
        assert!(debug.contains("99"));
    }
}
