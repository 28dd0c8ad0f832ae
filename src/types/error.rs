//! Error types for the ESR engine
//!
//! Scan-path rejections (garbled fragment, checksum mismatch) are not
//! errors: `StepValidator::validate` returns `false` and the caller feeds
//! the next frame. The variants here cover the batch-fatal export
//! failures and file I/O. A batch build surfaces the first violation in
//! input order and emits no bytes.

use thiserror::Error;

/// Main error type for history reading and DTA export
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    /// The sender profile carries no IBAN
    ///
    /// Batch-fatal before any entry is examined.
    #[error("Sender IBAN is not set")]
    SenderIbanMissing,

    /// The IBAN has the wrong length
    ///
    /// Swiss IBANs are exactly 21 characters after whitespace removal.
    #[error("IBAN '{iban}' has length {length}, expected 21")]
    InvalidIbanLength {
        /// The offending IBAN (whitespace stripped)
        iban: String,
        /// Its actual length
        length: usize,
    },

    /// The IBAN contains a character outside `0-9A-Z`
    #[error("IBAN '{iban}' contains invalid character '{ch}'")]
    InvalidIbanCharacter {
        /// The offending IBAN
        iban: String,
        /// The character that cannot be mapped
        ch: char,
    },

    /// The IBAN fails the standard mod-97 check
    #[error("IBAN '{iban}' fails the mod-97 check")]
    InvalidIbanChecksum {
        /// The offending IBAN
        iban: String,
    },

    /// The sender address has fewer than two lines
    #[error("Sender address is not set (needs at least 2 lines)")]
    SenderAddressMissing,

    /// A beneficiary address is empty
    #[error("Address for account {account} is empty")]
    AddressEmpty {
        /// Account of the offending entry
        account: String,
    },

    /// A beneficiary address has more than four lines
    #[error("Address for account {account} has {lines} lines, at most 4 allowed")]
    TooManyAddressLines {
        /// Account of the offending entry
        account: String,
        /// Number of lines found
        lines: usize,
    },

    /// An address line exceeds the 20-character field width
    #[error("Address line '{line}' for account {account} is longer than 20 characters")]
    AddressLineTooLong {
        /// Account of the offending entry
        account: String,
        /// The offending line
        line: String,
    },

    /// An address contains a character outside the Latin-1 range
    #[error("Address for account {account} contains character '{ch}' not encodable in Latin-1")]
    AddressNotEncodable {
        /// Account of the offending entry
        account: String,
        /// The offending character
        ch: char,
    },

    /// An entry has neither an encoded nor an override amount
    #[error("Amount for account {account} is missing")]
    AmountMissing {
        /// Account of the offending entry
        account: String,
    },

    /// I/O error while reading history or writing the batch file
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// History CSV parsing error
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl From<std::io::Error> for ExportError {
    fn from(error: std::io::Error) -> Self {
        ExportError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        ExportError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper constructors for the variants carrying owned strings

impl ExportError {
    /// Create an InvalidIbanLength error
    pub fn invalid_iban_length(iban: &str) -> Self {
        ExportError::InvalidIbanLength {
            iban: iban.to_string(),
            length: iban.chars().count(),
        }
    }

    /// Create an InvalidIbanCharacter error
    pub fn invalid_iban_character(iban: &str, ch: char) -> Self {
        ExportError::InvalidIbanCharacter {
            iban: iban.to_string(),
            ch,
        }
    }

    /// Create an InvalidIbanChecksum error
    pub fn invalid_iban_checksum(iban: &str) -> Self {
        ExportError::InvalidIbanChecksum {
            iban: iban.to_string(),
        }
    }

    /// Create an AddressEmpty error
    pub fn address_empty(account: &str) -> Self {
        ExportError::AddressEmpty {
            account: account.to_string(),
        }
    }

    /// Create a TooManyAddressLines error
    pub fn too_many_address_lines(account: &str, lines: usize) -> Self {
        ExportError::TooManyAddressLines {
            account: account.to_string(),
            lines,
        }
    }

    /// Create an AddressLineTooLong error
    pub fn address_line_too_long(account: &str, line: &str) -> Self {
        ExportError::AddressLineTooLong {
            account: account.to_string(),
            line: line.to_string(),
        }
    }

    /// Create an AddressNotEncodable error
    pub fn address_not_encodable(account: &str, ch: char) -> Self {
        ExportError::AddressNotEncodable {
            account: account.to_string(),
            ch,
        }
    }

    /// Create an AmountMissing error
    pub fn amount_missing(account: &str) -> Self {
        ExportError::AmountMissing {
            account: account.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::sender_iban_missing(ExportError::SenderIbanMissing, "Sender IBAN is not set")]
    #[case::iban_length(
        ExportError::invalid_iban_length("CH93"),
        "IBAN 'CH93' has length 4, expected 21"
    )]
    #[case::iban_checksum(
        ExportError::invalid_iban_checksum("CH9300762011623852958"),
        "IBAN 'CH9300762011623852958' fails the mod-97 check"
    )]
    #[case::sender_address(
        ExportError::SenderAddressMissing,
        "Sender address is not set (needs at least 2 lines)"
    )]
    #[case::address_lines(
        ExportError::too_many_address_lines("01-162-8", 5),
        "Address for account 01-162-8 has 5 lines, at most 4 allowed"
    )]
    #[case::amount_missing(
        ExportError::amount_missing("01-162-8"),
        "Amount for account 01-162-8 is missing"
    )]
    #[case::parse_error_with_line(
        ExportError::ParseError { line: Some(3), message: "bad field".to_string() },
        "CSV parse error at line 3: bad field"
    )]
    fn test_error_display(#[case] error: ExportError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: ExportError = io_error.into();
        assert!(matches!(error, ExportError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: denied");
    }
}
