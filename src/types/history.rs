//! History and export types
//!
//! A scan session stores each completed code in an external history; at
//! export time history entries are turned into `BatchEntry` values and
//! handed to the DTA encoder together with the sender's `SenderProfile`.

use super::code::PaymentCode;
use rust_decimal::Decimal;

/// One stored scan result, as read back from the history file
///
/// The amount is optional because some slips encode no amount; the user
/// supplies one before export. The address is the beneficiary address,
/// newline separated, possibly still empty right after scanning.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// The raw, checksum-verified code row
    pub code_row: String,

    /// User-entered amount, overriding a non-encoded slip amount
    pub amount: Option<Decimal>,

    /// Beneficiary address, newline separated
    pub address: String,
}

/// One payment to include in a DTA batch
///
/// Assembled transiently from history entries for a single export
/// operation and consumed once by the encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    /// The validated code the payment was scanned from
    pub code: PaymentCode,

    /// Amount override for slips that do not encode one
    ///
    /// When the slip encodes an amount the override takes precedence if
    /// present; a slip with neither is a batch-fatal error.
    pub amount: Option<Decimal>,

    /// Beneficiary address, newline separated, at most 4 lines of 20 chars
    pub address: String,
}

/// Default day-of-month for the desired execution date
pub const DEFAULT_EXECUTION_DAY: u8 = 26;

/// Sender-side configuration for a DTA export
///
/// Supplied by the caller (CLI flags here; preferences in the original
/// scanner application).
#[derive(Debug, Clone, PartialEq)]
pub struct SenderProfile {
    /// The sender's own IBAN; must pass the mod-97 check
    pub iban: String,

    /// The sender's own address, newline separated, at least 2 lines
    pub address: String,

    /// Desired day-of-month for execution, rolled forward as needed
    pub execution_day: u8,
}

impl SenderProfile {
    /// Create a profile with the default execution day
    pub fn new(iban: impl Into<String>, address: impl Into<String>) -> Self {
        SenderProfile {
            iban: iban.into(),
            address: address.into(),
            execution_day: DEFAULT_EXECUTION_DAY,
        }
    }
}
