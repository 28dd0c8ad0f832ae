//! Payment-code types for the ESR engine
//!
//! This module defines the code formats the scanner understands, the
//! `PaymentCode` produced by a finished validation run, and the semantic
//! fields decoded from it.

use rust_decimal::Decimal;

/// Code formats supported by the step validator
///
/// Each variant selects a `FormatSpec` table of per-step rules. The format
/// is chosen by the caller before scanning starts (the two slip families
/// use incompatible terminators and step layouts).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeFormat {
    /// Orange payment slip with encoded amount and ESR reference
    Esr,

    /// Red payment slip carrying an IBAN-style code line
    EsIban,
}

/// Slip kind derived from the code row itself
///
/// Shared rule across formats: whichever of the control characters `'+'`
/// and `'>'` occurs later in the row designates the kind. Used to select
/// which decoding rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlipKind {
    /// `'+'` after `'>'`: orange slip (ESR)
    Orange,

    /// `'>'` after `'+'`: red slip (ES)
    Red,
}

impl SlipKind {
    /// Classify a complete code row
    pub fn of_code_row(raw: &str) -> SlipKind {
        let plus = raw.find('+').map(|i| i as isize).unwrap_or(-1);
        let greater = raw.find('>').map(|i| i as isize).unwrap_or(-1);

        if plus > greater {
            SlipKind::Orange
        } else {
            SlipKind::Red
        }
    }
}

/// A fully validated payment-slip code line
///
/// Produced only by a finished `StepValidator`; the raw string is the
/// concatenation of all committed step segments and is immutable
/// thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCode {
    /// The format the code was validated against
    pub format: CodeFormat,

    /// The complete, checksum-verified code row
    pub raw: String,
}

impl PaymentCode {
    /// The slip kind encoded in the row itself
    pub fn kind(&self) -> SlipKind {
        SlipKind::of_code_row(&self.raw)
    }
}

/// Sentinel used when a field cannot be derived from the code row
pub const UNKNOWN_FIELD: &str = "?";

/// Semantic fields decoded from a `PaymentCode`
///
/// A pure function of the code row (see `core::decoder`): decoding the
/// same code twice yields identical fields. Malformed rows produce the
/// `"?"` sentinel rather than an error; a slip that does not encode an
/// amount produces `amount == None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFields {
    /// Account in `prefix-indenture-digit` display form, or `"?"`
    pub account: String,

    /// Amount in the slip's currency, `None` when not encoded
    pub amount: Option<Decimal>,

    /// `"CHF"`, `"EUR"` or `"?"`
    pub currency: String,

    /// Reference number grouped in blocks of five digits, or `"?"`
    pub reference: String,
}
