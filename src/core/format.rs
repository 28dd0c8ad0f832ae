//! Per-format step rule tables
//!
//! Each slip format is described by a table of `StepRule`s instead of a
//! format-specific validator: the step validator is generic over the
//! table, so adding or correcting a format is a data change.
//!
//! The ES-IBAN lengths are carried over from the original scanner's
//! constants, which were never confirmed against the authoritative slip
//! specification; they are accepted-length data, not logic.

use crate::types::CodeFormat;

/// Validation rule for one step of a code format
///
/// Immutable; one per step. A step accepts a segment that ends with the
/// terminator, matches one of the accepted total lengths (terminator
/// included) and carries a correct check digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRule {
    /// Character marking the end of this step's segment
    pub terminator: char,

    /// One or two accepted total segment lengths, terminator included
    pub valid_lengths: (usize, Option<usize>),

    /// Prefix applied to the raw segment when committed to the code row
    pub output_prefix: &'static str,

    /// Whether extraction first discards everything up to and including
    /// the previous step's terminator found in the raw text
    ///
    /// Models the camera frame drifting across terminator boundaries
    /// between steps.
    pub trims_previous_terminator: bool,
}

/// Ordered step rules for one code format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    /// The format these rules validate
    pub format: CodeFormat,

    /// Per-step rules, in scan order
    pub steps: &'static [StepRule],
}

/// ESR (orange slip) step rules
///
/// Three steps: amount part up to `'>'`, reference part up to `'+'`,
/// account part up to the final `'>'`. The account segment re-enters the
/// code row with a leading space, matching the printed code line.
pub const ESR: FormatSpec = FormatSpec {
    format: CodeFormat::Esr,
    steps: &[
        StepRule {
            terminator: '>',
            valid_lengths: (4, Some(14)),
            output_prefix: "",
            trims_previous_terminator: false,
        },
        StepRule {
            terminator: '+',
            valid_lengths: (28, Some(17)),
            output_prefix: "",
            trims_previous_terminator: true,
        },
        StepRule {
            terminator: '>',
            valid_lengths: (10, None),
            output_prefix: " ",
            trims_previous_terminator: true,
        },
    ],
};

/// ES-IBAN (red slip) step rules
pub const ES_IBAN: FormatSpec = FormatSpec {
    format: CodeFormat::EsIban,
    steps: &[
        StepRule {
            terminator: '+',
            valid_lengths: (28, None),
            output_prefix: "",
            trims_previous_terminator: false,
        },
        StepRule {
            terminator: '>',
            valid_lengths: (10, None),
            output_prefix: " ",
            trims_previous_terminator: true,
        },
        StepRule {
            terminator: '>',
            valid_lengths: (10, None),
            output_prefix: "",
            trims_previous_terminator: false,
        },
    ],
};

impl FormatSpec {
    /// Look up the rule table for a format
    pub fn for_format(format: CodeFormat) -> &'static FormatSpec {
        match format {
            CodeFormat::Esr => &ESR,
            CodeFormat::EsIban => &ES_IBAN,
        }
    }
}

impl StepRule {
    /// Whether `length` is one of the accepted total segment lengths
    pub fn accepts_length(&self, length: usize) -> bool {
        length == self.valid_lengths.0 || Some(length) == self.valid_lengths.1
    }
}
