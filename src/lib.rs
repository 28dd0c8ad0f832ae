//! ESR Engine Library
//!
//! # Overview
//!
//! This library recognizes, validates and decodes Swiss payment-slip code
//! lines captured piecemeal through noisy, frame-by-frame text
//! recognition, and exports validated batches into fixed-width DTA
//! bank-transfer files.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (PaymentCode, DecodedFields, errors)
//! - [`cli`] - CLI argument parsing and subcommand runners
//! - [`core`] - Business logic components:
//!   - [`core::checksum`] - modulo-10 recursive check-digit automaton
//!   - [`core::format`] - per-format step rule tables
//!   - [`core::validator`] - incremental, configuration-driven validation
//!   - [`core::decoder`] - pure decoding of semantic fields
//!   - [`core::dta`] - DTA batch file encoding
//! - [`io`] - history CSV reading and output writing
//!
//! # Scanning model
//!
//! A single recognition pass over a camera frame typically yields only a
//! fragment of the full code line. The [`core::validator::StepValidator`]
//! therefore accepts one candidate text per frame, extracts the portion
//! relevant to the current step, checks it against the modulo-10 check
//! digit and, only if correct, commits it and advances. Once all steps
//! are committed, the concatenated segments form the complete, verified
//! code, which decodes into account, amount, currency and reference.
//!
//! Scan-path failures are silent: `validate` returns `false` and the
//! caller feeds the next frame. Export failures are batch-fatal: the
//! first violated rule aborts the build with a specific error and no
//! bytes are emitted.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod types;

pub use core::{DtaEncoder, ScanSession, StepValidator};
pub use io::{read_history, save_dta, write_decoded_csv};
pub use types::{
    BatchEntry, CodeFormat, DecodedFields, ExportError, HistoryEntry, PaymentCode, SenderProfile,
    SlipKind,
};
