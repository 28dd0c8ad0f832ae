//! Core business logic module
//!
//! This module contains the scan and export components:
//! - `checksum` - modulo-10 recursive check-digit automaton
//! - `format` - per-format step rule tables
//! - `validator` - incremental step validation and the scan session
//! - `decoder` - pure decoding of semantic fields from a code row
//! - `dta` - DTA batch file encoding

pub mod checksum;
pub mod decoder;
pub mod dta;
pub mod format;
pub mod validator;

pub use dta::DtaEncoder;
pub use format::{FormatSpec, StepRule};
pub use validator::{ScanSession, StepValidator};
