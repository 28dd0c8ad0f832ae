//! Types module
//!
//! Contains core data structures used throughout the engine.
//! This module organizes types into logical submodules:
//! - `code`: code formats, validated codes and decoded fields
//! - `history`: stored scan results and export inputs
//! - `error`: error types for history reading and DTA export

pub mod code;
pub mod error;
pub mod history;

pub use code::{CodeFormat, DecodedFields, PaymentCode, SlipKind, UNKNOWN_FIELD};
pub use error::ExportError;
pub use history::{BatchEntry, HistoryEntry, SenderProfile, DEFAULT_EXECUTION_DAY};
