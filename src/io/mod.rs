//! I/O module
//!
//! Handles history CSV reading and output writing.
//!
//! # Components
//!
//! - `history` - history CSV reader (entries for export)
//! - `output` - decoded-result CSV writer and DTA file saver

pub mod history;
pub mod output;

pub use history::{convert_history_record, read_history, HistoryRecord};
pub use output::{save_dta, write_decoded_csv};
