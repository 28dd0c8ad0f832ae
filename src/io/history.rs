//! History CSV reader
//!
//! Reads stored scan results back for export. The file has columns
//! `code,amount,address`; amount and address may be empty (a slip whose
//! amount is encoded needs no override, an address may not have been
//! entered yet). Address line breaks are stored as `\n` inside the quoted
//! field.

use crate::types::{ExportError, HistoryEntry};
use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

/// CSV record structure for deserialization
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HistoryRecord {
    /// The raw, previously validated code row
    pub code: String,

    /// Optional user-entered amount
    pub amount: Option<String>,

    /// Beneficiary address, possibly empty
    pub address: Option<String>,
}

/// Convert a deserialized CSV record into a `HistoryEntry`
///
/// Parses the amount into a `Decimal` when present and non-empty.
///
/// # Errors
///
/// `ParseError` when the amount field is not a decimal number.
pub fn convert_history_record(record: HistoryRecord) -> Result<HistoryEntry, ExportError> {
    let amount = match record.amount {
        Some(text) if !text.trim().is_empty() => {
            let amount = Decimal::from_str(text.trim()).map_err(|_| ExportError::ParseError {
                line: None,
                message: format!("invalid amount '{}' for code {}", text, record.code),
            })?;
            Some(amount)
        }
        _ => None,
    };

    Ok(HistoryEntry {
        code_row: record.code,
        amount,
        address: record.address.unwrap_or_default(),
    })
}

/// Read all history entries from a CSV file
///
/// # Arguments
///
/// * `path` - Path to the history CSV file with a `code,amount,address`
///   header row
///
/// # Errors
///
/// `IoError` when the file cannot be opened, `ParseError` (with line
/// number where available) for malformed records.
pub fn read_history(path: &Path) -> Result<Vec<HistoryEntry>, ExportError> {
    let file = File::open(path).map_err(|e| ExportError::IoError {
        message: format!("failed to open '{}': {}", path.display(), e),
    })?;

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(file);

    let mut entries = Vec::new();

    for (index, result) in reader.deserialize::<HistoryRecord>().enumerate() {
        let record = result?;
        let entry = convert_history_record(record).map_err(|e| match e {
            ExportError::ParseError { message, .. } => ExportError::ParseError {
                line: Some(index as u64 + 2),
                message,
            },
            other => other,
        })?;
        entries.push(entry);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_read_history_parses_entries() {
        let csv_content = "code,amount,address\n\
            0100003949753>210000000003139471430009017+ 010001628>,,\"Hans Beispiel\nBern\"\n\
            042>12345+ 010001628>,25.50,\n";
        let file = create_temp_csv(csv_content);

        let entries = read_history(file.path()).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].amount, None);
        assert_eq!(entries[0].address, "Hans Beispiel\nBern");
        assert_eq!(entries[1].amount, Some(Decimal::from_str("25.50").unwrap()));
        assert_eq!(entries[1].address, "");
    }

    #[test]
    fn test_read_history_rejects_invalid_amount() {
        let csv_content = "code,amount,address\nsomecode>,not-a-number,addr\n";
        let file = create_temp_csv(csv_content);

        let result = read_history(file.path());
        assert!(matches!(
            result,
            Err(ExportError::ParseError { line: Some(2), .. })
        ));
    }

    #[test]
    fn test_read_history_fails_on_missing_file() {
        let result = read_history(Path::new("nonexistent.csv"));
        assert!(matches!(result, Err(ExportError::IoError { .. })));
    }
}
