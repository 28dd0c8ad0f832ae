//! Subcommand implementations
//!
//! The scan run feeds recognized text fragments through a `ScanSession`
//! and writes decoded results as CSV; the export run turns stored history
//! entries into a DTA batch file. Both are plain synchronous functions so
//! the end-to-end tests drive them directly.

use crate::core::{DtaEncoder, ScanSession};
use crate::io::{read_history, save_dta, write_decoded_csv};
use crate::types::{
    BatchEntry, CodeFormat, DecodedFields, ExportError, PaymentCode, SlipKind,
};
use chrono::NaiveDate;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Scan a stream of recognized text fragments
///
/// Each input line is one recognition result. Completed codes are
/// decoded and written as CSV rows in scan order; the session restarts
/// after every completed code, so one stream can carry several slips.
///
/// # Arguments
///
/// * `input` - fragment source, one fragment per line
/// * `format` - code format to validate against
/// * `output` - writer receiving the decoded CSV
pub fn run_scan<R: BufRead>(
    input: R,
    format: CodeFormat,
    output: &mut dyn Write,
) -> Result<(), ExportError> {
    let mut session = ScanSession::new(format);
    let mut completed = Vec::new();

    for line in input.lines() {
        let fragment = line?;

        if let Some(code) = session.push_fragment(&fragment) {
            let fields = DecodedFields::decode(&code);
            info!(code = %code.raw, account = %fields.account, "code line completed");
            completed.push((code, fields));
        }
    }

    write_decoded_csv(&completed, output)
}

/// Build and save a DTA batch from a history file
///
/// Reads the history CSV, assembles the batch entries (the code format
/// is re-derived from each stored row's slip kind) and writes the batch
/// file into `output_dir`.
///
/// # Returns
///
/// The path of the written DTA file.
///
/// # Errors
///
/// The first export violation in input order, or an I/O error; no file
/// is written in either case.
pub fn run_export(
    history_path: &Path,
    encoder: &DtaEncoder,
    output_dir: &Path,
    today: NaiveDate,
) -> Result<PathBuf, ExportError> {
    let entries = read_history(history_path)?;

    let batch: Vec<BatchEntry> = entries
        .into_iter()
        .map(|entry| {
            let format = match SlipKind::of_code_row(&entry.code_row) {
                SlipKind::Orange => CodeFormat::Esr,
                SlipKind::Red => CodeFormat::EsIban,
            };

            BatchEntry {
                code: PaymentCode {
                    format,
                    raw: entry.code_row,
                },
                amount: entry.amount,
                address: entry.address,
            }
        })
        .collect();

    let bytes = encoder.build(&batch, today)?;
    let path = save_dta(output_dir, &bytes)?;

    info!(path = %path.display(), bytes = bytes.len(), "DTA file written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SenderProfile;
    use std::io::Cursor;

    const EXAMPLE_CODE_ROW: &str = "0100003949753>210000000003139471430009017+ 010001628>";

    #[test]
    fn test_run_scan_decodes_fragmented_input() {
        let fragments = format!(
            "##garbage##\n01000 03949 753>21\n{}\n{}\n",
            "953>210000000003139471430009017+", "010001628>"
        );

        let mut output = Vec::new();
        run_scan(Cursor::new(fragments), CodeFormat::Esr, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.lines().count(), 2, "header plus one decoded code");
        assert!(text.contains("01-162-8"));
    }

    #[test]
    fn test_run_scan_handles_multiple_codes_per_stream() {
        let fragments = format!(
            "{row}\n{row}\n{row}\n{row}\n{row}\n{row}\n",
            row = EXAMPLE_CODE_ROW
        );

        let mut output = Vec::new();
        run_scan(Cursor::new(fragments), CodeFormat::Esr, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.lines().count(), 3, "header plus two decoded codes");
    }

    #[test]
    fn test_run_export_reports_first_violation() {
        let dir = tempfile::tempdir().unwrap();
        let history = dir.path().join("history.csv");
        std::fs::write(
            &history,
            format!("code,amount,address\n{},,\n", EXAMPLE_CODE_ROW),
        )
        .unwrap();

        let encoder = DtaEncoder::new(SenderProfile::new(
            "CH9300762011623852957",
            "Max Muster\n8000 Zuerich",
        ));

        let result = run_export(
            &history,
            &encoder,
            dir.path(),
            NaiveDate::from_ymd_opt(2026, 8, 4).unwrap(),
        );

        assert_eq!(result, Err(ExportError::address_empty("01-162-8")));
        // no partial file
        let dta_files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with("DTA-"))
            .collect();
        assert!(dta_files.is_empty());
    }
}
