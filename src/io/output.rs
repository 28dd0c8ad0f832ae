//! Scan output and batch file writing
//!
//! Decoded scan results go out as CSV (one row per completed code); the
//! DTA batch goes to a file named `DTA-<unix-millis>.001`, written once
//! as a single byte blob.

use crate::types::{DecodedFields, ExportError, PaymentCode, SlipKind};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Write decoded codes to CSV format
///
/// Columns: `code,type,account,amount,currency,reference`. The amount
/// column is empty when the slip encodes none.
///
/// # Arguments
///
/// * `codes` - completed codes with their decoded fields, in scan order
/// * `output` - writer receiving the CSV
pub fn write_decoded_csv(
    codes: &[(PaymentCode, DecodedFields)],
    output: &mut dyn Write,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["code", "type", "account", "amount", "currency", "reference"])?;

    for (code, fields) in codes {
        let kind = match code.kind() {
            SlipKind::Orange => "orange",
            SlipKind::Red => "red",
        };

        writer.write_record(&[
            code.raw.clone(),
            kind.to_string(),
            fields.account.clone(),
            fields
                .amount
                .map(|amount| format!("{:.2}", amount))
                .unwrap_or_default(),
            fields.currency.clone(),
            fields.reference.clone(),
        ])?;
    }

    writer.flush().map_err(|e| ExportError::IoError {
        message: format!("failed to flush output: {}", e),
    })?;

    Ok(())
}

/// Save a DTA byte blob under `dir`
///
/// The filename is `DTA-` plus the current Unix timestamp in
/// milliseconds plus the fixed `.001` extension. The file is written
/// once; there is no append protocol.
///
/// # Returns
///
/// The path of the written file.
pub fn save_dta(dir: &Path, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();

    let path = dir.join(format!("DTA-{}.001", millis));
    fs::write(&path, bytes)?;

    Ok(path)
}
