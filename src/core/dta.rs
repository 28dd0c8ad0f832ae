//! DTA batch file encoding
//!
//! Builds the fixed-width DTA bank-transfer file from a list of scanned
//! payments. The build is one-shot and synchronous: all entries are
//! validated first, the first violation in input order aborts the batch
//! with a specific error and no bytes are emitted. The output is a single
//! immutable Latin-1 byte blob with no inter-record newlines.
//!
//! Record layout: one TA826 (ESR payment) record per entry, each led by a
//! "01" header segment, followed by one closing TA890 total record.

use crate::core::decoder;
use crate::types::{BatchEntry, DecodedFields, ExportError, SenderProfile};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::Decimal;
use tracing::{info, warn};

/// Width of a short address field line
const ADDRESS_LINE_WIDTH: usize = 20;

/// Maximum number of address lines carried in a record
const ADDRESS_MAX_LINES: usize = 4;

/// Length of a Swiss IBAN after whitespace removal
const IBAN_LENGTH: usize = 21;

/// Encodes validated scan results into a DTA batch
///
/// Holds the sender-side configuration; `build` consumes a transient
/// entry list assembled from history for a single export operation.
#[derive(Debug)]
pub struct DtaEncoder {
    profile: SenderProfile,
}

impl DtaEncoder {
    /// Create an encoder for the given sender profile
    pub fn new(profile: SenderProfile) -> Self {
        DtaEncoder { profile }
    }

    /// Build the batch file bytes for `entries`
    ///
    /// Validates the sender profile, then every entry in input order
    /// (amount present, address syntax), then emits one TA826 record per
    /// CHF entry and the closing TA890 total record. Non-CHF entries are
    /// skipped. The first violation aborts the whole batch.
    ///
    /// # Arguments
    ///
    /// * `entries` - payments to include, in input order
    /// * `today` - creation date, also the base for the execution date
    ///
    /// # Errors
    ///
    /// Returns the `ExportError` for the first violated rule; no partial
    /// file is ever produced.
    pub fn build(&self, entries: &[BatchEntry], today: NaiveDate) -> Result<Vec<u8>, ExportError> {
        let iban: String = self
            .profile
            .iban
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if iban.is_empty() {
            return Err(ExportError::SenderIbanMissing);
        }

        validate_iban(&iban)?;

        let sender_lines = split_address_lines(&self.profile.address);

        if sender_lines.len() < 2 {
            return Err(ExportError::SenderAddressMissing);
        }

        // clearing number: IBAN digits 4..9, leading zeros dropped
        let clearing_span = &iban[4..9];
        let clearing = clearing_span
            .parse::<u32>()
            .map_err(|_| {
                let ch = clearing_span
                    .chars()
                    .find(|c| !c.is_ascii_digit())
                    .unwrap_or('?');
                ExportError::invalid_iban_character(&iban, ch)
            })?
            .to_string();

        // only CHF payments go into the batch; decoding dispatches on the
        // slip kind, so red rows (unknown currency) are skipped like any
        // non-CHF entry rather than misread as amount-carrying ESR rows
        let mut included = Vec::new();

        for entry in entries {
            let fields = DecodedFields::decode(&entry.code);

            if fields.currency == "CHF" {
                included.push((entry, fields));
            }
        }

        // validate all included entries before emitting anything
        let mut amounts = Vec::with_capacity(included.len());

        for (entry, fields) in &included {
            let mut amount = entry
                .amount
                .or(fields.amount)
                .ok_or_else(|| ExportError::amount_missing(&fields.account))?;
            amount.rescale(2);

            validate_address(&fields.account, &entry.address)?;
            amounts.push(amount);
        }

        let today_formatted = format_date(today);
        let execution_formatted = format_date(execution_date(today, self.profile.execution_day));

        let mut dta = String::with_capacity(included.len() * 384 + 128);
        let mut total = Decimal::ZERO;

        for (index, (entry, _)) in included.iter().enumerate() {
            let amount = amounts[index];
            total += amount;

            let sequence = format!("{:05}", index + 1);

            // header segment
            dta.push_str("01");
            dta.push_str(&execution_formatted);
            dta.push_str(&pad_space_end("", 12)); // target bank clearing, unused for ESR
            dta.push_str("00000");
            dta.push_str(&today_formatted);
            dta.push_str(&pad_space_end(&clearing, 7));
            dta.push_str("XXXXX"); // identification number
            dta.push_str(&sequence);
            dta.push_str("82600"); // transaction type 826, payment type 0, flag 0

            // segment 01: transaction, sender IBAN, amount
            dta.push_str("XXXXX");
            dta.push_str("WZ0000");
            dta.push_str(&sequence);
            dta.push_str(&pad_space_end(&iban, 24));
            dta.push_str(&pad_space_end("", 6)); // valuta, blank for ESR
            dta.push_str("CHF");
            dta.push_str(&pad_space_end(&amount.to_string().replace('.', ","), 12));
            dta.push_str(&pad_space_end("", 14)); // reserve

            // segment 02: sender address
            dta.push_str("02");
            dta.push_str(&pad_space_end(sender_lines[0], ADDRESS_LINE_WIDTH));
            dta.push_str(&pad_space_end(sender_lines[1], ADDRESS_LINE_WIDTH));

            let mut sender_extra = String::new();
            for line in sender_lines.iter().skip(2).take(2) {
                sender_extra.push_str(&pad_space_end(line, ADDRESS_LINE_WIDTH));
            }
            dta.push_str(&pad_space_end(&sender_extra, 40));
            dta.push_str(&pad_space_end("", 46)); // reserve

            // segment 03: beneficiary account, address and reference
            let account = decoder::account_unformatted(&entry.code.raw);

            dta.push_str("03");
            dta.push_str("/C/");
            dta.push_str(&padded(&account, '0', 9, false));

            let mut address_block = String::new();
            for line in split_address_lines(&entry.address)
                .iter()
                .take(ADDRESS_MAX_LINES)
            {
                address_block.push_str(&pad_space_end(line, ADDRESS_LINE_WIDTH));
            }
            dta.push_str(&pad_space_end(&address_block, 80));

            let reference: String = decoder::reference(&entry.code.raw)
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();

            if account.len() > 5 {
                dta.push_str(&padded(&reference, '0', 27, false));
            } else {
                // 5-digit accounts would need the ESR checksum field
                warn!(%account, "account only 5 digits long, bank will reject this record");
                dta.push_str(&pad_space_end(&reference, 27));
            }

            dta.push_str("  "); // ESR checksum, only used with 5-digit accounts
            dta.push_str(&pad_space_end("", 5)); // reserve
        }

        // closing TA890 total record
        dta.push_str("01");
        dta.push_str("000000"); // execution date, zeroed in the total record
        dta.push_str(&pad_space_end("", 12));
        dta.push_str("00000");
        dta.push_str(&today_formatted);
        dta.push_str(&pad_space_end("", 7));
        dta.push_str("XXXXX");
        dta.push_str(&format!("{:05}", included.len() + 1));
        dta.push_str("89000"); // transaction type 890

        total.rescale(3);
        dta.push_str(&pad_space_end(&total.to_string().replace('.', ","), 16));
        dta.push_str(&pad_space_end("", 59)); // reserve

        info!(
            entries = included.len(),
            total = %total,
            "DTA batch assembled"
        );

        Ok(encode_latin1(&dta))
    }
}

/// Next occurrence of day-of-month `day` on or after `today`
///
/// Rolls to the next month (with year rollover) when the day has already
/// passed, skipping months without that day. Falls on a weekend are
/// shifted to the following Monday.
pub fn execution_date(today: NaiveDate, day: u8) -> NaiveDate {
    let day = u32::from(day).clamp(1, 31);
    let mut year = today.year();
    let mut month = today.month();

    let date = loop {
        if let Some(candidate) = NaiveDate::from_ymd_opt(year, month, day) {
            if candidate >= today {
                break candidate;
            }
        }

        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    };

    match date.weekday() {
        Weekday::Sat => date + Duration::days(2),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    }
}

/// Validate an IBAN via the standard mod-97 check
///
/// The first four characters move to the end, letters map to two-digit
/// numbers, and the resulting digit string modulo 97 must equal 1.
/// Computed by digit-wise folding, no big integers involved.
///
/// # Errors
///
/// A specific error for wrong length, an unmappable character, or a
/// checksum mismatch.
pub fn validate_iban(iban: &str) -> Result<(), ExportError> {
    if iban.chars().count() != IBAN_LENGTH {
        return Err(ExportError::invalid_iban_length(iban));
    }

    let rearranged = iban.chars().skip(4).chain(iban.chars().take(4));
    let mut remainder: u32 = 0;

    for ch in rearranged {
        match ch {
            '0'..='9' => {
                remainder = (remainder * 10 + (ch as u32 - '0' as u32)) % 97;
            }
            'A'..='Z' => {
                remainder = (remainder * 100 + (10 + ch as u32 - 'A' as u32)) % 97;
            }
            _ => return Err(ExportError::invalid_iban_character(iban, ch)),
        }
    }

    if remainder != 1 {
        return Err(ExportError::invalid_iban_checksum(iban));
    }

    Ok(())
}

/// Validate the syntax of a beneficiary address
///
/// The address must be non-empty, at most 4 lines of at most 20
/// characters each, and encodable in Latin-1. `account` only labels the
/// error.
pub fn validate_address(account: &str, address: &str) -> Result<(), ExportError> {
    let lines = split_address_lines(address);

    if lines.is_empty() {
        return Err(ExportError::address_empty(account));
    }

    if lines.len() > ADDRESS_MAX_LINES {
        return Err(ExportError::too_many_address_lines(account, lines.len()));
    }

    for line in lines {
        if line.chars().count() > ADDRESS_LINE_WIDTH {
            return Err(ExportError::address_line_too_long(account, line));
        }

        if let Some(ch) = line.chars().find(|c| *c as u32 > 0xFF) {
            return Err(ExportError::address_not_encodable(account, ch));
        }
    }

    Ok(())
}

/// Split an address into its non-empty lines
fn split_address_lines(address: &str) -> Vec<&str> {
    address
        .split(['\r', '\n'])
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Encode text as Latin-1 bytes, `'?'` for characters above U+00FF
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| {
            let point = ch as u32;
            if point <= 0xFF {
                point as u8
            } else {
                b'?'
            }
        })
        .collect()
}

fn format_date(date: NaiveDate) -> String {
    date.format("%y%m%d").to_string()
}

/// Space-pad `text` at the end to `length`, truncating if longer
fn pad_space_end(text: &str, length: usize) -> String {
    padded(text, ' ', length, true)
}

/// Pad `text` with `pad` to `length`, at the end or the start
///
/// Text longer than the field is truncated to the declared width.
fn padded(text: &str, pad: char, length: usize, pad_end: bool) -> String {
    // widths count characters; after Latin-1 encoding that is bytes
    let count = text.chars().count();

    if count > length {
        return text.chars().take(length).collect();
    }

    let padding: String = std::iter::repeat(pad).take(length - count).collect();

    if pad_end {
        format!("{}{}", text, padding)
    } else {
        format!("{}{}", padding, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CodeFormat, PaymentCode};
    use rstest::rstest;
    use std::str::FromStr;

    const EXAMPLE_CODE_ROW: &str = "0100003949753>210000000003139471430009017+ 010001628>";
    const VALID_IBAN: &str = "CH9300762011623852957";

    fn profile() -> SenderProfile {
        SenderProfile::new(VALID_IBAN, "Max Muster\nBahnhofstrasse 1\n8001 Zuerich")
    }

    fn entry() -> BatchEntry {
        BatchEntry {
            code: PaymentCode {
                format: CodeFormat::Esr,
                raw: EXAMPLE_CODE_ROW.to_string(),
            },
            amount: None,
            address: "Hans Beispiel\nDorfweg 2\n3000 Bern".to_string(),
        }
    }

    fn today() -> NaiveDate {
        // a Tuesday
        NaiveDate::from_ymd_opt(2026, 8, 4).unwrap()
    }

    // ---- padding ----

    #[rstest]
    #[case::pad_end("ab", ' ', 5, true, "ab   ")]
    #[case::pad_start("42", '0', 5, false, "00042")]
    #[case::exact("abcde", ' ', 5, true, "abcde")]
    #[case::truncates("abcdefgh", ' ', 5, true, "abcde")]
    #[case::empty("", 'X', 3, true, "XXX")]
    fn test_padded(
        #[case] text: &str,
        #[case] pad: char,
        #[case] length: usize,
        #[case] pad_end: bool,
        #[case] expected: &str,
    ) {
        assert_eq!(padded(text, pad, length, pad_end), expected);
    }

    // ---- IBAN ----

    #[rstest]
    #[case::valid(VALID_IBAN, Ok(()))]
    #[case::too_short("CH93", Err(ExportError::invalid_iban_length("CH93")))]
    #[case::bad_checksum(
        "CH9300762011623852958",
        Err(ExportError::invalid_iban_checksum("CH9300762011623852958"))
    )]
    #[case::bad_character(
        "CH93007620116238529-7",
        Err(ExportError::invalid_iban_character("CH93007620116238529-7", '-'))
    )]
    fn test_validate_iban(#[case] iban: &str, #[case] expected: Result<(), ExportError>) {
        assert_eq!(validate_iban(iban), expected);
    }

    // ---- address ----

    #[rstest]
    #[case::two_lines("Max Muster\n8000 Zuerich", Ok(()))]
    #[case::crlf("Max Muster\r\n8000 Zuerich", Ok(()))]
    #[case::empty("", Err(ExportError::address_empty("01-162-8")))]
    #[case::five_lines(
        "a\nb\nc\nd\ne",
        Err(ExportError::too_many_address_lines("01-162-8", 5))
    )]
    #[case::long_line(
        "this line is longer than twenty",
        Err(ExportError::address_line_too_long("01-162-8", "this line is longer than twenty"))
    )]
    #[case::not_latin1(
        "Bäckerei Müller\n中山路 5",
        Err(ExportError::address_not_encodable("01-162-8", '中'))
    )]
    fn test_validate_address(#[case] address: &str, #[case] expected: Result<(), ExportError>) {
        assert_eq!(validate_address("01-162-8", address), expected);
    }

    // ---- execution date ----

    #[rstest]
    #[case::later_this_month(2026, 8, 4, 26, 2026, 8, 26)]
    #[case::same_day(2026, 8, 26, 26, 2026, 8, 26)]
    #[case::next_month(2026, 8, 27, 26, 2026, 9, 28)] // 26.9. is a Saturday -> Monday
    #[case::year_rollover(2025, 12, 29, 26, 2026, 1, 26)]
    #[case::saturday_shift(2026, 8, 1, 1, 2026, 8, 3)] // 1.8. is a Saturday
    #[case::same_month_late_day(2026, 1, 30, 30, 2026, 1, 30)]
    fn test_execution_date(
        #[case] y: i32,
        #[case] m: u32,
        #[case] d: u32,
        #[case] day: u8,
        #[case] ey: i32,
        #[case] em: u32,
        #[case] ed: u32,
    ) {
        let today = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        let expected = NaiveDate::from_ymd_opt(ey, em, ed).unwrap();
        assert_eq!(execution_date(today, day), expected);
    }

    #[test]
    fn test_execution_date_skips_february_31() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        // no 31st in February, first hit is March
        assert_eq!(
            execution_date(today, 31),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()
        );
    }

    // ---- latin-1 ----

    #[test]
    fn test_encode_latin1() {
        assert_eq!(encode_latin1("ABC"), b"ABC".to_vec());
        assert_eq!(encode_latin1("Müller"), vec![b'M', 0xFC, b'l', b'l', b'e', b'r']);
        assert_eq!(encode_latin1("中"), vec![b'?']);
    }

    // ---- batch build ----

    #[test]
    fn test_build_single_entry_layout() {
        let encoder = DtaEncoder::new(profile());
        let bytes = encoder.build(&[entry()], today()).unwrap();
        let dta = String::from_utf8(bytes).unwrap();

        // header segment
        assert_eq!(&dta[0..2], "01");
        assert_eq!(&dta[2..8], "260826"); // execution date 26.8.2026
        assert_eq!(&dta[20..25], "00000");
        assert_eq!(&dta[25..31], "260804"); // creation date
        assert_eq!(&dta[31..38], "762    "); // clearing from IBAN digits 4..9
        assert_eq!(&dta[38..43], "XXXXX");
        assert_eq!(&dta[43..48], "00001");
        assert_eq!(&dta[48..53], "82600");

        // segment 01
        assert_eq!(&dta[53..58], "XXXXX");
        assert_eq!(&dta[58..64], "WZ0000");
        assert_eq!(&dta[64..69], "00001");
        assert_eq!(&dta[69..93], format!("{:<24}", VALID_IBAN));
        assert_eq!(&dta[99..102], "CHF");
        assert_eq!(&dta[102..114], "3949,75     ");

        // segment 02 begins after the 14-byte reserve
        assert_eq!(&dta[128..130], "02");
        assert_eq!(&dta[130..150], "Max Muster          ");

        // segment 03: account and reference
        let seg03 = dta.find("03/C/").expect("segment 03 present");
        assert_eq!(&dta[seg03 + 5..seg03 + 14], "010001628");
        let reference_field = &dta[seg03 + 14 + 80..seg03 + 14 + 80 + 27];
        assert_eq!(reference_field, "210000000003139471430009017");

        // total record closes the file
        let total_record = &dta[dta.len() - 128..];
        assert_eq!(&total_record[0..8], "01000000");
        assert_eq!(&total_record[25..31], "260804");
        assert_eq!(&total_record[38..43], "XXXXX");
        assert_eq!(&total_record[43..48], "00002");
        assert_eq!(&total_record[48..53], "89000");
        assert_eq!(&total_record[53..69], "3949,750        ");
    }

    #[test]
    fn test_build_skips_non_chf_entries() {
        let mut eur = entry();
        eur.code.raw = format!("21{}", &EXAMPLE_CODE_ROW[2..]);
        eur.amount = Some(Decimal::from_str("10.00").unwrap());

        let encoder = DtaEncoder::new(profile());
        let bytes = encoder.build(&[eur, entry()], today()).unwrap();
        let dta = String::from_utf8(bytes).unwrap();

        // only one TA826 record: total record sequence is 00002
        assert_eq!(dta.matches("82600").count(), 1);
        assert!(dta.contains("0000289000"));
    }

    #[test]
    fn test_build_skips_red_slip_rows() {
        // a red row starts with digits too; a prefix that happens to look
        // like a CHF slip type must not smuggle an invented amount into
        // the batch
        let mut red = entry();
        red.code.format = CodeFormat::EsIban;
        red.code.raw = "0123456789012345678901234567+ 010001628>".to_string();
        red.amount = None;

        let encoder = DtaEncoder::new(profile());
        let bytes = encoder.build(&[red], today()).unwrap();
        let dta = String::from_utf8(bytes).unwrap();

        // only the total record, no TA826 and no amount read off the row
        assert_eq!(dta.len(), 128);
        assert!(!dta.contains("82600"));
        assert!(!dta.contains("23456789,01"));
    }

    #[test]
    fn test_build_amount_override_takes_precedence() {
        let mut overridden = entry();
        overridden.amount = Some(Decimal::from_str("12.30").unwrap());

        let encoder = DtaEncoder::new(profile());
        let bytes = encoder.build(&[overridden], today()).unwrap();
        let dta = String::from_utf8(bytes).unwrap();

        assert!(dta.contains("12,30"));
        assert!(!dta.contains("3949,75 "));
    }

    #[rstest]
    #[case::iban_missing("", ExportError::SenderIbanMissing)]
    #[case::iban_invalid("CH9300762011623852958", ExportError::invalid_iban_checksum("CH9300762011623852958"))]
    fn test_build_rejects_bad_sender_iban(#[case] iban: &str, #[case] expected: ExportError) {
        let mut profile = profile();
        profile.iban = iban.to_string();

        let encoder = DtaEncoder::new(profile);
        assert_eq!(encoder.build(&[entry()], today()), Err(expected));
    }

    #[test]
    fn test_build_rejects_single_line_sender_address() {
        let mut profile = profile();
        profile.address = "Max Muster".to_string();

        let encoder = DtaEncoder::new(profile);
        assert_eq!(
            encoder.build(&[entry()], today()),
            Err(ExportError::SenderAddressMissing)
        );
    }

    #[test]
    fn test_build_surfaces_first_bad_entry_and_emits_nothing() {
        let good = entry();
        let mut first_bad = entry();
        first_bad.address = String::new();
        let mut second_bad = entry();
        second_bad.address = "a\nb\nc\nd\ne".to_string();

        let encoder = DtaEncoder::new(profile());
        let result = encoder.build(&[good, first_bad, second_bad], today());

        assert_eq!(result, Err(ExportError::address_empty("01-162-8")));
    }

    #[test]
    fn test_build_rejects_missing_amount() {
        // a code row without an encoded amount and no override
        let mut no_amount = entry();
        no_amount.code.raw = format!("042>{}", &EXAMPLE_CODE_ROW[14..]);

        let encoder = DtaEncoder::new(profile());
        let result = encoder.build(&[no_amount], today());

        assert!(matches!(result, Err(ExportError::AmountMissing { .. })));
    }

    #[test]
    fn test_build_empty_batch_still_emits_total_record() {
        let encoder = DtaEncoder::new(profile());
        let bytes = encoder.build(&[], today()).unwrap();
        let dta = String::from_utf8(bytes).unwrap();

        assert_eq!(dta.len(), 128);
        assert!(dta.contains("0000189000"));
        assert!(dta.contains("0,000"));
    }
}
