//! Decoding of semantic fields from a validated code row
//!
//! All functions here are pure and total over the code row string:
//! decoding the same code twice yields identical fields, and malformed
//! rows (missing separators, unexpected content) produce the `"?"`
//! sentinel or `None` instead of an error.

use crate::types::{DecodedFields, PaymentCode, SlipKind, UNKNOWN_FIELD};
use rust_decimal::Decimal;

/// ESR type prefixes paying out in CHF
const CHF_TYPES: [u8; 5] = [1, 3, 4, 11, 14];

/// ESR type prefixes paying out in EUR
const EUR_TYPES: [u8; 4] = [21, 23, 31, 33];

impl DecodedFields {
    /// Decode the semantic fields of a validated code
    ///
    /// Dispatches on the slip kind encoded in the row itself: orange
    /// slips carry amount, currency, account and reference; red slips
    /// only encode the account.
    pub fn decode(code: &PaymentCode) -> DecodedFields {
        let raw = code.raw.as_str();

        match code.kind() {
            SlipKind::Orange => DecodedFields {
                account: account(raw),
                amount: amount(raw),
                currency: currency(raw),
                reference: reference(raw),
            },
            SlipKind::Red => DecodedFields {
                account: account(raw),
                amount: None,
                currency: UNKNOWN_FIELD.to_string(),
                reference: UNKNOWN_FIELD.to_string(),
            },
        }
    }
}

/// Amount encoded in the row, `None` when the slip carries none
///
/// Slips without an amount use a short first segment, recognizable by
/// the first `'>'` appearing within the first four characters. Otherwise
/// the ten digits at offset 2 are the amount in hundredths.
pub fn amount(raw: &str) -> Option<Decimal> {
    let index_of_terminator = raw.find('>')?;

    if index_of_terminator <= 3 {
        return None;
    }

    let cents: i64 = raw.get(2..12)?.parse().ok()?;
    Some(Decimal::new(cents, 2))
}

/// Currency selected by the two-digit slip type prefix
pub fn currency(raw: &str) -> String {
    let slip_type = raw.get(0..2).and_then(|prefix| prefix.parse::<u8>().ok());

    match slip_type {
        Some(t) if CHF_TYPES.contains(&t) => "CHF".to_string(),
        Some(t) if EUR_TYPES.contains(&t) => "EUR".to_string(),
        _ => UNKNOWN_FIELD.to_string(),
    }
}

/// Account in `prefix-indenture-digit` display form
///
/// The space-delimited block after the first space holds a 2-digit
/// prefix, a 6-digit indenture number (re-parsed as an integer to drop
/// leading zeros) and a trailing digit.
pub fn account(raw: &str) -> String {
    match account_parts(raw) {
        Some((prefix, indenture, trailing)) => format!("{}-{}-{}", prefix, indenture, trailing),
        None => UNKNOWN_FIELD.to_string(),
    }
}

/// The raw nine account digits after the first space, unformatted
///
/// Used verbatim in the DTA account field; empty when the row has no
/// account block.
pub fn account_unformatted(raw: &str) -> String {
    let Some(index_of_space) = raw.find(' ') else {
        return String::new();
    };

    raw.get(index_of_space + 1..index_of_space + 10)
        .unwrap_or_default()
        .to_string()
}

fn account_parts(raw: &str) -> Option<(&str, u32, &str)> {
    let index_of_space = raw.find(' ')?;
    let block = raw.get(index_of_space + 1..index_of_space + 10)?;

    if !block.is_ascii() {
        return None;
    }

    let prefix = &block[0..2];
    let indenture: u32 = block[2..8].parse().ok()?;
    let trailing = &block[8..9];

    Some((prefix, indenture, trailing))
}

/// Reference number, leading zeros stripped, grouped in blocks of five
///
/// The reference sits between the first `'>'` and the following `'+'`;
/// blocks are grouped from the right with the remainder leading.
pub fn reference(raw: &str) -> String {
    const BLOCK_SIZE: usize = 5;

    let Some(index_of_terminator) = raw.find('>') else {
        return UNKNOWN_FIELD.to_string();
    };

    let Some(index_of_plus) = raw.find('+') else {
        return UNKNOWN_FIELD.to_string();
    };

    if index_of_plus < index_of_terminator {
        return UNKNOWN_FIELD.to_string();
    }

    let reference = raw[index_of_terminator + 1..index_of_plus].trim_start_matches('0');

    if !reference.is_ascii() {
        return UNKNOWN_FIELD.to_string();
    }

    let head = reference.len() % BLOCK_SIZE;
    let mut grouped = reference[..head].to_string();

    for block in reference.as_bytes()[head..].chunks(BLOCK_SIZE) {
        if !grouped.is_empty() {
            grouped.push(' ');
        }
        // reference content is validated digits, always valid UTF-8
        grouped.push_str(std::str::from_utf8(block).unwrap_or_default());
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CodeFormat;
    use rstest::rstest;
    use std::str::FromStr;

    const EXAMPLE_CODE_ROW: &str = "0100003949753>210000000003139471430009017+ 010001628>";

    fn example_code() -> PaymentCode {
        PaymentCode {
            format: CodeFormat::Esr,
            raw: EXAMPLE_CODE_ROW.to_string(),
        }
    }

    #[test]
    fn test_decode_example_row() {
        let fields = DecodedFields::decode(&example_code());

        assert_eq!(fields.account, "01-162-8");
        assert_eq!(fields.amount, Some(Decimal::from_str("3949.75").unwrap()));
        assert_eq!(fields.currency, "CHF");
        assert_eq!(fields.reference, "21 00000 00003 13947 14300 09017");
    }

    #[test]
    fn test_decode_is_pure() {
        let code = example_code();
        assert_eq!(DecodedFields::decode(&code), DecodedFields::decode(&code));
    }

    #[rstest]
    #[case::encoded(EXAMPLE_CODE_ROW, Some("3949.75"))]
    #[case::not_encoded("042>123456789012345678901234567+ 010001628>", None)]
    #[case::no_terminator("0100003949753", None)]
    fn test_amount(#[case] raw: &str, #[case] expected: Option<&str>) {
        let expected = expected.map(|s| Decimal::from_str(s).unwrap());
        assert_eq!(amount(raw), expected);
    }

    #[rstest]
    #[case::chf_01("01", "CHF")]
    #[case::chf_03("03", "CHF")]
    #[case::chf_11("11", "CHF")]
    #[case::chf_14("14", "CHF")]
    #[case::eur_21("21", "EUR")]
    #[case::eur_33("33", "EUR")]
    #[case::unknown_99("99", "?")]
    #[case::non_digit("XX", "?")]
    fn test_currency(#[case] prefix: &str, #[case] expected: &str) {
        let raw = format!("{}{}", prefix, &EXAMPLE_CODE_ROW[2..]);
        assert_eq!(currency(&raw), expected);
    }

    #[rstest]
    #[case::example(EXAMPLE_CODE_ROW, "01-162-8")]
    #[case::no_space("0100003949753>21+", "?")]
    #[case::truncated_block("0100003949753> 0100", "?")]
    fn test_account(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(account(raw), expected);
    }

    #[test]
    fn test_account_unformatted() {
        assert_eq!(account_unformatted(EXAMPLE_CODE_ROW), "010001628");
        assert_eq!(account_unformatted("no-space-here"), "");
    }

    #[rstest]
    #[case::example(EXAMPLE_CODE_ROW, "21 00000 00003 13947 14300 09017")]
    #[case::plus_before_terminator("01+ 3949753>", "?")]
    #[case::no_terminator("0100003949753", "?")]
    #[case::multiple_of_five(">1234567890+", "12345 67890")]
    #[case::all_zeros(">000+", "")]
    fn test_reference(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(reference(raw), expected);
    }

    #[test]
    fn test_red_slip_decodes_account_only() {
        let code = PaymentCode {
            format: CodeFormat::EsIban,
            raw: "0100003949753+ 010001628>".to_string(),
        };

        let fields = DecodedFields::decode(&code);
        assert_eq!(fields.account, "01-162-8");
        assert_eq!(fields.amount, None);
        assert_eq!(fields.currency, "?");
        assert_eq!(fields.reference, "?");
    }
}
