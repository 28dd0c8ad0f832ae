//! Modulo-10 recursive check-digit computation
//!
//! Swiss payment slips protect every code-line segment with a single
//! trailing check digit computed by a 10-state transition automaton (a
//! Luhn-family algorithm). The functions here are pure; a non-digit in
//! the input is a validation failure, never a panic.

/// State transition table of the modulo-10 recursive automaton
///
/// `MODULO10[state][digit]` yields the next state; the initial state is 0.
const MODULO10: [[u8; 10]; 10] = [
    [0, 9, 4, 6, 8, 2, 7, 1, 3, 5],
    [9, 4, 6, 8, 2, 7, 1, 3, 5, 0],
    [4, 6, 8, 2, 7, 1, 3, 5, 0, 9],
    [6, 8, 2, 7, 1, 3, 5, 0, 9, 4],
    [8, 2, 7, 1, 3, 5, 0, 9, 4, 6],
    [2, 7, 1, 3, 5, 0, 9, 4, 6, 8],
    [7, 1, 3, 5, 0, 9, 4, 6, 8, 2],
    [1, 3, 5, 0, 9, 4, 6, 8, 2, 7],
    [3, 5, 0, 9, 4, 6, 8, 2, 7, 1],
    [5, 0, 9, 4, 6, 8, 2, 7, 1, 3],
];

/// Final lookup mapping the automaton's end state to the check digit
const CHECK_DIGIT: [u8; 10] = [0, 9, 8, 7, 6, 5, 4, 3, 2, 1];

/// Compute the check digit for a digit sequence
///
/// `digits` excludes the check digit itself; each element must be in
/// `0..=9` (guaranteed by [`digits_from_text`]).
pub fn check_digit(digits: &[u8]) -> u8 {
    let mut state = 0u8;

    for &digit in digits {
        state = MODULO10[state as usize][digit as usize];
    }

    CHECK_DIGIT[state as usize]
}

/// Map the first `length` characters of `text` to digit values
///
/// Returns `None` if `text` is shorter than `length` or any of those
/// characters is not an ASCII digit.
pub fn digits_from_text(text: &str, length: usize) -> Option<Vec<u8>> {
    let mut digits = Vec::with_capacity(length);

    for ch in text.chars().take(length) {
        digits.push(ch.to_digit(10)? as u8);
    }

    if digits.len() < length {
        return None;
    }

    Some(digits)
}

/// Check that the last of `digits` is the check digit of the preceding ones
pub fn verify(digits: &[u8]) -> bool {
    match digits.split_last() {
        Some((&declared, rest)) => check_digit(rest) == declared,
        None => false,
    }
}
