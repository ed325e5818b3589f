/// Every character that `.` or an inverted class `[^...]` may produce.
const REFERENCE_CHARACTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz1234567890',./|?><`~!#$%^&*()-_=+{}[]:;\"\\";

/// Repetition ceiling standing in for "unbounded" in `*`, `+` and `{m,}`.
pub const MAX_REPEAT: usize = 10;

/// The reference alphabet, sorted ascending by code point.
pub fn reference_alphabet() -> Vec<char> {
    let mut chars: Vec<char> = REFERENCE_CHARACTERS.chars().collect();
    chars.sort_unstable();
    chars
}
