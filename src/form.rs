//! Input formatting for quote form fields.

/// Korean mobile/landline digits are at most 11 long.
const MAX_PHONE_DIGITS: usize = 11;

/// Format a phone number the way the quote form does while typing.
///
/// Non-digits are dropped and the result is capped at 11 digits, then grouped
/// as `3-4-rest` (more than 6 digits) or `3-rest` (more than 3).
pub fn format_phone(input: &str) -> String {
    let digits: String = input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(MAX_PHONE_DIGITS)
        .collect();

    // All ASCII, so byte slicing is safe.
    if digits.len() > 6 {
        let split = digits.len().min(7);
        format!("{}-{}-{}", &digits[..3], &digits[3..split], &digits[split..])
    } else if digits.len() > 3 {
        format!("{}-{}", &digits[..3], &digits[3..])
    } else {
        digits
    }
}
