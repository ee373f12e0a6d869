//! Mobile number normalization: strip everything to digits, drop a leading
//! country code `1` off an 11-digit US number, and require exactly 10 digits
//! to call the result valid.

/// Normalize a raw phone string to a 10-digit string, or `None` if it cannot
/// be reduced to exactly 10 digits. Idempotent: re-normalizing an already
/// normalized value returns it unchanged.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let ten = match digits.len() {
        10 => digits,
        11 if digits.starts_with('1') => digits[1..].to_string(),
        _ => return None,
    };
    if ten.len() == 10 {
        Some(ten)
    } else {
        None
    }
}
