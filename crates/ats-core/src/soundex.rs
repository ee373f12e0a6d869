//! American Soundex, used by name search for phonetic equality.

/// Compute the four-character Soundex code for a name token.
///
/// Standard algorithm: keep the first letter, map remaining letters to digit
/// codes (dropping vowels and `h`/`w`/`y`), collapse adjacent duplicates, pad
/// or truncate to four characters.
pub fn soundex(input: &str) -> String {
    let letters: Vec<char> = input.chars().filter(|c| c.is_ascii_alphabetic()).collect();
    if letters.is_empty() {
        return String::new();
    }

    let code = |c: char| -> Option<u8> {
        match c.to_ascii_uppercase() {
            'B' | 'F' | 'P' | 'V' => Some(b'1'),
            'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => Some(b'2'),
            'D' | 'T' => Some(b'3'),
            'L' => Some(b'4'),
            'M' | 'N' => Some(b'5'),
            'R' => Some(b'6'),
            _ => None, // vowels, H, W, Y
        }
    };

    let first = letters[0].to_ascii_uppercase();
    let mut out = String::new();
    out.push(first);

    let mut last_code = code(first);
    for &ch in &letters[1..] {
        let this_code = code(ch);
        if let Some(c) = this_code {
            if this_code != last_code {
                out.push(c as char);
            }
        }
        // H and W do not break a duplicate-consonant run; any other
        // non-coded letter (a vowel) resets it.
        if !matches!(ch.to_ascii_uppercase(), 'H' | 'W') {
            last_code = this_code;
        }
        if out.len() == 4 {
            break;
        }
    }

    while out.len() < 4 {
        out.push('0');
    }
    out
}

/// Soundex-prefix comparison: the first two characters (first letter + first
/// code digit) match, used as a weaker phonetic signal than full equality.
pub fn soundex_prefix_matches(a: &str, b: &str) -> bool {
    let sa = soundex(a);
    let sb = soundex(b);
    sa.len() >= 2 && sb.len() >= 2 && sa[..2] == sb[..2]
}
