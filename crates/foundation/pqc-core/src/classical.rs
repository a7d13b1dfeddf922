//! Classical Ciphers
//!
//! Caesar and Vigenère over the 26-letter alphabet. Input is always
//! normalized first: uppercased, with everything outside A-Z dropped.
//! Punctuation, digits and whitespace do not survive a round trip.

/// The fixed cipher alphabet
pub const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const LETTERS: u8 = 26;

/// Position of an uppercase letter in [`ALPHABET`]
pub fn index_of(c: char) -> Option<u8> {
    if c.is_ascii_uppercase() {
        Some(c as u8 - b'A')
    } else {
        None
    }
}

/// Letter at `idx`, wrapping past Z
pub fn letter_at(idx: u8) -> char {
    ALPHABET[(idx % LETTERS) as usize] as char
}

/// Uppercase and strip every character that is not A-Z.
pub fn normalize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_uppercase)
        .filter(char::is_ascii_uppercase)
        .collect()
}

fn shift_letters(normalized: &str, shift: u8) -> String {
    normalized
        .chars()
        .filter_map(index_of)
        .map(|idx| letter_at(idx + shift))
        .collect()
}

// ═══════════════════════════════════════════════════════════
// CAESAR CIPHER
// ═══════════════════════════════════════════════════════════

/// Any signed shift reduced into 0..26
pub fn normalize_shift(shift: i64) -> u8 {
    shift.rem_euclid(LETTERS as i64) as u8
}

pub fn caesar_encrypt(text: &str, shift: i64) -> String {
    shift_letters(&normalize(text), normalize_shift(shift))
}

pub fn caesar_decrypt(text: &str, shift: i64) -> String {
    // Reduce before negating so i64::MIN cannot overflow.
    caesar_encrypt(text, -(normalize_shift(shift) as i64))
}

/// Every Caesar decryption of `text`, shift 0 through 25
pub fn caesar_bruteforce(text: &str) -> Vec<(u8, String)> {
    let normalized = normalize(text);
    (0..LETTERS)
        .map(|shift| (shift, shift_letters(&normalized, (LETTERS - shift) % LETTERS)))
        .collect()
}

// ═══════════════════════════════════════════════════════════
// VIGENÈRE CIPHER
// ═══════════════════════════════════════════════════════════

fn key_shifts(key: &str) -> Vec<u8> {
    normalize(key).chars().filter_map(index_of).collect()
}

/// Encrypt with a repeating key. An empty key (after normalization) leaves
/// the normalized text unchanged.
pub fn vigenere_encrypt(text: &str, key: &str) -> String {
    let shifts = key_shifts(key);
    let normalized = normalize(text);
    if shifts.is_empty() {
        return normalized;
    }

    normalized
        .chars()
        .filter_map(index_of)
        .zip(shifts.iter().cycle())
        .map(|(idx, &s)| letter_at(idx + s))
        .collect()
}

pub fn vigenere_decrypt(text: &str, key: &str) -> String {
    let shifts = key_shifts(key);
    let normalized = normalize(text);
    if shifts.is_empty() {
        return normalized;
    }

    normalized
        .chars()
        .filter_map(index_of)
        .zip(shifts.iter().cycle())
        .map(|(idx, &s)| letter_at(idx + LETTERS - s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Meet at noon!"), "MEETATNOON");
        assert_eq!(normalize("r2-d2 & c3po"), "RDCPO");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("123 ..."), "");
    }

    #[test]
    fn test_caesar_known_vector() {
        assert_eq!(caesar_encrypt("MEET AT NOON", 3), "PHHWDWQRRQ");
        assert_eq!(caesar_decrypt("PHHWDWQRRQ", 3), "MEETATNOON");
    }

    #[test]
    fn test_caesar_wraparound() {
        assert_eq!(caesar_encrypt("xyz", 3), "ABC");
        assert_eq!(caesar_encrypt("ABC", -3), "XYZ");
        assert_eq!(caesar_encrypt("HELLO", 26), caesar_encrypt("HELLO", 0));
        assert_eq!(caesar_encrypt("HELLO", 0), "HELLO");
        assert_eq!(caesar_encrypt("HELLO", 29), caesar_encrypt("HELLO", 3));
        assert_eq!(caesar_encrypt("HELLO", -23), caesar_encrypt("HELLO", 3));
    }

    #[test]
    fn test_caesar_round_trip_any_shift() {
        let text = "The quick brown fox, 1 lazy dog.";
        for shift in [-1000, -27, -26, -13, -1, 0, 1, 13, 25, 26, 27, 1000, i64::MAX, i64::MIN] {
            let cipher = caesar_encrypt(text, shift);
            assert_eq!(caesar_decrypt(&cipher, shift), normalize(text), "shift {shift}");
        }
    }

    #[test]
    fn test_caesar_empty() {
        assert_eq!(caesar_encrypt("", 5), "");
        assert_eq!(caesar_decrypt("!!!", 5), "");
    }

    #[test]
    fn test_caesar_bruteforce() {
        let candidates = caesar_bruteforce("PHHWDWQRRQ");
        assert_eq!(candidates.len(), 26);
        assert_eq!(candidates[0], (0, "PHHWDWQRRQ".to_string()));
        assert_eq!(candidates[3], (3, "MEETATNOON".to_string()));
    }

    #[test]
    fn test_vigenere_known_vector() {
        assert_eq!(vigenere_encrypt("ATTACKATDAWN", "LEMON"), "LXFOPVEFRNHR");
        assert_eq!(vigenere_encrypt("attack at dawn", "lemon"), "LXFOPVEFRNHR");
        assert_eq!(vigenere_decrypt("LXFOPVEFRNHR", "LEMON"), "ATTACKATDAWN");
    }

    #[test]
    fn test_vigenere_key_is_normalized() {
        assert_eq!(
            vigenere_encrypt("ATTACKATDAWN", "le-mon 42"),
            vigenere_encrypt("ATTACKATDAWN", "LEMON")
        );
    }

    #[test]
    fn test_vigenere_empty_key_is_identity() {
        assert_eq!(vigenere_encrypt("Attack at dawn", ""), "ATTACKATDAWN");
        assert_eq!(vigenere_decrypt("Attack at dawn", ""), "ATTACKATDAWN");
        assert_eq!(vigenere_encrypt("Attack at dawn", "1234 !"), "ATTACKATDAWN");
    }

    #[test]
    fn test_vigenere_round_trip() {
        let text = "Post-quantum cryptography, grade 10.";
        for key in ["A", "KEY", "LEMON", "zz", "a much longer key than the text itself"] {
            let cipher = vigenere_encrypt(text, key);
            assert_eq!(vigenere_decrypt(&cipher, key), normalize(text), "key {key}");
        }
    }

    #[test]
    fn test_single_letter_key_matches_caesar() {
        assert_eq!(vigenere_encrypt("MEET AT NOON", "D"), caesar_encrypt("MEET AT NOON", 3));
    }

    #[test]
    fn test_alphabet_helpers() {
        assert_eq!(index_of('A'), Some(0));
        assert_eq!(index_of('Z'), Some(25));
        assert_eq!(index_of('a'), None);
        assert_eq!(letter_at(0), 'A');
        assert_eq!(letter_at(27), 'B');
        assert_eq!(normalize_shift(-1), 25);
    }
}
