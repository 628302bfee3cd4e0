//! Identifier codec: converts link ids to short codes and back.
//!
//! A short code is the id written as a positional numeral in base N, where N
//! is the alphabet length and each alphabet character is one digit.

use crate::{Alphabet, CoreError};

/// Number of digits `encode(n, alphabet)` produces.
pub fn encoded_len(mut n: u64, alphabet: &Alphabet) -> usize {
    let radix = alphabet.radix();
    let mut len = 1;
    while n >= radix {
        n /= radix;
        len += 1;
    }
    len
}

/// Encode `n` using `alphabet` as the digit set, most significant digit
/// first. Zero encodes to the alphabet's zero digit.
pub fn encode(mut n: u64, alphabet: &Alphabet) -> String {
    let radix = alphabet.radix();
    let symbols = alphabet.symbols();
    let mut digits = Vec::with_capacity(encoded_len(n, alphabet));
    loop {
        digits.push(symbols[(n % radix) as usize]);
        n /= radix;
        if n == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}

/// Decode a short code back to its id.
///
/// Every character is checked against `alphabet` before any arithmetic, so a
/// foreign character is reported even when the digits before it would
/// overflow. Leading zero digits are accepted and do not change the value.
pub fn decode(code: &str, alphabet: &Alphabet) -> Result<u64, CoreError> {
    if code.is_empty() {
        return Err(CoreError::EmptyCode);
    }
    let digits = code
        .chars()
        .enumerate()
        .map(|(position, character)| {
            alphabet
                .index_of(character)
                .ok_or(CoreError::InvalidCharacter {
                    character,
                    position,
                })
        })
        .collect::<Result<Vec<u64>, CoreError>>()?;
    let radix = alphabet.radix();
    digits.into_iter().try_fold(0u64, |total, digit| {
        total
            .checked_mul(radix)
            .and_then(|t| t.checked_add(digit))
            .ok_or(CoreError::IdentifierOverflow)
    })
}

/// True when `code` is exactly what `encode` would produce for its value:
/// non-empty, alphabet-only, and free of redundant leading zero digits.
pub fn is_canonical(code: &str, alphabet: &Alphabet) -> bool {
    if decode(code, alphabet).is_err() {
        return false;
    }
    let mut chars = code.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(_)) => first != alphabet.zero(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_known_vectors_base62() {
        let a = Alphabet::base62();
        assert_eq!(encode(0, &a), "0");
        assert_eq!(encode(35, &a), "z");
        assert_eq!(encode(61, &a), "Z");
        assert_eq!(encode(62, &a), "10");
        assert_eq!(encode(63, &a), "11");
        assert_eq!(encode(3843, &a), "ZZ"); // 62*62-1
        assert_eq!(encode(1337, &a), "lz");
    }

    #[test]
    fn encodes_known_vectors_base36() {
        let a = Alphabet::base36();
        assert_eq!(encode(35, &a), "z");
        assert_eq!(encode(36, &a), "10");
        assert_eq!(encode(1337, &a), "115");
        assert_eq!(decode("115", &a).unwrap(), 1337);
    }

    #[test]
    fn consonant_alphabet_is_stable() {
        let a = Alphabet::new("0123456789bcdfghjklmnpqrstvwxyz").unwrap();
        assert_eq!(a.len(), 31);
        let code = encode(1337, &a);
        assert_eq!(code, "1d4");
        assert_eq!(decode(&code, &a).unwrap(), 1337);
        // Same input, same output.
        assert_eq!(encode(1337, &a), code);
    }

    #[test]
    fn zero_is_single_zero_digit() {
        for charset in ["01", "xyz", "0123456789bcdfghjklmnpqrstvwxyz", "]^-\\"] {
            let a = Alphabet::new(charset).unwrap();
            assert_eq!(encode(0, &a), a.zero().to_string());
            assert_eq!(decode(&a.zero().to_string(), &a).unwrap(), 0);
        }
    }

    #[test]
    fn binary_alphabet() {
        let a = Alphabet::new("01").unwrap();
        assert_eq!(encode(5, &a), "101");
        assert_eq!(encode(u64::MAX, &a), "1".repeat(64));
        assert_eq!(decode(&"1".repeat(64), &a).unwrap(), u64::MAX);
    }

    #[test]
    fn non_ascii_alphabet() {
        let a = Alphabet::new("αβγδ").unwrap();
        assert_eq!(encode(4, &a), "βα");
        assert_eq!(decode("βα", &a).unwrap(), 4);
    }

    #[test]
    fn max_value_round_trips() {
        for a in [Alphabet::base36(), Alphabet::base62()] {
            let code = encode(u64::MAX, &a);
            assert_eq!(code.chars().count(), encoded_len(u64::MAX, &a));
            assert_eq!(decode(&code, &a).unwrap(), u64::MAX);
        }
    }

    #[test]
    fn decode_rejects_foreign_character() {
        let a = Alphabet::base36();
        let err = decode("ab-c", &a).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidCharacter {
                character: '-',
                position: 2
            }
        );
        // Uppercase is outside the base36 preset.
        assert!(matches!(
            decode("A", &a),
            Err(CoreError::InvalidCharacter { position: 0, .. })
        ));
    }

    #[test]
    fn decode_reports_first_offender() {
        let a = Alphabet::base36();
        let err = decode("a!?", &a).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidCharacter {
                character: '!',
                position: 1
            }
        );
    }

    #[test]
    fn decode_rejects_empty() {
        assert_eq!(decode("", &Alphabet::base62()), Err(CoreError::EmptyCode));
    }

    #[test]
    fn decode_detects_overflow() {
        let a = Alphabet::base36();
        let too_big = format!("{}0", encode(u64::MAX, &a));
        assert_eq!(decode(&too_big, &a), Err(CoreError::IdentifierOverflow));

        let b = Alphabet::new("01").unwrap();
        let two_pow_64 = format!("1{}", "0".repeat(64));
        assert_eq!(decode(&two_pow_64, &b), Err(CoreError::IdentifierOverflow));
    }

    #[test]
    fn foreign_character_wins_over_overflow() {
        let a = Alphabet::base36();
        let code = format!("{}!", "z".repeat(20));
        assert_eq!(
            decode(&code, &a),
            Err(CoreError::InvalidCharacter {
                character: '!',
                position: 20
            })
        );
        assert!(matches!(
            a.decode(&format!("{}-zz", "z".repeat(30))),
            Err(CoreError::InvalidCharacter { character: '-', .. })
        ));
        // Without a foreign character the same prefix overflows.
        assert_eq!(decode(&"z".repeat(20), &a), Err(CoreError::IdentifierOverflow));
    }

    #[test]
    fn leading_zero_digits_are_not_canonical() {
        let a = Alphabet::base36();
        assert_eq!(decode("00z", &a).unwrap(), 35);
        assert!(!is_canonical("00z", &a));
        assert!(is_canonical("z", &a));
        assert!(is_canonical("0", &a));
        assert!(!is_canonical("", &a));
        assert!(!is_canonical("Z", &a));
    }

    #[test]
    fn encoded_len_matches_digit_count() {
        let a = Alphabet::base62();
        assert_eq!(encoded_len(0, &a), 1);
        assert_eq!(encoded_len(61, &a), 1);
        assert_eq!(encoded_len(62, &a), 2);
        assert_eq!(encoded_len(3843, &a), 2);
        assert_eq!(encoded_len(3844, &a), 3);
    }

    #[test]
    fn alphabet_shorthands_delegate() {
        let a = Alphabet::base62();
        assert_eq!(a.encode(1337), encode(1337, &a));
        assert_eq!(a.decode("lz").unwrap(), 1337);
    }
}
