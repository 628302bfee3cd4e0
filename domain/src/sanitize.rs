//! Keyword sanitizer. Cleans or rejects externally supplied short codes
//! before they reach the codec.

use regex::Regex;
use tracing::debug;

use crate::codec;
use crate::pattern::build_validation_pattern;
use crate::{Alphabet, CoreError};

/// Longest keyword `sanitize` will return, in characters.
pub const MAX_KEYWORD_LENGTH: usize = 199;

/// Holds the process-wide alphabet and its compiled validation patterns.
///
/// Build once at startup; construction fails only on a bad pattern, which is
/// a configuration fault.
#[derive(Clone, Debug)]
pub struct Sanitizer {
    alphabet: Alphabet,
    outside: Regex,
    whole: Regex,
}

impl Sanitizer {
    pub fn new(alphabet: Alphabet) -> Result<Self, CoreError> {
        let pattern = build_validation_pattern(&alphabet);
        let outside = pattern.compile_negated()?;
        let whole = pattern.compile_anchored()?;
        Ok(Self {
            alphabet,
            outside,
            whole,
        })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Drop every character outside the alphabet and cap the length at
    /// [`MAX_KEYWORD_LENGTH`].
    pub fn sanitize(&self, input: &str) -> String {
        self.outside
            .replace_all(input, "")
            .chars()
            .take(MAX_KEYWORD_LENGTH)
            .collect()
    }

    /// Accept `input` only if it is non-empty and made of alphabet characters.
    pub fn check<'a>(&self, input: &'a str) -> Result<&'a str, CoreError> {
        if input.is_empty() {
            debug!("rejected empty short code");
            return Err(CoreError::EmptyCode);
        }
        if self.whole.is_match(input) {
            return Ok(input);
        }
        // Locate the offender for the error report.
        let found = self.outside.find(input).map(|m| {
            let position = input[..m.start()].chars().count();
            let character = m.as_str().chars().next().unwrap_or_default();
            (character, position)
        });
        let (character, position) = found.unwrap_or_default();
        debug!(code = %input, ?character, position, "rejected short code");
        Err(CoreError::InvalidCharacter {
            character,
            position,
        })
    }

    /// Check then decode. Any error here means "not a valid short code".
    pub fn decode(&self, input: &str) -> Result<u64, CoreError> {
        let code = self.check(input)?;
        codec::decode(code, &self.alphabet)
    }

    pub fn encode(&self, n: u64) -> String {
        codec::encode(n, &self.alphabet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base36() -> Sanitizer {
        Sanitizer::new(Alphabet::base36()).expect("preset pattern compiles")
    }

    #[test]
    fn sanitize_strips_foreign_characters() {
        let s = base36();
        assert_eq!(s.sanitize("Hello, World!"), "elloorld");
        assert_eq!(s.sanitize("abc-123_x"), "abc123x");
        assert_eq!(s.sanitize("!!!"), "");
    }

    #[test]
    fn sanitize_caps_length() {
        let s = base36();
        let long = "a".repeat(MAX_KEYWORD_LENGTH + 50);
        assert_eq!(s.sanitize(&long).len(), MAX_KEYWORD_LENGTH);
    }

    #[test]
    fn check_accepts_alphabet_only_input() {
        let s = base36();
        assert_eq!(s.check("3jk").unwrap(), "3jk");
    }

    #[test]
    fn check_reports_position_in_chars() {
        let s = base36();
        let err = s.check("éa!").unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidCharacter {
                character: 'é',
                position: 0
            }
        );
        let err = s.check("ab€").unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidCharacter {
                character: '€',
                position: 2
            }
        );
    }

    #[test]
    fn check_rejects_empty() {
        assert_eq!(base36().check(""), Err(CoreError::EmptyCode));
    }

    #[test]
    fn decode_goes_through_check() {
        let s = base36();
        assert_eq!(s.decode("115").unwrap(), 1337);
        assert_eq!(s.decode(&s.encode(1_000_000)).unwrap(), 1_000_000);
        let err = s.decode("11 5").unwrap_err();
        assert!(err.is_invalid_code());
    }

    #[test]
    fn special_character_alphabet() {
        let s = Sanitizer::new(Alphabet::new("]^\\-ab").unwrap()).unwrap();
        assert_eq!(s.sanitize("x]y^z\\-ab"), "]^\\-ab");
        assert!(s.check("]]^").is_ok());
        assert!(s.check("c").is_err());
        let n = s.decode("^]").unwrap();
        assert_eq!(s.encode(n), "^]");
    }
}
