//! Character-class patterns built from an alphabet.
//!
//! The patterns target the `regex` crate dialect. Every alphabet character
//! that has a meaning inside a class (`]`, `[`, `^`, `\`, `-`, `&`, `~`, ...)
//! is escaped so the class matches the alphabet and nothing else.

use regex::Regex;

use crate::{Alphabet, CoreError};

/// Escaped character-class body for one alphabet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationPattern {
    body: String,
}

impl ValidationPattern {
    /// The escaped characters, without brackets.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// `[...]`: matches one alphabet character.
    pub fn class(&self) -> String {
        format!("[{}]", self.body)
    }

    /// `[^...]`: matches one character outside the alphabet.
    pub fn negated_class(&self) -> String {
        format!("[^{}]", self.body)
    }

    /// `^[...]+$`: matches a non-empty string made only of alphabet characters.
    pub fn anchored(&self) -> String {
        format!("^[{}]+$", self.body)
    }

    pub fn compile_class(&self) -> Result<Regex, CoreError> {
        compile(&self.class())
    }

    pub fn compile_negated(&self) -> Result<Regex, CoreError> {
        compile(&self.negated_class())
    }

    pub fn compile_anchored(&self) -> Result<Regex, CoreError> {
        compile(&self.anchored())
    }
}

fn compile(pattern: &str) -> Result<Regex, CoreError> {
    Regex::new(pattern).map_err(|e| CoreError::InvalidPattern(e.to_string()))
}

/// Build the class body for `alphabet`, one escaped character at a time.
pub fn build_validation_pattern(alphabet: &Alphabet) -> ValidationPattern {
    let mut body = String::with_capacity(alphabet.len() * 2);
    let mut buf = [0u8; 4];
    for &c in alphabet.symbols() {
        body.push_str(&regex::escape(c.encode_utf8(&mut buf)));
    }
    ValidationPattern { body }
}

/// Validate a raw charset and build its pattern.
pub fn pattern_for_charset(charset: &str) -> Result<ValidationPattern, CoreError> {
    let alphabet = Alphabet::new(charset)?;
    Ok(build_validation_pattern(&alphabet))
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn prop_pattern_matches_exactly_the_alphabet(
            chars in proptest::collection::btree_set(any::<char>(), 2..40),
            probes in proptest::collection::vec(any::<char>(), 0..40),
        ) {
            let charset: String = chars.iter().collect();
            let alphabet = Alphabet::new(&charset).unwrap();
            let pattern = build_validation_pattern(&alphabet);
            let class = Regex::new(&format!("^{}$", pattern.class()));
            prop_assert!(class.is_ok(), "pattern {:?} failed to compile", pattern.class());
            let class = class.unwrap();
            for c in &chars {
                prop_assert!(class.is_match(&c.to_string()));
            }
            for c in probes.iter().filter(|c| !chars.contains(*c)) {
                prop_assert!(!class.is_match(&c.to_string()));
            }
        }
    }
}
