//! Domain library for the URL Shortener formatting helpers.
//!
//! Holds the short-code alphabet, the identifier codec, the validation
//! pattern builder used by the keyword sanitizer, the legacy serialized-data
//! sniffer and the string trimmer. Everything here is pure: no IO, no global
//! state. Configuration is passed in explicitly as an [`Alphabet`] value.

use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lowercase alphanumerics, the default short-URL charset.
pub const BASE36_CHARSET: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

/// Lowercase alphanumerics followed by uppercase letters.
pub const BASE62_CHARSET: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Ordered, duplicate-free set of characters used as digits by the codec.
///
/// The position of a character is its digit value, so index 0 is the
/// "zero digit". An `Alphabet` is validated once and never mutated.
#[derive(Clone, Debug)]
pub struct Alphabet {
    symbols: Vec<char>,
    index: HashMap<char, u64>,
}

impl Alphabet {
    /// Validate `charset` and build an alphabet from it.
    ///
    /// Fails with [`CoreError::InvalidAlphabet`] when the charset has fewer
    /// than two characters or contains the same character twice.
    pub fn new(charset: &str) -> Result<Self, CoreError> {
        let symbols: Vec<char> = charset.chars().collect();
        if symbols.is_empty() {
            return Err(CoreError::InvalidAlphabet("empty".into()));
        }
        if symbols.len() < 2 {
            return Err(CoreError::InvalidAlphabet(
                "needs at least 2 characters".into(),
            ));
        }
        let mut index = HashMap::with_capacity(symbols.len());
        for (pos, &c) in symbols.iter().enumerate() {
            if index.insert(c, pos as u64).is_some() {
                return Err(CoreError::InvalidAlphabet(format!(
                    "duplicate character {:?}",
                    c
                )));
            }
        }
        Ok(Self { symbols, index })
    }

    /// The 36-character preset (`0-9a-z`).
    pub fn base36() -> Self {
        Self::preset(BASE36_CHARSET)
    }

    /// The 62-character preset (`0-9a-zA-Z`).
    pub fn base62() -> Self {
        Self::preset(BASE62_CHARSET)
    }

    fn preset(charset: &str) -> Self {
        let symbols: Vec<char> = charset.chars().collect();
        let index = symbols
            .iter()
            .enumerate()
            .map(|(pos, &c)| (c, pos as u64))
            .collect();
        Self { symbols, index }
    }

    /// Number of digits (the radix).
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Never true for a validated alphabet.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn radix(&self) -> u64 {
        self.symbols.len() as u64
    }

    /// The zero digit.
    pub fn zero(&self) -> char {
        self.symbols[0]
    }

    /// Character for digit value `digit`, if in range.
    pub fn symbol(&self, digit: usize) -> Option<char> {
        self.symbols.get(digit).copied()
    }

    /// Digit value of `c`, if `c` belongs to the alphabet.
    pub fn index_of(&self, c: char) -> Option<u64> {
        self.index.get(&c).copied()
    }

    pub fn contains(&self, c: char) -> bool {
        self.index.contains_key(&c)
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Shorthand for [`codec::encode`].
    pub fn encode(&self, n: u64) -> String {
        codec::encode(n, self)
    }

    /// Shorthand for [`codec::decode`].
    pub fn decode(&self, code: &str) -> Result<u64, CoreError> {
        codec::decode(code, self)
    }
}

impl PartialEq for Alphabet {
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols
    }
}

impl Eq for Alphabet {}

impl Display for Alphabet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for c in &self.symbols {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// Core domain errors (no external error crates to keep deps small).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Alphabet is empty, too short, or repeats a character. Configuration fault.
    InvalidAlphabet(String),
    /// A short code contains a character outside the alphabet.
    InvalidCharacter { character: char, position: usize },
    /// A short code is empty.
    EmptyCode,
    /// A short code denotes a value larger than `u64::MAX`.
    IdentifierOverflow,
    /// A validation pattern failed to compile. Configuration fault.
    InvalidPattern(String),
}

impl CoreError {
    /// True for errors that mean "this is not a valid short code" rather
    /// than a fault in the service's own configuration.
    pub fn is_invalid_code(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidCharacter { .. }
                | CoreError::EmptyCode
                | CoreError::IdentifierOverflow
        )
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::InvalidAlphabet(msg) => write!(f, "invalid alphabet: {}", msg),
            CoreError::InvalidCharacter {
                character,
                position,
            } => write!(
                f,
                "invalid character {:?} at position {}",
                character, position
            ),
            CoreError::EmptyCode => write!(f, "empty short code"),
            CoreError::IdentifierOverflow => write!(f, "short code exceeds identifier range"),
            CoreError::InvalidPattern(msg) => write!(f, "invalid validation pattern: {}", msg),
        }
    }
}

impl Error for CoreError {}

/// Return a short about/version line for the binary to print.
pub fn about() -> String {
    let pkg = env!("CARGO_PKG_NAME");
    let ver = env!("CARGO_PKG_VERSION");
    format!("{} v{} - formatting helpers loaded", pkg, ver)
}

pub mod codec;
pub mod pattern;
pub mod sanitize;
pub mod serialized;
pub mod trim;
