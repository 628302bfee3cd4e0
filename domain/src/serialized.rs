//! Legacy serialized-data detection.
//!
//! The legacy format is PHP's `serialize()` text encoding:
//!
//! ```text
//! N;                      null
//! b:1;                    bool
//! i:-25;                  int
//! d:1.1;                  float (also INF, -INF, NAN)
//! s:3:"abc";              string, length in bytes
//! a:1:{i:0;s:1:"x";}      array of key/value pairs
//! O:8:"stdClass":1:{...}  object with class name and properties
//! ```
//!
//! Rather than sniffing tag letters, input is parsed into a
//! [`SerializedValue`]. Something "is serialized" when the whole trimmed
//! input parses.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// Nesting limit for arrays and objects.
pub const MAX_DEPTH: usize = 64;

/// Parsing rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dialect {
    /// The format as PHP itself reads it. Booleans are `b:0;` or `b:1;`.
    #[default]
    Strict,
    /// Also accepts boolean fragments with any digit run (`b:4;`), like the
    /// old tag-sniffing heuristic did.
    Legacy,
}

/// Array and object keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ArrayKey {
    Int(i64),
    String(String),
}

/// A parsed serialized value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SerializedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Entries in source order.
    Array(Vec<(ArrayKey, SerializedValue)>),
    Object {
        class: String,
        properties: Vec<(ArrayKey, SerializedValue)>,
    },
}

impl SerializedValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            SerializedValue::Null => "null",
            SerializedValue::Bool(_) => "bool",
            SerializedValue::Int(_) => "int",
            SerializedValue::Float(_) => "float",
            SerializedValue::String(_) => "string",
            SerializedValue::Array(_) => "array",
            SerializedValue::Object { .. } => "object",
        }
    }
}

fn write_str(f: &mut Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "s:{}:\"{}\";", s.len(), s)
}

fn write_entries(f: &mut Formatter<'_>, entries: &[(ArrayKey, SerializedValue)]) -> fmt::Result {
    write!(f, "{}:{{", entries.len())?;
    for (key, value) in entries {
        match key {
            ArrayKey::Int(i) => write!(f, "i:{};", i)?,
            ArrayKey::String(s) => write_str(f, s)?,
        }
        write!(f, "{}", value)?;
    }
    write!(f, "}}")
}

/// Renders the serialized text form.
impl Display for SerializedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SerializedValue::Null => write!(f, "N;"),
            SerializedValue::Bool(b) => write!(f, "b:{};", u8::from(*b)),
            SerializedValue::Int(i) => write!(f, "i:{};", i),
            SerializedValue::Float(x) if x.is_nan() => write!(f, "d:NAN;"),
            SerializedValue::Float(x) if x.is_infinite() => {
                write!(f, "d:{}INF;", if *x < 0.0 { "-" } else { "" })
            }
            SerializedValue::Float(x) => write!(f, "d:{};", x),
            SerializedValue::String(s) => write_str(f, s),
            SerializedValue::Array(entries) => {
                write!(f, "a:")?;
                write_entries(f, entries)
            }
            SerializedValue::Object { class, properties } => {
                write!(f, "O:{}:\"{}\":", class.len(), class)?;
                write_entries(f, properties)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerializedErrorKind {
    UnexpectedEnd,
    /// A specific structural character was required here.
    Expected(char),
    UnknownTag(u8),
    InvalidNumber,
    /// A length prefix does not match the quoted data that follows.
    LengthMismatch,
    /// A length prefix cuts a UTF-8 character in half.
    InvalidUtf8,
    /// Keys must be ints or strings.
    InvalidKey,
    TooDeep,
    TrailingInput,
}

/// Parse failure with the byte offset (into the trimmed input) where it occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerializedError {
    pub offset: usize,
    pub kind: SerializedErrorKind,
}

impl Display for SerializedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            SerializedErrorKind::UnexpectedEnd => write!(f, "unexpected end of input"),
            SerializedErrorKind::Expected(c) => {
                write!(f, "expected {:?} at offset {}", c, self.offset)
            }
            SerializedErrorKind::UnknownTag(b) => write!(
                f,
                "unknown tag {:?} at offset {}",
                char::from(b),
                self.offset
            ),
            SerializedErrorKind::InvalidNumber => write!(f, "invalid number at offset {}", self.offset),
            SerializedErrorKind::LengthMismatch => {
                write!(f, "length prefix mismatch at offset {}", self.offset)
            }
            SerializedErrorKind::InvalidUtf8 => write!(f, "invalid utf-8 at offset {}", self.offset),
            SerializedErrorKind::InvalidKey => write!(f, "invalid key at offset {}", self.offset),
            SerializedErrorKind::TooDeep => write!(f, "nesting deeper than {}", MAX_DEPTH),
            SerializedErrorKind::TrailingInput => {
                write!(f, "trailing input at offset {}", self.offset)
            }
        }
    }
}

impl Error for SerializedError {}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    dialect: Dialect,
}

impl<'a> Parser<'a> {
    fn error(&self, kind: SerializedErrorKind) -> SerializedError {
        SerializedError {
            offset: self.pos,
            kind,
        }
    }

    fn next_byte(&mut self) -> Result<u8, SerializedError> {
        let b = *self
            .input
            .get(self.pos)
            .ok_or_else(|| self.error(SerializedErrorKind::UnexpectedEnd))?;
        self.pos += 1;
        Ok(b)
    }

    fn expect(&mut self, c: char) -> Result<(), SerializedError> {
        match self.input.get(self.pos) {
            Some(&b) if char::from(b) == c => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(self.error(SerializedErrorKind::Expected(c))),
            None => Err(self.error(SerializedErrorKind::UnexpectedEnd)),
        }
    }

    /// Bytes up to (not including) the next `;`, which is consumed.
    fn token(&mut self) -> Result<&'a str, SerializedError> {
        let start = self.pos;
        let len = self.input[start..]
            .iter()
            .position(|&b| b == b';')
            .ok_or_else(|| SerializedError {
                offset: self.input.len(),
                kind: SerializedErrorKind::UnexpectedEnd,
            })?;
        self.pos = start + len + 1;
        std::str::from_utf8(&self.input[start..start + len]).map_err(|_| SerializedError {
            offset: start,
            kind: SerializedErrorKind::InvalidNumber,
        })
    }

    /// Unsigned decimal length or count.
    fn length(&mut self) -> Result<usize, SerializedError> {
        let start = self.pos;
        while self.input.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.input[start..self.pos])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(SerializedError {
                offset: start,
                kind: SerializedErrorKind::InvalidNumber,
            })
    }

    /// `"` + exactly `len` bytes + `"`.
    fn quoted(&mut self, len: usize) -> Result<String, SerializedError> {
        self.expect('"')?;
        let start = self.pos;
        let end = start
            .checked_add(len)
            .filter(|&end| end < self.input.len())
            .ok_or_else(|| self.error(SerializedErrorKind::LengthMismatch))?;
        if self.input[end] != b'"' {
            return Err(SerializedError {
                offset: end,
                kind: SerializedErrorKind::LengthMismatch,
            });
        }
        let text = std::str::from_utf8(&self.input[start..end]).map_err(|_| SerializedError {
            offset: start,
            kind: SerializedErrorKind::InvalidUtf8,
        })?;
        self.pos = end + 1;
        Ok(text.to_owned())
    }

    fn value(&mut self, depth: usize) -> Result<SerializedValue, SerializedError> {
        if depth > MAX_DEPTH {
            return Err(self.error(SerializedErrorKind::TooDeep));
        }
        let tag_at = self.pos;
        match self.next_byte()? {
            b'N' => {
                self.expect(';')?;
                Ok(SerializedValue::Null)
            }
            b'b' => {
                self.expect(':')?;
                self.boolean()
            }
            b'i' => {
                self.expect(':')?;
                self.integer().map(SerializedValue::Int)
            }
            b'd' => {
                self.expect(':')?;
                self.float().map(SerializedValue::Float)
            }
            b's' => {
                self.expect(':')?;
                let len = self.length()?;
                self.expect(':')?;
                let s = self.quoted(len)?;
                self.expect(';')?;
                Ok(SerializedValue::String(s))
            }
            b'a' => {
                self.expect(':')?;
                let entries = self.entries(depth)?;
                Ok(SerializedValue::Array(entries))
            }
            b'O' => {
                self.expect(':')?;
                let len = self.length()?;
                self.expect(':')?;
                let class = self.quoted(len)?;
                self.expect(':')?;
                let properties = self.entries(depth)?;
                Ok(SerializedValue::Object { class, properties })
            }
            other => Err(SerializedError {
                offset: tag_at,
                kind: SerializedErrorKind::UnknownTag(other),
            }),
        }
    }

    fn boolean(&mut self) -> Result<SerializedValue, SerializedError> {
        let start = self.pos;
        let token = self.token()?;
        let invalid = SerializedError {
            offset: start,
            kind: SerializedErrorKind::InvalidNumber,
        };
        match (self.dialect, token) {
            (_, "0") => Ok(SerializedValue::Bool(false)),
            (_, "1") => Ok(SerializedValue::Bool(true)),
            (Dialect::Legacy, t) if !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit()) => {
                Ok(SerializedValue::Bool(t.bytes().any(|b| b != b'0')))
            }
            _ => Err(invalid),
        }
    }

    fn integer(&mut self) -> Result<i64, SerializedError> {
        let start = self.pos;
        let token = self.token()?;
        let digits = token.strip_prefix(|c| c == '+' || c == '-').unwrap_or(token);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SerializedError {
                offset: start,
                kind: SerializedErrorKind::InvalidNumber,
            });
        }
        token.parse().map_err(|_| SerializedError {
            offset: start,
            kind: SerializedErrorKind::InvalidNumber,
        })
    }

    fn float(&mut self) -> Result<f64, SerializedError> {
        let start = self.pos;
        let invalid = SerializedError {
            offset: start,
            kind: SerializedErrorKind::InvalidNumber,
        };
        match self.token()? {
            "NAN" => Ok(f64::NAN),
            "INF" => Ok(f64::INFINITY),
            "-INF" => Ok(f64::NEG_INFINITY),
            t if !t.is_empty()
                && t
                    .bytes()
                    .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-')) =>
            {
                t.parse().map_err(|_| invalid)
            }
            _ => Err(invalid),
        }
    }

    /// `count:{` key value ... `}`
    fn entries(
        &mut self,
        depth: usize,
    ) -> Result<Vec<(ArrayKey, SerializedValue)>, SerializedError> {
        let count = self.length()?;
        self.expect(':')?;
        self.expect('{')?;
        // Each entry takes at least four bytes; don't trust `count` for allocation.
        let remaining = self.input.len().saturating_sub(self.pos);
        let mut entries = Vec::with_capacity(count.min(remaining / 4));
        for _ in 0..count {
            let key_at = self.pos;
            let key = match self.value(depth + 1)? {
                SerializedValue::Int(i) => ArrayKey::Int(i),
                SerializedValue::String(s) => ArrayKey::String(s),
                _ => {
                    return Err(SerializedError {
                        offset: key_at,
                        kind: SerializedErrorKind::InvalidKey,
                    })
                }
            };
            let value = self.value(depth + 1)?;
            entries.push((key, value));
        }
        self.expect('}')?;
        Ok(entries)
    }
}

/// Parse `input` with the strict dialect.
pub fn parse(input: &str) -> Result<SerializedValue, SerializedError> {
    parse_with(input, Dialect::Strict)
}

/// Parse `input` after trimming surrounding ASCII whitespace and NUL. The
/// whole trimmed input must be one value.
pub fn parse_with(input: &str, dialect: Dialect) -> Result<SerializedValue, SerializedError> {
    let mut parser = Parser {
        input: input
            .trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B'))
            .as_bytes(),
        pos: 0,
        dialect,
    };
    let value = parser.value(0)?;
    if parser.pos != parser.input.len() {
        return Err(parser.error(SerializedErrorKind::TrailingInput));
    }
    Ok(value)
}

/// True when `input` is a well-formed serialized value.
pub fn is_serialized(input: &str) -> bool {
    parse(input).is_ok()
}

/// Like [`is_serialized`], but with the [`Dialect::Legacy`] rules.
pub fn is_serialized_legacy(input: &str) -> bool {
    parse_with(input, Dialect::Legacy).is_ok()
}
