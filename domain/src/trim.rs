//! Truncation of long strings for display.

use std::borrow::Cow;

/// Default maximum length, in characters.
pub const DEFAULT_TRIM_LENGTH: usize = 60;

/// Default marker appended to truncated strings.
pub const DEFAULT_TRIM_SUFFIX: &str = "[...]";

/// Shorten `s` to at most `max_len` characters, ending in `suffix` when
/// anything was cut.
///
/// Lengths count `char`s, so a multi-byte character is never split. If the
/// suffix alone exceeds `max_len`, the suffix itself is cut to fit.
pub fn trim_long_string<'a>(s: &'a str, max_len: usize, suffix: &str) -> Cow<'a, str> {
    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }
    let suffix_len = suffix.chars().count();
    if suffix_len >= max_len {
        return Cow::Owned(suffix.chars().take(max_len).collect());
    }
    let keep = max_len - suffix_len;
    let cut = s.char_indices().nth(keep).map_or(s.len(), |(i, _)| i);
    let mut out = String::with_capacity(cut + suffix.len());
    out.push_str(&s[..cut]);
    out.push_str(suffix);
    Cow::Owned(out)
}

/// [`trim_long_string`] with [`DEFAULT_TRIM_LENGTH`] and [`DEFAULT_TRIM_SUFFIX`].
pub fn trim_long_string_default(s: &str) -> Cow<'_, str> {
    trim_long_string(s, DEFAULT_TRIM_LENGTH, DEFAULT_TRIM_SUFFIX)
}
