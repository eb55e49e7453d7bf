//! Escaping rules shared by the parser and the formatter.
//!
//! Nine characters carry meaning in the grammar: `\ [ ] , + & * = "`. Inside
//! a bare identifier each of them is written with a leading backslash. Between
//! double quotes only the backslash and the quote itself need escaping.
//!
//! Every delimiter is ASCII, so scanning works on bytes without ever landing a
//! slice boundary inside a multi-byte character.

use std::borrow::Cow;
use std::fmt;

/// The characters that terminate a bare identifier.
pub const DELIMITERS: [char; 9] = ['\\', '[', ']', ',', '+', '&', '*', '=', '"'];

/// The characters that terminate a quoted identifier.
pub const QUOTED_DELIMITERS: [char; 2] = ['\\', '"'];

/// Which delimiter set applies to the identifier being read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiters {
    /// Bare identifiers: type names, assembly names, qualification names.
    All,
    /// Text between `"` quotes.
    Quoted,
}

impl Delimiters {
    #[inline]
    #[must_use]
    pub fn contains_byte(self, b: u8) -> bool {
        match self {
            Delimiters::All => matches!(
                b,
                b'\\' | b'[' | b']' | b',' | b'+' | b'&' | b'*' | b'=' | b'"'
            ),
            Delimiters::Quoted => matches!(b, b'\\' | b'"'),
        }
    }

    #[must_use]
    pub fn contains(self, c: char) -> bool {
        c.is_ascii() && self.contains_byte(c as u8)
    }

    /// Byte offset of the first delimiter in `text`.
    #[inline]
    #[must_use]
    pub fn find(self, text: &[u8]) -> Option<usize> {
        text.iter().position(|&b| self.contains_byte(b))
    }
}

#[must_use]
pub fn is_delimiter(c: char) -> bool {
    Delimiters::All.contains(c)
}

#[must_use]
pub fn contains_delimiter(text: &str) -> bool {
    Delimiters::All.find(text.as_bytes()).is_some()
}

/// A qualification value is quoted when it is empty (an unquoted empty value
/// is indistinguishable from no value) or holds any delimiter.
#[must_use]
pub fn requires_quoting(value: &str) -> bool {
    value.is_empty() || contains_delimiter(value)
}

/// Writes `text` with a backslash in front of every character in `delimiters`.
pub fn write_escaped<W>(out: &mut W, text: &str, delimiters: Delimiters) -> fmt::Result
where
    W: fmt::Write + ?Sized,
{
    let bytes = text.as_bytes();
    let mut start = 0;

    while let Some(offset) = delimiters.find(&bytes[start..]) {
        let index = start + offset;
        out.write_str(&text[start..index])?;
        out.write_char('\\')?;
        out.write_char(bytes[index] as char)?;
        start = index + 1;
    }

    out.write_str(&text[start..])
}

/// Writes a bare identifier (type, assembly or qualification name).
pub fn write_identifier<W>(out: &mut W, identifier: &str) -> fmt::Result
where
    W: fmt::Write + ?Sized,
{
    write_escaped(out, identifier, Delimiters::All)
}

pub fn write_quoted<W>(out: &mut W, identifier: &str) -> fmt::Result
where
    W: fmt::Write + ?Sized,
{
    out.write_char('"')?;
    write_escaped(out, identifier, Delimiters::Quoted)?;
    out.write_char('"')
}

/// Writes a qualification value, quoting it only when it has to be.
pub fn write_value<W>(out: &mut W, value: &str) -> fmt::Result
where
    W: fmt::Write + ?Sized,
{
    if requires_quoting(value) {
        write_quoted(out, value)
    } else {
        write_identifier(out, value)
    }
}

/// Escapes `identifier` for use as a bare identifier, borrowing when nothing
/// needs escaping.
#[must_use]
pub fn escape(identifier: &str) -> Cow<'_, str> {
    if !contains_delimiter(identifier) {
        return Cow::Borrowed(identifier);
    }

    let mut escaped = String::with_capacity(identifier.len() + 4);
    // Writing into a String cannot fail.
    let _ = write_identifier(&mut escaped, identifier);
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quoted(text: &str) -> String {
        let mut out = String::new();
        write_quoted(&mut out, text).unwrap();
        out
    }

    fn value(text: &str) -> String {
        let mut out = String::new();
        write_value(&mut out, text).unwrap();
        out
    }

    #[test]
    fn test_all_delimiters_are_escaped() {
        for c in DELIMITERS {
            let text = format!("a{c}b");
            assert_eq!(escape(&text), format!("a\\{c}b"));
        }
    }

    #[test]
    fn test_plain_identifier_is_borrowed() {
        assert!(matches!(escape("Foo.Bar`1"), Cow::Borrowed("Foo.Bar`1")));
    }

    #[test]
    fn test_quoted_form_only_escapes_quote_and_backslash() {
        assert_eq!(quoted("a,b[c]=d"), "\"a,b[c]=d\"");
        assert_eq!(quoted("x\"y\\z"), "\"x\\\"y\\\\z\"");
    }

    #[test]
    fn test_value_quoting_rule() {
        assert_eq!(value(""), "\"\"");
        assert_eq!(value("neutral"), "neutral");
        assert_eq!(value("[xy]"), "\"[xy]\"");
    }

    #[test]
    fn test_non_ascii_passes_through() {
        assert_eq!(escape("Grüße+Ü"), "Grüße\\+Ü");
        assert!(!is_delimiter('ü'));
    }
}
