//! JSON Tokenizer: a strict UTF-8 JSON reader producing an abstract value
//! tree. Numbers are kept as their original text (never parsed to `f64`)
//! so a consumer can losslessly hand them to the Scalar Converter with
//! whatever target scale/width it needs — parsing to `f64` up front would
//! destroy precision for arbitrary-scale `Fixed` values. Object key order is
//! preserved, since `PROPERTIES_ORDER` binding depends on it.

use crate::error::{CellLocation, ConversionError};

/// An abstract JSON value tree.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    /// JSON `null`.
    Null,
    /// JSON `true`/`false`.
    Bool(bool),
    /// A JSON number, kept verbatim as its source text.
    Number(String),
    /// A JSON string, already unescaped.
    String(String),
    /// A JSON array, in source order.
    Array(Vec<JsonValue>),
    /// A JSON object, as ordered `(key, value)` pairs — duplicates are kept
    /// (last-wins is a binder-level concern, not a tokenizer concern).
    Object(Vec<(String, JsonValue)>),
}

impl JsonValue {
    /// Borrow this value as a JSON object's pair list.
    #[must_use]
    pub fn as_object(&self) -> Option<&[(String, JsonValue)]> {
        match self {
            JsonValue::Object(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Borrow this value as a JSON array's element list.
    #[must_use]
    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow this value's text, for `String` values only (not numbers).
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow this value's number text, for `Number` values only.
    #[must_use]
    pub fn as_number_str(&self) -> Option<&str> {
        match self {
            JsonValue::Number(s) => Some(s),
            _ => None,
        }
    }

    /// `true` for `JsonValue::Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }
}

/// Parse a single JSON value from `input`, failing on trailing non-whitespace
/// bytes (this tokenizer parses one complete fragment, not a stream of them).
///
/// # Errors
/// Returns [`ConversionError::InvalidEncoding`] with a byte-offset-qualified
/// message on malformed UTF-8 or malformed JSON syntax.
pub fn parse(input: &[u8], location: CellLocation) -> Result<JsonValue, ConversionError> {
    let text = std::str::from_utf8(input).map_err(|e| ConversionError::InvalidEncoding {
        location,
        message: format!("invalid UTF-8 at byte offset {}", e.valid_up_to()),
    })?;
    let mut p = Parser {
        bytes: text.as_bytes(),
        pos: 0,
        location,
    };
    p.skip_whitespace();
    let value = p.parse_value()?;
    p.skip_whitespace();
    if p.pos != p.bytes.len() {
        return Err(ConversionError::InvalidEncoding {
            location,
            message: format!("trailing data at byte offset {}", p.pos),
        });
    }
    Ok(value)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    location: CellLocation,
}

impl<'a> Parser<'a> {
    fn err(&self, message: impl Into<String>) -> ConversionError {
        ConversionError::InvalidEncoding {
            location: self.location,
            message: format!("{} at byte offset {}", message.into(), self.pos),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), ConversionError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.err(format!("expected '{}'", byte as char)))
        }
    }

    fn parse_value(&mut self) -> Result<JsonValue, ConversionError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b'"') => self.parse_string().map(JsonValue::String),
            Some(b't') => self.parse_literal("true", JsonValue::Bool(true)),
            Some(b'f') => self.parse_literal("false", JsonValue::Bool(false)),
            Some(b'n') => self.parse_literal("null", JsonValue::Null),
            Some(b'-' | b'0'..=b'9') => self.parse_number(),
            _ => Err(self.err("unexpected character")),
        }
    }

    fn parse_literal(
        &mut self,
        literal: &'static str,
        value: JsonValue,
    ) -> Result<JsonValue, ConversionError> {
        if self.bytes[self.pos..].starts_with(literal.as_bytes()) {
            self.pos += literal.len();
            Ok(value)
        } else {
            Err(self.err(format!("expected literal '{literal}'")))
        }
    }

    fn parse_object(&mut self) -> Result<JsonValue, ConversionError> {
        self.expect(b'{')?;
        let mut pairs = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(JsonValue::Object(pairs));
        }
        loop {
            self.skip_whitespace();
            let key = self.parse_string()?;
            self.skip_whitespace();
            self.expect(b':')?;
            let value = self.parse_value()?;
            pairs.push((key, value));
            self.skip_whitespace();
            match self.bump() {
                Some(b',') => continue,
                Some(b'}') => break,
                _ => return Err(self.err("expected ',' or '}'")),
            }
        }
        Ok(JsonValue::Object(pairs))
    }

    fn parse_array(&mut self) -> Result<JsonValue, ConversionError> {
        self.expect(b'[')?;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(JsonValue::Array(items));
        }
        loop {
            let value = self.parse_value()?;
            items.push(value);
            self.skip_whitespace();
            match self.bump() {
                Some(b',') => continue,
                Some(b']') => break,
                _ => return Err(self.err("expected ',' or ']'")),
            }
        }
        Ok(JsonValue::Array(items))
    }

    fn parse_string(&mut self) -> Result<String, ConversionError> {
        self.expect(b'"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.err("unterminated string")),
                Some(b'"') => break,
                Some(b'\\') => match self.bump() {
                    Some(b'"') => out.push('"'),
                    Some(b'\\') => out.push('\\'),
                    Some(b'/') => out.push('/'),
                    Some(b'b') => out.push('\u{8}'),
                    Some(b'f') => out.push('\u{c}'),
                    Some(b'n') => out.push('\n'),
                    Some(b'r') => out.push('\r'),
                    Some(b't') => out.push('\t'),
                    Some(b'u') => {
                        let cp = self.parse_hex4()?;
                        if (0xD800..=0xDBFF).contains(&cp) {
                            // high surrogate; expect a following low surrogate
                            if self.bump() != Some(b'\\') || self.bump() != Some(b'u') {
                                return Err(self.err("expected low surrogate"));
                            }
                            let low = self.parse_hex4()?;
                            if !(0xDC00..=0xDFFF).contains(&low) {
                                return Err(self.err("invalid low surrogate"));
                            }
                            let combined = 0x10000
                                + (u32::from(cp) - 0xD800) * 0x400
                                + (u32::from(low) - 0xDC00);
                            let ch = char::from_u32(combined).ok_or_else(|| {
                                self.err("invalid surrogate pair codepoint")
                            })?;
                            out.push(ch);
                        } else {
                            let ch = char::from_u32(u32::from(cp))
                                .ok_or_else(|| self.err("invalid \\u escape codepoint"))?;
                            out.push(ch);
                        }
                    }
                    _ => return Err(self.err("invalid escape sequence")),
                },
                Some(byte) if byte < 0x80 => out.push(byte as char),
                Some(_byte) => {
                    // Multi-byte UTF-8 sequence: the input was already
                    // validated as UTF-8 in `parse`, so re-decode the
                    // remaining bytes from this lead byte.
                    let start = self.pos - 1;
                    let rest = std::str::from_utf8(&self.bytes[start..])
                        .map_err(|_| self.err("invalid UTF-8 in string"))?;
                    let c = rest.chars().next().expect("non-empty validated str");
                    self.pos = start + c.len_utf8();
                    out.push(c);
                }
            }
        }
        Ok(out)
    }

    fn parse_hex4(&mut self) -> Result<u16, ConversionError> {
        let mut value: u16 = 0;
        for _ in 0..4 {
            let b = self.bump().ok_or_else(|| self.err("unterminated \\u escape"))?;
            let digit = match b {
                b'0'..=b'9' => b - b'0',
                b'a'..=b'f' => b - b'a' + 10,
                b'A'..=b'F' => b - b'A' + 10,
                _ => return Err(self.err("invalid hex digit in \\u escape")),
            };
            value = value * 16 + u16::from(digit);
        }
        Ok(value)
    }

    fn parse_number(&mut self) -> Result<JsonValue, ConversionError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => {
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.pos += 1;
                }
            }
            _ => return Err(self.err("invalid number")),
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.err("invalid number: missing fraction digits"));
            }
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.err("invalid number: missing exponent digits"));
            }
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos])
            .expect("ascii number text")
            .to_owned();
        Ok(JsonValue::Number(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> CellLocation {
        CellLocation::new(0, 0, 0)
    }

    #[test]
    fn parses_flat_object_preserving_key_order() {
        let v = parse(br#"{"city":"San Mateo","state":"CA"}"#, loc()).unwrap();
        let pairs = v.as_object().unwrap();
        assert_eq!(pairs[0].0, "city");
        assert_eq!(pairs[1].0, "state");
    }

    #[test]
    fn preserves_number_text_for_precision() {
        let v = parse(b"123456789012345678901234567890.12345", loc()).unwrap();
        assert_eq!(v.as_number_str().unwrap(), "123456789012345678901234567890.12345");
    }

    #[test]
    fn nested_map_like_object() {
        let v = parse(br#"{"Warsaw":{"prefix":"01","postfix":"234"}}"#, loc()).unwrap();
        let outer = v.as_object().unwrap();
        assert_eq!(outer.len(), 1);
        assert_eq!(outer[0].0, "Warsaw");
        let inner = outer[0].1.as_object().unwrap();
        assert_eq!(inner[0], ("prefix".to_string(), JsonValue::String("01".into())));
    }

    #[test]
    fn surrogate_pair_escape() {
        let v = parse(br#""😀""#, loc()).unwrap();
        assert_eq!(v.as_str().unwrap(), "\u{1F600}");
    }

    #[test]
    fn rejects_trailing_garbage() {
        let err = parse(b"123 abc", loc()).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidEncoding { .. }));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = parse(&[0x7b, 0xff], loc()).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidEncoding { .. }));
    }

    #[test]
    fn array_of_mixed_scalars() {
        let v = parse(b"[1, \"two\", null, true]", loc()).unwrap();
        let items = v.as_array().unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[2], JsonValue::Null);
    }
}
