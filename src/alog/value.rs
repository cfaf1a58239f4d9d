//! Python-literal value model and parser
//!
//! Artisan serializes a roast profile as a single Python `dict` literal:
//! string keys mapping to strings, numbers, booleans, `None`, and nested
//! lists/tuples/dicts. The reference tooling loads it with
//! `ast.literal_eval`; this module is the equivalent safe literal parser,
//! producing a [`Value`] tree ready for typed decoding.

use std::fmt;

/// Errors that can occur while parsing a Python literal.
///
/// Every variant carries the byte offset where parsing failed, so a bad
/// `.alog` file can be diagnosed with a text editor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEof(usize),

    #[error("unexpected character {1:?} at byte {0}")]
    UnexpectedChar(usize, char),

    #[error("invalid escape sequence at byte {0}")]
    BadEscape(usize),

    #[error("invalid number {1:?} at byte {0}")]
    BadNumber(usize, String),

    #[error("dictionary key at byte {0} is not a string")]
    NonStringKey(usize),

    #[error("trailing characters after literal at byte {0}")]
    TrailingGarbage(usize),
}

/// A parsed Python literal.
///
/// Tuples are collapsed into [`Value::List`]; Artisan uses them
/// interchangeably with lists. Dict entries keep file order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Python `None`
    None,
    /// `True` / `False`
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Float literal (also used for integers too large for `i64`)
    Float(f64),
    /// Single- or double-quoted string
    Str(String),
    /// List or tuple
    List(Vec<Value>),
    /// Dict with string keys, in file order
    Dict(Vec<(String, Value)>),
}

impl Value {
    /// Parse a complete Python literal. Rejects trailing non-whitespace.
    pub fn parse(input: &str) -> Result<Value, ValueError> {
        let mut parser = Parser {
            src: input,
            pos: 0,
        };
        parser.skip_whitespace();
        let value = parser.parse_value()?;
        parser.skip_whitespace();
        if parser.pos < parser.src.len() {
            return Err(ValueError::TrailingGarbage(parser.pos));
        }
        Ok(value)
    }

    /// Numeric value as `f64`; integers coerce.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Integer value; floats with zero fractional part coerce.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    /// String contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// List items, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Look up a dict entry by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Dict(entries) => entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Whether this is Python `None`.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Decode a list of numbers into a `Vec<f64>`.
    ///
    /// Non-numeric items (Artisan occasionally writes `None` into gappy
    /// channels) become the invalid-reading sentinel `-1.0`.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        self.as_list().map(|items| {
            items
                .iter()
                .map(|v| v.as_f64().unwrap_or(-1.0))
                .collect()
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k:?}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Recursive-descent parser over the raw literal text.
///
/// Byte-oriented: all structural characters are ASCII, so byte offsets at
/// delimiters are always valid `char` boundaries.
struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), ValueError> {
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(ValueError::UnexpectedChar(self.pos, b as char)),
            None => Err(ValueError::UnexpectedEof(self.pos)),
        }
    }

    fn parse_value(&mut self) -> Result<Value, ValueError> {
        match self.peek() {
            Some(b'{') => self.parse_dict(),
            Some(b'[') => self.parse_sequence(b'[', b']'),
            Some(b'(') => self.parse_sequence(b'(', b')'),
            Some(b'\'') | Some(b'"') => self.parse_string().map(Value::Str),
            Some(b'T') => self.parse_keyword("True", Value::Bool(true)),
            Some(b'F') => self.parse_keyword("False", Value::Bool(false)),
            Some(b'N') => self.parse_keyword("None", Value::None),
            Some(b) if b == b'-' || b == b'+' || b.is_ascii_digit() || b == b'.' => {
                self.parse_number()
            }
            Some(b) => Err(ValueError::UnexpectedChar(self.pos, b as char)),
            None => Err(ValueError::UnexpectedEof(self.pos)),
        }
    }

    fn parse_keyword(&mut self, word: &str, value: Value) -> Result<Value, ValueError> {
        if self.src[self.pos..].starts_with(word) {
            self.pos += word.len();
            Ok(value)
        } else {
            // peek() returned Some, so there is at least one char here
            let ch = self.src[self.pos..].chars().next().unwrap_or('\0');
            Err(ValueError::UnexpectedChar(self.pos, ch))
        }
    }

    fn parse_number(&mut self) -> Result<Value, ValueError> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        let mut is_float = false;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => self.pos += 1,
                b'.' => {
                    is_float = true;
                    self.pos += 1;
                }
                b'e' | b'E' => {
                    is_float = true;
                    self.pos += 1;
                    if matches!(self.peek(), Some(b'-' | b'+')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
        let text = &self.src[start..self.pos];
        if is_float {
            text.parse::<f64>()
                .map(Value::Float)
                .map_err(|_| ValueError::BadNumber(start, text.to_string()))
        } else {
            // Integers too large for i64 degrade to f64 rather than failing
            text.parse::<i64>()
                .map(Value::Int)
                .or_else(|_| text.parse::<f64>().map(Value::Float))
                .map_err(|_| ValueError::BadNumber(start, text.to_string()))
        }
    }

    fn parse_string(&mut self) -> Result<String, ValueError> {
        let quote = self.bump().ok_or(ValueError::UnexpectedEof(self.pos))?;
        let mut out = String::new();
        loop {
            let chunk_start = self.pos;
            // Scan a run of plain bytes; quote and backslash are ASCII, so
            // stopping on them never splits a UTF-8 sequence.
            while let Some(b) = self.peek() {
                if b == quote || b == b'\\' {
                    break;
                }
                self.pos += 1;
            }
            out.push_str(&self.src[chunk_start..self.pos]);

            match self.bump() {
                Some(b) if b == quote => return Ok(out),
                Some(b'\\') => self.parse_escape(&mut out)?,
                Some(_) => unreachable!("scan stops only on quote or backslash"),
                None => return Err(ValueError::UnexpectedEof(self.pos)),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> Result<(), ValueError> {
        let at = self.pos - 1;
        match self.bump() {
            Some(b'n') => out.push('\n'),
            Some(b't') => out.push('\t'),
            Some(b'r') => out.push('\r'),
            Some(b'0') => out.push('\0'),
            Some(b'a') => out.push('\x07'),
            Some(b'b') => out.push('\x08'),
            Some(b'f') => out.push('\x0C'),
            Some(b'v') => out.push('\x0B'),
            Some(b'\\') => out.push('\\'),
            Some(b'\'') => out.push('\''),
            Some(b'"') => out.push('"'),
            Some(b'\n') => {} // line continuation
            Some(b'x') => {
                let code = self.parse_hex(2, at)?;
                let ch = char::from_u32(code).ok_or(ValueError::BadEscape(at))?;
                out.push(ch);
            }
            Some(b'u') => {
                let code = self.parse_hex(4, at)?;
                let ch = char::from_u32(code).ok_or(ValueError::BadEscape(at))?;
                out.push(ch);
            }
            Some(b'U') => {
                let code = self.parse_hex(8, at)?;
                let ch = char::from_u32(code).ok_or(ValueError::BadEscape(at))?;
                out.push(ch);
            }
            // Python keeps unrecognized escapes verbatim
            Some(other) if other.is_ascii() => {
                out.push('\\');
                out.push(other as char);
            }
            Some(_) => return Err(ValueError::BadEscape(at)),
            None => return Err(ValueError::UnexpectedEof(self.pos)),
        }
        Ok(())
    }

    fn parse_hex(&mut self, digits: usize, at: usize) -> Result<u32, ValueError> {
        let start = self.pos;
        for _ in 0..digits {
            match self.peek() {
                Some(b) if b.is_ascii_hexdigit() => self.pos += 1,
                Some(_) => return Err(ValueError::BadEscape(at)),
                None => return Err(ValueError::UnexpectedEof(self.pos)),
            }
        }
        u32::from_str_radix(&self.src[start..self.pos], 16)
            .map_err(|_| ValueError::BadEscape(at))
    }

    fn parse_sequence(&mut self, open: u8, close: u8) -> Result<Value, ValueError> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b) if b == close => {
                    self.pos += 1;
                    return Ok(Value::List(items));
                }
                Some(_) => {}
                None => return Err(ValueError::UnexpectedEof(self.pos)),
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                }
                Some(b) if b == close => {}
                Some(b) => return Err(ValueError::UnexpectedChar(self.pos, b as char)),
                None => return Err(ValueError::UnexpectedEof(self.pos)),
            }
        }
    }

    fn parse_dict(&mut self) -> Result<Value, ValueError> {
        self.expect(b'{')?;
        let mut entries = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Value::Dict(entries));
                }
                Some(_) => {}
                None => return Err(ValueError::UnexpectedEof(self.pos)),
            }
            let key_at = self.pos;
            let key = match self.parse_value()? {
                Value::Str(s) => s,
                _ => return Err(ValueError::NonStringKey(key_at)),
            };
            self.skip_whitespace();
            self.expect(b':')?;
            self.skip_whitespace();
            let value = self.parse_value()?;
            entries.push((key, value));
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                }
                Some(b'}') => {}
                Some(b) => return Err(ValueError::UnexpectedChar(self.pos, b as char)),
                None => return Err(ValueError::UnexpectedEof(self.pos)),
            }
        }
    }
}
