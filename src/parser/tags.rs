//! Tag and block state parsing.
//!
//! Tag blocks in alias files are written in a relaxed JSON: keys and string
//! values may be unquoted, single quotes are accepted and numbers may carry
//! an NBT type suffix (`1b`, `5s`, `2.0f`). The result is always a plain
//! [`serde_json`] value tree.

use crate::error::ParseError;
use crate::types::Tags;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Parse a tag block. It must be an object.
pub fn parse_tags(raw: &str) -> Result<Tags, ParseError> {
    let invalid = |reason: String| ParseError::InvalidTags {
        raw: raw.to_string(),
        reason,
    };

    let value = match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(_) => {
            let mut reader = Reader::new(raw);
            let value = reader.value().map_err(invalid)?;
            reader.skip_whitespace();
            if !reader.at_end() {
                return Err(invalid(format!("trailing input at offset {}", reader.pos)));
            }
            value
        }
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid("expected an object".to_string())),
    }
}

/// Parse `key=value,key=value` into a state map.
pub fn parse_block_states(raw: &str) -> Result<BTreeMap<String, String>, ParseError> {
    let mut states = BTreeMap::new();
    for segment in split_outside_groups(raw, ',') {
        if segment.is_empty() {
            continue;
        }
        let (key, value) = segment
            .split_once('=')
            .ok_or_else(|| ParseError::MalformedState(segment.to_string()))?;
        states.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(states)
}

/// Split on `separator` where it is not nested inside `{}` or `[]`. Parts are
/// trimmed.
pub fn split_outside_groups(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(input[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(input[start..].trim());
    parts
}

/// Recursive reader for the relaxed syntax.
struct Reader<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        self.skip_whitespace();
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(format!("expected '{}' but found '{}' at offset {}", expected, c, self.pos - c.len_utf8())),
            None => Err(format!("expected '{}' but input ended", expected)),
        }
    }

    fn value(&mut self) -> Result<Value, String> {
        self.skip_whitespace();
        match self.peek() {
            Some('{') => self.object(),
            Some('[') => self.array(),
            Some('"') | Some('\'') => self.quoted().map(Value::String),
            Some(_) => {
                let literal = self.literal(true);
                if literal.is_empty() {
                    Err(format!("unexpected character at offset {}", self.pos))
                } else {
                    Ok(literal_value(literal))
                }
            }
            None => Err("unexpected end of input".to_string()),
        }
    }

    fn object(&mut self) -> Result<Value, String> {
        self.expect('{')?;
        let mut map = Map::new();
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(Value::Object(map));
        }
        loop {
            self.skip_whitespace();
            let key = match self.peek() {
                Some('"') | Some('\'') => self.quoted()?,
                _ => self.literal(false).to_string(),
            };
            if key.is_empty() {
                return Err(format!("missing key at offset {}", self.pos));
            }
            self.expect(':')?;
            let value = self.value()?;
            map.insert(key, value);

            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(Value::Object(map)),
                _ => return Err(format!("expected ',' or '}}' at offset {}", self.pos)),
            }
        }
    }

    fn array(&mut self) -> Result<Value, String> {
        self.expect('[')?;
        let mut values = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(Value::Array(values));
        }
        // NBT typed arrays: [I; 1, 2, 3]
        if let Some(rest) = self.input.get(self.pos..) {
            let mut chars = rest.chars();
            if let (Some('B' | 'I' | 'L'), Some(';')) = (chars.next(), chars.next()) {
                self.pos += 2;
            }
        }
        loop {
            values.push(self.value()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(Value::Array(values)),
                _ => return Err(format!("expected ',' or ']' at offset {}", self.pos)),
            }
        }
    }

    fn quoted(&mut self) -> Result<String, String> {
        let quote = self.bump().ok_or("unexpected end of input")?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c) => out.push(c),
                    None => return Err("unterminated escape".to_string()),
                },
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
                None => return Err("unterminated string".to_string()),
            }
        }
    }

    /// Unquoted run of characters. Colons only belong to values, where they
    /// appear in namespaced ids.
    fn literal(&mut self, allow_colon: bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '+') || (allow_colon && c == ':') {
                self.bump();
            } else {
                break;
            }
        }
        self.input[start..self.pos].trim()
    }
}

fn literal_value(literal: &str) -> Value {
    match literal {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    if let Some(number) = parse_number(literal) {
        return number;
    }
    // NBT suffixes: 1b, 5s, 3L, 2.0f, 1.5d
    let suffixed = literal
        .strip_suffix(|c: char| matches!(c, 'b' | 'B' | 's' | 'S' | 'l' | 'L' | 'f' | 'F' | 'd' | 'D'));
    if let Some(number) = suffixed.and_then(parse_number) {
        return number;
    }
    Value::String(literal.to_string())
}

fn parse_number(s: &str) -> Option<Value> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::Number(i.into()));
    }
    if s.chars().any(|c| c.is_ascii_digit()) {
        if let Ok(f) = s.parse::<f64>() {
            return Number::from_f64(f).map(Value::Number);
        }
    }
    None
}
