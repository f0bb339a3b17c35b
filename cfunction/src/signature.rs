//! Static parsing of parameter-list text into parameter declarations.
//!
//! Defaults are read as literals and never evaluated. The list is split on
//! top-level commas only, so commas inside object literals, arrays, or strings
//! stay with their parameter.
//!
//! ```rust
//! use cfunction::parse_signature;
//! use serde_json::json;
//!
//! let parameters = parse_signature(r#"a = {b: 1, c: "x"}, d"#).expect("signature should parse");
//! assert_eq!(parameters.len(), 2);
//! assert_eq!(parameters[0].default, Some(json!({"b": 1, "c": "x"})));
//! assert_eq!(parameters[1].default, None);
//! ```

use serde_json::{Map, Number, Value};

use crate::{FunctionError, Parameter};

pub fn parse_signature(signature: &str) -> Result<Vec<Parameter>, FunctionError> {
    let mut pieces = split_top_level(signature, ',')
        .map_err(|message| FunctionError::schema_derivation("<signature>", message))?;

    if pieces.last().is_some_and(|piece| piece.trim().is_empty()) {
        pieces.pop();
    }

    let mut parameters = Vec::with_capacity(pieces.len());
    for (index, piece) in pieces.into_iter().enumerate() {
        let (name, default) = match piece.split_once('=') {
            Some((name, default)) => (name.trim(), Some(default.trim())),
            None => (piece.trim(), None),
        };

        if name.is_empty() {
            return Err(FunctionError::schema_derivation(
                format!("#{index}"),
                "parameter name is missing",
            ));
        }

        if !is_identifier(name) {
            return Err(FunctionError::schema_derivation(
                name,
                "parameter name is not a plain identifier",
            ));
        }

        let mut parameter = Parameter::new(name);
        if let Some(default) = default {
            let value = parse_literal(default)
                .map_err(|message| FunctionError::schema_derivation(name, message))?;
            parameter = parameter.with_default(value);
        }

        parameters.push(parameter);
    }

    Ok(parameters)
}

/// Parses a single literal expression (object, array, string, number, boolean, null).
pub fn parse_literal(source: &str) -> Result<Value, String> {
    let mut parser = LiteralParser::new(source);
    let value = parser.value()?;
    parser.skip_whitespace();

    if !parser.at_end() {
        return Err(format!("unexpected trailing input '{}'", parser.rest()));
    }

    Ok(value)
}

fn split_top_level(source: &str, separator: char) -> Result<Vec<&str>, String> {
    let mut pieces = Vec::new();
    let mut depth = 0_usize;
    let mut quote = None::<char>;
    let mut escaped = false;
    let mut start = 0;

    for (index, ch) in source.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == open {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            '{' | '[' | '(' => depth += 1,
            '}' | ']' | ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| format!("unbalanced '{ch}'"))?;
            }
            _ if ch == separator && depth == 0 => {
                pieces.push(&source[start..index]);
                start = index + ch.len_utf8();
            }
            _ => {}
        }
    }

    if quote.is_some() {
        return Err("unterminated string literal".to_string());
    }

    if depth != 0 {
        return Err("unbalanced brackets".to_string());
    }

    pieces.push(&source[start..]);
    Ok(pieces)
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    chars.next().is_some_and(is_identifier_start) && chars.all(is_identifier_continue)
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

struct LiteralParser {
    chars: Vec<char>,
    position: usize,
}

impl LiteralParser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            position: 0,
        }
    }

    fn value(&mut self) -> Result<Value, String> {
        self.skip_whitespace();
        match self.peek() {
            None => Err("expected a literal".to_string()),
            Some('{') => self.object(),
            Some('[') => self.array(),
            Some(quote @ ('"' | '\'')) => self.string(quote).map(Value::String),
            Some(ch) if ch == '-' || ch == '+' || ch == '.' || ch.is_ascii_digit() => self.number(),
            Some(ch) if is_identifier_start(ch) => self.keyword(),
            Some(ch) => Err(format!("unexpected character '{ch}'")),
        }
    }

    fn object(&mut self) -> Result<Value, String> {
        self.expect('{')?;
        let mut members = Map::new();

        loop {
            self.skip_whitespace();
            if self.eat('}') {
                return Ok(Value::Object(members));
            }

            let key = self.key()?;
            self.skip_whitespace();
            self.expect(':')?;
            let value = self.value()?;
            members.insert(key, value);

            self.skip_whitespace();
            if self.eat(',') {
                continue;
            }

            self.expect('}')?;
            return Ok(Value::Object(members));
        }
    }

    fn array(&mut self) -> Result<Value, String> {
        self.expect('[')?;
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            if self.eat(']') {
                return Ok(Value::Array(items));
            }

            items.push(self.value()?);

            self.skip_whitespace();
            if self.eat(',') {
                continue;
            }

            self.expect(']')?;
            return Ok(Value::Array(items));
        }
    }

    fn key(&mut self) -> Result<String, String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => self.string(quote),
            Some(ch) if is_identifier_start(ch) => Ok(self.identifier()),
            Some(ch) if ch.is_ascii_digit() => Ok(self.take_while(|ch| ch.is_ascii_digit())),
            Some(ch) => Err(format!("unexpected character '{ch}' in object key")),
            None => Err("unterminated object literal".to_string()),
        }
    }

    fn string(&mut self, quote: char) -> Result<String, String> {
        self.expect(quote)?;
        let mut text = String::new();

        loop {
            let Some(ch) = self.next() else {
                return Err("unterminated string literal".to_string());
            };

            if ch == quote {
                return Ok(text);
            }

            if ch != '\\' {
                text.push(ch);
                continue;
            }

            let escaped = self
                .next()
                .ok_or_else(|| "unterminated escape sequence".to_string())?;
            match escaped {
                'n' => text.push('\n'),
                't' => text.push('\t'),
                'r' => text.push('\r'),
                'b' => text.push('\u{8}'),
                'f' => text.push('\u{c}'),
                'v' => text.push('\u{b}'),
                '0' => text.push('\0'),
                'u' => text.push(self.unicode_escape()?),
                other => text.push(other),
            }
        }
    }

    fn unicode_escape(&mut self) -> Result<char, String> {
        let digits = (0..4)
            .map(|_| self.next())
            .collect::<Option<String>>()
            .ok_or_else(|| "truncated unicode escape".to_string())?;

        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| format!("invalid unicode escape '\\u{digits}'"))
    }

    fn number(&mut self) -> Result<Value, String> {
        let mut text = String::new();
        if let Some(sign @ ('-' | '+')) = self.peek() {
            self.position += 1;
            if sign == '-' {
                text.push('-');
            }
            self.skip_whitespace();
        }

        let digits = self.take_while(|ch| ch.is_ascii_digit() || ch == '.');
        text.push_str(&digits);

        if matches!(self.peek(), Some('e' | 'E')) {
            text.push('e');
            self.position += 1;
            if let Some(sign @ ('-' | '+')) = self.peek() {
                text.push(sign);
                self.position += 1;
            }
            text.push_str(&self.take_while(|ch| ch.is_ascii_digit()));
        }

        if digits.is_empty() || digits == "." {
            return Err(format!("malformed number '{text}'"));
        }

        let is_integral = !text.contains(['.', 'e']);
        if is_integral && let Ok(integer) = text.parse::<i64>() {
            return Ok(Value::from(integer));
        }

        let float = text
            .parse::<f64>()
            .map_err(|_| format!("malformed number '{text}'"))?;
        Number::from_f64(float)
            .map(Value::Number)
            .ok_or_else(|| format!("number '{text}' is not finite"))
    }

    fn keyword(&mut self) -> Result<Value, String> {
        let word = self.identifier();
        match word.as_str() {
            "null" | "undefined" => Ok(Value::Null),
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(format!("'{word}' is not a literal")),
        }
    }

    fn identifier(&mut self) -> String {
        self.take_while(is_identifier_continue)
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let start = self.position;
        while self.peek().is_some_and(&predicate) {
            self.position += 1;
        }

        self.chars[start..self.position].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.position += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        match self.next() {
            Some(ch) if ch == expected => Ok(()),
            Some(ch) => Err(format!("expected '{expected}' but found '{ch}'")),
            None => Err(format!("expected '{expected}' but reached the end")),
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            return true;
        }

        false
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    fn rest(&self) -> String {
        self.chars[self.position..].iter().collect()
    }
}
