//! Parser for the legacy `{...}` attribute list of fence info strings.
//!
//! Grammar:
//!
//! ```text
//! list    = "{" { sep | entry } "}"
//! sep     = whitespace | ","
//! entry   = "#" name | "." name | name [ "=" value ]
//! value   = string | array | word
//! array   = "[" [ value { "," value } [ "," ] ] "]"
//! ```
//!
//! Words that look like numbers become numbers, `true`/`false`/`null` become
//! the matching literal, any other word is a string. A bare name is a
//! presence-only attribute with value `true`. `#id` sets `id`, `.name` adds a
//! class (repeated classes are joined with a space).

use super::{AttributeValue, Attributes};

/// Deepest accepted array nesting.
const MAX_ARRAY_DEPTH: usize = 32;

/// Parse an attribute list such as `{hl_lines=["2-3", 5], linenostart=5}`.
///
/// The input must start with `{`; only whitespace may follow the closing `}`.
/// Returns `None` if any part fails to parse.
pub fn parse_attributes(input: &str) -> Option<Attributes> {
    let mut cursor = Cursor::new(input);
    let attrs = cursor.list()?;
    cursor.skip_whitespace();
    cursor.is_at_end().then_some(attrs)
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn rest(&self) -> &'a str {
        let input = self.input;
        &input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        let input = self.input;
        &input[start..self.pos]
    }

    fn list(&mut self) -> Option<Attributes> {
        if !self.eat('{') {
            return None;
        }
        let mut attrs = Attributes::new();
        loop {
            while self.peek().is_some_and(|c| c.is_whitespace() || c == ',') {
                self.bump();
            }
            match self.peek()? {
                '}' => {
                    self.bump();
                    return Some(attrs);
                }
                '#' => {
                    self.bump();
                    let id = self.name()?;
                    attrs.set("id", id);
                }
                '.' => {
                    self.bump();
                    let class = self.name()?;
                    let merged = match attrs.get("class").and_then(AttributeValue::as_str) {
                        Some(existing) => format!("{existing} {class}"),
                        None => class.to_owned(),
                    };
                    attrs.set("class", merged);
                }
                _ => {
                    let name = self.name()?;
                    self.skip_whitespace();
                    if self.eat('=') {
                        self.skip_whitespace();
                        let value = self.value()?;
                        attrs.set(name, value);
                    } else {
                        attrs.set(name, true);
                    }
                }
            }
        }
    }

    fn name(&mut self) -> Option<&'a str> {
        let first = self.peek()?;
        if !(first.is_alphabetic() || first == '_' || first == ':') {
            return None;
        }
        Some(self.take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | ':')))
    }

    fn value(&mut self) -> Option<AttributeValue> {
        match self.peek()? {
            '"' => self.string().map(AttributeValue::String),
            '[' => self.array(),
            _ => self.word(),
        }
    }

    fn string(&mut self) -> Option<String> {
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump()? {
                '"' => return Some(value),
                '\\' => match self.bump()? {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    other => value.push(other),
                },
                c => value.push(c),
            }
        }
    }

    fn array(&mut self) -> Option<AttributeValue> {
        if self.depth >= MAX_ARRAY_DEPTH {
            return None;
        }
        self.depth += 1;
        let value = self.array_items();
        self.depth -= 1;
        value
    }

    fn array_items(&mut self) -> Option<AttributeValue> {
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat(']') {
                return Some(AttributeValue::Array(items));
            }
            items.push(self.value()?);
            self.skip_whitespace();
            if !self.eat(',') {
                self.skip_whitespace();
                return self.eat(']').then_some(AttributeValue::Array(items));
            }
        }
    }

    fn word(&mut self) -> Option<AttributeValue> {
        let word = self.take_while(|c| {
            !c.is_whitespace() && !matches!(c, ',' | '{' | '}' | '[' | ']' | '"' | '=')
        });
        if word.is_empty() {
            return None;
        }
        let value = match word {
            "true" => AttributeValue::Bool(true),
            "false" => AttributeValue::Bool(false),
            "null" => AttributeValue::Null,
            _ => parse_number(word).map_or_else(
                || AttributeValue::String(word.to_owned()),
                AttributeValue::Number,
            ),
        };
        Some(value)
    }
}

/// Parse a numeric word. Words such as `inf` or `NaN` stay strings.
fn parse_number(word: &str) -> Option<f64> {
    let starts_numeric = word
        .trim_start_matches(['-', '+'])
        .starts_with(|c: char| c.is_ascii_digit() || c == '.');
    if !starts_numeric {
        return None;
    }
    word.parse::<f64>().ok().filter(|n| n.is_finite())
}
