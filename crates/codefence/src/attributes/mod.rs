//! Attribute resolution for code blocks.
//!
//! Block attributes reach the renderer in one of two forms:
//! - structured attributes parsed by the host and attached to the block
//! - a legacy `{...}` list embedded in the info string, e.g.
//!   ```` ```go {hl_lines=["2-3"], linenostart=5} ````
//!
//! [`resolve`] tries both in that order and produces a single
//! [`HighlightAttributes`]. When the host supplied attributes, the embedded
//! list is not parsed at all.

mod parser;

pub use parser::parse_attributes;

use crate::block::CodeBlock;

/// Value of a block attribute.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum AttributeValue {
    /// `null`.
    Null,
    /// `true` / `false`, also used for presence-only attributes.
    Bool(bool),
    /// Any numeric literal.
    Number(f64),
    /// Quoted string or bare word.
    String(String),
    /// `[v, v, ...]`.
    Array(Vec<AttributeValue>),
}

impl AttributeValue {
    /// String content, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Elements, if this is an array.
    pub fn as_array(&self) -> Option<&[AttributeValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

/// A single named attribute.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Attribute value.
    pub value: AttributeValue,
}

/// Ordered list of block attributes.
///
/// Names are unique: setting an existing name replaces its value in place.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attributes {
    entries: Vec<Attribute>,
}

impl Attributes {
    /// Create an empty attribute list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any previous value with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|attr| attr.name == name) {
            Some(existing) => existing.value = value,
            None => self.entries.push(Attribute { name, value }),
        }
    }

    /// Look up an attribute value by name.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| &attr.value)
    }

    /// Whether an attribute with this name is present, whatever its value.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (name, value) in iter {
            attrs.set(name, value);
        }
        attrs
    }
}

/// Language and attributes resolved for one block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HighlightAttributes<'a> {
    /// Language name; `None` when the block has no (non-empty) language.
    pub language: Option<&'a str>,
    /// Block attributes, if any source provided them.
    pub attributes: Option<Attributes>,
}

/// Resolve the language name and attributes of a block.
///
/// Host attributes win: when present they are copied and the info string is
/// used as the language as-is, without trimming or further parsing. Otherwise a `{...}` list
/// following a language name in the info string is parsed; if it does not
/// parse, the whole info string is the language and there are no attributes.
/// A `{` at the very start of the info string never starts an attribute list.
pub fn resolve<'a>(block: &CodeBlock<'a>) -> HighlightAttributes<'a> {
    if let Some(attributes) = block.attributes() {
        return HighlightAttributes {
            language: block.info().filter(|lang| !lang.is_empty()),
            attributes: Some(attributes.clone()),
        };
    }

    let Some(info) = block.info() else {
        return HighlightAttributes::default();
    };

    if let Some(brace) = info.find('{')
        && brace > 0
        && let Some(attributes) = parse_attributes(&info[brace..])
    {
        let language = info[..brace].trim();
        return HighlightAttributes {
            language: (!language.is_empty()).then_some(language),
            attributes: Some(attributes),
        };
    }

    let language = info.trim();
    HighlightAttributes {
        language: (!language.is_empty()).then_some(language),
        attributes: None,
    }
}
