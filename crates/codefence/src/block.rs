//! Read-only view of a fenced code block supplied by the host pipeline.

use std::ops::Range;

use crate::attributes::Attributes;

/// One fenced code block as produced by the host parser.
///
/// The block does not own its text: `lines` are byte ranges into `source`,
/// in document order and including their trailing newlines. Ranges that do
/// not fall on valid boundaries of `source` are ignored.
#[derive(Clone, Debug)]
pub struct CodeBlock<'a> {
    source: &'a str,
    lines: Vec<Range<usize>>,
    info: Option<&'a str>,
    attributes: Option<Attributes>,
}

impl<'a> CodeBlock<'a> {
    /// Create a block from a source document and the line ranges of its content.
    #[must_use]
    pub fn new(source: &'a str, lines: Vec<Range<usize>>) -> Self {
        Self {
            source,
            lines,
            info: None,
            attributes: None,
        }
    }

    /// Create a block whose content is all of `text`, split after each newline.
    #[must_use]
    pub fn from_text(text: &'a str) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;
        for line in text.split_inclusive('\n') {
            lines.push(start..start + line.len());
            start += line.len();
        }
        Self::new(text, lines)
    }

    /// Set the info string (the text following the opening fence).
    #[must_use]
    pub fn with_info(mut self, info: &'a str) -> Self {
        self.info = Some(info);
        self
    }

    /// Attach attributes already parsed by the host.
    ///
    /// Host attributes take precedence over any `{...}` list embedded in the
    /// info string.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Info string, if the fence had one.
    pub fn info(&self) -> Option<&'a str> {
        self.info
    }

    /// Attributes parsed by the host, if any.
    pub fn attributes(&self) -> Option<&Attributes> {
        self.attributes.as_ref()
    }

    /// Iterate over the content lines in order, trailing newlines included.
    pub fn lines(&self) -> impl Iterator<Item = &'a str> + '_ {
        let source = self.source;
        self.lines.iter().filter_map(move |range| source.get(range.clone()))
    }

    /// Number of content lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Full block text: all lines concatenated in order.
    pub fn text(&self) -> String {
        self.lines().collect()
    }
}
