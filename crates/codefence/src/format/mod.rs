//! Formatter interface and formatter options.
//!
//! A [`Formatter`] turns a [`TokenStream`] and a [`Theme`] into markup, and
//! derives the style sheet for a theme. Options are an ordered list of
//! [`FormatOption`] values folded into [`FormatSettings`]; when two options
//! set the same thing, the later one wins.

mod html;

pub use html::HtmlFormatter;

use std::io::{self, Write};

use syntect::highlighting::Theme;

use crate::error::RenderError;
use crate::highlight::LineRange;
use crate::registry::TokenStream;

/// A single formatter setting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatOption {
    /// Emit CSS classes instead of inline styles.
    WithClasses(bool),
    /// Prefix each line with its number.
    LineNumbers(bool),
    /// Put line numbers in a separate table column instead of inline.
    LineNumbersInTable(bool),
    /// Number displayed for the first line (default 1).
    BaseLineNumber(usize),
    /// Block lines (1-based, independent of the base line number) to emphasize.
    HighlightLines(Vec<LineRange>),
    /// Do not emit the surrounding `<pre>` container.
    PreventSurroundingPre(bool),
    /// Width of a tab character in the rendered block.
    TabWidth(usize),
    /// Language annotation for the `<code>` element.
    Language(String),
}

/// Formatter settings after folding a list of [`FormatOption`]s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatSettings {
    pub classes: bool,
    pub line_numbers: bool,
    pub line_numbers_in_table: bool,
    pub base_line_number: usize,
    pub highlight_lines: Vec<LineRange>,
    pub prevent_surrounding_pre: bool,
    pub tab_width: usize,
    pub language: Option<String>,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            classes: false,
            line_numbers: false,
            line_numbers_in_table: false,
            base_line_number: 1,
            highlight_lines: Vec::new(),
            prevent_surrounding_pre: false,
            tab_width: 8,
            language: None,
        }
    }
}

impl FormatSettings {
    /// Apply options in order on top of the defaults.
    pub fn from_options(options: &[FormatOption]) -> Self {
        let mut settings = Self::default();
        for option in options {
            settings.apply(option);
        }
        settings
    }

    fn apply(&mut self, option: &FormatOption) {
        match option {
            FormatOption::WithClasses(enabled) => self.classes = *enabled,
            FormatOption::LineNumbers(enabled) => self.line_numbers = *enabled,
            FormatOption::LineNumbersInTable(enabled) => self.line_numbers_in_table = *enabled,
            FormatOption::BaseLineNumber(start) => self.base_line_number = *start,
            FormatOption::HighlightLines(ranges) => self.highlight_lines.clone_from(ranges),
            FormatOption::PreventSurroundingPre(enabled) => {
                self.prevent_surrounding_pre = *enabled;
            }
            FormatOption::TabWidth(width) => self.tab_width = *width,
            FormatOption::Language(language) => self.language = Some(language.clone()),
        }
    }

    /// Whether the 1-based block line `line` is emphasized by any range.
    pub fn is_highlighted(&self, line: usize) -> bool {
        self.highlight_lines.iter().any(|range| range.contains(line))
    }

    /// Whether line numbers go into a separate table column.
    ///
    /// The table layout needs its own containers, so it is not used when the
    /// surrounding `<pre>` is suppressed; numbers are then rendered inline.
    pub fn uses_table(&self) -> bool {
        self.line_numbers && self.line_numbers_in_table && !self.prevent_surrounding_pre
    }
}

/// Renders token streams to markup.
///
/// Implementations must write nothing but markup to `out`; failing writes
/// are returned unchanged so the renderer can propagate them.
pub trait Formatter: Send + Sync {
    /// Write highlighted markup for `tokens` using `theme`.
    fn format(
        &self,
        out: &mut dyn Write,
        theme: &Theme,
        tokens: &TokenStream,
        options: &[FormatOption],
    ) -> io::Result<()>;

    /// Write the style sheet rules for `theme`.
    fn write_css(
        &self,
        out: &mut dyn Write,
        theme: &Theme,
        options: &[FormatOption],
    ) -> Result<(), RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_settings() {
        let settings = FormatSettings::from_options(&[]);
        assert_eq!(settings, FormatSettings::default());
        assert_eq!(settings.base_line_number, 1);
        assert!(!settings.uses_table());
    }

    #[test]
    fn test_later_options_win() {
        let settings = FormatSettings::from_options(&[
            FormatOption::WithClasses(true),
            FormatOption::TabWidth(4),
            FormatOption::WithClasses(false),
            FormatOption::HighlightLines(vec![LineRange::single(1)]),
            FormatOption::HighlightLines(vec![LineRange::new(2, 3)]),
        ]);
        assert!(!settings.classes);
        assert_eq!(settings.tab_width, 4);
        assert_eq!(settings.highlight_lines, vec![LineRange::new(2, 3)]);
    }

    #[test]
    fn test_is_highlighted_unions_ranges() {
        let settings = FormatSettings::from_options(&[FormatOption::HighlightLines(vec![
            LineRange::new(2, 3),
            LineRange::single(5),
        ])]);
        let lines: Vec<_> = (1..=6).filter(|&l| settings.is_highlighted(l)).collect();
        assert_eq!(lines, vec![2, 3, 5]);
    }

    #[test]
    fn test_table_requires_surrounding_pre() {
        let mut options = vec![
            FormatOption::LineNumbers(true),
            FormatOption::LineNumbersInTable(true),
        ];
        assert!(FormatSettings::from_options(&options).uses_table());
        options.push(FormatOption::PreventSurroundingPre(true));
        assert!(!FormatSettings::from_options(&options).uses_table());
    }
}
