//! Per-block highlighting configuration.
//!
//! [`HighlightConfig::resolve`] combines the renderer defaults with the
//! attributes of one block. Every malformed or unknown value degrades to a
//! default; resolution itself never fails.

use crate::attributes::{AttributeValue, Attributes};
use crate::format::FormatOption;
use crate::renderer::RendererConfig;

/// Lines to emphasize, e.g. `hl_lines=["2-3", 5]`.
pub const HL_LINES_ATTR: &str = "hl_lines";
/// Per-block style override, e.g. `hl_style="monokai"`.
pub const HL_STYLE_ATTR: &str = "hl_style";
/// Presence-only opt-out marker.
pub const NOHL_ATTR: &str = "nohl";
/// Line numbers: `true`, `false`, `"inline"` or `"table"`.
pub const LINENOS_ATTR: &str = "linenos";
/// Number of the first displayed line.
pub const LINENOSTART_ATTR: &str = "linenostart";

/// Closed, 1-based range of block lines `[lo, hi]`.
///
/// Ranges are not normalized: an inverted range (`lo > hi`) matches no line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LineRange {
    /// First line of the range.
    pub lo: usize,
    /// Last line of the range (inclusive).
    pub hi: usize,
}

impl LineRange {
    #[must_use]
    pub const fn new(lo: usize, hi: usize) -> Self {
        Self { lo, hi }
    }

    /// Range covering exactly one line.
    #[must_use]
    pub const fn single(line: usize) -> Self {
        Self { lo: line, hi: line }
    }

    /// Whether `line` (1-based) lies inside the range.
    pub fn contains(&self, line: usize) -> bool {
        self.lo <= line && line <= self.hi
    }

    /// Parse `"n"` or `"lo-hi"`. Returns `None` if either bound is not a number.
    pub fn parse(s: &str) -> Option<Self> {
        match s.split_once('-') {
            Some((lo, hi)) => Some(Self::new(parse_line(lo)?, parse_line(hi)?)),
            None => parse_line(s).map(Self::single),
        }
    }

    fn from_value(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Number(n) => line_from_number(*n).map(Self::single),
            AttributeValue::String(s) => Self::parse(s),
            _ => None,
        }
    }
}

fn parse_line(s: &str) -> Option<usize> {
    s.trim().parse().ok()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn line_from_number(n: f64) -> Option<usize> {
    (n.is_finite() && n >= 0.0).then_some(n as usize)
}

/// Resolved highlighting configuration for one block.
#[derive(Clone, Debug, PartialEq)]
pub struct HighlightConfig {
    /// Requested style name. Unknown names fall back at theme lookup.
    pub style: String,
    /// Lines to emphasize, in input order.
    pub line_ranges: Vec<LineRange>,
    /// Opt-out: render the block without highlighting.
    pub nohl: bool,
    /// Formatter options: renderer defaults, then block overrides.
    pub format_options: Vec<FormatOption>,
}

impl HighlightConfig {
    /// Build the configuration for one block from renderer defaults and the
    /// block attributes.
    pub fn resolve(defaults: &RendererConfig, attributes: Option<&Attributes>) -> Self {
        let mut config = Self {
            style: defaults.style.clone(),
            line_ranges: Vec::new(),
            nohl: false,
            format_options: defaults.format_options.clone(),
        };
        let Some(attrs) = attributes else {
            return config;
        };

        if let Some(style) = attrs.get(HL_STYLE_ATTR).and_then(AttributeValue::as_str) {
            style.clone_into(&mut config.style);
        }
        config.nohl = attrs.contains(NOHL_ATTR);

        if let Some(value) = attrs.get(LINENOS_ATTR) {
            config.format_options.extend(line_number_options(value));
        }
        if let Some(start) = attrs.get(LINENOSTART_ATTR).and_then(line_number_start) {
            config.format_options.push(FormatOption::BaseLineNumber(start));
        }

        if let Some(value) = attrs.get(HL_LINES_ATTR) {
            config.line_ranges = match value {
                AttributeValue::Array(items) => {
                    items.iter().filter_map(LineRange::from_value).collect()
                }
                scalar => LineRange::from_value(scalar).into_iter().collect(),
            };
            config
                .format_options
                .push(FormatOption::HighlightLines(config.line_ranges.clone()));
        }

        config
    }
}

fn line_number_options(value: &AttributeValue) -> Vec<FormatOption> {
    let mode = match value {
        AttributeValue::Bool(enabled) => return vec![FormatOption::LineNumbers(*enabled)],
        AttributeValue::String(mode) => mode.as_str(),
        _ => return Vec::new(),
    };
    match mode {
        "true" | "inline" => vec![
            FormatOption::LineNumbers(true),
            FormatOption::LineNumbersInTable(false),
        ],
        "table" => vec![
            FormatOption::LineNumbers(true),
            FormatOption::LineNumbersInTable(true),
        ],
        "false" => vec![FormatOption::LineNumbers(false)],
        _ => Vec::new(),
    }
}

fn line_number_start(value: &AttributeValue) -> Option<usize> {
    match value {
        AttributeValue::Number(n) => line_from_number(*n),
        AttributeValue::String(s) => parse_line(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::parse_attributes;
    use pretty_assertions::assert_eq;

    fn resolve(attrs: &str) -> HighlightConfig {
        let attrs = parse_attributes(attrs).unwrap();
        HighlightConfig::resolve(&RendererConfig::default(), Some(&attrs))
    }

    #[test]
    fn test_line_range_parse() {
        assert_eq!(LineRange::parse("2-3"), Some(LineRange::new(2, 3)));
        assert_eq!(LineRange::parse("7"), Some(LineRange::single(7)));
        assert_eq!(LineRange::parse(" 4 - 6 "), Some(LineRange::new(4, 6)));
        assert_eq!(LineRange::parse("x-y"), None);
        assert_eq!(LineRange::parse("2-"), None);
        assert_eq!(LineRange::parse("1-2-3"), None);
        assert_eq!(LineRange::parse(""), None);
    }

    #[test]
    fn test_line_range_contains() {
        let range = LineRange::new(2, 4);
        assert!(!range.contains(1));
        assert!(range.contains(2));
        assert!(range.contains(4));
        assert!(!range.contains(5));
        assert!(!LineRange::new(5, 3).contains(4));
    }

    #[test]
    fn test_resolve_without_attributes_uses_defaults() {
        let defaults = RendererConfig {
            style: "monokai".to_owned(),
            format_options: vec![FormatOption::WithClasses(true)],
            ..RendererConfig::default()
        };
        let config = HighlightConfig::resolve(&defaults, None);
        assert_eq!(config.style, "monokai");
        assert!(config.line_ranges.is_empty());
        assert!(!config.nohl);
        assert_eq!(config.format_options, vec![FormatOption::WithClasses(true)]);
    }

    #[test]
    fn test_resolve_mixed_line_ranges() {
        let config = resolve(r#"{hl_lines=["2-3",5],linenostart=5}"#);
        assert_eq!(
            config.line_ranges,
            vec![LineRange::new(2, 3), LineRange::single(5)]
        );
        assert_eq!(
            config.format_options.last(),
            Some(&FormatOption::HighlightLines(vec![
                LineRange::new(2, 3),
                LineRange::single(5)
            ]))
        );
        assert!(
            config
                .format_options
                .contains(&FormatOption::BaseLineNumber(5))
        );
    }

    #[test]
    fn test_resolve_single_string_line() {
        let config = resolve(r#"{hl_lines=["2"]}"#);
        assert_eq!(config.line_ranges, vec![LineRange::single(2)]);
    }

    #[test]
    fn test_resolve_malformed_range_is_skipped() {
        let config = resolve(r#"{hl_lines=["x-y", "1-2", 4, true]}"#);
        assert_eq!(
            config.line_ranges,
            vec![LineRange::new(1, 2), LineRange::single(4)]
        );
    }

    #[test]
    fn test_resolve_fully_unparsable_ranges_is_empty() {
        let config = resolve(r#"{hl_lines=["a", "b-c"]}"#);
        assert!(config.line_ranges.is_empty());
        assert_eq!(
            config.format_options.last(),
            Some(&FormatOption::HighlightLines(Vec::new()))
        );
    }

    #[test]
    fn test_resolve_inverted_range_is_kept() {
        let config = resolve(r#"{hl_lines=["5-3"]}"#);
        assert_eq!(config.line_ranges, vec![LineRange::new(5, 3)]);
    }

    #[test]
    fn test_resolve_style_override() {
        let config = resolve(r#"{hl_style="Solarized (dark)"}"#);
        assert_eq!(config.style, "Solarized (dark)");
    }

    #[test]
    fn test_resolve_nohl_presence_only() {
        assert!(resolve("{nohl}").nohl);
        assert!(resolve("{nohl=false}").nohl);
        assert!(!resolve("{linenos=true}").nohl);
    }

    #[test]
    fn test_resolve_linenos_modes() {
        assert_eq!(
            resolve("{linenos=true}").format_options,
            vec![FormatOption::LineNumbers(true)]
        );
        assert_eq!(
            resolve("{linenos=table}").format_options,
            vec![
                FormatOption::LineNumbers(true),
                FormatOption::LineNumbersInTable(true)
            ]
        );
        assert_eq!(
            resolve(r#"{linenos="inline"}"#).format_options,
            vec![
                FormatOption::LineNumbers(true),
                FormatOption::LineNumbersInTable(false)
            ]
        );
        assert!(resolve("{linenos=sideways}").format_options.is_empty());
    }

    #[test]
    fn test_resolve_block_options_follow_defaults() {
        let defaults = RendererConfig {
            format_options: vec![FormatOption::LineNumbers(true)],
            ..RendererConfig::default()
        };
        let attrs = parse_attributes("{linenos=false, linenostart=10}").unwrap();
        let config = HighlightConfig::resolve(&defaults, Some(&attrs));
        assert_eq!(
            config.format_options,
            vec![
                FormatOption::LineNumbers(true),
                FormatOption::LineNumbers(false),
                FormatOption::BaseLineNumber(10),
            ]
        );
    }
}
