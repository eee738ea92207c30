//! Block renderer construction from configuration.

use codefence::{BlockRenderer, CssSink, FormatOption, HighlightDivWrapper};
use codefence_config::{Config, LineNumbers, WrapperKind};

/// Marker starting the style sheet written for each highlighted block.
const STYLE_SHEET_MARKER: &str = "/* Background */";

/// Build a renderer from the `[highlight]` settings.
pub(crate) fn build_renderer(config: &Config, css: Option<CssSink>) -> BlockRenderer {
    let settings = &config.highlight;
    let mut renderer = BlockRenderer::new()
        .with_style(settings.style.as_str())
        .with_format_options(format_options(config));

    if settings.wrapper == WrapperKind::Div {
        renderer = renderer.with_wrapper_renderer(HighlightDivWrapper);
    }
    if let Some(sink) = css {
        renderer = renderer.with_css_writer(sink);
    }
    renderer
}

fn format_options(config: &Config) -> Vec<FormatOption> {
    let settings = &config.highlight;
    let mut options = vec![
        FormatOption::WithClasses(settings.classes),
        FormatOption::TabWidth(settings.tab_width),
        FormatOption::BaseLineNumber(settings.line_number_start),
    ];
    match settings.line_numbers {
        LineNumbers::None => {}
        LineNumbers::Inline => options.push(FormatOption::LineNumbers(true)),
        LineNumbers::Table => options.extend([
            FormatOption::LineNumbers(true),
            FormatOption::LineNumbersInTable(true),
        ]),
    }
    options
}

/// Drop repeated style sheets.
///
/// The renderer writes one style sheet per highlighted block; identical
/// sheets are kept once, in order of first appearance.
pub(crate) fn dedup_style_sheets(css: &str) -> String {
    let mut seen: Vec<&str> = Vec::new();
    let mut rest = css;
    while !rest.is_empty() {
        let end = rest
            .get(STYLE_SHEET_MARKER.len()..)
            .and_then(|tail| tail.find(STYLE_SHEET_MARKER))
            .map_or(rest.len(), |pos| pos + STYLE_SHEET_MARKER.len());
        let (sheet, tail) = rest.split_at(end);
        if !seen.contains(&sheet) {
            seen.push(sheet);
        }
        rest = tail;
    }
    seen.concat()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_options_defaults() {
        let config = Config::default();
        assert_eq!(
            format_options(&config),
            vec![
                FormatOption::WithClasses(false),
                FormatOption::TabWidth(8),
                FormatOption::BaseLineNumber(1),
            ]
        );
    }

    #[test]
    fn test_format_options_table_line_numbers() {
        let mut config = Config::default();
        config.highlight.classes = true;
        config.highlight.line_numbers = LineNumbers::Table;
        config.highlight.line_number_start = 3;

        let renderer = build_renderer(&config, None);
        assert_eq!(
            renderer.config().format_options,
            vec![
                FormatOption::WithClasses(true),
                FormatOption::TabWidth(8),
                FormatOption::BaseLineNumber(3),
                FormatOption::LineNumbers(true),
                FormatOption::LineNumbersInTable(true),
            ]
        );
    }

    #[test]
    fn test_build_renderer_style_and_wrapper() {
        let mut config = Config::default();
        config.highlight.style = "Solarized (dark)".to_owned();
        config.highlight.wrapper = WrapperKind::Div;

        let renderer = build_renderer(&config, None);
        assert_eq!(renderer.config().style, "Solarized (dark)");
        assert!(renderer.config().wrapper.is_some());
        assert!(renderer.config().css_writer.is_none());
    }

    #[test]
    fn test_dedup_style_sheets() {
        let a = "/* Background */ .chroma { color: #000; }\n.comment { color: #111; }\n";
        let b = "/* Background */ .chroma { color: #fff; }\n.comment { color: #222; }\n";
        let css = [a, b, a, a, b].concat();
        assert_eq!(dedup_style_sheets(&css), [a, b].concat());
    }

    #[test]
    fn test_dedup_style_sheets_empty() {
        assert_eq!(dedup_style_sheets(""), "");
    }
}
