//! HTML formatter.
//!
//! Produces chroma-style markup:
//! - `<pre class="chroma"><code>` container (or inline `style` attributes)
//! - `<span class="hl">` around emphasized lines
//! - `<span class="ln">` inline line numbers, or a `lntable` two-column table
//! - nested `<span>`s named after the `syntect` scope atoms in class mode,
//!   matching the rules from [`css_for_theme_with_class_style`]

use std::io::{self, Write};

use syntect::highlighting::{Color, FontStyle, Highlighter, Style, Theme};
use syntect::html::{ClassStyle, css_for_theme_with_class_style};
use syntect::parsing::Scope;

use super::{FormatOption, FormatSettings, Formatter};
use crate::error::RenderError;
use crate::registry::{Token, TokenStream};
use crate::util::escape_html;

const DEFAULT_LINE_HIGHLIGHT: Color = Color {
    r: 0xe5,
    g: 0xe5,
    b: 0xe5,
    a: 0xff,
};

const DEFAULT_GUTTER: Color = Color {
    r: 0x7f,
    g: 0x7f,
    b: 0x7f,
    a: 0xff,
};

const LINE_NUMBER_STYLE: &str = "margin-right:0.4em;padding:0 0.4em 0 0.4em";
const TABLE_STYLE: &str =
    "border-spacing:0;padding:0;margin:0;border:0;width:auto;overflow:auto;display:block";
const TABLE_CELL_STYLE: &str = "vertical-align:top;padding:0;margin:0;border:0";

/// Formatter producing HTML markup.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlFormatter;

impl Formatter for HtmlFormatter {
    fn format(
        &self,
        out: &mut dyn Write,
        theme: &Theme,
        tokens: &TokenStream,
        options: &[FormatOption],
    ) -> io::Result<()> {
        let settings = FormatSettings::from_options(options);
        HtmlWriter {
            out,
            settings: &settings,
            palette: Palette::new(theme),
            highlighter: Highlighter::new(theme),
        }
        .write(tokens)
    }

    fn write_css(
        &self,
        out: &mut dyn Write,
        theme: &Theme,
        options: &[FormatOption],
    ) -> Result<(), RenderError> {
        let settings = FormatSettings::from_options(options);
        let palette = Palette::new(theme);
        let tab = settings.tab_width;
        let gutter = hex(palette.gutter);

        writeln!(
            out,
            "/* Background */ .chroma {{ color: {}; background-color: {}; -moz-tab-size: {tab}; tab-size: {tab}; }}",
            hex(palette.foreground),
            hex(palette.background)
        )?;
        writeln!(
            out,
            "/* LineTableTD */ .chroma .lntd {{ vertical-align: top; padding: 0; margin: 0; border: 0; }}"
        )?;
        writeln!(
            out,
            "/* LineTable */ .chroma .lntable {{ border-spacing: 0; padding: 0; margin: 0; border: 0; width: auto; overflow: auto; display: block; }}"
        )?;
        writeln!(
            out,
            "/* LineHighlight */ .chroma .hl {{ display: block; width: 100%; background-color: {}; }}",
            hex(palette.line_highlight)
        )?;
        writeln!(
            out,
            "/* LineNumbersTable */ .chroma .lnt {{ margin-right: 0.4em; padding: 0 0.4em 0 0.4em; color: {gutter}; }}"
        )?;
        writeln!(
            out,
            "/* LineNumbers */ .chroma .ln {{ margin-right: 0.4em; padding: 0 0.4em 0 0.4em; color: {gutter}; }}"
        )?;

        let rules = css_for_theme_with_class_style(theme, ClassStyle::Spaced)?;
        out.write_all(rules.as_bytes())?;
        Ok(())
    }
}

/// Colors the formatter needs outside of token styles.
struct Palette {
    foreground: Color,
    background: Color,
    line_highlight: Color,
    gutter: Color,
}

impl Palette {
    fn new(theme: &Theme) -> Self {
        let settings = &theme.settings;
        Self {
            foreground: settings.foreground.unwrap_or(Color::BLACK),
            background: settings.background.unwrap_or(Color::WHITE),
            line_highlight: settings.line_highlight.unwrap_or(DEFAULT_LINE_HIGHLIGHT),
            gutter: settings.gutter_foreground.unwrap_or(DEFAULT_GUTTER),
        }
    }
}

fn hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

/// Space-separated scope atoms, e.g. `keyword control go`.
fn scope_class(scope: Scope) -> String {
    scope.build_string().replace('.', " ")
}

struct HtmlWriter<'a> {
    out: &'a mut dyn Write,
    settings: &'a FormatSettings,
    palette: Palette,
    highlighter: Highlighter<'a>,
}

impl HtmlWriter<'_> {
    fn write(mut self, tokens: &TokenStream) -> io::Result<()> {
        let lines = tokens.lines();
        if self.settings.uses_table() {
            return self.write_table(lines);
        }

        let wrap = !self.settings.prevent_surrounding_pre;
        if wrap {
            self.open_pre(true)?;
        }
        for (index, line) in lines.iter().enumerate() {
            self.write_line(index, line, self.settings.line_numbers)?;
        }
        if wrap {
            self.out.write_all(b"</code></pre>\n")?;
        }
        Ok(())
    }

    fn write_table(&mut self, lines: &[Vec<Token>]) -> io::Result<()> {
        if self.settings.classes {
            self.out.write_all(br#"<div class="chroma"><table class="lntable"><tr><td class="lntd">"#)?;
        } else {
            write!(
                self.out,
                r#"<div style="{}"><table style="{TABLE_STYLE}"><tr><td style="{TABLE_CELL_STYLE}">"#,
                self.pre_style()
            )?;
        }

        self.open_pre(false)?;
        for index in 0..lines.len() {
            let highlighted = self.open_highlight(index)?;
            self.write_line_number(index, "lnt", "\n")?;
            if highlighted {
                self.out.write_all(b"</span>")?;
            }
        }
        self.out.write_all(b"</code></pre></td>")?;

        if self.settings.classes {
            self.out.write_all(br#"<td class="lntd">"#)?;
        } else {
            write!(self.out, r#"<td style="{TABLE_CELL_STYLE};width:100%">"#)?;
        }
        self.open_pre(true)?;
        for (index, line) in lines.iter().enumerate() {
            self.write_line(index, line, false)?;
        }
        self.out.write_all(b"</code></pre></td></tr></table></div>\n")
    }

    fn pre_style(&self) -> String {
        let tab = self.settings.tab_width;
        format!(
            "color:{};background-color:{};-moz-tab-size:{tab};tab-size:{tab}",
            hex(self.palette.foreground),
            hex(self.palette.background)
        )
    }

    fn open_pre(&mut self, with_language: bool) -> io::Result<()> {
        if self.settings.classes {
            self.out.write_all(br#"<pre class="chroma">"#)?;
        } else {
            write!(self.out, r#"<pre style="{}">"#, self.pre_style())?;
        }

        match self.settings.language.as_deref() {
            Some(language) if with_language => {
                self.out.write_all(br#"<code class="language-"#)?;
                escape_html(self.out, language)?;
                self.out.write_all(br#"" data-lang=""#)?;
                escape_html(self.out, language)?;
                self.out.write_all(br#"">"#)
            }
            _ => self.out.write_all(b"<code>"),
        }
    }

    /// Open the emphasis span if block line `index` is highlighted.
    fn open_highlight(&mut self, index: usize) -> io::Result<bool> {
        if !self.settings.is_highlighted(index + 1) {
            return Ok(false);
        }
        if self.settings.classes {
            self.out.write_all(br#"<span class="hl">"#)?;
        } else {
            write!(
                self.out,
                r#"<span style="display:block;width:100%;background-color:{}">"#,
                hex(self.palette.line_highlight)
            )?;
        }
        Ok(true)
    }

    fn write_line_number(&mut self, index: usize, class: &str, suffix: &str) -> io::Result<()> {
        let number = self.settings.base_line_number.saturating_add(index);
        if self.settings.classes {
            write!(self.out, r#"<span class="{class}">{number}{suffix}</span>"#)
        } else {
            write!(
                self.out,
                r#"<span style="{LINE_NUMBER_STYLE};color:{}">{number}{suffix}</span>"#,
                hex(self.palette.gutter)
            )
        }
    }

    fn write_line(&mut self, index: usize, tokens: &[Token], numbered: bool) -> io::Result<()> {
        let highlighted = self.open_highlight(index)?;
        if numbered {
            self.write_line_number(index, "ln", "")?;
        }
        if self.settings.classes {
            self.write_classed(tokens)?;
        } else {
            self.write_styled(tokens)?;
        }
        if highlighted {
            self.out.write_all(b"</span>")?;
        }
        Ok(())
    }

    /// Emit one span per scope, reusing spans shared with the previous token.
    /// All spans are closed at the end of the line.
    fn write_classed(&mut self, tokens: &[Token]) -> io::Result<()> {
        let mut open: &[Scope] = &[];
        for token in tokens {
            let common = open
                .iter()
                .zip(&token.scopes)
                .take_while(|(a, b)| a == b)
                .count();
            for _ in common..open.len() {
                self.out.write_all(b"</span>")?;
            }
            for scope in &token.scopes[common..] {
                self.out.write_all(br#"<span class=""#)?;
                escape_html(self.out, &scope_class(*scope))?;
                self.out.write_all(br#"">"#)?;
            }
            escape_html(self.out, &token.text)?;
            open = &token.scopes;
        }
        for _ in 0..open.len() {
            self.out.write_all(b"</span>")?;
        }
        Ok(())
    }

    fn write_styled(&mut self, tokens: &[Token]) -> io::Result<()> {
        for token in tokens {
            let css = self.inline_css(self.highlighter.style_for_stack(&token.scopes));
            if css.is_empty() {
                escape_html(self.out, &token.text)?;
            } else {
                write!(self.out, r#"<span style="{css}">"#)?;
                escape_html(self.out, &token.text)?;
                self.out.write_all(b"</span>")?;
            }
        }
        Ok(())
    }

    /// Inline declarations for `style`, omitting what the container already sets.
    fn inline_css(&self, style: Style) -> String {
        let mut declarations = Vec::new();
        if style.foreground != self.palette.foreground {
            declarations.push(format!("color:{}", hex(style.foreground)));
        }
        if style.background != self.palette.background {
            declarations.push(format!("background-color:{}", hex(style.background)));
        }
        if style.font_style.contains(FontStyle::BOLD) {
            declarations.push("font-weight:bold".to_owned());
        }
        if style.font_style.contains(FontStyle::ITALIC) {
            declarations.push("font-style:italic".to_owned());
        }
        if style.font_style.contains(FontStyle::UNDERLINE) {
            declarations.push("text-decoration:underline".to_owned());
        }
        declarations.join(";")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::LineRange;
    use crate::registry::{LexerRegistry, StyleRegistry, SyntectLexers, SyntectStyles};
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "LINE1\nLINE2\nLINE3\n";

    /// Tokens without scopes, one per line.
    fn plain_tokens(source: &str) -> TokenStream {
        TokenStream::new(
            source
                .split_inclusive('\n')
                .map(|line| {
                    vec![Token {
                        text: line.to_owned(),
                        scopes: Vec::new(),
                    }]
                })
                .collect(),
        )
    }

    fn format(tokens: &TokenStream, options: &[FormatOption]) -> String {
        let styles = SyntectStyles::default();
        let theme = styles.style("InspiredGitHub").unwrap();
        let mut out = Vec::new();
        HtmlFormatter.format(&mut out, theme, tokens, options).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_classes_plain() {
        let html = format(&plain_tokens(SOURCE), &[FormatOption::WithClasses(true)]);
        assert_eq!(
            html,
            "<pre class=\"chroma\"><code>LINE1\nLINE2\nLINE3\n</code></pre>\n"
        );
    }

    #[test]
    fn test_format_language_annotation() {
        let html = format(
            &plain_tokens("x\n"),
            &[
                FormatOption::WithClasses(true),
                FormatOption::Language("go".to_owned()),
            ],
        );
        assert_eq!(
            html,
            "<pre class=\"chroma\"><code class=\"language-go\" data-lang=\"go\">x\n</code></pre>\n"
        );
    }

    #[test]
    fn test_format_highlight_lines_classes() {
        let html = format(
            &plain_tokens(SOURCE),
            &[
                FormatOption::WithClasses(true),
                FormatOption::HighlightLines(vec![LineRange::new(2, 3)]),
            ],
        );
        assert!(!html.contains("<span class=\"hl\">LINE1\n</span>"));
        assert!(html.contains("<span class=\"hl\">LINE2\n</span>"));
        assert!(html.contains("<span class=\"hl\">LINE3\n</span>"));
    }

    #[test]
    fn test_format_inline_line_numbers_with_base() {
        let html = format(
            &plain_tokens(SOURCE),
            &[
                FormatOption::WithClasses(true),
                FormatOption::LineNumbers(true),
                FormatOption::BaseLineNumber(10),
                FormatOption::PreventSurroundingPre(true),
            ],
        );
        assert_eq!(
            html,
            "<span class=\"ln\">10</span>LINE1\n<span class=\"ln\">11</span>LINE2\n<span class=\"ln\">12</span>LINE3\n"
        );
    }

    #[test]
    fn test_format_line_numbers_saturate_at_max() {
        let html = format(
            &plain_tokens("a\nb\n"),
            &[
                FormatOption::WithClasses(true),
                FormatOption::LineNumbers(true),
                FormatOption::BaseLineNumber(usize::MAX),
                FormatOption::PreventSurroundingPre(true),
            ],
        );
        let max = usize::MAX;
        assert_eq!(
            html,
            format!("<span class=\"ln\">{max}</span>a\n<span class=\"ln\">{max}</span>b\n")
        );
    }

    #[test]
    fn test_format_table_line_numbers() {
        let html = format(
            &plain_tokens("a\nb\n"),
            &[
                FormatOption::WithClasses(true),
                FormatOption::LineNumbers(true),
                FormatOption::LineNumbersInTable(true),
                FormatOption::HighlightLines(vec![LineRange::single(2)]),
            ],
        );
        assert_eq!(
            html,
            concat!(
                "<div class=\"chroma\"><table class=\"lntable\"><tr><td class=\"lntd\">",
                "<pre class=\"chroma\"><code><span class=\"lnt\">1\n</span>",
                "<span class=\"hl\"><span class=\"lnt\">2\n</span></span></code></pre></td>",
                "<td class=\"lntd\"><pre class=\"chroma\"><code>a\n<span class=\"hl\">b\n</span>",
                "</code></pre></td></tr></table></div>\n"
            )
        );
    }

    #[test]
    fn test_format_prevent_surrounding_pre() {
        let html = format(
            &plain_tokens("a < b\n"),
            &[
                FormatOption::WithClasses(true),
                FormatOption::PreventSurroundingPre(true),
            ],
        );
        assert_eq!(html, "a &lt; b\n");
    }

    #[test]
    fn test_format_inline_styles() {
        let html = format(&plain_tokens("x\n"), &[]);
        assert!(html.starts_with("<pre style=\"color:#"));
        assert!(html.contains("tab-size:8"));
        assert!(html.ends_with("<code>x\n</code></pre>\n"));
    }

    #[test]
    fn test_format_classed_scopes_are_nested_and_closed() {
        let lexers = SyntectLexers::default();
        let tokens = lexers.lexer("go").unwrap().tokenise("func main() {}\n").unwrap();
        let html = format(
            &tokens,
            &[
                FormatOption::WithClasses(true),
                FormatOption::PreventSurroundingPre(true),
            ],
        );
        assert!(html.starts_with("<span class=\"source go\">"));
        assert_eq!(html.matches("<span").count(), html.matches("</span>").count());
        assert!(html.contains("main"));
    }

    #[test]
    fn test_format_inline_styled_tokens_differ_from_plain() {
        let lexers = SyntectLexers::default();
        let tokens = lexers
            .lexer("go")
            .unwrap()
            .tokenise("// comment\nfunc main() {}\n")
            .unwrap();
        let html = format(&tokens, &[FormatOption::PreventSurroundingPre(true)]);
        assert!(html.contains("<span style=\""));
        assert_ne!(html, "// comment\nfunc main() {}\n");
    }

    #[test]
    fn test_write_css() {
        let styles = SyntectStyles::default();
        let theme = styles.style("InspiredGitHub").unwrap();
        let mut out = Vec::new();
        HtmlFormatter
            .write_css(&mut out, theme, &[FormatOption::TabWidth(4)])
            .unwrap();
        let css = String::from_utf8(out).unwrap();
        assert!(css.starts_with("/* Background */ .chroma {"));
        assert!(css.contains("tab-size: 4;"));
        assert!(css.contains("/* LineHighlight */ .chroma .hl {"));
        assert!(css.contains(".comment"));
    }

    #[test]
    fn test_scope_class() {
        let scope = Scope::new("keyword.control.go").unwrap();
        assert_eq!(scope_class(scope), "keyword control go");
    }
}
