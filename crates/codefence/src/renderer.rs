//! Block renderer: the per-block decision pipeline.
//!
//! [`BlockRenderer::render`] resolves the language and attributes of a block,
//! builds its [`HighlightConfig`], and either writes highlighted markup or
//! falls back to plain `<pre><code>` markup. Falling back is never an error;
//! only failed writes are returned to the caller.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use syntect::highlighting::Theme;

use crate::attributes::{self, Attributes};
use crate::block::CodeBlock;
use crate::error::RenderError;
use crate::format::{FormatOption, Formatter, HtmlFormatter};
use crate::highlight::HighlightConfig;
use crate::registry::{
    DEFAULT_STYLE, LexerRegistry, StyleRegistry, SyntectLexers, SyntectStyles, TokenStream,
};
use crate::util::escape_html;
use crate::wrapper::{CodeBlockContext, WrapperRenderer};

/// Shared append-only sink for style sheet rules.
pub type CssSink = Arc<Mutex<dyn Write + Send>>;

/// Renderer-wide settings, fixed at construction.
pub struct RendererConfig {
    /// Style used unless a block overrides it with `hl_style`.
    pub style: String,
    /// Formatter options applied to every block, before block overrides.
    pub format_options: Vec<FormatOption>,
    /// Receives the style sheet of every highlighted block.
    pub css_writer: Option<CssSink>,
    /// Hook writing the markup around each block.
    pub wrapper: Option<Box<dyn WrapperRenderer>>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            style: DEFAULT_STYLE.to_owned(),
            format_options: Vec::new(),
            css_writer: None,
            wrapper: None,
        }
    }
}

/// Why a block is rendered without highlighting.
#[derive(Clone, Copy, Debug)]
enum Fallback {
    OptOut,
    NoLanguage,
    UnknownLanguage,
    TokenizeFailed,
}

impl Fallback {
    fn as_str(self) -> &'static str {
        match self {
            Self::OptOut => "opt-out",
            Self::NoLanguage => "no language",
            Self::UnknownLanguage => "unknown language",
            Self::TokenizeFailed => "tokenization failed",
        }
    }
}

/// Renders fenced code blocks to highlighted HTML.
///
/// The renderer holds no per-block state and can be shared across threads
/// and reused for any number of documents.
///
/// # Configuration
///
/// - [`with_style`](Self::with_style): default style name
/// - [`with_format_options`](Self::with_format_options): formatter options
///   for every block
/// - [`with_css_writer`](Self::with_css_writer): sink for style sheet rules
/// - [`with_wrapper_renderer`](Self::with_wrapper_renderer): hook for the
///   surrounding markup
/// - [`with_lexers`](Self::with_lexers), [`with_styles`](Self::with_styles),
///   [`with_formatter`](Self::with_formatter): replace the `syntect`-backed
///   collaborators
pub struct BlockRenderer {
    config: RendererConfig,
    lexers: Box<dyn LexerRegistry>,
    styles: Box<dyn StyleRegistry>,
    formatter: Box<dyn Formatter>,
}

impl Default for BlockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockRenderer {
    /// Create a renderer with the bundled syntaxes and themes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RendererConfig::default(),
            lexers: Box::new(SyntectLexers::default()),
            styles: Box::new(SyntectStyles::default()),
            formatter: Box::new(HtmlFormatter),
        }
    }

    /// Set the default style name.
    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.config.style = style.into();
        self
    }

    /// Append formatter options applied to every block.
    #[must_use]
    pub fn with_format_options(mut self, options: impl IntoIterator<Item = FormatOption>) -> Self {
        self.config.format_options.extend(options);
        self
    }

    /// Write the style sheet of every highlighted block to `sink`.
    ///
    /// Rules are written once per block, without deduplication.
    #[must_use]
    pub fn with_css_writer(mut self, sink: CssSink) -> Self {
        self.config.css_writer = Some(sink);
        self
    }

    /// Install a hook for the markup surrounding each block.
    #[must_use]
    pub fn with_wrapper_renderer(mut self, wrapper: impl WrapperRenderer + 'static) -> Self {
        self.config.wrapper = Some(Box::new(wrapper));
        self
    }

    #[must_use]
    pub fn with_lexers(mut self, lexers: impl LexerRegistry + 'static) -> Self {
        self.lexers = Box::new(lexers);
        self
    }

    #[must_use]
    pub fn with_styles(mut self, styles: impl StyleRegistry + 'static) -> Self {
        self.styles = Box::new(styles);
        self
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn styles(&self) -> &dyn StyleRegistry {
        self.styles.as_ref()
    }

    /// Render one block to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing to `out` or to the style sheet sink
    /// fails.
    pub fn render(&self, out: &mut dyn Write, block: &CodeBlock<'_>) -> Result<(), RenderError> {
        let resolved = attributes::resolve(block);
        let attributes = resolved.attributes.as_ref();
        let config = HighlightConfig::resolve(&self.config, attributes);

        match self.tokenize(block, resolved.language, config.nohl) {
            Ok((language, tokens)) => {
                self.write_highlighted(out, &tokens, language, attributes, &config)
            }
            Err(reason) => {
                tracing::debug!(
                    language = resolved.language.unwrap_or_default(),
                    reason = reason.as_str(),
                    "Rendering block without highlighting"
                );
                self.write_plain(out, block, resolved.language, attributes)
            }
        }
    }

    /// Write the style sheet of `style`, or of the default style.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` or generating the rules fails.
    pub fn write_css(&self, out: &mut dyn Write, style: Option<&str>) -> Result<(), RenderError> {
        let theme = self.theme(style.unwrap_or(&self.config.style));
        self.formatter
            .write_css(out, theme, &self.config.format_options)
    }

    fn tokenize<'l>(
        &self,
        block: &CodeBlock<'_>,
        language: Option<&'l str>,
        nohl: bool,
    ) -> Result<(&'l str, TokenStream), Fallback> {
        if nohl {
            return Err(Fallback::OptOut);
        }
        let language = language.ok_or(Fallback::NoLanguage)?;
        let lexer = self
            .lexers
            .lexer(language)
            .ok_or(Fallback::UnknownLanguage)?;
        let tokens = lexer.tokenise(&block.text()).map_err(|e| {
            tracing::debug!(language, error = %e, "Tokenizer failed");
            Fallback::TokenizeFailed
        })?;
        Ok((language, tokens))
    }

    fn theme(&self, style: &str) -> &Theme {
        self.styles.style(style).unwrap_or_else(|| {
            tracing::debug!(style, "Unknown style, using fallback");
            self.styles.fallback()
        })
    }

    fn write_highlighted(
        &self,
        out: &mut dyn Write,
        tokens: &TokenStream,
        language: &str,
        attributes: Option<&Attributes>,
        config: &HighlightConfig,
    ) -> Result<(), RenderError> {
        let theme = self.theme(&config.style);
        let mut options = Vec::with_capacity(config.format_options.len() + 2);
        options.push(FormatOption::Language(language.to_owned()));
        options.extend_from_slice(&config.format_options);

        if let Some(wrapper) = &self.config.wrapper {
            options.push(FormatOption::PreventSurroundingPre(true));
            let context = CodeBlockContext::new(Some(language), attributes, true);
            wrapper.render(out, &context, true)?;
            self.formatter.format(out, theme, tokens, &options)?;
            wrapper.render(out, &context, false)?;
        } else {
            self.formatter.format(out, theme, tokens, &options)?;
        }

        if let Some(sink) = &self.config.css_writer {
            let mut sink = sink.lock().unwrap_or_else(PoisonError::into_inner);
            self.formatter.write_css(&mut *sink, theme, &options)?;
        }
        Ok(())
    }

    fn write_plain(
        &self,
        out: &mut dyn Write,
        block: &CodeBlock<'_>,
        language: Option<&str>,
        attributes: Option<&Attributes>,
    ) -> Result<(), RenderError> {
        if let Some(wrapper) = &self.config.wrapper {
            let context = CodeBlockContext::new(language, attributes, false);
            wrapper.render(out, &context, true)?;
            write_escaped_lines(out, block)?;
            wrapper.render(out, &context, false)?;
            return Ok(());
        }

        match language {
            Some(language) => {
                out.write_all(br#"<pre><code class="language-"#)?;
                escape_html(out, language)?;
                out.write_all(br#"">"#)?;
            }
            None => out.write_all(b"<pre><code>")?,
        }
        write_escaped_lines(out, block)?;
        out.write_all(b"</code></pre>\n")?;
        Ok(())
    }
}

fn write_escaped_lines(out: &mut dyn Write, block: &CodeBlock<'_>) -> std::io::Result<()> {
    for line in block.lines() {
        escape_html(out, line)?;
    }
    Ok(())
}
