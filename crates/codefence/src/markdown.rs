//! Markdown to HTML with highlighted code blocks, on top of `pulldown-cmark`.
//!
//! Code block events are collected and replaced by a single
//! [`Event::Html`] holding the output of a [`BlockRenderer`]; every other
//! event goes to [`pulldown_cmark::html::push_html`] unchanged.
//!
//! The first word of a fence info string is the language. A `{...}` list
//! after it becomes the block's attributes; other trailing words are ignored.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::attributes::parse_attributes;
use crate::block::CodeBlock;
use crate::error::RenderError;
use crate::renderer::BlockRenderer;

/// Renders a markdown document, delegating code blocks to a [`BlockRenderer`].
///
/// ```
/// use codefence::{BlockRenderer, MarkdownHighlighter};
///
/// let renderer = BlockRenderer::new();
/// let html = MarkdownHighlighter::new(&renderer)
///     .render("# Title\n\n```text {nohl}\na < b\n```\n")
///     .unwrap();
/// assert!(html.contains(r#"<pre><code class="language-text">a &lt; b"#));
/// ```
pub struct MarkdownHighlighter<'r> {
    renderer: &'r BlockRenderer,
    options: Options,
}

#[derive(Debug, Default)]
enum BlockState<'a> {
    #[default]
    Outside,
    Inside {
        info: Option<CowStr<'a>>,
        text: String,
    },
}

impl<'r> MarkdownHighlighter<'r> {
    /// Create a highlighter with GFM extensions enabled.
    #[must_use]
    pub fn new(renderer: &'r BlockRenderer) -> Self {
        Self {
            renderer,
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM,
        }
    }

    /// Replace the parser options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Render `markdown` to HTML.
    ///
    /// # Errors
    ///
    /// Returns an error if a code block fails to render; see
    /// [`BlockRenderer::render`].
    pub fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let mut events = Vec::new();
        let mut state = BlockState::Outside;
        let mut blocks = 0_usize;

        for event in Parser::new_ext(markdown, self.options) {
            match (&mut state, event) {
                (BlockState::Outside, Event::Start(Tag::CodeBlock(kind))) => {
                    let info = match kind {
                        CodeBlockKind::Fenced(info) => Some(info),
                        CodeBlockKind::Indented => None,
                    };
                    state = BlockState::Inside {
                        info,
                        text: String::new(),
                    };
                }
                (BlockState::Inside { text, .. }, Event::Text(chunk)) => text.push_str(&chunk),
                (BlockState::Inside { .. }, Event::End(TagEnd::CodeBlock)) => {
                    if let BlockState::Inside { info, text } = std::mem::take(&mut state) {
                        events.push(Event::Html(self.render_block(info.as_deref(), &text)?));
                        blocks += 1;
                    }
                }
                (BlockState::Inside { .. }, _) => {}
                (BlockState::Outside, other) => events.push(other),
            }
        }

        tracing::debug!(blocks, "Rendered markdown");
        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut html, events.into_iter());
        Ok(html)
    }

    fn render_block(&self, info: Option<&str>, text: &str) -> Result<CowStr<'static>, RenderError> {
        let mut block = CodeBlock::from_text(text);
        if let Some(info) = info {
            let (language, rest) = info
                .trim_start()
                .split_once(char::is_whitespace)
                .unwrap_or((info.trim(), ""));
            block = block.with_info(language);
            let rest = rest.trim();
            if rest.starts_with('{')
                && let Some(attributes) = parse_attributes(rest)
            {
                block = block.with_attributes(attributes);
            }
        }
        let mut out = Vec::with_capacity(text.len() * 2);
        self.renderer.render(&mut out, &block)?;
        Ok(CowStr::from(String::from_utf8_lossy(&out).into_owned()))
    }
}
