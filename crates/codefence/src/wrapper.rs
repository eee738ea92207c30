//! Wrapper hooks around rendered code blocks.
//!
//! A [`WrapperRenderer`] is called exactly twice per block: once with
//! `entering = true` before the body, once with `entering = false` after it.
//! When a hook is installed the formatter omits its own `<pre>` container, so
//! the hook owns the surrounding markup for highlighted and plain blocks alike.

use std::io::{self, Write};

use crate::attributes::Attributes;
use crate::util::escape_html;

/// What a wrapper hook knows about the block it wraps.
#[derive(Clone, Copy, Debug)]
pub struct CodeBlockContext<'a> {
    language: Option<&'a str>,
    attributes: Option<&'a Attributes>,
    highlighted: bool,
}

impl<'a> CodeBlockContext<'a> {
    #[must_use]
    pub fn new(
        language: Option<&'a str>,
        attributes: Option<&'a Attributes>,
        highlighted: bool,
    ) -> Self {
        Self {
            language,
            attributes,
            highlighted,
        }
    }

    /// Resolved language, if any.
    pub fn language(&self) -> Option<&'a str> {
        self.language
    }

    /// Block attributes, if any.
    pub fn attributes(&self) -> Option<&'a Attributes> {
        self.attributes
    }

    /// Whether the body between the two hook calls is highlighted markup.
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }
}

/// Hook writing the markup around a block body.
///
/// Any closure with the matching signature is a hook:
///
/// ```
/// use codefence::{BlockRenderer, CodeBlockContext};
/// use std::io::Write;
///
/// let renderer = BlockRenderer::new().with_wrapper_renderer(
///     |out: &mut dyn Write, _ctx: &CodeBlockContext<'_>, entering: bool| {
///         let tag: &[u8] = if entering { b"<figure>" } else { b"</figure>" };
///         out.write_all(tag)
///     },
/// );
/// # let _ = renderer;
/// ```
pub trait WrapperRenderer: Send + Sync {
    fn render(
        &self,
        out: &mut dyn Write,
        context: &CodeBlockContext<'_>,
        entering: bool,
    ) -> io::Result<()>;
}

impl<F> WrapperRenderer for F
where
    F: Fn(&mut dyn Write, &CodeBlockContext<'_>, bool) -> io::Result<()> + Send + Sync,
{
    fn render(
        &self,
        out: &mut dyn Write,
        context: &CodeBlockContext<'_>,
        entering: bool,
    ) -> io::Result<()> {
        self(out, context, entering)
    }
}

/// Wraps blocks in `<div class="highlight"><pre class="chroma"><code ...>`.
///
/// Plain blocks get an unstyled `<pre><code>` inside the same `div`.
#[derive(Clone, Copy, Debug, Default)]
pub struct HighlightDivWrapper;

impl WrapperRenderer for HighlightDivWrapper {
    fn render(
        &self,
        out: &mut dyn Write,
        context: &CodeBlockContext<'_>,
        entering: bool,
    ) -> io::Result<()> {
        if !entering {
            return out.write_all(b"</code></pre></div>\n");
        }

        out.write_all(br#"<div class="highlight">"#)?;
        if context.is_highlighted() {
            out.write_all(br#"<pre class="chroma">"#)?;
        } else {
            out.write_all(b"<pre>")?;
        }
        match context.language() {
            Some(language) => {
                out.write_all(br#"<code class="language-"#)?;
                escape_html(out, language)?;
                out.write_all(br#"" data-lang=""#)?;
                escape_html(out, language)?;
                out.write_all(br#"">"#)
            }
            None => out.write_all(b"<code>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn wrap(context: &CodeBlockContext<'_>) -> String {
        let mut out = Vec::new();
        HighlightDivWrapper.render(&mut out, context, true).unwrap();
        out.extend_from_slice(b"BODY");
        HighlightDivWrapper.render(&mut out, context, false).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_div_wrapper_highlighted() {
        let html = wrap(&CodeBlockContext::new(Some("go"), None, true));
        assert_eq!(
            html,
            "<div class=\"highlight\"><pre class=\"chroma\"><code class=\"language-go\" data-lang=\"go\">BODY</code></pre></div>\n"
        );
    }

    #[test]
    fn test_div_wrapper_plain_without_language() {
        let html = wrap(&CodeBlockContext::new(None, None, false));
        assert_eq!(
            html,
            "<div class=\"highlight\"><pre><code>BODY</code></pre></div>\n"
        );
    }

    #[test]
    fn test_div_wrapper_escapes_language() {
        let html = wrap(&CodeBlockContext::new(Some("a\"b"), None, false));
        assert!(html.contains("class=\"language-a&quot;b\""));
    }

    #[test]
    fn test_closure_is_wrapper() {
        let hook = |out: &mut dyn Write, ctx: &CodeBlockContext<'_>, entering: bool| {
            write!(out, "[{}:{entering}]", ctx.language().unwrap_or("-"))
        };
        let mut out = Vec::new();
        let context = CodeBlockContext::new(Some("rust"), None, true);
        hook.render(&mut out, &context, true).unwrap();
        hook.render(&mut out, &context, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[rust:true][rust:false]");
    }
}
