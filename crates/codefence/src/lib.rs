//! Syntax highlighting renderer for fenced code blocks.
//!
//! This crate turns the fenced code blocks of a markdown pipeline into
//! highlighted HTML, falling back to plain escaped markup whenever a block
//! cannot be highlighted. It is meant to be plugged into a host renderer: the
//! host supplies [`CodeBlock`] views, the [`BlockRenderer`] writes markup.
//!
//! # Architecture
//!
//! Rendering one block goes through four steps:
//! - [`attributes`]: resolves the language name and block attributes, either
//!   from host-supplied attributes or from a `{...}` list in the info string
//! - [`HighlightConfig`]: combines renderer defaults with block attributes
//!   (`hl_lines`, `hl_style`, `nohl`, `linenos`, `linenostart`)
//! - highlighting: lexer lookup, tokenization and formatting through the
//!   [`LexerRegistry`], [`StyleRegistry`] and [`Formatter`] collaborators
//! - fallback: `<pre><code>` markup when highlighting is unavailable
//!
//! The default collaborators are backed by `syntect`.
//!
//! # Example
//!
//! ```
//! use codefence::{BlockRenderer, CodeBlock};
//!
//! let renderer = BlockRenderer::new();
//! let source = "fn main() {}\n";
//! let block = CodeBlock::from_text(source).with_info("rust");
//!
//! let mut html = Vec::new();
//! renderer.render(&mut html, &block).unwrap();
//! assert!(String::from_utf8(html).unwrap().contains(r#"<code class="language-rust" data-lang="rust">"#));
//! ```

pub mod attributes;
mod block;
mod error;
mod format;
mod highlight;
pub mod markdown;
mod registry;
mod renderer;
mod util;
mod wrapper;

pub use attributes::{Attribute, AttributeValue, Attributes, HighlightAttributes};
pub use block::CodeBlock;
pub use error::RenderError;
pub use format::{FormatOption, FormatSettings, Formatter, HtmlFormatter};
pub use highlight::{HighlightConfig, LineRange};
pub use markdown::MarkdownHighlighter;
pub use registry::{
    DEFAULT_STYLE, FALLBACK_STYLE, LexerRegistry, StyleRegistry, SyntectLexers, SyntectStyles,
    Token, TokenStream, TokenizeError, Tokenizer,
};
pub use renderer::{BlockRenderer, CssSink, RendererConfig};
pub use util::escape_html;
pub use wrapper::{CodeBlockContext, HighlightDivWrapper, WrapperRenderer};

/// Re-exported so callers can implement the collaborator traits.
pub use syntect::highlighting::Theme;
pub use syntect::parsing::Scope;
