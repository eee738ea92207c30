//! Lexer and style registries.
//!
//! The renderer looks up tokenizers and themes through the [`LexerRegistry`]
//! and [`StyleRegistry`] traits. The default implementations wrap the syntax
//! and theme sets bundled with `syntect`; the bundled sets are loaded once per
//! process and shared by every registry built with `Default`.

use std::sync::{Arc, LazyLock};

use syntect::easy::ScopeRegionIterator;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{ParseState, Scope, ScopeStack, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Style used when the renderer is not configured otherwise.
pub const DEFAULT_STYLE: &str = "InspiredGitHub";

/// Style substituted for unknown style names.
pub const FALLBACK_STYLE: &str = "base16-ocean.dark";

static BUNDLED_SYNTAXES: LazyLock<Arc<SyntaxSet>> =
    LazyLock::new(|| Arc::new(SyntaxSet::load_defaults_newlines()));

static BUNDLED_THEMES: LazyLock<Arc<ThemeSet>> =
    LazyLock::new(|| Arc::new(ThemeSet::load_defaults()));

/// A run of text sharing one scope stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Source text of the token.
    pub text: String,
    /// Scope stack, outermost first.
    pub scopes: Vec<Scope>,
}

/// Tokens of a whole block, grouped by source line.
///
/// Each line's tokens include the line's trailing newline, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenStream {
    lines: Vec<Vec<Token>>,
}

impl TokenStream {
    #[must_use]
    pub fn new(lines: Vec<Vec<Token>>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[Vec<Token>] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Tokenization failed; the block is rendered without highlighting.
#[derive(Debug, thiserror::Error)]
#[error("tokenization failed: {0}")]
pub struct TokenizeError(String);

impl TokenizeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Splits the text of one block into tokens.
///
/// Every call is independent: no state is carried from one block to the next.
pub trait Tokenizer {
    fn tokenise(&self, text: &str) -> Result<TokenStream, TokenizeError>;
}

/// Maps language names to tokenizers.
pub trait LexerRegistry: Send + Sync {
    /// Tokenizer registered under exactly `name` (case-sensitive).
    fn lexer(&self, name: &str) -> Option<Box<dyn Tokenizer + '_>>;
}

/// Maps style names to themes.
pub trait StyleRegistry: Send + Sync {
    /// Theme registered under `name`.
    fn style(&self, name: &str) -> Option<&Theme>;

    /// Theme used when a requested style does not exist. Always available.
    fn fallback(&self) -> &Theme;

    /// Names of all registered styles.
    fn names(&self) -> Vec<String>;
}

/// [`LexerRegistry`] backed by a `syntect` syntax set.
///
/// A syntax is registered under its name (`Rust`), its lowercased name
/// (`rust`) and each of its file extensions (`rs`).
#[derive(Clone)]
pub struct SyntectLexers {
    syntaxes: Arc<SyntaxSet>,
}

impl SyntectLexers {
    /// Registry over a custom syntax set. Syntaxes must be built for lines
    /// that include their trailing newline.
    #[must_use]
    pub fn new(syntaxes: SyntaxSet) -> Self {
        Self {
            syntaxes: Arc::new(syntaxes),
        }
    }

    /// Find the syntax registered under `name`. Later syntaxes win.
    pub fn find(&self, name: &str) -> Option<&SyntaxReference> {
        self.syntaxes.syntaxes().iter().rev().find(|syntax| {
            syntax.name == name
                || syntax.name.to_lowercase() == name
                || syntax.file_extensions.iter().any(|ext| ext == name)
        })
    }
}

impl Default for SyntectLexers {
    fn default() -> Self {
        Self {
            syntaxes: Arc::clone(&*BUNDLED_SYNTAXES),
        }
    }
}

impl LexerRegistry for SyntectLexers {
    fn lexer(&self, name: &str) -> Option<Box<dyn Tokenizer + '_>> {
        let syntax = self.find(name)?;
        Some(Box::new(SyntectTokenizer {
            syntax,
            syntaxes: &self.syntaxes,
        }))
    }
}

struct SyntectTokenizer<'a> {
    syntax: &'a SyntaxReference,
    syntaxes: &'a SyntaxSet,
}

impl Tokenizer for SyntectTokenizer<'_> {
    fn tokenise(&self, text: &str) -> Result<TokenStream, TokenizeError> {
        let mut state = ParseState::new(self.syntax);
        let mut stack = ScopeStack::new();
        let mut lines = Vec::new();

        for line in LinesWithEndings::from(text) {
            let ops = state
                .parse_line(line, self.syntaxes)
                .map_err(|e| TokenizeError::new(e.to_string()))?;
            let mut tokens = Vec::new();
            for (piece, op) in ScopeRegionIterator::new(&ops, line) {
                stack
                    .apply(op)
                    .map_err(|e| TokenizeError::new(e.to_string()))?;
                if piece.is_empty() {
                    continue;
                }
                tokens.push(Token {
                    text: piece.to_owned(),
                    scopes: stack.as_slice().to_vec(),
                });
            }
            lines.push(tokens);
        }

        tracing::trace!(syntax = %self.syntax.name, lines = lines.len(), "Tokenized block");
        Ok(TokenStream::new(lines))
    }
}

/// [`StyleRegistry`] backed by a `syntect` theme set.
#[derive(Clone)]
pub struct SyntectStyles {
    themes: Arc<ThemeSet>,
    empty: Theme,
}

impl SyntectStyles {
    /// Registry over a custom theme set.
    ///
    /// The fallback is [`FALLBACK_STYLE`] if the set has it, otherwise the
    /// first theme by name, otherwise an empty theme.
    #[must_use]
    pub fn new(themes: ThemeSet) -> Self {
        Self {
            themes: Arc::new(themes),
            empty: Theme::default(),
        }
    }
}

impl Default for SyntectStyles {
    fn default() -> Self {
        Self {
            themes: Arc::clone(&*BUNDLED_THEMES),
            empty: Theme::default(),
        }
    }
}

impl StyleRegistry for SyntectStyles {
    fn style(&self, name: &str) -> Option<&Theme> {
        self.themes.themes.get(name)
    }

    fn fallback(&self) -> &Theme {
        self.themes
            .themes
            .get(FALLBACK_STYLE)
            .or_else(|| self.themes.themes.values().next())
            .unwrap_or(&self.empty)
    }

    fn names(&self) -> Vec<String> {
        self.themes.themes.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lexer_lookup_by_extension_and_name() {
        let lexers = SyntectLexers::default();
        assert_eq!(lexers.find("go").map(|s| s.name.as_str()), Some("Go"));
        assert_eq!(lexers.find("rs").map(|s| s.name.as_str()), Some("Rust"));
        assert_eq!(lexers.find("rust").map(|s| s.name.as_str()), Some("Rust"));
        assert_eq!(lexers.find("Rust").map(|s| s.name.as_str()), Some("Rust"));
        assert!(lexers.find("bash").is_some());
    }

    #[test]
    fn test_lexer_lookup_is_case_sensitive() {
        let lexers = SyntectLexers::default();
        assert!(lexers.find("RUST").is_none());
        assert!(lexers.find("GO").is_none());
    }

    #[test]
    fn test_lexer_lookup_unknown() {
        let lexers = SyntectLexers::default();
        assert!(lexers.lexer("no-such-language").is_none());
        assert!(lexers.lexer("").is_none());
    }

    #[test]
    fn test_tokenise_preserves_text() {
        let lexers = SyntectLexers::default();
        let source = "func main() {\n\tfmt.Println(\"ok\")\n}\n";
        let tokens = lexers.lexer("go").unwrap().tokenise(source).unwrap();
        assert_eq!(tokens.lines().len(), 3);

        let rebuilt: String = tokens
            .lines()
            .iter()
            .flatten()
            .map(|token| token.text.as_str())
            .collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_tokenise_assigns_scopes() {
        let lexers = SyntectLexers::default();
        let tokens = lexers.lexer("go").unwrap().tokenise("func main() {}\n").unwrap();
        let line = &tokens.lines()[0];
        // Every token sits inside the syntax scope.
        assert!(
            line.iter()
                .all(|token| token.scopes.first().map(|s| s.build_string()).as_deref()
                    == Some("source.go"))
        );
        assert!(line.iter().any(|token| token.scopes.len() > 1));
    }

    #[test]
    fn test_tokenise_empty_text() {
        let lexers = SyntectLexers::default();
        let tokens = lexers.lexer("go").unwrap().tokenise("").unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_styles_lookup_and_fallback() {
        let styles = SyntectStyles::default();
        assert!(styles.style(DEFAULT_STYLE).is_some());
        assert!(styles.style("no-such-style").is_none());
        let fallback = styles.style(FALLBACK_STYLE).unwrap();
        assert!(std::ptr::eq(styles.fallback(), fallback));
        assert!(styles.names().contains(&"Solarized (dark)".to_owned()));
    }

    #[test]
    fn test_styles_fallback_on_empty_set() {
        let styles = SyntectStyles::new(ThemeSet::new());
        assert!(styles.names().is_empty());
        assert!(styles.fallback().scopes.is_empty());
    }
}
