//! Configuration management for codefence.
//!
//! Parses `codefence.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [highlight]
//! style = "Solarized (dark)"
//! classes = true
//! line_numbers = "table"   # "none", "inline" or "table"
//! line_number_start = 1
//! tab_width = 4
//! wrapper = "div"          # "none" or "div"
//!
//! [output]
//! css = "dist/highlight.css"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "codefence.toml";

const DEFAULT_STYLE: &str = "InspiredGitHub";
const MAX_TAB_WIDTH: usize = 32;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override highlight style.
    pub style: Option<String>,
    /// Override CSS classes flag.
    pub classes: Option<bool>,
    /// Override style sheet output path.
    pub css: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Highlighting defaults for every code block.
    pub highlight: HighlightSettings,
    /// Output configuration (paths are relative strings from TOML).
    output: OutputConfigRaw,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Highlighting defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HighlightSettings {
    /// Default style name.
    pub style: String,
    /// Emit CSS classes instead of inline styles.
    pub classes: bool,
    /// Line number layout.
    pub line_numbers: LineNumbers,
    /// Number displayed for the first line.
    pub line_number_start: usize,
    /// Width of a tab character.
    pub tab_width: usize,
    /// Markup around each block.
    pub wrapper: WrapperKind,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            style: DEFAULT_STYLE.to_owned(),
            classes: false,
            line_numbers: LineNumbers::None,
            line_number_start: 1,
            tab_width: 8,
            wrapper: WrapperKind::None,
        }
    }
}

/// Line number layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineNumbers {
    #[default]
    None,
    /// Numbers prefixed to each line.
    Inline,
    /// Numbers in a separate table column.
    Table,
}

/// Markup around each block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapperKind {
    /// The formatter's own `<pre>` container.
    #[default]
    None,
    /// A `<div class="highlight">` around the container.
    Div,
}

/// Raw output configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    css: Option<String>,
}

/// Resolved output configuration with absolute paths.
#[derive(Debug, Default)]
pub struct OutputConfig {
    /// File receiving the style sheet of highlighted blocks.
    pub css: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `codefence.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(style) = &settings.style {
            self.highlight.style.clone_from(style);
        }
        if let Some(classes) = settings.classes {
            self.highlight.classes = classes;
        }
        if let Some(css) = &settings.css {
            self.output_resolved.css = Some(css.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        Self::discover_config_from(&std::env::current_dir().ok()?)
    }

    /// Search for config file in `start` and its parents.
    fn discover_config_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.output_resolved = OutputConfig {
            css: self.output.css.as_deref().map(|css| config_dir.join(css)),
        };
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after applying CLI
    /// settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.highlight.style.trim().is_empty() {
            return Err(ConfigError::Validation(
                "highlight.style cannot be empty".to_owned(),
            ));
        }

        let tab_width = self.highlight.tab_width;
        if tab_width == 0 {
            return Err(ConfigError::Validation(
                "highlight.tab_width must be greater than 0".to_owned(),
            ));
        }
        if tab_width > MAX_TAB_WIDTH {
            return Err(ConfigError::Validation(format!(
                "highlight.tab_width cannot exceed {MAX_TAB_WIDTH}"
            )));
        }

        Ok(())
    }
}
