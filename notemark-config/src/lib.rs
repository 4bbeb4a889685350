//! Shared configuration loader for the notemark toolchain.
//!
//! `defaults/notemark.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`NotemarkConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use notemark::RegistryOptions;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/notemark.default.toml");

/// Top-level configuration consumed by notemark applications.
#[derive(Debug, Clone, Deserialize)]
pub struct NotemarkConfig {
    pub import: ImportConfig,
    pub export: ExportConfig,
    pub log: LogConfig,
}

/// How Markdown is read into a document.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    pub languages: Vec<String>,
    pub fallback_language: String,
    pub drawing_language: String,
    pub strict_drawings: bool,
    pub honor_escapes: bool,
}

/// How a document is written back out.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub list_indent: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub level: String,
}

impl NotemarkConfig {
    /// Engine options for the transformer table.
    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions::from(self)
    }
}

impl From<&NotemarkConfig> for RegistryOptions {
    fn from(config: &NotemarkConfig) -> Self {
        RegistryOptions {
            languages: config.import.languages.clone(),
            fallback_language: config.import.fallback_language.clone(),
            drawing_language: config.import.drawing_language.clone(),
            strict_drawings: config.import.strict_drawings,
            honor_escapes: config.import.honor_escapes,
            list_indent: config.export.list_indent,
        }
    }
}

impl From<NotemarkConfig> for RegistryOptions {
    fn from(config: NotemarkConfig) -> Self {
        RegistryOptions {
            languages: config.import.languages,
            fallback_language: config.import.fallback_language,
            drawing_language: config.import.drawing_language,
            strict_drawings: config.import.strict_drawings,
            honor_escapes: config.import.honor_escapes,
            list_indent: config.export.list_indent,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<NotemarkConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<NotemarkConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.import.fallback_language, "text");
        assert!(config.import.strict_drawings);
        assert_eq!(config.export.list_indent, 4);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn defaults_match_engine_defaults() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.registry_options(), RegistryOptions::default());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("import.strict_drawings", false)
            .expect("override to apply")
            .set_override("export.list_indent", 2)
            .expect("override to apply")
            .build()
            .expect("config to build");
        let options: RegistryOptions = config.into();
        assert!(!options.strict_drawings);
        assert_eq!(options.list_indent, 2);
    }

    #[test]
    fn layers_user_file_over_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[import]\nlanguages = [\"rust\"]\ndrawing_language = \"excalidraw\"")
            .expect("write config");

        let config = Loader::new()
            .with_file(file.path())
            .build()
            .expect("config to build");
        assert_eq!(config.import.languages, vec!["rust".to_string()]);
        assert_eq!(config.import.drawing_language, "excalidraw");
        assert_eq!(config.import.fallback_language, "text");
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/notemark.toml")
            .build()
            .expect("config to build");
        assert!(config.import.honor_escapes);
    }

    #[test]
    fn missing_required_file_fails() {
        let result = Loader::new()
            .with_file("/nonexistent/notemark.toml")
            .build();
        assert!(result.is_err());
    }
}
