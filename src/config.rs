//! Build options for template functions
//!
//! Options can be assembled in code with the `with_*` methods or loaded from
//! a TOML file:
//!
//! ```toml
//! include_builtins = false
//!
//! [globals]
//! company = "ACME"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use minijinja::Value;
use serde::Deserialize;
use thiserror::Error;

use crate::function::RenderEnvironment;

/// Errors that can occur when loading an options file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read options file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse options TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Options controlling the environment a function's template renders in
#[derive(Debug, Clone)]
pub struct TemplateOptions {
    /// Pre-configured environment used verbatim; overrides the other options
    pub environment: Option<RenderEnvironment>,
    /// Extra names bound in the environment, for default factory expressions
    ///
    /// A global never stands in for a parameter the template needs.
    pub globals: BTreeMap<String, Value>,
    /// Seed the environment with the builtins snapshot before `globals`
    pub include_builtins: bool,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            environment: None,
            globals: BTreeMap::new(),
            include_builtins: true,
        }
    }
}

/// TOML structure for deserializing options
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlOptions {
    include_builtins: Option<bool>,
    #[serde(default)]
    globals: BTreeMap<String, toml::Value>,
}

impl TemplateOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load options from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlOptions = toml::from_str(content)?;

        Ok(TemplateOptions {
            environment: None,
            globals: parsed
                .globals
                .iter()
                .map(|(name, value)| (name.clone(), Value::from_serialize(value)))
                .collect(),
            include_builtins: parsed.include_builtins.unwrap_or(true),
        })
    }

    /// Use a pre-configured environment verbatim
    pub fn with_environment(mut self, environment: RenderEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Add a global binding
    pub fn with_global(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.globals.insert(name.into(), value.into());
        self
    }

    /// Add several global bindings; later names replace earlier ones
    pub fn with_globals<I, K, V>(mut self, globals: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.globals
            .extend(globals.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Enable or disable the builtins snapshot
    pub fn with_builtins(mut self, include: bool) -> Self {
        self.include_builtins = include;
        self
    }

    /// The environment templates built with these options render in
    ///
    /// Returns the configured environment if there is one. Otherwise a new
    /// environment gets the builtins (when enabled) and then the globals on
    /// top, so a global may shadow a builtin.
    pub fn render_environment(&self) -> RenderEnvironment {
        if let Some(env) = &self.environment {
            return env.clone();
        }

        let mut env = if self.include_builtins {
            RenderEnvironment::with_builtins()
        } else {
            RenderEnvironment::new()
        };
        for (name, value) in &self.globals {
            env.add_global(name.clone(), value.clone());
        }
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::environment_tests::defines;

    #[test]
    fn test_defaults_include_builtins() {
        let env = TemplateOptions::default().render_environment();
        assert!(defines(&env, "len"));
    }

    #[test]
    fn test_without_builtins() {
        let env = TemplateOptions::new().with_builtins(false).render_environment();
        assert!(!defines(&env, "len"));
    }

    #[test]
    fn test_globals_applied_after_builtins() {
        let env = TemplateOptions::new()
            .with_global("len", "shadowed")
            .render_environment();
        let tmpl = env.engine().template_from_str("{{ len }}").unwrap();
        assert_eq!(tmpl.render(()).unwrap(), "shadowed");
    }

    #[test]
    fn test_environment_overrides_options() {
        let mut custom = RenderEnvironment::new();
        custom.add_global("only", 1);

        let env = TemplateOptions::new()
            .with_global("ignored", 2)
            .with_environment(custom)
            .render_environment();
        assert!(defines(&env, "only"));
        assert!(!defines(&env, "ignored"));
        assert!(!defines(&env, "len"));
    }

    #[test]
    fn test_from_str() {
        let options = TemplateOptions::from_str(
            r#"
            include_builtins = false

            [globals]
            company = "ACME"
            years = [2023, 2024]
            "#,
        )
        .unwrap();

        assert!(!options.include_builtins);
        assert_eq!(options.globals["company"], Value::from("ACME"));
        assert_eq!(options.globals["years"].len(), Some(2));
    }

    #[test]
    fn test_from_str_defaults() {
        let options = TemplateOptions::from_str("").unwrap();
        assert!(options.include_builtins);
        assert!(options.globals.is_empty());
    }

    #[test]
    fn test_from_str_rejects_unknown_keys() {
        let result = TemplateOptions::from_str("colour = 1");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
