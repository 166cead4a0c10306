//! Render environment shared by the templates of built functions

use std::fmt;

use minijinja::{AutoEscape, Environment, Value};

use super::builtins::builtins;

/// Template environment the docstrings of built functions compile in
///
/// Globals bound here are visible to default factory expressions. They never
/// stand in for a parameter: every variable a template needs is declared.
#[derive(Clone)]
pub struct RenderEnvironment {
    env: Environment<'static>,
}

impl Default for RenderEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderEnvironment {
    /// Create an environment with the engine's defaults and no extra globals
    ///
    /// Auto-escaping is disabled since templates produce plain text.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        Self { env }
    }

    /// Create an environment seeded with the builtins snapshot
    pub fn with_builtins() -> Self {
        let mut env = Self::new();
        for (name, value) in builtins() {
            env.add_global(*name, value.clone());
        }
        env
    }

    /// Bind a global visible to every template of this environment
    pub fn add_global(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.env.add_global(name.into(), value.into());
    }

    /// Access the underlying engine
    pub fn engine(&self) -> &Environment<'static> {
        &self.env
    }

    /// Mutable access to the underlying engine for settings not wrapped here
    pub fn engine_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }

    /// Consume the wrapper, returning the engine
    pub(crate) fn into_engine(self) -> Environment<'static> {
        self.env
    }
}

impl fmt::Debug for RenderEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderEnvironment").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Whether `name` resolves to something in the environment
    pub(crate) fn defines(env: &RenderEnvironment, name: &str) -> bool {
        env.engine()
            .compile_expression_owned(format!("{} is defined", name))
            .and_then(|expr| expr.eval(()))
            .map(|value| value.is_true())
            .unwrap_or(false)
    }

    #[test]
    fn test_new_has_engine_globals_only() {
        let env = RenderEnvironment::new();
        assert!(defines(&env, "range"));
        assert!(!defines(&env, "len"));
    }

    #[test]
    fn test_with_builtins() {
        let env = RenderEnvironment::with_builtins();
        assert!(defines(&env, "len"));
        assert!(defines(&env, "sorted"));
    }

    #[test]
    fn test_add_global() {
        let mut env = RenderEnvironment::new();
        env.add_global("company", "ACME");
        assert!(defines(&env, "company"));

        let tmpl = env
            .engine()
            .template_from_str("{{ company }}")
            .expect("Should compile");
        assert_eq!(tmpl.render(()).unwrap(), "ACME");
    }

    #[test]
    fn test_globals_added_through_engine_are_visible() {
        let mut env = RenderEnvironment::new();
        env.engine_mut().add_global("direct", 1);
        assert!(defines(&env, "direct"));
    }

    #[test]
    fn test_no_auto_escape() {
        let env = RenderEnvironment::new();
        let tmpl = env
            .engine()
            .template_from_str("{{ '<b>' }}")
            .expect("Should compile");
        assert_eq!(tmpl.render(()).unwrap(), "<b>");
    }

    #[test]
    fn test_add_filter() {
        let mut env = RenderEnvironment::new();
        env.engine_mut().add_filter("shout", |s: String| format!("{}!", s.to_uppercase()));
        let tmpl = env
            .engine()
            .template_from_str("{{ 'hi'|shout }}")
            .expect("Should compile");
        assert_eq!(tmpl.render(()).unwrap(), "HI!");
    }
}
