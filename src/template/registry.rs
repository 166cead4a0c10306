//! Registry for storing built template functions

use std::collections::HashMap;

use thiserror::Error;

use crate::function::{BoundFunction, BuildError};
use crate::parser::ast::Span;

/// Errors that can occur while loading declarations into a registry
#[derive(Debug, Error)]
pub enum LoadError {
    /// Two declarations share a name
    #[error("duplicate template function definition: {name}")]
    DuplicateFunction { name: String },

    /// A `field(...)` default is malformed
    #[error("invalid field for parameter '{parameter}' of {function}(): {message}")]
    InvalidField {
        function: String,
        parameter: String,
        message: String,
        span: Span,
    },

    /// A `default_factory` expression does not compile
    #[error("invalid default_factory for parameter '{parameter}' of {function}(): {message}")]
    InvalidFactory {
        function: String,
        parameter: String,
        message: String,
        span: Span,
    },

    /// The declaration parsed but the function failed to build
    #[error(transparent)]
    Build(#[from] BuildError),
}

impl LoadError {
    /// Source location of the error, when known
    pub fn span(&self) -> Option<&Span> {
        match self {
            LoadError::InvalidField { span, .. } | LoadError::InvalidFactory { span, .. } => {
                Some(span)
            }
            LoadError::DuplicateFunction { .. } | LoadError::Build(_) => None,
        }
    }
}

/// Registry of template functions by name, in registration order
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: Vec<BoundFunction>,
    index: HashMap<String, usize>,
}

impl FunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a built function
    pub fn register(&mut self, function: BoundFunction) -> Result<(), LoadError> {
        let name = function.name().to_string();
        if self.index.contains_key(&name) {
            return Err(LoadError::DuplicateFunction { name });
        }
        self.index.insert(name, self.functions.len());
        self.functions.push(function);
        Ok(())
    }

    /// Get a function by name
    pub fn get(&self, name: &str) -> Option<&BoundFunction> {
        self.index.get(name).map(|&i| &self.functions[i])
    }

    /// Check if a function exists
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All function names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|f| f.name())
    }

    /// All functions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &BoundFunction> {
        self.functions.iter()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{build, TemplateFunction};

    fn function(name: &str) -> BoundFunction {
        build(TemplateFunction::new(name).with_doc("text")).expect("Should build")
    }

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = FunctionRegistry::new();
        registry.register(function("a")).expect("Should register");

        assert!(registry.contains("a"));
        assert_eq!(registry.get("a").unwrap().name(), "a");
        assert!(registry.get("b").is_none());
    }

    #[test]
    fn test_registry_duplicate_error() {
        let mut registry = FunctionRegistry::new();
        registry
            .register(function("a"))
            .expect("First register should succeed");
        let result = registry.register(function("a"));
        assert!(matches!(result, Err(LoadError::DuplicateFunction { .. })));
    }

    #[test]
    fn test_registry_keeps_order() {
        let mut registry = FunctionRegistry::new();
        for name in ["c", "a", "b"] {
            registry.register(function(name)).unwrap();
        }
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["c", "a", "b"]);
        assert_eq!(registry.len(), 3);
    }
}
