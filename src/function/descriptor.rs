//! Description of a function to turn into a template

use minijinja::Value;

use super::params::{DefaultKind, Factory, Parameter};

/// A function as seen by the builder: a name, a docstring and parameters
///
/// # Example
///
/// ```rust
/// use templatify::TemplateFunction;
///
/// let greet = TemplateFunction::new("greet")
///     .with_doc("Hello {{ name }}")
///     .param("name")
///     .param_default("punctuation", "!");
/// assert_eq!(greet.parameters.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TemplateFunction {
    pub name: String,
    pub doc: Option<String>,
    pub parameters: Vec<Parameter>,
}

impl TemplateFunction {
    /// Create a function with no docstring and no parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            parameters: Vec::new(),
        }
    }

    /// Set the documentation string
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Append a parameter
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Append a required parameter
    pub fn param(self, name: impl Into<String>) -> Self {
        self.with_parameter(Parameter::required(name))
    }

    /// Append a parameter with a fixed default
    pub fn param_default(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_parameter(Parameter::with_default(name, value))
    }

    /// Append a parameter whose default is produced on each call
    pub fn param_factory(self, name: impl Into<String>, factory: Factory) -> Self {
        self.with_parameter(Parameter::with_factory(name, factory))
    }

    /// Append a parameter that callers cannot pass
    pub fn param_excluded(self, name: impl Into<String>, inner: DefaultKind) -> Self {
        self.with_parameter(Parameter::excluded(name, inner))
    }
}
