//! Error types for building and calling template functions

use thiserror::Error;

/// Byte range in the dedented template text
pub type Span = std::ops::Range<usize>;

/// Errors raised while turning a function description into a [`BoundFunction`]
///
/// All of these are build-time failures: a build either yields a complete
/// function or one of these, never something in between.
///
/// [`BoundFunction`]: super::BoundFunction
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    /// The function has no documentation string to use as a template
    #[error("template function {function}() must have a docstring")]
    MissingDocstring { function: String },

    /// The template references a name that no parameter provides
    #[error(
        "template depends on variable '{variable}', but '{function}' does not have a parameter with that name"
    )]
    UnsatisfiedVariable { function: String, variable: String },

    /// Two parameters share a name
    #[error("duplicate parameter '{parameter}' in template function {function}()")]
    DuplicateParameter { function: String, parameter: String },

    /// The docstring is not a valid template
    #[error("syntax error in template of {function}(): {message}")]
    Syntax {
        function: String,
        message: String,
        span: Option<Span>,
    },
}

impl BuildError {
    /// Name of the function the error refers to
    pub fn function(&self) -> &str {
        match self {
            BuildError::MissingDocstring { function }
            | BuildError::UnsatisfiedVariable { function, .. }
            | BuildError::DuplicateParameter { function, .. }
            | BuildError::Syntax { function, .. } => function,
        }
    }
}

/// Errors raised when a [`BoundFunction`] is invoked
///
/// [`BoundFunction`]: super::BoundFunction
#[derive(Debug, Error)]
pub enum CallError {
    /// More positional arguments than the signature accepts
    #[error("{function}() takes {expected} positional arguments but {given} were given")]
    TooManyArguments {
        function: String,
        expected: usize,
        given: usize,
    },

    /// Named argument that is not part of the signature
    #[error("{function}() got an unexpected keyword argument '{name}'")]
    UnexpectedArgument { function: String, name: String },

    /// Argument supplied both positionally and by name, or twice by name
    #[error("{function}() got multiple values for argument '{name}'")]
    DuplicateArgument { function: String, name: String },

    /// Required argument not supplied
    #[error("{function}() missing required argument: '{name}'")]
    MissingArgument { function: String, name: String },

    /// A factory default failed to produce a value
    #[error("default factory for '{name}' in {function}() failed: {source}")]
    Factory {
        function: String,
        name: String,
        #[source]
        source: minijinja::Error,
    },

    /// The template engine failed while rendering
    #[error("failed to render {function}(): {source}")]
    Render {
        function: String,
        #[source]
        source: minijinja::Error,
    },
}
