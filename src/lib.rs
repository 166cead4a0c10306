//! Templatify - functions whose docstring is their body
//!
//! A template function is described by a name, a documentation string and
//! an ordered parameter list. Building it compiles the dedented docstring as a
//! [minijinja](https://docs.rs/minijinja) template; calling the result renders
//! the template with the call's arguments bound to the parameter names.
//!
//! # Example
//!
//! ```rust
//! use templatify::{build, Arguments, TemplateFunction};
//!
//! let greet = build(
//!     TemplateFunction::new("greet")
//!         .with_doc("Hello {{ name|upper }}, you are {{ age }} years old.")
//!         .param("name")
//!         .param_default("age", 10),
//! )
//! .unwrap();
//!
//! let text = greet.call(&Arguments::new().arg("john").arg(99)).unwrap();
//! assert_eq!(text, "Hello JOHN, you are 99 years old.");
//! assert_eq!(greet.signature().to_string(), "greet(name, age=10)");
//! ```

pub mod config;
pub mod error;
pub mod function;
mod macros;
pub mod parser;
pub mod template;

pub use config::{ConfigError, TemplateOptions};
pub use error::ParseError;
pub use function::{
    build, build_with_options, Arguments, BoundFunction, BuildError, CallError, DefaultKind,
    Factory, Parameter, RenderEnvironment, Signature, TemplateFunction,
};
pub use minijinja::Value;
pub use parser::{parse, Document};
pub use template::{resolve_functions, FunctionRegistry, LoadError};

/// Errors that can occur anywhere between source text and rendered output
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error while parsing a declaration file
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// Error while turning declarations into functions
    #[error("{0}")]
    Load(#[from] LoadError),

    /// Error while building a function
    #[error("{0}")]
    Build(#[from] BuildError),

    /// Error while calling a function
    #[error("{0}")]
    Call(#[from] CallError),

    /// Error while loading options
    #[error("options error: {0}")]
    Config(#[from] ConfigError),
}

impl From<Vec<ParseError>> for Error {
    fn from(errors: Vec<ParseError>) -> Self {
        Error::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Format the error against the declaration source it came from
    ///
    /// Parse errors and field errors get a source excerpt; others fall back
    /// to their message.
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            Error::Parse(errors) => errors
                .iter()
                .map(|e| e.format(source, filename))
                .collect::<Vec<_>>()
                .join("\n"),
            Error::Load(err) => match err.span() {
                Some(span) => {
                    let message = err.to_string();
                    error::report(source, filename, span.clone(), &message, &message)
                }
                None => err.to_string(),
            },
            other => other.to_string(),
        }
    }
}

/// Parse declaration source and build every function with default options
///
/// # Example
///
/// ```rust
/// use templatify::load_functions;
///
/// let functions = load_functions(r#"
///     fn greet(name, age = 10) {
///         """
///         Hello {{ name|upper }}, you are {{ age }} years old.
///         """
///     }
/// "#).unwrap();
///
/// let greet = functions.get("greet").unwrap();
/// assert_eq!(
///     greet.render_with([("name", "john")]).unwrap(),
///     "Hello JOHN, you are 10 years old."
/// );
/// ```
pub fn load_functions(source: &str) -> Result<FunctionRegistry, Error> {
    load_functions_with_options(source, &TemplateOptions::default())
}

/// Parse declaration source and build every function with custom options
pub fn load_functions_with_options(
    source: &str,
    options: &TemplateOptions,
) -> Result<FunctionRegistry, Error> {
    let doc = parse(source)?;
    Ok(resolve_functions(&doc, options)?)
}
