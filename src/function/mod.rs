//! Template functions
//!
//! A template function is described by a name, a docstring and an ordered
//! parameter list ([`TemplateFunction`]). [`build`] compiles the dedented
//! docstring as a template, checks that every variable it needs is provided,
//! and returns a [`BoundFunction`] whose call renders the template with the
//! call's arguments.

mod bound;
mod builder;
mod builtins;
mod descriptor;
mod docstring;
mod environment;
mod error;
mod params;

pub use bound::{Arguments, BoundFunction, Signature, SignatureParameter};
pub use builder::{build, build_with_options};
pub use builtins::builtins;
pub use descriptor::TemplateFunction;
pub use docstring::{dedent, format_docstring};
pub use environment::RenderEnvironment;
#[cfg(test)]
pub(crate) use environment::tests as environment_tests;
pub use error::{BuildError, CallError, Span};
pub use params::{DefaultKind, Factory, Parameter, ParameterTable};
