//! Declaration files of template functions
//!
//! A declaration file lists functions whose docstrings are templates. This
//! module turns a parsed file into a registry of bound functions.
//!
//! # Example
//!
//! ```text
//! // A function with a plain default
//! fn greet(name, age = 10) {
//!     """
//!     Hello {{ name|upper }}, you are {{ age }} years old.
//!     """
//! }
//!
//! // A hidden parameter and one produced on every call
//! fn stamp(who, id = field(default_factory = "range(3)|list"), v = field(default = 2, init = false)) {
//!     "{{ who }} {{ id }} v{{ v }}"
//! }
//! ```

mod registry;
mod resolver;

pub use registry::{FunctionRegistry, LoadError};
pub use resolver::resolve_functions;
