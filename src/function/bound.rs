//! The callable produced by the builder

use std::collections::BTreeMap;
use std::fmt;

use minijinja::{Environment, Value};

use super::error::CallError;
use super::params::{DefaultKind, ParameterTable};

/// A parameter as the caller sees it
#[derive(Debug, Clone)]
pub struct SignatureParameter {
    pub name: String,
    pub default: DefaultKind,
}

impl SignatureParameter {
    /// Whether the argument may be omitted
    pub fn has_default(&self) -> bool {
        !self.default.is_required()
    }
}

/// The external signature of a bound function
///
/// Mirrors the original declaration in names, order and defaults, without
/// the parameters excluded from the signature. Displays the way the
/// declaration reads, e.g. `greet(name, age=10)`.
#[derive(Debug, Clone)]
pub struct Signature {
    pub name: String,
    pub parameters: Vec<SignatureParameter>,
}

impl Signature {
    fn from_table(name: &str, table: &ParameterTable) -> Self {
        Self {
            name: name.to_string(),
            parameters: table
                .signature_params()
                .map(|(_, p)| SignatureParameter {
                    name: p.name.clone(),
                    default: p.default.clone(),
                })
                .collect(),
        }
    }

    /// Parameter names in order
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&param.name)?;
            if param.has_default() {
                write!(f, "={}", param.default)?;
            }
        }
        f.write_str(")")
    }
}

/// Arguments for a call: positional values followed by named values
///
/// Passing `Value::UNDEFINED` for a parameter counts as not supplying it.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    positional: Vec<Value>,
    named: Vec<(String, Value)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Append a named argument
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn named(&self) -> &[(String, Value)] {
        &self.named
    }
}

impl<V: Into<Value>> FromIterator<V> for Arguments {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            positional: iter.into_iter().map(Into::into).collect(),
            named: Vec::new(),
        }
    }
}

/// A template function: calling it renders its docstring
///
/// Holds only immutable state, so it can be shared between threads and
/// called concurrently.
#[derive(Clone)]
pub struct BoundFunction {
    name: String,
    doc: String,
    source: String,
    env: Environment<'static>,
    parameters: ParameterTable,
    signature: Signature,
}

impl BoundFunction {
    /// Assemble a bound function around an environment that already holds
    /// the compiled template under `name`
    pub(crate) fn new(
        name: String,
        doc: String,
        source: String,
        env: Environment<'static>,
        parameters: ParameterTable,
    ) -> Self {
        let signature = Signature::from_table(&name, &parameters);
        Self {
            name,
            doc,
            source,
            env,
            parameters,
            signature,
        }
    }

    /// Name of the original function
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The original documentation string
    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// The dedented template text
    pub fn template_source(&self) -> &str {
        &self.source
    }

    /// The external signature
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The full parameter table, including excluded parameters
    pub fn parameters(&self) -> &ParameterTable {
        &self.parameters
    }

    /// Call the function, returning the rendered template
    pub fn call(&self, args: &Arguments) -> Result<String, CallError> {
        let bindings = self.bind(args)?;
        tracing::trace!(function = %self.name, bindings = bindings.len(), "rendering template function");

        let render_error = |source: minijinja::Error| CallError::Render {
            function: self.name.clone(),
            source,
        };
        let template = self.env.get_template(&self.name).map_err(render_error)?;
        template.render(&bindings).map_err(render_error)
    }

    /// Call the function with named arguments only
    pub fn render_with<I, K, V>(&self, named: I) -> Result<String, CallError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let args = named
            .into_iter()
            .fold(Arguments::new(), |args, (k, v)| args.kwarg(k, v));
        self.call(&args)
    }

    /// Map the supplied arguments and defaults onto every parameter
    fn bind(&self, args: &Arguments) -> Result<BTreeMap<String, Value>, CallError> {
        let external: Vec<usize> = self.parameters.signature_params().map(|(i, _)| i).collect();

        if args.positional.len() > external.len() {
            return Err(CallError::TooManyArguments {
                function: self.name.clone(),
                expected: external.len(),
                given: args.positional.len(),
            });
        }

        let mut supplied: Vec<Option<Value>> = vec![None; self.parameters.len()];
        for (index, value) in external.iter().zip(&args.positional) {
            supplied[*index] = Some(value.clone());
        }

        for (name, value) in &args.named {
            let index = match self.parameters.position(name) {
                Some(index) if external.contains(&index) => index,
                _ => {
                    return Err(CallError::UnexpectedArgument {
                        function: self.name.clone(),
                        name: name.clone(),
                    })
                }
            };
            if supplied[index].is_some() {
                return Err(CallError::DuplicateArgument {
                    function: self.name.clone(),
                    name: name.clone(),
                });
            }
            supplied[index] = Some(value.clone());
        }

        let mut bindings = BTreeMap::new();
        for (param, value) in self.parameters.iter().zip(supplied) {
            let value = match value {
                Some(value) if !value.is_undefined() => value,
                _ => param
                    .default
                    .resolve()
                    .map_err(|source| CallError::Factory {
                        function: self.name.clone(),
                        name: param.name.clone(),
                        source,
                    })?
                    .ok_or_else(|| CallError::MissingArgument {
                        function: self.name.clone(),
                        name: param.name.clone(),
                    })?,
            };
            bindings.insert(param.name.clone(), value);
        }
        Ok(bindings)
    }
}

impl fmt::Debug for BoundFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundFunction")
            .field("signature", &self.signature.to_string())
            .finish_non_exhaustive()
    }
}
