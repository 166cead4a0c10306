//! Parameter descriptions and default resolution

use std::fmt;
use std::sync::Arc;

use minijinja::value::ValueKind;
use minijinja::Value;

type FactoryFn = dyn Fn() -> Result<Value, minijinja::Error> + Send + Sync;

/// A zero-argument function producing a default value at call time
#[derive(Clone)]
pub struct Factory(Arc<FactoryFn>);

impl Factory {
    /// Wrap an infallible producer
    pub fn new<F, V>(f: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self(Arc::new(move || Ok(f().into())))
    }

    /// Wrap a producer that may fail
    pub fn try_new<F>(f: F) -> Self
    where
        F: Fn() -> Result<Value, minijinja::Error> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Invoke the factory
    pub fn produce(&self) -> Result<Value, minijinja::Error> {
        (self.0)()
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<factory>")
    }
}

/// How a parameter obtains its value when the caller omits it
#[derive(Debug, Clone)]
pub enum DefaultKind {
    /// No default; the caller must supply the argument
    Required,
    /// Fixed value substituted when omitted
    Fixed(Value),
    /// Factory invoked on every call that omits the argument
    Factory(Factory),
    /// Not part of the external signature; resolved from the inner kind
    Excluded(Box<DefaultKind>),
}

impl DefaultKind {
    /// Exclude a parameter from the signature, resolving it through `inner`
    ///
    /// Nested exclusions collapse into one.
    pub fn excluded(inner: DefaultKind) -> Self {
        match inner {
            DefaultKind::Excluded(inner) => DefaultKind::Excluded(inner),
            other => DefaultKind::Excluded(Box::new(other)),
        }
    }

    /// Whether the caller can pass this parameter
    pub fn in_signature(&self) -> bool {
        !matches!(self, DefaultKind::Excluded(_))
    }

    /// Whether the caller must pass this parameter
    pub fn is_required(&self) -> bool {
        matches!(self, DefaultKind::Required)
    }

    /// Produce the value used when the argument was not supplied
    ///
    /// Returns `Ok(None)` for required parameters. An excluded parameter
    /// without a fixed value or factory resolves to `none`.
    pub fn resolve(&self) -> Result<Option<Value>, minijinja::Error> {
        match self {
            DefaultKind::Required => Ok(None),
            DefaultKind::Fixed(value) => Ok(Some(value.clone())),
            DefaultKind::Factory(factory) => factory.produce().map(Some),
            DefaultKind::Excluded(inner) => Ok(Some(inner.resolve()?.unwrap_or(Value::from(())))),
        }
    }
}

impl fmt::Display for DefaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultKind::Required => Ok(()),
            DefaultKind::Fixed(value) => write_literal(f, value),
            DefaultKind::Factory(_) => f.write_str("<factory>"),
            DefaultKind::Excluded(inner) => write!(f, "{}", inner),
        }
    }
}

/// Write a value the way it reads as a declaration default
///
/// Booleans and `none` are lowercase, strings are quoted, sequences and maps
/// are written element by element.
fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value.kind() {
        ValueKind::Undefined => f.write_str("undefined"),
        ValueKind::None => f.write_str("none"),
        ValueKind::Bool => f.write_str(if value.is_true() { "true" } else { "false" }),
        ValueKind::String => write!(f, "{:?}", value.as_str().unwrap_or_default()),
        ValueKind::Seq => {
            f.write_str("[")?;
            for (i, item) in value.try_iter().map_err(|_| fmt::Error)?.enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_literal(f, &item)?;
            }
            f.write_str("]")
        }
        ValueKind::Map => {
            f.write_str("{")?;
            for (i, key) in value.try_iter().map_err(|_| fmt::Error)?.enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_literal(f, &key)?;
                f.write_str(": ")?;
                write_literal(f, &value.get_item(&key).unwrap_or_default())?;
            }
            f.write_str("}")
        }
        _ => write!(f, "{}", value),
    }
}

/// A declared parameter of a template function
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub default: DefaultKind,
}

impl Parameter {
    /// A parameter without a default
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: DefaultKind::Required,
        }
    }

    /// A parameter with a fixed default value
    pub fn with_default(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: DefaultKind::Fixed(value.into()),
        }
    }

    /// A parameter whose default is produced by `factory` on each call
    pub fn with_factory(name: impl Into<String>, factory: Factory) -> Self {
        Self {
            name: name.into(),
            default: DefaultKind::Factory(factory),
        }
    }

    /// A parameter hidden from the signature
    pub fn excluded(name: impl Into<String>, inner: DefaultKind) -> Self {
        Self {
            name: name.into(),
            default: DefaultKind::excluded(inner),
        }
    }
}

/// Ordered mapping from parameter name to its default kind
///
/// Captured by value when a function is built and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct ParameterTable {
    parameters: Vec<Parameter>,
}

impl ParameterTable {
    /// Build a table, returning the first duplicated name on failure
    pub fn new(parameters: Vec<Parameter>) -> Result<Self, String> {
        for (i, param) in parameters.iter().enumerate() {
            if parameters[..i].iter().any(|p| p.name == param.name) {
                return Err(param.name.clone());
            }
        }
        Ok(Self { parameters })
    }

    /// Check if a parameter with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name)
    }

    /// Position of a parameter in declaration order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p.name == name)
    }

    /// All parameters in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    /// Parameters the caller may pass, with their table index
    pub fn signature_params(&self) -> impl Iterator<Item = (usize, &Parameter)> {
        self.parameters
            .iter()
            .enumerate()
            .filter(|(_, p)| p.default.in_signature())
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}
