//! Abstract Syntax Tree types for template function declaration files

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Valid identifier (alphanumeric + underscore, starts with letter/_)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Root AST node - a file of function declarations
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub functions: Vec<Spanned<FunctionDecl>>,
}

/// Function declaration: `fn name(params) { "docstring" }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Spanned<Identifier>,
    pub parameters: Vec<Spanned<ParameterDecl>>,
    /// Docstring; `None` when the body is empty
    pub doc: Option<Spanned<String>>,
}

/// Parameter declaration: `name` or `name = default`
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDecl {
    pub name: Spanned<Identifier>,
    pub default: Option<Spanned<DefaultExpr>>,
}

/// Right-hand side of a parameter default
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultExpr {
    /// Plain value: `age = 10`
    Literal(Literal),
    /// Field specifier: `age = field(default = 10, init = false)`
    Field(Vec<FieldArg>),
}

/// One `key = value` argument of a `field(...)` default
#[derive(Debug, Clone, PartialEq)]
pub struct FieldArg {
    pub key: Spanned<Identifier>,
    pub value: Spanned<Literal>,
}

/// Literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    None,
    List(Vec<Literal>),
}

impl Literal {
    /// Short description of the literal's type for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::String(_) => "string",
            Literal::Integer(_) => "integer",
            Literal::Float(_) => "float",
            Literal::Bool(_) => "bool",
            Literal::None => "none",
            Literal::List(_) => "list",
        }
    }
}

impl From<&Literal> for minijinja::Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::String(s) => minijinja::Value::from(s.as_str()),
            Literal::Integer(i) => minijinja::Value::from(*i),
            Literal::Float(f) => minijinja::Value::from(*f),
            Literal::Bool(b) => minijinja::Value::from(*b),
            Literal::None => minijinja::Value::from(()),
            Literal::List(items) => items.iter().map(minijinja::Value::from).collect(),
        }
    }
}
