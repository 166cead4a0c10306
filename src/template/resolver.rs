//! Declaration resolution - turns parsed declarations into bound functions

use minijinja::Value;

use crate::config::TemplateOptions;
use crate::function::{
    build_with_options, DefaultKind, Factory, Parameter, RenderEnvironment, TemplateFunction,
};
use crate::parser::ast::{
    DefaultExpr, Document, FieldArg, FunctionDecl, Literal, ParameterDecl, Span, Spanned,
};

use super::registry::{FunctionRegistry, LoadError};

/// Validated arguments of a `field(...)` default
#[derive(Debug)]
struct FieldSpec {
    default: Option<Literal>,
    default_factory: Option<Spanned<String>>,
    init: bool,
}

impl FieldSpec {
    /// Check keys and value types of the raw field arguments
    fn from_args(args: &[FieldArg]) -> Result<Self, (Span, String)> {
        let mut spec = FieldSpec {
            default: None,
            default_factory: None,
            init: true,
        };

        for arg in args {
            match (arg.key.node.as_str(), &arg.value.node) {
                ("default", literal) => spec.default = Some(literal.clone()),
                ("default_factory", Literal::String(expr)) => {
                    spec.default_factory = Some(Spanned::new(expr.clone(), arg.value.span.clone()))
                }
                ("init", Literal::Bool(init)) => spec.init = *init,
                ("default_factory", other) => {
                    return Err((
                        arg.value.span.clone(),
                        format!("default_factory must be a string, found {}", other.type_name()),
                    ))
                }
                ("init", other) => {
                    return Err((
                        arg.value.span.clone(),
                        format!("init must be true or false, found {}", other.type_name()),
                    ))
                }
                (other, _) => {
                    return Err((arg.key.span.clone(), format!("unknown field argument '{}'", other)))
                }
            }
        }

        if let (Some(_), Some(factory)) = (&spec.default, &spec.default_factory) {
            return Err((
                factory.span.clone(),
                "cannot specify both default and default_factory".to_string(),
            ));
        }

        Ok(spec)
    }
}

/// Build every function declared in a document
///
/// This function:
/// 1. Lowers each declaration's parameters into default kinds
/// 2. Builds each function with `options`
/// 3. Collects the results into a registry, rejecting duplicate names
pub fn resolve_functions(
    doc: &Document,
    options: &TemplateOptions,
) -> Result<FunctionRegistry, LoadError> {
    let env = options.render_environment();
    let mut registry = FunctionRegistry::new();

    for decl in &doc.functions {
        let name = decl.node.name.node.as_str();
        if registry.contains(name) {
            return Err(LoadError::DuplicateFunction {
                name: name.to_string(),
            });
        }

        let function = lower_function(&decl.node, &env)?;
        registry.register(build_with_options(function, options)?)?;
    }

    tracing::debug!(functions = registry.len(), "resolved declarations");
    Ok(registry)
}

/// Convert one declaration into a function description
fn lower_function(
    decl: &FunctionDecl,
    env: &RenderEnvironment,
) -> Result<TemplateFunction, LoadError> {
    let name = decl.name.node.as_str();
    let mut function = TemplateFunction::new(name);

    if let Some(doc) = &decl.doc {
        function = function.with_doc(doc.node.clone());
    }

    for param in &decl.parameters {
        function = function.with_parameter(lower_parameter(name, &param.node, env)?);
    }

    Ok(function)
}

fn lower_parameter(
    function: &str,
    decl: &ParameterDecl,
    env: &RenderEnvironment,
) -> Result<Parameter, LoadError> {
    let name = decl.name.node.as_str();

    let default = match decl.default.as_ref().map(|d| &d.node) {
        None => DefaultKind::Required,
        Some(DefaultExpr::Literal(literal)) => DefaultKind::Fixed(Value::from(literal)),
        Some(DefaultExpr::Field(args)) => {
            let spec = FieldSpec::from_args(args).map_err(|(span, message)| {
                LoadError::InvalidField {
                    function: function.to_string(),
                    parameter: name.to_string(),
                    message,
                    span,
                }
            })?;
            lower_field(function, name, spec, env)?
        }
    };

    Ok(Parameter {
        name: name.to_string(),
        default,
    })
}

fn lower_field(
    function: &str,
    parameter: &str,
    spec: FieldSpec,
    env: &RenderEnvironment,
) -> Result<DefaultKind, LoadError> {
    let inner = match (spec.default, spec.default_factory) {
        (Some(literal), _) => DefaultKind::Fixed(Value::from(&literal)),
        (None, Some(expr)) => DefaultKind::Factory(expression_factory(function, parameter, expr, env)?),
        (None, None) => DefaultKind::Required,
    };

    Ok(if spec.init {
        inner
    } else {
        DefaultKind::excluded(inner)
    })
}

/// A factory that evaluates a template expression on every call
///
/// The expression is compiled once here to report errors at load time.
fn expression_factory(
    function: &str,
    parameter: &str,
    expr: Spanned<String>,
    env: &RenderEnvironment,
) -> Result<Factory, LoadError> {
    if let Err(err) = env.engine().compile_expression_owned(expr.node.clone()) {
        return Err(LoadError::InvalidFactory {
            function: function.to_string(),
            parameter: parameter.to_string(),
            message: err.to_string(),
            span: expr.span,
        });
    }

    let engine = env.engine().clone();
    let source = expr.node;
    Ok(Factory::try_new(move || {
        engine.compile_expression_owned(source.clone())?.eval(())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{Arguments, CallError};
    use crate::parser::parse;

    fn resolve(source: &str) -> Result<FunctionRegistry, LoadError> {
        let doc = parse(source).expect("Should parse");
        resolve_functions(&doc, &TemplateOptions::default())
    }

    #[test]
    fn test_resolve_plain_defaults() {
        let registry = resolve(r#"fn greet(name, age = 10) { "{{ name }} {{ age }}" }"#).unwrap();
        let greet = registry.get("greet").unwrap();
        assert_eq!(greet.signature().to_string(), "greet(name, age=10)");
        assert_eq!(greet.render_with([("name", "x")]).unwrap(), "x 10");
    }

    #[test]
    fn test_resolve_excluded_field() {
        let registry = resolve(
            r#"fn greet(name, age = field(default = 10, init = false)) { "{{ name }} {{ age }}" }"#,
        )
        .unwrap();
        let greet = registry.get("greet").unwrap();
        assert_eq!(greet.signature().parameter_names(), vec!["name"]);
        assert_eq!(greet.call(&Arguments::new().arg("x")).unwrap(), "x 10");
    }

    #[test]
    fn test_resolve_excluded_field_without_default_is_none() {
        let registry = resolve(
            r#"fn f(v = field(init = false)) { "{% if v is none %}empty{% else %}{{ v }}{% endif %}" }"#,
        )
        .unwrap();
        assert_eq!(registry.get("f").unwrap().call(&Arguments::new()).unwrap(), "empty");
    }

    #[test]
    fn test_resolve_field_without_default_is_required() {
        let registry = resolve(r#"fn f(v = field()) { "{{ v }}" }"#).unwrap();
        let f = registry.get("f").unwrap();
        assert_eq!(f.signature().to_string(), "f(v)");
        assert!(f.call(&Arguments::new()).is_err());
    }

    #[test]
    fn test_resolve_factory_field() {
        let registry = resolve(
            r#"fn f(items = field(default_factory = "range(3)|list")) { "{{ items|join(',') }}" }"#,
        )
        .unwrap();
        let f = registry.get("f").unwrap();
        assert_eq!(f.signature().to_string(), "f(items=<factory>)");
        assert_eq!(f.call(&Arguments::new()).unwrap(), "0,1,2");
        assert_eq!(f.call(&Arguments::new().arg(vec![9])).unwrap(), "9");
    }

    #[test]
    fn test_factory_sees_builtins_and_globals() {
        let options = TemplateOptions::new().with_global("team", vec!["bob", "ada"]);
        let doc = parse(
            r#"fn f(members = field(default_factory = "sorted(team)")) { "{{ members|join(',') }}" }"#,
        )
        .unwrap();

        let registry = resolve_functions(&doc, &options).unwrap();
        assert_eq!(
            registry.get("f").unwrap().call(&Arguments::new()).unwrap(),
            "ada,bob"
        );

        let bare = resolve_functions(&doc, &options.clone().with_builtins(false)).unwrap();
        assert!(matches!(
            bare.get("f").unwrap().call(&Arguments::new()),
            Err(CallError::Factory { ref name, .. }) if name == "members"
        ));
    }

    #[test]
    fn test_factory_overflow_is_a_call_error() {
        let registry = resolve(
            r#"fn f(values, total = field(default_factory = "sum([9223372036854775807, 1])")) { "{{ values }}{{ total }}" }"#,
        )
        .unwrap();
        let f = registry.get("f").unwrap();
        assert!(matches!(
            f.call(&Arguments::new().arg(1)),
            Err(CallError::Factory { ref name, .. }) if name == "total"
        ));
    }

    #[test]
    fn test_resolve_invalid_factory_expression() {
        let result = resolve(r#"fn f(a = field(default_factory = "1 +")) { "{{ a }}" }"#);
        assert!(matches!(result, Err(LoadError::InvalidFactory { .. })));
    }

    #[test]
    fn test_resolve_both_defaults_rejected() {
        let result =
            resolve(r#"fn f(a = field(default = 1, default_factory = "2")) { "{{ a }}" }"#);
        match result {
            Err(LoadError::InvalidField { message, .. }) => {
                assert!(message.contains("both default and default_factory"))
            }
            other => panic!("Expected invalid field, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_unknown_field_argument() {
        let result = resolve(r#"fn f(a = field(kw_only = true)) { "{{ a }}" }"#);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("kw_only"));
        assert!(err.span().is_some());
    }

    #[test]
    fn test_resolve_wrong_field_types() {
        assert!(matches!(
            resolve(r#"fn f(a = field(init = 1)) { "{{ a }}" }"#),
            Err(LoadError::InvalidField { .. })
        ));
        assert!(matches!(
            resolve(r#"fn f(a = field(default_factory = 1)) { "{{ a }}" }"#),
            Err(LoadError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_resolve_duplicate_function() {
        let result = resolve(r#"fn a() { "1" } fn a() { "2" }"#);
        assert!(matches!(result, Err(LoadError::DuplicateFunction { .. })));
    }

    #[test]
    fn test_resolve_build_errors_propagate() {
        assert!(matches!(
            resolve("fn nodoc(x) { }"),
            Err(LoadError::Build(crate::function::BuildError::MissingDocstring { .. }))
        ));
    }
}
