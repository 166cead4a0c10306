//! Build pipeline: function description in, bound function out

use crate::config::TemplateOptions;

use super::bound::BoundFunction;
use super::descriptor::TemplateFunction;
use super::docstring::format_docstring;
use super::error::BuildError;
use super::params::ParameterTable;

/// Build a template function with default options
///
/// # Example
///
/// ```rust
/// use templatify::{build, TemplateFunction};
///
/// let greet = build(
///     TemplateFunction::new("greet")
///         .with_doc("Hello {{ name|upper }}, you are {{ age }} years old.")
///         .param("name")
///         .param_default("age", 10),
/// )
/// .unwrap();
///
/// let text = greet.render_with([("name", "john")]).unwrap();
/// assert_eq!(text, "Hello JOHN, you are 10 years old.");
/// ```
pub fn build(function: TemplateFunction) -> Result<BoundFunction, BuildError> {
    build_with_options(function, &TemplateOptions::default())
}

/// Build a template function with custom options
///
/// This:
/// 1. Dedents the docstring into template text
/// 2. Compiles it in the environment described by `options`
/// 3. Checks that every undeclared template variable is a parameter
/// 4. Captures the compiled template and the parameter table
pub fn build_with_options(
    function: TemplateFunction,
    options: &TemplateOptions,
) -> Result<BoundFunction, BuildError> {
    let TemplateFunction {
        name,
        doc,
        parameters,
    } = function;

    let doc = doc.ok_or_else(|| BuildError::MissingDocstring {
        function: name.clone(),
    })?;
    let source = format_docstring(&doc);

    let parameters =
        ParameterTable::new(parameters).map_err(|parameter| BuildError::DuplicateParameter {
            function: name.clone(),
            parameter,
        })?;

    let syntax_error = |err: minijinja::Error| BuildError::Syntax {
        function: name.clone(),
        message: err.to_string(),
        span: err.range(),
    };

    let mut env = options.render_environment();
    env.engine_mut()
        .add_template_owned(name.clone(), source.clone())
        .map_err(syntax_error)?;

    let mut variables: Vec<String> = env
        .engine()
        .get_template(&name)
        .map_err(syntax_error)?
        .undeclared_variables(false)
        .into_iter()
        .collect();
    variables.sort();

    tracing::debug!(
        function = %name,
        parameters = parameters.len(),
        variables = ?variables,
        "building template function"
    );

    for variable in variables {
        if !parameters.contains(&variable) {
            return Err(BuildError::UnsatisfiedVariable {
                function: name,
                variable,
            });
        }
    }

    Ok(BoundFunction::new(
        name,
        doc,
        source,
        env.into_engine(),
        parameters,
    ))
}
