//! Typed wrappers for template functions known at compile time

/// Define a Rust function whose doc comment is its template
///
/// The generated function takes the declared arguments, converts each with
/// [`Value::from_serialize`](minijinja::Value::from_serialize) and returns
/// the rendered text.
///
/// Each function also gets a module of the same name. `name::check()` builds
/// the template and returns any build error without rendering, so a startup
/// routine or a test can surface an unsatisfied variable before the first
/// call. The template is built once, by `check()` or by the first call,
/// whichever comes first; a failed build is returned from every call.
///
/// A declaration without doc comments does not compile.
///
/// # Example
///
/// ```rust
/// templatify::template! {
///     /// Hello {{ name|upper }}, you are {{ age }} years old.
///     fn greet(name: &str, age: u32) -> String;
/// }
///
/// greet::check().unwrap();
/// assert_eq!(greet("john", 10).unwrap(), "Hello JOHN, you are 10 years old.");
/// ```
#[macro_export]
macro_rules! template {
    ($(
        $(#[doc = $doc:literal])+
        $vis:vis fn $name:ident ( $( $param:ident : $ty:ty ),* $(,)? ) -> String ;
    )*) => {$(
        $(#[doc = $doc])+
        $vis fn $name( $( $param : $ty ),* ) -> ::std::result::Result<::std::string::String, $crate::Error> {
            match $name::function() {
                ::std::result::Result::Ok(function) => {
                    let args = $crate::Arguments::new()
                        $( .arg($crate::Value::from_serialize(&$param)) )*;
                    ::std::result::Result::Ok(function.call(&args)?)
                }
                ::std::result::Result::Err(err) => ::std::result::Result::Err(err.clone().into()),
            }
        }

        #[doc = ::std::concat!("Build access for [`", ::std::stringify!($name), "()`]")]
        #[allow(dead_code)]
        $vis mod $name {
            /// The built function, built on first use
            pub fn function(
            ) -> &'static ::std::result::Result<$crate::BoundFunction, $crate::BuildError> {
                static FUNCTION: ::std::sync::OnceLock<
                    ::std::result::Result<$crate::BoundFunction, $crate::BuildError>,
                > = ::std::sync::OnceLock::new();

                FUNCTION.get_or_init(|| {
                    let doc = [$($doc),+].join("\n");
                    $crate::build(
                        $crate::TemplateFunction::new(::std::stringify!($name))
                            .with_doc(doc)
                            $( .param(::std::stringify!($param)) )*,
                    )
                })
            }

            /// Build the template, returning the build error if there is one
            pub fn check() -> ::std::result::Result<(), $crate::BuildError> {
                function().as_ref().map(|_| ()).map_err(::std::clone::Clone::clone)
            }
        }
    )*};
}

#[cfg(test)]
mod tests {
    crate::template! {
        /// Hello {{ name|upper }}, you are {{ age }} years old.
        fn greet(name: &str, age: u32) -> String;

        ///
        ///     {% for item in items -%}
        ///     - {{ item }}
        ///     {% endfor %}
        pub(crate) fn bullets(items: Vec<&str>) -> String;

        /// {{ missing }}
        fn broken() -> String;
    }

    #[test]
    fn test_macro_renders() {
        assert_eq!(greet("john", 10).unwrap(), "Hello JOHN, you are 10 years old.");
        assert_eq!(greet("ada", 36).unwrap(), "Hello ADA, you are 36 years old.");
    }

    #[test]
    fn test_macro_dedents_doc_lines() {
        assert_eq!(bullets(vec!["a", "b"]).unwrap(), "- a\n- b\n");
    }

    #[test]
    fn test_check_reports_build_errors_before_any_call() {
        assert!(greet::check().is_ok());
        assert!(bullets::check().is_ok());
        assert_eq!(
            broken::check(),
            Err(crate::BuildError::UnsatisfiedVariable {
                function: "broken".to_string(),
                variable: "missing".to_string()
            })
        );
    }

    #[test]
    fn test_macro_reports_build_errors_on_every_call() {
        for _ in 0..2 {
            let err = broken().unwrap_err();
            assert!(matches!(
                err,
                crate::Error::Build(crate::BuildError::UnsatisfiedVariable { .. })
            ));
        }
    }
}
