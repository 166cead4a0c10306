//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::*;
use crate::parser::lexer::Token;

/// Parse declaration source code into an AST
pub fn parse(input: &str) -> Result<Document, Vec<crate::ParseError>> {
    let len = input.len();

    // Lex everything first; input that forms no token fails the parse
    let mut tokens = Vec::new();
    let mut lex_errors = Vec::new();
    for item in crate::parser::lexer::lex(input) {
        match item {
            Ok(token) => tokens.push(token),
            Err(span) => lex_errors.push(crate::ParseError::Syntax {
                message: format!("Invalid token '{}'", &input[span.clone()]),
                span,
                expected: Vec::new(),
            }),
        }
    }
    if !lex_errors.is_empty() {
        return Err(lex_errors);
    }

    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    document_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn document_parser<'a, I>() -> impl Parser<'a, I, Document, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    // Basic token parsers
    let identifier = select! {
        Token::Ident(s) => Identifier::new(s),
    }
    .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

    // Literal values, lists nest
    let literal = recursive(|literal| {
        let list = literal
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
            .map(Literal::List);

        choice((
            select! {
                Token::String(s) => Literal::String(s),
                Token::DocString(s) => Literal::String(s),
                Token::Integer(i) => Literal::Integer(i),
                Token::Float(f) => Literal::Float(f),
                Token::True => Literal::Bool(true),
                Token::False => Literal::Bool(false),
                Token::Null => Literal::None,
            },
            list,
        ))
    });

    // Field argument: key = literal
    let field_arg = identifier
        .clone()
        .then_ignore(just(Token::Equals))
        .then(
            literal
                .clone()
                .map_with(|l, e| Spanned::new(l, span_range(&e.span()))),
        )
        .map(|(key, value)| FieldArg { key, value });

    // field(default = ..., default_factory = "...", init = ...)
    let field = just(Token::Field)
        .ignore_then(
            field_arg
                .separated_by(just(Token::Comma))
                .allow_trailing()
                .collect::<Vec<_>>()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
        );

    let default_expr = choice((
        field.map(DefaultExpr::Field),
        literal.map(DefaultExpr::Literal),
    ))
    .map_with(|d, e| Spanned::new(d, span_range(&e.span())));

    // Parameter: name or name = default
    let param = identifier
        .clone()
        .then(just(Token::Equals).ignore_then(default_expr).or_not())
        .map_with(|(name, default), e| {
            Spanned::new(ParameterDecl { name, default }, span_range(&e.span()))
        });

    // Parameter list: (a, b = 1,)
    let param_list = param
        .separated_by(just(Token::Comma))
        .allow_trailing()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

    let doc = select! {
        Token::DocString(s) => s,
        Token::String(s) => s,
    }
    .map_with(|s, e| Spanned::new(s, span_range(&e.span())));

    // fn name(params) { "doc" }
    let function = just(Token::Fn)
        .ignore_then(identifier)
        .then(param_list)
        .then(
            doc.or_not()
                .delimited_by(just(Token::BraceOpen), just(Token::BraceClose)),
        )
        .map_with(|((name, parameters), doc), e| {
            Spanned::new(
                FunctionDecl {
                    name,
                    parameters,
                    doc,
                },
                span_range(&e.span()),
            )
        });

    // Document is a list of functions
    function
        .repeated()
        .collect()
        .then_ignore(end())
        .map(|functions| Document { functions })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_function() {
        let doc = parse(r#"fn greet(name, age = 10) { "Hello {{ name }}" }"#).expect("Should parse");
        assert_eq!(doc.functions.len(), 1);

        let f = &doc.functions[0].node;
        assert_eq!(f.name.node.as_str(), "greet");
        assert_eq!(f.parameters.len(), 2);
        assert_eq!(f.parameters[0].node.name.node.as_str(), "name");
        assert!(f.parameters[0].node.default.is_none());
        assert_eq!(
            f.parameters[1].node.default.as_ref().unwrap().node,
            DefaultExpr::Literal(Literal::Integer(10))
        );
        assert_eq!(f.doc.as_ref().unwrap().node, "Hello {{ name }}");
    }

    #[test]
    fn test_parse_docstring_block() {
        let source = "fn letter(name) {\n    \"\"\"\n    Dear {{ name }}\n    \"\"\"\n}";
        let doc = parse(source).expect("Should parse");
        assert_eq!(
            doc.functions[0].node.doc.as_ref().unwrap().node,
            "\n    Dear {{ name }}\n    "
        );
    }

    #[test]
    fn test_parse_empty_body() {
        let doc = parse("fn nodoc(x) { }").expect("Should parse");
        assert!(doc.functions[0].node.doc.is_none());
    }

    #[test]
    fn test_parse_no_parameters() {
        let doc = parse(r#"fn g() { "{{ name }}" }"#).expect("Should parse");
        assert!(doc.functions[0].node.parameters.is_empty());
    }

    #[test]
    fn test_parse_literals() {
        let doc = parse(r#"fn f(a = "s", b = 1.5, c = true, d = none, e = [1, [2, "x"]],) { "" }"#)
            .expect("Should parse");
        let defaults: Vec<_> = doc.functions[0]
            .node
            .parameters
            .iter()
            .map(|p| p.node.default.as_ref().unwrap().node.clone())
            .collect();
        assert_eq!(
            defaults,
            vec![
                DefaultExpr::Literal(Literal::String("s".to_string())),
                DefaultExpr::Literal(Literal::Float(1.5)),
                DefaultExpr::Literal(Literal::Bool(true)),
                DefaultExpr::Literal(Literal::None),
                DefaultExpr::Literal(Literal::List(vec![
                    Literal::Integer(1),
                    Literal::List(vec![Literal::Integer(2), Literal::String("x".to_string())]),
                ])),
            ]
        );
    }

    #[test]
    fn test_parse_field_defaults() {
        let doc = parse(
            r#"fn f(a = field(default = 10, init = false), b = field(default_factory = "range(3)|list")) { "" }"#,
        )
        .expect("Should parse");
        let params = &doc.functions[0].node.parameters;

        match &params[0].node.default.as_ref().unwrap().node {
            DefaultExpr::Field(args) => {
                assert_eq!(args.len(), 2);
                assert_eq!(args[0].key.node.as_str(), "default");
                assert_eq!(args[0].value.node, Literal::Integer(10));
                assert_eq!(args[1].key.node.as_str(), "init");
                assert_eq!(args[1].value.node, Literal::Bool(false));
            }
            other => panic!("Expected field, got {:?}", other),
        }
        match &params[1].node.default.as_ref().unwrap().node {
            DefaultExpr::Field(args) => {
                assert_eq!(
                    args[0].value.node,
                    Literal::String("range(3)|list".to_string())
                );
            }
            other => panic!("Expected field, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_field() {
        let doc = parse(r#"fn f(a = field()) { "" }"#).expect("Should parse");
        assert_eq!(
            doc.functions[0].node.parameters[0].node.default.as_ref().unwrap().node,
            DefaultExpr::Field(vec![])
        );
    }

    #[test]
    fn test_parse_multiple_functions() {
        let doc = parse(
            r#"
            // first
            fn a() { "A" }
            /* second */
            fn b(x) { "{{ x }}" }
            "#,
        )
        .expect("Should parse");
        assert_eq!(doc.functions.len(), 2);
    }

    #[test]
    fn test_parse_error_missing_paren() {
        assert!(parse(r#"fn a( { "A" }"#).is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_characters() {
        let source = r#"fn f(a, @b $) { "{{ a }}{{ b }}" }"#;
        let errors = parse(source).unwrap_err();
        assert_eq!(errors.len(), 2);
        match &errors[0] {
            crate::ParseError::Syntax { span, message, .. } => {
                assert_eq!(&source[span.clone()], "@");
                assert!(message.contains('@'));
            }
        }
    }

    #[test]
    fn test_parse_rejects_oversized_integer() {
        let result = parse(r#"fn f(a = 99999999999999999999) { "{{ a }}" }"#);
        assert!(result.is_err());
    }
}
