//! Lexer for template function declaration files using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Keywords
    #[token("fn")]
    Fn,
    #[token("field")]
    Field,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("none")]
    Null,

    // Delimiters
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(",")]
    Comma,
    #[token("=")]
    Equals,

    // Literals - identifiers must come after keywords
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    /// Triple-quoted string, taken verbatim
    #[regex(r#""""([^"]|"[^"]|""[^"])*""""#, |lex| {
        let s = lex.slice();
        s[3..s.len()-3].to_string()
    })]
    DocString(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape(&s[1..s.len()-1])
    })]
    String(String),

    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),

    #[regex(r"-?[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    // Comments (skip)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/", logos::skip)]
    BlockComment,
}

/// Resolve backslash escapes in a quoted string
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Lex input string into tokens with spans
///
/// Input that forms no token, such as a stray character or an integer
/// literal that does not fit in 64 bits, is yielded as `Err` with its span.
pub fn lex(input: &str) -> impl Iterator<Item = Result<(Token, Span), Span>> + '_ {
    Token::lexer(input).spanned().map(|(tok, span)| match tok {
        Ok(tok) => Ok((tok, span)),
        Err(()) => Err(span),
    })
}
