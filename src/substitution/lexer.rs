//! Lexer for `Fn::Sub` template strings using logos

use logos::Logos;

use crate::error::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    // `${!Name}` renders literally as `${Name}`
    #[regex(r"\$\{![^}]*\}", |lex| {
        let s = lex.slice();
        s[3..s.len() - 1].to_string()
    })]
    Literal(String),

    #[regex(r"\$\{[^}!][^}]*\}", |lex| {
        let s = lex.slice();
        s[2..s.len() - 1].to_string()
    })]
    Variable(String),

    #[token("${}")]
    Empty,

    // `${` with no closing brace before the end of input
    #[regex(r"\$\{[^}]*")]
    Unterminated,

    #[token("$")]
    Dollar,

    #[regex(r"[^$]+", |lex| lex.slice().to_string())]
    Text(String),
}

/// Lex a substitution string into tokens with spans
///
/// Every byte is covered by some token, so a lexer error is reported with
/// its span rather than skipped.
pub fn lex(input: &str) -> impl Iterator<Item = (Result<Token, ()>, Span)> + '_ {
    Token::lexer(input).spanned()
}
