//! Logos-based lexer for DOMLR.
//!
//! A thin iterator wrapping a `logos`-generated token enum, carrying byte
//! offsets via `text_size::TextSize`.

use logos::Logos;
use text_size::TextSize;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"([ \t\r\n]+|//[^\n]*)")]
pub enum TokenKind {
    #[token("forall")]
    Forall,
    #[token("exists")]
    Exists,
    #[token("not")]
    Not,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("implies")]
    Implies,
    #[token("iff")]
    Iff,
    #[token("is")]
    Is,
    #[token("has")]
    Has,
    #[token("error")]
    Error,
    #[token("check")]
    Check,
    #[token("consistency")]
    Consistency,
    #[token("ignore")]
    Ignore,
    #[token("builtin")]
    Builtin,
    #[token("skip")]
    Skip,
    #[token("csp")]
    Csp,
    #[token("!True")]
    True,
    #[token("!False")]
    False,

    #[regex(r"-?[0-9]+", priority = 3)]
    IntLit,
    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLit,
    /// Lowercase element variable, OR a dotted/underscore-mangled
    /// class/attribute/association reference (`Pkg.Class`, `Pkg_Class`,
    /// `Pkg.Class::field`, `Pkg.Class.field`). Disambiguated by the
    /// parser/resolver, not the lexer.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*((::|\.)[A-Za-z_][A-Za-z0-9_]*)*")]
    Ident,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(".")]
    Dot,
    #[token("-")]
    Minus,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token(">=")]
    Ge,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token("<")]
    Lt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: TextSize,
}

pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { inner: TokenKind::lexer(input), offset: 0 }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, TextSize>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;
        match next {
            Ok(kind) => Some(Ok(Token { kind, text, offset })),
            Err(()) => Some(Err(offset)),
        }
    }
}

/// Tokenize an entire source, returning the lexical error offset (byte
/// position of the first unrecognized character) if any.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, TextSize> {
    let mut tokens = Vec::new();
    for tok in Lexer::new(input) {
        match tok {
            Ok(t) => tokens.push(t),
            Err(offset) => return Err(offset),
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_a_quantified_requirement() {
        let src = r#"forall v. v is infrastructure.VirtualMachine implies v has infrastructure.ComputingNode::cpu_count >= 2"#;
        let tokens = tokenize(src).expect("lexes cleanly");
        assert_eq!(tokens.first().unwrap().kind, TokenKind::Forall);
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Ge));
    }

    #[test]
    fn tokenizes_boolean_literals() {
        let tokens = tokenize("!True !False").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::True);
        assert_eq!(tokens[1].kind, TokenKind::False);
    }

    #[test]
    fn reports_offset_of_unrecognized_character() {
        let err = tokenize("forall v. v is @bad").unwrap_err();
        assert_eq!(u32::from(err), 16);
    }
}
