//! Byte-stream lexer.
//!
//! A single-pass scanner over the source file's bytes. Skips whitespace,
//! `//` line comments and non-nesting `/* */` block comments, and produces a
//! flat token stream with source locations attached so the parser can build
//! located AST nodes without re-scanning.

use crate::diagnostics::{CResult, Diagnostic, SourceLoc};
use crate::intern::{Interner, StringId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Let,
    Const,
    Var,
    If,
    Else,
    For,
    While,
    Match,
    Fn,
    Class,
    New,
    Return,
    Break,
    Continue,
    Import,
    From,
    Pub,
    True,
    False,
    Print,
    Println,
}

impl Keyword {
    fn from_ident(s: &str) -> Option<Self> {
        Some(match s {
            "let" => Self::Let,
            "const" => Self::Const,
            "var" => Self::Var,
            "if" => Self::If,
            "else" => Self::Else,
            "for" => Self::For,
            "while" => Self::While,
            "match" => Self::Match,
            "fn" => Self::Fn,
            "class" => Self::Class,
            "new" => Self::New,
            "return" => Self::Return,
            "break" => Self::Break,
            "continue" => Self::Continue,
            "import" => Self::Import,
            "from" => Self::From,
            "pub" => Self::Pub,
            "true" => Self::True,
            "false" => Self::False,
            "print" => Self::Print,
            "println" => Self::Println,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(StringId),
    Int(i64),
    Float(f64),
    Str(StringId),
    Keyword(Keyword),

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Colon,
    Comma,
    Dot,
    DotDot,
    Equals,
    Arrow,
    Underscore,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,
    Tilde,
    Bang,

    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub loc: SourceLoc,
}

/// Single-pass scanner over the raw bytes of one source file.
pub struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { bytes: source.as_bytes(), pos: 0, line: 1, column: 1 }
    }

    /// Tokenizes the entire input, interning identifiers and string
    /// contents into `interner` as they are found.
    pub fn tokenize(mut self, interner: &mut Interner) -> CResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let loc = self.loc();
            if self.pos >= self.bytes.len() {
                tokens.push(Token { kind: TokenKind::Eof, loc });
                return Ok(tokens);
            }
            let tok = self.next_token(interner, loc)?;
            tokens.push(tok);
        }
    }

    fn loc(&self) -> SourceLoc {
        SourceLoc::new(self.line, self.column, self.pos as u32)
    }

    fn peek(&self) -> u8 {
        *self.bytes.get(self.pos).unwrap_or(&0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        *self.bytes.get(self.pos + offset).unwrap_or(&0)
    }

    fn advance(&mut self) -> u8 {
        let b = self.peek();
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        b
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == b {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_trivia(&mut self) -> CResult<()> {
        loop {
            match self.peek() {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.advance();
                }
                b'/' if self.peek_at(1) == b'/' => {
                    while self.pos < self.bytes.len() && self.peek() != b'\n' {
                        self.advance();
                    }
                }
                b'/' if self.peek_at(1) == b'*' => {
                    let start = self.loc();
                    self.advance();
                    self.advance();
                    let mut closed = false;
                    while self.pos < self.bytes.len() {
                        if self.peek() == b'*' && self.peek_at(1) == b'/' {
                            self.advance();
                            self.advance();
                            closed = true;
                            break;
                        }
                        self.advance();
                    }
                    if !closed {
                        return Err(Diagnostic::error(start, "unterminated block comment"));
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self, interner: &mut Interner, loc: SourceLoc) -> CResult<Token> {
        let b = self.peek();
        let kind = match b {
            b'(' => { self.advance(); TokenKind::LParen }
            b')' => { self.advance(); TokenKind::RParen }
            b'{' => { self.advance(); TokenKind::LBrace }
            b'}' => { self.advance(); TokenKind::RBrace }
            b'[' => { self.advance(); TokenKind::LBracket }
            b']' => { self.advance(); TokenKind::RBracket }
            b';' => { self.advance(); TokenKind::Semicolon }
            b':' => { self.advance(); TokenKind::Colon }
            b',' => { self.advance(); TokenKind::Comma }
            b'.' => {
                self.advance();
                if self.eat(b'.') { TokenKind::DotDot } else { TokenKind::Dot }
            }
            b'~' => { self.advance(); TokenKind::Tilde }
            b'^' => { self.advance(); TokenKind::Caret }
            b'+' => { self.advance(); TokenKind::Plus }
            b'-' => {
                self.advance();
                if self.eat(b'>') { TokenKind::Arrow } else { TokenKind::Minus }
            }
            b'*' => { self.advance(); TokenKind::Star }
            b'%' => { self.advance(); TokenKind::Percent }
            b'/' => { self.advance(); TokenKind::Slash }
            b'=' => {
                self.advance();
                if self.eat(b'=') { TokenKind::EqEq } else { TokenKind::Equals }
            }
            b'!' => {
                self.advance();
                if self.eat(b'=') { TokenKind::NotEq } else { TokenKind::Bang }
            }
            b'<' => {
                self.advance();
                if self.eat(b'=') {
                    TokenKind::LtEq
                } else if self.eat(b'<') {
                    TokenKind::Shl
                } else {
                    TokenKind::Lt
                }
            }
            b'>' => {
                self.advance();
                if self.eat(b'=') {
                    TokenKind::GtEq
                } else if self.eat(b'>') {
                    TokenKind::Shr
                } else {
                    TokenKind::Gt
                }
            }
            b'&' => {
                self.advance();
                if self.eat(b'&') { TokenKind::AndAnd } else { TokenKind::Amp }
            }
            b'|' => {
                self.advance();
                if self.eat(b'|') { TokenKind::OrOr } else { TokenKind::Pipe }
            }
            b'"' => return self.lex_string(interner, loc),
            b'0'..=b'9' => return self.lex_number(loc),
            b'_' if !is_ident_continue(self.peek_at(1)) => { self.advance(); TokenKind::Underscore }
            _ if is_ident_start(b) => return self.lex_ident(interner, loc),
            _ => return Err(Diagnostic::error(loc, format!("unexpected byte {b:#04x}"))),
        };
        Ok(Token { kind, loc })
    }

    fn lex_ident(&mut self, interner: &mut Interner, loc: SourceLoc) -> CResult<Token> {
        let start = self.pos;
        while is_ident_continue(self.peek()) {
            self.advance();
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).expect("ascii-validated identifier");
        let kind = match Keyword::from_ident(text) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Ident(interner.intern(text)),
        };
        Ok(Token { kind, loc })
    }

    fn lex_number(&mut self, loc: SourceLoc) -> CResult<Token> {
        let start = self.pos;
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        let mut is_float = false;
        if self.peek() == b'.' && self.peek_at(1).is_ascii_digit() {
            is_float = true;
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).expect("ascii-validated number");
        let kind = if is_float {
            TokenKind::Float(text.parse().map_err(|_| Diagnostic::error(loc, format!("invalid float literal '{text}'")))?)
        } else {
            TokenKind::Int(text.parse().map_err(|_| Diagnostic::error(loc, format!("invalid integer literal '{text}'")))?)
        };
        Ok(Token { kind, loc })
    }

    fn lex_string(&mut self, interner: &mut Interner, loc: SourceLoc) -> CResult<Token> {
        self.advance(); // opening quote
        let mut bytes = Vec::new();
        loop {
            if self.pos >= self.bytes.len() {
                return Err(Diagnostic::error(loc, "unterminated string literal"));
            }
            let b = self.advance();
            match b {
                b'"' => break,
                b'\\' => {
                    let esc_loc = self.loc();
                    let esc = self.advance();
                    bytes.push(match esc {
                        b'n' => b'\n',
                        b't' => b'\t',
                        b'r' => b'\r',
                        b'\\' => b'\\',
                        b'"' => b'"',
                        b'0' => 0,
                        other => {
                            return Err(Diagnostic::error(esc_loc, format!("unknown escape sequence '\\{}'", other as char)));
                        }
                    });
                }
                _ => bytes.push(b),
            }
        }
        let value = String::from_utf8(bytes).map_err(|_| Diagnostic::error(loc, "string literal is not valid UTF-8"))?;
        Ok(Token { kind: TokenKind::Str(interner.intern(&value)), loc })
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut interner = Interner::new();
        Lexer::new(src).tokenize(&mut interner).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_basic_punctuation_and_operators() {
        assert_eq!(
            kinds("(){};:,.=->+-*/%==!=<<=>>=&&||&|^<<>>~!"),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Semicolon,
                TokenKind::Colon,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Equals,
                TokenKind::Arrow,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Amp,
                TokenKind::Pipe,
                TokenKind::Caret,
                TokenKind::Shl,
                TokenKind::Shr,
                TokenKind::Tilde,
                TokenKind::Bang,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_keywords_and_idents_distinctly() {
        let mut interner = Interner::new();
        let toks = Lexer::new("let x fn foo").tokenize(&mut interner).unwrap();
        assert_eq!(toks[0].kind, TokenKind::Keyword(Keyword::Let));
        assert!(matches!(toks[1].kind, TokenKind::Ident(_)));
        assert_eq!(toks[2].kind, TokenKind::Keyword(Keyword::Fn));
    }

    #[test]
    fn lexes_string_escapes() {
        let mut interner = Interner::new();
        let toks = Lexer::new(r#""a\nb""#).tokenize(&mut interner).unwrap();
        match toks[0].kind {
            TokenKind::Str(id) => assert_eq!(interner.resolve(id), "a\nb"),
            _ => panic!("expected string token"),
        }
    }

    #[test]
    fn unknown_escape_is_fatal() {
        let mut interner = Interner::new();
        assert!(Lexer::new(r#""\q""#).tokenize(&mut interner).is_err());
    }

    #[test]
    fn skips_line_and_block_comments() {
        let mut interner = Interner::new();
        let toks = Lexer::new("// hi\n/* block */ 1").tokenize(&mut interner).unwrap();
        assert_eq!(toks[0].kind, TokenKind::Int(1));
    }

    #[test]
    fn float_literal_requires_fractional_digit() {
        let mut interner = Interner::new();
        let toks = Lexer::new("1.2").tokenize(&mut interner).unwrap();
        assert_eq!(toks[0].kind, TokenKind::Float(1.2));
    }
}
