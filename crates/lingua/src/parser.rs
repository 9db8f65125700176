//! Recursive-descent parser: tokens -> typed [`ast::Module`].
//!
//! One-token lookahead throughout. Every AST node built here carries the
//! [`SourceLoc`] of the token that introduced it, so later stages can point
//! diagnostics back at the exact source position.

use crate::ast::*;
use crate::diagnostics::{CResult, Diagnostic, SourceLoc};
use crate::intern::{Interner, StringId};
use crate::lexer::{Keyword, Token, TokenKind};

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    interner: &'a Interner,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, interner: &'a Interner) -> Self {
        Self { tokens, pos: 0, interner }
    }

    pub fn parse_module(mut self) -> CResult<Module> {
        let mut stmts = Vec::new();
        while !self.at_eof() {
            stmts.push(self.parse_stmt()?);
        }
        Ok(Module { stmts })
    }

    // --- token plumbing -------------------------------------------------

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn loc(&self) -> SourceLoc {
        self.tokens[self.pos].loc
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> CResult<SourceLoc> {
        let loc = self.loc();
        if self.eat(kind) {
            Ok(loc)
        } else {
            Err(Diagnostic::error(loc, format!("expected {what}, found {:?}", self.peek())))
        }
    }

    fn expect_kw(&mut self, kw: Keyword, what: &str) -> CResult<SourceLoc> {
        self.expect(&TokenKind::Keyword(kw), what)
    }

    fn expect_ident(&mut self, what: &str) -> CResult<(StringId, SourceLoc)> {
        let loc = self.loc();
        match self.peek().clone() {
            TokenKind::Ident(id) => {
                self.bump();
                Ok((id, loc))
            }
            other => Err(Diagnostic::error(loc, format!("expected {what}, found {other:?}"))),
        }
    }

    fn check_kw(&self, kw: Keyword) -> bool {
        self.check(&TokenKind::Keyword(kw))
    }

    fn eat_kw(&mut self, kw: Keyword) -> bool {
        self.eat(&TokenKind::Keyword(kw))
    }

    // --- statements -------------------------------------------------------

    fn parse_stmt(&mut self) -> CResult<Stmt> {
        let is_pub = self.eat_kw(Keyword::Pub);
        let loc = self.loc();

        if self.check_kw(Keyword::Let) || self.check_kw(Keyword::Const) || self.check_kw(Keyword::Var) {
            return self.parse_var_decl(is_pub, loc);
        }
        if is_pub && !self.check_kw(Keyword::Fn) && !self.check_kw(Keyword::Class) {
            return Err(Diagnostic::error(loc, "'pub' may only prefix a declaration"));
        }
        if self.check_kw(Keyword::Fn) {
            return Ok(Stmt::FnDecl(std::rc::Rc::new(self.parse_fn_decl(is_pub)?)));
        }
        if self.check_kw(Keyword::Class) {
            return Ok(Stmt::ClassDecl(std::rc::Rc::new(self.parse_class_decl(is_pub)?)));
        }
        if self.eat_kw(Keyword::Print) {
            return self.parse_print(loc, false);
        }
        if self.eat_kw(Keyword::Println) {
            return self.parse_print(loc, true);
        }
        if self.eat_kw(Keyword::Return) {
            let value = if self.check(&TokenKind::Semicolon) { None } else { Some(self.parse_expr()?) };
            self.expect(&TokenKind::Semicolon, "';' after return")?;
            return Ok(Stmt::Return { value, loc });
        }
        if self.eat_kw(Keyword::Break) {
            self.expect(&TokenKind::Semicolon, "';' after break")?;
            return Ok(Stmt::Break { loc });
        }
        if self.eat_kw(Keyword::Continue) {
            self.expect(&TokenKind::Semicolon, "';' after continue")?;
            return Ok(Stmt::Continue { loc });
        }
        if self.check_kw(Keyword::If) {
            return self.parse_if();
        }
        if self.check_kw(Keyword::For) {
            return self.parse_for();
        }
        if self.check_kw(Keyword::While) {
            return self.parse_while();
        }
        if self.check_kw(Keyword::Match) {
            return self.parse_match();
        }
        if self.check_kw(Keyword::Import) {
            return self.parse_import();
        }
        if self.check(&TokenKind::LBrace) {
            return Ok(Stmt::Block(self.parse_block()?));
        }
        self.parse_assign_or_expr_stmt(loc)
    }

    fn parse_print(&mut self, loc: SourceLoc, newline: bool) -> CResult<Stmt> {
        self.expect(&TokenKind::LParen, "'(' after print")?;
        let value = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "')' closing print arguments")?;
        self.expect(&TokenKind::Semicolon, "';' after print(...)")?;
        Ok(Stmt::Print { value, newline, loc })
    }

    fn parse_var_decl(&mut self, is_pub: bool, loc: SourceLoc) -> CResult<Stmt> {
        let kind = match self.bump().kind {
            TokenKind::Keyword(Keyword::Let) => DeclKind::Let,
            TokenKind::Keyword(Keyword::Const) => DeclKind::Const,
            TokenKind::Keyword(Keyword::Var) => DeclKind::Var,
            _ => unreachable!("guarded by caller"),
        };
        let (name, _) = self.expect_ident("a variable name")?;
        let ty = if self.eat(&TokenKind::Colon) { Some(self.parse_type()?) } else { None };
        self.expect(&TokenKind::Equals, "'=' in declaration")?;
        let value = self.parse_expr()?;
        self.expect(&TokenKind::Semicolon, "';' after declaration")?;
        Ok(Stmt::VarDecl { kind, name, ty, value, is_pub, loc })
    }

    fn parse_assign_or_expr_stmt(&mut self, loc: SourceLoc) -> CResult<Stmt> {
        let expr = self.parse_expr()?;
        if self.eat(&TokenKind::Equals) {
            let target = match expr {
                Expr::Var(name, name_loc) => AssignTarget::Name(name, name_loc),
                Expr::Member { target, field, loc: field_loc } => match *target {
                    Expr::Var(object, object_loc) => {
                        AssignTarget::Field { object, object_loc, field, field_loc }
                    }
                    _ => return Err(Diagnostic::error(loc, "assignment target must be a name or obj.field")),
                },
                _ => return Err(Diagnostic::error(loc, "invalid assignment target")),
            };
            let value = self.parse_expr()?;
            self.expect(&TokenKind::Semicolon, "';' after assignment")?;
            return Ok(Stmt::Assign { target, value, loc });
        }
        self.expect(&TokenKind::Semicolon, "';' after expression statement")?;
        match &expr {
            Expr::Call { .. } => Ok(Stmt::Expr { expr, loc }),
            _ => Err(Diagnostic::error(loc, "only calls are valid as standalone expression statements")),
        }
    }

    fn parse_if(&mut self) -> CResult<Stmt> {
        let loc = self.expect_kw(Keyword::If, "'if'")?;
        let mut branches = Vec::new();
        loop {
            self.expect(&TokenKind::LParen, "'(' after if")?;
            let cond = self.parse_expr()?;
            self.expect(&TokenKind::RParen, "')' closing if condition")?;
            let body = self.parse_block()?;
            branches.push((cond, body));
            if self.eat_kw(Keyword::Else) {
                if self.eat_kw(Keyword::If) {
                    continue;
                }
                let else_branch = self.parse_block()?;
                return Ok(Stmt::If { branches, else_branch: Some(else_branch), loc });
            }
            return Ok(Stmt::If { branches, else_branch: None, loc });
        }
    }

    fn parse_for(&mut self) -> CResult<Stmt> {
        let loc = self.expect_kw(Keyword::For, "'for'")?;
        self.expect(&TokenKind::LParen, "'(' after for")?;
        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_for_clause_stmt()?))
        };
        self.expect(&TokenKind::Semicolon, "';' after for-init")?;
        let cond = if self.check(&TokenKind::Semicolon) { None } else { Some(self.parse_expr()?) };
        self.expect(&TokenKind::Semicolon, "';' after for-condition")?;
        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_for_clause_stmt()?))
        };
        self.expect(&TokenKind::RParen, "')' closing for header")?;
        let body = self.parse_block()?;
        Ok(Stmt::For { init, cond, update, body, loc })
    }

    /// Parses a bare init/update clause of a `for` header: a var decl or an
    /// assignment, without the trailing `;` that `parse_var_decl`/
    /// `parse_assign_or_expr_stmt` would otherwise consume.
    fn parse_for_clause_stmt(&mut self) -> CResult<Stmt> {
        let loc = self.loc();
        if self.check_kw(Keyword::Let) || self.check_kw(Keyword::Const) || self.check_kw(Keyword::Var) {
            let kind = match self.bump().kind {
                TokenKind::Keyword(Keyword::Let) => DeclKind::Let,
                TokenKind::Keyword(Keyword::Const) => DeclKind::Const,
                TokenKind::Keyword(Keyword::Var) => DeclKind::Var,
                _ => unreachable!(),
            };
            let (name, _) = self.expect_ident("a variable name")?;
            let ty = if self.eat(&TokenKind::Colon) { Some(self.parse_type()?) } else { None };
            self.expect(&TokenKind::Equals, "'=' in declaration")?;
            let value = self.parse_expr()?;
            return Ok(Stmt::VarDecl { kind, name, ty, value, is_pub: false, loc });
        }
        let (name, name_loc) = self.expect_ident("an assignment target")?;
        self.expect(&TokenKind::Equals, "'=' in for-header assignment")?;
        let value = self.parse_expr()?;
        Ok(Stmt::Assign { target: AssignTarget::Name(name, name_loc), value, loc })
    }

    fn parse_while(&mut self) -> CResult<Stmt> {
        let loc = self.expect_kw(Keyword::While, "'while'")?;
        self.expect(&TokenKind::LParen, "'(' after while")?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "')' closing while condition")?;
        let body = self.parse_block()?;
        // `while (cond) { body }` lowers to a for-loop with no init/update.
        Ok(Stmt::For { init: None, cond: Some(cond), update: None, body, loc })
    }

    fn parse_match(&mut self) -> CResult<Stmt> {
        let loc = self.expect_kw(Keyword::Match, "'match'")?;
        let scrutinee = self.parse_expr()?;
        self.expect(&TokenKind::LBrace, "'{' opening match body")?;
        let mut arms = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let arm_loc = self.loc();
            let pattern = if self.eat(&TokenKind::Underscore) {
                MatchPattern::Wildcard
            } else {
                MatchPattern::Expr(self.parse_expr()?)
            };
            self.expect(&TokenKind::Arrow, "'=>' in match arm")?;
            let body = self.parse_stmt()?;
            arms.push(MatchArm { pattern, body, loc: arm_loc });
            self.eat(&TokenKind::Comma);
        }
        self.expect(&TokenKind::RBrace, "'}' closing match body")?;
        Ok(Stmt::Match { scrutinee, arms, loc })
    }

    fn parse_import(&mut self) -> CResult<Stmt> {
        let loc = self.expect_kw(Keyword::Import, "'import'")?;
        self.expect(&TokenKind::LBrace, "'{' after import")?;
        let mut names = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            names.push(self.expect_ident("an imported name")?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace, "'}' closing import list")?;
        self.expect_kw(Keyword::From, "'from'")?;
        let path_id = match self.peek().clone() {
            TokenKind::Str(id) => {
                self.bump();
                id
            }
            other => return Err(Diagnostic::error(self.loc(), format!("expected import path string, found {other:?}"))),
        };
        self.expect(&TokenKind::Semicolon, "';' after import")?;
        Ok(Stmt::Import { names, path: self.interner.resolve(path_id).to_owned(), loc })
    }

    fn parse_block(&mut self) -> CResult<Block> {
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(stmts)
    }

    fn parse_type(&mut self) -> CResult<TypeExpr> {
        let (name, _) = self.expect_ident("a type name")?;
        Ok(match self.interner.resolve(name) {
            "int" => TypeExpr::Int,
            "float" => TypeExpr::Float,
            "string" => TypeExpr::String,
            "bool" => TypeExpr::Bool,
            _ => TypeExpr::Class(name),
        })
    }

    fn parse_fn_decl(&mut self, is_pub: bool) -> CResult<FnDecl> {
        let loc = self.expect_kw(Keyword::Fn, "'fn'")?;
        let (name, _) = self.expect_ident("a function name")?;
        self.expect(&TokenKind::LParen, "'(' after function name")?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let (pname, ploc) = self.expect_ident("a parameter name")?;
            let ty = if self.eat(&TokenKind::Colon) { Some(self.parse_type()?) } else { None };
            let default = if self.eat(&TokenKind::Equals) { Some(self.parse_literal_expr()?) } else { None };
            params.push(Param { name: pname, ty, default, loc: ploc });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')' closing parameter list")?;
        let ret = if self.eat(&TokenKind::Arrow) { Some(self.parse_type()?) } else { None };
        let body = self.parse_block()?;
        Ok(FnDecl { name, params, ret, body, is_pub, loc })
    }

    /// Parses a default-value expression. Restricted to literals — a
    /// parameter's default may not reference other bindings.
    fn parse_literal_expr(&mut self) -> CResult<Expr> {
        let loc = self.loc();
        match self.peek().clone() {
            TokenKind::Int(v) => { self.bump(); Ok(Expr::Int(v)) }
            TokenKind::Float(v) => { self.bump(); Ok(Expr::Float(v)) }
            TokenKind::Str(id) => { self.bump(); Ok(Expr::Str(id)) }
            TokenKind::Keyword(Keyword::True) => { self.bump(); Ok(Expr::Bool(true)) }
            TokenKind::Keyword(Keyword::False) => { self.bump(); Ok(Expr::Bool(false)) }
            TokenKind::Minus => {
                self.bump();
                match self.bump().kind {
                    TokenKind::Int(v) => Ok(Expr::Int(-v)),
                    TokenKind::Float(v) => Ok(Expr::Float(-v)),
                    other => Err(Diagnostic::error(loc, format!("expected numeric literal after '-', found {other:?}"))),
                }
            }
            other => Err(Diagnostic::error(loc, format!("default value must be a literal, found {other:?}"))),
        }
    }

    fn parse_class_decl(&mut self, is_pub: bool) -> CResult<ClassDecl> {
        let loc = self.expect_kw(Keyword::Class, "'class'")?;
        let (name, _) = self.expect_ident("a class name")?;
        let parent = if self.eat(&TokenKind::Colon) { Some(self.expect_ident("a parent class name")?.0) } else { None };
        self.expect(&TokenKind::LBrace, "'{' opening class body")?;
        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.check_kw(Keyword::Fn) {
                methods.push(std::rc::Rc::new(self.parse_fn_decl(false)?));
            } else {
                let floc = self.loc();
                let (fname, _) = self.expect_ident("a field name")?;
                self.expect(&TokenKind::Colon, "':' in field declaration")?;
                let ty = self.parse_type()?;
                // The `;` between fields is a separator, not a terminator —
                // the last field in a class body may omit it before `}`.
                self.eat(&TokenKind::Semicolon);
                fields.push(Field { name: fname, ty, loc: floc });
            }
        }
        self.expect(&TokenKind::RBrace, "'}' closing class body")?;
        Ok(ClassDecl { name, parent, fields, methods, is_pub, loc })
    }

    // --- expressions, precedence low to high -----------------------------

    fn parse_expr(&mut self) -> CResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> CResult<Expr> {
        self.parse_binop_chain(Self::parse_and, &[(&TokenKind::OrOr, BinOp::Or)])
    }

    fn parse_and(&mut self) -> CResult<Expr> {
        self.parse_binop_chain(Self::parse_bit_or, &[(&TokenKind::AndAnd, BinOp::And)])
    }

    fn parse_bit_or(&mut self) -> CResult<Expr> {
        self.parse_binop_chain(Self::parse_bit_xor, &[(&TokenKind::Pipe, BinOp::BitOr)])
    }

    fn parse_bit_xor(&mut self) -> CResult<Expr> {
        self.parse_binop_chain(Self::parse_bit_and, &[(&TokenKind::Caret, BinOp::BitXor)])
    }

    fn parse_bit_and(&mut self) -> CResult<Expr> {
        self.parse_binop_chain(Self::parse_equality, &[(&TokenKind::Amp, BinOp::BitAnd)])
    }

    fn parse_equality(&mut self) -> CResult<Expr> {
        self.parse_binop_chain(Self::parse_relational, &[(&TokenKind::EqEq, BinOp::Eq), (&TokenKind::NotEq, BinOp::Ne)])
    }

    fn parse_relational(&mut self) -> CResult<Expr> {
        self.parse_binop_chain(
            Self::parse_shift,
            &[
                (&TokenKind::LtEq, BinOp::Le),
                (&TokenKind::GtEq, BinOp::Ge),
                (&TokenKind::Lt, BinOp::Lt),
                (&TokenKind::Gt, BinOp::Gt),
            ],
        )
    }

    fn parse_shift(&mut self) -> CResult<Expr> {
        self.parse_binop_chain(Self::parse_additive, &[(&TokenKind::Shl, BinOp::Shl), (&TokenKind::Shr, BinOp::Shr)])
    }

    fn parse_additive(&mut self) -> CResult<Expr> {
        self.parse_binop_chain(Self::parse_multiplicative, &[(&TokenKind::Plus, BinOp::Add), (&TokenKind::Minus, BinOp::Sub)])
    }

    fn parse_multiplicative(&mut self) -> CResult<Expr> {
        self.parse_binop_chain(
            Self::parse_unary,
            &[(&TokenKind::Star, BinOp::Mul), (&TokenKind::Slash, BinOp::Div), (&TokenKind::Percent, BinOp::Mod)],
        )
    }

    fn parse_binop_chain(&mut self, mut next: impl FnMut(&mut Self) -> CResult<Expr>, ops: &[(&TokenKind, BinOp)]) -> CResult<Expr> {
        let mut lhs = next(self)?;
        loop {
            let matched = ops.iter().find(|(tok, _)| self.check(tok));
            let Some((tok, op)) = matched else { break };
            let loc = self.loc();
            let tok = (*tok).clone();
            self.eat(&tok);
            let rhs = next(self)?;
            lhs = Expr::Binary { op: *op, lhs: Box::new(lhs), rhs: Box::new(rhs), loc };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> CResult<Expr> {
        let loc = self.loc();
        if self.eat(&TokenKind::Minus) {
            return Ok(Expr::Unary { op: UnOp::Neg, expr: Box::new(self.parse_unary()?), loc });
        }
        if self.eat(&TokenKind::Tilde) {
            return Ok(Expr::Unary { op: UnOp::BitNot, expr: Box::new(self.parse_unary()?), loc });
        }
        if self.eat(&TokenKind::Bang) {
            return Ok(Expr::Unary { op: UnOp::Not, expr: Box::new(self.parse_unary()?), loc });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> CResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            let loc = self.loc();
            if self.eat(&TokenKind::Dot) {
                let (name, name_loc) = self.expect_ident("a field or method name")?;
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_args()?;
                    expr = Expr::Call {
                        callee: Callee::Method { receiver: Box::new(expr), method: name, method_loc: name_loc },
                        args,
                        loc,
                    };
                } else {
                    expr = Expr::Member { target: Box::new(expr), field: name, loc };
                }
                continue;
            }
            if self.eat(&TokenKind::LBracket) {
                if self.eat(&TokenKind::Colon) {
                    let end = if self.check(&TokenKind::RBracket) { None } else { Some(Box::new(self.parse_expr()?)) };
                    self.expect(&TokenKind::RBracket, "']' closing slice")?;
                    expr = Expr::Slice { target: Box::new(expr), start: None, end, loc };
                    continue;
                }
                let first = self.parse_expr()?;
                if self.eat(&TokenKind::Colon) {
                    let end = if self.check(&TokenKind::RBracket) { None } else { Some(Box::new(self.parse_expr()?)) };
                    self.expect(&TokenKind::RBracket, "']' closing slice")?;
                    expr = Expr::Slice { target: Box::new(expr), start: Some(Box::new(first)), end, loc };
                } else {
                    self.expect(&TokenKind::RBracket, "']' closing index")?;
                    expr = Expr::Index { target: Box::new(expr), index: Box::new(first), loc };
                }
                continue;
            }
            break;
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> CResult<Expr> {
        let loc = self.loc();
        match self.peek().clone() {
            TokenKind::Int(v) => { self.bump(); Ok(Expr::Int(v)) }
            TokenKind::Float(v) => { self.bump(); Ok(Expr::Float(v)) }
            TokenKind::Str(id) => { self.bump(); Ok(Expr::Str(id)) }
            TokenKind::Keyword(Keyword::True) => { self.bump(); Ok(Expr::Bool(true)) }
            TokenKind::Keyword(Keyword::False) => { self.bump(); Ok(Expr::Bool(false)) }
            TokenKind::Keyword(Keyword::New) => self.parse_new(),
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "')' closing parenthesized expression")?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                self.bump();
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_args()?;
                    Ok(Expr::Call { callee: Callee::Name(name), args, loc })
                } else {
                    Ok(Expr::Var(name, loc))
                }
            }
            other => Err(Diagnostic::error(loc, format!("unexpected token in expression: {other:?}"))),
        }
    }

    fn parse_new(&mut self) -> CResult<Expr> {
        let loc = self.expect_kw(Keyword::New, "'new'")?;
        let (class, _) = self.expect_ident("a class name")?;
        let args = self.parse_args()?;
        Ok(Expr::New { class, args, loc })
    }

    /// Parses a parenthesized argument list, enforcing that positional
    /// arguments precede named ones.
    fn parse_args(&mut self) -> CResult<Args> {
        self.expect(&TokenKind::LParen, "'(' opening argument list")?;
        let mut args = Args::default();
        let mut seen_named = false;
        while !self.check(&TokenKind::RParen) {
            if self.is_named_arg_start() {
                let (name, name_loc) = self.expect_ident("an argument name")?;
                self.expect(&TokenKind::Equals, "'=' in named argument")?;
                let value = self.parse_expr()?;
                args.named.push((name, name_loc, value));
                seen_named = true;
            } else {
                if seen_named {
                    return Err(Diagnostic::error(self.loc(), "positional arguments must precede named arguments"));
                }
                args.positional.push(self.parse_expr()?);
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')' closing argument list")?;
        Ok(args)
    }

    fn is_named_arg_start(&self) -> bool {
        matches!(self.peek(), TokenKind::Ident(_)) && matches!(self.tokens[self.pos + 1].kind, TokenKind::Equals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(src: &str) -> (Module, Interner) {
        let mut interner = Interner::new();
        let tokens = Lexer::new(src).tokenize(&mut interner).unwrap();
        let module = Parser::new(tokens, &interner).parse_module().unwrap();
        (module, interner)
    }

    #[test]
    fn parses_print_statement() {
        let (m, _) = parse(r#"print("hi");"#);
        assert!(matches!(m.stmts[0], Stmt::Print { newline: false, .. }));
    }

    #[test]
    fn parses_println_statement() {
        let (m, _) = parse(r#"println("hi");"#);
        assert!(matches!(m.stmts[0], Stmt::Print { newline: true, .. }));
    }

    #[test]
    fn parses_const_decl_with_type() {
        let (m, _) = parse("const x: int = 21;");
        match &m.stmts[0] {
            Stmt::VarDecl { kind: DeclKind::Const, ty: Some(TypeExpr::Int), .. } => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_function_with_default_and_named_call() {
        let (m, _) = parse("fn add(a: int, b: int = 1) -> int { return a + b; } print(add(b=10, a=5));");
        assert!(matches!(m.stmts[0], Stmt::FnDecl(_)));
    }

    #[test]
    fn rejects_positional_after_named() {
        let mut interner = Interner::new();
        let tokens = Lexer::new("f(a=1, 2);").tokenize(&mut interner).unwrap();
        assert!(Parser::new(tokens, &interner).parse_module().is_err());
    }

    #[test]
    fn parses_class_with_parent_and_methods() {
        let (m, _) = parse("class P { x: int } class Q : P { z: int fn sum() -> int { return x + z; } }");
        assert!(matches!(m.stmts[0], Stmt::ClassDecl(_)));
        match &m.stmts[1] {
            Stmt::ClassDecl(c) => {
                assert!(c.parent.is_some());
                assert_eq!(c.methods.len(), 1);
            }
            _ => panic!(),
        }
    }

    #[test]
    fn parses_slice_and_index() {
        let (m, _) = parse(r#"print(s[0:2]); print(s[-1]);"#);
        assert!(matches!(m.stmts[0], Stmt::Print { .. }));
    }

    #[test]
    fn parses_while_as_for_loop() {
        let (m, _) = parse("while (x < 3) { x = x + 1; }");
        assert!(matches!(m.stmts[0], Stmt::For { init: None, update: None, .. }));
    }

    #[test]
    fn parses_import() {
        let (m, _) = parse(r#"import { to_upper, trim } from "std/string";"#);
        match &m.stmts[0] {
            Stmt::Import { names, path, .. } => {
                assert_eq!(names.len(), 2);
                assert_eq!(path, "std/string");
            }
            _ => panic!(),
        }
    }
}
