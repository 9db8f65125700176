//! Typed AST produced by the parser.
//!
//! Statements and expressions are modeled as sum types, each variant
//! carrying only the fields it needs, and matched exhaustively by the
//! evaluator rather than relying on a single struct with conditionally-used
//! fields.

use std::rc::Rc;

use crate::diagnostics::SourceLoc;
use crate::intern::StringId;

/// A declared or inferred type name appearing in a `: Type` / `-> Type`
/// annotation, a field declaration, or (indirectly) a class's flattened
/// field list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeExpr {
    Int,
    Float,
    String,
    Bool,
    Class(StringId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Let,
    Const,
    Var,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    BitNot,
    Not,
}

/// Positional and named call/constructor arguments, in source order.
///
/// Positional arguments must precede named ones syntactically; the parser
/// enforces this so later stages never need to re-check it.
#[derive(Debug, Clone, Default)]
pub struct Args {
    pub positional: Vec<Expr>,
    pub named: Vec<(StringId, SourceLoc, Expr)>,
}

#[derive(Debug, Clone)]
pub enum Callee {
    /// `f(args)` — either a user function or (if imported) a stdlib builtin.
    Name(StringId),
    /// `obj.m(args)` — a method call on an object-valued receiver.
    Method { receiver: Box<Expr>, method: StringId, method_loc: SourceLoc },
}

#[derive(Debug, Clone)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Str(StringId),
    Bool(bool),
    Var(StringId, SourceLoc),
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr>, loc: SourceLoc },
    Unary { op: UnOp, expr: Box<Expr>, loc: SourceLoc },
    Index { target: Box<Expr>, index: Box<Expr>, loc: SourceLoc },
    Slice { target: Box<Expr>, start: Option<Box<Expr>>, end: Option<Box<Expr>>, loc: SourceLoc },
    Member { target: Box<Expr>, field: StringId, loc: SourceLoc },
    Call { callee: Callee, args: Args, loc: SourceLoc },
    New { class: StringId, args: Args, loc: SourceLoc },
}

impl Expr {
    pub fn loc(&self) -> SourceLoc {
        match self {
            Self::Var(_, loc)
            | Self::Binary { loc, .. }
            | Self::Unary { loc, .. }
            | Self::Index { loc, .. }
            | Self::Slice { loc, .. }
            | Self::Member { loc, .. }
            | Self::Call { loc, .. }
            | Self::New { loc, .. } => *loc,
            Self::Int(_) | Self::Float(_) | Self::Str(_) | Self::Bool(_) => SourceLoc::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: StringId,
    pub ty: Option<TypeExpr>,
    pub default: Option<Expr>,
    pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct FnDecl {
    pub name: StringId,
    pub params: Vec<Param>,
    pub ret: Option<TypeExpr>,
    pub body: Block,
    pub is_pub: bool,
    pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: StringId,
    pub ty: TypeExpr,
    pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: StringId,
    pub parent: Option<StringId>,
    pub fields: Vec<Field>,
    pub methods: Vec<Rc<FnDecl>>,
    pub is_pub: bool,
    pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub enum AssignTarget {
    Name(StringId, SourceLoc),
    Field { object: StringId, object_loc: SourceLoc, field: StringId, field_loc: SourceLoc },
}

#[derive(Debug, Clone)]
pub enum MatchPattern {
    Expr(Expr),
    Wildcard,
}

#[derive(Debug, Clone)]
pub struct MatchArm {
    pub pattern: MatchPattern,
    pub body: Stmt,
    pub loc: SourceLoc,
}

pub type Block = Vec<Stmt>;

#[derive(Debug, Clone)]
pub enum Stmt {
    VarDecl { kind: DeclKind, name: StringId, ty: Option<TypeExpr>, value: Expr, is_pub: bool, loc: SourceLoc },
    Assign { target: AssignTarget, value: Expr, loc: SourceLoc },
    Print { value: Expr, newline: bool, loc: SourceLoc },
    If { branches: Vec<(Expr, Block)>, else_branch: Option<Block>, loc: SourceLoc },
    For { init: Option<Box<Stmt>>, cond: Option<Expr>, update: Option<Box<Stmt>>, body: Block, loc: SourceLoc },
    Match { scrutinee: Expr, arms: Vec<MatchArm>, loc: SourceLoc },
    FnDecl(Rc<FnDecl>),
    ClassDecl(Rc<ClassDecl>),
    Return { value: Option<Expr>, loc: SourceLoc },
    Break { loc: SourceLoc },
    Continue { loc: SourceLoc },
    Import { names: Vec<(StringId, SourceLoc)>, path: String, loc: SourceLoc },
    Expr { expr: Expr, loc: SourceLoc },
    Block(Block),
}

impl Stmt {
    pub fn loc(&self) -> SourceLoc {
        match self {
            Self::VarDecl { loc, .. }
            | Self::Assign { loc, .. }
            | Self::Print { loc, .. }
            | Self::If { loc, .. }
            | Self::For { loc, .. }
            | Self::Match { loc, .. }
            | Self::Return { loc, .. }
            | Self::Break { loc }
            | Self::Continue { loc }
            | Self::Import { loc, .. }
            | Self::Expr { loc, .. } => *loc,
            Self::FnDecl(f) => f.loc,
            Self::ClassDecl(c) => c.loc,
            Self::Block(b) => b.first().map_or(SourceLoc::default(), Stmt::loc),
        }
    }
}

/// A parsed file: a flat top-level statement sequence. Function and class
/// declarations are ordinary `Stmt` variants within it, hoisted into scope
/// by the evaluator before the rest of the block executes (see
/// `eval::stmt::exec_block`).
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub stmts: Vec<Stmt>,
}
