//! Statement execution, including the block-level hoisting pass that lets
//! functions and classes be referenced before their textual declaration
//! within the same block, so mutually recursive functions can call each
//! other regardless of declaration order.

use std::rc::Rc;

use super::{EvalCtx, ReturnCtx, MAX_LOOP_ITERATIONS};
use crate::ast::{AssignTarget, Block, DeclKind, Expr, MatchArm, MatchPattern, Stmt};
use crate::diagnostics::{CResult, Diagnostic, SourceLoc};
use crate::scope::Symbol;
use crate::value::Value;

/// Executes a block: first hoists every `fn`/`class` declaration directly
/// in this block (idempotent across repeated entries, e.g. a loop body),
/// then executes the remaining statements in order.
pub fn exec_block(ctx: &mut EvalCtx, stmts: &Block, rc: &mut ReturnCtx) -> CResult<()> {
    for stmt in stmts {
        match stmt {
            Stmt::FnDecl(f) => {
                if !ctx.functions.contains_key(&f.name) {
                    ctx.functions.insert(f.name, Rc::clone(f));
                }
            }
            Stmt::ClassDecl(c) => {
                if ctx.classes.get(c.name).is_none() {
                    ctx.classes.register(c, ctx.interner)?;
                }
            }
            _ => {}
        }
    }

    for stmt in stmts {
        if matches!(stmt, Stmt::FnDecl(_) | Stmt::ClassDecl(_)) {
            continue;
        }
        exec_stmt(ctx, stmt, rc)?;
        if rc.is_unwinding() {
            break;
        }
    }
    Ok(())
}

pub(crate) fn pop_scope_with_warnings(ctx: &mut EvalCtx) {
    for sym in ctx.scopes.pop() {
        let name = ctx.interner.resolve(sym.name).to_owned();
        ctx.sink.report(ctx.files.attach(Diagnostic::warning(sym.loc, format!("'{name}' is never mutated"))));
    }
}

fn exec_stmt(ctx: &mut EvalCtx, stmt: &Stmt, rc: &mut ReturnCtx) -> CResult<()> {
    match stmt {
        Stmt::VarDecl { kind, name, ty, value, loc, .. } => {
            let v = ctx.eval_expr(value)?;
            if let Some(ty) = ty {
                if !ctx.value_matches_type(&v, *ty) {
                    return Err(ctx.fatal(*loc, format!("'{}' does not match its declared type, found {}", ctx.interner.resolve(*name), v.type_name())));
                }
            }
            let is_const = *kind == DeclKind::Const;
            let sym = Symbol { name: *name, value: v, is_const, mutated: false, loc: *loc };
            if !ctx.scopes.declare(sym) {
                return Err(ctx.fatal(*loc, format!("'{}' is already declared in this scope", ctx.interner.resolve(*name))));
            }
            Ok(())
        }
        Stmt::Assign { target, value, loc } => exec_assign(ctx, target, value, *loc),
        Stmt::Print { value, newline, .. } => {
            let v = ctx.eval_expr(value)?;
            let mut bytes = v.stringify(ctx.interner, &ctx.arena).into_bytes();
            if *newline {
                bytes.push(b'\n');
            }
            ctx.prints.push(bytes);
            Ok(())
        }
        Stmt::If { branches, else_branch, loc } => exec_if(ctx, branches, else_branch, *loc, rc),
        Stmt::For { init, cond, update, body, loc } => exec_for(ctx, init.as_deref(), cond, update.as_deref(), body, *loc, rc),
        Stmt::Match { scrutinee, arms, loc } => exec_match(ctx, scrutinee, arms, *loc, rc),
        Stmt::Return { value, .. } => {
            rc.value = Some(match value {
                Some(e) => ctx.eval_expr(e)?,
                None => Value::Void,
            });
            rc.has_return = true;
            Ok(())
        }
        Stmt::Break { .. } => {
            rc.has_break = true;
            Ok(())
        }
        Stmt::Continue { .. } => {
            rc.has_continue = true;
            Ok(())
        }
        Stmt::Import { names, path, loc } => ctx.resolve_import(names, path, *loc),
        Stmt::Expr { expr, .. } => {
            ctx.eval_expr(expr)?;
            Ok(())
        }
        Stmt::Block(block) => {
            ctx.scopes.push();
            let result = exec_block(ctx, block, rc);
            pop_scope_with_warnings(ctx);
            result
        }
        Stmt::FnDecl(_) | Stmt::ClassDecl(_) => Ok(()),
    }
}

fn exec_assign(ctx: &mut EvalCtx, target: &AssignTarget, value: &Expr, loc: SourceLoc) -> CResult<()> {
    let v = ctx.eval_expr(value)?;
    match target {
        AssignTarget::Name(name, name_loc) => {
            let Some(sym) = ctx.scopes.lookup_mut(*name) else {
                return Err(ctx.fatal(*name_loc, format!("undefined variable '{}'", ctx.interner.resolve(*name))));
            };
            if sym.is_const {
                return Err(ctx.fatal(*name_loc, format!("cannot assign to const '{}'", ctx.interner.resolve(*name))));
            }
            sym.value = v;
            sym.mutated = true;
            Ok(())
        }
        AssignTarget::Field { object, object_loc, field, field_loc } => {
            let Some(sym) = ctx.scopes.lookup(*object) else {
                return Err(ctx.fatal(*object_loc, format!("undefined variable '{}'", ctx.interner.resolve(*object))));
            };
            let Value::Object(id) = sym.value else {
                return Err(ctx.fatal(*object_loc, "field assignment requires an object"));
            };
            if !ctx.arena.get_mut(id).set(*field, v) {
                return Err(ctx.fatal(*field_loc, format!("unknown field '{}'", ctx.interner.resolve(*field))));
            }
            Ok(())
        }
    }
}

fn exec_if(
    ctx: &mut EvalCtx,
    branches: &[(Expr, Block)],
    else_branch: &Option<Block>,
    loc: SourceLoc,
    rc: &mut ReturnCtx,
) -> CResult<()> {
    for (cond, body) in branches {
        match ctx.eval_expr(cond)? {
            Value::Bool(true) => {
                ctx.scopes.push();
                let result = exec_block(ctx, body, rc);
                pop_scope_with_warnings(ctx);
                return result;
            }
            Value::Bool(false) => continue,
            v => return Err(ctx.fatal(loc, format!("if condition must be bool, found {}", v.type_name()))),
        }
    }
    if let Some(body) = else_branch {
        ctx.scopes.push();
        let result = exec_block(ctx, body, rc);
        pop_scope_with_warnings(ctx);
        return result;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn exec_for(
    ctx: &mut EvalCtx,
    init: Option<&Stmt>,
    cond: &Option<Expr>,
    update: Option<&Stmt>,
    body: &Block,
    loc: SourceLoc,
    rc: &mut ReturnCtx,
) -> CResult<()> {
    ctx.scopes.push();
    let result = (|| -> CResult<()> {
        if let Some(s) = init {
            exec_stmt(ctx, s, rc)?;
        }
        let mut iterations: u64 = 0;
        loop {
            if let Some(c) = cond {
                match ctx.eval_expr(c)? {
                    Value::Bool(true) => {}
                    Value::Bool(false) => break,
                    v => return Err(ctx.fatal(loc, format!("loop condition must be bool, found {}", v.type_name()))),
                }
            }
            iterations += 1;
            if iterations > MAX_LOOP_ITERATIONS {
                return Err(ctx.fatal(loc, format!("loop exceeded {MAX_LOOP_ITERATIONS} iterations")));
            }

            ctx.scopes.push();
            let body_result = exec_block(ctx, body, rc);
            pop_scope_with_warnings(ctx);
            body_result?;

            if rc.has_return {
                break;
            }
            if rc.has_break {
                rc.consume_loop_signal();
                break;
            }
            if rc.has_continue {
                rc.consume_loop_signal();
            }
            if let Some(u) = update {
                exec_stmt(ctx, u, rc)?;
            }
        }
        Ok(())
    })();
    pop_scope_with_warnings(ctx);
    result
}

fn exec_match(ctx: &mut EvalCtx, scrutinee: &Expr, arms: &[MatchArm], loc: SourceLoc, rc: &mut ReturnCtx) -> CResult<()> {
    let scrutinee_value = ctx.eval_expr(scrutinee)?;
    for arm in arms {
        let matched = match &arm.pattern {
            MatchPattern::Wildcard => true,
            MatchPattern::Expr(e) => {
                let pattern_value = ctx.eval_expr(e)?;
                ctx.values_equal(&scrutinee_value, &pattern_value, loc)?
            }
        };
        if matched {
            ctx.scopes.push();
            let result = exec_stmt(ctx, &arm.body, rc);
            pop_scope_with_warnings(ctx);
            return result;
        }
    }
    Ok(())
}
