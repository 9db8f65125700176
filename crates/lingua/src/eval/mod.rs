//! The compile-time tree-walking evaluator.
//!
//! [`EvalCtx`] bundles the interner, class table, function table, object
//! arena, scope stack and diagnostic sink into one explicit value threaded
//! through every entry point, rather than relying on ambient global state.
//! Statement execution (`stmt`), expression evaluation (`expr`) and
//! call/method/constructor dispatch (`call`) are split across sibling
//! modules but all act as methods on this same type.

mod call;
mod expr;
mod imports;
mod stmt;

use ahash::{AHashMap, AHashSet};

use crate::ast::{FnDecl, Module, TypeExpr};
use crate::class::ClassTable;
use crate::diagnostics::{CResult, Diagnostic, DiagnosticSink, FileContextStack, SourceLoc};
use crate::imports::ModuleCache;
use crate::intern::{Interner, StringId};
use crate::scope::ScopeStack;
use crate::value::{ObjectArena, Value};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// A call/loop-body's `return`/`break`/`continue` signal, threaded through
/// statement evaluation rather than unwound via `Result`.
#[derive(Debug, Default)]
pub struct ReturnCtx {
    pub has_return: bool,
    pub has_break: bool,
    pub has_continue: bool,
    pub value: Option<Value>,
}

impl ReturnCtx {
    pub fn is_unwinding(&self) -> bool {
        self.has_return || self.has_break || self.has_continue
    }

    /// Consumes a `break`/`continue` at the loop that catches it, leaving
    /// `return` (which must keep propagating past this loop) untouched.
    pub fn consume_loop_signal(&mut self) {
        self.has_break = false;
        self.has_continue = false;
    }
}

/// The ordered list of output byte buffers the evaluator accumulates.
/// Serialized verbatim, in order, by whichever emitter is selected.
#[derive(Debug, Default)]
pub struct PrintList {
    buffers: Vec<Vec<u8>>,
}

impl PrintList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: Vec<u8>) {
        self.buffers.push(bytes);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec<u8>> {
        self.buffers.iter()
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

/// Call-depth limit above which recursion is treated as a compile-time
/// runaway rather than a legitimate deeply-nested call.
pub const MAX_CALL_DEPTH: u32 = 1000;

/// Iteration cap for a single `for`/`while` loop, guarding against an
/// infinite compile-time loop.
pub const MAX_LOOP_ITERATIONS: u64 = 10_000;

/// Everything the evaluator needs, bundled in one value instead of ambient globals.
pub struct EvalCtx<'a> {
    pub interner: &'a mut Interner,
    pub classes: ClassTable,
    pub functions: AHashMap<StringId, Rc<FnDecl>>,
    pub arena: ObjectArena,
    pub scopes: ScopeStack,
    pub prints: PrintList,
    pub call_depth: u32,
    pub sink: &'a mut dyn DiagnosticSink,
    pub files: FileContextStack,
    pub modules: ModuleCache,
    pub stdlib_imported: AHashSet<StringId>,
}

impl<'a> EvalCtx<'a> {
    pub fn new(interner: &'a mut Interner, sink: &'a mut dyn DiagnosticSink, root_path: PathBuf) -> Self {
        Self {
            interner,
            classes: ClassTable::new(),
            functions: AHashMap::new(),
            arena: ObjectArena::new(),
            scopes: ScopeStack::new(),
            prints: PrintList::new(),
            call_depth: 0,
            sink,
            files: FileContextStack::new(root_path),
            modules: ModuleCache::new(),
            stdlib_imported: AHashSet::new(),
        }
    }

    fn fatal(&self, loc: SourceLoc, message: impl Into<String>) -> Diagnostic {
        self.files.attach(Diagnostic::error(loc, message))
    }

    /// Runs the root module: resolves its imports depth-first, then
    /// evaluates its top-level statements.
    pub fn run_root(&mut self, module: &Module) -> CResult<()> {
        self.scopes = ScopeStack::new();
        let mut rc = ReturnCtx::default();
        let result = stmt::exec_block(self, &module.stmts, &mut rc);
        stmt::pop_scope_with_warnings(self);
        result?;
        if rc.has_break || rc.has_continue {
            return Err(self.fatal(SourceLoc::default(), "'break'/'continue' outside of a loop"));
        }
        if rc.has_return {
            return Err(self.fatal(SourceLoc::default(), "'return' outside of a function or method"));
        }
        Ok(())
    }

    /// The directory imports in the currently-executing file resolve
    /// against, derived from the top of the file-context stack.
    pub fn current_dir(&self) -> PathBuf {
        self.files.current().parent().map(Path::to_path_buf).unwrap_or_default()
    }

    /// Checks a runtime [`Value`] against a declared [`TypeExpr`], allowing
    /// an object whose own class or an ancestor matches the annotation.
    pub fn value_matches_type(&self, value: &Value, ty: TypeExpr) -> bool {
        match (value, ty) {
            (Value::Int(_), TypeExpr::Int)
            | (Value::Float(_), TypeExpr::Float)
            | (Value::Str(_), TypeExpr::String)
            | (Value::Bool(_), TypeExpr::Bool) => true,
            (Value::Object(id), TypeExpr::Class(want)) => {
                let mut cur = Some(self.arena.get(*id).class_name);
                while let Some(name) = cur {
                    if name == want {
                        return true;
                    }
                    cur = self.classes.get(name).and_then(|c| c.parent);
                }
                false
            }
            _ => false,
        }
    }
}
