//! Materializes an `import { a, b } from "path"` statement.
//!
//! Stdlib paths only need a name check against the static table; file paths
//! are parsed (once, via the shared [`crate::imports::ModuleCache`]),
//! recursively resolved, then evaluated in an isolated scope so only the
//! requested `pub` names leak into the importing scope.

use super::EvalCtx;
use crate::diagnostics::{CResult, SourceLoc};
use crate::imports as import_paths;
use crate::intern::StringId;
use crate::scope::Symbol;

impl EvalCtx<'_> {
    pub fn resolve_import(&mut self, names: &[(StringId, SourceLoc)], path: &str, loc: SourceLoc) -> CResult<()> {
        if import_paths::is_stdlib_path(path) {
            for (name, name_loc) in names {
                let text = self.interner.resolve(*name);
                if !import_paths::STD_STRING_FUNCS.contains(&text) {
                    return Err(self.fatal(*name_loc, format!("'{text}' is not a std/string function")));
                }
                self.stdlib_imported.insert(*name);
            }
            return Ok(());
        }

        let resolved = import_paths::resolve_path(&self.current_dir(), path);
        if self.modules.is_on_stack(&resolved) {
            return Err(self.fatal(loc, format!("cyclic import of '{}'", resolved.display())));
        }

        let module = match self.modules.get(&resolved) {
            Some(m) => m,
            None => {
                self.modules.push(resolved.clone());
                let parsed = import_paths::parse_file(&resolved, self.interner, loc);
                self.modules.pop();
                let parsed = parsed.map_err(|d| self.files.attach(d))?;
                let rc = std::rc::Rc::new(parsed);
                self.modules.insert(resolved.clone(), rc.clone());
                rc
            }
        };

        self.files.push(resolved.clone());
        self.scopes.push();
        self.modules.push(resolved.clone());
        let mut rc_flow = super::ReturnCtx::default();
        let mut exec_result = super::stmt::exec_block(self, &module.stmts, &mut rc_flow);
        self.modules.pop();
        if exec_result.is_ok() && (rc_flow.has_return || rc_flow.has_break || rc_flow.has_continue) {
            exec_result = Err(self.fatal(loc, "'return'/'break'/'continue' outside of a function or method"));
        }

        let mut materialized = Vec::new();
        if exec_result.is_ok() {
            for (name, name_loc) in names {
                let text = self.interner.resolve(*name).to_owned();
                match self.scopes.lookup(*name) {
                    Some(sym) if is_public(&module, *name) => materialized.push((*name, sym.value.clone(), sym.is_const, *name_loc)),
                    Some(_) => {
                        self.scopes.pop();
                        self.files.pop();
                        return Err(self.fatal(*name_loc, format!("'{text}' is not public in '{}'", resolved.display())));
                    }
                    None => {
                        self.scopes.pop();
                        self.files.pop();
                        return Err(self.fatal(*name_loc, format!("'{text}' is not declared in '{}'", resolved.display())));
                    }
                }
            }
        }
        self.scopes.pop();
        self.files.pop();
        exec_result?;

        for (name, value, is_const, name_loc) in materialized {
            let sym = Symbol { name, value, is_const, mutated: false, loc: name_loc };
            if !self.scopes.declare(sym) {
                return Err(self.fatal(name_loc, format!("'{}' is already declared", self.interner.resolve(name))));
            }
        }
        Ok(())
    }
}

/// Whether `name` was declared `pub` as a top-level var/fn/class in `module`.
fn is_public(module: &crate::ast::Module, name: StringId) -> bool {
    use crate::ast::Stmt;
    module.stmts.iter().any(|s| match s {
        Stmt::VarDecl { name: n, is_pub, .. } => *n == name && *is_pub,
        Stmt::FnDecl(f) => f.name == name && f.is_pub,
        Stmt::ClassDecl(c) => c.name == name && c.is_pub,
        _ => false,
    })
}
