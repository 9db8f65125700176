//! Call/method/constructor dispatch and argument matching.

use std::rc::Rc;

use super::{ReturnCtx, EvalCtx, MAX_CALL_DEPTH};
use crate::ast::{Args, Callee, FnDecl, Param, TypeExpr};
use crate::diagnostics::{CResult, SourceLoc};
use crate::intern::StringId;
use crate::scope::Symbol;
use crate::value::{ObjData, Value};

impl EvalCtx<'_> {
    pub fn eval_call(&mut self, callee: &Callee, args: &Args, loc: SourceLoc) -> CResult<Value> {
        match callee {
            Callee::Name(name) => self.call_unqualified(*name, args, loc),
            Callee::Method { receiver, method, method_loc } => {
                let recv = self.eval_expr(receiver)?;
                let Value::Object(id) = recv else {
                    return Err(self.fatal(*method_loc, "method call requires an object receiver"));
                };
                let class_name = self.arena.get(id).class_name;
                let decl = self
                    .classes
                    .get(class_name)
                    .and_then(|c| c.methods.iter().find(|(n, _)| n == method).map(|(_, d)| Rc::clone(d)))
                    .ok_or_else(|| {
                        self.fatal(*method_loc, format!("unknown method '{}' on class '{}'", self.interner.resolve(*method), self.interner.resolve(class_name)))
                    })?;
                self.call_method(id, &decl, args, loc)
            }
        }
    }

    fn call_unqualified(&mut self, name: StringId, args: &Args, loc: SourceLoc) -> CResult<Value> {
        if let Some(decl) = self.functions.get(&name).cloned() {
            return self.call_function(&decl, args, loc);
        }
        let text = self.interner.resolve(name).to_owned();
        if self.stdlib_imported.contains(&name) && crate::stdlib::is_string_fn(&text) {
            let values = self.eval_positional_only(args, loc)?;
            return crate::stdlib::call_string_fn(&text, &values, loc);
        }
        Err(self.fatal(loc, format!("undefined function '{text}'")))
    }

    /// Evaluates a call's arguments when named arguments make no sense
    /// (stdlib builtins take only positional parameters).
    fn eval_positional_only(&mut self, args: &Args, loc: SourceLoc) -> CResult<Vec<Value>> {
        if !args.named.is_empty() {
            return Err(self.fatal(loc, "standard library functions take only positional arguments"));
        }
        args.positional.iter().map(|e| self.eval_expr(e)).collect()
    }

    fn call_function(&mut self, decl: &Rc<FnDecl>, args: &Args, loc: SourceLoc) -> CResult<Value> {
        let bound = self.bind_params(&decl.params, args, loc)?;
        self.call_depth += 1;
        if self.call_depth > MAX_CALL_DEPTH {
            self.call_depth -= 1;
            return Err(self.fatal(loc, format!("recursion limit ({MAX_CALL_DEPTH}) exceeded")));
        }
        self.scopes.push();
        for (name, value) in bound {
            let sym = Symbol { name, value, is_const: false, mutated: false, loc };
            if !self.scopes.declare(sym) {
                self.scopes.pop();
                self.call_depth -= 1;
                return Err(self.fatal(loc, format!("duplicate parameter name '{}'", self.interner.resolve(name))));
            }
        }
        let mut rc = ReturnCtx::default();
        let result = super::stmt::exec_block(self, &decl.body, &mut rc);
        self.scopes.pop();
        self.call_depth -= 1;
        result?;

        if rc.has_break || rc.has_continue {
            return Err(self.fatal(loc, "'break'/'continue' outside of a loop"));
        }
        self.finish_call(decl.ret, rc, loc)
    }

    fn call_method(&mut self, object: crate::value::ObjectId, decl: &Rc<FnDecl>, args: &Args, loc: SourceLoc) -> CResult<Value> {
        let bound = self.bind_params(&decl.params, args, loc)?;
        self.call_depth += 1;
        if self.call_depth > MAX_CALL_DEPTH {
            self.call_depth -= 1;
            return Err(self.fatal(loc, format!("recursion limit ({MAX_CALL_DEPTH}) exceeded")));
        }
        self.scopes.push();

        let fields: Vec<(StringId, Value)> = {
            let data = self.arena.get(object);
            data.field_names.iter().copied().zip(data.field_values.iter().cloned()).collect()
        };
        for (name, value) in fields {
            let sym = Symbol { name, value, is_const: false, mutated: false, loc };
            let _ = self.scopes.declare(sym);
        }
        for (name, value) in bound {
            let sym = Symbol { name, value, is_const: false, mutated: false, loc };
            if !self.scopes.declare(sym) {
                self.scopes.pop();
                self.call_depth -= 1;
                return Err(self.fatal(loc, format!("duplicate parameter/field name '{}'", self.interner.resolve(name))));
            }
        }

        let mut rc = ReturnCtx::default();
        let result = super::stmt::exec_block(self, &decl.body, &mut rc);

        // Write field-named symbols back into the object regardless of
        // whether the body errored partway, so partial mutation up to the
        // failing statement is still observable -- the call still aborts
        // compilation, but fields are mutated in place as they're assigned.
        let data = self.arena.get(object);
        let field_names = data.field_names.clone();
        for field in field_names {
            if let Some(sym) = self.scopes.lookup(field) {
                let value = sym.value.clone();
                self.arena.get_mut(object).set(field, value);
            }
        }
        self.scopes.pop();
        self.call_depth -= 1;
        result?;

        if rc.has_break || rc.has_continue {
            return Err(self.fatal(loc, "'break'/'continue' outside of a loop"));
        }
        self.finish_call(decl.ret, rc, loc)
    }

    fn finish_call(&self, ret: Option<TypeExpr>, rc: ReturnCtx, loc: SourceLoc) -> CResult<Value> {
        match ret {
            Some(ty) => {
                if !rc.has_return {
                    return Err(self.fatal(loc, "function with a declared return type must return a value on every path"));
                }
                let value = rc.value.unwrap_or(Value::Void);
                if !self.value_matches_type(&value, ty) {
                    return Err(self.fatal(loc, format!("return value does not match declared return type, found {}", value.type_name())));
                }
                Ok(value)
            }
            None => Ok(rc.value.unwrap_or(Value::Void)),
        }
    }

    /// Binds call-site arguments to `params`: positional first, then named,
    /// filling any remaining parameter from its default.
    fn bind_params(&mut self, params: &[Param], args: &Args, loc: SourceLoc) -> CResult<Vec<(StringId, Value)>> {
        if args.positional.len() > params.len() {
            return Err(self.fatal(loc, "too many positional arguments"));
        }
        let mut bound: Vec<Option<Value>> = vec![None; params.len()];
        for (i, expr) in args.positional.iter().enumerate() {
            bound[i] = Some(self.eval_expr(expr)?);
        }
        for (name, name_loc, expr) in &args.named {
            let Some(pos) = params.iter().position(|p| p.name == *name) else {
                return Err(self.fatal(*name_loc, format!("unknown argument '{}'", self.interner.resolve(*name))));
            };
            if bound[pos].is_some() {
                return Err(self.fatal(*name_loc, format!("duplicate binding for argument '{}'", self.interner.resolve(*name))));
            }
            bound[pos] = Some(self.eval_expr(expr)?);
        }

        let mut out = Vec::with_capacity(params.len());
        for (param, slot) in params.iter().zip(bound) {
            let value = match slot {
                Some(v) => v,
                None => match &param.default {
                    Some(default_expr) => self.eval_expr(default_expr)?,
                    None => return Err(self.fatal(loc, format!("missing required argument '{}'", self.interner.resolve(param.name)))),
                },
            };
            if let Some(ty) = param.ty {
                if !self.value_matches_type(&value, ty) {
                    return Err(self.fatal(param.loc, format!("argument '{}' does not match declared type, found {}", self.interner.resolve(param.name), value.type_name())));
                }
            }
            out.push((param.name, value));
        }
        Ok(out)
    }

    pub fn eval_new(&mut self, class: StringId, args: &Args, loc: SourceLoc) -> CResult<Value> {
        let def = self.classes.get(class).cloned().ok_or_else(|| self.fatal(loc, format!("unknown class '{}'", self.interner.resolve(class))))?;

        if args.positional.len() > def.fields.len() {
            return Err(self.fatal(loc, "too many positional arguments to constructor"));
        }
        let mut bound: Vec<Option<Value>> = vec![None; def.fields.len()];
        for (i, expr) in args.positional.iter().enumerate() {
            bound[i] = Some(self.eval_expr(expr)?);
        }
        for (name, name_loc, expr) in &args.named {
            let Some(pos) = def.fields.iter().position(|(n, _)| n == name) else {
                return Err(self.fatal(*name_loc, format!("unknown field '{}'", self.interner.resolve(*name))));
            };
            if bound[pos].is_some() {
                return Err(self.fatal(*name_loc, format!("duplicate binding for field '{}'", self.interner.resolve(*name))));
            }
            bound[pos] = Some(self.eval_expr(expr)?);
        }

        let mut field_values = Vec::with_capacity(def.fields.len());
        for ((field_name, field_ty), slot) in def.fields.iter().zip(bound) {
            let Some(value) = slot else {
                return Err(self.fatal(loc, format!("missing field '{}' in constructor", self.interner.resolve(*field_name))));
            };
            if !self.value_matches_type(&value, *field_ty) {
                return Err(self.fatal(loc, format!("field '{}' does not match declared type, found {}", self.interner.resolve(*field_name), value.type_name())));
            }
            field_values.push(value);
        }

        let data = ObjData { class_name: class, field_names: def.fields.iter().map(|(n, _)| *n).collect(), field_values };
        Ok(Value::Object(self.arena.alloc(data)))
    }
}
