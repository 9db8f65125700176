//! Class table: flattened field lists and method resolution.
//!
//! No dynamic dispatch is needed — the emitted binary never runs user code,
//! so everything here is resolved once, at compile time, when the class
//! table is built.

use std::rc::Rc;

use ahash::AHashMap;

use crate::ast::{ClassDecl, FnDecl, TypeExpr};
use crate::diagnostics::{CResult, Diagnostic, SourceLoc};
use crate::intern::{Interner, StringId};

/// A fully resolved class: parent chain flattened into `fields`, methods
/// kept in declaration order (lookup falls back to the parent on miss).
#[derive(Debug)]
pub struct ClassDef {
    pub name: StringId,
    pub parent: Option<StringId>,
    pub fields: Vec<(StringId, TypeExpr)>,
    pub methods: Vec<(StringId, Rc<FnDecl>)>,
    pub loc: SourceLoc,
}

impl ClassDef {
    pub fn find_field(&self, name: StringId) -> Option<usize> {
        self.fields.iter().position(|(n, _)| *n == name)
    }
}

/// Builds a `name -> ClassDef` table from a program's class declarations,
/// flattening each class's field list as `parent fields ++ own fields` and
/// resolving method lookup by walking the parent chain.
#[derive(Debug, Default)]
pub struct ClassTable {
    classes: AHashMap<StringId, Rc<ClassDef>>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: StringId) -> Option<&Rc<ClassDef>> {
        self.classes.get(&name)
    }

    /// Registers one class declaration, resolving its parent (which must
    /// already be registered) and flattening fields/methods.
    pub fn register(&mut self, decl: &ClassDecl, interner: &Interner) -> CResult<()> {
        if self.classes.contains_key(&decl.name) {
            return Err(Diagnostic::error(decl.loc, format!("class '{}' is already declared", interner.resolve(decl.name))));
        }

        let mut fields = Vec::new();
        let mut methods = Vec::new();

        if let Some(parent_name) = decl.parent {
            let parent = self.classes.get(&parent_name).ok_or_else(|| {
                Diagnostic::error(decl.loc, format!("unknown parent class '{}'", interner.resolve(parent_name)))
            })?;
            fields.extend(parent.fields.iter().cloned());
            methods.extend(parent.methods.iter().cloned());
        }

        for field in &decl.fields {
            if fields.iter().any(|(n, _)| *n == field.name) {
                return Err(Diagnostic::error(field.loc, format!("duplicate field '{}'", interner.resolve(field.name))));
            }
            fields.push((field.name, field.ty));
        }

        for method in &decl.methods {
            if let Some(slot) = methods.iter().position(|(n, _)| *n == method.name) {
                methods[slot] = (method.name, Rc::clone(method));
            } else {
                methods.push((method.name, Rc::clone(method)));
            }
        }

        self.classes.insert(
            decl.name,
            Rc::new(ClassDef { name: decl.name, parent: decl.parent, fields, methods, loc: decl.loc }),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Field;

    fn field(interner: &mut Interner, name: &str, ty: TypeExpr) -> Field {
        Field { name: interner.intern(name), ty, loc: SourceLoc::default() }
    }

    #[test]
    fn child_flattens_parent_fields_first() {
        let mut interner = Interner::new();
        let p = interner.intern("P");
        let q = interner.intern("Q");
        let x = field(&mut interner, "x", TypeExpr::Int);
        let z = field(&mut interner, "z", TypeExpr::Int);

        let mut table = ClassTable::new();
        table
            .register(
                &ClassDecl { name: p, parent: None, fields: vec![x], methods: vec![], is_pub: false, loc: SourceLoc::default() },
                &interner,
            )
            .unwrap();
        table
            .register(
                &ClassDecl { name: q, parent: Some(p), fields: vec![z], methods: vec![], is_pub: false, loc: SourceLoc::default() },
                &interner,
            )
            .unwrap();

        let def = table.get(q).unwrap();
        let names: Vec<&str> = def.fields.iter().map(|(n, _)| interner.resolve(*n)).collect();
        assert_eq!(names, vec!["x", "z"]);
    }

    #[test]
    fn unknown_parent_is_fatal() {
        let mut interner = Interner::new();
        let q = interner.intern("Q");
        let missing = interner.intern("Missing");
        let mut table = ClassTable::new();
        let result = table.register(
            &ClassDecl { name: q, parent: Some(missing), fields: vec![], methods: vec![], is_pub: false, loc: SourceLoc::default() },
            &interner,
        );
        assert!(result.is_err());
    }
}
