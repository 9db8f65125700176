//! String interning for identifiers and string literals.
//!
//! Every identifier and string literal the lexer produces is interned once;
//! the rest of the pipeline (parser, evaluator, diagnostics) carries the
//! cheap, `Copy` [`StringId`] around instead of cloning `String`s. Lookups
//! back to the text are needed only for error messages, `print` output and
//! string-typed values.

use ahash::AHashMap;

/// Index into the interner's backing storage.
///
/// `u32` rather than `usize` to keep AST nodes small; a single source file
/// producing four billion distinct identifiers is not a case this compiler
/// needs to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StringId(u32);

impl StringId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Owns the unique strings seen by the lexer across the main file and every
/// transitively-imported file, plus a name -> id map for de-duplication.
#[derive(Debug, Default)]
pub struct Interner {
    strings: Vec<String>,
    map: AHashMap<String, StringId>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> StringId {
        if let Some(&id) = self.map.get(s) {
            return id;
        }
        let id = StringId(self.strings.len() as u32);
        self.strings.push(s.to_owned());
        self.map.insert(s.to_owned(), id);
        id
    }

    #[must_use]
    pub fn resolve(&self, id: StringId) -> &str {
        &self.strings[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_text_returns_same_id() {
        let mut interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        let c = interner.intern("bar");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.resolve(a), "foo");
        assert_eq!(interner.resolve(c), "bar");
    }
}
