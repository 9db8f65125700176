//! Import path resolution, module caching and cycle detection.
//!
//! Splits cleanly from the evaluator (`eval::imports`) because resolving
//! *where* a path points to and *whether it's stdlib* needs no evaluation
//! context at all, while materializing the imported `pub` symbols does.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use ahash::AHashMap;

use crate::ast::Module;
use crate::diagnostics::{CResult, Diagnostic, SourceLoc};
use crate::intern::Interner;
use crate::lexer::Lexer;
use crate::parser::Parser;

/// Stdlib function names available under `std/string`.
pub const STD_STRING_FUNCS: &[&str] = &[
    "len",
    "trim",
    "contains",
    "replace",
    "to_upper",
    "to_lower",
    "starts_with",
    "ends_with",
    "index_of",
    "char_at",
    "substr",
];

pub const STD_STRING_MODULE: &str = "std/string";

pub fn is_stdlib_path(path: &str) -> bool {
    path == STD_STRING_MODULE
}

/// Caches each non-stdlib import path to its parsed AST, parsing each path
/// at most once, and tracks the in-progress import stack so a cycle can be
/// reported instead of recursing forever.
#[derive(Default)]
pub struct ModuleCache {
    cache: AHashMap<PathBuf, Rc<Module>>,
    stack: Vec<PathBuf>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on_stack(&self, path: &Path) -> bool {
        self.stack.iter().any(|p| p == path)
    }

    pub fn push(&mut self, path: PathBuf) {
        self.stack.push(path);
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }

    pub fn get(&self, path: &Path) -> Option<Rc<Module>> {
        self.cache.get(path).cloned()
    }

    pub fn insert(&mut self, path: PathBuf, module: Rc<Module>) {
        self.cache.insert(path, module);
    }
}

/// Resolves a non-stdlib import path relative to the importing file's
/// directory. Tries the literal path first, then falls back to appending
/// `.lingua` if that doesn't exist.
pub fn resolve_path(importing_dir: &Path, raw_path: &str) -> PathBuf {
    let bare = importing_dir.join(raw_path);
    if bare.exists() {
        bare
    } else {
        importing_dir.join(format!("{raw_path}.lingua"))
    }
}

/// Reads and parses the file at `path`, interning into the shared
/// `interner` so `StringId`s line up with every other file in the
/// compilation.
pub fn parse_file(path: &Path, interner: &mut Interner, loc: SourceLoc) -> CResult<Module> {
    let source = fs::read_to_string(path)
        .map_err(|e| Diagnostic::error(loc, format!("cannot read import '{}': {e}", path.display())))?;
    let tokens = Lexer::new(&source).tokenize(interner)?;
    Parser::new(tokens, interner).parse_module()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdlib_path_is_recognized() {
        assert!(is_stdlib_path("std/string"));
        assert!(!is_stdlib_path("std/math"));
    }

    #[test]
    fn cache_roundtrips() {
        let mut cache = ModuleCache::new();
        let path = PathBuf::from("a.lingua");
        assert!(cache.get(&path).is_none());
        cache.insert(path.clone(), Rc::new(Module::default()));
        assert!(cache.get(&path).is_some());
    }

    #[test]
    fn cycle_stack_detects_reentry() {
        let mut cache = ModuleCache::new();
        let path = PathBuf::from("a.lingua");
        assert!(!cache.is_on_stack(&path));
        cache.push(path.clone());
        assert!(cache.is_on_stack(&path));
        cache.pop();
        assert!(!cache.is_on_stack(&path));
    }
}
