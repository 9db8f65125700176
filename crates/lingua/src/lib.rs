#![doc = include_str!("../README.md")]

mod ast;
mod class;
mod diagnostics;
mod emit;
mod eval;
mod imports;
mod intern;
mod lexer;
mod parser;
mod scope;
mod stdlib;
mod value;

pub use crate::diagnostics::{
    render_with_excerpt, CResult, CollectingSink, Diagnostic, DiagnosticSink, Severity, SourceLoc,
};
pub use crate::emit::{EmittedBinary, Target};

use std::path::PathBuf;

use crate::diagnostics::FileContextStack;
use crate::eval::EvalCtx;
use crate::intern::Interner;
use crate::lexer::Lexer;
use crate::parser::Parser;

/// Compiles one source file to a native executable for `target`.
///
/// This is the single entry point `lingua-cli` drives: lex, parse, resolve
/// imports and evaluate to a [`eval::PrintList`], then hand that list to the
/// emitter selected by `target`. Any warning raised along the way (currently
/// only "binding never mutated") is reported to `sink` rather than failing
/// the compilation; only a [`Diagnostic`] with [`Severity::Error`] aborts
/// it, since warnings never affect the exit code.
pub fn compile(
    source: &str,
    root_path: impl Into<PathBuf>,
    target: Target,
    sink: &mut dyn DiagnosticSink,
) -> CResult<EmittedBinary> {
    let root_path = root_path.into();
    let files = FileContextStack::new(root_path.clone());

    let mut interner = Interner::new();
    let tokens = Lexer::new(source).tokenize(&mut interner).map_err(|d| files.attach(d))?;
    let module = Parser::new(tokens, &interner).parse_module().map_err(|d| files.attach(d))?;

    let mut ctx = EvalCtx::new(&mut interner, sink, root_path);
    ctx.run_root(&module)?;
    emit::emit_binary(target, &ctx.prints)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> (Vec<u8>, CollectingSink) {
        let mut sink = CollectingSink::default();
        let binary = compile(source, "main.lingua", Target::LinuxX86_64, &mut sink).expect("compile should succeed");
        (binary.bytes, sink)
    }

    #[test]
    fn compiles_a_trivial_program_to_a_valid_elf_header() {
        let (bytes, _sink) = run(r#"print("hello\n");"#);
        assert_eq!(&bytes[0..4], &[0x7f, b'E', b'L', b'F']);
    }

    #[test]
    fn lex_error_is_attached_to_the_root_file() {
        let mut sink = CollectingSink::default();
        let err = compile("\"unterminated", "main.lingua", Target::LinuxX86_64, &mut sink).unwrap_err();
        assert_eq!(err.file.unwrap(), std::path::PathBuf::from("main.lingua"));
    }

    #[test]
    fn never_mutated_root_variable_is_reported_as_a_warning() {
        let (_bytes, sink) = run(r#"let x: int = 1; print("ok\n");"#);
        assert_eq!(sink.warnings().count(), 1);
    }
}
