//! Binary emitters: `PrintList` -> native executable bytes.
//!
//! Neither back end needs anything from the evaluator beyond the ordered
//! list of byte buffers they emit as pure byte producers. They're kept as
//! two sibling modules behind one [`emit_binary`] entry point, selected by
//! [`Target`].

pub mod elf;
pub mod macho;

use crate::diagnostics::CResult;
use crate::eval::PrintList;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    LinuxX86_64,
    MacosArm64,
}

/// The emitted binary's raw bytes, plus any follow-up the caller (the CLI)
/// must still perform — currently just "run `codesign`" for Mach-O.
pub struct EmittedBinary {
    pub bytes: Vec<u8>,
    pub needs_codesign: bool,
}

pub fn emit_binary(target: Target, prints: &PrintList) -> CResult<EmittedBinary> {
    match target {
        Target::LinuxX86_64 => Ok(EmittedBinary { bytes: elf::emit(prints)?, needs_codesign: false }),
        Target::MacosArm64 => Ok(EmittedBinary { bytes: macho::emit(prints)?, needs_codesign: true }),
    }
}
