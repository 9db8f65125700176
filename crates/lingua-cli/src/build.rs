//! Shared build machinery behind both the default "run" invocation and the
//! `build` subcommand: read source, compile, write an executable, codesign
//! it on macOS.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command as Process;

use lingua::{compile, CollectingSink, EmittedBinary, Target};

use crate::error::CliError;
use crate::report;

/// Reads `file`, compiles it for `target`, prints every diagnostic raised
/// along the way, and fails with [`CliError::Compile`] if compilation did
/// not produce a binary.
pub fn compile_file(file: &Path, target: Target, emit_warnings: bool) -> Result<EmittedBinary, CliError> {
    let source = fs::read_to_string(file).map_err(|source| CliError::ReadSource { path: file.to_owned(), source })?;

    let mut sink = CollectingSink::default();
    let result = compile(&source, file, target, &mut sink);
    report::print_all(&source, &sink, emit_warnings);
    result.map_err(|_| CliError::Compile)
}

/// Writes `binary` to `path`, marks it executable, and runs `codesign` over
/// it if the target requires an ad-hoc signature (Mach-O).
/// A failed or missing `codesign` is reported but not fatal, the same way
/// an unsigned-but-runnable binary behaves on a developer's own machine.
pub fn write_executable(binary: &EmittedBinary, path: &Path) -> Result<(), CliError> {
    fs::write(path, &binary.bytes).map_err(|source| CliError::WriteOutput { path: path.to_owned(), source })?;

    let mut perms = fs::metadata(path).map_err(|source| CliError::WriteOutput { path: path.to_owned(), source })?.permissions();
    perms.set_mode(perms.mode() | 0o111);
    fs::set_permissions(path, perms).map_err(|source| CliError::WriteOutput { path: path.to_owned(), source })?;

    if binary.needs_codesign {
        codesign(path);
    }
    Ok(())
}

fn codesign(path: &Path) {
    match Process::new("codesign").args(["--force", "--sign", "-"]).arg(path).status() {
        Ok(status) if status.success() => {}
        Ok(status) => eprintln!("warning: codesign exited with {status}"),
        Err(err) => eprintln!("warning: could not run codesign: {err}"),
    }
}

pub fn default_output_path(source: &Path) -> PathBuf {
    source.with_extension("")
}
