//! Argument parsing and command dispatch for the `lingua` binary.

use std::path::PathBuf;
use std::process::{Command as Process, ExitCode};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use crate::build;
use crate::error::CliError;
use crate::target::{self, TargetArg};

/// Ahead-of-time compiler for the Lingua language.
///
/// Invoked with a single file and no subcommand, `lingua` builds it to a
/// temporary executable, runs it, and forwards its exit code — the same
/// "just run it" shape as a scripting-language interpreter, even though the
/// program is fully compiled first.
#[derive(Parser)]
#[command(name = "lingua", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Source file to build to a temporary executable, run, and forward the
    /// exit code of. Ignored when a subcommand is given.
    #[arg(required_unless_present = "command")]
    file: Option<PathBuf>,

    /// Target platform. Defaults to the host platform.
    #[arg(long, value_enum)]
    target: Option<TargetArg>,

    /// Print warnings in addition to errors. This is the default; the flag
    /// exists so `--no-warnings` has an explicit opposite to override.
    #[arg(long, conflicts_with = "no_warnings")]
    emit_warnings: bool,

    /// Suppress warning diagnostics; errors are always printed.
    #[arg(long)]
    no_warnings: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a source file to a standalone native executable.
    Build {
        file: PathBuf,

        /// Output path. Defaults to the source file's name without its
        /// extension.
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum)]
        target: Option<TargetArg>,

        #[arg(long, conflicts_with = "no_warnings")]
        emit_warnings: bool,

        #[arg(long)]
        no_warnings: bool,
    },

    /// Print a shell completion script for `lingua` to stdout.
    Completions {
        shell: Shell,
    },
}

fn warnings_enabled(emit_warnings: bool, no_warnings: bool) -> bool {
    emit_warnings || !no_warnings
}

pub fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    match cli.command {
        Some(Command::Build { file, output, target, emit_warnings, no_warnings }) => {
            run_build(&file, output, target, warnings_enabled(emit_warnings, no_warnings))
        }
        Some(Command::Completions { shell }) => {
            run_completions(shell);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            let file = cli.file.expect("clap requires `file` when no subcommand is given");
            run_direct(&file, cli.target, warnings_enabled(cli.emit_warnings, cli.no_warnings))
        }
    }
}

fn run_build(file: &PathBuf, output: Option<PathBuf>, target: Option<TargetArg>, emit_warnings: bool) -> Result<ExitCode, CliError> {
    let target = target::resolve(target)?;
    let binary = build::compile_file(file, target, emit_warnings)?;
    let output = output.unwrap_or_else(|| build::default_output_path(file));
    build::write_executable(&binary, &output)?;
    println!("{}", output.display());
    Ok(ExitCode::SUCCESS)
}

fn run_direct(file: &PathBuf, target: Option<TargetArg>, emit_warnings: bool) -> Result<ExitCode, CliError> {
    let target = target::resolve(target)?;
    let binary = build::compile_file(file, target, emit_warnings)?;

    let temp = tempfile::Builder::new().prefix("lingua-").tempfile().map_err(|source| CliError::WriteOutput { path: std::env::temp_dir(), source })?;
    let path = temp.path().to_owned();
    build::write_executable(&binary, &path)?;

    let status = Process::new(&path).status().map_err(|source| CliError::Spawn { path: path.clone(), source })?;
    drop(temp);

    Ok(match status.code() {
        Some(code) => ExitCode::from(code.rem_euclid(256) as u8),
        None => ExitCode::FAILURE,
    })
}

fn run_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_owned();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_internally_consistent() {
        Cli::command().debug_assert();
    }
}
