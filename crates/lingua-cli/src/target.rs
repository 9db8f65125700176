//! Maps the CLI's `--target` flag onto [`lingua::Target`] and infers a
//! default from the host triple when the flag is omitted.

use clap::ValueEnum;
use lingua::Target;

use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    #[value(name = "linux-x86_64")]
    LinuxX86_64,
    #[value(name = "macos-arm64")]
    MacosArm64,
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::LinuxX86_64 => Target::LinuxX86_64,
            TargetArg::MacosArm64 => Target::MacosArm64,
        }
    }
}

/// Resolves `--target`, falling back to the host platform when it is absent.
pub fn resolve(target: Option<TargetArg>) -> Result<Target, CliError> {
    if let Some(arg) = target {
        return Ok(arg.into());
    }
    match (std::env::consts::OS, std::env::consts::ARCH) {
        ("linux", "x86_64") => Ok(Target::LinuxX86_64),
        ("macos", "aarch64") => Ok(Target::MacosArm64),
        (os, arch) => Err(CliError::UnknownHostTarget { os: os.to_owned(), arch: arch.to_owned() }),
    }
}
