mod build;
mod cli;
mod error;
mod report;
mod style;
mod target;

use std::process::ExitCode;

use style::Style;

fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}: {err}", Style::bold_red("error"));
            ExitCode::FAILURE
        }
    }
}
