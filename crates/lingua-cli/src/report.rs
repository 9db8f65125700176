//! Prints [`lingua::Diagnostic`]s to stderr with a source excerpt and color.

use lingua::{render_with_excerpt, CollectingSink, Diagnostic, Severity};

use crate::style::Style;

fn print_one(source: &str, diagnostic: &Diagnostic) {
    let excerpt = render_with_excerpt(diagnostic, source);
    let colored = match diagnostic.severity {
        Severity::Error => Style::bold_red(&excerpt),
        Severity::Warning => Style::yellow(&excerpt),
    };
    eprintln!("{colored}");
}

/// Prints every collected diagnostic, in the order it was raised. Warnings
/// are skipped entirely when `emit_warnings` is false; errors always print.
pub fn print_all(source: &str, sink: &CollectingSink, emit_warnings: bool) {
    for diagnostic in &sink.diagnostics {
        if diagnostic.severity == Severity::Warning && !emit_warnings {
            continue;
        }
        print_one(source, diagnostic);
    }
}
