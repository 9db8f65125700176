//! Structured diagnostics shared by every compilation phase.
//!
//! Every fallible operation in this crate returns a [`Diagnostic`] on failure
//! rather than a bare string: location, severity and message travel together
//! so that a caller (typically `lingua-cli`) can render a source excerpt
//! without re-deriving the file/line/column from scratch.

use std::fmt;
use std::path::{Path, PathBuf};

/// A location within a single source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLoc {
    pub line: u32,
    pub column: u32,
    pub offset: u32,
}

impl SourceLoc {
    pub fn new(line: u32, column: u32, offset: u32) -> Self {
        Self { line, column, offset }
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Severity of a [`Diagnostic`]. Only `Error` is fatal to compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single diagnostic: where it happened, how bad it is, and why.
///
/// `file` is filled in lazily by [`FileContextStack::attach`] rather than at
/// construction time, since most diagnostics are raised deep inside the
/// lexer/parser/evaluator where only the current [`FileContextStack`] (not
/// the path itself) is in scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub loc: SourceLoc,
    pub severity: Severity,
    pub message: String,
    pub file: Option<PathBuf>,
}

impl Diagnostic {
    pub fn error(loc: SourceLoc, message: impl Into<String>) -> Self {
        Self { loc, severity: Severity::Error, message: message.into(), file: None }
    }

    pub fn warning(loc: SourceLoc, message: impl Into<String>) -> Self {
        Self { loc, severity: Severity::Warning, message: message.into(), file: None }
    }

    #[must_use]
    pub fn with_file(mut self, file: PathBuf) -> Self {
        self.file = Some(file);
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(path) => write!(f, "{}:{}: {}: {}", path.display(), self.loc, self.severity, self.message),
            None => write!(f, "{}: {}: {}", self.loc, self.severity, self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}

/// Convenience alias used throughout the crate for phases that can fail with
/// a single fatal [`Diagnostic`].
pub type CResult<T> = Result<T, Diagnostic>;

/// Receives diagnostics as they are produced.
///
/// The core never decides how a diagnostic is rendered (that belongs to
/// `lingua-cli`'s printer); it only decides *when* one is raised and hands
/// it to whatever sink the caller supplied.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// A [`DiagnosticSink`] that simply collects everything it is given, in
/// order. Used by tests and as the default sink before `lingua-cli` takes
/// over rendering.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

impl CollectingSink {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning)
    }
}

/// Tracks which file a [`SourceLoc`] belongs to while imports are resolved
/// depth-first.
///
/// Pushed before evaluating/parsing an imported file, popped on return, so
/// that any diagnostic raised in the middle of resolving `b.lingua` from
/// `a.lingua` is attributed to `b.lingua` rather than the top-level file.
#[derive(Debug, Default)]
pub struct FileContextStack {
    stack: Vec<PathBuf>,
}

impl FileContextStack {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { stack: vec![root.into()] }
    }

    pub fn push(&mut self, path: impl Into<PathBuf>) {
        self.stack.push(path.into());
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }

    pub fn current(&self) -> &Path {
        self.stack.last().expect("file context stack is never empty")
    }

    /// Attaches the currently-active file to a diagnostic that was raised
    /// without one.
    pub fn attach(&self, diagnostic: Diagnostic) -> Diagnostic {
        if diagnostic.file.is_some() {
            diagnostic
        } else {
            diagnostic.with_file(self.current().to_path_buf())
        }
    }
}

/// Renders a diagnostic with a one-line source excerpt and a `^` caret under
/// the offending column, the way `lingua-cli` prints to stderr.
///
/// Lives in the core (rather than the CLI) since it only formats a message
/// with a source excerpt; only the decision of *where* to print the
/// rendered string belongs to the CLI.
pub fn render_with_excerpt(diagnostic: &Diagnostic, source: &str) -> String {
    let line_text = source.lines().nth(diagnostic.loc.line.saturating_sub(1) as usize).unwrap_or("");
    let caret_padding = " ".repeat(diagnostic.loc.column.saturating_sub(1) as usize);
    format!("{diagnostic}\n  {line_text}\n  {caret_padding}^")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_caret_at_column() {
        let d = Diagnostic::error(SourceLoc::new(1, 5, 4), "unexpected token");
        let rendered = render_with_excerpt(&d, "let x = ;");
        assert!(rendered.contains("let x = ;"));
        assert!(rendered.ends_with('^'));
    }

    #[test]
    fn file_context_attaches_current_file() {
        let mut stack = FileContextStack::new("main.lingua");
        stack.push("std/string.lingua");
        let d = Diagnostic::error(SourceLoc::default(), "boom");
        let attached = stack.attach(d);
        assert_eq!(attached.file.unwrap(), PathBuf::from("std/string.lingua"));
        stack.pop();
        assert_eq!(stack.current(), Path::new("main.lingua"));
    }
}
