//! Structured diagnostics.
//!
//! The semantic core *produces* diagnostic records; rendering them to a
//! terminal or a file is the caller's business. Two severities exist:
//! user errors (analysis continues with the next top-level declaration)
//! and internal invariant violations (fatal - they indicate a compiler
//! bug, never a user mistake).

use keel_ir::{FileTable, Loc};
use std::fmt;

/// What went wrong.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DiagKind {
    TypeMismatch,
    AmbiguousCall,
    NamedParamHasToBeIdent,
    CannotBindTwice,
    UndeclaredIdentifier,
    /// Formatted message carrying a textual reason.
    Generated,
    /// Broken invariant; fatal.
    InternalError,
}

impl DiagKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagKind::InternalError => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

/// How bad it is.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Severity {
    Error,
    Fatal,
}

/// One diagnostic record.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub kind: DiagKind,
    pub loc: Loc,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagKind, loc: Loc, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            loc,
            message: message.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    /// Render as `file(line, col) Error: message`.
    pub fn render(&self, files: &FileTable) -> String {
        let label = match self.severity() {
            Severity::Error => "Error",
            Severity::Fatal => "Fatal",
        };
        format!(
            "{}({}, {}) {}: {}",
            files.path(self.loc.file),
            self.loc.line,
            self.loc.col,
            label,
            self.message
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}): {}", self.loc.line, self.loc.col, self.message)
    }
}

/// Collects diagnostics for the whole compilation unit.
#[derive(Default)]
pub struct DiagnosticQueue {
    diags: Vec<Diagnostic>,
    errors: usize,
    fatal: bool,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn push(&mut self, diag: Diagnostic) {
        match diag.severity() {
            Severity::Error => self.errors += 1,
            Severity::Fatal => self.fatal = true,
        }
        self.diags.push(diag);
    }

    /// Record a user error.
    pub fn error(&mut self, kind: DiagKind, loc: Loc, message: impl Into<String>) {
        debug_assert_ne!(kind, DiagKind::InternalError);
        self.push(Diagnostic::new(kind, loc, message));
    }

    /// Record a broken-invariant diagnostic. Callers abort the current
    /// analysis after this returns.
    pub fn internal_error(&mut self, loc: Loc, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagKind::InternalError, loc, message));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diags.iter()
    }

    pub fn len(&self) -> usize {
        self.diags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diags.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn has_fatal(&self) -> bool {
        self.fatal
    }

    /// Process exit code: 0 on success, non-zero on any fatal or user
    /// error.
    pub fn exit_code(&self) -> i32 {
        if self.fatal || self.errors > 0 {
            1
        } else {
            0
        }
    }
}
