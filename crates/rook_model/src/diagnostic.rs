//! Diagnostics and the per-file collector.

use rook_syntax::{Location, Range};
use serde::{Deserialize, Serialize};

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// What went wrong, for hosts that filter or group diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // Structural
    InvalidIdentifier,
    MemberNamedAfterClass,
    InvalidInheritance,
    CircularInheritance,
    DuplicateName,
    InvalidOverload,

    // Resolution
    NotFound,
    Ambiguous,
    NotAType,
    ImportNotFound,

    // Consistency
    ReturnTypeMismatch,
    NotImplemented,
}

/// Secondary location attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Related {
    pub location: Location,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub related: Vec<Related>,
}

impl Diagnostic {
    pub fn error(range: Range, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            range,
            severity: Severity::Error,
            code,
            message: message.into(),
            related: vec![],
        }
    }

    pub fn warning(range: Range, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(range, code, message)
        }
    }

    pub fn with_related(mut self, location: Location, message: impl Into<String>) -> Self {
        self.related.push(Related {
            location,
            message: message.into(),
        });
        self
    }
}

/// Which phase produced a diagnostic. Each phase's entries are replaced
/// wholesale when that phase reruns for the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Tidy,
    Link,
    Check,
}

/// Append-only diagnostics of one file.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    tidy: Vec<Diagnostic>,
    link: Vec<Diagnostic>,
    check: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn bucket(&mut self, phase: Phase) -> &mut Vec<Diagnostic> {
        match phase {
            Phase::Tidy => &mut self.tidy,
            Phase::Link => &mut self.link,
            Phase::Check => &mut self.check,
        }
    }

    pub fn push(&mut self, phase: Phase, diagnostic: Diagnostic) {
        self.bucket(phase).push(diagnostic);
    }

    pub fn clear(&mut self, phase: Phase) {
        self.bucket(phase).clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.tidy.iter().chain(&self.link).chain(&self.check)
    }

    pub fn len(&self) -> usize {
        self.tidy.len() + self.link.len() + self.check.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_errors(&self) -> bool {
        self.iter().any(|d| d.severity == Severity::Error)
    }
}
