//! filter::result
//!
//! Structured outcome of a filter invocation.
//!
//! # Architecture
//!
//! Every expected failure (bad parameters, missing paths, unreadable files,
//! inconsistent geometry) is reported as a [`Diagnostic`] inside an
//! [`ExecutionResult`] rather than as a Rust error crossing the filter
//! boundary. This lets the pipeline runner treat all filters uniformly when
//! deciding whether to halt or continue.
//!
//! # Example
//!
//! ```
//! use meshpipe::filter::result::{DiagnosticCode, ExecutionResult};
//!
//! let mut first = ExecutionResult::new();
//! first.push_warning(DiagnosticCode::ScaleIgnored, "scale factor ignored");
//!
//! let second = ExecutionResult::from_error(DiagnosticCode::FileNotFound, "missing.stl");
//!
//! let merged = ExecutionResult::merge(first, second);
//! assert!(merged.has_errors());
//! assert_eq!(merged.warnings.len(), 1);
//! ```

use std::fmt;

use serde::Serialize;

/// Broad class of a diagnostic, mirroring how it should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Bad parameters, paths or types; always caught during preflight.
    Validation,
    /// Inconsistent geometry or tuple counts.
    DataIntegrity,
    /// File system failures.
    Io,
    /// Run control (cancellation).
    Control,
    /// Engine defect; should never happen.
    Internal,
    /// Non-fatal notices.
    Advisory,
}

/// Stable diagnostic codes.
///
/// Each code has a fixed negative integer value so that scripts and
/// saved reports can match on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    UnknownParameter,
    MissingParameter,
    ParameterTypeError,
    OutOfRange,
    InvalidPath,
    EmptyValue,

    PathNotFound,
    DuplicatePath,
    TypeMismatch,
    InvalidPlacement,

    InvalidGeometry,
    TupleCountMismatch,

    FileNotFound,
    ReadError,
    ParseError,
    WriteError,

    Cancelled,
    Internal,

    ScaleIgnored,
    DegenerateFaces,
    UnknownExtension,
    ReplacedExisting,
    EmptyStore,
}

impl DiagnosticCode {
    pub fn value(&self) -> i32 {
        match self {
            DiagnosticCode::UnknownParameter => -1001,
            DiagnosticCode::MissingParameter => -1002,
            DiagnosticCode::ParameterTypeError => -1003,
            DiagnosticCode::OutOfRange => -1004,
            DiagnosticCode::InvalidPath => -1005,
            DiagnosticCode::EmptyValue => -1006,

            DiagnosticCode::PathNotFound => -2001,
            DiagnosticCode::DuplicatePath => -2002,
            DiagnosticCode::TypeMismatch => -2003,
            DiagnosticCode::InvalidPlacement => -2004,

            DiagnosticCode::InvalidGeometry => -3001,
            DiagnosticCode::TupleCountMismatch => -3002,

            DiagnosticCode::FileNotFound => -4001,
            DiagnosticCode::ReadError => -4002,
            DiagnosticCode::ParseError => -4003,
            DiagnosticCode::WriteError => -4004,

            DiagnosticCode::Cancelled => -5001,
            DiagnosticCode::Internal => -9001,

            DiagnosticCode::ScaleIgnored => -6001,
            DiagnosticCode::DegenerateFaces => -6002,
            DiagnosticCode::UnknownExtension => -6003,
            DiagnosticCode::ReplacedExisting => -6004,
            DiagnosticCode::EmptyStore => -6005,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            DiagnosticCode::UnknownParameter
            | DiagnosticCode::MissingParameter
            | DiagnosticCode::ParameterTypeError
            | DiagnosticCode::OutOfRange
            | DiagnosticCode::InvalidPath
            | DiagnosticCode::EmptyValue
            | DiagnosticCode::PathNotFound
            | DiagnosticCode::DuplicatePath
            | DiagnosticCode::TypeMismatch
            | DiagnosticCode::InvalidPlacement => Category::Validation,
            DiagnosticCode::InvalidGeometry | DiagnosticCode::TupleCountMismatch => {
                Category::DataIntegrity
            }
            DiagnosticCode::FileNotFound
            | DiagnosticCode::ReadError
            | DiagnosticCode::ParseError
            | DiagnosticCode::WriteError => Category::Io,
            DiagnosticCode::Cancelled => Category::Control,
            DiagnosticCode::Internal => Category::Internal,
            DiagnosticCode::ScaleIgnored
            | DiagnosticCode::DegenerateFaces
            | DiagnosticCode::UnknownExtension
            | DiagnosticCode::ReplacedExisting
            | DiagnosticCode::EmptyStore => Category::Advisory,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.value())
    }
}

/// One error or warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    /// Name of the filter that produced the diagnostic, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            filter: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filter {
            Some(filter) => write!(f, "[{}] {}: {}", filter, self.code.value(), self.message),
            None => write!(f, "{}: {}", self.code.value(), self.message),
        }
    }
}

/// Ordered errors and warnings from one filter invocation or a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ExecutionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// A result holding exactly one error.
    pub fn from_error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            errors: vec![Diagnostic::new(code, message)],
            warnings: vec![],
        }
    }

    pub fn push_error(&mut self, code: DiagnosticCode, message: impl Into<String>) {
        self.errors.push(Diagnostic::new(code, message));
    }

    pub fn push_warning(&mut self, code: DiagnosticCode, message: impl Into<String>) {
        self.warnings.push(Diagnostic::new(code, message));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// No errors and no warnings.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Concatenate two results, `a` first, preserving order within each list.
    pub fn merge(mut a: ExecutionResult, b: ExecutionResult) -> ExecutionResult {
        a.extend(b);
        a
    }

    /// Append `other`'s errors and warnings after this result's.
    pub fn extend(&mut self, other: ExecutionResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Stamp `filter` on every diagnostic that has no source yet.
    pub fn with_filter(mut self, filter: &str) -> Self {
        for diag in self.errors.iter_mut().chain(self.warnings.iter_mut()) {
            if diag.filter.is_none() {
                diag.filter = Some(filter.to_string());
            }
        }
        self
    }

    /// Whether any error carries `code`.
    pub fn has_error_code(&self, code: DiagnosticCode) -> bool {
        self.errors.iter().any(|d| d.code == code)
    }

    /// One-line summary for logs and CLI output.
    pub fn summary(&self) -> String {
        format!(
            "{} error(s), {} warning(s)",
            self.errors.len(),
            self.warnings.len()
        )
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        for e in &self.errors {
            writeln!(f, "  error {}", e)?;
        }
        for w in &self.warnings {
            writeln!(f, "  warning {}", w)?;
        }
        Ok(())
    }
}
