//! Error reports and stack capture.

use backtrace::Backtrace;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Maximum number of current-backtrace frames embedded in a report payload.
/// Oversized payloads have tripped transport size limits in the field.
pub const TRACE_LIMIT: usize = 10;

/// Raised when a severity name is not recognized.
#[derive(Error, Debug)]
#[error("Unknown severity: {0}")]
pub struct UnknownSeverity(pub String);

/// Severity of a raised error, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Notice,
    Warning,
    Error,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Warning
    }
}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notice" => Ok(Severity::Notice),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            other => Err(UnknownSeverity(other.to_string())),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Notice => write!(f, "notice"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One resolved backtrace frame.
///
/// Symbol resolution is best-effort; fields stay `None` when the symbol
/// table has nothing for the address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frame {
    pub function: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
}

/// Capture the current backtrace, dropping `skip` leading frames.
///
/// Callers state their own frame count explicitly, so reports never show the
/// reporter's internal plumbing. There is no symbol-name matching: the skip
/// count alone decides what is hidden.
pub fn capture_frames(skip: usize) -> Vec<Frame> {
    let backtrace = Backtrace::new();
    backtrace
        .frames()
        .iter()
        .skip(skip)
        .map(|frame| {
            let symbol = frame.symbols().first();
            Frame {
                function: symbol.and_then(|s| s.name()).map(|name| name.to_string()),
                file: symbol
                    .and_then(|s| s.filename())
                    .map(|path| path.display().to_string()),
                line: symbol.and_then(|s| s.lineno()),
            }
        })
        .collect()
}

/// A runtime error on its way to a reporting channel.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub message: String,
    /// Source file the error originated from
    pub file: String,
    pub line: u32,
    pub severity: Severity,
    /// Frames at the error site, if any were captured
    pub stack: Vec<Frame>,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            message: message.into(),
            file: file.into(),
            line,
            severity: Severity::default(),
            stack: Vec::new(),
        }
    }

    /// Like [`ErrorReport::new`], but records the stack at the error site.
    ///
    /// `skip` is the number of caller frames to drop on top of this
    /// constructor's own.
    pub fn capture(
        message: impl Into<String>,
        file: impl Into<String>,
        line: u32,
        skip: usize,
    ) -> Self {
        let mut report = Self::new(message, file, line);
        // capture_frames itself plus this constructor
        report.stack = capture_frames(skip + 2);
        report
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Replace the error-site stack with frames the host captured itself.
    pub fn with_stack(mut self, stack: Vec<Frame>) -> Self {
        self.stack = stack;
        self
    }

    /// `file:line` origin, the form used in diagnostic log lines.
    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

/// An error as handed over by the host's error channel.
#[derive(Debug, Clone)]
pub struct RaisedError {
    pub severity: Severity,
    pub message: String,
    pub file: String,
    pub line: u32,
    /// Set when the caller explicitly silenced the error. Suppressed errors
    /// are never forwarded to a reporting channel.
    pub suppressed: bool,
}

impl RaisedError {
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        file: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            file: file.into(),
            line,
            suppressed: false,
        }
    }

    /// Mark the error as explicitly silenced by the caller.
    pub fn suppressed(mut self) -> Self {
        self.suppressed = true;
        self
    }
}
