//! Out-of-band diagnostics for fail-soft operations.
//!
//! Readers, the dumper and the fetch helper never return errors for environmental
//! failures. Instead every recovered condition becomes a [`Diagnostic`] handed to a
//! [`DiagnosticSink`]. The default sink forwards to `tracing`; tests and callers
//! that need to tell "legitimately empty" apart from "failed" collect them.

use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// How bad a recovered condition is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, the result is complete
    Info,
    /// Recovered at line granularity, the result is complete but a value was defaulted
    Warning,
    /// Part or all of the result is missing
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A recovered condition reported by one of the fail-soft components.
///
/// Field names are self-describing: `path` is the source or target involved,
/// `line` a 1-based line number and `reason` the underlying error message.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A directory was given where a single source file was expected
    SourceIsDirectory { path: PathBuf },
    /// The source does not exist or could not be opened
    SourceUnavailable { path: PathBuf, reason: String },
    /// Reading stopped part way through the source
    ReadInterrupted {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    /// A line was not valid UTF-8 and was decoded lossily
    InvalidEncoding { path: PathBuf, line: usize },
    /// The quantity token of an annotated line is not an integer
    InvalidQuantity {
        path: PathBuf,
        line: usize,
        token: String,
        item: String,
    },
    /// The quantity token of an annotated line is a negative integer
    NegativeQuantity {
        path: PathBuf,
        line: usize,
        quantity: i32,
        item: String,
    },
    /// The quantity of an annotated line is too large to hold in memory
    QuantityTooLarge {
        path: PathBuf,
        line: usize,
        quantity: usize,
        item: String,
        reason: String,
    },
    /// A directory was expected but the path is something else
    NotADirectory { path: PathBuf },
    /// Directory enumeration failed part way through
    EnumerationFailed { path: PathBuf, reason: String },
    /// No entry of the directory satisfied the selector
    NoMatchingEntries { path: PathBuf },
    /// A dump target was a directory and was redirected to the fallback file
    DumpRedirected { from: PathBuf, to: PathBuf },
    /// One line could not be written to the dump target
    LineWriteFailed { line: String, reason: String },
    /// The dump target could not be opened; the lines follow as `RecoveredLine`s
    SinkUnavailable { path: PathBuf, reason: String },
    /// A dump line emitted to the diagnostic channel for manual recovery
    RecoveredLine { line: String },
    /// Flushing or closing a handle failed
    ReleaseFailed { path: PathBuf, reason: String },
    /// The request URL could not be parsed
    MalformedUrl { url: String },
    /// The request could not be sent, returned an error status or could not be read
    RequestFailed { url: String, reason: String },
}

impl Diagnostic {
    /// Severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        match self {
            Self::NoMatchingEntries { .. } | Self::DumpRedirected { .. } => Severity::Info,
            Self::InvalidEncoding { .. }
            | Self::InvalidQuantity { .. }
            | Self::NegativeQuantity { .. }
            | Self::ReleaseFailed { .. } => Severity::Warning,
            Self::SourceIsDirectory { .. }
            | Self::SourceUnavailable { .. }
            | Self::ReadInterrupted { .. }
            | Self::QuantityTooLarge { .. }
            | Self::NotADirectory { .. }
            | Self::EnumerationFailed { .. }
            | Self::LineWriteFailed { .. }
            | Self::SinkUnavailable { .. }
            | Self::RecoveredLine { .. }
            | Self::MalformedUrl { .. }
            | Self::RequestFailed { .. } => Severity::Error,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceIsDirectory { path } => write!(
                f,
                "'{}' is a directory, not a file. Returning an empty list as result.",
                path.display()
            ),
            Self::SourceUnavailable { path, reason } => write!(
                f,
                "Couldn't open '{}' ({reason}). Returning an empty list as result.",
                path.display()
            ),
            Self::ReadInterrupted { path, line, reason } => write!(
                f,
                "Error '{reason}' when reading '{}' at line {line}. List is probably incomplete.",
                path.display()
            ),
            Self::InvalidEncoding { path, line } => write!(
                f,
                "Line {line} of '{}' is not valid UTF-8. Invalid bytes were replaced.",
                path.display()
            ),
            Self::InvalidQuantity {
                line, token, item, ..
            } => write!(
                f,
                "Invalid quantity '{token}' for '{item}' in line {line}. Defaulting quantity to 1."
            ),
            Self::NegativeQuantity {
                line,
                quantity,
                item,
                ..
            } => write!(
                f,
                "Negative quantity '{quantity}' for '{item}' in line {line}. Defaulting quantity to 1."
            ),
            Self::QuantityTooLarge {
                line,
                quantity,
                item,
                reason,
                ..
            } => write!(
                f,
                "Quantity '{quantity}' for '{item}' in line {line} can not be held ({reason}). Skipping the line, list is incomplete."
            ),
            Self::NotADirectory { path } => write!(
                f,
                "'{}' is no directory. Returning an empty list as result.",
                path.display()
            ),
            Self::EnumerationFailed { path, reason } => write!(
                f,
                "Error '{reason}' when listing '{}'. List is probably incomplete.",
                path.display()
            ),
            Self::NoMatchingEntries { path } => {
                write!(f, "No entry in '{}' matched the selector.", path.display())
            }
            Self::DumpRedirected { to, .. } => write!(
                f,
                "Can not dump to directory. Attempting to dump into fallback file '{}'.",
                to.display()
            ),
            Self::LineWriteFailed { line, reason } => write!(
                f,
                "Could not write '{line}' to file because an error occurred: '{reason}'. Attempting to proceed with further lines."
            ),
            Self::SinkUnavailable { path, reason } => write!(
                f,
                "Could not access file '{}' because an error occurred: '{reason}'. Dumping contents to the diagnostic stream:",
                path.display()
            ),
            Self::RecoveredLine { line } => write!(f, "{line}"),
            Self::ReleaseFailed { path, reason } => write!(
                f,
                "Error when trying to release '{}': '{reason}'",
                path.display()
            ),
            Self::MalformedUrl { url } => write!(f, "Malformed URL '{url}'."),
            Self::RequestFailed { url, reason } => write!(
                f,
                "Failed to read the response for '{url}': '{reason}'."
            ),
        }
    }
}

/// Receiver of recovered conditions.
///
/// Implementations must not fail; a sink that cannot deliver a diagnostic drops it.
pub trait DiagnosticSink: Send + Sync {
    /// Record one diagnostic.
    fn report(&self, diagnostic: Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn report(&self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn report(&self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

/// Default sink: forwards every diagnostic to `tracing`.
///
/// Nothing is kept when no subscriber is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        let severity = diagnostic.severity();
        match severity {
            Severity::Info => info!(target: "feeder::diagnostics", %severity, "{diagnostic}"),
            Severity::Warning => warn!(target: "feeder::diagnostics", %severity, "{diagnostic}"),
            Severity::Error => error!(target: "feeder::diagnostics", %severity, "{diagnostic}"),
        }
    }
}

/// Writes one plain line per diagnostic to a writer.
///
/// Recovered dump lines are written verbatim so they can be copied back out.
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl WriterSink<io::Stderr> {
    /// Sink writing to the process' standard error.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> WriterSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> DiagnosticSink for WriterSink<W> {
    fn report(&self, diagnostic: Diagnostic) {
        let mut writer = self.writer.lock();
        let written = match &diagnostic {
            Diagnostic::RecoveredLine { line } => writeln!(writer, "{line}"),
            other => writeln!(writer, "{}: {other}", other.severity()),
        };
        // Nowhere left to report a failing diagnostic writer.
        let _ = written.and_then(|()| writer.flush());
    }
}

/// Keeps every diagnostic in memory, in report order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything collected so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Drain everything collected so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }

    /// Number of diagnostics collected.
    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    /// Whether nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }
}

/// Collects diagnostics for a report while forwarding them to another sink.
pub(crate) struct TeeSink<'a> {
    forward: &'a dyn DiagnosticSink,
    collected: CollectingSink,
}

impl<'a> TeeSink<'a> {
    pub(crate) fn new(forward: &'a dyn DiagnosticSink) -> Self {
        Self {
            forward,
            collected: CollectingSink::new(),
        }
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.collected.diagnostics.into_inner()
    }
}

impl DiagnosticSink for TeeSink<'_> {
    fn report(&self, diagnostic: Diagnostic) {
        self.collected.report(diagnostic.clone());
        self.forward.report(diagnostic);
    }
}
