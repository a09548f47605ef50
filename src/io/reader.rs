//! Weighted item list reader.
//!
//! A source holds one item per line. A line may carry a quantity after the
//! separator (`Island;4`), which expands to that many consecutive copies of the
//! item in the output. Reading is fail-soft: bad sources and malformed quantities
//! are reported to the configured [`DiagnosticSink`] and never returned as errors.

use std::collections::TryReserveError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::core::config::ImportConfig;
use crate::core::diagnostics::{Diagnostic, DiagnosticSink, Severity, TeeSink, TracingSink};
use crate::core::lines::{split_fields, RawLines};

/// Items read from one or more sources together with what went wrong on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Flattened items, in source order
    pub items: Vec<String>,
    /// Every diagnostic reported while reading, in report order
    pub diagnostics: Vec<Diagnostic>,
}

impl ImportReport {
    /// Whether part or all of the input could not be read.
    ///
    /// An empty, non-degraded report means the input was legitimately empty.
    pub fn is_degraded(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity() == Severity::Error)
    }

    /// Diagnostics about values that were defaulted while the read still completed.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity() == Severity::Warning)
    }

    /// Append the items and diagnostics of `other`, keeping their order.
    pub fn append(&mut self, other: ImportReport) {
        self.items.extend(other.items);
        self.diagnostics.extend(other.diagnostics);
    }

    /// Drop the diagnostics and keep the items.
    pub fn into_items(self) -> Vec<String> {
        self.items
    }
}

/// Reads weighted item lists from single sources.
#[derive(Clone)]
pub struct ItemReader {
    separator: String,
    sink: Arc<dyn DiagnosticSink>,
}

impl ItemReader {
    /// Reader splitting quantities off with `separator`, reporting through `tracing`.
    ///
    /// An empty separator disables quantity annotations: every line is an item.
    /// Without a `tracing` subscriber the diagnostics are discarded; use
    /// [`with_sink`](Self::with_sink) to keep them.
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            sink: Arc::new(TracingSink),
        }
    }

    /// Reader using the configured separator.
    pub fn from_config(config: &ImportConfig) -> Self {
        Self::new(config.separator.clone())
    }

    /// Report diagnostics to `sink` instead.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Separator between an item and its quantity.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Read the items of the file at `source`.
    ///
    /// Returns an empty list when `source` is a directory or cannot be opened, and
    /// the items read so far when reading fails part way through.
    pub fn read(&self, source: impl AsRef<Path>) -> Vec<String> {
        let mut items = Vec::new();
        self.read_into(source.as_ref(), &*self.sink, &mut items);
        items
    }

    /// Like [`read`](Self::read), also returning the diagnostics of this call.
    pub fn read_with_report(&self, source: impl AsRef<Path>) -> ImportReport {
        let tee = TeeSink::new(&*self.sink);
        let mut items = Vec::new();
        self.read_into(source.as_ref(), &tee, &mut items);
        ImportReport {
            items,
            diagnostics: tee.into_diagnostics(),
        }
    }

    /// Read the items of an already opened stream. `origin` names it in diagnostics.
    pub fn read_from<R: BufRead>(&self, reader: R, origin: impl AsRef<Path>) -> Vec<String> {
        let mut items = Vec::new();
        self.parse_stream(reader, origin.as_ref(), &*self.sink, &mut items);
        items
    }

    pub(crate) fn sink(&self) -> &dyn DiagnosticSink {
        &*self.sink
    }

    pub(crate) fn read_into(
        &self,
        source: &Path,
        sink: &dyn DiagnosticSink,
        items: &mut Vec<String>,
    ) {
        if source.is_dir() {
            sink.report(Diagnostic::SourceIsDirectory {
                path: source.to_path_buf(),
            });
            return;
        }

        let file = match File::open(source) {
            Ok(file) => file,
            Err(e) => {
                sink.report(Diagnostic::SourceUnavailable {
                    path: source.to_path_buf(),
                    reason: e.to_string(),
                });
                return;
            }
        };

        let before = items.len();
        self.parse_stream(BufReader::new(file), source, sink, items);
        debug!(
            "Read {} items from {}",
            items.len() - before,
            source.display()
        );
    }

    fn parse_stream<R: BufRead>(
        &self,
        reader: R,
        origin: &Path,
        sink: &dyn DiagnosticSink,
        items: &mut Vec<String>,
    ) {
        for (index, raw) in RawLines::new(reader).enumerate() {
            let line_number = index + 1;
            let raw = match raw {
                Ok(raw) => raw,
                Err(e) => {
                    sink.report(Diagnostic::ReadInterrupted {
                        path: origin.to_path_buf(),
                        line: line_number,
                        reason: e.to_string(),
                    });
                    return;
                }
            };

            let line = match String::from_utf8(raw) {
                Ok(line) => line,
                Err(e) => {
                    sink.report(Diagnostic::InvalidEncoding {
                        path: origin.to_path_buf(),
                        line: line_number,
                    });
                    String::from_utf8_lossy(e.as_bytes()).into_owned()
                }
            };

            let (item, quantity) = self.parse_line(&line, line_number, origin, sink);
            if let Err(e) = expand_into(items, item.as_str(), quantity) {
                sink.report(Diagnostic::QuantityTooLarge {
                    path: origin.to_path_buf(),
                    line: line_number,
                    quantity,
                    item,
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Split one decoded line into its item and quantity.
    ///
    /// Only a line that splits into exactly two fields is annotated. Anything else,
    /// including a line whose item itself contains the separator, is taken verbatim.
    fn parse_line(
        &self,
        line: &str,
        line_number: usize,
        origin: &Path,
        sink: &dyn DiagnosticSink,
    ) -> (String, usize) {
        match split_fields(line, &self.separator).as_slice() {
            [item, token] => {
                let quantity = match token.parse::<i32>() {
                    Ok(quantity) => usize::try_from(quantity).unwrap_or_else(|_| {
                        sink.report(Diagnostic::NegativeQuantity {
                            path: origin.to_path_buf(),
                            line: line_number,
                            quantity,
                            item: (*item).to_string(),
                        });
                        1
                    }),
                    Err(_) => {
                        sink.report(Diagnostic::InvalidQuantity {
                            path: origin.to_path_buf(),
                            line: line_number,
                            token: (*token).to_string(),
                            item: (*item).to_string(),
                        });
                        1
                    }
                };
                ((*item).to_string(), quantity)
            }
            _ => (line.to_string(), 1),
        }
    }
}

/// Append `quantity` copies of `item`.
///
/// Room is reserved up front, so a quantity too large to hold fails here and
/// leaves `items` untouched.
fn expand_into(
    items: &mut Vec<String>,
    item: &str,
    quantity: usize,
) -> std::result::Result<(), TryReserveError> {
    items.try_reserve(quantity)?;
    items.extend(iter::repeat_with(|| item.to_string()).take(quantity));
    Ok(())
}

/// Read the items of `source` with `separator`, reporting through `tracing`.
pub fn read_items(source: impl AsRef<Path>, separator: &str) -> Vec<String> {
    ItemReader::new(separator).read(source)
}
