//! Writing item sequences back to text files.
//!
//! The dump format is one item per line, UTF-8, each line terminated by CR+LF on
//! every platform. Dumping never fails the caller: when the target cannot be
//! written at all, every item is handed to the diagnostic sink so nothing is lost.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::core::config::{DumpConfig, DEFAULT_DUMP_FILE_NAME};
use crate::core::diagnostics::{Diagnostic, DiagnosticSink, TeeSink, TracingSink};

/// Terminator written after every dumped item.
pub const LINE_TERMINATOR: &str = "\r\n";

/// What a dump call did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpReport {
    /// File the dump was written to (after any directory redirect)
    pub target: PathBuf,
    /// Items written to `target`
    pub lines_written: usize,
    /// Items whose write failed
    pub failed_lines: usize,
    /// Whether `target` could not be opened and the items went to the diagnostic sink
    pub recovered_to_diagnostics: bool,
    /// Every diagnostic reported during the dump
    pub diagnostics: Vec<Diagnostic>,
}

impl DumpReport {
    /// Whether every item ended up in the target file.
    pub fn is_complete(&self) -> bool {
        !self.recovered_to_diagnostics && self.failed_lines == 0
    }
}

/// Serializes item sequences to files.
#[derive(Clone)]
pub struct SequenceDumper {
    fallback_file_name: String,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for SequenceDumper {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceDumper {
    /// Dumper using the default fallback file name, reporting through `tracing`.
    ///
    /// Without an installed `tracing` subscriber every diagnostic is discarded,
    /// including the [`Diagnostic::RecoveredLine`]s that carry the items of a dump
    /// whose target could not be opened. Callers without a subscriber should pass a
    /// [`WriterSink`](crate::core::diagnostics::WriterSink) to
    /// [`with_sink`](Self::with_sink).
    pub fn new() -> Self {
        Self {
            fallback_file_name: DEFAULT_DUMP_FILE_NAME.to_string(),
            sink: Arc::new(TracingSink),
        }
    }

    /// Dumper built from the dump configuration.
    pub fn from_config(config: &DumpConfig) -> Self {
        Self::new().with_fallback_file_name(config.fallback_file_name.clone())
    }

    /// Use `name` as the file created inside a directory target.
    #[must_use]
    pub fn with_fallback_file_name(mut self, name: impl Into<String>) -> Self {
        self.fallback_file_name = name.into();
        self
    }

    /// Report diagnostics to `sink` instead.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// File a dump to `path` is written to.
    ///
    /// A directory is replaced by the fallback file inside it, once; the result is
    /// never checked again.
    pub fn resolve_target(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_dir() {
            path.join(&self.fallback_file_name)
        } else {
            path.to_path_buf()
        }
    }

    /// Write `items` to `path`, one per line, replacing any previous content.
    pub fn dump<S: AsRef<str>>(&self, path: impl AsRef<Path>, items: &[S]) {
        self.dump_into(path.as_ref(), items, &*self.sink);
    }

    /// Like [`dump`](Self::dump), also returning what happened.
    pub fn dump_with_report<S: AsRef<str>>(&self, path: impl AsRef<Path>, items: &[S]) -> DumpReport {
        let tee = TeeSink::new(&*self.sink);
        let (target, lines_written, failed_lines, recovered_to_diagnostics) =
            self.dump_into(path.as_ref(), items, &tee);
        DumpReport {
            target,
            lines_written,
            failed_lines,
            recovered_to_diagnostics,
            diagnostics: tee.into_diagnostics(),
        }
    }

    fn dump_into<S: AsRef<str>>(
        &self,
        path: &Path,
        items: &[S],
        sink: &dyn DiagnosticSink,
    ) -> (PathBuf, usize, usize, bool) {
        let target = self.resolve_target(path);
        if target != path {
            sink.report(Diagnostic::DumpRedirected {
                from: path.to_path_buf(),
                to: target.clone(),
            });
        }

        let mut file = match File::create(&target) {
            Ok(file) => file,
            Err(e) => {
                sink.report(Diagnostic::SinkUnavailable {
                    path: target.clone(),
                    reason: e.to_string(),
                });
                for item in items {
                    sink.report(Diagnostic::RecoveredLine {
                        line: item.as_ref().to_string(),
                    });
                }
                return (target, 0, 0, true);
            }
        };

        let (written, failed) = write_lines(&mut file, items, sink);
        release(&mut file, &target, sink);

        debug!("Dumped {} lines to {}", written, target.display());
        (target, written, failed, false)
    }
}

/// Handle that can push written data down to the storage device.
trait Durable {
    fn sync(&mut self) -> io::Result<()>;
}

impl Durable for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Write every item as one terminated line, returning `(written, failed)`.
///
/// Each line is written and flushed on its own, so a failure is always reported
/// against the line that was lost and only lines that reached the writer count as
/// written.
fn write_lines<W: Write, S: AsRef<str>>(
    writer: &mut W,
    items: &[S],
    sink: &dyn DiagnosticSink,
) -> (usize, usize) {
    let mut written = 0;
    let mut failed = 0;
    let mut line = String::new();
    for item in items {
        let item = item.as_ref();
        line.clear();
        line.push_str(item);
        line.push_str(LINE_TERMINATOR);

        match writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.flush())
        {
            Ok(()) => written += 1,
            Err(e) => {
                failed += 1;
                sink.report(Diagnostic::LineWriteFailed {
                    line: item.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
    (written, failed)
}

fn release<D: Durable>(handle: &mut D, target: &Path, sink: &dyn DiagnosticSink) {
    match handle.sync() {
        Ok(()) => {}
        // EINVAL: the target cannot be synced at all (pipes, character devices).
        Err(e) if e.kind() == io::ErrorKind::InvalidInput => {
            debug!("{} does not support syncing: {}", target.display(), e);
        }
        Err(e) => sink.report(Diagnostic::ReleaseFailed {
            path: target.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

/// Write `items` to `path` with the default fallback file name, reporting through
/// `tracing`. See [`SequenceDumper::new`] for what that means without a subscriber.
pub fn dump_items<S: AsRef<str>>(path: impl AsRef<Path>, items: &[S]) {
    SequenceDumper::new().dump(path, items);
}
