//! Batch reading of every selected file in a directory.

use std::path::Path;

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::core::config::ImportConfig;
use crate::core::diagnostics::{Diagnostic, DiagnosticSink, TeeSink};
use crate::io::reader::{ImportReport, ItemReader};
use crate::io::selector::EntrySelector;

/// Concatenates the items of every selected entry of a directory.
///
/// Entries are read in the order the file system lists them, which differs
/// between platforms and even between runs. Enable [`sorted`](Self::sorted) when
/// the output order has to be reproducible.
#[derive(Clone)]
pub struct DirectoryReader {
    reader: ItemReader,
    sort_entries: bool,
}

impl DirectoryReader {
    /// Batch reader parsing every selected entry with `reader`.
    ///
    /// Diagnostics go to the sink configured on `reader`.
    pub fn new(reader: ItemReader) -> Self {
        Self {
            reader,
            sort_entries: false,
        }
    }

    /// Batch reader built from the import configuration.
    pub fn from_config(config: &ImportConfig) -> Self {
        Self::new(ItemReader::from_config(config)).sorted(config.sort_entries)
    }

    /// Read entries in file name order instead of file system order.
    #[must_use]
    pub fn sorted(mut self, sort_entries: bool) -> Self {
        self.sort_entries = sort_entries;
        self
    }

    /// Reader used for each selected entry.
    pub fn item_reader(&self) -> &ItemReader {
        &self.reader
    }

    /// Read every entry of `directory` accepted by `selector`.
    ///
    /// Returns an empty list when `directory` is not a directory. A failing entry
    /// only loses its own items.
    pub fn read_all<S>(&self, directory: impl AsRef<Path>, selector: &S) -> Vec<String>
    where
        S: EntrySelector + ?Sized,
    {
        let mut items = Vec::new();
        self.read_all_into(directory.as_ref(), selector, self.reader.sink(), &mut items);
        items
    }

    /// Like [`read_all`](Self::read_all), also returning the diagnostics of this call.
    pub fn read_all_with_report<S>(&self, directory: impl AsRef<Path>, selector: &S) -> ImportReport
    where
        S: EntrySelector + ?Sized,
    {
        let tee = TeeSink::new(self.reader.sink());
        let mut items = Vec::new();
        self.read_all_into(directory.as_ref(), selector, &tee, &mut items);
        ImportReport {
            items,
            diagnostics: tee.into_diagnostics(),
        }
    }

    fn read_all_into<S>(
        &self,
        directory: &Path,
        selector: &S,
        sink: &dyn DiagnosticSink,
        items: &mut Vec<String>,
    ) where
        S: EntrySelector + ?Sized,
    {
        if !directory.is_dir() {
            sink.report(Diagnostic::NotADirectory {
                path: directory.to_path_buf(),
            });
            return;
        }

        let mut walker = WalkDir::new(directory).min_depth(1).max_depth(1);
        if self.sort_entries {
            walker = walker.sort_by_file_name();
        }

        let mut selected = 0usize;
        let mut failed = false;
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    failed = true;
                    sink.report(Diagnostic::EnumerationFailed {
                        path: directory.to_path_buf(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy();
            if !selector.accept(directory, &name) {
                debug!("Skipping {}", entry.path().display());
                continue;
            }

            selected += 1;
            self.reader.read_into(entry.path(), sink, items);
        }

        if selected == 0 && !failed {
            sink.report(Diagnostic::NoMatchingEntries {
                path: directory.to_path_buf(),
            });
        }

        info!(
            "Read {} items from {} entries of {}",
            items.len(),
            selected,
            directory.display()
        );
    }
}

/// Read every entry of `directory` accepted by `selector` with `separator`,
/// reporting through `tracing`.
pub fn read_directory<S>(directory: impl AsRef<Path>, selector: &S, separator: &str) -> Vec<String>
where
    S: EntrySelector + ?Sized,
{
    DirectoryReader::new(ItemReader::new(separator)).read_all(directory, selector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::CollectingSink;
    use crate::io::selector::ExtensionFilter;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn batch_with_sink() -> (DirectoryReader, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        let reader = ItemReader::new(";").with_sink(sink.clone());
        (DirectoryReader::new(reader).sorted(true), sink)
    }

    #[test]
    fn test_reads_selected_files_in_name_order() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.txt"), "Island;2\n").unwrap();
        fs::write(temp_dir.path().join("a.TXT"), "Sol Ring\n").unwrap();
        fs::write(temp_dir.path().join("notes.md"), "ignored\n").unwrap();
        let (batch, sink) = batch_with_sink();

        let items = batch.read_all(temp_dir.path(), &ExtensionFilter::new(["txt"]));

        assert_eq!(items, vec!["Sol Ring", "Island", "Island"]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_unsorted_read_keeps_every_item() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("one.txt"), "A\nB\n").unwrap();
        fs::write(temp_dir.path().join("two.txt"), "C;2\n").unwrap();
        let (batch, _sink) = batch_with_sink();

        let mut items = batch
            .sorted(false)
            .read_all(temp_dir.path(), &ExtensionFilter::new(["txt"]));
        items.sort();

        assert_eq!(items, vec!["A", "B", "C", "C"]);
    }

    #[test]
    fn test_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("deck.txt");
        fs::write(&file, "Island\n").unwrap();
        let (batch, _sink) = batch_with_sink();

        let report = batch.read_all_with_report(&file, &ExtensionFilter::new(["txt"]));

        assert!(report.items.is_empty());
        assert!(report.is_degraded());
        assert!(matches!(
            report.diagnostics.as_slice(),
            [Diagnostic::NotADirectory { .. }]
        ));
    }

    #[test]
    fn test_empty_directory_reports_no_matches_only() {
        let temp_dir = TempDir::new().unwrap();
        let (batch, _sink) = batch_with_sink();

        let report = batch.read_all_with_report(temp_dir.path(), &ExtensionFilter::new(["txt"]));

        assert!(report.items.is_empty());
        assert!(!report.is_degraded());
        assert!(matches!(
            report.diagnostics.as_slice(),
            [Diagnostic::NoMatchingEntries { .. }]
        ));
    }

    #[test]
    fn test_selected_subdirectory_is_skipped_with_diagnostic() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("archive.txt")).unwrap();
        fs::write(temp_dir.path().join("deck.txt"), "Forest;abc\n").unwrap();
        let (batch, sink) = batch_with_sink();

        let items = batch.read_all(temp_dir.path(), &ExtensionFilter::new(["txt"]));

        assert_eq!(items, vec!["Forest"]);
        assert!(matches!(
            sink.diagnostics().as_slice(),
            [
                Diagnostic::SourceIsDirectory { .. },
                Diagnostic::InvalidQuantity { .. }
            ]
        ));
    }

    #[test]
    fn test_closure_selector_receives_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("main.deck"), "Island\n").unwrap();
        fs::write(temp_dir.path().join("side.deck"), "Swamp\n").unwrap();
        let (batch, _sink) = batch_with_sink();
        let root = temp_dir.path().to_path_buf();

        let selector = |directory: &Path, name: &str| directory == root && name.starts_with("main");
        let items = batch.read_all(temp_dir.path(), &selector);

        assert_eq!(items, vec!["Island"]);
    }

    #[test]
    fn test_read_directory_convenience() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("deck.tsv"), "Island\t3\n").unwrap();

        let items = read_directory(temp_dir.path(), &ExtensionFilter::new(["tsv"]), "\t");
        assert_eq!(items, vec!["Island"; 3]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unlistable_directory_reports_enumeration_failure() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let locked = temp_dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("deck.txt"), "Island\n").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not bind a privileged user.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let (batch, _sink) = batch_with_sink();
        let report = batch.read_all_with_report(&locked, &ExtensionFilter::new(["txt"]));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(report.items.is_empty());
        assert!(report.is_degraded());
        assert!(matches!(
            report.diagnostics.as_slice(),
            [Diagnostic::EnumerationFailed { .. }]
        ));
    }
}
