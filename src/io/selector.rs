//! Directory entry selection.

use std::path::Path;

/// Decides which entries of a directory take part in a batch read.
pub trait EntrySelector {
    /// Whether the entry called `name` inside `directory` should be read.
    fn accept(&self, directory: &Path, name: &str) -> bool;
}

impl<F> EntrySelector for F
where
    F: Fn(&Path, &str) -> bool,
{
    fn accept(&self, directory: &Path, name: &str) -> bool {
        self(directory, name)
    }
}

/// Accepts entries whose name ends with one of a set of extensions, ignoring case.
///
/// This is a plain suffix match: `txt` accepts `deck.txt` but also `decktxt`.
/// Include the dot (`.txt`) to require it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    accepted: Vec<String>,
}

impl ExtensionFilter {
    /// Filter accepting any of `extensions`.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            accepted: extensions
                .into_iter()
                .map(|extension| extension.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Accepted extensions, lowercased.
    pub fn extensions(&self) -> &[String] {
        &self.accepted
    }
}

impl EntrySelector for ExtensionFilter {
    fn accept(&self, _directory: &Path, name: &str) -> bool {
        let name = name.to_lowercase();
        self.accepted
            .iter()
            .any(|extension| name.ends_with(extension.as_str()))
    }
}
