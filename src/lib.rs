//! # Feeder-RS: Weighted Item List Import and Dump
//!
//! Reads line-oriented item lists in which any line may carry a quantity
//! (`Island;4`) and flattens them into ordered sequences of item identifiers, with
//! each identifier repeated once per unit of quantity. The inverse direction dumps a
//! sequence back to a text file, one item per CR+LF terminated line.
//!
//! Every operation is fail-soft: missing files, directories where files were
//! expected, malformed quantities and unwritable targets degrade to partial or empty
//! results and are reported to an injectable [`DiagnosticSink`] rather than
//! returned as errors.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────┐   per file   ┌──────────────┐
//! │  DirectoryReader   │ ───────────▶ │  ItemReader  │
//! │ (EntrySelector)    │              └──────┬───────┘
//! └────────────────────┘                     │ Vec<String>
//!                                            ▼
//!                                   ┌─────────────────┐
//!                                   │ SequenceDumper  │
//!                                   └─────────────────┘
//!
//!  RequestSender (GET + ResponseValidator) stands alone.
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use feeder_rs::{read_directory, dump_items, ExtensionFilter};
//!
//! let items = read_directory("./decks", &ExtensionFilter::new(["tsv"]), "\t");
//! dump_items("./out", &items);
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types shared by every component
pub mod core {
    //! Errors, diagnostics, configuration and line handling.

    pub mod config;
    pub mod diagnostics;
    pub mod errors;
    pub mod lines;
}

// File import and dump
pub mod io {
    //! Reading item lists from files and directories, and dumping them back.

    pub mod batch;
    pub mod dumper;
    pub mod reader;
    pub mod selector;
}

// Network helpers
pub mod net {
    //! Fetch-and-validate over HTTP.

    pub mod request;
}

// Re-export primary types for convenience
pub use crate::core::config::FeederConfig;
pub use crate::core::diagnostics::{
    CollectingSink, Diagnostic, DiagnosticSink, Severity, TracingSink, WriterSink,
};
pub use crate::core::errors::{FeederError, Result};
pub use crate::io::batch::{read_directory, DirectoryReader};
pub use crate::io::dumper::{dump_items, DumpReport, SequenceDumper};
pub use crate::io::reader::{read_items, ImportReport, ItemReader};
pub use crate::io::selector::{EntrySelector, ExtensionFilter};
pub use crate::net::request::{ContainsText, NonEmptyBody, RequestSender, ResponseValidator};
