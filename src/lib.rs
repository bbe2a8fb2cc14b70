//! # pdfembeds
//!
//! Extract the files embedded in a PDF document through its
//! `/Names/EmbeddedFiles` name tree (PDF 32000-1 §7.11.4).
//!
//! ## What this crate does
//!
//! 1. **Resolve** — follows indirect references exactly one hop, checking that
//!    the target has the expected shape (dictionary, stream, array, string).
//! 2. **Flatten** — walks a name tree of any depth into a flat name → value
//!    mapping, iteratively, with a visited set so cyclic `/Kids` terminate.
//! 3. **Assemble** — for every name tree entry resolves
//!    file specification → `/EF` → `/F` stream, decodes the stream and
//!    returns an [`EmbeddedFile`]. Malformed entries are skipped, never fatal.
//!
//! ## Quick example
//!
//! ```no_run
//! use pdfembeds::PdfAnalyzer;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let analyzer = PdfAnalyzer::from_path("invoice.pdf")?;
//!
//! if let Some(files) = analyzer.try_get_embedded_files()? {
//!     for file in files {
//!         println!("  {} ({}) {} bytes", file.name, file.description, file.content.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

mod analyzer;
mod capabilities;
mod embedded;
mod extraction_engine;
mod name_tree;
mod pdf_utils;
mod resolver;

pub use analyzer::PdfAnalyzer;
pub use capabilities::{FilterDecoder, LopdfFilters, ObjectResolver};
pub use embedded::EmbeddedFile;
pub use extraction_engine::ExtractionEngine;
pub use name_tree::{flatten_name_tree, FlattenedNames};
pub use pdf_utils::decode_text_string;
pub use resolver::{resolve, resolve_key, PdfText, Shape};

// ── Configuration ────────────────────────────────────────────────────────────

/// Default cap on the number of distinct name tree nodes visited per walk.
pub const DEFAULT_MAX_NAME_TREE_NODES: usize = 65_536;

/// Runtime configuration for [`PdfAnalyzer`] and [`ExtractionEngine`].
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Upper bound on distinct name tree nodes visited while flattening.
    /// Traversal stops (keeping what was collected) once it is reached.
    pub max_name_tree_nodes: usize,

    /// If set, an embedded file whose decoded content exceeds this byte count
    /// is dropped from the result like any other malformed entry.
    pub max_embedded_file_size: Option<usize>,

    /// If `true` and `output_directory` is also set, each extracted file is
    /// written to disk by [`PdfAnalyzer::extract_embedded_files`].
    pub extract_to_disk: bool,

    /// Directory used when `extract_to_disk` is `true`.
    pub output_directory: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_name_tree_nodes: DEFAULT_MAX_NAME_TREE_NODES,
            max_embedded_file_size: None,
            extract_to_disk: false,
            output_directory: None,
        }
    }
}

// ── Error type ───────────────────────────────────────────────────────────────

/// Every error that this crate can surface to a caller.
///
/// Missing or mis-typed structure inside the document is not an error: it
/// shows up as an empty result. Only failures outside the document graph
/// (I/O, unparsable input) and use of a released document are reported.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// A filesystem I/O error occurred (e.g. when loading or saving a file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input bytes do not form a structurally valid PDF document.
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// The document contains no usable embedded files.
    #[error("No embedded files found in this PDF")]
    NoEmbeddedFiles,

    /// A stream's filter chain could not be decoded.
    #[error("Failed to decode stream: {0}")]
    DecodeFailure(String),

    /// The owning document was released before this call.
    #[error("PDF document has already been released")]
    UseAfterRelease,

    /// The underlying lopdf parser returned an error.
    #[error("PDF parse error: {0}")]
    ParseError(#[from] lopdf::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, ExtractError>;
