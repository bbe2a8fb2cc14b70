use crate::capabilities::{FilterDecoder, LopdfFilters};
use crate::extraction_engine::ExtractionEngine;
use crate::{EmbeddedFile, ExtractError, ExtractorConfig, Result};
use lopdf::{Dictionary, Document};
use std::path::Path;

// ── PdfAnalyzer ───────────────────────────────────────────────────────────────

/// Owner of a parsed PDF document and entry point for embedded-file access.
///
/// # Creating an analyzer
///
/// ```no_run
/// use pdfembeds::{PdfAnalyzer, ExtractorConfig};
///
/// // From a file path
/// let a = PdfAnalyzer::from_path("invoice.pdf").unwrap();
///
/// // From an in-memory buffer
/// let bytes = std::fs::read("invoice.pdf").unwrap();
/// let a = PdfAnalyzer::from_bytes(&bytes).unwrap();
///
/// // With custom configuration
/// let cfg = ExtractorConfig {
///     max_embedded_file_size: Some(10 * 1024 * 1024),
///     ..Default::default()
/// };
/// let a = PdfAnalyzer::with_config("invoice.pdf", cfg).unwrap();
/// ```
///
/// # Releasing
///
/// [`release`](Self::release) drops the document early. Every later call
/// fails with [`ExtractError::UseAfterRelease`]; files extracted before the
/// release stay usable because [`EmbeddedFile`] owns its data.
pub struct PdfAnalyzer {
    document: Option<Document>,
    config: ExtractorConfig,
    decoder: Box<dyn FilterDecoder + Send + Sync>,
}

impl PdfAnalyzer {
    // ── Constructors ──────────────────────────────────────────────────────────

    /// Load a PDF from the file system.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_config(path, ExtractorConfig::default())
    }

    /// Load a PDF from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(ExtractError::InvalidPdf("input is empty".into()));
        }
        Ok(Self::from_document(Document::load_mem(data)?))
    }

    /// Load a PDF from the file system with a custom [`ExtractorConfig`].
    pub fn with_config<P: AsRef<Path>>(path: P, config: ExtractorConfig) -> Result<Self> {
        let document = Document::load(path)?;
        let mut analyzer = Self::from_document(document);
        analyzer.set_config(config);
        Ok(analyzer)
    }

    /// Wrap an already parsed [`lopdf::Document`].
    pub fn from_document(document: Document) -> Self {
        Self {
            document: Some(document),
            config: ExtractorConfig::default(),
            decoder: Box::new(LopdfFilters),
        }
    }

    /// Replace the active [`ExtractorConfig`].
    pub fn set_config(&mut self, config: ExtractorConfig) {
        self.config = config;
    }

    /// Replace the stream filter decoder (defaults to [`LopdfFilters`]).
    pub fn with_decoder<D>(mut self, decoder: D) -> Self
    where
        D: FilterDecoder + Send + Sync + 'static,
    {
        self.decoder = Box::new(decoder);
        self
    }

    // ── Embedded files ────────────────────────────────────────────────────────

    /// Get the embedded files of this document.
    ///
    /// Returns `Ok(Some(files))` with at least one file, or `Ok(None)` when the
    /// document has no `/Names/EmbeddedFiles` tree or none of its entries
    /// could be extracted. The two cases are deliberately not distinguished.
    pub fn try_get_embedded_files(&self) -> Result<Option<Vec<EmbeddedFile>>> {
        let document = self.document()?;
        let Some(catalog) = Self::catalog(document) else {
            return Ok(None);
        };

        let files = ExtractionEngine::new(document, &*self.decoder, &self.config)
            .extract_all(catalog);

        Ok(if files.is_empty() { None } else { Some(files) })
    }

    /// Extract every embedded file from the document.
    ///
    /// If [`ExtractorConfig::extract_to_disk`] is `true` and
    /// [`ExtractorConfig::output_directory`] is set, each file is also written
    /// to that directory.
    ///
    /// Returns [`ExtractError::NoEmbeddedFiles`] when nothing was extracted.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pdfembeds::PdfAnalyzer;
    ///
    /// let analyzer = PdfAnalyzer::from_path("invoice.pdf").unwrap();
    /// for file in analyzer.extract_embedded_files().unwrap() {
    ///     println!("{} — {} bytes", file.name, file.content.len());
    ///     file.save_to_disk("./out").unwrap();
    /// }
    /// ```
    pub fn extract_embedded_files(&self) -> Result<Vec<EmbeddedFile>> {
        let files = self
            .try_get_embedded_files()?
            .ok_or(ExtractError::NoEmbeddedFiles)?;

        if self.config.extract_to_disk {
            if let Some(ref dir) = self.config.output_directory {
                for file in &files {
                    file.save_to_disk(dir)?;
                }
            }
        }

        Ok(files)
    }

    /// Returns `Ok(true)` when at least one embedded file can be extracted.
    pub fn has_embedded_files(&self) -> Result<bool> {
        Ok(self.try_get_embedded_files()?.is_some())
    }

    /// Returns the number of embedded files that can be extracted.
    pub fn count_embedded_files(&self) -> Result<usize> {
        Ok(self.try_get_embedded_files()?.map_or(0, |files| files.len()))
    }

    /// Names listed in the `/EmbeddedFiles` tree, whether or not their
    /// entries are well formed. Nothing is decoded.
    pub fn embedded_file_names(&self) -> Result<Vec<String>> {
        let document = self.document()?;
        Ok(match Self::catalog(document) {
            Some(catalog) => {
                ExtractionEngine::new(document, &*self.decoder, &self.config)
                    .list_names(catalog)
            }
            None => Vec::new(),
        })
    }

    // ── Lifetime ──────────────────────────────────────────────────────────────

    /// Drop the underlying document. Later calls return
    /// [`ExtractError::UseAfterRelease`]. Releasing twice is a no-op.
    pub fn release(&mut self) {
        if self.document.take().is_some() {
            tracing::debug!("PDF document released");
        }
    }

    pub fn is_released(&self) -> bool {
        self.document.is_none()
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    /// Returns the underlying [`lopdf::Document`].
    pub fn document(&self) -> Result<&Document> {
        self.document.as_ref().ok_or(ExtractError::UseAfterRelease)
    }

    /// Returns the active [`ExtractorConfig`].
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    fn catalog(document: &Document) -> Option<&Dictionary> {
        match document.catalog() {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                tracing::debug!(error = %e, "Document has no usable catalog");
                None
            }
        }
    }
}
