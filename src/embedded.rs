use lopdf::Stream;
use std::io;
use std::path::Path;

// ── EmbeddedFile ─────────────────────────────────────────────────────────────

/// A file that was embedded inside a PDF document.
///
/// Returned by [`crate::PdfAnalyzer::try_get_embedded_files`]. The record is
/// an owned snapshot: it stays valid after the analyzer is released.
#[derive(Debug, Clone)]
pub struct EmbeddedFile {
    /// The key under which the file appears in the `/EmbeddedFiles` name tree.
    pub name: String,

    /// The file specification string (`/F` of the file specification
    /// dictionary), or an empty string when the document does not give one.
    pub description: String,

    /// The decoded file content.
    pub content: Vec<u8>,

    /// The embedded file stream the content was decoded from.
    pub source_stream: Stream,
}

impl EmbeddedFile {
    /// Write this file into `output_dir`, creating the directory if necessary.
    ///
    /// Only the final path component of [`name`](Self::name) is used, so a
    /// name such as `../../etc/passwd` is written as `passwd` inside
    /// `output_dir`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pdfembeds::PdfAnalyzer;
    ///
    /// let analyzer = PdfAnalyzer::from_path("invoice.pdf").unwrap();
    /// for file in analyzer.extract_embedded_files().unwrap() {
    ///     file.save_to_disk("./extracted").unwrap();
    /// }
    /// ```
    pub fn save_to_disk<P: AsRef<Path>>(&self, output_dir: P) -> io::Result<()> {
        let file_name = Path::new(&self.name).file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("embedded file name {:?} has no file component", self.name),
            )
        })?;

        let dir = output_dir.as_ref();
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(file_name), &self.content)
    }

    /// Returns the file extension of the name, or `None` if it has none.
    ///
    /// ```
    /// # use pdfembeds::EmbeddedFile;
    /// # let file = EmbeddedFile {
    /// #     name: "factur-x.xml".into(),
    /// #     description: String::new(),
    /// #     content: vec![],
    /// #     source_stream: lopdf::Stream::new(lopdf::Dictionary::new(), vec![]),
    /// # };
    /// assert_eq!(file.extension(), Some("xml"));
    /// ```
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.name).extension().and_then(|e| e.to_str())
    }

    /// Returns `true` when the file's extension matches `ext`
    /// (case-insensitive comparison).
    pub fn has_extension(&self, ext: &str) -> bool {
        self.extension()
            .map(|e| e.eq_ignore_ascii_case(ext))
            .unwrap_or(false)
    }
}
