use crate::capabilities::{FilterDecoder, ObjectResolver};
use crate::name_tree::{flatten_name_tree, FlattenedNames};
use crate::resolver::{resolve, resolve_key, PdfText};
use crate::{EmbeddedFile, ExtractError, ExtractorConfig};
use lopdf::{Dictionary, Object, Stream};
use thiserror::Error;

/// Why a single name tree entry was left out of the result.
#[derive(Error, Debug)]
pub(crate) enum SkipReason {
    #[error("value does not resolve to a file specification dictionary")]
    NotAFileSpec,

    #[error("file specification has no /EF dictionary")]
    MissingEf,

    #[error("/EF dictionary has no /F stream")]
    MissingStream,

    #[error("{0}")]
    Decode(#[source] ExtractError),

    #[error("decoded content is {size} bytes, limit is {limit}")]
    SizeExceeded { size: usize, limit: usize },
}

/// Walks Catalog → `/Names` → `/EmbeddedFiles` → file specification →
/// `/EF` → `/F` and assembles the embedded files it finds.
///
/// ```text
/// Catalog
///   /Names <<
///       /EmbeddedFiles <name tree>        ← flattened
///           (report.txt) → <<
///               /Type /Filespec
///               /F    (Annual Report)     ← description
///               /EF   << /F <stream-ref> >>
///           >>
///   >>
/// ```
///
/// Every step that finds missing or mis-shaped structure ends quietly: for
/// the tree as a whole that yields an empty result, for one entry it drops
/// only that entry.
pub struct ExtractionEngine<'a, R: ?Sized> {
    source: &'a R,
    decoder: &'a dyn FilterDecoder,
    config: &'a ExtractorConfig,
}

impl<'a, R> ExtractionEngine<'a, R>
where
    R: ObjectResolver + ?Sized,
{
    pub fn new(source: &'a R, decoder: &'a dyn FilterDecoder, config: &'a ExtractorConfig) -> Self {
        Self {
            source,
            decoder,
            config,
        }
    }

    /// Extract every well-formed embedded file reachable from `catalog`.
    ///
    /// Returns an empty vector both when the document has no embedded file
    /// tree and when every entry in it is malformed.
    pub fn extract_all(&self, catalog: &'a Dictionary) -> Vec<EmbeddedFile> {
        let names = self.flatten(catalog);
        if names.is_empty() {
            return Vec::new();
        }

        let mut files = Vec::with_capacity(names.len());
        for (name, value) in names {
            match self.extract_entry(&name, value) {
                Ok(file) => files.push(file),
                Err(reason @ (SkipReason::Decode(_) | SkipReason::SizeExceeded { .. })) => {
                    tracing::warn!(name = %name, reason = %reason, "Skipping embedded file");
                }
                Err(reason) => {
                    tracing::debug!(name = %name, reason = %reason, "Skipping embedded file entry");
                }
            }
        }

        tracing::debug!(extracted = files.len(), "Embedded file extraction finished");
        files
    }

    /// Names of all entries in the embedded file tree, without resolving them.
    pub fn list_names(&self, catalog: &'a Dictionary) -> Vec<String> {
        self.flatten(catalog).names().map(str::to_owned).collect()
    }

    fn flatten(&self, catalog: &'a Dictionary) -> FlattenedNames<'a> {
        match self.embedded_files_tree(catalog) {
            Some(root) => flatten_name_tree(self.source, root, self.config.max_name_tree_nodes),
            None => FlattenedNames::new(),
        }
    }

    fn embedded_files_tree(&self, catalog: &'a Dictionary) -> Option<&'a Dictionary> {
        let names = resolve_key::<&Dictionary, _>(self.source, catalog, b"Names")?;
        resolve_key::<&Dictionary, _>(self.source, names, b"EmbeddedFiles")
    }

    fn extract_entry(&self, name: &str, value: &'a Object) -> Result<EmbeddedFile, SkipReason> {
        let file_spec =
            resolve::<&Dictionary, _>(self.source, value).ok_or(SkipReason::NotAFileSpec)?;
        let ef = resolve_key::<&Dictionary, _>(self.source, file_spec, b"EF")
            .ok_or(SkipReason::MissingEf)?;
        let stream = resolve_key::<&Stream, _>(self.source, ef, b"F")
            .ok_or(SkipReason::MissingStream)?;

        let description = resolve_key::<PdfText, _>(self.source, file_spec, b"F")
            .map(|text| text.to_text_string())
            .unwrap_or_default();

        let content = self.decoder.decode(stream).map_err(SkipReason::Decode)?;

        if let Some(limit) = self.config.max_embedded_file_size {
            if content.len() > limit {
                return Err(SkipReason::SizeExceeded {
                    size: content.len(),
                    limit,
                });
            }
        }

        Ok(EmbeddedFile {
            name: name.to_owned(),
            description,
            content,
            source_stream: stream.clone(),
        })
    }
}
