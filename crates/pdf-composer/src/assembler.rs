use crate::error::ComposerError;
use crate::{merge_documents, new_document, InsertPosition};
use lopdf::Document;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A zero-based, half-open range of page indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: usize,
    /// Exclusive. `None` means "through the last page".
    pub end: Option<usize>,
}

impl PageRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end: Some(end) }
    }

    pub fn first_page() -> Self {
        Self::new(0, 1)
    }

    pub fn all() -> Self {
        Self { start: 0, end: None }
    }

    /// Resolves against a document with `page_count` pages. The range must be
    /// non-empty and lie inside the document.
    pub fn resolve(&self, page_count: usize) -> Option<Range<usize>> {
        let end = self.end.unwrap_or(page_count);
        (self.start < end && end <= page_count).then_some(self.start..end)
    }
}

impl Default for PageRange {
    fn default() -> Self {
        Self::first_page()
    }
}

/// A document on disk and the pages it contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub pages: PageRange,
}

impl SourceDocument {
    pub fn new(path: impl Into<PathBuf>, pages: PageRange) -> Self {
        Self { path: path.into(), pages }
    }

    pub fn first_page(path: impl Into<PathBuf>) -> Self {
        Self::new(path, PageRange::first_page())
    }
}

/// How documents after the first are placed in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Every document's pages go after the previous document's pages.
    #[default]
    Concatenate,
    /// The document at input index `n` is inserted at page position `n`. With one
    /// page per document this is the same as `Concatenate`.
    PositionalInsert,
}

/// The result of an assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDocument {
    pub path: PathBuf,
    pub page_count: usize,
    /// Pages contributed by each input, in input order.
    pub contributions: Vec<usize>,
}

/// Merges an ordered list of documents into a single output document.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentAssembler {
    strategy: MergeStrategy,
}

impl DocumentAssembler {
    pub fn new(strategy: MergeStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> MergeStrategy {
        self.strategy
    }

    /// Loads every source and builds the combined document in memory.
    ///
    /// All sources are loaded and their ranges checked before any page is copied,
    /// so a single bad input fails the whole assembly.
    pub fn assemble_document(
        &self,
        documents: &[SourceDocument],
    ) -> Result<(Document, Vec<usize>), ComposerError> {
        if documents.is_empty() {
            return Err(ComposerError::NoDocuments);
        }

        let mut loaded = Vec::with_capacity(documents.len());
        for source in documents {
            let document = Document::load(&source.path).map_err(|e| ComposerError::Load {
                path: source.path.clone(),
                source: e,
            })?;
            let page_count = document.get_pages().len();
            let range = source.pages.resolve(page_count).ok_or_else(|| ComposerError::PageRange {
                path: source.path.clone(),
                start: source.pages.start,
                end: source.pages.end.unwrap_or(page_count),
                page_count,
            })?;
            loaded.push((document, range));
        }

        let mut target = new_document();
        let mut contributions = Vec::with_capacity(loaded.len());
        for (index, (document, range)) in loaded.iter().enumerate() {
            let position = match (index, self.strategy) {
                (0, _) | (_, MergeStrategy::Concatenate) => InsertPosition::Append,
                (n, MergeStrategy::PositionalInsert) => InsertPosition::At(n),
            };
            let inserted = merge_documents(&mut target, document, range.clone(), position)?;
            log::debug!("{}: {} page(s)", documents[index].path.display(), inserted);
            contributions.push(inserted);
        }

        Ok((target, contributions))
    }

    /// Assembles `documents` into `output`, creating or replacing it.
    ///
    /// The output is written to a temporary file in the same directory and renamed
    /// into place, so a failed assembly never leaves a partial file behind.
    pub fn assemble(
        &self,
        documents: &[SourceDocument],
        output: impl AsRef<Path>,
    ) -> Result<AssembledDocument, ComposerError> {
        let output = output.as_ref();
        let (mut document, contributions) = self.assemble_document(documents)?;
        let page_count = document.get_pages().len();

        let save_error = |message: String| ComposerError::Save {
            path: output.to_path_buf(),
            message,
        };
        let directory = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(directory).map_err(|e| save_error(e.to_string()))?;
        document
            .save_to(temp.as_file_mut())
            .map_err(|e| save_error(e.to_string()))?;
        temp.as_file_mut().sync_all()?;
        temp.persist(output).map_err(|e| save_error(e.error.to_string()))?;

        log::info!(
            "Assembled {} document(s) into {} ({} page(s))",
            documents.len(),
            output.display(),
            page_count
        );
        Ok(AssembledDocument {
            path: output.to_path_buf(),
            page_count,
            contributions,
        })
    }
}
