//! PDF composition utilities for assembling documents from page ranges.
//!
//! This crate provides low-level PDF manipulation using lopdf:
//! - Deep object copying with cycle detection
//! - Copying a page range of one document into another at a given position
//! - `DocumentAssembler`, which merges an ordered list of documents into one file

mod assembler;
mod error;

pub use assembler::{AssembledDocument, DocumentAssembler, MergeStrategy, PageRange, SourceDocument};
pub use error::ComposerError;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::collections::{HashMap, HashSet};
use std::ops::Range;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards against malformed page trees whose `/Parent` chain loops.
const MAX_TREE_DEPTH: usize = 64;

/// A helper struct to manage the state of copying objects between documents.
struct ObjectCopier<'a> {
    source_doc: &'a Document,
    target_doc: &'a mut Document,
    id_map: HashMap<ObjectId, ObjectId>,
    /// Source objects that must not be dragged along: page-tree nodes and the pages
    /// that are not being copied. References to them become `null`.
    excluded: HashSet<ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source_doc: &'a Document, target_doc: &'a mut Document, excluded: HashSet<ObjectId>) -> Self {
        Self { source_doc, target_doc, id_map: HashMap::new(), excluded }
    }

    /// Deep copies an object from the source document to the target document.
    /// It recursively copies all referenced objects, ensuring that each object
    /// is only copied once by tracking it in the `id_map`.
    fn copy_object(&mut self, source_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return Ok(*target_id);
        }

        // Reserve the target id before recursing so that cyclic references
        // (e.g. Annot -> P -> Page -> Annots) resolve to it instead of looping.
        let new_id = self.target_doc.add_object(Object::Null);
        self.id_map.insert(source_id, new_id);

        let obj = self.source_doc.get_object(source_id)?.clone();
        let new_obj = self.remap_references(obj)?;
        self.target_doc.objects.insert(new_id, new_obj);

        Ok(new_id)
    }

    /// Copies a page dictionary, detaching it from the source page tree.
    ///
    /// Inherited attributes are written onto the copy so it renders the same
    /// without its original ancestors.
    fn copy_page(&mut self, page_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        let mut page = self.source_doc.get_dictionary(page_id)?.clone();
        for key in INHERITABLE_ATTRIBUTES {
            if !page.has(key) {
                if let Some(value) = inherited_attribute(self.source_doc, &page, key) {
                    page.set(key, value);
                }
            }
        }
        page.remove(b"Parent");

        // A selected page may already have been reached through another page's annotations.
        let new_id = match self.id_map.get(&page_id) {
            Some(id) => *id,
            None => {
                let id = self.target_doc.add_object(Object::Null);
                self.id_map.insert(page_id, id);
                id
            }
        };
        let new_page = self.remap_references(Object::Dictionary(page))?;
        self.target_doc.objects.insert(new_id, new_page);
        Ok(new_id)
    }

    /// Traverses an object and replaces any `Object::Reference` with a new ID
    /// from the target document by recursively calling `copy_object`.
    fn remap_references(&mut self, obj: Object) -> Result<Object, lopdf::Error> {
        match obj {
            Object::Reference(id) if self.excluded.contains(&id) => Ok(Object::Null),
            Object::Reference(id) => Ok(Object::Reference(self.copy_object(id)?)),
            Object::Array(arr) => {
                let new_arr = arr
                    .into_iter()
                    .map(|o| self.remap_references(o))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Object::Array(new_arr))
            }
            Object::Dictionary(dict) => Ok(Object::Dictionary(self.remap_dictionary(dict)?)),
            Object::Stream(mut stream) => {
                stream.dict = self.remap_dictionary(stream.dict)?;
                Ok(Object::Stream(stream))
            }
            _ => Ok(obj), // Primitive objects don't have references
        }
    }

    fn remap_dictionary(&mut self, mut dict: Dictionary) -> Result<Dictionary, lopdf::Error> {
        for (_, value) in dict.iter_mut() {
            *value = self.remap_references(value.clone())?;
        }
        Ok(dict)
    }
}

fn inherited_attribute(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

fn is_page_tree_node(object: &Object) -> bool {
    object
        .as_dict()
        .and_then(|dict| dict.get(b"Type"))
        .and_then(Object::as_name)
        .is_ok_and(|name| name == b"Pages")
}

/// Where copied pages go in the target's page list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Append,
    /// Zero-based index into the target's root `/Kids`; clamped to its length.
    At(usize),
}

/// Creates an empty document with a catalog and a flat, empty page tree.
pub fn new_document() -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => Vec::<Object>::new(),
        "Count" => 0,
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Copies the pages `range` (zero-based, half-open) of `source` into `target`.
///
/// Each page and every object it references is deep-copied with fresh object IDs.
/// Other pages of `source` are not copied, even when referenced from link
/// annotations. Returns the number of pages inserted.
///
/// `position` counts entries of the target's root page node, which are pages for
/// flat page trees such as the ones `new_document` and `DocumentAssembler` build.
pub fn merge_documents(
    target: &mut Document,
    source: &Document,
    range: Range<usize>,
    position: InsertPosition,
) -> Result<usize, ComposerError> {
    let source_pages: Vec<ObjectId> = source.get_pages().into_values().collect();
    if range.start > range.end || range.end > source_pages.len() {
        return Err(ComposerError::Other(format!(
            "Page range {}..{} is outside a document with {} page(s)",
            range.start,
            range.end,
            source_pages.len()
        )));
    }
    let selected = &source_pages[range];
    if selected.is_empty() {
        return Ok(0);
    }

    let mut excluded: HashSet<ObjectId> = source_pages
        .iter()
        .filter(|id| !selected.contains(id))
        .copied()
        .collect();
    excluded.extend(
        source
            .objects
            .iter()
            .filter(|(_, object)| is_page_tree_node(object))
            .map(|(id, _)| *id),
    );

    let mut copier = ObjectCopier::new(source, target, excluded);
    let mut copied_page_ids = Vec::with_capacity(selected.len());
    for page_id in selected {
        copied_page_ids.push(copier.copy_page(*page_id)?);
    }

    // Now, manipulate the page tree in the target document
    let root_id = target.trailer.get(b"Root")?.as_reference()?;
    let pages_id = target.get_dictionary(root_id)?.get(b"Pages")?.as_reference()?;
    let pages_dict = target.get_object_mut(pages_id)?.as_dict_mut()?;

    let mut kids = pages_dict.get(b"Kids")?.as_array()?.clone();
    let original_count = pages_dict.get(b"Count")?.as_i64()?;

    let insert_at = match position {
        InsertPosition::Append => kids.len(),
        InsertPosition::At(index) => index.min(kids.len()),
    };
    for (offset, id) in copied_page_ids.iter().enumerate() {
        kids.insert(insert_at + offset, Object::Reference(*id));
    }

    pages_dict.set("Kids", Object::Array(kids));
    pages_dict.set("Count", original_count + copied_page_ids.len() as i64);

    // Parent references in the copied page objects need to point to the target's page tree.
    for page_id in &copied_page_ids {
        if let Ok(Object::Dictionary(page_dict)) = target.get_object_mut(*page_id) {
            page_dict.set("Parent", Object::Reference(pages_id));
        }
    }

    log::debug!(
        "Copied {} page(s) into position {} of the target",
        copied_page_ids.len(),
        insert_at
    );
    Ok(copied_page_ids.len())
}
