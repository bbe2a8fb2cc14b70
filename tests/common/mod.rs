// Builders for small in-memory PDF documents with embedded file trees.
#![allow(dead_code)]

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

pub fn new_document() -> Document {
    Document::with_version("1.7")
}

/// Add a page tree and a catalog, optionally carrying a `/Names` value.
pub fn attach_catalog(doc: &mut Document, names: Option<Object>) -> ObjectId {
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => Vec::<Object>::new(),
        "Count" => Object::Integer(0),
    });

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if let Some(names) = names {
        catalog.set("Names", names);
    }

    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);
    catalog_id
}

/// Point the catalog's `/Names/EmbeddedFiles` at `tree`.
pub fn attach_tree(doc: &mut Document, tree: Object) -> ObjectId {
    let names_id = doc.add_object(dictionary! { "EmbeddedFiles" => tree });
    attach_catalog(doc, Some(Object::Reference(names_id)))
}

pub fn add_stream(doc: &mut Document, content: &[u8]) -> ObjectId {
    doc.add_object(Stream::new(
        dictionary! { "Type" => "EmbeddedFile" },
        content.to_vec(),
    ))
}

/// A complete file specification: `/F` string plus `/EF /F` stream.
pub fn add_file_spec(doc: &mut Document, spec: &str, content: &[u8]) -> ObjectId {
    let stream_id = add_stream(doc, content);
    doc.add_object(dictionary! {
        "Type" => "Filespec",
        "F" => Object::string_literal(spec),
        "EF" => dictionary! { "F" => stream_id },
    })
}

/// A leaf node dictionary mapping each name to the given value.
pub fn leaf(entries: Vec<(&str, Object)>) -> Dictionary {
    let pairs = entries
        .into_iter()
        .flat_map(|(name, value)| [Object::string_literal(name), value])
        .collect::<Vec<_>>();
    dictionary! { "Names" => pairs }
}

pub fn kids(children: &[ObjectId]) -> Dictionary {
    let kids = children
        .iter()
        .map(|id| Object::Reference(*id))
        .collect::<Vec<_>>();
    dictionary! { "Kids" => kids }
}
