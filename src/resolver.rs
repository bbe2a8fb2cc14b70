//! One-hop, shape-checked resolution of possibly indirect values.
//!
//! Every lookup in the extraction pipeline goes through [`resolve`]: a direct
//! value of the expected shape passes through untouched, a reference is
//! dereferenced once, and anything else (dangling reference, wrong type,
//! reference to a reference) comes back as `None`.

use crate::capabilities::ObjectResolver;
use crate::pdf_utils::decode_text_string;
use lopdf::{Dictionary, Object, Stream};

/// An expected shape for a resolved object.
pub trait Shape<'a>: Sized {
    /// Human-readable shape name, used in diagnostics.
    const NAME: &'static str;

    /// Returns `Some` when `object` has this shape.
    fn from_object(object: &'a Object) -> Option<Self>;
}

impl<'a> Shape<'a> for &'a Dictionary {
    const NAME: &'static str = "dictionary";

    fn from_object(object: &'a Object) -> Option<Self> {
        match object {
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }
}

impl<'a> Shape<'a> for &'a Stream {
    const NAME: &'static str = "stream";

    fn from_object(object: &'a Object) -> Option<Self> {
        match object {
            Object::Stream(stream) => Some(stream),
            _ => None,
        }
    }
}

impl<'a> Shape<'a> for &'a [Object] {
    const NAME: &'static str = "array";

    fn from_object(object: &'a Object) -> Option<Self> {
        match object {
            Object::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

/// A string-carrying token: either a PDF string or a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfText<'a>(pub &'a [u8]);

impl PdfText<'_> {
    /// Decode the raw bytes as a PDF text string.
    pub fn to_text_string(self) -> String {
        decode_text_string(self.0)
    }
}

impl<'a> Shape<'a> for PdfText<'a> {
    const NAME: &'static str = "string";

    fn from_object(object: &'a Object) -> Option<Self> {
        match object {
            Object::String(bytes, _) | Object::Name(bytes) => Some(PdfText(bytes)),
            _ => None,
        }
    }
}

/// Resolve `object` to a value of shape `T`.
///
/// References are followed exactly once through `source`.
pub fn resolve<'a, T, R>(source: &'a R, object: &'a Object) -> Option<T>
where
    T: Shape<'a>,
    R: ObjectResolver + ?Sized,
{
    match object {
        Object::Reference(id) => {
            let target = source.resolve_object(*id)?;
            if let Object::Reference(next) = target {
                tracing::debug!(from = ?id, to = ?next, "Refusing second-order reference");
                return None;
            }
            T::from_object(target)
        }
        direct => T::from_object(direct),
    }
}

/// Look up `key` in `dict` and resolve it to shape `T`.
///
/// A missing key and a value of the wrong shape are both `None`.
pub fn resolve_key<'a, T, R>(source: &'a R, dict: &'a Dictionary, key: &[u8]) -> Option<T>
where
    T: Shape<'a>,
    R: ObjectResolver + ?Sized,
{
    let value = dict.get(key).ok()?;
    let resolved = resolve::<T, R>(source, value);
    if resolved.is_none() {
        tracing::debug!(
            key = %String::from_utf8_lossy(key),
            expected = T::NAME,
            "Value is missing or has the wrong shape"
        );
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Document, StringFormat};

    #[test]
    fn direct_value_passes_through() {
        let doc = Document::with_version("1.7");
        let value = Object::Dictionary(dictionary! { "Type" => "Filespec" });
        let dict: &Dictionary = resolve(&doc, &value).unwrap();
        assert!(dict.has(b"Type"));
    }

    #[test]
    fn reference_is_followed_once() {
        let mut doc = Document::with_version("1.7");
        let id = doc.add_object(Stream::new(Dictionary::new(), b"x".to_vec()));
        let reference = Object::Reference(id);
        let stream: Option<&Stream> = resolve(&doc, &reference);
        assert_eq!(stream.unwrap().content, b"x");
    }

    #[test]
    fn shape_mismatch_is_none() {
        let mut doc = Document::with_version("1.7");
        let id = doc.add_object(Object::Integer(42));
        let reference = Object::Reference(id);
        assert!(resolve::<&Dictionary, _>(&doc, &reference).is_none());
    }

    #[test]
    fn dangling_reference_is_none() {
        let doc = Document::with_version("1.7");
        let reference = Object::Reference((77, 0));
        assert!(resolve::<&Dictionary, _>(&doc, &reference).is_none());
    }

    #[test]
    fn second_order_reference_is_none() {
        let mut doc = Document::with_version("1.7");
        let inner = doc.add_object(Dictionary::new());
        let outer = doc.add_object(Object::Reference(inner));
        let reference = Object::Reference(outer);
        assert!(resolve::<&Dictionary, _>(&doc, &reference).is_none());
    }

    #[test]
    fn text_accepts_strings_and_names() {
        let doc = Document::with_version("1.7");
        let literal = Object::String(b"Annual Report".to_vec(), StringFormat::Literal);
        let name = Object::Name(b"Report".to_vec());

        let text: PdfText = resolve(&doc, &literal).unwrap();
        assert_eq!(text.to_text_string(), "Annual Report");
        let text: PdfText = resolve(&doc, &name).unwrap();
        assert_eq!(text.to_text_string(), "Report");
        assert!(resolve::<PdfText, _>(&doc, &Object::Integer(1)).is_none());
    }

    #[test]
    fn resolve_key_missing_key_is_none() {
        let doc = Document::with_version("1.7");
        let dict = dictionary! { "F" => Object::Integer(1) };
        assert!(resolve_key::<&Stream, _>(&doc, &dict, b"EF").is_none());
        assert!(resolve_key::<&Stream, _>(&doc, &dict, b"F").is_none());
    }
}
