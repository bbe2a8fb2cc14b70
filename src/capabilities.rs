//! The two document capabilities the extraction core consumes: dereferencing
//! an object number, and decoding a stream's filter chain.

use crate::{ExtractError, Result};
use flate2::read::ZlibDecoder;
use lopdf::filters::png;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::io::Read;

/// Looks up the object bearing a given object number.
///
/// Implementations dereference exactly once; the returned object may itself
/// be a reference, which callers treat as a resolution failure.
pub trait ObjectResolver {
    fn resolve_object(&self, id: ObjectId) -> Option<&Object>;
}

impl ObjectResolver for Document {
    fn resolve_object(&self, id: ObjectId) -> Option<&Object> {
        // Not `get_object`: that follows whole reference chains.
        self.objects.get(&id)
    }
}

/// Turns a stream's raw bytes into its logical content by applying the
/// stream's declared `/Filter` chain.
pub trait FilterDecoder {
    fn decode(&self, stream: &Stream) -> Result<Vec<u8>>;
}

/// [`FilterDecoder`] backed by flate2 and lopdf's filter implementations.
///
/// A stream with no `/Filter` (or an empty filter array) is returned as-is.
/// `FlateDecode` is inflated with flate2 so a corrupt or truncated stream is
/// reported instead of yielding partial output; its PNG predictor, and every
/// other filter, go through lopdf.
///
/// `/DecodeParms` may be a dictionary or an array parallel to `/Filter`.
/// Both must be direct objects: the decoder sees only the stream, so an
/// indirect `/Filter` is a decode failure and an indirect `/DecodeParms`
/// entry is treated as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfFilters;

impl FilterDecoder for LopdfFilters {
    fn decode(&self, stream: &Stream) -> Result<Vec<u8>> {
        let filters = match stream.dict.get(b"Filter") {
            Err(_) => return Ok(stream.content.clone()),
            Ok(Object::Name(name)) => vec![name.as_slice()],
            Ok(Object::Array(items)) => items
                .iter()
                .map(|item| item.as_name())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| ExtractError::DecodeFailure("/Filter array holds a non-name".into()))?,
            Ok(other) => {
                return Err(ExtractError::DecodeFailure(format!(
                    "/Filter is {}, expected a name or array",
                    other.enum_variant()
                )))
            }
        };

        let mut data = stream.content.clone();
        for (i, filter) in filters.iter().enumerate() {
            let params = decode_params(stream, i);
            data = match *filter {
                b"FlateDecode" => inflate(&data, params)?,
                other => decode_with_lopdf(other, data, params)?,
            };
        }
        Ok(data)
    }
}

/// The `/DecodeParms` dictionary belonging to filter `index`. A single
/// dictionary applies to every filter in the chain.
fn decode_params(stream: &Stream, index: usize) -> Option<&Dictionary> {
    match stream.dict.get(b"DecodeParms").ok()? {
        Object::Dictionary(params) => Some(params),
        Object::Array(per_filter) => per_filter.get(index)?.as_dict().ok(),
        _ => None,
    }
}

fn inflate(input: &[u8], params: Option<&Dictionary>) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }

    let mut output = Vec::with_capacity(input.len() * 2);
    ZlibDecoder::new(input)
        .read_to_end(&mut output)
        .map_err(|e| ExtractError::DecodeFailure(format!("FlateDecode: {e}")))?;

    apply_png_predictor(output, params)
}

fn apply_png_predictor(data: Vec<u8>, params: Option<&Dictionary>) -> Result<Vec<u8>> {
    let Some(params) = params else {
        return Ok(data);
    };
    let int = |key: &[u8], default: i64| {
        params.get(key).and_then(Object::as_i64).unwrap_or(default)
    };

    match int(b"Predictor", 1) {
        1 => Ok(data),
        10..=15 => {
            let columns = int(b"Columns", 1).max(1) as usize;
            let colors = int(b"Colors", 1).max(1) as usize;
            let bits = int(b"BitsPerComponent", 8).max(8) as usize;
            png::decode_frame(&data, colors * bits / 8, columns)
                .map_err(|e| ExtractError::DecodeFailure(format!("PNG predictor: {e}")))
        }
        other => Err(ExtractError::DecodeFailure(format!("unsupported predictor {other}"))),
    }
}

fn decode_with_lopdf(filter: &[u8], data: Vec<u8>, params: Option<&Dictionary>) -> Result<Vec<u8>> {
    let mut dict = dictionary! { "Filter" => Object::Name(filter.to_vec()) };
    if let Some(params) = params {
        dict.set("DecodeParms", params.clone());
    }

    Stream::new(dict, data).decompressed_content().map_err(|e| {
        ExtractError::DecodeFailure(format!("{}: {e}", String::from_utf8_lossy(filter)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn unfiltered_stream_is_identity() {
        let stream = Stream::new(Dictionary::new(), vec![0x25, 0x50, 0x44, 0x46]);
        assert_eq!(LopdfFilters.decode(&stream).unwrap(), b"%PDF");
    }

    #[test]
    fn empty_filter_array_is_identity() {
        let stream = Stream::new(
            dictionary! { "Filter" => Object::Array(vec![]) },
            b"raw".to_vec(),
        );
        assert_eq!(LopdfFilters.decode(&stream).unwrap(), b"raw");
    }

    #[test]
    fn document_lookup_is_single_hop() {
        let mut doc = Document::with_version("1.7");
        let target = doc.add_object(Object::Integer(7));
        let hop = doc.add_object(Object::Reference(target));

        assert!(matches!(
            doc.resolve_object(hop),
            Some(Object::Reference(id)) if *id == target
        ));
        assert!(doc.resolve_object((999, 0)).is_none());
    }

    #[test]
    fn flate_with_per_filter_params_array() {
        // PNG "Up" predictor rows: each row is [2, delta...] against the row above.
        let rows = [2u8, 1, 2, 3, 2, 1, 1, 1];
        let stream = Stream::new(
            dictionary! {
                "Filter" => vec![Object::Name(b"FlateDecode".to_vec())],
                "DecodeParms" => vec![Object::Dictionary(dictionary! {
                    "Predictor" => Object::Integer(12),
                    "Columns" => Object::Integer(3),
                })],
            },
            zlib(&rows),
        );
        assert_eq!(LopdfFilters.decode(&stream).unwrap(), [1u8, 2, 3, 2, 3, 4]);
    }

    #[test]
    fn corrupt_flate_is_a_decode_failure() {
        let stream = Stream::new(
            dictionary! { "Filter" => "FlateDecode" },
            b"\x78\x9cgarbage-not-zlib".to_vec(),
        );
        assert!(matches!(
            LopdfFilters.decode(&stream),
            Err(ExtractError::DecodeFailure(_))
        ));
    }

    #[test]
    fn truncated_flate_is_a_decode_failure() {
        let mut compressed = zlib(&b"truncated payload ".repeat(64));
        compressed.truncate(compressed.len() / 2);
        let stream = Stream::new(dictionary! { "Filter" => "FlateDecode" }, compressed);
        assert!(matches!(
            LopdfFilters.decode(&stream),
            Err(ExtractError::DecodeFailure(_))
        ));
    }

    #[test]
    fn ascii85_then_flate_chain() {
        let stream = Stream::new(
            dictionary! {
                "Filter" => vec![
                    Object::Name(b"ASCII85Decode".to_vec()),
                    Object::Name(b"FlateDecode".to_vec()),
                ],
            },
            ascii85(&zlib(b"chained")),
        );
        assert_eq!(LopdfFilters.decode(&stream).unwrap(), b"chained");
    }

    fn ascii85(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        for chunk in data.chunks(4) {
            let mut group = [0u8; 4];
            group[..chunk.len()].copy_from_slice(chunk);
            let mut value = u32::from_be_bytes(group);
            let mut digits = [0u8; 5];
            for digit in digits.iter_mut().rev() {
                *digit = (value % 85) as u8 + b'!';
                value /= 85;
            }
            out.extend_from_slice(&digits[..chunk.len() + 1]);
        }
        out.extend_from_slice(b"~>");
        out
    }
}
