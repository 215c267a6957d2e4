//! Data section decoding.
//!
//! The header fixes the element order, so decoding is a single forward pass:
//! every element kind is read in declaration order with the decoder its
//! encoding selects. [`for_each_record`] hands out every record, while
//! [`decode`] keeps just the vertices and faces.

mod ascii;
mod binary;
mod position;

pub(crate) mod val_reader;

use std::io::BufRead;

use byteorder::{BigEndian, LittleEndian};
use serde::Deserialize;
use tracing::debug;

use crate::mesh::{DecodedFace, DecodedMesh, DecodedVertex};
use crate::{ElementSpec, Encoding, PlyError, ProgressSink, Record, Schema};
use position::PositionedReader;

/// Bytes read per chunk for fixed-width binary elements.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Tunables for decoding the data section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Upper bound on the bytes buffered at once for fixed-width binary elements.
    /// Rounded down to a whole number of records, but never below one record.
    pub chunk_size: usize,
}

impl DecodeOptions {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Decodes every element in schema order, passing each record to `on_record`.
///
/// `reader` must be positioned at `schema.data_offset`. Returns the absolute
/// offset just past the last byte consumed. The first error aborts the pass.
pub fn for_each_record<R, P, F>(
    schema: &Schema,
    reader: R,
    options: &DecodeOptions,
    mut progress: P,
    mut on_record: F,
) -> Result<u64, PlyError>
where
    R: BufRead,
    P: ProgressSink,
    F: FnMut(&ElementSpec, usize, Record) -> Result<(), PlyError>,
{
    let mut reader = PositionedReader::new(reader, schema.data_offset);

    for element in &schema.elements {
        debug!(
            element = %element.name,
            count = element.count,
            layout = ?element.layout(),
            offset = reader.position(),
            "decoding element"
        );
        match schema.encoding {
            Encoding::Ascii => {
                ascii::decode_element(&mut reader, element, &mut progress, &mut on_record)?
            }
            Encoding::BinaryBigEndian => binary::decode_element::<_, BigEndian, _, _>(
                &mut reader,
                element,
                options.chunk_size,
                &mut progress,
                &mut on_record,
            )?,
            Encoding::BinaryLittleEndian => binary::decode_element::<_, LittleEndian, _, _>(
                &mut reader,
                element,
                options.chunk_size,
                &mut progress,
                &mut on_record,
            )?,
        }
    }

    Ok(reader.position())
}

/// Decodes the vertex and face elements with default options.
///
/// # Examples
///
/// ```rust
/// use std::io::Cursor;
/// use plykit::Schema;
///
/// let data = b"ply
/// format ascii 1.0
/// element vertex 1
/// property float x
/// property float y
/// property float z
/// end_header
/// 1.0 2.0 3.0
/// ";
///
/// let mut reader = Cursor::new(&data[..]);
/// let schema = Schema::parse(&mut reader)?;
/// let mesh = plykit::decode(&schema, &mut reader, ())?;
/// assert_eq!(mesh.vertices[0].position(), Some([1.0, 2.0, 3.0]));
/// # Ok::<(), plykit::PlyError>(())
/// ```
pub fn decode<R: BufRead, P: ProgressSink>(
    schema: &Schema,
    reader: R,
    progress: P,
) -> Result<DecodedMesh, PlyError> {
    decode_with_options(schema, reader, &DecodeOptions::default(), progress)
}

/// Decodes the vertex and face elements.
///
/// Other element kinds are still decoded to keep the stream in step, but their
/// values are dropped.
pub fn decode_with_options<R: BufRead, P: ProgressSink>(
    schema: &Schema,
    reader: R,
    options: &DecodeOptions,
    progress: P,
) -> Result<DecodedMesh, PlyError> {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();
    let face_list = schema.get_element("face").map(face_list_index);

    let data_end = for_each_record(schema, reader, options, progress, |element, index, record| {
        match element.name.as_str() {
            "vertex" => vertices.push(DecodedVertex(record)),
            "face" => faces.push(face_from_record(element, index, record, face_list.flatten())?),
            _ => {}
        }
        Ok(())
    })?;

    debug!(
        vertices = vertices.len(),
        faces = faces.len(),
        data_end,
        "decoded mesh"
    );
    Ok(DecodedMesh {
        vertices,
        faces,
        comments: schema.comments.clone(),
        data_end,
    })
}

/// Picks the property holding a face's vertex indices.
fn face_list_index(element: &ElementSpec) -> Option<usize> {
    let lists = || {
        element
            .properties
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_list())
    };
    lists()
        .find(|(_, p)| matches!(p.name(), "vertex_indices" | "vertex_index"))
        .or_else(|| lists().next())
        .map(|(i, _)| i)
}

fn face_from_record(
    element: &ElementSpec,
    index: usize,
    mut record: Record,
    list_index: Option<usize>,
) -> Result<DecodedFace, PlyError> {
    let malformed = |reason: String| PlyError::MalformedRecord {
        element: element.name.clone(),
        index,
        reason,
    };

    let Some(list_index) = list_index else {
        return Err(malformed("face has no vertex index list".to_string()));
    };
    let values = record.swap_remove(list_index);
    let values = values.as_list().unwrap_or_default();

    let name = element.properties[list_index].name();
    values
        .iter()
        .map(|v| {
            v.as_usize()
                .ok_or_else(|| malformed(format!("invalid vertex index {v} in {name}")))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(DecodedFace)
}
