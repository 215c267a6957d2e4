//! A schema-driven PLY (Polygon File Format) loader.
//!
//! PLY files describe their own layout: the header declares each element kind,
//! its count and its ordered properties, then the data section follows in
//! ASCII, big-endian or little-endian binary. Loading is two explicit steps:
//! [`Schema::parse`] reads the header, then [`decode`] replays that schema over
//! the rest of the stream. Nothing is shared between the two but the schema,
//! so independent files can be decoded concurrently.
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//! use plykit::{Mesh, PlySession, DecodeOptions};
//!
//! let ply_data = r#"ply
//! format ascii 1.0
//! comment a single triangle
//! element vertex 3
//! property float x
//! property float y
//! property float z
//! element face 1
//! property list uchar int vertex_indices
//! end_header
//! 0 0 0
//! 1 0 0
//! 0 1 0
//! 3 0 1 2
//! "#;
//!
//! // `None` would mean "not a PLY file, try another loader".
//! let session = PlySession::from_reader(Cursor::new(ply_data))?.unwrap();
//! println!("Found {} vertices", session.schema().get_element("vertex").unwrap().count);
//!
//! let mut mesh = Mesh::default();
//! session.load_into(&mut mesh, &DecodeOptions::default(), ())?;
//! assert_eq!(mesh.polygons, vec![vec![0, 1, 2]]);
//! assert_eq!(mesh.comment.as_deref(), Some("a single triangle"));
//! # Ok::<(), plykit::PlyError>(())
//! ```

pub mod de;
mod error;
mod header;
mod loader;
mod mesh;
mod progress;
mod types;

pub use de::{decode, decode_with_options, for_each_record, DecodeOptions, DEFAULT_CHUNK_SIZE};
pub use error::{LoadError, PlyError};
pub use header::{ElementSpec, Encoding, PropertySpec, RecordLayout, Schema};
pub use loader::{load_path, recognize, PlySession};
pub use mesh::{DecodedFace, DecodedMesh, DecodedVertex, Mesh, MeshBuilder};
pub use progress::{Cancellable, ProgressSink};
pub use types::{PropertyValue, Record, ScalarType, ScalarValue};
