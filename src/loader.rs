//! File-level recognition and loading.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{info, warn};

use crate::{
    de, DecodeOptions, DecodedMesh, LoadError, Mesh, MeshBuilder, PlyError, ProgressSink, Schema,
};

/// Parses the header, mapping "not a PLY file" to `Ok(None)`.
///
/// Any error returned means the input *is* PLY but its header is broken.
pub fn recognize<R: BufRead>(reader: R) -> Result<Option<Schema>, PlyError> {
    match Schema::parse(reader) {
        Ok(schema) => Ok(Some(schema)),
        Err(e) if e.is_format_mismatch() => Ok(None),
        Err(e) => Err(e),
    }
}

/// A recognized PLY stream, positioned at its first data byte.
///
/// The session owns the stream. Decoding consumes the session, so the stream
/// is closed exactly once whether decoding succeeds or not.
#[derive(Debug)]
pub struct PlySession<R> {
    schema: Schema,
    reader: R,
}

impl PlySession<BufReader<File>> {
    /// Opens `path` and parses its header. Returns `Ok(None)` if it isn't PLY.
    pub fn open(path: impl AsRef<Path>) -> Result<Option<Self>, PlyError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: BufRead> PlySession<R> {
    pub fn from_reader(mut reader: R) -> Result<Option<Self>, PlyError> {
        let Some(schema) = recognize(&mut reader)? else {
            return Ok(None);
        };
        info!(
            encoding = %schema.encoding,
            elements = schema.elements.len(),
            data_offset = schema.data_offset,
            "recognized PLY header"
        );
        Ok(Some(Self { schema, reader }))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn decode<P: ProgressSink>(
        self,
        options: &DecodeOptions,
        progress: P,
    ) -> Result<DecodedMesh, PlyError> {
        de::decode_with_options(&self.schema, self.reader, options, progress)
    }

    /// Decodes the data section and feeds the result to `builder`.
    pub fn load_into<B, P>(
        self,
        builder: &mut B,
        options: &DecodeOptions,
        mut progress: P,
    ) -> Result<(), PlyError>
    where
        B: MeshBuilder,
        P: ProgressSink,
    {
        let decoded = self.decode(options, &mut progress)?;
        decoded.build_into(builder, &mut progress)
    }
}

/// Loads `path` into a [`Mesh`]. Returns `Ok(None)` when the file isn't PLY.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_path<P: ProgressSink>(
    path: impl AsRef<Path>,
    options: &DecodeOptions,
    progress: P,
) -> Result<Option<Mesh>, LoadError> {
    let path = path.as_ref();
    let load = || -> Result<Option<Mesh>, PlyError> {
        let Some(session) = PlySession::open(path)? else {
            return Ok(None);
        };
        let mut mesh = Mesh::default();
        session.load_into(&mut mesh, options, progress)?;
        Ok(Some(mesh))
    };

    match load() {
        Ok(Some(mesh)) => {
            info!(
                points = mesh.points.len(),
                polygons = mesh.polygons.len(),
                "loaded PLY mesh"
            );
            Ok(Some(mesh))
        }
        Ok(None) => Ok(None),
        Err(source) => {
            warn!("Failed to load PLY file: {}", source);
            Err(LoadError {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}
