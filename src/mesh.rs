//! Decoded geometry and the hand-off to whatever builds the host's mesh.

use serde::Serialize;
use tracing::debug;

use crate::{PlyError, ProgressSink, PropertyValue, Record};

/// One vertex record, property values in declaration order.
///
/// Only the first three values are read as a position. Any further properties
/// (normals, colors, ...) are kept here but not used when building geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedVertex(pub Record);

impl DecodedVertex {
    pub fn values(&self) -> &[PropertyValue] {
        &self.0
    }

    /// The first three values as a position, if they are all scalars.
    pub fn position(&self) -> Option<[f64; 3]> {
        match self.0.as_slice() {
            [x, y, z, ..] => Some([
                x.as_scalar()?.as_f64(),
                y.as_scalar()?.as_f64(),
                z.as_scalar()?.as_f64(),
            ]),
            _ => None,
        }
    }
}

/// Zero-based vertex indices of one face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedFace(pub Vec<usize>);

impl DecodedFace {
    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

/// Vertices, faces and header comments read from one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedMesh {
    pub vertices: Vec<DecodedVertex>,
    pub faces: Vec<DecodedFace>,
    pub comments: Vec<String>,
    /// Absolute offset just past the last byte of the data section that was read.
    pub data_end: u64,
}

/// Receives decoded geometry and turns it into the host's own mesh.
pub trait MeshBuilder {
    type PointId: Copy;

    fn add_point(&mut self, position: [f64; 3]) -> Self::PointId;

    fn add_polygon(&mut self, points: &[Self::PointId]);

    /// Called once with all header comments joined by newlines.
    fn set_comment(&mut self, comment: &str);
}

impl DecodedMesh {
    /// Feeds points, then polygons, then the comment annotation to `builder`.
    ///
    /// Progress is initialized once for the points and once for the polygons.
    /// Fails if a vertex has no position or a face points past the last vertex.
    pub fn build_into<B, P>(&self, builder: &mut B, mut progress: P) -> Result<(), PlyError>
    where
        B: MeshBuilder,
        P: ProgressSink,
    {
        progress.initialize(self.vertices.len());
        let mut points = Vec::with_capacity(self.vertices.len());
        for (vertex, decoded) in self.vertices.iter().enumerate() {
            let position = decoded
                .position()
                .ok_or(PlyError::MissingPosition { vertex })?;
            points.push(builder.add_point(position));
            progress.increment(1);
        }

        progress.initialize(self.faces.len());
        let mut polygon = Vec::new();
        for (face, decoded) in self.faces.iter().enumerate() {
            polygon.clear();
            for &index in decoded.indices() {
                let point = points
                    .get(index)
                    .ok_or(PlyError::FaceIndexOutOfRange {
                        face,
                        index,
                        vertex_count: points.len(),
                    })?;
                polygon.push(*point);
            }
            builder.add_polygon(&polygon);
            progress.increment(1);
        }

        if !self.comments.is_empty() {
            builder.set_comment(&self.comments.join("\n"));
        }

        debug!(
            points = points.len(),
            polygons = self.faces.len(),
            "built mesh"
        );
        Ok(())
    }
}

/// A plain indexed polygon mesh.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Mesh {
    pub points: Vec<[f64; 3]>,
    pub polygons: Vec<Vec<usize>>,
    pub comment: Option<String>,
}

impl MeshBuilder for Mesh {
    type PointId = usize;

    fn add_point(&mut self, position: [f64; 3]) -> usize {
        self.points.push(position);
        self.points.len() - 1
    }

    fn add_polygon(&mut self, points: &[usize]) {
        self.polygons.push(points.to_vec());
    }

    fn set_comment(&mut self, comment: &str) {
        self.comment = Some(comment.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScalarValue;

    fn vertex(x: f32, y: f32, z: f32) -> DecodedVertex {
        DecodedVertex(vec![
            PropertyValue::Scalar(ScalarValue::Float(x)),
            PropertyValue::Scalar(ScalarValue::Float(y)),
            PropertyValue::Scalar(ScalarValue::Float(z)),
            PropertyValue::Scalar(ScalarValue::UChar(255)),
        ])
    }

    #[test]
    fn test_position_uses_first_three_values() {
        assert_eq!(vertex(1.0, 2.0, 3.0).position(), Some([1.0, 2.0, 3.0]));

        let short = DecodedVertex(vec![PropertyValue::Scalar(ScalarValue::Int(1))]);
        assert_eq!(short.position(), None);
    }

    #[test]
    fn test_build_into_mesh() {
        let decoded = DecodedMesh {
            vertices: vec![
                vertex(0.0, 0.0, 0.0),
                vertex(1.0, 0.0, 0.0),
                vertex(0.0, 1.0, 0.0),
            ],
            faces: vec![DecodedFace(vec![0, 1, 2]), DecodedFace(vec![])],
            comments: vec!["made by hand".into(), "triangle".into()],
            data_end: 0,
        };

        let mut mesh = Mesh::default();
        decoded.build_into(&mut mesh, ()).unwrap();
        assert_eq!(mesh.points.len(), 3);
        assert_eq!(mesh.polygons, vec![vec![0, 1, 2], vec![]]);
        assert_eq!(mesh.comment.as_deref(), Some("made by hand\ntriangle"));
    }

    #[test]
    fn test_build_rejects_dangling_index() {
        let decoded = DecodedMesh {
            vertices: vec![vertex(0.0, 0.0, 0.0)],
            faces: vec![DecodedFace(vec![0, 3])],
            comments: vec![],
            data_end: 0,
        };

        let err = decoded.build_into(&mut Mesh::default(), ()).unwrap_err();
        assert!(matches!(
            err,
            PlyError::FaceIndexOutOfRange {
                face: 0,
                index: 3,
                vertex_count: 1
            }
        ));
    }
}
