//! core::geometry
//!
//! Triangle mesh geometry.
//!
//! # Invariants
//!
//! - Every face index references an existing vertex (checked at construction)
//! - Per-vertex and per-face data live in child attribute matrices whose
//!   names are recorded here; the store checks their tuple counts

use std::collections::HashMap;

use thiserror::Error;

/// Errors from geometry validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: usize,
        vertex_count: usize,
    },

    #[error("edge ({a}, {b}) is shared by {count} faces; mesh is not manifold")]
    NonManifoldEdge { a: usize, b: usize, count: usize },
}

/// A triangle mesh: shared vertex list plus triangle connectivity.
///
/// # Example
///
/// ```
/// use meshpipe::core::geometry::TriangleGeometry;
///
/// let tri = TriangleGeometry::new(
///     vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
///     vec![[0, 1, 2]],
/// )
/// .unwrap();
/// assert_eq!(tri.vertex_count(), 3);
/// assert_eq!(tri.face_count(), 1);
///
/// assert!(TriangleGeometry::new(vec![[0.0; 3]], vec![[0, 1, 2]]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleGeometry {
    vertices: Vec<[f32; 3]>,
    faces: Vec<[usize; 3]>,
    vertex_data: Option<String>,
    face_data: Option<String>,
}

impl TriangleGeometry {
    /// Create a geometry, checking that all face indices are in range.
    pub fn new(vertices: Vec<[f32; 3]>, faces: Vec<[usize; 3]>) -> Result<Self, GeometryError> {
        let vertex_count = vertices.len();
        for (face, tri) in faces.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i >= vertex_count) {
                return Err(GeometryError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(Self {
            vertices,
            faces,
            vertex_data: None,
            face_data: None,
        })
    }

    /// An empty geometry, used as a placeholder during preflight.
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            vertex_data: None,
            face_data: None,
        }
    }

    /// Name the child attribute matrix that holds per-vertex data.
    pub fn with_vertex_data(mut self, name: impl Into<String>) -> Self {
        self.vertex_data = Some(name.into());
        self
    }

    /// Name the child attribute matrix that holds per-face data.
    pub fn with_face_data(mut self, name: impl Into<String>) -> Self {
        self.face_data = Some(name.into());
        self
    }

    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn vertex_data(&self) -> Option<&str> {
        self.vertex_data.as_deref()
    }

    pub fn face_data(&self) -> Option<&str> {
        self.face_data.as_deref()
    }

    /// Required tuple count for a child matrix with the given name, if the
    /// name is registered as vertex or face data.
    pub fn required_tuples(&self, matrix_name: &str) -> Option<usize> {
        if self.vertex_data.as_deref() == Some(matrix_name) {
            Some(self.vertex_count())
        } else if self.face_data.as_deref() == Some(matrix_name) {
            Some(self.face_count())
        } else {
            None
        }
    }

    /// Multiply every vertex coordinate by `factor`.
    pub fn scale(&mut self, factor: f32) {
        for v in &mut self.vertices {
            for c in v.iter_mut() {
                *c *= factor;
            }
        }
    }

    /// Indices of faces that reference the same vertex more than once.
    pub fn degenerate_faces(&self) -> Vec<usize> {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, [a, b, c])| a == b || b == c || a == c)
            .map(|(i, _)| i)
            .collect()
    }

    /// Check that no edge is shared by more than two faces.
    ///
    /// Open surfaces (boundary edges used once) are accepted.
    pub fn check_manifold(&self) -> Result<(), GeometryError> {
        let mut edges: HashMap<(usize, usize), usize> = HashMap::new();
        for &[a, b, c] in &self.faces {
            let mut face_edges: Vec<(usize, usize)> = [(a, b), (b, c), (c, a)]
                .into_iter()
                .filter(|(p, q)| p != q)
                .map(|(p, q)| (p.min(q), p.max(q)))
                .collect();
            // A degenerate face repeats its one real edge.
            face_edges.sort_unstable();
            face_edges.dedup();
            for edge in face_edges {
                *edges.entry(edge).or_insert(0) += 1;
            }
        }
        let mut worst: Option<((usize, usize), usize)> = None;
        for (edge, count) in edges {
            if count > 2 && worst.map_or(true, |(e, _)| edge < e) {
                worst = Some((edge, count));
            }
        }
        match worst {
            Some(((a, b), count)) => Err(GeometryError::NonManifoldEdge { a, b, count }),
            None => Ok(()),
        }
    }

    /// Unit normals computed from the winding of each face.
    ///
    /// Degenerate faces yield a zero vector.
    pub fn compute_face_normals(&self) -> Vec<[f32; 3]> {
        self.faces
            .iter()
            .map(|&[a, b, c]| {
                let (p, q, r) = (self.vertices[a], self.vertices[b], self.vertices[c]);
                let u = [q[0] - p[0], q[1] - p[1], q[2] - p[2]];
                let v = [r[0] - p[0], r[1] - p[1], r[2] - p[2]];
                let n = [
                    u[1] * v[2] - u[2] * v[1],
                    u[2] * v[0] - u[0] * v[2],
                    u[0] * v[1] - u[1] * v[0],
                ];
                let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
                if len > 0.0 {
                    [n[0] / len, n[1] / len, n[2] / len]
                } else {
                    [0.0; 3]
                }
            })
            .collect()
    }

    /// Axis-aligned bounding box as `(min, max)`, or `None` if there are no vertices.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(mut lo, mut hi), v| {
            for i in 0..3 {
                lo[i] = lo[i].min(v[i]);
                hi[i] = hi[i].max(v[i]);
            }
            (lo, hi)
        }))
    }
}

/// Vertices and faces of an axis-aligned unit cube (8 vertices, 12 faces).
#[cfg(test)]
pub(crate) fn unit_cube() -> TriangleGeometry {
    let vertices = vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];
    let faces = vec![
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [1, 2, 6],
        [1, 6, 5],
        [2, 3, 7],
        [2, 7, 6],
        [3, 0, 4],
        [3, 4, 7],
    ];
    TriangleGeometry::new(vertices, faces).expect("cube is valid")
}
