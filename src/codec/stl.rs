//! codec::stl
//!
//! STL reader backed by `stl_io`, which handles both the ASCII and binary
//! variants and merges coincident vertices into a shared vertex list.

use std::io::Cursor;

use super::{CodecError, GeometryCodec, MeshData};

#[derive(Debug, Clone, Copy, Default)]
pub struct StlCodec;

impl GeometryCodec for StlCodec {
    fn name(&self) -> &'static str {
        "STL"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["stl"]
    }

    fn decode(&self, bytes: &[u8]) -> Result<MeshData, CodecError> {
        if bytes.is_empty() {
            return Err(CodecError::parse("STL", "file is empty"));
        }
        let mut cursor = Cursor::new(bytes);
        let mesh =
            stl_io::read_stl(&mut cursor).map_err(|e| CodecError::parse("STL", e.to_string()))?;

        let vertices = mesh.vertices.iter().map(|v| [v[0], v[1], v[2]]).collect();
        let faces = mesh.faces.iter().map(|f| f.vertices).collect();
        let normals = mesh
            .faces
            .iter()
            .map(|f| [f.normal[0], f.normal[1], f.normal[2]])
            .collect();

        Ok(MeshData {
            vertices,
            faces,
            normals: Some(normals),
        })
    }
}
