//! codec
//!
//! File formats behind fixed contracts.
//!
//! # Modules
//!
//! - [`stl`] - STL triangle meshes (ASCII and binary, via `stl_io`)
//! - [`off`] - OFF polygon meshes (ASCII)
//! - [`container`] - The bundled store container
//! - [`xdmf`] - XDMF descriptor written next to exported containers
//!
//! Geometry codecs implement [`GeometryCodec`] and are chosen by file
//! extension through [`codec_for_path`].

pub mod container;
pub mod off;
pub mod stl;
pub mod xdmf;

use std::path::Path;

use thiserror::Error;

/// Errors from decoding or encoding files.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    #[error("malformed {format} data: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("container version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("container checksum mismatch (recorded {recorded}, computed {computed})")]
    ChecksumMismatch { recorded: String, computed: String },

    #[error("container object '{path}' cannot be restored: {message}")]
    InvalidObject { path: String, message: String },

    #[error("failed to encode {format}: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },
}

impl CodecError {
    pub(crate) fn parse(format: &'static str, message: impl Into<String>) -> Self {
        CodecError::Parse {
            format,
            message: message.into(),
        }
    }
}

/// Mesh contents decoded from a geometry file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<[f32; 3]>,
    pub faces: Vec<[usize; 3]>,
    /// Per-face normals, when the format stores them.
    pub normals: Option<Vec<[f32; 3]>>,
}

/// A reader for one triangle-mesh file format.
pub trait GeometryCodec: Send + Sync {
    /// Short format name used in messages.
    fn name(&self) -> &'static str;

    /// Lowercase file extensions handled by this codec, without the dot.
    fn extensions(&self) -> &'static [&'static str];

    fn decode(&self, bytes: &[u8]) -> Result<MeshData, CodecError>;
}

static STL: stl::StlCodec = stl::StlCodec;
static OFF: off::OffCodec = off::OffCodec;

/// Every built-in geometry codec.
pub fn geometry_codecs() -> [&'static dyn GeometryCodec; 2] {
    [&STL, &OFF]
}

/// The codec registered for `path`'s extension (case-insensitive).
pub fn codec_for_path(path: &Path) -> Option<&'static dyn GeometryCodec> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    geometry_codecs()
        .into_iter()
        .find(|c| c.extensions().contains(&ext.as_str()))
}

/// Codec used when the extension is not recognised.
pub fn fallback_codec() -> &'static dyn GeometryCodec {
    &STL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chooses_by_extension() {
        assert_eq!(codec_for_path(Path::new("a/cube.stl")).unwrap().name(), "STL");
        assert_eq!(codec_for_path(Path::new("CUBE.STL")).unwrap().name(), "STL");
        assert_eq!(codec_for_path(Path::new("mesh.off")).unwrap().name(), "OFF");
        assert!(codec_for_path(Path::new("mesh.obj")).is_none());
        assert!(codec_for_path(Path::new("mesh")).is_none());
    }
}
