//! codec::container
//!
//! The bundled container format for a whole [`DataStructure`].
//!
//! # Format
//!
//! A JSON document:
//!
//! ```json
//! {
//!   "format": "meshpipe-container",
//!   "version": 1,
//!   "created_at": "2026-01-01T00:00:00Z",
//!   "checksum": "<sha256 hex of the serialized objects>",
//!   "objects": [
//!     { "path": "Geometry", "object": { "kind": "geometry", ... } },
//!     ...
//!   ]
//! }
//! ```
//!
//! Objects are listed depth-first, parents before children. Numeric
//! payloads (array data, vertex coordinates, face indices) are stored as
//! hex-encoded little-endian bytes so values round-trip bit-exactly.
//!
//! # Invariants
//!
//! - `decode(encode(s)) == s` for every store `s`
//! - A tampered `objects` list fails the checksum
//! - Documents from a newer format version are rejected

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::CodecError;
use crate::core::geometry::TriangleGeometry;
use crate::core::object::{ArrayData, AttributeMatrix, DataArray, DataObject, DataType};
use crate::core::path::DataPath;
use crate::core::store::DataStructure;

pub const FORMAT: &str = "meshpipe-container";
pub const VERSION: u32 = 1;

/// Conventional file extension for containers.
pub const EXTENSION: &str = "mpc";

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    format: String,
    version: u32,
    created_at: DateTime<Utc>,
    checksum: String,
    objects: Vec<Entry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Entry {
    path: DataPath,
    object: Record,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Record {
    Group,
    Array {
        data_type: DataType,
        components: usize,
        data: String,
    },
    AttributeMatrix {
        tuple_count: usize,
    },
    Geometry {
        vertices: String,
        faces: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        vertex_data: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        face_data: Option<String>,
    },
}

/// Header fields of a container, without its objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub checksum: String,
    pub object_count: usize,
}

/// Serialize a store.
pub fn encode(store: &DataStructure) -> Result<Vec<u8>, CodecError> {
    let objects: Vec<Entry> = store
        .list(None)
        .filter_map(|path| {
            let object = store.get(&path)?;
            Some(Entry {
                path,
                object: record_for(object),
            })
        })
        .collect();

    let checksum = checksum_of(&objects)?;
    let doc = Document {
        format: FORMAT.to_string(),
        version: VERSION,
        created_at: Utc::now(),
        checksum,
        objects,
    };
    let bytes = serde_json::to_vec_pretty(&doc).map_err(|e| CodecError::Encode {
        format: "container",
        message: e.to_string(),
    })?;
    log::debug!("encoded container: {} object(s), {} bytes", doc.objects.len(), bytes.len());
    Ok(bytes)
}

/// Deserialize a store, verifying format, version and checksum.
pub fn decode(bytes: &[u8]) -> Result<DataStructure, CodecError> {
    let doc = parse_document(bytes)?;

    let mut store = DataStructure::new();
    for entry in doc.objects {
        let object = object_for(&entry.path, entry.object)?;
        store
            .create(&entry.path, object, false)
            .map_err(|e| CodecError::InvalidObject {
                path: entry.path.to_string(),
                message: e.to_string(),
            })?;
    }
    Ok(store)
}

/// Read and verify only the header.
pub fn read_header(bytes: &[u8]) -> Result<Header, CodecError> {
    let doc = parse_document(bytes)?;
    Ok(Header {
        version: doc.version,
        created_at: doc.created_at,
        checksum: doc.checksum,
        object_count: doc.objects.len(),
    })
}

fn parse_document(bytes: &[u8]) -> Result<Document, CodecError> {
    let doc: Document =
        serde_json::from_slice(bytes).map_err(|e| CodecError::parse("container", e.to_string()))?;
    if doc.format != FORMAT {
        return Err(CodecError::parse(
            "container",
            format!("unexpected format '{}'", doc.format),
        ));
    }
    if doc.version > VERSION {
        return Err(CodecError::UnsupportedVersion {
            found: doc.version,
            supported: VERSION,
        });
    }
    let computed = checksum_of(&doc.objects)?;
    if computed != doc.checksum {
        return Err(CodecError::ChecksumMismatch {
            recorded: doc.checksum,
            computed,
        });
    }
    Ok(doc)
}

fn checksum_of(objects: &[Entry]) -> Result<String, CodecError> {
    let canonical = serde_json::to_vec(objects).map_err(|e| CodecError::Encode {
        format: "container",
        message: e.to_string(),
    })?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}

fn record_for(object: &DataObject) -> Record {
    match object {
        DataObject::Group => Record::Group,
        DataObject::Array(array) => Record::Array {
            data_type: array.data_type(),
            components: array.components(),
            data: hex::encode(array_bytes(array.data())),
        },
        DataObject::AttributeMatrix(matrix) => Record::AttributeMatrix {
            tuple_count: matrix.tuple_count(),
        },
        DataObject::Geometry(geometry) => {
            let vertices: Vec<u8> = geometry
                .vertices()
                .iter()
                .flatten()
                .flat_map(|c| c.to_le_bytes())
                .collect();
            let faces: Vec<u8> = geometry
                .faces()
                .iter()
                .flatten()
                .flat_map(|i| (*i as u64).to_le_bytes())
                .collect();
            Record::Geometry {
                vertices: hex::encode(vertices),
                faces: hex::encode(faces),
                vertex_data: geometry.vertex_data().map(str::to_string),
                face_data: geometry.face_data().map(str::to_string),
            }
        }
    }
}

fn object_for(path: &DataPath, record: Record) -> Result<DataObject, CodecError> {
    let invalid = |message: String| CodecError::InvalidObject {
        path: path.to_string(),
        message,
    };
    Ok(match record {
        Record::Group => DataObject::Group,
        Record::AttributeMatrix { tuple_count } => AttributeMatrix::new(tuple_count).into(),
        Record::Array {
            data_type,
            components,
            data,
        } => {
            let bytes = hex::decode(&data).map_err(|e| invalid(e.to_string()))?;
            let data = array_from_bytes(data_type, &bytes).map_err(invalid)?;
            DataArray::new(data, components)
                .map_err(|e| invalid(e.to_string()))?
                .into()
        }
        Record::Geometry {
            vertices,
            faces,
            vertex_data,
            face_data,
        } => {
            let coords: Vec<f32> = le_values(&hex::decode(&vertices).map_err(|e| invalid(e.to_string()))?)
                .map_err(invalid)?;
            let indices: Vec<u64> = le_values(&hex::decode(&faces).map_err(|e| invalid(e.to_string()))?)
                .map_err(invalid)?;
            if coords.len() % 3 != 0 || indices.len() % 3 != 0 {
                return Err(invalid("vertex or face data is not a multiple of 3".into()));
            }
            let vertices = coords.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
            let faces = indices
                .chunks_exact(3)
                .map(|c| [c[0] as usize, c[1] as usize, c[2] as usize])
                .collect();
            let mut geometry =
                TriangleGeometry::new(vertices, faces).map_err(|e| invalid(e.to_string()))?;
            if let Some(name) = vertex_data {
                geometry = geometry.with_vertex_data(name);
            }
            if let Some(name) = face_data {
                geometry = geometry.with_face_data(name);
            }
            geometry.into()
        }
    })
}

/// Fixed-width little-endian scalar.
trait LeScalar: Sized {
    const SIZE: usize;
    fn from_le(bytes: &[u8]) -> Self;
    fn write_le(&self, out: &mut Vec<u8>);
}

macro_rules! le_scalar {
    ($($t:ty),*) => {
        $(
            impl LeScalar for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                fn from_le(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(bytes);
                    <$t>::from_le_bytes(buf)
                }

                fn write_le(&self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

le_scalar!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

fn le_values<T: LeScalar>(bytes: &[u8]) -> Result<Vec<T>, String> {
    if bytes.len() % T::SIZE != 0 {
        return Err(format!(
            "{} bytes is not a multiple of element size {}",
            bytes.len(),
            T::SIZE
        ));
    }
    Ok(bytes.chunks_exact(T::SIZE).map(T::from_le).collect())
}

fn write_all<T: LeScalar>(values: &[T]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * T::SIZE);
    for v in values {
        v.write_le(&mut out);
    }
    out
}

fn array_bytes(data: &ArrayData) -> Vec<u8> {
    match data {
        ArrayData::Int8(v) => write_all(v),
        ArrayData::UInt8(v) => write_all(v),
        ArrayData::Int16(v) => write_all(v),
        ArrayData::UInt16(v) => write_all(v),
        ArrayData::Int32(v) => write_all(v),
        ArrayData::UInt32(v) => write_all(v),
        ArrayData::Int64(v) => write_all(v),
        ArrayData::UInt64(v) => write_all(v),
        ArrayData::Float32(v) => write_all(v),
        ArrayData::Float64(v) => write_all(v),
        ArrayData::Bool(v) => v.iter().map(|b| u8::from(*b)).collect(),
    }
}

fn array_from_bytes(data_type: DataType, bytes: &[u8]) -> Result<ArrayData, String> {
    Ok(match data_type {
        DataType::Int8 => ArrayData::Int8(le_values(bytes)?),
        DataType::UInt8 => ArrayData::UInt8(le_values(bytes)?),
        DataType::Int16 => ArrayData::Int16(le_values(bytes)?),
        DataType::UInt16 => ArrayData::UInt16(le_values(bytes)?),
        DataType::Int32 => ArrayData::Int32(le_values(bytes)?),
        DataType::UInt32 => ArrayData::UInt32(le_values(bytes)?),
        DataType::Int64 => ArrayData::Int64(le_values(bytes)?),
        DataType::UInt64 => ArrayData::UInt64(le_values(bytes)?),
        DataType::Float32 => ArrayData::Float32(le_values(bytes)?),
        DataType::Float64 => ArrayData::Float64(le_values(bytes)?),
        DataType::Bool => ArrayData::Bool(
            bytes
                .iter()
                .map(|b| match b {
                    0 => Ok(false),
                    1 => Ok(true),
                    other => Err(format!("invalid bool byte {}", other)),
                })
                .collect::<Result<_, _>>()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::unit_cube;

    fn p(s: &str) -> DataPath {
        DataPath::parse(s).unwrap()
    }

    fn sample() -> DataStructure {
        let mut store = DataStructure::new();
        let geom = unit_cube().with_vertex_data("Vertex Data").with_face_data("Face Data");
        let normals = geom.compute_face_normals();
        store.create(&p("Geom"), geom.into(), false).unwrap();
        store
            .create(&p("Geom/Vertex Data"), AttributeMatrix::new(8).into(), false)
            .unwrap();
        store
            .create(&p("Geom/Face Data"), AttributeMatrix::new(12).into(), false)
            .unwrap();
        let flat: Vec<f32> = normals.into_iter().flatten().collect();
        store
            .create(
                &p("Geom/Face Data/Normals"),
                DataArray::new(ArrayData::Float32(flat), 3).unwrap().into(),
                false,
            )
            .unwrap();
        store.create(&p("Misc"), DataObject::Group, false).unwrap();
        store
            .create(
                &p("Misc/flags"),
                DataArray::new(ArrayData::Bool(vec![true, false, true]), 1)
                    .unwrap()
                    .into(),
                false,
            )
            .unwrap();
        store
            .create(
                &p("Misc/nan"),
                DataArray::new(ArrayData::Float64(vec![f64::NAN, -0.0, f64::INFINITY]), 1)
                    .unwrap()
                    .into(),
                false,
            )
            .unwrap();
        store
    }

    #[test]
    fn roundtrip_preserves_store() {
        let store = sample();
        let decoded = decode(&encode(&store).unwrap()).unwrap();
        assert_eq!(decoded.fingerprint(), store.fingerprint());
        assert_eq!(decoded.len(), store.len());
    }

    #[test]
    fn empty_store_roundtrips() {
        let empty = DataStructure::new();
        let decoded = decode(&encode(&empty).unwrap()).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn tampering_is_detected() {
        let bytes = encode(&sample()).unwrap();
        let mut doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        doc["objects"][0]["path"] = serde_json::Value::String("Renamed".into());
        let tampered = serde_json::to_vec(&doc).unwrap();
        assert!(matches!(
            decode(&tampered),
            Err(CodecError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn newer_version_is_rejected() {
        let bytes = encode(&DataStructure::new()).unwrap();
        let mut doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        doc["version"] = serde_json::Value::from(VERSION + 1);
        let bumped = serde_json::to_vec(&doc).unwrap();
        assert_eq!(
            decode(&bumped).unwrap_err(),
            CodecError::UnsupportedVersion {
                found: VERSION + 1,
                supported: VERSION
            }
        );
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            decode(b"not json"),
            Err(CodecError::Parse { .. })
        ));
        assert!(matches!(
            decode(br#"{"format":"other","version":1,"created_at":"2020-01-01T00:00:00Z","checksum":"","objects":[]}"#),
            Err(CodecError::Parse { .. })
        ));
    }

    #[test]
    fn header_reports_counts() {
        let header = read_header(&encode(&sample()).unwrap()).unwrap();
        assert_eq!(header.version, VERSION);
        assert_eq!(header.object_count, 7);
        assert_eq!(header.checksum.len(), 64);
    }

    #[test]
    fn bad_bool_byte() {
        assert!(array_from_bytes(DataType::Bool, &[0, 1, 2]).is_err());
        assert!(array_from_bytes(DataType::Int32, &[0, 1, 2]).is_err());
    }
}
