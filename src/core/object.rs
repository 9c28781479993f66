//! core::object
//!
//! Object kinds that can live in a [`DataStructure`](crate::core::store::DataStructure).
//!
//! # Types
//!
//! - [`DataObject`] - Anything storable: group, array, attribute matrix, geometry
//! - [`DataArray`] - Typed, component-shaped array of values
//! - [`ArrayData`] - The typed backing storage of a [`DataArray`]
//! - [`AttributeMatrix`] - Grouping of parallel arrays with a shared tuple count
//!
//! Objects carry no name and no parent link; both belong to the store node
//! that owns the object.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::TriangleGeometry;

/// Errors from array construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArrayError {
    #[error("component count must be at least 1")]
    ZeroComponents,

    #[error("array length {len} is not a multiple of component count {components}")]
    ShapeMismatch { len: usize, components: usize },
}

/// Element type of a [`DataArray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Bool,
}

impl DataType {
    /// Size of one element in bytes.
    pub fn size(&self) -> usize {
        match self {
            DataType::Int8 | DataType::UInt8 | DataType::Bool => 1,
            DataType::Int16 | DataType::UInt16 => 2,
            DataType::Int32 | DataType::UInt32 | DataType::Float32 => 4,
            DataType::Int64 | DataType::UInt64 | DataType::Float64 => 8,
        }
    }

    /// Lowercase name used in container files and XDMF descriptors.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Int8 => "int8",
            DataType::UInt8 => "uint8",
            DataType::Int16 => "int16",
            DataType::UInt16 => "uint16",
            DataType::Int32 => "int32",
            DataType::UInt32 => "uint32",
            DataType::Int64 => "int64",
            DataType::UInt64 => "uint64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Bool => "bool",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed backing storage.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Bool(Vec<bool>),
}

impl ArrayData {
    pub fn data_type(&self) -> DataType {
        match self {
            ArrayData::Int8(_) => DataType::Int8,
            ArrayData::UInt8(_) => DataType::UInt8,
            ArrayData::Int16(_) => DataType::Int16,
            ArrayData::UInt16(_) => DataType::UInt16,
            ArrayData::Int32(_) => DataType::Int32,
            ArrayData::UInt32(_) => DataType::UInt32,
            ArrayData::Int64(_) => DataType::Int64,
            ArrayData::UInt64(_) => DataType::UInt64,
            ArrayData::Float32(_) => DataType::Float32,
            ArrayData::Float64(_) => DataType::Float64,
            ArrayData::Bool(_) => DataType::Bool,
        }
    }

    /// Total number of scalar elements.
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Int8(v) => v.len(),
            ArrayData::UInt8(v) => v.len(),
            ArrayData::Int16(v) => v.len(),
            ArrayData::UInt16(v) => v.len(),
            ArrayData::Int32(v) => v.len(),
            ArrayData::UInt32(v) => v.len(),
            ArrayData::Int64(v) => v.len(),
            ArrayData::UInt64(v) => v.len(),
            ArrayData::Float32(v) => v.len(),
            ArrayData::Float64(v) => v.len(),
            ArrayData::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// An all-zero array of the given type and length.
    pub fn zeroed(data_type: DataType, len: usize) -> Self {
        match data_type {
            DataType::Int8 => ArrayData::Int8(vec![0; len]),
            DataType::UInt8 => ArrayData::UInt8(vec![0; len]),
            DataType::Int16 => ArrayData::Int16(vec![0; len]),
            DataType::UInt16 => ArrayData::UInt16(vec![0; len]),
            DataType::Int32 => ArrayData::Int32(vec![0; len]),
            DataType::UInt32 => ArrayData::UInt32(vec![0; len]),
            DataType::Int64 => ArrayData::Int64(vec![0; len]),
            DataType::UInt64 => ArrayData::UInt64(vec![0; len]),
            DataType::Float32 => ArrayData::Float32(vec![0.0; len]),
            DataType::Float64 => ArrayData::Float64(vec![0.0; len]),
            DataType::Bool => ArrayData::Bool(vec![false; len]),
        }
    }
}

/// A typed array with a fixed number of components per tuple.
///
/// # Example
///
/// ```
/// use meshpipe::core::object::{ArrayData, DataArray};
///
/// let normals = DataArray::new(ArrayData::Float32(vec![0.0, 0.0, 1.0, 0.0, 1.0, 0.0]), 3).unwrap();
/// assert_eq!(normals.tuple_count(), 2);
/// assert!(DataArray::new(ArrayData::Float32(vec![1.0, 2.0]), 3).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    data: ArrayData,
    components: usize,
}

impl DataArray {
    /// Create an array, checking that the data length fits the component shape.
    pub fn new(data: ArrayData, components: usize) -> Result<Self, ArrayError> {
        if components == 0 {
            return Err(ArrayError::ZeroComponents);
        }
        if data.len() % components != 0 {
            return Err(ArrayError::ShapeMismatch {
                len: data.len(),
                components,
            });
        }
        Ok(Self { data, components })
    }

    /// An all-zero array with `tuples` tuples.
    pub fn zeroed(data_type: DataType, tuples: usize, components: usize) -> Result<Self, ArrayError> {
        if components == 0 {
            return Err(ArrayError::ZeroComponents);
        }
        Ok(Self {
            data: ArrayData::zeroed(data_type, tuples * components),
            components,
        })
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn into_data(self) -> ArrayData {
        self.data
    }

    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    pub fn components(&self) -> usize {
        self.components
    }

    pub fn tuple_count(&self) -> usize {
        self.data.len() / self.components
    }
}

/// A grouping of parallel arrays sharing one tuple count.
///
/// The arrays themselves are children of the matrix in the store; the
/// store rejects children whose tuple count differs from the matrix's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeMatrix {
    tuple_count: usize,
}

impl AttributeMatrix {
    pub fn new(tuple_count: usize) -> Self {
        Self { tuple_count }
    }

    pub fn tuple_count(&self) -> usize {
        self.tuple_count
    }
}

/// Coarse classification of a [`DataObject`], used in messages and type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Group,
    Array,
    AttributeMatrix,
    Geometry,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectKind::Group => write!(f, "data group"),
            ObjectKind::Array => write!(f, "data array"),
            ObjectKind::AttributeMatrix => write!(f, "attribute matrix"),
            ObjectKind::Geometry => write!(f, "triangle geometry"),
        }
    }
}

/// Anything storable in the data structure.
#[derive(Debug, Clone, PartialEq)]
pub enum DataObject {
    /// Plain container with no data of its own.
    Group,
    Array(DataArray),
    AttributeMatrix(AttributeMatrix),
    Geometry(TriangleGeometry),
}

impl DataObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            DataObject::Group => ObjectKind::Group,
            DataObject::Array(_) => ObjectKind::Array,
            DataObject::AttributeMatrix(_) => ObjectKind::AttributeMatrix,
            DataObject::Geometry(_) => ObjectKind::Geometry,
        }
    }

    /// Whether other objects may be nested under this one.
    pub fn is_container(&self) -> bool {
        !matches!(self, DataObject::Array(_))
    }

    pub fn as_array(&self) -> Option<&DataArray> {
        match self {
            DataObject::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_attribute_matrix(&self) -> Option<&AttributeMatrix> {
        match self {
            DataObject::AttributeMatrix(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_geometry(&self) -> Option<&TriangleGeometry> {
        match self {
            DataObject::Geometry(g) => Some(g),
            _ => None,
        }
    }
}

impl From<DataArray> for DataObject {
    fn from(array: DataArray) -> Self {
        DataObject::Array(array)
    }
}

impl From<AttributeMatrix> for DataObject {
    fn from(matrix: AttributeMatrix) -> Self {
        DataObject::AttributeMatrix(matrix)
    }
}

impl From<TriangleGeometry> for DataObject {
    fn from(geometry: TriangleGeometry) -> Self {
        DataObject::Geometry(geometry)
    }
}
