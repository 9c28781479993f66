//! codec::xdmf
//!
//! XDMF descriptor for the geometries in a store.
//!
//! Each triangle geometry becomes a `Grid` with its topology, vertex
//! coordinates and the arrays of its vertex and face attribute matrices
//! (as `Node` and `Cell` attributes). Values are written inline as XML
//! data items so the descriptor is readable without the container.

use std::fmt::Write;

use crate::core::geometry::TriangleGeometry;
use crate::core::object::{ArrayData, DataArray, DataObject, DataType};
use crate::core::path::DataPath;
use crate::core::store::DataStructure;

/// Path of the descriptor written next to `container`: `<container>.xdmf`.
pub fn sibling_path(container: &std::path::Path) -> std::path::PathBuf {
    let mut name = container.as_os_str().to_os_string();
    name.push(".xdmf");
    std::path::PathBuf::from(name)
}

/// Render the descriptor for every geometry in `store`.
pub fn render(store: &DataStructure) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\"?>\n");
    out.push_str("<!DOCTYPE Xdmf SYSTEM \"Xdmf.dtd\"[]>\n");
    out.push_str("<Xdmf xmlns:xi=\"http://www.w3.org/2003/XInclude\" Version=\"2.2\">\n");
    out.push_str("  <Domain>\n");
    for path in store.list(None) {
        if let Some(DataObject::Geometry(geometry)) = store.get(&path) {
            // Writing to a String cannot fail.
            let _ = write_grid(&mut out, store, &path, geometry);
        }
    }
    out.push_str("  </Domain>\n");
    out.push_str("</Xdmf>\n");
    out
}

fn write_grid(
    out: &mut String,
    store: &DataStructure,
    path: &DataPath,
    geometry: &TriangleGeometry,
) -> std::fmt::Result {
    let nf = geometry.face_count();
    let nv = geometry.vertex_count();
    writeln!(out, "    <Grid Name=\"{}\" GridType=\"Uniform\">", escape(&path.to_string()))?;
    writeln!(out, "      <Topology TopologyType=\"Triangle\" NumberOfElements=\"{}\">", nf)?;
    writeln!(
        out,
        "        <DataItem Format=\"XML\" NumberType=\"Int\" Precision=\"8\" Dimensions=\"{} 3\">",
        nf
    )?;
    for [a, b, c] in geometry.faces() {
        writeln!(out, "          {} {} {}", a, b, c)?;
    }
    writeln!(out, "        </DataItem>")?;
    writeln!(out, "      </Topology>")?;
    writeln!(out, "      <Geometry GeometryType=\"XYZ\">")?;
    writeln!(
        out,
        "        <DataItem Format=\"XML\" NumberType=\"Float\" Precision=\"4\" Dimensions=\"{} 3\">",
        nv
    )?;
    for [x, y, z] in geometry.vertices() {
        writeln!(out, "          {} {} {}", x, y, z)?;
    }
    writeln!(out, "        </DataItem>")?;
    writeln!(out, "      </Geometry>")?;

    let matrices = [
        (geometry.vertex_data(), "Node"),
        (geometry.face_data(), "Cell"),
    ];
    for (matrix, center) in matrices {
        let Some(matrix_path) = matrix.and_then(|m| path.join(m).ok()) else {
            continue;
        };
        for array_path in store.children(&matrix_path).unwrap_or_default() {
            if let Some(array) = store.get(&array_path).and_then(DataObject::as_array) {
                write_attribute(out, array_path.name(), center, array)?;
            }
        }
    }

    writeln!(out, "    </Grid>")
}

fn write_attribute(out: &mut String, name: &str, center: &str, array: &DataArray) -> std::fmt::Result {
    let attribute_type = match array.components() {
        1 => "Scalar",
        3 => "Vector",
        _ => "Matrix",
    };
    let (number_type, precision) = number_type(array.data_type());
    writeln!(
        out,
        "      <Attribute Name=\"{}\" AttributeType=\"{}\" Center=\"{}\">",
        escape(name),
        attribute_type,
        center
    )?;
    writeln!(
        out,
        "        <DataItem Format=\"XML\" NumberType=\"{}\" Precision=\"{}\" Dimensions=\"{} {}\">",
        number_type,
        precision,
        array.tuple_count(),
        array.components()
    )?;
    for tuple in values(array.data()).chunks(array.components()) {
        writeln!(out, "          {}", tuple.join(" "))?;
    }
    writeln!(out, "        </DataItem>")?;
    writeln!(out, "      </Attribute>")
}

fn number_type(data_type: DataType) -> (&'static str, usize) {
    let name = match data_type {
        DataType::Int8 => "Char",
        DataType::UInt8 | DataType::Bool => "UChar",
        DataType::Int16 | DataType::Int32 | DataType::Int64 => "Int",
        DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => "UInt",
        DataType::Float32 | DataType::Float64 => "Float",
    };
    (name, data_type.size())
}

fn values(data: &ArrayData) -> Vec<String> {
    fn render<T: ToString>(v: &[T]) -> Vec<String> {
        v.iter().map(T::to_string).collect()
    }
    match data {
        ArrayData::Int8(v) => render(v),
        ArrayData::UInt8(v) => render(v),
        ArrayData::Int16(v) => render(v),
        ArrayData::UInt16(v) => render(v),
        ArrayData::Int32(v) => render(v),
        ArrayData::UInt32(v) => render(v),
        ArrayData::Int64(v) => render(v),
        ArrayData::UInt64(v) => render(v),
        ArrayData::Float32(v) => render(v),
        ArrayData::Float64(v) => render(v),
        ArrayData::Bool(v) => v.iter().map(|b| u8::from(*b).to_string()).collect(),
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
