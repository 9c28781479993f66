//! inspect command - Show the contents of a container file

use std::path::Path;

use crate::cli::output::print_json;
use crate::codec::container;
use crate::core::object::DataObject;
use crate::core::store::DataStructure;
use crate::engine::Context;
use anyhow::{Context as _, Result};
use serde_json::json;

pub fn inspect(ctx: &Context, file: &Path, header_only: bool, json: bool) -> Result<()> {
    let path = ctx.resolve(file)?;
    let bytes = std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let header = container::read_header(&bytes)
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    let store = if header_only {
        None
    } else {
        Some(container::decode(&bytes).with_context(|| format!("Failed to decode {}", path.display()))?)
    };

    if json {
        let mut objects = Vec::new();
        if let Some(store) = &store {
            for object_path in store.list(None) {
                if let Some(object) = store.get(&object_path) {
                    objects.push(json!({
                        "path": object_path.to_string(),
                        "description": describe(object),
                    }));
                }
            }
        }
        let mut value = json!({
            "file": path.display().to_string(),
            "version": header.version,
            "created_at": header.created_at.to_rfc3339(),
            "checksum": header.checksum,
            "object_count": header.object_count,
        });
        if store.is_some() {
            value["objects"] = json!(objects);
        }
        return print_json(&value);
    }

    println!("{}", path.display());
    println!("  version:  {}", header.version);
    println!("  created:  {}", header.created_at.to_rfc3339());
    println!("  checksum: {}", header.checksum);
    println!("  objects:  {}", header.object_count);
    if let Some(store) = store {
        if !ctx.quiet {
            println!();
        }
        print_tree(&store);
    }
    Ok(())
}

fn print_tree(store: &DataStructure) {
    for path in store.list(None) {
        let Some(object) = store.get(&path) else {
            continue;
        };
        let indent = "  ".repeat(path.depth().saturating_sub(1));
        println!("{}{}  {}", indent, path.name(), describe(object));
    }
}

fn describe(object: &DataObject) -> String {
    match object {
        DataObject::Group => "data group".to_string(),
        DataObject::Array(a) => format!(
            "data array {} [{} x {}]",
            a.data_type().as_str(),
            a.tuple_count(),
            a.components()
        ),
        DataObject::AttributeMatrix(m) => format!("attribute matrix ({} tuples)", m.tuple_count()),
        DataObject::Geometry(g) => format!(
            "triangle geometry ({} vertices, {} faces)",
            g.vertex_count(),
            g.face_count()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::object::{DataArray, DataType};

    #[test]
    fn describes_each_kind() {
        assert_eq!(describe(&DataObject::Group), "data group");
        let array = DataArray::zeroed(DataType::Float32, 4, 3).unwrap();
        assert_eq!(
            describe(&DataObject::Array(array)),
            format!("data array {} [4 x 3]", DataType::Float32.as_str())
        );
    }
}
