//! filters
//!
//! Built-in filters.
//!
//! - [`ImportGeometryFromFile`] - Read a triangle mesh into a new geometry
//! - [`ExportStore`] - Write the whole store to a container file
//! - [`ReadStore`] - Load a container file into the store
//! - [`CreateDataGroup`] - Create an empty group
//! - [`DeleteData`] - Remove an object and its descendants

mod create_data_group;
mod delete_data;
mod export_store;
mod import_geometry;
mod read_store;

pub use create_data_group::CreateDataGroup;
pub use delete_data::DeleteData;
pub use export_store::ExportStore;
pub use import_geometry::ImportGeometryFromFile;
pub use read_store::ReadStore;

use std::io;
use std::path::Path;

use crate::codec::CodecError;
use crate::filter::parameters::ArgumentError;
use crate::filter::result::{DiagnosticCode, ExecutionResult};

/// Bound arguments failed a typed lookup; binding guarantees this cannot
/// happen for declared parameters.
pub(crate) fn argument_error(e: ArgumentError) -> ExecutionResult {
    ExecutionResult::from_error(DiagnosticCode::Internal, e.to_string())
}

pub(crate) fn codec_error(path: &Path, e: &CodecError) -> ExecutionResult {
    let code = match e {
        CodecError::Encode { .. } => DiagnosticCode::WriteError,
        _ => DiagnosticCode::ParseError,
    };
    ExecutionResult::from_error(code, format!("{}: {}", path.display(), e))
}

/// Read a whole input file, mapping failures to diagnostics.
pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>, ExecutionResult> {
    std::fs::read(path).map_err(|e| {
        let code = match e.kind() {
            io::ErrorKind::NotFound => DiagnosticCode::FileNotFound,
            _ => DiagnosticCode::ReadError,
        };
        ExecutionResult::from_error(code, format!("cannot read '{}': {}", path.display(), e))
    })
}

/// `FileNotFound` unless `path` is an existing regular file.
pub(crate) fn require_file(path: &Path) -> Result<(), ExecutionResult> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ExecutionResult::from_error(
            DiagnosticCode::FileNotFound,
            format!("input file '{}' does not exist", path.display()),
        ))
    }
}
