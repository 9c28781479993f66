//! filters::export_store
//!
//! Write the whole store to a container file, plus an optional XDMF
//! descriptor next to it. Both files are written atomically.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::{argument_error, codec_error};
use crate::codec::{container, xdmf};
use crate::core::fsio;
use crate::core::store::DataStructure;
use crate::filter::parameters::{Constraint, ParameterKind, ParameterSpec};
use crate::filter::result::{DiagnosticCode, ExecutionResult};
use crate::filter::{Arguments, ChangeSet, ExecutionContext, Filter, FilterMetadata, Preflight};

pub const NAME: &str = "export_store";
pub const UUID: Uuid = Uuid::from_u128(0x5c3a_7f1e_2b0d_4c6a_9e8f_1a2b_3c4d_5e02);

#[derive(Debug, Clone, Copy, Default)]
pub struct ExportStore;

struct Params {
    destination: PathBuf,
    write_auxiliary: bool,
}

impl Params {
    fn from_args(args: &Arguments) -> Result<Self, ExecutionResult> {
        Ok(Self {
            destination: args.get_file_path("destination").map_err(argument_error)?,
            write_auxiliary: args.get_bool("write_auxiliary").map_err(argument_error)?,
        })
    }
}

fn write_error(path: &Path, e: impl std::fmt::Display) -> ExecutionResult {
    ExecutionResult::from_error(
        DiagnosticCode::WriteError,
        format!("cannot write '{}': {}", path.display(), e),
    )
}

impl Filter for ExportStore {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata {
            name: NAME,
            uuid: UUID,
            human_name: "Export Store",
            tags: &["io", "output", "write", "export", "xdmf"],
            version: 1,
        }
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required("destination", "Output File", ParameterKind::FilePath)
                .help("Container file to write")
                .constraint(Constraint::NonEmpty),
            ParameterSpec::optional(
                "write_auxiliary",
                "Write XDMF File",
                ParameterKind::Bool,
                true,
            )
            .help("Also write <destination>.xdmf describing the geometries"),
        ]
    }

    fn preflight_impl(&self, store: &DataStructure, args: &Arguments) -> Preflight {
        let params = match Params::from_args(args) {
            Ok(p) => p,
            Err(result) => return Preflight::failed(result),
        };
        let mut result = ExecutionResult::new();
        if params.destination.is_dir() {
            result.push_error(
                DiagnosticCode::WriteError,
                format!("'{}' is a directory", params.destination.display()),
            );
        }
        if store.is_empty() {
            result.push_warning(DiagnosticCode::EmptyStore, "the store is empty; writing an empty container");
        }
        Preflight::new(result, Vec::new())
    }

    fn execute_impl(
        &self,
        store: &DataStructure,
        args: &Arguments,
        ctx: &ExecutionContext,
        _changes: &mut ChangeSet,
    ) -> ExecutionResult {
        let params = match Params::from_args(args) {
            Ok(p) => p,
            Err(result) => return result,
        };
        let dest = &params.destination;

        let bytes = match container::encode(store) {
            Ok(b) => b,
            Err(e) => return codec_error(dest, &e),
        };

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(parent) {
                return write_error(parent, e);
            }
        }

        // Stage every file before replacing any, so a failed export never
        // leaves a new container behind.
        ctx.progress(NAME, &format!("writing {}", dest.display()));
        let staged_container = match fsio::stage(dest, &bytes) {
            Ok(staged) => staged,
            Err(e) => return write_error(dest, e),
        };
        let sibling = if params.write_auxiliary {
            let path = xdmf::sibling_path(dest);
            ctx.progress(NAME, &format!("writing {}", path.display()));
            match fsio::stage(&path, xdmf::render(store).as_bytes()) {
                Ok(staged) => Some(staged),
                Err(e) => return write_error(&path, e),
            }
        } else {
            None
        };

        // The container goes last: it is the file callers look for.
        if let Some(staged) = sibling {
            let path = staged.target().to_path_buf();
            if let Err(e) = staged.commit() {
                return write_error(&path, e);
            }
        }
        if let Err(e) = staged_container.commit() {
            return write_error(dest, e);
        }
        log::debug!("{}: wrote {} ({} bytes)", NAME, dest.display(), bytes.len());
        ExecutionResult::new()
    }
}
