//! filters::delete_data

use uuid::Uuid;

use super::argument_error;
use crate::core::store::DataStructure;
use crate::filter::parameters::{ParameterKind, ParameterSpec};
use crate::filter::result::{DiagnosticCode, ExecutionResult};
use crate::filter::{Arguments, ChangeSet, ExecutionContext, Filter, FilterMetadata, OutputAction, Preflight};

pub const NAME: &str = "delete_data";
pub const UUID: Uuid = Uuid::from_u128(0x5c3a_7f1e_2b0d_4c6a_9e8f_1a2b_3c4d_5e05);

/// Removes an object and everything beneath it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteData;

impl Filter for DeleteData {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata {
            name: NAME,
            uuid: UUID,
            human_name: "Delete Data",
            tags: &["core", "delete", "remove"],
            version: 1,
        }
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![ParameterSpec::required("data_path", "Data Path", ParameterKind::DataPath)
            .help("Object to remove, with its descendants")]
    }

    fn preflight_impl(&self, store: &DataStructure, args: &Arguments) -> Preflight {
        let path = match args.get_data_path("data_path") {
            Ok(p) => p,
            Err(e) => return Preflight::failed(argument_error(e)),
        };
        if !store.contains(&path) {
            return Preflight::failed(ExecutionResult::from_error(
                DiagnosticCode::PathNotFound,
                format!("no object exists at '{}'", path),
            ));
        }
        Preflight::new(ExecutionResult::new(), vec![OutputAction::Remove(path)])
    }

    fn execute_impl(
        &self,
        _store: &DataStructure,
        args: &Arguments,
        _ctx: &ExecutionContext,
        changes: &mut ChangeSet,
    ) -> ExecutionResult {
        match args.get_data_path("data_path") {
            Ok(path) => {
                changes.remove(path);
                ExecutionResult::new()
            }
            Err(e) => argument_error(e),
        }
    }
}
