//! filters::create_data_group

use uuid::Uuid;

use super::argument_error;
use crate::core::object::DataObject;
use crate::core::store::{DataStructure, Subtree};
use crate::filter::parameters::{ParameterKind, ParameterSpec};
use crate::filter::result::ExecutionResult;
use crate::filter::{Arguments, ChangeSet, ExecutionContext, Filter, FilterMetadata, OutputAction, Preflight};

pub const NAME: &str = "create_data_group";
pub const UUID: Uuid = Uuid::from_u128(0x5c3a_7f1e_2b0d_4c6a_9e8f_1a2b_3c4d_5e04);

/// Creates an empty group. The parent must already exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateDataGroup;

impl Filter for CreateDataGroup {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata {
            name: NAME,
            uuid: UUID,
            human_name: "Create Data Group",
            tags: &["core", "create", "group"],
            version: 1,
        }
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![ParameterSpec::required("data_path", "Data Group Path", ParameterKind::DataPath)
            .help("Path of the new group")]
    }

    fn preflight_impl(&self, _store: &DataStructure, args: &Arguments) -> Preflight {
        match args.get_data_path("data_path") {
            Ok(path) => Preflight::new(
                ExecutionResult::new(),
                vec![OutputAction::Create {
                    path,
                    subtree: Subtree::leaf(DataObject::Group),
                    overwrite: false,
                }],
            ),
            Err(e) => Preflight::failed(argument_error(e)),
        }
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
                changes.create(path, DataObject::Group, false);
                ExecutionResult::new()
            }
            Err(e) => argument_error(e),
        }
    }
}
