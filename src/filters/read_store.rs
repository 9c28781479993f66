//! filters::read_store
//!
//! Load a container file written by [`ExportStore`](super::ExportStore)
//! and insert its top-level objects into the store.

use std::path::PathBuf;

use uuid::Uuid;

use super::{argument_error, codec_error, read_input, require_file};
use crate::codec::container;
use crate::core::store::DataStructure;
use crate::filter::parameters::{Constraint, ParameterKind, ParameterSpec};
use crate::filter::result::{DiagnosticCode, ExecutionResult};
use crate::filter::{Arguments, ChangeSet, ExecutionContext, Filter, FilterMetadata, OutputAction, Preflight};

pub const NAME: &str = "read_store";
pub const UUID: Uuid = Uuid::from_u128(0x5c3a_7f1e_2b0d_4c6a_9e8f_1a2b_3c4d_5e03);

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadStore;

struct Params {
    file: PathBuf,
    overwrite: bool,
}

impl Params {
    fn from_args(args: &Arguments) -> Result<Self, ExecutionResult> {
        Ok(Self {
            file: args.get_file_path("file_path").map_err(argument_error)?,
            overwrite: args.get_bool("overwrite").map_err(argument_error)?,
        })
    }

    /// Decode the container and turn each top-level object into an insert.
    fn load(&self) -> Result<Vec<OutputAction>, ExecutionResult> {
        let bytes = read_input(&self.file)?;
        let loaded = container::decode(&bytes).map_err(|e| codec_error(&self.file, &e))?;
        Ok(loaded
            .top_level()
            .into_iter()
            .filter_map(|path| {
                let subtree = loaded.snapshot(&path)?;
                Some(OutputAction::Create {
                    path,
                    subtree,
                    overwrite: self.overwrite,
                })
            })
            .collect())
    }
}

impl Filter for ReadStore {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata {
            name: NAME,
            uuid: UUID,
            human_name: "Read Store",
            tags: &["io", "input", "read", "container"],
            version: 1,
        }
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required("file_path", "Input Container", ParameterKind::FilePath)
                .help("Container file written by export_store")
                .constraint(Constraint::NonEmpty),
            ParameterSpec::optional("overwrite", "Overwrite Existing", ParameterKind::Bool, false)
                .help("Replace objects that already exist at the same top-level path"),
        ]
    }

    fn preflight_impl(&self, store: &DataStructure, args: &Arguments) -> Preflight {
        let params = match Params::from_args(args) {
            Ok(p) => p,
            Err(result) => return Preflight::failed(result),
        };
        if let Err(result) = require_file(&params.file) {
            return Preflight::failed(result);
        }
        let actions = match params.load() {
            Ok(a) => a,
            Err(result) => return Preflight::failed(result),
        };

        let mut result = ExecutionResult::new();
        if params.overwrite {
            for action in &actions {
                if store.contains(action.path()) {
                    result.push_warning(
                        DiagnosticCode::ReplacedExisting,
                        format!("'{}' will be replaced", action.path()),
                    );
                }
            }
        }
        Preflight::new(result, actions)
    }

    fn execute_impl(
        &self,
        _store: &DataStructure,
        args: &Arguments,
        ctx: &ExecutionContext,
        changes: &mut ChangeSet,
    ) -> ExecutionResult {
        let params = match Params::from_args(args) {
            Ok(p) => p,
            Err(result) => return result,
        };
        ctx.progress(NAME, &format!("reading {}", params.file.display()));
        let actions = match params.load() {
            Ok(a) => a,
            Err(result) => return result,
        };
        for action in actions {
            if let OutputAction::Create {
                path,
                subtree,
                overwrite,
            } = action
            {
                changes.attach(path, subtree, overwrite);
            }
        }
        ExecutionResult::new()
    }
}
