//! filter
//!
//! The filter contract.
//!
//! # Architecture
//!
//! A filter is a stateless descriptor implementing [`Filter`]. It declares
//! its parameters, validates arguments against a read-only store
//! (preflight), and performs its work (execute). Implementors provide the
//! `*_impl` hooks; the provided methods drive the lifecycle:
//!
//! ```text
//! bind arguments -> preflight_impl -> check declared outputs
//!                -> execute_impl (stages a ChangeSet) -> commit
//! ```
//!
//! `execute_impl` receives the store read-only and stages every mutation
//! in a [`ChangeSet`]. The staged changes are committed only when
//! execution reported no errors, so a failing filter never leaves partial
//! output behind.
//!
//! # Modules
//!
//! - [`parameters`] - Parameter declarations and argument binding
//! - [`result`] - Diagnostics and execution results
//! - [`changes`] - Declared outputs and staged mutations
//! - [`context`] - Cancellation and progress
//! - [`registry`] - Lookup of built-in filters by name or UUID

pub mod changes;
pub mod context;
pub mod parameters;
pub mod registry;
pub mod result;

use serde::Serialize;
use uuid::Uuid;

use crate::core::store::DataStructure;

pub use changes::{ChangeSet, OutputAction};
pub use context::{CancelToken, ExecutionContext};
pub use parameters::{Arguments, ParameterKind, ParameterSpec, ParameterValue};
pub use registry::FilterRegistry;
pub use result::{Diagnostic, DiagnosticCode, ExecutionResult};

/// Static description of a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterMetadata {
    /// Stable machine name, e.g. `import_geometry_from_file`.
    pub name: &'static str,
    /// Stable identity used by saved pipelines.
    pub uuid: Uuid,
    pub human_name: &'static str,
    pub tags: &'static [&'static str],
    pub version: u32,
}

/// Outcome of a preflight: diagnostics plus the outputs the filter will
/// produce on execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preflight {
    pub result: ExecutionResult,
    pub actions: Vec<OutputAction>,
}

impl Preflight {
    pub fn new(result: ExecutionResult, actions: Vec<OutputAction>) -> Self {
        Self { result, actions }
    }

    /// A preflight that found errors and declares nothing.
    pub fn failed(result: ExecutionResult) -> Self {
        Self {
            result,
            actions: Vec::new(),
        }
    }
}

/// A data-processing step.
///
/// Implementations must be stateless: all inputs come from the store and
/// the bound arguments, so one filter value can serve any number of runs.
pub trait Filter: Send + Sync {
    fn metadata(&self) -> FilterMetadata;

    /// Declared parameters, in presentation order.
    fn parameters(&self) -> Vec<ParameterSpec>;

    /// Validate bound arguments against the store and declare outputs.
    ///
    /// Must not have side effects. Only reading input files is allowed.
    fn preflight_impl(&self, store: &DataStructure, args: &Arguments) -> Preflight;

    /// Do the work, staging every store mutation in `changes`.
    fn execute_impl(
        &self,
        store: &DataStructure,
        args: &Arguments,
        ctx: &ExecutionContext,
        changes: &mut ChangeSet,
    ) -> ExecutionResult;

    fn name(&self) -> &'static str {
        self.metadata().name
    }

    /// Bind arguments and run `preflight_impl`, without checking the
    /// declared outputs. Used by pipeline preflight, which applies the
    /// declared outputs to a scratch store itself.
    fn declare(&self, store: &DataStructure, args: &Arguments) -> Preflight {
        let (_, preflight) = prepare(self, store, args);
        preflight
    }

    /// Validate without side effects.
    fn preflight(&self, store: &DataStructure, args: &Arguments) -> ExecutionResult {
        let (_, mut preflight) = prepare(self, store, args);
        if !preflight.result.has_errors() {
            let checked = changes::check_declared(store, &preflight.actions);
            preflight.result.extend(checked.with_filter(self.name()));
        }
        preflight.result
    }

    /// Preflight, then execute and commit with a default context.
    fn execute(&self, store: &mut DataStructure, args: &Arguments) -> ExecutionResult {
        self.execute_with(store, args, &ExecutionContext::new())
    }

    /// Preflight, then execute and commit.
    ///
    /// The store is only mutated when the whole invocation succeeds.
    fn execute_with(
        &self,
        store: &mut DataStructure,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> ExecutionResult {
        let name = self.name();
        if ctx.is_cancelled() {
            return ExecutionResult::from_error(DiagnosticCode::Cancelled, "execution cancelled")
                .with_filter(name);
        }

        let (bound, preflight) = prepare(self, store, args);
        let mut result = preflight.result;
        if !result.has_errors() {
            result.extend(changes::check_declared(store, &preflight.actions).with_filter(name));
        }
        if result.has_errors() {
            log::debug!("{}: preflight failed, not executing ({})", name, result.summary());
            return result;
        }

        log::debug!("{}: executing", name);
        let mut staged = ChangeSet::new();
        let executed = self.execute_impl(store, &bound, ctx, &mut staged);
        result.extend(executed.with_filter(name));
        if result.has_errors() {
            log::debug!("{}: execution failed, discarding {} change(s)", name, staged.len());
            return result;
        }

        if let Err(e) = staged.commit(store) {
            result.push_error(
                DiagnosticCode::Internal,
                format!("could not apply staged changes: {}", e),
            );
            return result.with_filter(name);
        }
        log::debug!("{}: done ({})", name, result.summary());
        result
    }
}

/// Bind arguments and run `preflight_impl`; diagnostics are stamped with
/// the filter name. Returns the bound arguments for execution.
fn prepare<F: Filter + ?Sized>(
    filter: &F,
    store: &DataStructure,
    args: &Arguments,
) -> (Arguments, Preflight) {
    let name = filter.name();
    log::debug!("{}: preflight", name);
    let (bound, bind_result) = parameters::bind(&filter.parameters(), args);
    if bind_result.has_errors() {
        return (bound, Preflight::failed(bind_result.with_filter(name)));
    }
    let preflight = filter.preflight_impl(store, &bound);
    let result = ExecutionResult::merge(bind_result, preflight.result).with_filter(name);
    (
        bound,
        Preflight {
            result,
            actions: preflight.actions,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::object::{DataArray, DataObject, DataType};
    use crate::core::path::DataPath;

    /// Creates a group at `path` and, when `fail_late` is set, reports an
    /// error after staging it.
    struct MakeGroup;

    impl Filter for MakeGroup {
        fn metadata(&self) -> FilterMetadata {
            FilterMetadata {
                name: "make_group",
                uuid: Uuid::from_u128(1),
                human_name: "Make Group",
                tags: &["test"],
                version: 1,
            }
        }

        fn parameters(&self) -> Vec<ParameterSpec> {
            vec![
                ParameterSpec::required("path", "Path", ParameterKind::DataPath),
                ParameterSpec::optional("fail_late", "Fail Late", ParameterKind::Bool, false),
            ]
        }

        fn preflight_impl(&self, _store: &DataStructure, args: &Arguments) -> Preflight {
            match args.get_data_path("path") {
                Ok(path) => Preflight::new(
                    ExecutionResult::new(),
                    vec![OutputAction::Create {
                        path,
                        subtree: crate::core::store::Subtree::leaf(DataObject::Group),
                        overwrite: false,
                    }],
                ),
                Err(e) => Preflight::failed(ExecutionResult::from_error(
                    DiagnosticCode::Internal,
                    e.to_string(),
                )),
            }
        }

        fn execute_impl(
            &self,
            _store: &DataStructure,
            args: &Arguments,
            _ctx: &ExecutionContext,
            changes: &mut ChangeSet,
        ) -> ExecutionResult {
            if let Ok(path) = args.get_data_path("path") {
                changes.create(path, DataObject::Group, false);
            }
            if args.get_bool("fail_late").unwrap_or(false) {
                return ExecutionResult::from_error(DiagnosticCode::WriteError, "late failure");
            }
            ExecutionResult::new()
        }
    }

    fn p(s: &str) -> DataPath {
        DataPath::parse(s).unwrap()
    }

    mod preflight {
        use super::*;

        #[test]
        fn does_not_mutate() {
            let store = DataStructure::new();
            let args = Arguments::new().with("path", "G");
            let result = MakeGroup.preflight(&store, &args);
            assert!(result.is_clean());
            assert!(store.is_empty());
        }

        #[test]
        fn reports_duplicate_output() {
            let mut store = DataStructure::new();
            store.create(&p("G"), DataObject::Group, false).unwrap();
            let result = MakeGroup.preflight(&store, &Arguments::new().with("path", "G"));
            assert!(result.has_error_code(DiagnosticCode::DuplicatePath));
            assert_eq!(result.errors[0].filter.as_deref(), Some("make_group"));
        }

        #[test]
        fn binding_errors_stop_early() {
            let store = DataStructure::new();
            let result = MakeGroup.preflight(&store, &Arguments::new());
            assert_eq!(result.errors.len(), 1);
            assert_eq!(result.errors[0].code, DiagnosticCode::MissingParameter);
        }
    }

    mod execute {
        use super::*;

        #[test]
        fn commits_on_success() {
            let mut store = DataStructure::new();
            let result = MakeGroup.execute(&mut store, &Arguments::new().with("path", "G"));
            assert!(result.is_clean());
            assert_eq!(store.get(&p("G")), Some(&DataObject::Group));
        }

        #[test]
        fn errors_discard_staged_changes() {
            let mut store = DataStructure::new();
            let args = Arguments::new().with("path", "G").with("fail_late", true);
            let result = MakeGroup.execute(&mut store, &args);
            assert!(result.has_error_code(DiagnosticCode::WriteError));
            assert!(store.is_empty());
        }

        #[test]
        fn preflight_errors_match_execute_errors() {
            let mut store = DataStructure::new();
            store
                .create(
                    &p("G"),
                    DataArray::zeroed(DataType::UInt8, 1, 1).unwrap().into(),
                    false,
                )
                .unwrap();
            let args = Arguments::new().with("path", "G");
            let before = store.clone();
            let pre = MakeGroup.preflight(&store, &args);
            let exec = MakeGroup.execute(&mut store, &args);
            assert_eq!(pre.errors, exec.errors);
            assert_eq!(store, before);
        }

        #[test]
        fn cancelled_context_does_nothing() {
            let mut store = DataStructure::new();
            let ctx = ExecutionContext::new();
            ctx.cancel_token().cancel();
            let result = MakeGroup.execute_with(&mut store, &Arguments::new().with("path", "G"), &ctx);
            assert!(result.has_error_code(DiagnosticCode::Cancelled));
            assert!(store.is_empty());
        }
    }

    #[test]
    fn usable_as_trait_object() {
        let filters: Vec<Box<dyn Filter>> = vec![Box::new(MakeGroup)];
        assert_eq!(filters[0].name(), "make_group");
        let mut store = DataStructure::new();
        assert!(filters[0]
            .execute(&mut store, &Arguments::new().with("path", "X"))
            .is_clean());
    }
}
