//! filter::changes
//!
//! Staged store mutations.
//!
//! # Architecture
//!
//! Filters never mutate the store directly. During preflight they declare
//! the objects they will produce as [`OutputAction`]s (with placeholder
//! contents); during execution they stage the real objects in a
//! [`ChangeSet`]. The driver commits the change set only when execution
//! reported no errors.
//!
//! # Invariants
//!
//! - A commit is all-or-nothing: if any action fails, every action already
//!   applied is undone in reverse order and the store compares equal to its
//!   state before the commit
//! - Actions apply in the order they were staged

use crate::core::object::DataObject;
use crate::core::path::DataPath;
use crate::core::store::{DataStructure, StoreError, Subtree};

use super::result::{DiagnosticCode, ExecutionResult};

/// One store mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputAction {
    /// Create every missing group along the path.
    CreateGroups(DataPath),
    /// Insert an object (and its descendants) at `path`.
    Create {
        path: DataPath,
        subtree: Subtree,
        overwrite: bool,
    },
    /// Remove the object at `path` with its descendants.
    Remove(DataPath),
}

impl OutputAction {
    /// The path this action targets.
    pub fn path(&self) -> &DataPath {
        match self {
            OutputAction::CreateGroups(path) | OutputAction::Remove(path) => path,
            OutputAction::Create { path, .. } => path,
        }
    }
}

/// Map a store error to the diagnostic code reported for it.
pub fn store_error_code(err: &StoreError) -> DiagnosticCode {
    match err {
        StoreError::DuplicatePath(_) => DiagnosticCode::DuplicatePath,
        StoreError::NotFound(_) | StoreError::ParentNotFound(_) => DiagnosticCode::PathNotFound,
        StoreError::NotAContainer { .. } => DiagnosticCode::TypeMismatch,
        StoreError::InvalidChild { .. } => DiagnosticCode::InvalidPlacement,
        StoreError::TupleCountMismatch { .. } => DiagnosticCode::TupleCountMismatch,
    }
}

/// Apply declared actions to a scratch store, collecting one diagnostic per
/// failing action.
///
/// Used by preflight to check declared outputs without touching the real
/// store; later actions see the effect of earlier successful ones.
pub fn apply_declared(store: &mut DataStructure, actions: &[OutputAction]) -> ExecutionResult {
    let mut result = ExecutionResult::new();
    for action in actions {
        if let Err(e) = apply_one(store, action.clone()) {
            result.push_error(store_error_code(&e), e.to_string());
        }
    }
    result
}

/// Check declared actions against `store` without copying it.
///
/// Each action is checked against the current store contents as modified
/// by the earlier actions in the list: a missing parent is accepted when an
/// earlier action creates it, and anything under an earlier removal counts
/// as absent. Deeper conflicts are still caught at commit time.
pub fn check_declared(store: &DataStructure, actions: &[OutputAction]) -> ExecutionResult {
    let mut result = ExecutionResult::new();
    let mut produced: Vec<&DataPath> = Vec::new();
    let mut removed: Vec<&DataPath> = Vec::new();
    let made_earlier = |produced: &[&DataPath], path: &DataPath| {
        produced.iter().any(|p| p.starts_with(path))
    };
    let in_store = |removed: &[&DataPath], path: &DataPath| {
        store.contains(path) && !removed.iter().any(|r| path.starts_with(r))
    };

    for action in actions {
        match action {
            OutputAction::CreateGroups(path) => {
                let blocker = (1..=path.depth())
                    .filter_map(|n| DataPath::new(path.segments()[..n].iter().cloned()).ok())
                    .filter(|prefix| in_store(&removed, prefix))
                    .find_map(|prefix| {
                        store
                            .get(&prefix)
                            .filter(|o| !o.is_container())
                            .map(|o| (prefix.clone(), o.kind()))
                    });
                if let Some((prefix, kind)) = blocker {
                    let e = StoreError::NotAContainer { path: prefix, kind };
                    result.push_error(store_error_code(&e), e.to_string());
                }
                produced.push(path);
            }
            OutputAction::Create {
                path,
                subtree,
                overwrite,
            } => {
                let missing_parent = path
                    .parent()
                    .filter(|parent| !in_store(&removed, parent) && !made_earlier(&produced, parent));
                if let Some(parent) = missing_parent {
                    let e = StoreError::ParentNotFound(parent);
                    result.push_error(store_error_code(&e), e.to_string());
                } else {
                    match store.check_create(path, &subtree.object, *overwrite) {
                        Err(StoreError::ParentNotFound(_)) => {}
                        Err(StoreError::DuplicatePath(_)) if !in_store(&removed, path) => {}
                        Err(e) => result.push_error(store_error_code(&e), e.to_string()),
                        Ok(()) => {}
                    }
                }
                produced.push(path);
            }
            OutputAction::Remove(path) => {
                if !in_store(&removed, path) && !made_earlier(&produced, path) {
                    let e = StoreError::NotFound(path.clone());
                    result.push_error(store_error_code(&e), e.to_string());
                }
                produced.retain(|p| !p.starts_with(path));
                removed.push(path);
            }
        }
    }
    result
}

/// Undo record for one applied action.
enum Undo {
    Created(DataPath),
    Replaced { path: DataPath, previous: Subtree },
    Removed { path: DataPath, previous: Subtree },
}

/// Error from a failed commit. The store has been rolled back.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitError {
    /// Index of the action that failed.
    pub index: usize,
    pub source: StoreError,
}

impl std::fmt::Display for CommitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "staged change {} failed: {}", self.index, self.source)
    }
}

impl std::error::Error for CommitError {}

/// Ordered mutations staged by one filter execution.
///
/// # Example
///
/// ```
/// use meshpipe::core::object::DataObject;
/// use meshpipe::core::path::DataPath;
/// use meshpipe::core::store::DataStructure;
/// use meshpipe::filter::changes::ChangeSet;
///
/// let mut store = DataStructure::new();
/// let mut changes = ChangeSet::new();
/// changes.create_groups(DataPath::parse("A/B").unwrap());
/// changes.create(DataPath::parse("A/B/C").unwrap(), DataObject::Group, false);
/// changes.commit(&mut store).unwrap();
/// assert_eq!(store.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    actions: Vec<OutputAction>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_groups(&mut self, path: DataPath) {
        self.actions.push(OutputAction::CreateGroups(path));
    }

    pub fn create(&mut self, path: DataPath, object: DataObject, overwrite: bool) {
        self.attach(path, Subtree::leaf(object), overwrite);
    }

    pub fn attach(&mut self, path: DataPath, subtree: Subtree, overwrite: bool) {
        self.actions.push(OutputAction::Create {
            path,
            subtree,
            overwrite,
        });
    }

    pub fn remove(&mut self, path: DataPath) {
        self.actions.push(OutputAction::Remove(path));
    }

    pub fn actions(&self) -> &[OutputAction] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Apply every staged action to `store`, or none of them.
    ///
    /// # Errors
    ///
    /// Returns the index and cause of the first failing action. All
    /// previously applied actions have been undone when this returns.
    pub fn commit(self, store: &mut DataStructure) -> Result<usize, CommitError> {
        let count = self.actions.len();
        let mut undo: Vec<Undo> = Vec::with_capacity(count);

        for (index, action) in self.actions.into_iter().enumerate() {
            match apply_logged(store, action, &mut undo) {
                Ok(()) => {}
                Err(source) => {
                    log::warn!(
                        "rolling back {} applied change(s) after failure: {}",
                        undo.len(),
                        source
                    );
                    rollback(store, undo);
                    return Err(CommitError { index, source });
                }
            }
        }

        log::debug!("committed {} change(s)", count);
        Ok(count)
    }
}

fn apply_one(store: &mut DataStructure, action: OutputAction) -> Result<(), StoreError> {
    let mut undo = Vec::new();
    apply_logged(store, action, &mut undo)
}

fn apply_logged(
    store: &mut DataStructure,
    action: OutputAction,
    undo: &mut Vec<Undo>,
) -> Result<(), StoreError> {
    match action {
        OutputAction::CreateGroups(path) => {
            let mut created = Vec::new();
            let mut prefix: Option<DataPath> = None;
            for segment in path.segments() {
                let next = match &prefix {
                    Some(p) => p.join(segment.clone()),
                    None => DataPath::new([segment.clone()]),
                }
                .map_err(|_| StoreError::NotFound(path.clone()))?;
                if !store.contains(&next) {
                    created.push(next.clone());
                }
                prefix = Some(next);
            }
            match store.create_groups(&path) {
                Ok(_) => {
                    undo.extend(created.into_iter().map(Undo::Created));
                    Ok(())
                }
                Err(e) => {
                    // create_groups stops at the first failure; drop what it made.
                    for p in created.iter().rev() {
                        let _ = store.remove(p);
                    }
                    Err(e)
                }
            }
        }
        OutputAction::Create {
            path,
            subtree,
            overwrite,
        } => {
            let previous = if overwrite { store.snapshot(&path) } else { None };
            store.attach(&path, subtree, overwrite)?;
            undo.push(match previous {
                Some(previous) => Undo::Replaced { path, previous },
                None => Undo::Created(path),
            });
            Ok(())
        }
        OutputAction::Remove(path) => {
            let previous = store.detach(&path)?;
            undo.push(Undo::Removed { path, previous });
            Ok(())
        }
    }
}

fn rollback(store: &mut DataStructure, undo: Vec<Undo>) {
    for entry in undo.into_iter().rev() {
        let outcome = match entry {
            Undo::Created(path) => store.remove(&path).map(|_| ()),
            Undo::Replaced { path, previous } => store
                .detach(&path)
                .and_then(|_| store.attach(&path, previous, false))
                .map(|_| ()),
            Undo::Removed { path, previous } => store.attach(&path, previous, false).map(|_| ()),
        };
        if let Err(e) = outcome {
            log::warn!("rollback step failed: {}", e);
        }
    }
}
