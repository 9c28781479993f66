//! core::store
//!
//! The in-memory data structure that filters read from and write to.
//!
//! # Architecture
//!
//! Objects live in an arena keyed by [`ObjectId`]. Each node owns its
//! object, its name and an ordered map of child ids; the parent link is a
//! plain id used for lookups only. Ownership is top-down: removing a node
//! removes its whole subtree.
//!
//! # Invariants
//!
//! - No two objects share a [`DataPath`]
//! - A node's parent exists and is a container (anything but an array)
//! - Children of an attribute matrix are arrays with the matrix's tuple count
//! - A matrix registered as a geometry's vertex (face) data has the
//!   geometry's vertex (face) count
//! - Every failed mutation leaves the store unchanged
//!
//! # Example
//!
//! ```
//! use meshpipe::core::object::DataObject;
//! use meshpipe::core::path::DataPath;
//! use meshpipe::core::store::{DataStructure, StoreError};
//!
//! let mut store = DataStructure::new();
//! let a = DataPath::parse("A").unwrap();
//! let ab = DataPath::parse("A/B").unwrap();
//!
//! store.create(&a, DataObject::Group, false).unwrap();
//! store.create(&ab, DataObject::Group, false).unwrap();
//! assert!(matches!(
//!     store.create(&a, DataObject::Group, false),
//!     Err(StoreError::DuplicatePath(_))
//! ));
//!
//! store.remove(&a).unwrap();
//! assert!(store.get(&ab).is_none());
//! ```

use std::collections::{BTreeMap, HashMap};

use sha2::{Digest, Sha256};
use thiserror::Error;

use super::object::{DataObject, ObjectKind};
use super::path::DataPath;

/// Errors from store mutations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("an object already exists at '{0}'")]
    DuplicatePath(DataPath),

    #[error("no object exists at '{0}'")]
    NotFound(DataPath),

    #[error("parent '{0}' does not exist")]
    ParentNotFound(DataPath),

    #[error("'{path}' is a {kind} and cannot hold children")]
    NotAContainer { path: DataPath, kind: ObjectKind },

    #[error("a {child} cannot be placed inside the {parent} at '{path}'")]
    InvalidChild {
        path: DataPath,
        parent: ObjectKind,
        child: ObjectKind,
    },

    #[error("'{path}' must have {expected} tuples, found {actual}")]
    TupleCountMismatch {
        path: DataPath,
        expected: usize,
        actual: usize,
    },
}

/// Stable handle to a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<ObjectId>,
    children: BTreeMap<String, ObjectId>,
    object: DataObject,
}

/// A detached object together with all of its descendants.
///
/// Produced by [`DataStructure::detach`] and consumed by
/// [`DataStructure::attach`]; also the in-memory shape the container codec
/// reads and writes.
#[derive(Debug, Clone, PartialEq)]
pub struct Subtree {
    pub object: DataObject,
    pub children: BTreeMap<String, Subtree>,
}

impl Subtree {
    pub fn leaf(object: DataObject) -> Self {
        Self {
            object,
            children: BTreeMap::new(),
        }
    }

    pub fn with_child(mut self, name: impl Into<String>, child: Subtree) -> Self {
        self.children.insert(name.into(), child);
        self
    }

    /// Number of objects in the subtree, including the root.
    pub fn object_count(&self) -> usize {
        1 + self.children.values().map(Subtree::object_count).sum::<usize>()
    }
}

/// Hierarchical store of named, typed objects.
#[derive(Debug, Clone, Default)]
pub struct DataStructure {
    nodes: HashMap<ObjectId, Node>,
    roots: BTreeMap<String, ObjectId>,
    next_id: u64,
}

impl DataStructure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects in the store.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Resolve a path to its node id.
    pub fn id_of(&self, path: &DataPath) -> Option<ObjectId> {
        let mut segments = path.segments().iter();
        let mut id = *self.roots.get(segments.next()?)?;
        for segment in segments {
            id = *self.nodes.get(&id)?.children.get(segment)?;
        }
        Some(id)
    }

    /// The object at `path`, if any.
    pub fn get(&self, path: &DataPath) -> Option<&DataObject> {
        self.id_of(path).and_then(|id| self.object(id))
    }

    pub fn contains(&self, path: &DataPath) -> bool {
        self.id_of(path).is_some()
    }

    pub fn object(&self, id: ObjectId) -> Option<&DataObject> {
        self.nodes.get(&id).map(|n| &n.object)
    }

    /// The id of the node's parent, or `None` for top-level objects.
    pub fn parent_of(&self, id: ObjectId) -> Option<ObjectId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Rebuild the path of a node by walking parent links.
    pub fn path_of(&self, id: ObjectId) -> Option<DataPath> {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = self.nodes.get(&cur)?;
            segments.push(node.name.clone());
            current = node.parent;
        }
        segments.reverse();
        DataPath::new(segments).ok()
    }

    /// Paths of the direct children of `path` in name order.
    pub fn children(&self, path: &DataPath) -> Option<Vec<DataPath>> {
        let node = self.nodes.get(&self.id_of(path)?)?;
        node.children
            .keys()
            .map(|name| path.join(name.clone()).ok())
            .collect()
    }

    /// Paths of all top-level objects in name order.
    pub fn top_level(&self) -> Vec<DataPath> {
        self.roots
            .keys()
            .filter_map(|name| DataPath::new([name.clone()]).ok())
            .collect()
    }

    /// Depth-first iterator over every path at or under `prefix`, or over
    /// the whole store when `prefix` is `None`.
    ///
    /// Siblings are visited in name order. The iterator is lazy and can be
    /// cloned to restart from the same position.
    pub fn list(&self, prefix: Option<&DataPath>) -> Paths<'_> {
        let stack = match prefix {
            Some(p) => self.id_of(p).into_iter().collect(),
            None => self.roots.values().rev().copied().collect(),
        };
        Paths { store: self, stack }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Check whether `object` could be created at `path` without mutating.
    ///
    /// This is the validation half of [`create`](Self::create) and is used
    /// by preflight to detect conflicts ahead of execution.
    pub fn check_create(
        &self,
        path: &DataPath,
        object: &DataObject,
        overwrite: bool,
    ) -> Result<(), StoreError> {
        if self.contains(path) && !overwrite {
            return Err(StoreError::DuplicatePath(path.clone()));
        }
        if let Some(parent_path) = path.parent() {
            let parent = self
                .get(&parent_path)
                .ok_or_else(|| StoreError::ParentNotFound(parent_path.clone()))?;
            check_child(&parent_path, parent, path.name(), object)?;
        }
        Ok(())
    }

    /// Create an object at `path`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::DuplicatePath`] if the path is taken and `overwrite` is false
    /// - [`StoreError::ParentNotFound`] / [`StoreError::NotAContainer`] for a bad parent
    /// - [`StoreError::InvalidChild`] / [`StoreError::TupleCountMismatch`] when
    ///   the object breaks a parent's invariant
    ///
    /// On error the store is unchanged. With `overwrite`, the previous
    /// object and its whole subtree are dropped.
    pub fn create(
        &mut self,
        path: &DataPath,
        object: DataObject,
        overwrite: bool,
    ) -> Result<ObjectId, StoreError> {
        self.attach(path, Subtree::leaf(object), overwrite)
    }

    /// Create every missing group along `path` (like `mkdir -p`).
    ///
    /// Existing containers along the way are reused.
    pub fn create_groups(&mut self, path: &DataPath) -> Result<ObjectId, StoreError> {
        let mut current: Option<DataPath> = None;
        let mut id = None;
        for segment in path.segments() {
            let next = match &current {
                Some(p) => p.join(segment.clone()),
                None => DataPath::new([segment.clone()]),
            }
            .map_err(|_| StoreError::NotFound(path.clone()))?;
            id = Some(match self.id_of(&next) {
                Some(existing) => {
                    let object = &self.nodes[&existing].object;
                    if !object.is_container() {
                        return Err(StoreError::NotAContainer {
                            path: next,
                            kind: object.kind(),
                        });
                    }
                    existing
                }
                None => self.create(&next, DataObject::Group, false)?,
            });
            current = Some(next);
        }
        id.ok_or_else(|| StoreError::NotFound(path.clone()))
    }

    /// Remove the object at `path` and all of its descendants.
    pub fn remove(&mut self, path: &DataPath) -> Result<DataObject, StoreError> {
        self.detach(path).map(|subtree| subtree.object)
    }

    /// Remove the subtree at `path` and return it intact.
    pub fn detach(&mut self, path: &DataPath) -> Result<Subtree, StoreError> {
        let id = self
            .id_of(path)
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;
        let parent = self.nodes.get(&id).and_then(|n| n.parent);
        match parent {
            Some(pid) => {
                if let Some(p) = self.nodes.get_mut(&pid) {
                    p.children.remove(path.name());
                }
            }
            None => {
                self.roots.remove(path.name());
            }
        }
        Ok(self.take_subtree(id))
    }

    /// Insert a whole subtree at `path`.
    ///
    /// Every node of the subtree is validated before anything is inserted,
    /// so a subtree that breaks an invariant leaves the store unchanged.
    pub fn attach(
        &mut self,
        path: &DataPath,
        subtree: Subtree,
        overwrite: bool,
    ) -> Result<ObjectId, StoreError> {
        self.check_create(path, &subtree.object, overwrite)?;
        check_subtree(path, &subtree)?;

        if self.contains(path) {
            self.detach(path)?;
        }

        let parent = match path.parent() {
            Some(p) => Some(
                self.id_of(&p)
                    .ok_or_else(|| StoreError::ParentNotFound(p.clone()))?,
            ),
            None => None,
        };
        Ok(self.insert_subtree(parent, path.name().to_string(), subtree))
    }

    fn take_subtree(&mut self, id: ObjectId) -> Subtree {
        // Callers pass ids they just resolved, so the node is present.
        let node = match self.nodes.remove(&id) {
            Some(node) => node,
            None => return Subtree::leaf(DataObject::Group),
        };
        let children = node
            .children
            .into_iter()
            .map(|(name, child)| (name, self.take_subtree(child)))
            .collect();
        Subtree {
            object: node.object,
            children,
        }
    }

    fn insert_subtree(&mut self, parent: Option<ObjectId>, name: String, subtree: Subtree) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;

        match parent {
            Some(pid) => {
                if let Some(p) = self.nodes.get_mut(&pid) {
                    p.children.insert(name.clone(), id);
                }
            }
            None => {
                self.roots.insert(name.clone(), id);
            }
        }
        self.nodes.insert(
            id,
            Node {
                name,
                parent,
                children: BTreeMap::new(),
                object: subtree.object,
            },
        );
        for (child_name, child) in subtree.children {
            self.insert_subtree(Some(id), child_name, child);
        }
        id
    }

    /// Copy the subtree at `path` without removing it.
    pub fn snapshot(&self, path: &DataPath) -> Option<Subtree> {
        self.id_of(path).map(|id| self.snapshot_node(id))
    }

    fn snapshot_node(&self, id: ObjectId) -> Subtree {
        let node = &self.nodes[&id];
        Subtree {
            object: node.object.clone(),
            children: node
                .children
                .iter()
                .map(|(name, child)| (name.clone(), self.snapshot_node(*child)))
                .collect(),
        }
    }

    /// SHA-256 over a canonical rendering of every path and object.
    ///
    /// Two stores with the same fingerprint hold the same paths and the
    /// same object contents.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for path in self.list(None) {
            hasher.update(path.to_string().as_bytes());
            hasher.update([0u8]);
            if let Some(object) = self.get(&path) {
                hasher.update(format!("{:?}", object).as_bytes());
            }
            hasher.update([b'\n']);
        }
        hex::encode(hasher.finalize())
    }
}

impl PartialEq for DataStructure {
    /// Structural equality: same paths holding equal objects. Arena ids are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .list(None)
                .zip(other.list(None))
                .all(|(a, b)| a == b && self.get(&a) == other.get(&b))
    }
}

/// Parent/child placement rules.
fn check_child(
    parent_path: &DataPath,
    parent: &DataObject,
    name: &str,
    child: &DataObject,
) -> Result<(), StoreError> {
    let child_path = || {
        parent_path
            .join(name.to_string())
            .unwrap_or_else(|_| parent_path.clone())
    };
    match parent {
        DataObject::Array(_) => Err(StoreError::NotAContainer {
            path: parent_path.clone(),
            kind: ObjectKind::Array,
        }),
        DataObject::AttributeMatrix(matrix) => match child {
            DataObject::Array(array) if array.tuple_count() == matrix.tuple_count() => Ok(()),
            DataObject::Array(array) => Err(StoreError::TupleCountMismatch {
                path: child_path(),
                expected: matrix.tuple_count(),
                actual: array.tuple_count(),
            }),
            other => Err(StoreError::InvalidChild {
                path: parent_path.clone(),
                parent: ObjectKind::AttributeMatrix,
                child: other.kind(),
            }),
        },
        DataObject::Geometry(geometry) => match (child, geometry.required_tuples(name)) {
            (DataObject::AttributeMatrix(matrix), Some(expected))
                if matrix.tuple_count() != expected =>
            {
                Err(StoreError::TupleCountMismatch {
                    path: child_path(),
                    expected,
                    actual: matrix.tuple_count(),
                })
            }
            // Registered vertex/face data names only hold attribute matrices.
            (DataObject::AttributeMatrix(_), _) | (_, None) => Ok(()),
            (other, Some(_)) => Err(StoreError::InvalidChild {
                path: parent_path.clone(),
                parent: ObjectKind::Geometry,
                child: other.kind(),
            }),
        },
        DataObject::Group => Ok(()),
    }
}

fn check_subtree(path: &DataPath, subtree: &Subtree) -> Result<(), StoreError> {
    for (name, child) in &subtree.children {
        check_child(path, &subtree.object, name, &child.object)?;
        let child_path = path
            .join(name.clone())
            .map_err(|_| StoreError::NotFound(path.clone()))?;
        check_subtree(&child_path, child)?;
    }
    Ok(())
}

/// Lazy depth-first path iterator returned by [`DataStructure::list`].
#[derive(Debug, Clone)]
pub struct Paths<'a> {
    store: &'a DataStructure,
    stack: Vec<ObjectId>,
}

impl Iterator for Paths<'_> {
    type Item = DataPath;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let id = self.stack.pop()?;
            let Some(node) = self.store.nodes.get(&id) else {
                continue;
            };
            self.stack.extend(node.children.values().rev().copied());
            if let Some(path) = self.store.path_of(id) {
                return Some(path);
            }
        }
    }
}
