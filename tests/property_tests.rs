//! Property-based tests for the store, containers and filters.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use meshpipe::codec::container;
use meshpipe::core::object::{ArrayData, DataArray, DataObject};
use meshpipe::core::path::DataPath;
use meshpipe::core::store::{DataStructure, StoreError};
use meshpipe::filter::{Arguments, Filter};
use meshpipe::filters::{CreateDataGroup, DeleteData};

/// Strategy for a single path segment.
fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 _.-]{1,12}"
}

/// Strategy for valid data paths of depth 1..=4.
fn data_path() -> impl Strategy<Value = DataPath> {
    prop::collection::vec(segment(), 1..=4).prop_map(|segments| DataPath::new(segments).unwrap())
}

/// Strategy for leaf objects.
fn leaf_object() -> impl Strategy<Value = DataObject> {
    prop_oneof![
        Just(DataObject::Group),
        (1usize..4, prop::collection::vec(-1.0e6f32..1.0e6, 0..24)).prop_map(|(components, mut values)| {
            values.truncate(values.len() / components * components);
            DataArray::new(ArrayData::Float32(values), components).unwrap().into()
        }),
        prop::collection::vec(any::<i32>(), 0..24)
            .prop_map(|values| DataArray::new(ArrayData::Int32(values), 1).unwrap().into()),
        prop::collection::vec(any::<bool>(), 0..8)
            .prop_map(|values| DataArray::new(ArrayData::Bool(values), 1).unwrap().into()),
    ]
}

/// Create `object` at `path`, making parents as needed.
fn insert(store: &mut DataStructure, path: &DataPath, object: DataObject) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        store.create_groups(&parent)?;
    }
    store.create(path, object, false).map(|_| ())
}

/// Strategy for stores built from a handful of random inserts.
fn store() -> impl Strategy<Value = DataStructure> {
    prop::collection::vec((data_path(), leaf_object()), 0..12).prop_map(|entries| {
        let mut store = DataStructure::new();
        for (path, object) in entries {
            // Collisions with existing arrays are simply skipped.
            let _ = insert(&mut store, &path, object);
        }
        store
    })
}

proptest! {
    #[test]
    fn path_display_parses_back(path in data_path()) {
        let text = path.to_string();
        prop_assert_eq!(DataPath::parse(&text).unwrap(), path.clone());
        prop_assert_eq!(DataPath::parse(&format!("/{}", text)).unwrap(), path);
    }

    #[test]
    fn create_then_get(path in data_path(), object in leaf_object()) {
        let mut store = DataStructure::new();
        insert(&mut store, &path, object.clone()).unwrap();
        prop_assert_eq!(store.get(&path), Some(&object));
    }

    #[test]
    fn duplicate_create_fails_and_changes_nothing(
        mut store in store(),
        path in data_path(),
        object in leaf_object(),
    ) {
        if insert(&mut store, &path, object.clone()).is_ok() {
            let before = store.clone();
            let second = store.create(&path, object, false);
            prop_assert!(
                matches!(second, Err(StoreError::DuplicatePath(_))),
                "unexpected {:?}",
                second
            );
            prop_assert_eq!(&store, &before);
            prop_assert_eq!(store.fingerprint(), before.fingerprint());
        }
    }

    #[test]
    fn remove_takes_descendants(mut store in store(), parent in data_path(), child in segment()) {
        store.create_groups(&parent).ok();
        let nested = parent.join(child).unwrap();
        if store.create(&nested, DataObject::Group, false).is_ok() {
            store.remove(&parent).unwrap();
            prop_assert!(store.get(&parent).is_none());
            prop_assert!(store.get(&nested).is_none());
            prop_assert!(store.list(None).all(|p| !p.starts_with(&parent)));
        }
    }

    #[test]
    fn container_round_trip(store in store()) {
        let bytes = container::encode(&store).unwrap();
        let decoded = container::decode(&bytes).unwrap();
        prop_assert_eq!(decoded.fingerprint(), store.fingerprint());
        prop_assert_eq!(decoded, store);
    }

    #[test]
    fn preflight_never_mutates(store in store(), target in data_path()) {
        let fingerprint = store.fingerprint();
        let args = Arguments::new().with("data_path", target);
        let _ = CreateDataGroup.preflight(&store, &args);
        let _ = DeleteData.preflight(&store, &args);
        prop_assert_eq!(store.fingerprint(), fingerprint);
    }

    #[test]
    fn failed_execute_changes_nothing(mut store in store(), target in data_path()) {
        let before = store.clone();
        let args = Arguments::new().with("data_path", target);
        let result = CreateDataGroup.execute(&mut store, &args);
        if result.has_errors() {
            prop_assert_eq!(store, before);
        } else {
            prop_assert_eq!(store.len(), before.len() + 1);
        }
    }
}
