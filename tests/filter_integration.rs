//! Integration tests for the built-in filters.
//!
//! These run filters end to end against real files in temporary
//! directories.

mod common;

use std::fs;

use tempfile::TempDir;

use meshpipe::codec::{container, xdmf};
use meshpipe::core::object::DataObject;
use meshpipe::core::path::DataPath;
use meshpipe::core::store::DataStructure;
use meshpipe::filter::{Arguments, DiagnosticCode, Filter, FilterRegistry};
use meshpipe::filters::{CreateDataGroup, DeleteData, ExportStore, ImportGeometryFromFile, ReadStore};

fn p(s: &str) -> DataPath {
    DataPath::parse(s).unwrap()
}

fn import_args(file: &std::path::Path, geometry: &str) -> Arguments {
    Arguments::new()
        .with("file_path", file)
        .with("geometry_path", geometry)
}

mod cube_scenario {
    use super::*;

    #[test]
    fn import_export_reimport() {
        let dir = TempDir::new().unwrap();
        let stl = common::write_cube(dir.path());
        let mut store = DataStructure::new();

        let result = ImportGeometryFromFile.execute(&mut store, &import_args(&stl, "Cube"));
        assert!(result.errors.is_empty(), "{}", result);

        let geometry = store.get(&p("Cube")).and_then(DataObject::as_geometry).unwrap();
        assert_eq!(geometry.vertex_count(), 8);
        assert_eq!(geometry.face_count(), 12);
        assert!(store.contains(&p("Cube/Vertex Data")));
        assert!(store.contains(&p("Cube/Face Data/Face Normals")));

        let destination = dir.path().join("out/cube.mpc");
        let result = ExportStore.execute(
            &mut store,
            &Arguments::new().with("destination", destination.as_path()),
        );
        assert!(result.errors.is_empty(), "{}", result);
        assert!(destination.is_file());
        assert!(xdmf::sibling_path(&destination).is_file());

        let mut reloaded = DataStructure::new();
        let result = ReadStore.execute(
            &mut reloaded,
            &Arguments::new().with("file_path", destination.as_path()),
        );
        assert!(result.errors.is_empty(), "{}", result);
        let geometry = reloaded.get(&p("Cube")).and_then(DataObject::as_geometry).unwrap();
        assert_eq!(geometry.face_count(), 12);
        assert_eq!(reloaded, store);
        assert_eq!(reloaded.fingerprint(), store.fingerprint());
    }

    #[test]
    fn nested_geometry_path_creates_groups() {
        let dir = TempDir::new().unwrap();
        let stl = common::write_cube(dir.path());
        let mut store = DataStructure::new();
        let result = ImportGeometryFromFile.execute(&mut store, &import_args(&stl, "Parts/Left/Cube"));
        assert!(result.is_clean(), "{}", result);
        assert_eq!(store.get(&p("Parts")), Some(&DataObject::Group));
        assert_eq!(store.get(&p("Parts/Left")), Some(&DataObject::Group));
    }

    #[test]
    fn scaling_moves_vertices() {
        let dir = TempDir::new().unwrap();
        let stl = common::write_cube(dir.path());
        let mut store = DataStructure::new();
        let args = import_args(&stl, "Cube")
            .with("scale_factor", 2.5)
            .with("apply_scale", true);
        assert!(ImportGeometryFromFile.execute(&mut store, &args).is_clean());
        let geometry = store.get(&p("Cube")).and_then(DataObject::as_geometry).unwrap();
        let (_, max) = geometry.bounds().unwrap();
        assert_eq!(max, [2.5, 2.5, 2.5]);
    }
}

mod failures {
    use super::*;

    #[test]
    fn nonexistent_file_is_one_error_and_no_warnings() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist.stl");
        let mut store = DataStructure::new();

        let result = ImportGeometryFromFile.execute(&mut store, &import_args(&missing, "Cube"));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, DiagnosticCode::FileNotFound);
        assert!(result.warnings.is_empty());
        assert!(!store.contains(&p("Cube")));
        assert!(store.is_empty());
    }

    #[test]
    fn non_manifold_mesh_is_rejected_without_changes() {
        let dir = TempDir::new().unwrap();
        let stl = dir.path().join("fin.stl");
        fs::write(&stl, common::non_manifold_stl()).unwrap();
        let mut store = DataStructure::new();

        let result = ImportGeometryFromFile.execute(&mut store, &import_args(&stl, "Fin"));
        assert!(result.has_error_code(DiagnosticCode::InvalidGeometry));
        assert!(store.is_empty());
    }

    #[test]
    fn garbage_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let stl = dir.path().join("junk.stl");
        fs::write(&stl, b"this is not a mesh").unwrap();
        let mut store = DataStructure::new();
        let result = ImportGeometryFromFile.execute(&mut store, &import_args(&stl, "Junk"));
        assert!(result.has_error_code(DiagnosticCode::ParseError));
        assert!(store.is_empty());
    }

    #[test]
    fn existing_target_is_a_duplicate() {
        let dir = TempDir::new().unwrap();
        let stl = common::write_cube(dir.path());
        let mut store = DataStructure::new();
        store.create(&p("Cube"), DataObject::Group, false).unwrap();
        let before = store.clone();

        let result = ImportGeometryFromFile.execute(&mut store, &import_args(&stl, "Cube"));
        assert!(result.has_error_code(DiagnosticCode::DuplicatePath));
        assert_eq!(store, before);
    }

    #[test]
    fn tampered_container_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = DataStructure::new();
        store.create(&p("Group"), DataObject::Group, false).unwrap();
        let file = dir.path().join("s.mpc");
        fs::write(&file, container::encode(&store).unwrap()).unwrap();

        let text = fs::read_to_string(&file).unwrap().replace("Group", "Gruop");
        fs::write(&file, text).unwrap();

        let mut target = DataStructure::new();
        let result = ReadStore.execute(&mut target, &Arguments::new().with("file_path", file.as_path()));
        assert!(result.has_error_code(DiagnosticCode::ParseError));
        assert!(target.is_empty());
    }
}

mod preflight_purity {
    use super::*;

    fn populated(dir: &TempDir) -> DataStructure {
        let stl = common::write_cube(dir.path());
        let mut store = DataStructure::new();
        assert!(ImportGeometryFromFile
            .execute(&mut store, &import_args(&stl, "Cube"))
            .is_clean());
        store
    }

    #[test]
    fn every_builtin_filter_leaves_store_untouched() {
        let dir = TempDir::new().unwrap();
        let store = populated(&dir);
        let fingerprint = store.fingerprint();
        let snapshot = store.clone();
        let stl = common::write_cube(dir.path());

        let cases: Vec<(&str, Arguments)> = vec![
            ("import_geometry_from_file", import_args(&stl, "Other")),
            ("import_geometry_from_file", import_args(&stl, "Cube")),
            (
                "export_store",
                Arguments::new().with("destination", dir.path().join("x.mpc").as_path()),
            ),
            ("read_store", Arguments::new().with("file_path", "missing.mpc")),
            ("create_data_group", Arguments::new().with("data_path", "New")),
            ("delete_data", Arguments::new().with("data_path", "Cube")),
            ("delete_data", Arguments::new().with("bogus", true)),
        ];

        let registry = FilterRegistry::with_builtin();
        for (name, args) in cases {
            let filter = registry.by_name(name).unwrap();
            let _ = filter.preflight(&store, &args);
            assert_eq!(store.fingerprint(), fingerprint, "{} changed the store", name);
        }
        assert_eq!(store, snapshot);
        assert!(!dir.path().join("x.mpc").exists());
    }

    #[test]
    fn preflight_predicts_execute_outcome() {
        let dir = TempDir::new().unwrap();
        let mut store = populated(&dir);

        let args = Arguments::new().with("data_path", "Cube");
        assert!(!DeleteData.preflight(&store, &args).has_errors());
        assert!(!DeleteData.execute(&mut store, &args).has_errors());
        assert!(store.is_empty());

        let args = Arguments::new().with("data_path", "A/B");
        assert!(CreateDataGroup.preflight(&store, &args).has_errors());
        assert!(CreateDataGroup.execute(&mut store, &args).has_errors());
    }

    #[test]
    fn parameter_problems_are_all_reported() {
        let store = DataStructure::new();
        let args = Arguments::new()
            .with("geometry_path", 3_i64)
            .with("colour", "red");
        let result = ImportGeometryFromFile.preflight(&store, &args);
        assert!(result.has_error_code(DiagnosticCode::UnknownParameter));
        assert!(result.has_error_code(DiagnosticCode::MissingParameter));
        assert!(result.has_error_code(DiagnosticCode::ParameterTypeError));
    }
}
