//! filters::import_geometry
//!
//! Import a triangle mesh file into a new geometry.
//!
//! Produces, under `geometry_path`:
//!
//! ```text
//! <geometry_path>                      triangle geometry
//! ├── <vertex_attribute_matrix>        attribute matrix, one tuple per vertex
//! └── <face_attribute_matrix>          attribute matrix, one tuple per face
//!     └── <face_normals>               f32 array, 3 components
//! ```
//!
//! Missing parent groups of `geometry_path` are created.

use std::ops::Bound;
use std::path::PathBuf;

use uuid::Uuid;

use super::{argument_error, codec_error, read_input, require_file};
use crate::codec::{self, MeshData};
use crate::core::geometry::TriangleGeometry;
use crate::core::object::{ArrayData, AttributeMatrix, DataArray};
use crate::core::path::DataPath;
use crate::core::store::{DataStructure, Subtree};
use crate::filter::parameters::{Constraint, ParameterKind, ParameterSpec};
use crate::filter::result::{DiagnosticCode, ExecutionResult};
use crate::filter::{Arguments, ChangeSet, ExecutionContext, Filter, FilterMetadata, OutputAction, Preflight};

pub const NAME: &str = "import_geometry_from_file";
pub const UUID: Uuid = Uuid::from_u128(0x5c3a_7f1e_2b0d_4c6a_9e8f_1a2b_3c4d_5e01);

pub const DEFAULT_VERTEX_MATRIX: &str = "Vertex Data";
pub const DEFAULT_FACE_MATRIX: &str = "Face Data";
pub const DEFAULT_FACE_NORMALS: &str = "Face Normals";
pub const MAX_SCALE: f64 = 1.0e6;

/// Reads STL (ASCII or binary) or OFF meshes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportGeometryFromFile;

struct Params {
    file: PathBuf,
    geometry: DataPath,
    vertex_matrix: DataPath,
    face_matrix: DataPath,
    normals: DataPath,
    scale: f64,
    apply_scale: bool,
}

impl Params {
    fn from_args(args: &Arguments) -> Result<Self, ExecutionResult> {
        let geometry = args.get_data_path("geometry_path").map_err(argument_error)?;
        let child = |key: &str| -> Result<DataPath, ExecutionResult> {
            let name = args.get_string(key).map_err(argument_error)?;
            geometry.join(name).map_err(|e| {
                ExecutionResult::from_error(
                    DiagnosticCode::InvalidPath,
                    format!("parameter '{}': invalid name '{}': {}", key, name, e),
                )
            })
        };
        let vertex_matrix = child("vertex_attribute_matrix")?;
        let face_matrix = child("face_attribute_matrix")?;
        if vertex_matrix == face_matrix {
            return Err(ExecutionResult::from_error(
                DiagnosticCode::DuplicatePath,
                format!(
                    "vertex and face attribute matrices are both named '{}'",
                    vertex_matrix.name()
                ),
            ));
        }
        let normals_name = args.get_string("face_normals").map_err(argument_error)?;
        let normals = face_matrix.join(normals_name).map_err(|e| {
            ExecutionResult::from_error(
                DiagnosticCode::InvalidPath,
                format!("parameter 'face_normals': invalid name '{}': {}", normals_name, e),
            )
        })?;
        Ok(Self {
            file: args.get_file_path("file_path").map_err(argument_error)?,
            geometry,
            vertex_matrix,
            face_matrix,
            normals,
            scale: args.get_float("scale_factor").map_err(argument_error)?,
            apply_scale: args.get_bool("apply_scale").map_err(argument_error)?,
        })
    }

    /// The geometry subtree, with its matrices and normals array.
    fn subtree(&self, geometry: TriangleGeometry, normals: Vec<[f32; 3]>) -> Result<Subtree, ExecutionResult> {
        let nv = geometry.vertex_count();
        let nf = geometry.face_count();
        let flat: Vec<f32> = normals.into_iter().flatten().collect();
        let normals = DataArray::new(ArrayData::Float32(flat), 3)
            .map_err(|e| ExecutionResult::from_error(DiagnosticCode::Internal, e.to_string()))?;
        let geometry = geometry
            .with_vertex_data(self.vertex_matrix.name())
            .with_face_data(self.face_matrix.name());
        Ok(Subtree::leaf(geometry.into())
            .with_child(
                self.vertex_matrix.name(),
                Subtree::leaf(AttributeMatrix::new(nv).into()),
            )
            .with_child(
                self.face_matrix.name(),
                Subtree::leaf(AttributeMatrix::new(nf).into())
                    .with_child(self.normals.name(), Subtree::leaf(normals.into())),
            ))
    }

    fn stage(&self, changes: &mut ChangeSet, subtree: Subtree) {
        if let Some(parent) = self.geometry.parent() {
            changes.create_groups(parent);
        }
        changes.attach(self.geometry.clone(), subtree, false);
    }
}

impl Filter for ImportGeometryFromFile {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata {
            name: NAME,
            uuid: UUID,
            human_name: "Import Geometry From File",
            tags: &["io", "input", "read", "import", "stl", "off", "geometry"],
            version: 1,
        }
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required("file_path", "Input Mesh File", ParameterKind::FilePath)
                .help("STL (ASCII or binary) or OFF file to read")
                .constraint(Constraint::NonEmpty),
            ParameterSpec::required("geometry_path", "Geometry Path", ParameterKind::DataPath)
                .help("Where the new triangle geometry is created"),
            ParameterSpec::optional(
                "vertex_attribute_matrix",
                "Vertex Attribute Matrix",
                ParameterKind::String,
                DEFAULT_VERTEX_MATRIX,
            )
            .help("Name of the per-vertex attribute matrix"),
            ParameterSpec::optional(
                "face_attribute_matrix",
                "Face Attribute Matrix",
                ParameterKind::String,
                DEFAULT_FACE_MATRIX,
            )
            .help("Name of the per-face attribute matrix"),
            ParameterSpec::optional(
                "face_normals",
                "Face Normals",
                ParameterKind::String,
                DEFAULT_FACE_NORMALS,
            )
            .help("Name of the face normals array"),
            ParameterSpec::optional("scale_factor", "Scale Factor", ParameterKind::Float, 1.0)
                .help("Uniform scale applied to vertex coordinates")
                .constraint(Constraint::Range {
                    min: Bound::Excluded(0.0),
                    max: Bound::Included(MAX_SCALE),
                }),
            ParameterSpec::optional("apply_scale", "Apply Scale", ParameterKind::Bool, false)
                .help("Whether scale_factor is applied"),
        ]
    }

    fn preflight_impl(&self, _store: &DataStructure, args: &Arguments) -> Preflight {
        let params = match Params::from_args(args) {
            Ok(p) => p,
            Err(result) => return Preflight::failed(result),
        };
        if let Err(result) = require_file(&params.file) {
            return Preflight::failed(result);
        }

        let mut result = ExecutionResult::new();
        if codec::codec_for_path(&params.file).is_none() {
            result.push_warning(
                DiagnosticCode::UnknownExtension,
                format!(
                    "'{}' has no recognised mesh extension; reading it as {}",
                    params.file.display(),
                    codec::fallback_codec().name()
                ),
            );
        }
        if !params.apply_scale && params.scale != 1.0 {
            result.push_warning(
                DiagnosticCode::ScaleIgnored,
                format!(
                    "scale factor {} is ignored because apply_scale is false",
                    params.scale
                ),
            );
        }

        let mut actions = Vec::new();
        if let Some(parent) = params.geometry.parent() {
            actions.push(OutputAction::CreateGroups(parent));
        }
        match params.subtree(TriangleGeometry::empty(), Vec::new()) {
            Ok(placeholder) => actions.push(OutputAction::Create {
                path: params.geometry.clone(),
                subtree: placeholder,
                overwrite: false,
            }),
            Err(e) => result.extend(e),
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
        let bytes = match read_input(&params.file) {
            Ok(b) => b,
            Err(result) => return result,
        };
        let codec = codec::codec_for_path(&params.file).unwrap_or_else(codec::fallback_codec);
        let mesh = match codec.decode(&bytes) {
            Ok(m) => m,
            Err(e) => return codec_error(&params.file, &e),
        };
        log::debug!(
            "{}: decoded {} vertices, {} faces ({})",
            NAME,
            mesh.vertices.len(),
            mesh.faces.len(),
            codec.name()
        );

        if ctx.is_cancelled() {
            return ExecutionResult::from_error(DiagnosticCode::Cancelled, "import cancelled");
        }

        let mut result = ExecutionResult::new();
        let (geometry, normals) = match build_geometry(mesh, &params, &mut result) {
            Ok(built) => built,
            Err(e) => return e,
        };

        ctx.progress(NAME, "staging geometry");
        match params.subtree(geometry, normals) {
            Ok(subtree) => params.stage(changes, subtree),
            Err(e) => result.extend(e),
        }
        result
    }
}

/// Validate the decoded mesh, apply scaling and settle the face normals.
fn build_geometry(
    mesh: MeshData,
    params: &Params,
    result: &mut ExecutionResult,
) -> Result<(TriangleGeometry, Vec<[f32; 3]>), ExecutionResult> {
    let invalid = |e: crate::core::geometry::GeometryError| {
        ExecutionResult::from_error(
            DiagnosticCode::InvalidGeometry,
            format!("{}: {}", params.file.display(), e),
        )
    };
    let mut geometry = TriangleGeometry::new(mesh.vertices, mesh.faces).map_err(invalid)?;
    geometry.check_manifold().map_err(invalid)?;

    let degenerate = geometry.degenerate_faces();
    if !degenerate.is_empty() {
        result.push_warning(
            DiagnosticCode::DegenerateFaces,
            format!(
                "{} degenerate face(s), first at index {}",
                degenerate.len(),
                degenerate[0]
            ),
        );
    }

    if params.apply_scale && params.scale != 1.0 {
        geometry.scale(params.scale as f32);
    }

    let computed = geometry.compute_face_normals();
    let normals = match mesh.normals {
        Some(stored) if stored.len() == computed.len() => stored
            .into_iter()
            .zip(&computed)
            .map(|(n, c)| if n == [0.0; 3] { *c } else { n })
            .collect(),
        _ => computed,
    };
    Ok((geometry, normals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::object::{DataObject, DataType};
    use crate::filters::fixtures::cube_stl;
    use std::fs;
    use tempfile::TempDir;

    fn p(s: &str) -> DataPath {
        DataPath::parse(s).unwrap()
    }

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn args(file: &std::path::Path, geometry: &str) -> Arguments {
        Arguments::new()
            .with("file_path", file)
            .with("geometry_path", geometry)
    }

    mod preflight {
        use super::*;

        #[test]
        fn missing_file_is_the_only_diagnostic() {
            let store = DataStructure::new();
            let result = ImportGeometryFromFile.preflight(
                &store,
                &args(std::path::Path::new("/definitely/not/here.stl"), "Geom"),
            );
            assert_eq!(result.errors.len(), 1);
            assert_eq!(result.errors[0].code, DiagnosticCode::FileNotFound);
            assert!(result.warnings.is_empty());
        }

        #[test]
        fn warns_about_ignored_scale() {
            let dir = TempDir::new().unwrap();
            let file = write(&dir, "cube.stl", &cube_stl());
            let result = ImportGeometryFromFile.preflight(
                &DataStructure::new(),
                &args(&file, "Geom").with("scale_factor", 2.0),
            );
            assert!(!result.has_errors());
            assert_eq!(result.warnings[0].code, DiagnosticCode::ScaleIgnored);
        }

        #[test]
        fn rejects_scale_out_of_range() {
            let dir = TempDir::new().unwrap();
            let file = write(&dir, "cube.stl", &cube_stl());
            let result = ImportGeometryFromFile.preflight(
                &DataStructure::new(),
                &args(&file, "Geom").with("scale_factor", 0.0),
            );
            assert!(result.has_error_code(DiagnosticCode::OutOfRange));
        }

        #[test]
        fn rejects_existing_geometry_path() {
            let dir = TempDir::new().unwrap();
            let file = write(&dir, "cube.stl", &cube_stl());
            let mut store = DataStructure::new();
            store.create(&p("Geom"), DataObject::Group, false).unwrap();
            let result = ImportGeometryFromFile.preflight(&store, &args(&file, "Geom"));
            assert!(result.has_error_code(DiagnosticCode::DuplicatePath));
        }

        #[test]
        fn rejects_same_matrix_names() {
            let dir = TempDir::new().unwrap();
            let file = write(&dir, "cube.stl", &cube_stl());
            let result = ImportGeometryFromFile.preflight(
                &DataStructure::new(),
                &args(&file, "Geom")
                    .with("vertex_attribute_matrix", "Data")
                    .with("face_attribute_matrix", "Data"),
            );
            assert!(result.has_error_code(DiagnosticCode::DuplicatePath));
        }

        #[test]
        fn warns_about_unknown_extension() {
            let dir = TempDir::new().unwrap();
            let file = write(&dir, "cube.mesh", &cube_stl());
            let result = ImportGeometryFromFile.preflight(&DataStructure::new(), &args(&file, "Geom"));
            assert!(!result.has_errors());
            assert_eq!(result.warnings[0].code, DiagnosticCode::UnknownExtension);
        }
    }

    mod execute {
        use super::*;

        #[test]
        fn imports_cube() {
            let dir = TempDir::new().unwrap();
            let file = write(&dir, "cube.stl", &cube_stl());
            let mut store = DataStructure::new();
            let result = ImportGeometryFromFile.execute(&mut store, &args(&file, "Shapes/Cube"));
            assert!(result.is_clean(), "{}", result);

            assert_eq!(store.get(&p("Shapes")), Some(&DataObject::Group));
            let geom = store.get(&p("Shapes/Cube")).unwrap().as_geometry().unwrap();
            assert_eq!(geom.vertex_count(), 8);
            assert_eq!(geom.face_count(), 12);
            let vm = store
                .get(&p("Shapes/Cube/Vertex Data"))
                .unwrap()
                .as_attribute_matrix()
                .unwrap();
            assert_eq!(vm.tuple_count(), 8);
            let normals = store
                .get(&p("Shapes/Cube/Face Data/Face Normals"))
                .unwrap()
                .as_array()
                .unwrap();
            assert_eq!(normals.tuple_count(), 12);
            assert_eq!(normals.components(), 3);
            assert_eq!(normals.data_type(), DataType::Float32);
        }

        #[test]
        fn applies_scale() {
            let dir = TempDir::new().unwrap();
            let file = write(&dir, "cube.stl", &cube_stl());
            let mut store = DataStructure::new();
            let result = ImportGeometryFromFile.execute(
                &mut store,
                &args(&file, "Cube")
                    .with("scale_factor", 3.0)
                    .with("apply_scale", true),
            );
            assert!(result.is_clean());
            let geom = store.get(&p("Cube")).unwrap().as_geometry().unwrap();
            assert_eq!(geom.bounds().unwrap().1, [3.0, 3.0, 3.0]);
        }

        #[test]
        fn parse_error_leaves_store_unchanged() {
            let dir = TempDir::new().unwrap();
            let file = write(&dir, "bad.off", "OFF\n3 1 0\n0 0 0\n");
            let mut store = DataStructure::new();
            let result = ImportGeometryFromFile.execute(&mut store, &args(&file, "A/B"));
            assert!(result.has_error_code(DiagnosticCode::ParseError));
            assert!(store.is_empty());
        }

        #[test]
        fn absurd_vertex_count_is_a_parse_error() {
            let dir = TempDir::new().unwrap();
            let file = write(&dir, "huge.off", "OFF\n99999999999999999 0 0\n0 0 0\n");
            let mut store = DataStructure::new();
            let result = ImportGeometryFromFile.execute(&mut store, &args(&file, "G"));
            assert_eq!(result.errors.len(), 1);
            assert_eq!(result.errors[0].code, DiagnosticCode::ParseError);
            assert!(store.is_empty());
        }

        #[test]
        fn out_of_range_index_is_invalid_geometry() {
            let dir = TempDir::new().unwrap();
            let file = write(&dir, "bad.off", "OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 9\n");
            let mut store = DataStructure::new();
            let result = ImportGeometryFromFile.execute(&mut store, &args(&file, "G"));
            assert!(result.has_error_code(DiagnosticCode::InvalidGeometry));
            assert!(store.is_empty());
        }

        #[test]
        fn non_manifold_mesh_is_rejected() {
            let dir = TempDir::new().unwrap();
            let file = write(
                &dir,
                "fan.off",
                "OFF\n5 3 0\n0 0 0\n1 0 0\n0 1 0\n0 -1 0\n0 0 1\n3 0 1 2\n3 1 0 3\n3 0 1 4\n",
            );
            let mut store = DataStructure::new();
            let result = ImportGeometryFromFile.execute(&mut store, &args(&file, "G"));
            assert!(result.has_error_code(DiagnosticCode::InvalidGeometry));
        }

        #[test]
        fn degenerate_faces_warn() {
            let dir = TempDir::new().unwrap();
            let file = write(&dir, "deg.off", "OFF\n3 2 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n3 0 1 1\n");
            let mut store = DataStructure::new();
            let result = ImportGeometryFromFile.execute(&mut store, &args(&file, "G"));
            assert!(!result.has_errors());
            assert_eq!(result.warnings[0].code, DiagnosticCode::DegenerateFaces);
            // Normals are computed for formats without them; degenerate gives zero.
            let normals = store.get(&p("G/Face Data/Face Normals")).unwrap().as_array().unwrap();
            assert_eq!(
                normals.data(),
                &ArrayData::Float32(vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0])
            );
        }
    }
}
