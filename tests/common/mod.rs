//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub const CUBE_VERTICES: [[f32; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

pub const CUBE_FACES: [[usize; 3]; 12] = [
    [0, 2, 1],
    [0, 3, 2],
    [4, 5, 6],
    [4, 6, 7],
    [0, 1, 5],
    [0, 5, 4],
    [1, 2, 6],
    [1, 6, 5],
    [2, 3, 7],
    [2, 7, 6],
    [3, 0, 4],
    [3, 4, 7],
];

/// ASCII STL of a closed mesh, with zero normals in the file.
pub fn ascii_stl(vertices: &[[f32; 3]], faces: &[[usize; 3]]) -> String {
    let mut out = String::from("solid test\n");
    for face in faces {
        out.push_str("  facet normal 0 0 0\n    outer loop\n");
        for &i in face {
            let v = vertices[i];
            let _ = writeln!(out, "      vertex {} {} {}", v[0], v[1], v[2]);
        }
        out.push_str("    endloop\n  endfacet\n");
    }
    out.push_str("endsolid test\n");
    out
}

pub fn cube_stl() -> String {
    ascii_stl(&CUBE_VERTICES, &CUBE_FACES)
}

/// Write the unit cube as `cube.stl` in `dir`.
pub fn write_cube(dir: &Path) -> PathBuf {
    let path = dir.join("cube.stl");
    fs::write(&path, cube_stl()).unwrap();
    path
}

/// Three triangles sharing one edge.
pub fn non_manifold_stl() -> String {
    let vertices = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
    ];
    let faces = [[0, 1, 2], [1, 0, 3], [0, 1, 4]];
    ascii_stl(&vertices, &faces)
}
