//! Integration tests for the mpipe CLI.
//!
//! Every test runs in its own temporary directory with an isolated global
//! config file.

mod common;

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Get a command for running mpipe inside `dir`.
fn mpipe(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mpipe").unwrap();
    cmd.current_dir(dir.path())
        .env("MESHPIPE_CONFIG", dir.path().join("global.toml"))
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .env("HOME", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

fn with_cube() -> TempDir {
    let dir = TempDir::new().unwrap();
    dir.child("cube.stl").write_str(&common::cube_stl()).unwrap();
    dir
}

#[test]
fn version_flag_works() {
    let dir = TempDir::new().unwrap();
    mpipe(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mpipe"));
}

mod import {
    use super::*;

    #[test]
    fn writes_container_and_xdmf() {
        let dir = with_cube();
        mpipe(&dir)
            .args(["import", "cube.stl", "-o", "cube.mpc"])
            .assert()
            .success()
            .stdout(predicate::str::contains("8 vertices, 12 faces"));

        dir.child("cube.mpc").assert(predicate::path::is_file());
        dir.child("cube.mpc.xdmf").assert(predicate::str::contains("<Xdmf"));
        dir.child("cube.mpc.xdmf").assert(predicate::str::contains("Triangle"));
    }

    #[test]
    fn no_xdmf_flag() {
        let dir = with_cube();
        mpipe(&dir)
            .args(["import", "cube.stl", "-o", "cube.mpc", "--no-xdmf"])
            .assert()
            .success();
        dir.child("cube.mpc").assert(predicate::path::is_file());
        dir.child("cube.mpc.xdmf").assert(predicate::path::missing());
    }

    #[test]
    fn config_can_disable_xdmf() {
        let dir = with_cube();
        dir.child(".meshpipe.toml")
            .write_str("[export]\nwrite_auxiliary = false\n")
            .unwrap();
        mpipe(&dir)
            .args(["import", "cube.stl", "-o", "cube.mpc"])
            .assert()
            .success();
        dir.child("cube.mpc.xdmf").assert(predicate::path::missing());
    }

    #[test]
    fn missing_file_fails_with_code() {
        let dir = TempDir::new().unwrap();
        mpipe(&dir)
            .args(["import", "nope.stl", "-o", "out.mpc"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("-4001"))
            .stderr(predicate::str::contains("import failed"));
        dir.child("out.mpc").assert(predicate::path::missing());
    }

    #[test]
    fn json_output() {
        let dir = with_cube();
        let output = mpipe(&dir)
            .args(["import", "cube.stl", "-o", "cube.mpc", "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["errors"].as_array().unwrap().len(), 0);
    }
}

mod inspect {
    use super::*;

    #[test]
    fn shows_tree() {
        let dir = with_cube();
        mpipe(&dir)
            .args(["import", "cube.stl", "-o", "cube.mpc", "--geometry-path", "Part"])
            .assert()
            .success();
        mpipe(&dir)
            .args(["inspect", "cube.mpc"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("Part  triangle geometry (8 vertices, 12 faces)")
                    .and(predicate::str::contains("Face Normals  data array float32 [12 x 3]")),
            );
    }

    #[test]
    fn header_only_json() {
        let dir = with_cube();
        mpipe(&dir)
            .args(["import", "cube.stl", "-o", "cube.mpc"])
            .assert()
            .success();
        let output = mpipe(&dir)
            .args(["inspect", "cube.mpc", "--header", "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["version"], 1);
        assert!(value.get("objects").is_none());
    }

    #[test]
    fn rejects_garbage() {
        let dir = TempDir::new().unwrap();
        dir.child("bad.mpc").write_str("not json").unwrap();
        mpipe(&dir)
            .args(["inspect", "bad.mpc"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to decode"));
    }
}

mod filters {
    use super::*;

    #[test]
    fn lists_builtin_filters() {
        let dir = TempDir::new().unwrap();
        mpipe(&dir)
            .args(["filters", "--quiet"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("import_geometry_from_file")
                    .and(predicate::str::contains("export_store"))
                    .and(predicate::str::contains("read_store"))
                    .and(predicate::str::contains("create_data_group"))
                    .and(predicate::str::contains("delete_data")),
            );
    }

    #[test]
    fn describes_parameters() {
        let dir = TempDir::new().unwrap();
        mpipe(&dir)
            .args(["filters", "import_geometry_from_file"])
            .assert()
            .success()
            .stdout(predicate::str::contains("scale_factor").and(predicate::str::contains("(0, 1000000]")));
    }

    #[test]
    fn unknown_filter() {
        let dir = TempDir::new().unwrap();
        mpipe(&dir)
            .args(["filters", "smooth_laplacian"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown filter"));
    }
}

mod run {
    use super::*;

    const CONVERT: &str = r#"{
        "name": "convert",
        "steps": [
            { "filter": "import_geometry_from_file",
              "args": { "file_path": "cube.stl", "geometry_path": "Cube" } },
            { "filter": "export_store",
              "args": { "destination": "cube.mpc", "write_auxiliary": false } }
        ]
    }"#;

    const FAILING: &str = r#"{
        "name": "failing",
        "steps": [
            { "filter": "create_data_group", "args": { "data_path": "A" } },
            { "filter": "delete_data", "args": { "data_path": "Missing" } },
            { "filter": "create_data_group", "args": { "data_path": "B" } }
        ]
    }"#;

    #[test]
    fn runs_pipeline_file() {
        let dir = with_cube();
        dir.child("convert.json").write_str(CONVERT).unwrap();
        mpipe(&dir)
            .args(["run", "convert.json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Completed"));
        dir.child("cube.mpc").assert(predicate::path::is_file());
    }

    #[test]
    fn halts_and_reports() {
        let dir = TempDir::new().unwrap();
        dir.child("failing.json").write_str(FAILING).unwrap();
        let output = mpipe(&dir)
            .args(["run", "failing.json", "--json", "--output", "final.mpc"])
            .output()
            .unwrap();
        assert!(!output.status.success());
        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["state"], "failed");
        assert_eq!(report["steps"][2]["status"], "not_run");

        // Completed steps are kept in the saved store.
        mpipe(&dir)
            .args(["inspect", "final.mpc"])
            .assert()
            .success()
            .stdout(predicate::str::contains("A  data group").and(predicate::str::contains("B  ").not()));
    }

    #[test]
    fn policy_flag_overrides() {
        let dir = TempDir::new().unwrap();
        dir.child("failing.json").write_str(FAILING).unwrap();
        let output = mpipe(&dir)
            .args(["run", "failing.json", "--json", "--policy", "continue_on_error"])
            .output()
            .unwrap();
        // Errors still make the command fail, but every step ran.
        assert!(!output.status.success());
        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["state"], "completed");
        assert_eq!(report["steps"][2]["status"], "executed");
    }

    #[test]
    fn config_policy_applies_when_file_is_silent() {
        let dir = TempDir::new().unwrap();
        dir.child("failing.json").write_str(FAILING).unwrap();
        dir.child(".meshpipe.toml")
            .write_str("[pipeline]\nfailure_policy = \"continue_on_error\"\n")
            .unwrap();
        let output = mpipe(&dir)
            .args(["run", "failing.json", "--json"])
            .output()
            .unwrap();
        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["state"], "completed");
    }

    #[test]
    fn unknown_filter_in_file() {
        let dir = TempDir::new().unwrap();
        dir.child("bad.json")
            .write_str(r#"{ "name": "bad", "steps": [ { "filter": "smooth" } ] }"#)
            .unwrap();
        mpipe(&dir)
            .args(["run", "bad.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown filter 'smooth'"));
    }

    #[test]
    fn preflight_checks_without_writing() {
        let dir = with_cube();
        dir.child("convert.json").write_str(CONVERT).unwrap();
        mpipe(&dir)
            .args(["preflight", "convert.json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("valid"));
        dir.child("cube.mpc").assert(predicate::path::missing());

        dir.child("failing.json").write_str(FAILING).unwrap();
        mpipe(&dir)
            .args(["preflight", "failing.json"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("-2001"));
    }
}

mod config {
    use super::*;

    #[test]
    fn set_get_list() {
        let dir = TempDir::new().unwrap();
        mpipe(&dir)
            .args(["config", "set", "pipeline.failure_policy", "continue_on_error"])
            .assert()
            .success();
        dir.child("global.toml")
            .assert(predicate::str::contains("continue_on_error"));

        mpipe(&dir)
            .args(["config", "get", "pipeline.failure_policy"])
            .assert()
            .success()
            .stdout("continue_on_error\n");

        mpipe(&dir)
            .args(["config", "set", "--project", "pipeline.failure_policy", "halt_on_error"])
            .assert()
            .success();
        mpipe(&dir)
            .args(["config", "get", "pipeline.failure_policy"])
            .assert()
            .success()
            .stdout("halt_on_error\n");

        mpipe(&dir)
            .args(["config", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("export.write_auxiliary = (not set)"));
    }

    #[test]
    fn rejects_bad_values_and_keys() {
        let dir = TempDir::new().unwrap();
        mpipe(&dir)
            .args(["config", "set", "pipeline.failure_policy", "sometimes"])
            .assert()
            .failure();
        mpipe(&dir)
            .args(["config", "get", "colour"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown configuration key"));
        dir.child("global.toml").assert(predicate::path::missing());
    }
}

#[test]
fn completion_generates_script() {
    let dir = TempDir::new().unwrap();
    mpipe(&dir)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mpipe"));
}
