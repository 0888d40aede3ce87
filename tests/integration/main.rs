//! Integration tests for Kiln

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn kiln() -> Command {
        cargo_bin_cmd!("kiln")
    }

    fn kiln_in(dir: &Path) -> Command {
        let mut cmd = kiln();
        cmd.current_dir(dir)
            .env_remove("KILN_FILE")
            .env_remove("KILN_STATE");
        cmd
    }

    fn write_build_file(dir: &Path, content: &str) {
        fs::write(dir.join("kiln.toml"), content).unwrap();
    }

    fn read_state(dir: &Path) -> serde_json::Value {
        let content = fs::read_to_string(dir.join("state.json")).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    const IMAGE_AND_CONTAINER: &str = r#"
[build.image]
command = "echo id-42"

[outdate.image]
always = true

[build.container]
deps = ["image"]
command = "echo container-of-$1"
"#;

    #[test]
    fn help_displays() {
        kiln()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("incremental build orchestrator"));
    }

    #[test]
    fn version_displays() {
        kiln()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("kiln"));
    }

    #[test]
    fn missing_target_argument_fails() {
        kiln().assert().failure();
    }

    #[cfg(unix)]
    #[test]
    fn builds_then_reuses_state() {
        let temp = TempDir::new().unwrap();
        write_build_file(temp.path(), IMAGE_AND_CONTAINER);

        kiln_in(temp.path())
            .arg("container")
            .assert()
            .success()
            .stdout(predicate::str::contains("image, container"));

        let state = read_state(temp.path());
        assert_eq!(state["image"]["value"], "id-42");
        assert_eq!(state["container"]["value"], "container-of-id-42");
        assert_eq!(state["container"]["dependency_build_info"]["image"], "id-42");

        // image is forced again but yields the same value, container is kept
        kiln_in(temp.path())
            .arg("container")
            .assert()
            .success()
            .stdout(predicate::str::contains("1 recipe run(s): image"));
    }

    #[cfg(unix)]
    #[test]
    fn up_to_date_target_reports_so() {
        let temp = TempDir::new().unwrap();
        write_build_file(temp.path(), "[build.leaf]\ncommand = \"echo v1\"\n");

        kiln_in(temp.path()).arg("leaf").assert().success();
        kiln_in(temp.path())
            .arg("leaf")
            .assert()
            .success()
            .stdout(predicate::str::contains("is up to date"));
    }

    #[cfg(unix)]
    #[test]
    fn logs_recipe_invocations() {
        let temp = TempDir::new().unwrap();
        write_build_file(temp.path(), IMAGE_AND_CONTAINER);

        kiln_in(temp.path())
            .args(["--log-level", "info", "container"])
            .assert()
            .success()
            .stderr(predicate::str::contains("building container"))
            .stderr(predicate::str::contains("checking image"));
    }

    #[cfg(unix)]
    #[test]
    fn explicit_file_and_state_paths() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        fs::create_dir_all(&project).unwrap();
        write_build_file(&project, IMAGE_AND_CONTAINER);
        let state = temp.path().join("custom-state.json");

        kiln_in(temp.path())
            .arg("--file")
            .arg(project.join("kiln.toml"))
            .arg("--state")
            .arg(&state)
            .arg("image")
            .assert()
            .success();

        assert!(state.exists());
        assert!(!project.join("state.json").exists());
    }

    #[test]
    fn unknown_target_fails() {
        let temp = TempDir::new().unwrap();
        write_build_file(temp.path(), "[build.leaf]\ncommand = \"echo v1\"\n");

        kiln_in(temp.path())
            .arg("ghost")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown target: ghost"));

        assert!(!temp.path().join("state.json").exists());
    }

    #[test]
    fn corrupt_state_is_fatal() {
        let temp = TempDir::new().unwrap();
        write_build_file(temp.path(), "[build.leaf]\ncommand = \"echo v1\"\n");
        fs::write(temp.path().join("state.json"), "{ broken").unwrap();

        kiln_in(temp.path())
            .arg("leaf")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Corrupt state file"))
            .stderr(predicate::str::contains("Hint:"));

        assert_eq!(
            fs::read_to_string(temp.path().join("state.json")).unwrap(),
            "{ broken"
        );
    }

    #[cfg(unix)]
    #[test]
    fn failing_recipe_keeps_previous_state() {
        let temp = TempDir::new().unwrap();
        write_build_file(temp.path(), "[build.leaf]\ncommand = \"echo v1\"\n");
        kiln_in(temp.path()).arg("leaf").assert().success();
        let before = fs::read_to_string(temp.path().join("state.json")).unwrap();

        write_build_file(
            temp.path(),
            r#"
[build.leaf]
command = "echo v1"

[build.top]
deps = ["leaf"]
command = "echo broken >&2; exit 2"
"#,
        );

        kiln_in(temp.path())
            .arg("top")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Recipe for target 'top' failed"));

        assert_eq!(
            fs::read_to_string(temp.path().join("state.json")).unwrap(),
            before
        );
    }

    #[test]
    fn outdate_for_unknown_target_fails() {
        let temp = TempDir::new().unwrap();
        write_build_file(temp.path(), "[outdate.image]\nalways = true\n");

        kiln_in(temp.path())
            .arg("image")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown target: image"));
    }
}
