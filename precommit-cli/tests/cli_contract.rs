//! Integration tests for core CLI contract behavior.

use {
    predicates::prelude::*,
    std::{fs, path::Path},
    tempfile::{TempDir, tempdir},
};

fn cli_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("precommit");
    cmd.env_remove("PRECOMMIT_PROJECT_ROOT")
        .env_remove("PRECOMMIT_BUILD_DIR")
        .env_remove("RUST_LOG");
    cmd
}

/// A project root, a fake cgroup file and a config file tying them together.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new(cgroup: &str) -> Self {
        let dir = tempdir().expect("tempdir should be created");
        fs::create_dir_all(dir.path().join("code")).expect("create project root");
        fs::write(dir.path().join("cgroup"), cgroup).expect("write cgroup");
        Self { dir }
    }

    fn in_container() -> Self {
        Self::new("12:pids:/docker/3f2a9c\n")
    }

    fn root(&self) -> std::path::PathBuf {
        self.dir.path().join("code")
    }

    fn build_dir(&self) -> std::path::PathBuf {
        self.root().join("build")
    }

    /// Write `precommit.toml` with the given tool names and return its path.
    fn config(&self, generator: &str, executor: &str, formatter: &str) -> std::path::PathBuf {
        self.config_with_tools(&format!(
            "generator = '{generator}'\nexecutor = '{executor}'\nhdl_formatter = '{formatter}'\n"
        ))
    }

    /// Write `precommit.toml` with a raw `[tools]` table body and return its path.
    fn config_with_tools(&self, tools: &str) -> std::path::PathBuf {
        let path = self.dir.path().join("precommit.toml");
        let content = format!(
            "[paths]\nproject_root = '{}'\n\n\
             [tools]\n{tools}\n\
             [environment]\nprobe_file = '{}'\n",
            self.root().display(),
            self.dir.path().join("cgroup").display(),
        );
        fs::write(&path, content).expect("write config");
        path
    }

    fn cmd(&self, config: &Path) -> assert_cmd::Command {
        let mut cmd = cli_cmd();
        cmd.current_dir(self.dir.path()).arg("--config").arg(config);
        cmd
    }
}

#[test]
fn help_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("precommit"))
        .stdout(predicate::str::contains("--skip-format"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn version_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("precommit"))
        .stderr(predicate::str::is_empty());
}

// ============================================================================
// Exit Code Tests
// ============================================================================

/// Exit code 2: usage error (unknown flag, positional argument)
#[test]
fn exit_code_two_for_usage_error_invalid_flag() {
    let mut cmd = cli_cmd();
    cmd.arg("--invalid-flag-xyz")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn exit_code_two_for_positional_argument() {
    let mut cmd = cli_cmd();
    cmd.arg("build")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn unknown_flag_suggests_similar() {
    let mut cmd = cli_cmd();
    cmd.arg("--skip-tests")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--skip-test"));
}

/// Exit code 1: outside a container nothing runs
#[test]
fn exit_code_one_outside_container() {
    let sandbox = Sandbox::new("0::/init.scope\n");
    let config = sandbox.config("no-such-generator", "no-such-executor", "no-such-formatter");
    fs::create_dir_all(sandbox.build_dir().join("keep")).expect("create build dir");

    sandbox
        .cmd(&config)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("docker container"))
        .stderr(predicate::str::contains("Formatting...").not());

    assert!(sandbox.build_dir().join("keep").is_dir());
}

#[test]
fn environment_failure_names_root_and_hints() {
    let sandbox = Sandbox::new("0::/init.scope\n");
    let config = sandbox.config("true", "true", "true");

    sandbox
        .cmd(&config)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(format!(
            "Pre-commit run in {} aborted",
            sandbox.root().display()
        )))
        .stderr(predicate::str::contains("--project-root"))
        .stderr(predicate::str::contains("docker container"));
}

/// Exit code 1: project root missing
#[test]
fn exit_code_one_for_missing_project_root() {
    let sandbox = Sandbox::in_container();
    let config = sandbox.config("true", "true", "true");
    let missing = sandbox.dir.path().join("elsewhere");

    sandbox
        .cmd(&config)
        .arg("--project-root")
        .arg(&missing)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Cannot find project root directory"));
}

#[test]
fn exit_code_one_for_missing_executor() {
    let sandbox = Sandbox::in_container();
    let config = sandbox.config("true", "precommit-missing-ninja", "true");

    sandbox
        .cmd(&config)
        .arg("--skip-format")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("precommit-missing-ninja not found"))
        .stderr(predicate::str::contains("Testing...").not());
}

#[test]
fn skipping_everything_launches_nothing() {
    let sandbox = Sandbox::in_container();
    let config = sandbox.config("no-such-generator", "no-such-executor", "no-such-formatter");

    sandbox
        .cmd(&config)
        .args(["--skip-format", "--skip-build"])
        .assert()
        .success();

    assert!(!sandbox.build_dir().exists());
}

// ============================================================================
// Runs with stand-in tools
// ============================================================================

#[cfg(unix)]
#[test]
fn full_run_with_passing_tools() {
    let sandbox = Sandbox::in_container();
    fs::write(sandbox.root().join("top.sv"), "module top; endmodule\n").expect("write top.sv");
    fs::create_dir_all(sandbox.build_dir()).expect("create build dir");
    fs::write(sandbox.build_dir().join("stale.o"), "").expect("write stale artifact");
    let config = sandbox.config("true", "true", "true");

    sandbox
        .cmd(&config)
        .assert()
        .success()
        .stderr(predicate::str::contains("Formatting..."))
        .stderr(predicate::str::contains("Building..."))
        .stderr(predicate::str::contains("Testing..."));

    assert!(sandbox.build_dir().is_dir());
    assert!(!sandbox.build_dir().join("stale.o").exists());
}

#[cfg(unix)]
#[test]
fn skip_test_does_not_print_testing() {
    let sandbox = Sandbox::in_container();
    let config = sandbox.config("true", "true", "true");

    sandbox
        .cmd(&config)
        .args(["--skip-format", "--skip-test"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Building..."))
        .stderr(predicate::str::contains("Formatting...").not())
        .stderr(predicate::str::contains("Testing...").not());
}

#[cfg(unix)]
#[test]
fn failing_tool_is_reported_but_not_fatal() {
    let sandbox = Sandbox::in_container();
    let config = sandbox.config("true", "false", "true");

    sandbox
        .cmd(&config)
        .arg("--skip-format")
        .assert()
        .success()
        .code(0)
        .stderr(predicate::str::contains("exited with non-zero 1"))
        .stderr(predicate::str::contains("Testing..."));
}

/// Tools run from the build directory; a relative `--project-root` must
/// still reach them as a path to the project.
#[cfg(unix)]
#[test]
fn relative_project_root_is_resolved_before_launch() {
    let sandbox = Sandbox::in_container();
    fs::write(sandbox.root().join("top.sv"), "module top; endmodule\n").expect("write top.sv");
    let config = sandbox.config_with_tools(
        "generator = 'test'\ngenerator_args = ['-d']\nexecutor = 'true'\n\
         hdl_formatter = 'test'\nhdl_formatter_args = ['-f']\n",
    );

    let output = sandbox
        .cmd(&config)
        .args(["--project-root", "code", "--json"])
        .assert()
        .success()
        .get_output()
        .clone();

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["clean"], true, "failures: {}", report["failures"]);
    assert!(sandbox.build_dir().is_dir());
}

// ============================================================================
// JSON Output Tests
// ============================================================================

#[cfg(unix)]
#[test]
fn json_report_lists_stages_and_failures() {
    let sandbox = Sandbox::in_container();
    let config = sandbox.config("true", "false", "true");

    let output = sandbox
        .cmd(&config)
        .args(["--skip-format", "--json"])
        .assert()
        .success()
        .get_output()
        .clone();

    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf-8");
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("stdout should be JSON");
    assert_eq!(
        report["stages"],
        serde_json::json!(["configure", "build", "test"])
    );
    assert_eq!(report["clean"], false);
    assert_eq!(report["failures"].as_array().map(Vec::len), Some(2));
    assert_eq!(report["failures"][1]["command"], "false check");

    let stderr = String::from_utf8(output.stderr).expect("stderr should be utf-8");
    assert!(!stderr.contains("Building..."), "progress lines are suppressed with --json");
}

// ============================================================================
// TTY Detection Tests (colors disabled on non-TTY)
// ============================================================================

#[test]
fn colors_disabled_when_not_tty() {
    let sandbox = Sandbox::new("0::/init.scope\n");
    let config = sandbox.config("true", "true", "true");

    let output = sandbox
        .cmd(&config)
        .assert()
        .failure()
        .get_output()
        .clone();

    let stderr = String::from_utf8(output.stderr).expect("stderr should be utf-8");
    assert!(
        !stderr.contains("\x1b["),
        "Colors should be disabled in non-TTY mode"
    );
}
