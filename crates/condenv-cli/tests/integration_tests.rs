//! End-to-end runs of the `condenv` binary against a scripted fake `conda`.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Answers `conda search --channel=... --json <name>[subdir=<subdir>]`:
/// numpy has py3.9 builds on every subdir, tqdm is noarch-only, everything
/// else is not found.
const FAKE_CONDA: &str = r#"#!/bin/sh
spec="$4"
subdir=$(echo "$spec" | sed 's/.*\[subdir=\(.*\)]$/\1/')
case "$spec" in
  numpy*)
    if [ "$subdir" = "noarch" ]; then
      echo '{"error": "PackagesNotFoundError: numpy", "exception_name": "PackagesNotFoundError"}'
      exit 1
    fi
    echo "{\"numpy\": [{\"name\": \"numpy\", \"version\": \"1.21.0\", \"subdir\": \"$subdir\", \"depends\": [\"python_abi 3.9.* *_cp39\"]}]}"
    ;;
  tqdm*)
    if [ "$subdir" != "noarch" ]; then
      echo '{"error": "PackagesNotFoundError: tqdm", "exception_name": "PackagesNotFoundError"}'
      exit 1
    fi
    echo '{"tqdm": [{"name": "tqdm", "version": "4.62.0", "subdir": "noarch", "noarch": "python", "depends": ["python >=3.6"]}]}'
    ;;
  broken*)
    echo 'segfault' >&2
    exit 2
    ;;
  *)
    echo '{"error": "PackagesNotFoundError: nothing", "exception_name": "PackagesNotFoundError"}'
    exit 1
    ;;
esac
"#;

/// Test context with a scratch directory holding requirements, config and
/// the fake conda executable.
struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let ctx = Self { temp_dir };
        ctx.write(
            "condenv.toml",
            "platforms = [\"linux-64\", \"osx-64\"]\npythons = [\"3.9\"]\n\n[environment]\nname = \"test-ci\"\n",
        );
        ctx
    }

    fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).expect("failed to write file");
        path
    }

    #[cfg(unix)]
    fn fake_conda(&self) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.write("conda", FAKE_CONDA);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("failed to make fake conda executable");
        path
    }

    fn condenv_cmd(&self) -> Command {
        let bin_path = env!("CARGO_BIN_EXE_condenv");
        let mut cmd = Command::new(bin_path);
        cmd.current_dir(self.temp_dir.path());
        cmd.env_remove("CONDENV_CONFIG");
        cmd.env_remove("CONDA_EXE");
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx
        .condenv_cmd()
        .arg("--help")
        .output()
        .expect("failed to run condenv");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
}

#[test]
fn test_missing_requirement_file_fails() {
    let ctx = TestContext::new();
    let output = ctx
        .condenv_cmd()
        .args(["--conda", "/bin/false", "does-not-exist.txt"])
        .output()
        .expect("failed to run condenv");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"), "stderr: {stderr}");
    assert!(!ctx.path("conda-env.yml").exists());
}

#[cfg(unix)]
#[test]
fn test_resolve_with_fake_conda() {
    let ctx = TestContext::new();
    let conda = ctx.fake_conda();
    ctx.write("base.txt", "numpy>=1.20\n");
    ctx.write(
        "requirements.txt",
        "# CI requirements\n-r base.txt\ntqdm\npywin32; sys_platform == \"win32\"\nnot-on-conda\n",
    );

    // Successful run: environment file, table and log.
    let output = ctx
        .condenv_cmd()
        .arg("--conda")
        .arg(&conda)
        .arg("requirements.txt")
        .output()
        .expect("failed to run condenv");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let env = read(&ctx.path("conda-env.yml"));
    assert!(env.starts_with("# THIS FILE IS AUTOGENERATED -- DO NOT EDIT #\n"));
    assert!(env.contains("name: test-ci\n"));
    assert!(env.contains("  - numpy>=1.20\n"));
    assert!(env.contains("  - tqdm\n"));
    assert!(!env.contains("pywin32"));
    assert!(!env.contains("not-on-conda"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    for expected in ["available", "wanted", "numpy", "not-on-conda", "pywin32", "Details at"] {
        assert!(stdout.contains(expected), "missing {expected} in stdout:\n{stdout}");
    }

    let log = read(&ctx.path("condenv.log"));
    assert!(log.contains("not-on-conda not available on"), "log:\n{log}");
    assert!(!log.contains("Falling back to noarch"), "debug lines need --verbose:\n{log}");

    // Verbose + quiet: log is truncated and carries debug lines, no table.
    let output = ctx
        .condenv_cmd()
        .arg("--conda")
        .arg(&conda)
        .args(["--verbose", "--quiet", "-o", "env.yml", "requirements.txt"])
        .output()
        .expect("failed to run condenv");
    assert!(output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).contains("wanted"));
    assert_eq!(read(&ctx.path("env.yml")), env);

    let log = read(&ctx.path("condenv.log"));
    assert!(log.contains("Falling back to noarch for tqdm - linux-64"));
    assert!(log.contains("Dropping environment marker"));
    assert_eq!(log.matches("not-on-conda not available on").count(), 1);

    // A hard tool failure aborts the run.
    ctx.write("broken.txt", "broken\n");
    let output = ctx
        .condenv_cmd()
        .arg("--conda")
        .arg(&conda)
        .args(["-o", "broken.yml", "broken.txt"])
        .output()
        .expect("failed to run condenv");
    assert!(!output.status.success());
    assert!(!ctx.path("broken.yml").exists());
}
