use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "optschema_cli_test_{name}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.join(name);
        fs::write(&path, contents).expect("failed to write schema document");
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn optschema(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_optschema"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run optschema")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

const TOOL_YAML: &str = r#"
program: tool
description: Does things.
options:
  - key: help
    kind: help
    names: [-h, --help]
    synopsis: Print help.
  - key: input
    kind: single
    names: [-i]
    param_name: file
    stdin: true
    synopsis: Input file.
"#;

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_clean_schema() {
    let dir = TempDir::new("validate_clean");
    let path = dir.write(
        "schema.json",
        r#"{"options": [
            {"key": "verbose", "names": ["-v", "--verbose"]},
            {"key": "output", "kind": "single", "names": ["-o", "--output"], "param_name": "file"}
        ]}"#,
    );

    let output = optschema(&["validate", path.to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Schema is valid.\n");
}

#[test]
fn validate_prints_warnings() {
    let dir = TempDir::new("validate_warnings");
    let path = dir.write(
        "schema.json",
        r#"{"options": [
            {"key": "a", "names": ["--verbose"]},
            {"key": "b", "names": ["--verbos"]}
        ]}"#,
    );

    let output = optschema(&["validate", path.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "Warning: Option name --verbose has too similar names: --verbos.\n"
    );

    let quiet = optschema(&["validate", path.to_str().unwrap(), "--no-warnings"]);
    assert!(quiet.status.success());
    assert_eq!(stdout(&quiet), "Schema is valid.\n");

    let lenient = optschema(&["validate", path.to_str().unwrap(), "--similarity", "0"]);
    assert!(lenient.status.success());
    assert_eq!(stdout(&lenient), "Schema is valid.\n");
}

#[test]
fn validate_fails_on_duplicate_name() {
    let dir = TempDir::new("validate_duplicate");
    let path = dir.write(
        "schema.yaml",
        "options:\n  - key: a\n    names: [-a]\n  - key: b\n    names: [-a]\n",
    );

    let output = optschema(&["validate", path.to_str().unwrap()]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.starts_with("error: option b has duplicate option name"), "{err}");
    assert!(err.contains("also used by a"), "{err}");
}

#[test]
fn validate_reports_nested_key_path() {
    let dir = TempDir::new("validate_nested");
    let path = dir.write(
        "schema.json",
        r#"{"options": [
            {"key": "run", "kind": "command", "names": ["run"], "options": [
                {"key": "dry", "names": ["-n"], "requires": "missing"}
            ]}
        ]}"#,
    );

    let output = optschema(&["validate", path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("option run.dry requires unknown option missing"),
        "{}",
        stderr(&output)
    );

    let shallow = optschema(&["validate", path.to_str().unwrap(), "--no-recurse"]);
    assert!(shallow.status.success(), "stderr: {}", stderr(&shallow));
}

#[test]
fn validate_rejects_out_of_range_similarity() {
    let dir = TempDir::new("validate_similarity");
    let path = dir.write("schema.json", r#"{"options": []}"#);

    let output = optschema(&["validate", path.to_str().unwrap(), "--similarity", "1.5"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("--similarity must be between 0.0 and 1.0"));
}

// ---------------------------------------------------------------------------
// Document loading
// ---------------------------------------------------------------------------

#[test]
fn unsupported_extension_is_rejected() {
    let dir = TempDir::new("load_extension");
    let path = dir.write("schema.toml", "options = []");

    let output = optschema(&["validate", path.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("unsupported document extension"));
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new("load_missing");
    let path = dir.join("absent.json");

    let output = optschema(&["validate", path.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(stderr(&output).starts_with("error: failed to read"));
}

#[test]
fn invalid_regex_is_reported() {
    let dir = TempDir::new("load_regex");
    let path = dir.write(
        "schema.json",
        r#"{"options": [{"key": "name", "kind": "single", "names": ["-n"], "regex": "[a-"}]}"#,
    );

    let output = optschema(&["validate", path.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("option name has invalid regular expression"));
}

// ---------------------------------------------------------------------------
// help / usage
// ---------------------------------------------------------------------------

#[test]
fn help_prints_text_usage_and_options() {
    let dir = TempDir::new("help_full");
    let path = dir.write("tool.yaml", TOOL_YAML);

    let output = optschema(&["help", path.to_str().unwrap(), "--no-color"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "Does things.\n\
         \n\
         Usage:\n  tool [-h|--help] [-i <file>|-]\n\
         \n\
         Options:\n\
         \x20 -h, --help          Print help.\n\
         \x20 -i          <file>  Input file. Reads data from standard input.\n"
    );
}

#[test]
fn help_filter_limits_listed_options() {
    let dir = TempDir::new("help_filter");
    let path = dir.write("tool.yaml", TOOL_YAML);

    let output = optschema(&[
        "help",
        path.to_str().unwrap(),
        "--no-color",
        "--filter",
        "INPUT",
    ]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Usage:\n  tool [-h|--help] [-i <file>|-]\n"));
    assert!(text.ends_with("Options:\n  -i  <file>  Input file. Reads data from standard input.\n"));
    assert!(!text.contains("Print help."));
}

#[test]
fn help_is_styled_unless_disabled() {
    let dir = TempDir::new("help_color");
    let path = dir.write("tool.yaml", TOOL_YAML);

    let styled = optschema(&["help", path.to_str().unwrap()]);
    let plain = optschema(&["help", path.to_str().unwrap(), "--no-color"]);

    assert!(stdout(&styled).contains('\x1b'));
    assert!(!stdout(&plain).contains('\x1b'));
}

#[test]
fn help_refuses_invalid_schema() {
    let dir = TempDir::new("help_invalid");
    let path = dir.write(
        "schema.json",
        r#"{"options": [{"key": "a", "names": ["-a"], "requires": "a"}]}"#,
    );

    let output = optschema(&["help", path.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("option a requires itself"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn usage_prints_only_usage_section() {
    let dir = TempDir::new("usage_only");
    let path = dir.write("tool.yaml", TOOL_YAML);

    let output = optschema(&[
        "usage",
        path.to_str().unwrap(),
        "--no-color",
        "--program",
        "other",
    ]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "Usage:\n  other [-h|--help] [-i <file>|-]\n");
}

#[test]
fn usage_wraps_to_width() {
    let dir = TempDir::new("usage_width");
    let path = dir.write("tool.yaml", TOOL_YAML);

    let output = optschema(&[
        "usage",
        path.to_str().unwrap(),
        "--no-color",
        "--width",
        "20",
    ]);

    assert!(output.status.success());
    for line in stdout(&output).lines() {
        assert!(line.len() <= 20, "{line:?}");
    }
}
