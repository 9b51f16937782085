use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn cargo_bin() -> PathBuf {
    if let Ok(path) = env::var("CARGO_BIN_EXE_textshift") {
        return PathBuf::from(path);
    }

    let target_dir = env::var("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| repo_root().join("target"));
    let executable_name = format!("textshift{}", std::env::consts::EXE_SUFFIX);
    let fallback = target_dir.join("debug").join(executable_name);

    if fallback.exists() {
        return fallback;
    }

    panic!(
        "CARGO_BIN_EXE_textshift is not set and fallback binary was not found at {}",
        fallback.display()
    );
}

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn run_textshift(args: &[&str]) -> Output {
    Command::new(cargo_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run textshift")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn view_prints_summary_and_optional_content() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    fs::write(&file, "first\nsecond\nthird").unwrap();

    let output = run_textshift(&["view", path_arg(&file)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim_end(),
        "File: notes.txt | Size: 0.0 KB | Lines: 3"
    );
    assert!(stderr(&output).contains("100%"));

    let output = run_textshift(&["view", "--content", path_arg(&file)]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("second\nthird"));
}

#[test]
fn view_reports_decoding_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("broken.txt");
    fs::write(&file, [b'o', b'k', 0xFFu8]).unwrap();

    let output = run_textshift(&["view", path_arg(&file)]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("error:"), "stderr: {err}");
    assert!(err.contains("at byte 2"), "stderr: {err}");
}

#[test]
fn list_shows_viewable_files_sorted() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b.json", "a.txt", "c.md", "d.CSV"] {
        fs::write(dir.path().join(name), "x").unwrap();
    }

    let output = run_textshift(&["list", path_arg(dir.path())]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "a.txt\nb.json\nd.CSV\n");
}

#[test]
fn find_prints_line_and_column() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("poem.txt");
    fs::write(&file, "one two\nTwo three\n").unwrap();

    let output = run_textshift(&["find", path_arg(&file), "two"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "1:5: one two\n");

    let output = run_textshift(&["find", "--ignore-case", path_arg(&file), "two"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "1:5: one two\n2:1: Two three\n");

    let output = run_textshift(&["find", path_arg(&file), "four"]);
    assert!(!output.status.success());
    assert!(stdout(&output).is_empty());
}

#[test]
fn convert_directory_reports_each_file_and_fails_on_any_error() {
    let dir = tempfile::tempdir().unwrap();
    for i in 1..=5 {
        fs::write(dir.path().join(format!("f{i}.txt")), "ağaç").unwrap();
    }
    fs::write(dir.path().join("f4.txt"), [0xC3u8]).unwrap();
    let out = dir.path().join("out");

    let output = run_textshift(&[
        "convert",
        path_arg(dir.path()),
        "--output-dir",
        path_arg(&out),
    ]);

    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert_eq!(text.matches("OK ").count(), 4, "stdout: {text}");
    assert_eq!(text.matches("FAIL ").count(), 1, "stdout: {text}");
    assert!(text.contains("f4.txt"));
    assert!(text.contains("4/5 files converted successfully"));

    assert_eq!(fs::read_to_string(out.join("f1.txt")).unwrap(), "aêaç");
    assert!(!out.join("f4.txt").exists());
    assert_eq!(fs::read_to_string(dir.path().join("f1.txt")).unwrap(), "ağaç");
}

#[test]
fn convert_single_file_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("subtitle.srt");
    fs::write(&file, "Şİ").unwrap();

    let output = run_textshift(&["convert", path_arg(&file)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("1/1 files converted successfully"));
    assert_eq!(fs::read_to_string(&file).unwrap(), "ÉÎ");
}

#[test]
fn convert_empty_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("readme.md"), "ş").unwrap();

    let output = run_textshift(&["convert", path_arg(dir.path())]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error:"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn convert_uses_custom_mapping_document() {
    let dir = tempfile::tempdir().unwrap();
    let mapping = dir.path().join("map.json");
    fs::write(&mapping, r#"{"a": "b", "b": "c"}"#).unwrap();
    let file = dir.path().join("x.txt");
    fs::write(&file, "ab").unwrap();

    let output = run_textshift(&["convert", path_arg(&file), "--mapping", path_arg(&mapping)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(fs::read_to_string(&file).unwrap(), "bc");

    fs::write(&file, "ab").unwrap();
    let output = run_textshift(&[
        "convert",
        path_arg(&file),
        "--mapping",
        path_arg(&mapping),
        "--per-rule",
    ]);
    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&file).unwrap(), "cc");
}

#[test]
fn mapping_document_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("mapping.json");
    let doc_arg = path_arg(&doc);

    let output = run_textshift(&["mapping", "init", doc_arg]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&doc).unwrap()).unwrap();
    assert_eq!(saved["Ğ"], "ß");

    let output = run_textshift(&["mapping", "init", doc_arg]);
    assert!(!output.status.success());

    let output = run_textshift(&["mapping", "show", doc_arg]);
    let shown = stdout(&output);
    assert_eq!(shown.lines().next(), Some("Ğ -> ß"));
    assert_eq!(shown.lines().count(), 7);

    let output = run_textshift(&["mapping", "set", doc_arg, "ü", "u"]);
    assert!(output.status.success());
    let output = run_textshift(&["mapping", "show", doc_arg]);
    assert_eq!(stdout(&output).lines().last(), Some("ü -> u"));

    let output = run_textshift(&["mapping", "remove", doc_arg, "ü"]);
    assert!(output.status.success());
    let output = run_textshift(&["mapping", "remove", doc_arg, "ü"]);
    assert!(!output.status.success());
}

#[test]
fn mapping_remove_refuses_to_empty_document() {
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("single.json");
    let doc_arg = path_arg(&doc);

    let output = run_textshift(&["mapping", "set", doc_arg, "x", "y"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = run_textshift(&["mapping", "remove", doc_arg, "x"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("last mapping"));
    assert!(fs::read_to_string(&doc).unwrap().contains("\"x\""));
}

#[test]
fn config_file_sets_suffix_and_extensions() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("textshift.yaml");
    fs::write(
        &config,
        "loader:\n  extensions: [srt]\nconvert:\n  suffix: .srt\n",
    )
    .unwrap();
    fs::write(dir.path().join("a.srt"), "ı").unwrap();
    fs::write(dir.path().join("b.txt"), "ı").unwrap();

    let output = run_textshift(&["--config", path_arg(&config), "list", path_arg(dir.path())]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "a.srt\n");

    let output = run_textshift(&["--config", path_arg(&config), "convert", path_arg(dir.path())]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(fs::read_to_string(dir.path().join("a.srt")).unwrap(), "ì");
    assert_eq!(fs::read_to_string(dir.path().join("b.txt")).unwrap(), "ı");

    fs::write(&config, "convert:\n  sufix: .srt\n").unwrap();
    let output = run_textshift(&["--config", path_arg(&config), "list", path_arg(dir.path())]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid config"));
}

#[test]
fn command_line_switches_off_config_flags() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("a.txt"), [0xFFu8]).unwrap();
    fs::write(data.join("b.txt"), "ş").unwrap();

    let config = dir.path().join("textshift.yaml");
    fs::write(&config, "convert:\n  stop_on_error: true\n  per_rule: true\n").unwrap();

    let output = run_textshift(&["--config", path_arg(&config), "convert", path_arg(&data)]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(fs::read_to_string(data.join("b.txt")).unwrap(), "ş");

    let output = run_textshift(&[
        "--config",
        path_arg(&config),
        "convert",
        path_arg(&data),
        "--no-stop-on-error",
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("1/2 files converted successfully"));
    assert_eq!(fs::read_to_string(data.join("b.txt")).unwrap(), "é");

    let mapping = dir.path().join("map.json");
    fs::write(&mapping, r#"{"a": "b", "b": "c"}"#).unwrap();
    let file = dir.path().join("x.txt");
    fs::write(&file, "a").unwrap();

    let output = run_textshift(&[
        "--config",
        path_arg(&config),
        "convert",
        path_arg(&file),
        "--mapping",
        path_arg(&mapping),
        "--no-per-rule",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(fs::read_to_string(&file).unwrap(), "b");
}
