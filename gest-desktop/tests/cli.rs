use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn temp_file(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("gest-cli-{}-{}", std::process::id(), name));
    path
}

fn gest() -> Command {
    Command::new(env!("CARGO_BIN_EXE_gest"))
}

#[test]
fn results_only_without_saved_board() {
    let results = temp_file("missing.json");
    let _ = fs::remove_file(&results);

    let output = gest()
        .arg("--results-only")
        .arg("--results")
        .arg(&results)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "GLES2: not run\nGLES3: not run\n");
    assert!(!results.exists());
}

#[test]
fn results_only_prints_saved_board() {
    let results = temp_file("saved.json");
    fs::write(
        &results,
        r#"{"gles3Ran": true, "gles3Fps": 42.5, "gles3FpsObjects": 5000}"#,
    )
    .unwrap();

    let output = gest()
        .args(&["--about", "--results-only", "--results"])
        .arg(&results)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("GPU Emulation Stress Test\nVersion "));
    assert!(stdout.ends_with("GLES2: not run\nGLES3: 5,000 objects: 42.5 fps\n"));

    fs::remove_file(&results).unwrap();
}

#[test]
fn invalid_api_level_is_rejected() {
    let output = gest()
        .args(&["--api", "5", "--results-only"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
