use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn stickies_cmd(config: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stickies"));
    cmd.arg("--config").arg(config);
    cmd
}

#[test]
fn test_palette_writes_default_config() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("config.toml");

    let output = stickies_cmd(&config).arg("palette").output().unwrap();

    assert!(output.status.success());
    assert!(config.exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 7);
    assert!(stdout.contains("Magenta"));
    assert!(stdout.contains("#FF00FF"));
}

#[test]
fn test_palette_json_uses_configured_colors() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("config.toml");
    fs::write(
        &config,
        "[palette]\ncolors = [\"#123456\", \"#FFFFFF\"]\nnames = [\"Ink\", \"Chalk\"]\nicon_dir = \"icons\"\n",
    )
    .unwrap();

    let output = stickies_cmd(&config).args(["palette", "--json"]).output().unwrap();

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = parsed.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["name"], "Ink");
    assert_eq!(entries[0]["value"], "#123456");
    assert!(entries[1]["icon_ref"].as_str().unwrap().ends_with("Chalk.png"));
}

#[test]
fn test_mismatched_palette_fails_at_startup() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("config.toml");
    fs::write(
        &config,
        "[palette]\ncolors = [\"#000000\"]\nnames = [\"Black\", \"Red\"]\n",
    )
    .unwrap();

    let output = stickies_cmd(&config).arg("palette").output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1 colors but 2 names"));
}

#[test]
fn test_open_missing_file_fails_before_tui() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("config.toml");
    let log = tmp.path().join("stickies.log");
    fs::write(&config, format!("[logging]\nfile = {:?}\n", log.to_string_lossy())).unwrap();

    let output = stickies_cmd(&config)
        .args(["open"])
        .arg(tmp.path().join("missing.txt"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Import failed"));
    assert!(log.exists());
}
