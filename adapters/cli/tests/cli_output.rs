use std::{
    fs,
    path::PathBuf,
    process::{Command, Output},
};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sar-mission"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run sar-mission")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout is utf-8")
}

#[test]
fn list_names_builtin_profiles() {
    let output = run(&["--list"]);

    assert!(output.status.success());
    let text = stdout(&output);
    for name in ["Easy", "Medium", "Hard"] {
        assert!(text.contains(name), "missing {name} in {text}");
    }
}

#[test]
fn same_seed_prints_same_matrix() {
    let first = run(&["--difficulty", "hard", "--seed", "21"]);
    let second = run(&["--difficulty", "hard", "--seed", "21"]);

    assert!(first.status.success());
    assert_eq!(stdout(&first), stdout(&second));
    assert_eq!(stdout(&first).lines().count(), 40);
}

#[test]
fn transfer_string_decodes_to_same_summary() {
    let transfer = run(&["--seed", "8", "--format", "transfer"]);
    assert!(transfer.status.success());
    let line = stdout(&transfer);
    assert!(line.starts_with("sar:v1:61x40:"));

    let direct = run(&["--seed", "8", "--format", "summary"]);
    let decoded = run(&["--decode", line.trim(), "--format", "summary"]);

    assert!(decoded.status.success());
    assert_eq!(stdout(&decoded), stdout(&direct));
}

#[test]
fn unknown_difficulty_fails() {
    let output = run(&["--difficulty", "Nightmare"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Nightmare"), "unexpected stderr: {stderr}");
}

fn profile_file(name: &str, contents: &str) -> PathBuf {
    let file_name = format!("sar-mission-{}-{name}.toml", std::process::id());
    let path = std::env::temp_dir().join(file_name);
    fs::write(&path, contents).expect("profile file is writable");
    path
}

#[test]
fn profile_file_adds_a_difficulty() {
    let path = profile_file(
        "drill",
        r#"
        [[profile]]
        name = "Drill"
        rng_seed = 5

        [profile.layout]
        size = { width = 30, height = 20 }
        start = { column = 4, row = 4 }
        protected = []

        [profile.victims.targets]
        high = 3
        medium = 4
        low = 5
        "#,
    );
    let path_arg = path.to_string_lossy().into_owned();

    let list = run(&["--profiles", &path_arg, "--list"]);
    let matrix = run(&["--profiles", &path_arg, "--difficulty", "drill"]);
    let _ = fs::remove_file(&path);

    assert!(list.status.success());
    assert!(stdout(&list).contains("Drill (seed 5, 30x20)"));
    assert!(matrix.status.success());
    let text = stdout(&matrix);
    assert_eq!(text.lines().count(), 20);
    assert!(text.lines().all(|line| line.split(' ').count() == 30));
}

#[test]
fn invalid_profile_file_fails() {
    let path = profile_file(
        "broken",
        r#"
        [[profile]]
        name = "Broken"

        [profile.walls]
        min_passable_ratio = 1.5
        "#,
    );
    let path_arg = path.to_string_lossy().into_owned();

    let output = run(&["--profiles", &path_arg, "--list"]);
    let _ = fs::remove_file(&path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Broken"), "unexpected stderr: {stderr}");
}
