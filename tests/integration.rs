use std::{env, fs, path::PathBuf, process::Command};

fn run_bin(args: &[&str]) -> String {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_mra-editor"));

    let output = Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command");

    let stdout_str =
        std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
    let stderr_str =
        std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

    assert!(
        output.status.success(),
        "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
    );

    stdout_str.to_string()
}

#[test]
fn basic_workflow() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("basic_workflow");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let scenario_path = test_dir.join("scenario.toml");
    let scenario_contents = String::new()
        + "message = \"integration\"\n"
        + "resources = [\"r1\", \"r2\"]\n"
        + "\n"
        + "[parameters]\n"
        + "algorithm = \"NASH_EQUILIBRIUM\"\n"
        + "timebound = 3\n"
        + "\n"
        + "[[agents]]\n"
        + "name = \"a1\"\n"
        + "demand = 2\n"
        + "access = [\"r1\", \"r2\"]\n"
        + "\n"
        + "[[agents]]\n"
        + "name = \"a2\"\n"
        + "demand = 1\n"
        + "access = [\"r2\"]\n";
    fs::write(&scenario_path, scenario_contents).expect("failed to write scenario file");

    let result_path = test_dir.join("result.json");
    let result_contents = String::new()
        + "{\"resourceStates\": ["
        + "{\"resourceIDs\": [\"1\", \"2\"], \"resourceStates\": [0, 0]},"
        + "{\"resourceIDs\": [\"1\", \"2\"], \"resourceStates\": [1, 0]}"
        + "],"
        + "\"actionList\": [{\"agentIDs\": [1, 2], \"actions\": [\"req1\", \"idle\"]}]}";
    fs::write(&result_path, result_contents).expect("failed to write result file");

    let store_dir = test_dir.join("store");
    let store_dir_str = store_dir
        .to_str()
        .expect("failed to convert store directory to string");
    let scenario_str = scenario_path
        .to_str()
        .expect("failed to convert scenario path to string");
    let result_str = result_path
        .to_str()
        .expect("failed to convert result path to string");

    let solved = run_bin(&["--store-dir", store_dir_str, "submit", "--scenario", scenario_str]);
    let solved = solved.trim().to_string();
    let failed = run_bin(&["--store-dir", store_dir_str, "submit", "--scenario", scenario_str]);
    let failed = failed.trim().to_string();
    assert_ne!(solved, failed);

    let listing = run_bin(&["--store-dir", store_dir_str, "list"]);
    assert_eq!(listing.lines().count(), 2);
    assert!(listing.contains("Pending"));

    let shown = run_bin(&["--store-dir", store_dir_str, "show", "--id", &solved]);
    assert!(shown.contains("algorithm: NASH_EQUILIBRIUM"));
    assert!(shown.contains("agent 1 demand=2 acc=[1, 2]"));
    assert!(shown.contains("graph: 4 nodes, 3 edges"));

    run_bin(&[
        "--store-dir",
        store_dir_str,
        "complete",
        "--id",
        &solved,
        "--result",
        result_str,
    ]);
    run_bin(&["--store-dir", store_dir_str, "fail", "--id", &failed]);

    let path = run_bin(&["--store-dir", store_dir_str, "path", "--id", &solved]);
    assert!(path.contains("--(1: req1 2: idle)--> [1]"));

    let listing = run_bin(&["--store-dir", store_dir_str, "list"]);
    assert!(listing.contains("Successful"));
    assert!(listing.contains("Failed"));
    assert!(!listing.contains("Pending"));

    run_bin(&["--store-dir", store_dir_str, "clean"]);

    let listing = run_bin(&["--store-dir", store_dir_str, "list"]);
    assert!(listing.is_empty());

    fs::remove_dir_all(&test_dir).ok();
}
