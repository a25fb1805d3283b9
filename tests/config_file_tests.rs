mod common;
use common::*;

#[test]
fn test_alias_from_custom_config_file() {
    let exports = ExportDir::new();
    exports.write("a-x-01012020.csv", "CDN,Device\nakamai,tv\nfastly,tv\n");
    let config = exports.write(
        "logtally.ini",
        "[aliases]\ncdn-json = -c CDN -F json\n",
    );

    let (stdout, stderr, exit_code) = run_logtally(&[
        "--config-file",
        config.to_str().unwrap(),
        "-a",
        "cdn-json",
        &exports.path_str(),
    ]);
    assert_eq!(exit_code, 0, "stderr: {}", stderr);

    let summaries = json_lines(&stdout);
    assert_eq!(summaries[0]["aggregates"]["akamai"]["count"], 1);
}

#[test]
fn test_project_defaults_apply_and_cli_overrides() {
    let project = ExportDir::new();
    project.write(".logtallyrc", "defaults = -F json --no-suffix\n");
    project.write("a-x-01012020.csv", "Error Code,Detail\nE1,timeout\n");

    let (stdout, stderr, exit_code) = run_logtally_in(Some(project.path()), &[]);
    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert_eq!(json_lines(&stdout)[0]["aggregates"]["E1"]["count"], 1);

    let (stdout, _stderr, exit_code) =
        run_logtally_in(Some(project.path()), &["-F", "default"]);
    assert_eq!(exit_code, 0);
    assert!(stdout.contains("DATE:"));
}

#[test]
fn test_ignore_config_skips_project_defaults() {
    let project = ExportDir::new();
    project.write(".logtallyrc", "defaults = -F json\n");
    project.write("a-x-01012020.csv", "Error Code,Detail\nE1,timeout\n");

    let (stdout, _stderr, exit_code) =
        run_logtally_in(Some(project.path()), &["--ignore-config"]);
    assert_eq!(exit_code, 0);
    assert!(stdout.contains("CSV:"));
}

#[test]
fn test_unknown_alias_is_a_config_error() {
    let exports = ExportDir::new();
    let config = exports.write("logtally.ini", "[aliases]\nx = -s\n");

    let (_stdout, stderr, exit_code) = run_logtally(&[
        "--config-file",
        config.to_str().unwrap(),
        "-a",
        "missing",
    ]);
    assert_eq!(exit_code, 1);
    assert!(stderr.contains("Unknown alias: missing"), "stderr: {}", stderr);
}

#[test]
fn test_malformed_config_file_fails() {
    let exports = ExportDir::new();
    let config = exports.write("logtally.ini", "[aliases]\nthis line has no equals sign\n");

    let (_stdout, stderr, exit_code) =
        run_logtally(&["--config-file", config.to_str().unwrap()]);
    assert_eq!(exit_code, 1);
    assert!(stderr.contains("Config file error"), "stderr: {}", stderr);
}

#[test]
fn test_show_config() {
    let exports = ExportDir::new();
    let config = exports.write("logtally.ini", "defaults = -j 2\n[aliases]\nq = -q\n");

    let (stdout, _stderr, exit_code) = run_logtally(&[
        "--config-file",
        config.to_str().unwrap(),
        "--show-config",
    ]);
    assert_eq!(exit_code, 0);
    assert!(stdout.contains("Configuration precedence"));
    assert!(stdout.contains("defaults = -j 2"));
    assert!(stdout.contains("q = -q"));
}
