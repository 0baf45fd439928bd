use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{tempdir, TempDir};

const ENV_VARS: &[&str] = &[
    "SITE_DEPLOY_DIST",
    "SITE_DEPLOY_BUCKET",
    "SITE_DEPLOY_PREFIX",
    "SITE_DEPLOY_PROFILE",
    "SITE_DEPLOY_REGION",
    "SITE_DEPLOY_DISTRIBUTION_ID",
    "SITE_DEPLOY_INVALIDATE_PATHS",
    "SITE_DEPLOY_AWS_CLI",
];

/// The binary with a clean `SITE_DEPLOY_*` environment.
fn site_deploy() -> Command {
    let mut cmd = Command::cargo_bin("site-deploy").expect("Binary exists");
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

/// A Vite-style build output with one page and one hashed asset.
fn built_site() -> TempDir {
    let dir = tempdir().expect("Creating temp dist failed");
    fs::write(dir.path().join("index.html"), "<!doctype html>").unwrap();
    fs::write(dir.path().join("app.a1b2.js"), "export {}").unwrap();
    dir
}

fn arrow_lines(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|l| l.starts_with("→ "))
        .map(str::to_owned)
        .collect()
}

#[test]
fn missing_dist_exits_with_one_and_issues_nothing() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("dist");

    let output = site_deploy()
        .arg("--dist")
        .arg(&missing)
        .arg("--aws-cli")
        .arg(dir.path().join("no-such-aws"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("dist folder not found"))
        .get_output()
        .clone();

    assert!(arrow_lines(&output.stdout).is_empty());
}

#[test]
fn dry_run_with_distribution_prints_three_commands() {
    let site = built_site();
    let unused = tempdir().unwrap();

    // Pointing at a nonexistent CLI proves nothing gets spawned.
    let output = site_deploy()
        .arg("--dist")
        .arg(site.path())
        .args(["--no-delete", "--dry-run", "--distribution-id", "E123"])
        .arg("--aws-cli")
        .arg(unused.path().join("no-such-aws"))
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ CloudFront invalidation requested."))
        .stdout(predicate::str::contains("✓ Deploy complete."))
        .get_output()
        .clone();

    let lines = arrow_lines(&output.stdout);
    assert_eq!(lines.len(), 3, "got: {lines:#?}");
    assert!(lines.iter().all(|l| !l.contains("--delete")));
    assert!(lines[0].contains("max-age=31536000,immutable"));
    assert!(lines[1].contains("no-cache"));

    let invalidation = shlex::split(lines[2].trim_start_matches("→ ")).unwrap();
    assert!(invalidation.ends_with(&[
        "cloudfront".to_string(),
        "create-invalidation".to_string(),
        "--distribution-id".to_string(),
        "E123".to_string(),
        "--paths".to_string(),
        "/*".to_string(),
    ]));
}

#[test]
fn prefix_is_normalized_in_destination() {
    let site = built_site();

    let output = site_deploy()
        .arg("--dist")
        .arg(site.path())
        .args(["--bucket", "b", "--prefix", "/site//", "--dry-run"])
        .assert()
        .success()
        .get_output()
        .clone();

    for line in arrow_lines(&output.stdout) {
        assert!(line.contains(" s3://b/site/ "), "bad destination in {line}");
    }
}

#[test]
fn bucket_can_come_from_environment() {
    let site = built_site();

    site_deploy()
        .env("SITE_DEPLOY_BUCKET", "from-env")
        .arg("--dist")
        .arg(site.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("s3://from-env"));
}

#[test]
fn unknown_flag_is_a_usage_error() {
    site_deploy().arg("--frobnicate").assert().code(2);
}

#[cfg(unix)]
mod with_fake_aws {
    use super::*;
    use serial_test::serial;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    /// Installs a stand-in `aws` that appends its arguments to `calls.log`
    /// and exits with `$FAKE_AWS_EXIT` (default 0).
    fn fake_aws(dir: &Path) -> PathBuf {
        let script = dir.join("aws");
        let log = dir.join("calls.log");
        fs::write(
            &script,
            format!(
                "#!/bin/sh\nprintf '%s\\n' \"$*\" >> '{}'\nexit ${{FAKE_AWS_EXIT:-0}}\n",
                log.display()
            ),
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    fn calls(dir: &Path) -> Vec<String> {
        fs::read_to_string(dir.join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    #[serial]
    fn default_deploy_runs_both_sync_passes_with_delete() {
        let site = built_site();
        let bin = tempdir().unwrap();
        let aws = fake_aws(bin.path());

        site_deploy()
            .arg("--dist")
            .arg(site.path())
            .arg("--aws-cli")
            .arg(&aws)
            .assert()
            .success()
            .stdout(predicate::str::contains("✓ Deploy complete."))
            .stdout(predicate::str::contains("CloudFront").not());

        let calls = calls(bin.path());
        assert_eq!(calls.len(), 2, "got: {calls:#?}");
        assert!(calls[0].contains("--exclude *.html"));
        assert!(calls[0].contains("public,max-age=31536000,immutable"));
        assert!(calls[1].contains("--exclude * --include *.html"));
        assert!(calls[1].contains("--cache-control no-cache"));
        assert!(calls.iter().all(|c| c.starts_with("s3 sync ") && c.ends_with("--delete")));
    }

    #[test]
    #[serial]
    fn failing_first_pass_stops_with_its_exit_code() {
        let site = built_site();
        let bin = tempdir().unwrap();
        let aws = fake_aws(bin.path());

        site_deploy()
            .env("FAKE_AWS_EXIT", "7")
            .arg("--dist")
            .arg(site.path())
            .args(["--distribution-id", "E123"])
            .arg("--aws-cli")
            .arg(&aws)
            .assert()
            .code(7)
            .stdout(predicate::str::contains("Deploy complete").not());

        assert_eq!(calls(bin.path()).len(), 1);
    }

    #[test]
    #[serial]
    fn profile_and_region_precede_the_subcommand() {
        let site = built_site();
        let bin = tempdir().unwrap();
        let aws = fake_aws(bin.path());

        site_deploy()
            .arg("--dist")
            .arg(site.path())
            .args(["--profile", "rexford", "--region", "us-east-1"])
            .args(["--distribution-id", "E123", "--invalidate-paths", "/index.html"])
            .arg("--aws-cli")
            .arg(&aws)
            .assert()
            .success();

        let calls = calls(bin.path());
        assert_eq!(calls.len(), 3);
        assert!(calls
            .iter()
            .all(|c| c.starts_with("--profile rexford --region us-east-1 ")));
        assert!(calls[2].ends_with(
            "cloudfront create-invalidation --distribution-id E123 --paths /index.html"
        ));
    }
}
