//! Two-pass `aws s3 sync` of the build output to the target bucket.
//!
//! Assets go first with a long immutable cache directive, HTML second with
//! `no-cache`, so a page is never published before the hashed assets it
//! references.
//!
//! With `--delete`, each pass relies on `aws s3 sync` scoping deletions to
//! that pass's include/exclude filters.

use std::path::Path;

use tracing::{error, info};

use crate::config::{AwsOptions, DeployConfig, ASSET_CACHE_CONTROL, HTML_CACHE_CONTROL};
use crate::error::DeployError;
use crate::runner::{run_command, CommandExecutor, CommandLine};

/// One `s3 sync` invocation: which files it covers and how they are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPass {
    pub name: &'static str,
    /// Filter flags in order, e.g. `["--exclude", "*"]`.
    pub filters: &'static [&'static str],
    pub cache_control: &'static str,
}

pub const ASSET_PASS: SyncPass = SyncPass {
    name: "assets",
    filters: &["--exclude", "*.html"],
    cache_control: ASSET_CACHE_CONTROL,
};

pub const HTML_PASS: SyncPass = SyncPass {
    name: "html",
    filters: &["--exclude", "*", "--include", "*.html"],
    cache_control: HTML_CACHE_CONTROL,
};

/// Passes in execution order.
pub const SYNC_PASSES: [SyncPass; 2] = [ASSET_PASS, HTML_PASS];

/// Commands issued (printed) during a run, in order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeployReport {
    pub commands: Vec<CommandLine>,
    /// Commands that actually ran and succeeded. Zero under dry-run.
    pub completed: usize,
}

impl DeployReport {
    /// Issue `command` through the runner and record it.
    pub(crate) async fn issue<E>(
        &mut self,
        executor: &E,
        command: CommandLine,
        dry_run: bool,
    ) -> Result<(), DeployError>
    where
        E: CommandExecutor + ?Sized,
    {
        let result = run_command(executor, &command, dry_run).await;
        self.commands.push(command);
        result?;
        if !dry_run {
            self.completed += 1;
        }
        Ok(())
    }
}

/// `aws [--profile P] [--region R]`
pub fn aws_base(aws: &AwsOptions) -> CommandLine {
    let mut cmd = CommandLine::new(aws.program.as_str());
    if let Some(profile) = &aws.profile {
        cmd = cmd.args(["--profile", profile.as_str()]);
    }
    if let Some(region) = &aws.region {
        cmd = cmd.args(["--region", region.as_str()]);
    }
    cmd
}

pub fn sync_command(config: &DeployConfig, pass: &SyncPass) -> CommandLine {
    let mut cmd = aws_base(&config.aws)
        .args(["s3", "sync"])
        .arg(config.dist.to_string_lossy())
        .arg(config.target.uri())
        .args(pass.filters.iter().copied())
        .args(["--cache-control", pass.cache_control]);
    if config.delete {
        cmd = cmd.arg("--delete");
    }
    cmd
}

/// Upload the build output in two passes.
///
/// Fails with [`DeployError::MissingSource`] before issuing anything when
/// the source directory is absent; stops at the first failing pass.
pub async fn synchronise<E>(
    config: &DeployConfig,
    executor: &E,
    report: &mut DeployReport,
) -> Result<(), DeployError>
where
    E: CommandExecutor + ?Sized,
{
    ensure_source_exists(&config.dist)?;

    info!(
        dist = %config.dist.display(),
        destination = %config.target.uri(),
        delete = config.delete,
        "[SYNC] Starting two-pass sync"
    );

    for pass in &SYNC_PASSES {
        let cmd = sync_command(config, pass);
        info!(pass = pass.name, cache_control = pass.cache_control, "[SYNC] Running pass");
        report.issue(executor, cmd, config.dry_run).await?;
    }

    info!("[SYNC] Both passes complete");
    Ok(())
}

fn ensure_source_exists(dist: &Path) -> Result<(), DeployError> {
    if dist.is_dir() {
        return Ok(());
    }
    let shown = std::path::absolute(dist).unwrap_or_else(|_| dist.to_path_buf());
    error!(dist = %shown.display(), "[SYNC][ERROR] Source directory missing");
    println!("✗ dist folder not found: {}", shown.display());
    Err(DeployError::MissingSource(shown))
}
