//! Command-line surface and the top-level deploy sequence.
//!
//! [`run`] is the entrypoint shared by `main()` and the tests: it turns the
//! parsed [`Cli`] into a [`DeployConfig`] and drives sync, then the optional
//! invalidation, through a [`CommandExecutor`].
//!
//! Every value-bearing flag can also come from a `SITE_DEPLOY_*` environment
//! variable (a `.env` file in the working directory is loaded by `main`).

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::config::{
    AwsOptions, DeployConfig, DeployTarget, InvalidationConfig, DEFAULT_AWS_CLI, DEFAULT_BUCKET,
    DEFAULT_DIST, DEFAULT_INVALIDATE_PATHS,
};
use crate::error::DeployError;
use crate::invalidate::invalidate;
use crate::runner::{CommandExecutor, SystemExecutor};
use crate::synchronise::{synchronise, DeployReport};

/// Deploy a built site to S3 (and optionally invalidate CloudFront).
#[derive(Debug, Parser)]
#[clap(
    name = "site-deploy",
    version,
    about = "Deploy dist/ to S3 with long-lived asset caching and no-cache HTML, optionally invalidating CloudFront"
)]
pub struct Cli {
    /// Path to the built site
    #[clap(long, env = "SITE_DEPLOY_DIST", default_value = DEFAULT_DIST)]
    pub dist: PathBuf,

    /// S3 bucket name
    #[clap(long, env = "SITE_DEPLOY_BUCKET", default_value = DEFAULT_BUCKET)]
    pub bucket: String,

    /// Key prefix in the bucket (e.g. "site/"; blank for the bucket root)
    #[clap(long, env = "SITE_DEPLOY_PREFIX", default_value = "")]
    pub prefix: String,

    /// AWS CLI profile name
    #[clap(long, env = "SITE_DEPLOY_PROFILE")]
    pub profile: Option<String>,

    /// AWS region override
    #[clap(long, env = "SITE_DEPLOY_REGION")]
    pub region: Option<String>,

    /// Do NOT delete remote files that are not in the local dist directory
    #[clap(long)]
    pub no_delete: bool,

    /// Print commands without executing them
    #[clap(long)]
    pub dry_run: bool,

    /// CloudFront distribution ID; invalidation is skipped when absent
    #[clap(long, env = "SITE_DEPLOY_DISTRIBUTION_ID")]
    pub distribution_id: Option<String>,

    /// CloudFront paths to invalidate
    #[clap(long, env = "SITE_DEPLOY_INVALIDATE_PATHS", default_value = DEFAULT_INVALIDATE_PATHS)]
    pub invalidate_paths: String,

    /// AWS CLI executable to invoke
    #[clap(long, env = "SITE_DEPLOY_AWS_CLI", default_value = DEFAULT_AWS_CLI)]
    pub aws_cli: String,

    /// Enable debug logging on stderr (RUST_LOG takes precedence)
    #[clap(long, short)]
    pub verbose: bool,
}

impl Cli {
    pub fn to_config(&self) -> DeployConfig {
        let invalidation = self
            .distribution_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| InvalidationConfig {
                distribution_id: id.to_string(),
                paths: self.invalidate_paths.clone(),
            });

        DeployConfig {
            dist: self.dist.clone(),
            target: DeployTarget::new(self.bucket.as_str(), &self.prefix),
            aws: AwsOptions::new(
                self.aws_cli.as_str(),
                self.profile.clone(),
                self.region.clone(),
            ),
            delete: !self.no_delete,
            dry_run: self.dry_run,
            invalidation,
        }
    }
}

/// Sync, then invalidate if configured, then print the completion marker.
pub async fn deploy<E>(config: &DeployConfig, executor: &E) -> Result<DeployReport, DeployError>
where
    E: CommandExecutor + ?Sized,
{
    let mut report = DeployReport::default();

    synchronise(config, executor, &mut report).await?;

    if let Some(invalidation) = &config.invalidation {
        invalidate(&config.aws, invalidation, config.dry_run, executor, &mut report).await?;
    }

    println!("✓ Deploy complete.");
    Ok(report)
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<DeployReport, DeployError> {
    let config = cli.to_config();
    config.trace_loaded();

    let report = deploy(&config, &SystemExecutor).await?;
    info!(
        issued = report.commands.len(),
        completed = report.completed,
        "Deploy finished"
    );
    Ok(report)
}
