// site-deploy/src/config.rs

use std::path::PathBuf;
use tracing::{debug, info};

/// Local build output directory, relative to the working directory.
pub const DEFAULT_DIST: &str = "dist";
/// Bucket the site is published to unless overridden.
pub const DEFAULT_BUCKET: &str = "rexforddorchester-website-bucket";
/// CloudFront path pattern invalidated after a deploy.
pub const DEFAULT_INVALIDATE_PATHS: &str = "/*";
/// External CLI that performs the actual transfers.
pub const DEFAULT_AWS_CLI: &str = "aws";

/// Cache directive for content-hashed assets (one year, never revalidated).
pub const ASSET_CACHE_CONTROL: &str = "public,max-age=31536000,immutable";
/// Cache directive for HTML pages: always revalidate.
pub const HTML_CACHE_CONTROL: &str = "no-cache";

/// Bucket plus normalized key prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTarget {
    bucket: String,
    prefix: String,
}

impl DeployTarget {
    /// Leading and trailing slashes are stripped from `prefix`; an empty
    /// result means the bucket root.
    pub fn new(bucket: impl Into<String>, prefix: &str) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: normalize_prefix(prefix).to_string(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `s3://bucket` for the root, `s3://bucket/prefix/` otherwise.
    pub fn uri(&self) -> String {
        if self.prefix.is_empty() {
            format!("s3://{}", self.bucket)
        } else {
            format!("s3://{}/{}/", self.bucket, self.prefix)
        }
    }
}

pub fn normalize_prefix(prefix: &str) -> &str {
    prefix.trim_matches('/')
}

/// Credential and region selectors passed through to every CLI invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsOptions {
    pub program: String,
    pub profile: Option<String>,
    pub region: Option<String>,
}

impl AwsOptions {
    /// Empty profile or region strings are treated as unset.
    pub fn new(program: impl Into<String>, profile: Option<String>, region: Option<String>) -> Self {
        Self {
            program: program.into(),
            profile: profile.filter(|p| !p.is_empty()),
            region: region.filter(|r| !r.is_empty()),
        }
    }
}

/// CloudFront invalidation request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationConfig {
    pub distribution_id: String,
    pub paths: String,
}

/// Everything one deploy run needs. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub dist: PathBuf,
    pub target: DeployTarget,
    pub aws: AwsOptions,
    pub delete: bool,
    pub dry_run: bool,
    pub invalidation: Option<InvalidationConfig>,
}

impl DeployConfig {
    pub fn trace_loaded(&self) {
        info!(
            dist = %self.dist.display(),
            destination = %self.target.uri(),
            delete = self.delete,
            dry_run = self.dry_run,
            invalidate = self.invalidation.is_some(),
            "Loaded DeployConfig"
        );
        debug!(?self, "DeployConfig loaded (full debug)");
    }
}
