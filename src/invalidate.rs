use tracing::info;

use crate::config::{AwsOptions, InvalidationConfig};
use crate::error::DeployError;
use crate::runner::{CommandExecutor, CommandLine};
use crate::synchronise::{aws_base, DeployReport};

pub fn invalidation_command(aws: &AwsOptions, invalidation: &InvalidationConfig) -> CommandLine {
    aws_base(aws)
        .args(["cloudfront", "create-invalidation"])
        .args(["--distribution-id", invalidation.distribution_id.as_str()])
        .args(["--paths", invalidation.paths.as_str()])
}

/// Request a CloudFront invalidation. Fire-and-forget: completion is not polled.
pub async fn invalidate<E>(
    aws: &AwsOptions,
    invalidation: &InvalidationConfig,
    dry_run: bool,
    executor: &E,
    report: &mut DeployReport,
) -> Result<(), DeployError>
where
    E: CommandExecutor + ?Sized,
{
    info!(
        distribution_id = %invalidation.distribution_id,
        paths = %invalidation.paths,
        "Requesting CloudFront invalidation"
    );
    report
        .issue(executor, invalidation_command(aws, invalidation), dry_run)
        .await?;
    println!("✓ CloudFront invalidation requested.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_INVALIDATE_PATHS;
    use crate::runner::{CommandStatus, MockCommandExecutor};

    fn e123() -> InvalidationConfig {
        InvalidationConfig {
            distribution_id: "E123".into(),
            paths: DEFAULT_INVALIDATE_PATHS.into(),
        }
    }

    #[test]
    fn command_targets_distribution_and_paths() {
        let aws = AwsOptions::new("aws", Some("rexford".into()), None);
        let cmd = invalidation_command(&aws, &e123());
        let expected = [
            "aws", "--profile", "rexford", "cloudfront", "create-invalidation",
            "--distribution-id", "E123", "--paths", "/*",
        ];
        assert_eq!(cmd.tokens(), expected.as_slice());
    }

    #[tokio::test]
    async fn failure_propagates_exit_code() {
        let aws = AwsOptions::new("aws", None, None);
        let mut executor = MockCommandExecutor::new();
        executor
            .expect_execute()
            .withf(|cmd: &CommandLine| cmd.contains("create-invalidation"))
            .times(1)
            .returning(|_| Ok(CommandStatus::Failed { code: 254 }));

        let mut report = DeployReport::default();
        let err = invalidate(&aws, &e123(), false, &executor, &mut report)
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 254);
        assert_eq!(report.completed, 0);
    }
}
