//! site-deploy: publish a statically-built site to S3 through the `aws` CLI.
//!
//! The pipeline is linear: [`cli::run`] builds a [`config::DeployConfig`],
//! [`synchronise::synchronise`] uploads assets then HTML with their cache
//! directives, and [`invalidate::invalidate`] optionally asks CloudFront to
//! drop stale copies. All external work goes through [`runner::run_command`].

pub mod cli;
pub mod config;
pub mod error;
pub mod invalidate;
pub mod runner;
pub mod synchronise;
