#![allow(clippy::unwrap_used, clippy::expect_used)]

mod support;

use clap::Parser;
use favload::cli::{run_cli, Cli, RunStatus};
use support::mock_server::MockFavoriteServer;

async fn run(args: &[&str]) -> RunStatus {
    run_cli(Cli::try_parse_from(args).unwrap()).await.unwrap()
}

#[tokio::test]
async fn test_once_passes_against_healthy_service() {
    let server = MockFavoriteServer::start(200);
    let status = run(&["favload", "once", "--base-url", server.base_url()]).await;
    assert_eq!(status, RunStatus::Passed);
    assert_eq!(server.captured().len(), 1);
}

#[tokio::test]
async fn test_once_fails_on_server_error() {
    let server = MockFavoriteServer::start(500);
    let status = run(&["favload", "once", "--base-url", server.base_url()]).await;
    assert_eq!(status, RunStatus::Failed);
}

#[tokio::test]
async fn test_invalid_payload_command_passes_when_service_rejects_them() {
    let server = MockFavoriteServer::start_validating();
    let status = run(&["favload", "probe", "--base-url", server.base_url()]).await;
    assert_eq!(status, RunStatus::Passed);
    assert_eq!(server.captured().len(), 4);
}

#[tokio::test]
async fn test_invalid_payload_command_fails_when_service_accepts_them() {
    let server = MockFavoriteServer::start(200);
    let status = run(&["favload", "probe", "--base-url", server.base_url()]).await;
    assert_eq!(status, RunStatus::Failed);
    assert_eq!(server.captured().len(), 4);
}

#[tokio::test]
async fn test_invalid_base_url_is_an_error() {
    let cli = Cli::try_parse_from(["favload", "once", "--base-url", "ftp://example.com"]).unwrap();
    assert!(run_cli(cli).await.is_err());
}

#[tokio::test]
async fn test_plan_always_passes() {
    assert_eq!(run(&["favload", "plan", "--format", "json"]).await, RunStatus::Passed);
}
