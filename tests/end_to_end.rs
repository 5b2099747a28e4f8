// tests/end_to_end.rs

#![cfg(unix)]

use std::error::Error;
use std::time::Duration;

use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use serde_json::json;

use notifybot::channel::TelegramChannel;
use notifybot::config::BotConfig;
use notifybot::engine::{Session, SessionEnd, SessionOptions};
use notifybot::exec::ShellRunner;
use notifybot_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

/// `echo hello` → summary → "retry" → run again → no reply.
#[tokio::test]
async fn echo_then_retry_then_timeout() -> TestResult {
    init_tracing();
    let server = MockServer::start_async().await;

    let send = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/bott/sendMessage")
                .body_contains("SUCCESS")
                .body_contains("Exit code: 0");
            then.status(200)
                .json_body(json!({ "ok": true, "result": { "message_id": 10 } }));
        })
        .await;
    let retry = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/bott/getUpdates")
                .query_param("offset", "0");
            then.status(200).json_body(json!({
                "ok": true,
                "result": [
                    { "update_id": 200, "message": { "message_id": 11, "chat": { "id": 42 }, "text": "retry" } }
                ]
            }));
        })
        .await;
    let quiet = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/bott/getUpdates")
                .query_param("offset", "201");
            then.status(200).json_body(json!({ "ok": true, "result": [] }));
        })
        .await;

    let config = BotConfig {
        token: "t".to_string(),
        chat_id: "42".to_string(),
        api_base: server.base_url(),
    };
    let channel = TelegramChannel::new(&config)?.with_long_poll(Duration::ZERO);
    let options = SessionOptions {
        poll_interval: Duration::from_millis(20),
        reply_timeout: Duration::from_millis(300),
    };

    let report = with_timeout(
        Session::new("echo hello", ShellRunner::new(), channel, options).run(),
    )
    .await?;

    assert_eq!(report.runs, 2);
    assert_eq!(report.last_exit_code, 0);
    assert_eq!(report.end, SessionEnd::NoReply);
    send.assert_hits_async(2).await;
    retry.assert_hits_async(1).await;
    assert!(quiet.hits_async().await >= 1);
    Ok(())
}

#[tokio::test]
async fn log_reply_posts_fenced_stdout() -> TestResult {
    let server = MockServer::start_async().await;

    let summary = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/bott/sendMessage")
                .body_contains("FAILED");
            then.status(200)
                .json_body(json!({ "ok": true, "result": { "message_id": 10 } }));
        })
        .await;
    let log = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/bott/sendMessage")
                .json_body(json!({ "chat_id": "42", "text": "Output:\n```\nbuilding\n\n```" }));
            then.status(200)
                .json_body(json!({ "ok": true, "result": { "message_id": 12 } }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/bott/getUpdates");
            then.status(200).json_body(json!({
                "ok": true,
                "result": [
                    { "update_id": 5, "message": { "message_id": 11, "chat": { "id": 42 }, "text": "LOG" } }
                ]
            }));
        })
        .await;

    let config = BotConfig {
        token: "t".to_string(),
        chat_id: "42".to_string(),
        api_base: server.base_url(),
    };
    let channel = TelegramChannel::new(&config)?.with_long_poll(Duration::ZERO);

    let report = with_timeout(
        Session::new(
            "echo building; exit 4",
            ShellRunner::new(),
            channel,
            SessionOptions::default(),
        )
        .run(),
    )
    .await?;

    assert_eq!(report.last_exit_code, 4);
    assert_eq!(report.end, SessionEnd::LogSent);
    summary.assert_hits_async(1).await;
    log.assert_hits_async(1).await;
    Ok(())
}
