// tests/telegram_channel.rs

use std::error::Error;
use std::time::{Duration, Instant};

use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use serde_json::json;

use notifybot::channel::{NotificationChannel, TelegramChannel};
use notifybot::config::BotConfig;
use notifybot::errors::NotifyError;
use notifybot_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn channel_for(server: &MockServer, token: &str) -> Result<TelegramChannel, NotifyError> {
    let config = BotConfig {
        token: token.to_string(),
        chat_id: "123".to_string(),
        api_base: server.base_url(),
    };
    Ok(TelegramChannel::new(&config)?.with_long_poll(Duration::ZERO))
}

#[tokio::test]
async fn send_posts_chat_id_and_text_and_returns_message_id() -> TestResult {
    init_tracing();
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/botfake-token/sendMessage")
                .json_body(json!({ "chat_id": "123", "text": "Hello" }));
            then.status(200)
                .json_body(json!({ "ok": true, "result": { "message_id": 1 } }));
        })
        .await;

    let mut channel = channel_for(&server, "fake-token")?;
    let sent = channel.send("Hello").await?;

    mock.assert_async().await;
    assert_eq!(sent.id, 1);
    Ok(())
}

#[tokio::test]
async fn send_failure_carries_status_and_description() -> TestResult {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/botbad/sendMessage");
            then.status(401).json_body(json!({
                "ok": false,
                "error_code": 401,
                "description": "Unauthorized"
            }));
        })
        .await;

    let mut channel = channel_for(&server, "bad")?;
    let err = channel.send("Hi").await.unwrap_err();

    assert!(matches!(err, NotifyError::Channel { status: 401, .. }));
    assert_eq!(err.to_string(), "Telegram API error 401: Unauthorized");
    Ok(())
}

#[tokio::test]
async fn send_failure_with_non_json_body_keeps_the_body() -> TestResult {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/bott/sendMessage");
            then.status(502).body("Bad Gateway");
        })
        .await;

    let mut channel = channel_for(&server, "t")?;
    let err = channel.send("Hi").await.unwrap_err();

    assert_eq!(err.to_string(), "Telegram API error 502: Bad Gateway");
    Ok(())
}

#[tokio::test]
async fn poll_returns_first_newer_reply_from_our_chat() -> TestResult {
    init_tracing();
    let server = MockServer::start_async().await;

    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/bott/getUpdates")
                .query_param("offset", "0");
            then.status(200).json_body(json!({
                "ok": true,
                "result": [
                    { "update_id": 199, "message": { "message_id": 2, "chat": { "id": 123 }, "text": "log" } },
                    { "update_id": 200, "message": { "message_id": 9, "chat": { "id": 777 }, "text": "log" } },
                    { "update_id": 201, "message": { "message_id": 5, "chat": { "id": 123 }, "text": "RETRY" } }
                ]
            }));
        })
        .await;
    let next = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/bott/getUpdates")
                .query_param("offset", "202");
            then.status(200).json_body(json!({ "ok": true, "result": [] }));
        })
        .await;

    let mut channel = channel_for(&server, "t")?;

    let reply = channel
        .poll_for_reply(3, Duration::from_millis(20), Duration::from_secs(5))
        .await;
    assert_eq!(reply.as_deref(), Some("retry"));
    assert_eq!(channel.offset(), 202);
    first.assert_hits_async(1).await;

    // Already-inspected updates are never asked for again.
    let reply = channel
        .poll_for_reply(5, Duration::from_millis(20), Duration::from_millis(150))
        .await;
    assert_eq!(reply, None);
    first.assert_hits_async(1).await;
    assert!(next.hits_async().await >= 1);
    Ok(())
}

#[tokio::test]
async fn poll_times_out_with_no_reply() -> TestResult {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/bott/getUpdates");
            then.status(200).json_body(json!({ "ok": true, "result": [] }));
        })
        .await;

    let mut channel = channel_for(&server, "t")?;

    let started = Instant::now();
    let reply = channel
        .poll_for_reply(10, Duration::from_millis(100), Duration::from_millis(300))
        .await;
    let elapsed = started.elapsed();

    assert_eq!(reply, None);
    assert!(elapsed >= Duration::from_millis(300), "returned after {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "returned after {elapsed:?}");
    assert!(mock.hits_async().await >= 2, "polled on an interval");
    Ok(())
}

#[tokio::test]
async fn failed_ticks_do_not_abort_the_poll() -> TestResult {
    init_tracing();
    let server = MockServer::start_async().await;

    let mut failing = server
        .mock_async(|when, then| {
            when.method(GET).path("/bott/getUpdates");
            then.status(500).body("upstream exploded");
        })
        .await;

    let mut channel = channel_for(&server, "t")?;

    let recover = async {
        tokio::time::sleep(Duration::from_millis(150)).await;
        failing.delete_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/bott/getUpdates");
                then.status(200).json_body(json!({
                    "ok": true,
                    "result": [
                        { "update_id": 1, "message": { "message_id": 11, "chat": { "id": 123 }, "text": " Log " } }
                    ]
                }));
            })
            .await;
    };

    let (reply, ()) = tokio::join!(
        channel.poll_for_reply(10, Duration::from_millis(20), Duration::from_secs(5)),
        recover
    );

    assert_eq!(reply.as_deref(), Some("log"));
    Ok(())
}
