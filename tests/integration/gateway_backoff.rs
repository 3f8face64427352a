//! Retry and backoff behaviour of the call gateway, on paused tokio time.

use std::time::Duration;
use storyloom::error::ApiError;
use storyloom::gateway::{CallGateway, GenerationCall, RetryPolicy};
use storyloom::provider::ScriptedProvider;

fn call() -> GenerationCall {
    GenerationCall::new("Tell me a story", "You are a storyteller.", 2000, 0.8)
}

fn default_gateway(provider: &ScriptedProvider) -> CallGateway {
    CallGateway::new(Box::new(provider.clone()), RetryPolicy::default())
}

#[tokio::test(start_paused = true)]
async fn test_linear_backoff_between_attempts() {
    let provider = ScriptedProvider::new();
    provider
        .push_failure("down")
        .push_failure("still down")
        .push_failure("gone");

    let err = default_gateway(&provider).invoke(&call()).await.unwrap_err();
    assert!(err.is_gateway_exhausted());

    let requests = provider.requests();
    assert_eq!(requests.len(), 3);
    let first_gap = requests[1].received_at - requests[0].received_at;
    let second_gap = requests[2].received_at - requests[1].received_at;
    assert_eq!(first_gap, Duration::from_millis(1500));
    assert_eq!(second_gap, Duration::from_millis(3000));
}

#[tokio::test(start_paused = true)]
async fn test_success_on_second_attempt_stops_retrying() {
    let provider = ScriptedProvider::new();
    provider.push_failure("blip").push_text("Once upon a time");

    let started = tokio::time::Instant::now();
    let reply = default_gateway(&provider).invoke(&call()).await.unwrap();
    assert_eq!(reply, "Once upon a time");
    assert_eq!(provider.request_count(), 2);
    // One backoff only; nothing waits after the successful attempt.
    assert_eq!(started.elapsed(), Duration::from_millis(1500));
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_reports_last_error_without_trailing_wait() {
    let provider = ScriptedProvider::new();
    provider
        .push_failure("one")
        .push_failure("two")
        .push_failure("three");

    let started = tokio::time::Instant::now();
    let err = default_gateway(&provider).invoke(&call()).await.unwrap_err();
    assert_eq!(started.elapsed(), Duration::from_millis(4500));
    match err {
        ApiError::GatewayExhausted { attempts, source } => {
            assert_eq!(attempts, 3);
            assert!(source.to_string().contains("three"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_call_parameters_reach_the_provider() {
    let provider = ScriptedProvider::with_texts(["ok"]);
    let gateway = CallGateway::new(Box::new(provider.clone()), RetryPolicy::immediate(3));
    gateway.invoke(&call()).await.unwrap();

    let sent = &provider.requests()[0];
    assert_eq!(sent.prompt, "Tell me a story");
    assert_eq!(sent.system.as_deref(), Some("You are a storyteller."));
    assert_eq!(sent.max_tokens, Some(2000));
    assert_eq!(sent.temperature, Some(0.8));
}
