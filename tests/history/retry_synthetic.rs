use alpaca_data_rs::{AlpacaClient, AlpacaError, RetryConfig, TradesBuilder};
use httpmock::Method::GET;

use crate::common::{self, page, rows, trade};

#[tokio::test]
async fn persistent_429_is_retried_then_reported_as_rate_limited() {
    let server = common::setup_server();
    let sym = "RETRY";

    let fail_mock = server.mock(|when, then| {
        when.method(GET).path(format!("/v2/stocks/{sym}/trades"));
        then.status(429).body("too many requests");
    });

    let max_retries = 3;
    let client = AlpacaClient::builder()
        .base_url(common::base_url(&server))
        .retry_config(common::fast_retry(max_retries))
        .build()
        .unwrap();

    let result = TradesBuilder::new(&client, sym).fetch().await;

    // 1 initial + 3 retries
    fail_mock.assert_hits((1 + max_retries) as usize);
    match result {
        Err(AlpacaError::RateLimited { url }) => assert!(url.contains("/v2/stocks/RETRY/trades")),
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_not_retried_by_default() {
    let server = common::setup_server();
    let fail_mock = server.mock(|when, then| {
        when.method(GET).path("/v2/stocks/AAPL/trades");
        then.status(503).body("Service Unavailable");
    });

    let client = common::client(&server);
    let result = TradesBuilder::new(&client, "AAPL").fetch().await;

    fail_mock.assert_hits(1);
    match result {
        Err(AlpacaError::Server { status, message, .. }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "Service Unavailable");
        }
        other => panic!("expected Server error, got {other:?}"),
    }
}

#[tokio::test]
async fn per_call_policy_overrides_the_client() {
    let server = common::setup_server();
    let fail_mock = server.mock(|when, then| {
        when.method(GET).path("/v2/stocks/AAPL/trades");
        then.status(429);
    });

    let client = common::client(&server);
    let err = TradesBuilder::new(&client, "AAPL")
        .retry_policy(Some(RetryConfig::disabled()))
        .fetch()
        .await
        .unwrap_err();

    fail_mock.assert_hits(1);
    assert!(matches!(err, AlpacaError::RateLimited { .. }));
}

#[tokio::test]
async fn retry_on_5xx_can_be_enabled() {
    let server = common::setup_server();
    let fail_mock = server.mock(|when, then| {
        when.method(GET).path("/v2/stocks/AAPL/trades");
        then.status(502);
    });

    let mut cfg = common::fast_retry(2);
    cfg.retry_on_status.push(502);
    let client = common::client(&server);
    let err = TradesBuilder::new(&client, "AAPL")
        .retry_policy(Some(cfg))
        .fetch()
        .await
        .unwrap_err();

    fail_mock.assert_hits(3);
    assert!(matches!(err, AlpacaError::Server { status: 502, .. }));
}

#[tokio::test]
async fn recovers_once_the_rate_limit_lifts() {
    let server = common::setup_server();
    let mut limited = server.mock(|when, then| {
        when.method(GET).path("/v2/stocks/AAPL/trades");
        then.status(429);
    });

    let client = common::client(&server);
    let pending = tokio::spawn({
        let client = client.clone();
        async move {
            TradesBuilder::new(&client, "AAPL")
                .retry_policy(Some(RetryConfig {
                    max_retries: 50,
                    backoff: alpaca_data_rs::Backoff::Fixed(std::time::Duration::from_millis(20)),
                    ..RetryConfig::default()
                }))
                .fetch()
                .await
        }
    });

    tokio::time::sleep(std::time::Duration::from_millis(60)).await;
    limited.delete();
    let ok = server.mock(|when, then| {
        when.method(GET).path("/v2/stocks/AAPL/trades");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(page("trades", rows(trade, 0..2), None));
    });

    let trades = pending.await.unwrap().unwrap();
    assert_eq!(trades.len(), 2);
    ok.assert_hits(1);
}
