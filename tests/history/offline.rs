use alpaca_data_rs::{AlpacaClient, AlpacaError, QuotesBuilder, TradesBuilder};
use chrono::{TimeZone, Utc};
use httpmock::Method::GET;

use crate::common::{self, page, quote, rows, trade};

#[tokio::test]
async fn quotes_total_limit_stops_after_thirty() {
    let server = common::setup_server();

    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/stocks/TSLA/quotes")
            .query_param("start", "2021-08-09T13:30:00Z")
            .query_param("limit", "30");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(page("quotes", rows(quote, 0..20), Some("p2")));
    });
    let second = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/stocks/TSLA/quotes")
            .query_param("start", "2021-08-09T13:30:00Z")
            .query_param("limit", "10")
            .query_param("page_token", "p2");
        // the server ignores the smaller limit; the client trims
        then.status(200)
            .header("content-type", "application/json")
            .json_body(page("quotes", rows(quote, 20..40), Some("p3")));
    });

    let client = common::client(&server);
    let quotes = QuotesBuilder::new(&client, "TSLA")
        .start(Utc.with_ymd_and_hms(2021, 8, 9, 13, 30, 0).unwrap())
        .total_limit(30)
        .fetch()
        .await
        .unwrap();

    first.assert_hits(1);
    second.assert_hits(1);
    assert_eq!(quotes.len(), 30);
    assert!((quotes[0].ask_price - 710.5).abs() < 1e-9);
    assert!((quotes[29].ask_price - 710.79).abs() < 1e-9);
    assert!(quotes.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[tokio::test]
async fn trades_follow_every_page_in_server_order() {
    let server = common::setup_server();

    // Later pages are registered first so the token-less mock only catches page one.
    let third = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/stocks/AAPL/trades")
            .query_param("limit", "2")
            .query_param("page_token", "t2");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(page("trades", rows(trade, 4..5), None));
    });
    let second = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/stocks/AAPL/trades")
            .query_param("limit", "2")
            .query_param("page_token", "t1");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(page("trades", rows(trade, 2..4), Some("t2")));
    });
    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/stocks/AAPL/trades")
            .query_param("limit", "2")
            .header("APCA-API-KEY-ID", common::KEY_ID)
            .header("APCA-API-SECRET-KEY", common::SECRET_KEY);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(page("trades", rows(trade, 0..2), Some("t1")));
    });

    let client = common::client(&server);
    let trades = TradesBuilder::new(&client, "AAPL")
        .page_limit(2)
        .fetch()
        .await
        .unwrap();

    first.assert_hits(1);
    second.assert_hits(1);
    third.assert_hits(1);
    let ids: Vec<i64> = trades.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    assert_eq!(trades[0].exchange, "V");
    assert_eq!(trades[0].conditions, vec!["@".to_string()]);
    assert_eq!(trades[0].update, None);
}

#[tokio::test]
async fn null_records_mean_no_data() {
    let server = common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v2/stocks/AAPL/trades");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"trades":null,"symbol":"AAPL","next_page_token":null}"#);
    });

    let client = common::client(&server);
    let trades = TradesBuilder::new(&client, "AAPL").fetch().await.unwrap();

    mock.assert_hits(1);
    assert!(trades.is_empty());
}

#[tokio::test]
async fn undecodable_page_is_a_protocol_error() {
    let server = common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v2/stocks/AAPL/trades");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"trades":[{"t":"not a time"}],"next_page_token":null}"#);
    });

    let client = common::client(&server);
    let err = TradesBuilder::new(&client, "AAPL").fetch().await.unwrap_err();

    mock.assert_hits(1);
    assert!(matches!(err, AlpacaError::Protocol(_)), "got {err:?}");
}

#[tokio::test]
async fn server_repeating_its_token_is_a_protocol_error() {
    let server = common::setup_server();
    let again = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/stocks/AAPL/trades")
            .query_param("page_token", "loop");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(page("trades", rows(trade, 1..2), Some("loop")));
    });
    let first = server.mock(|when, then| {
        when.method(GET).path("/v2/stocks/AAPL/trades");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(page("trades", rows(trade, 0..1), Some("loop")));
    });

    let client = common::client(&server);
    let err = TradesBuilder::new(&client, "AAPL").fetch().await.unwrap_err();

    first.assert_hits(1);
    again.assert_hits(1);
    assert!(matches!(err, AlpacaError::Protocol(_)), "got {err:?}");
}

#[tokio::test]
async fn invalid_symbol_fails_before_any_request() {
    let server = common::setup_server();
    let any = server.mock(|when, then| {
        when.method(GET);
        then.status(200).body("{}");
    });

    let client = common::client(&server);
    for sym in ["", "A B", "A/B", ".", ".."] {
        let err = TradesBuilder::new(&client, sym).fetch().await.unwrap_err();
        assert!(matches!(err, AlpacaError::InvalidArgument(_)), "{sym}: {err:?}");
    }
    let err = QuotesBuilder::new(&client, "AAPL")
        .page_limit(0)
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, AlpacaError::InvalidArgument(_)));

    any.assert_hits(0);
}

#[tokio::test]
async fn oauth_token_is_sent_as_bearer() {
    let server = common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/stocks/AAPL/trades")
            .header("authorization", "Bearer oauth-token");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(page("trades", rows(trade, 0..1), None));
    });

    let client = AlpacaClient::builder()
        .base_url(common::base_url(&server))
        .oauth_token("oauth-token")
        .build()
        .unwrap();
    let trades = TradesBuilder::new(&client, "AAPL").fetch().await.unwrap();

    mock.assert_hits(1);
    assert_eq!(trades.len(), 1);
}
