use alpaca_data_rs::{
    Adjustment, AlpacaError, MultiBarsBuilder, MultiQuotesBuilder, MultiTradesBuilder, TimeFrame,
    TimeFrameUnit,
};
use chrono::{TimeZone, Utc};
use httpmock::Method::GET;
use serde_json::json;

use crate::common::{self, bar, quote, trade};

#[tokio::test]
async fn shared_cursor_groups_records_by_symbol() {
    let server = common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/stocks/trades")
            .query_param("symbols", "AAPL,MSFT")
            .query_param("start", "2021-08-09T13:30:00Z")
            .query_param("end", "2021-08-09T13:30:01Z")
            .query_param("limit", "10000");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "trades": {
                    "AAPL": [trade(1), trade(2)],
                    "MSFT": [trade(3)]
                },
                "next_page_token": null
            }));
    });

    let client = common::client(&server);
    let trades = MultiTradesBuilder::new(&client)
        .symbols(["AAPL", "MSFT"])
        .between(
            Utc.with_ymd_and_hms(2021, 8, 9, 13, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2021, 8, 9, 13, 30, 1).unwrap(),
        )
        .fetch()
        .await
        .unwrap();

    mock.assert_hits(1);
    assert_eq!(trades.len(), 2);
    let aapl: Vec<i64> = trades["AAPL"].iter().map(|t| t.id).collect();
    assert_eq!(aapl, vec![1, 2]);
    assert_eq!(trades["MSFT"].len(), 1);
    assert_eq!(trades["MSFT"][0].id, 3);
}

#[tokio::test]
async fn shared_cursor_total_limit_spans_all_symbols() {
    let server = common::setup_server();
    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/stocks/quotes")
            .query_param("symbols", "AAPL,MSFT")
            .query_param("limit", "4");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "quotes": { "AAPL": [quote(0), quote(1)], "MSFT": [quote(10)] },
                "next_page_token": "n1"
            }));
    });
    let second = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/stocks/quotes")
            .query_param("limit", "1")
            .query_param("page_token", "n1");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "quotes": { "AAPL": [quote(2)], "MSFT": [quote(11)] },
                "next_page_token": "n2"
            }));
    });

    let client = common::client(&server);
    let quotes = MultiQuotesBuilder::new(&client)
        .symbols(["AAPL", "MSFT", "AAPL"])
        .total_limit(4)
        .fetch()
        .await
        .unwrap();

    first.assert_hits(1);
    second.assert_hits(1);
    let total: usize = quotes.values().map(Vec::len).sum();
    assert_eq!(total, 4);
    assert_eq!(quotes["AAPL"].len(), 3);
    assert_eq!(quotes["MSFT"].len(), 1);
}

#[tokio::test]
async fn multi_bars_carry_timeframe_and_adjustment() {
    let server = common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/stocks/bars")
            .query_param("symbols", "IBM,GE")
            .query_param("timeframe", "5Min")
            .query_param("adjustment", "split");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "bars": { "IBM": [bar(0), bar(1), bar(2)] },
                "next_page_token": null
            }));
    });

    let client = common::client(&server);
    let bars = MultiBarsBuilder::new(&client)
        .symbols(["IBM"])
        .add_symbol("GE")
        .timeframe(TimeFrame::new(5, TimeFrameUnit::Min).unwrap())
        .adjustment(Adjustment::Split)
        .fetch()
        .await
        .unwrap();

    mock.assert_hits(1);
    assert_eq!(bars["IBM"].len(), 3);
    // no data, no entry
    assert!(!bars.contains_key("GE"));
}

#[tokio::test]
async fn symbol_list_is_validated_up_front() {
    let server = common::setup_server();
    let any = server.mock(|when, then| {
        when.method(GET);
        then.status(200).body("{}");
    });
    let client = common::client(&server);

    let err = MultiTradesBuilder::new(&client).fetch().await.unwrap_err();
    assert!(matches!(err, AlpacaError::InvalidArgument(_)));

    let err = MultiTradesBuilder::new(&client)
        .symbols((0..1001).map(|i| format!("S{i}")))
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, AlpacaError::InvalidArgument(_)));

    let err = MultiTradesBuilder::new(&client)
        .symbols(["AAPL", ""])
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, AlpacaError::InvalidArgument(_)));

    any.assert_hits(0);
}

#[tokio::test]
async fn malformed_symbol_map_is_a_protocol_error() {
    let server = common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v2/stocks/trades");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"trades":[1,2,3],"next_page_token":null}"#);
    });

    let client = common::client(&server);
    let err = MultiTradesBuilder::new(&client)
        .symbols(["AAPL"])
        .fetch()
        .await
        .unwrap_err();

    mock.assert_hits(1);
    assert!(matches!(err, AlpacaError::Protocol(_)), "got {err:?}");
}
