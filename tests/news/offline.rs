use alpaca_data_rs::{AlpacaError, NewsBuilder, Sort};
use chrono::{TimeZone, Utc};
use httpmock::Method::GET;
use serde_json::json;

use crate::common::{self, news, page, rows};

#[tokio::test]
async fn news_pages_over_all_symbols_with_one_cursor() {
    let server = common::setup_server();
    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/v1beta1/news")
            .query_param("symbols", "AAPL,TSLA")
            .query_param("start", "2021-05-06T00:00:00Z")
            .query_param("end", "2021-05-07T00:00:00Z")
            .query_param("limit", "4");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(page("news", rows(news, 1..4), Some("n2")));
    });
    let second = server.mock(|when, then| {
        when.method(GET)
            .path("/v1beta1/news")
            .query_param("limit", "1")
            .query_param("page_token", "n2");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(page("news", rows(news, 4..6), Some("n3")));
    });

    let client = common::client(&server);
    let articles = NewsBuilder::new(&client)
        .symbols(["AAPL", "TSLA"])
        .between(
            Utc.with_ymd_and_hms(2021, 5, 6, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2021, 5, 7, 0, 0, 0).unwrap(),
        )
        .total_limit(4)
        .fetch()
        .await
        .unwrap();

    first.assert_hits(1);
    second.assert_hits(1);
    let ids: Vec<i64> = articles.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(articles[0].headline, "headline 1");
    assert_eq!(articles[0].source, "benzinga");
}

#[tokio::test]
async fn news_page_limit_is_clamped_and_flags_are_sent() {
    let server = common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1beta1/news")
            .query_param("limit", "50")
            .query_param("sort", "asc")
            .query_param("include_content", "true")
            .query_param("exclude_contentless", "true");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "news": [{
                    "id": 7,
                    "headline": "with body",
                    "author": "",
                    "created_at": "2021-05-06T12:00:00Z",
                    "updated_at": "2021-05-06T12:30:00Z",
                    "summary": "s",
                    "content": "<p>body</p>",
                    "images": [{ "size": "thumb", "url": "https://example.com/t.jpg" }],
                    "symbols": ["AAPL", "TSLA"],
                    "source": "benzinga"
                }],
                "next_page_token": null
            }));
    });

    let client = common::client(&server);
    let articles = NewsBuilder::new(&client)
        .page_limit(500)
        .sort(Sort::Asc)
        .include_content(true)
        .exclude_contentless(true)
        .fetch()
        .await
        .unwrap();

    mock.assert_hits(1);
    assert_eq!(articles.len(), 1);
    let a = &articles[0];
    assert_eq!(a.content, "<p>body</p>");
    assert_eq!(a.images.len(), 1);
    assert_eq!(a.images[0].size, "thumb");
    assert_eq!(a.symbols, vec!["AAPL".to_string(), "TSLA".to_string()]);
    assert_eq!(a.url, None);
}

#[tokio::test]
async fn news_rejects_inverted_window() {
    let server = common::setup_server();
    let client = common::client(&server);
    let err = NewsBuilder::new(&client)
        .between(
            Utc.with_ymd_and_hms(2021, 5, 7, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2021, 5, 6, 0, 0, 0).unwrap(),
        )
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, AlpacaError::InvalidArgument(_)));
}
