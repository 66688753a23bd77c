use alpaca_data_rs::{
    Adjustment, AlpacaClient, AlpacaError, BarsBuilder, MultiBarsBuilder, MultiTradesBuilder,
    NewsBuilder, QuotesBuilder, TimeFrame, TimeFrameUnit,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use futures::StreamExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Credentials come from APCA_API_KEY_ID / APCA_API_SECRET_KEY.
    let client = AlpacaClient::from_env()?;
    println!(
        "Retrying 429s up to {} times",
        client.retry_config().max_retries
    );

    // 1. AAPL and MSFT trades from the first second of the 2021-08-09 open.
    let trades = MultiTradesBuilder::new(&client)
        .symbols(["AAPL", "MSFT"])
        .between(
            Utc.with_ymd_and_hms(2021, 8, 9, 13, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2021, 8, 9, 13, 30, 1).unwrap(),
        )
        .fetch()
        .await?;
    for (symbol, rows) in &trades {
        println!("{symbol} trades:");
        for t in rows {
            println!("  {} {:>8.2} x {}", t.timestamp, t.price, t.size);
        }
    }
    println!();

    // 2. The first 30 TSLA quotes after the open.
    let quotes = QuotesBuilder::new(&client, "TSLA")
        .start(Utc.with_ymd_and_hms(2021, 8, 9, 13, 30, 0).unwrap())
        .total_limit(30)
        .fetch()
        .await?;
    println!("TSLA quotes:");
    for q in &quotes {
        println!("  {} bid {:.2} ask {:.2}", q.timestamp, q.bid_price, q.ask_price);
    }
    println!();

    // 3. IBM and GE 5-minute split-adjusted bars for the first half hour, streamed.
    let mut bars = MultiBarsBuilder::new(&client)
        .symbols(["IBM", "GE"])
        .timeframe(TimeFrame::new(5, TimeFrameUnit::Min)?)
        .adjustment(Adjustment::Split)
        .between(
            Utc.with_ymd_and_hms(2021, 8, 9, 13, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2021, 8, 9, 14, 0, 0).unwrap(),
        )
        .stream()?;
    while let Some(res) = bars.next().await {
        let bar = res.item?;
        println!("{}: {} close {:.2}", res.symbol, bar.timestamp, bar.close);
    }
    println!();

    // 4. META daily bars, resolving the symbol as of 2022-06-10.
    let meta = BarsBuilder::new(&client, "META")
        .timeframe(TimeFrame::ONE_DAY)
        .between(
            Utc.with_ymd_and_hms(2022, 6, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2022, 6, 22, 0, 0, 0).unwrap(),
        )
        .as_of(NaiveDate::from_ymd_opt(2022, 6, 10).unwrap())
        .fetch()
        .await?;
    println!("META bars:");
    for b in &meta {
        println!("  {} o {:.2} c {:.2} v {}", b.timestamp, b.open, b.close, b.volume);
    }
    println!();

    // 5. Average daily trading volume.
    let (adtv, days) = average_daily_volume(
        &client,
        "AAPL",
        Utc.with_ymd_and_hms(2021, 8, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2021, 9, 1, 0, 0, 0).unwrap(),
    )
    .await?;
    println!("AAPL ADTV: {adtv:.2} ({days} market days)");
    println!();

    // 6. News.
    let news = NewsBuilder::new(&client)
        .symbols(["AAPL", "TSLA"])
        .between(
            Utc.with_ymd_and_hms(2021, 5, 6, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2021, 5, 7, 0, 0, 0).unwrap(),
        )
        .total_limit(4)
        .fetch()
        .await?;
    println!("news:");
    for n in &news {
        println!("  [{}] {} ({})", n.created_at, n.headline, n.source);
    }

    Ok(())
}

/// Streams daily bars and averages their volume.
async fn average_daily_volume(
    client: &AlpacaClient,
    symbol: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(f64, usize), AlpacaError> {
    let mut bars = BarsBuilder::new(client, symbol).between(start, end).stream()?;
    let mut total_volume = 0u64;
    let mut days = 0usize;
    while let Some(res) = bars.next().await {
        total_volume += res.item?.volume;
        days += 1;
    }
    if days == 0 {
        return Ok((0.0, 0));
    }
    #[allow(clippy::cast_precision_loss)]
    Ok((total_volume as f64 / days as f64, days))
}
