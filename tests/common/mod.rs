#![allow(dead_code)]

use lhb_dashboard::{DayRecord, DaySummary, IndexManifest, MarketBreakdown, StockRow};

pub fn manifest(dates: &[&str]) -> IndexManifest {
    IndexManifest {
        dates: dates.iter().map(|d| d.to_string()).collect(),
        latest_date: dates.first().map(|d| d.to_string()),
        generated_at_utc: Some("2025-03-04T08:00:00+00:00".to_string()),
        total_days: Some(dates.len() as u64),
        total_rows: None,
    }
}

pub fn stock(code: &str, market: &str, change: Option<f64>) -> StockRow {
    StockRow {
        security_code: code.to_string(),
        security_name: format!("stock-{code}"),
        market_group: market.to_string(),
        market_label: lhb_dashboard::market_label(market).to_string(),
        change_rate: change,
        detail_link: Some(format!(
            "https://data.eastmoney.com/stock/lhb,2025-03-04,{code}.html"
        )),
        quote_link: None,
        ..StockRow::default()
    }
}

/// Day with `total_count - 1` HS stocks plus one SZ stock.
pub fn day(date: &str, total_count: u64) -> DayRecord {
    let mut stocks: Vec<StockRow> = (0..total_count.saturating_sub(1))
        .map(|idx| stock(&format!("6000{idx:02}"), "HS", Some(idx as f64 - 1.0)))
        .collect();
    stocks.push(stock("000001", "SZ", Some(-2.0)));

    DayRecord {
        date: date.to_string(),
        source_file: Some(format!("lhb_overview_{}.csv", date.replace('-', ""))),
        summary: DaySummary {
            total_count,
            up_count: 1,
            down_count: 1,
            flat_count: 0,
            avg_change: Some(0.25),
            ..DaySummary::default()
        },
        market_breakdown: vec![
            MarketBreakdown {
                code: "HS".to_string(),
                label: "沪市".to_string(),
                count: total_count.saturating_sub(1),
            },
            MarketBreakdown {
                code: "SZ".to_string(),
                label: "深市".to_string(),
                count: 1,
            },
        ],
        top_gainers: stocks.iter().take(1).cloned().collect(),
        top_losers: stocks.iter().rev().take(1).cloned().collect(),
        stocks,
    }
}
