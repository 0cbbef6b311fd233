//! Wire shapes of the pre-generated dashboard data files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `index.json`: every available snapshot date, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct IndexManifest {
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub latest_date: Option<String>,
    #[serde(default)]
    pub generated_at_utc: Option<String>,
    #[serde(default)]
    pub total_days: Option<u64>,
    #[serde(default)]
    pub total_rows: Option<u64>,
}

impl IndexManifest {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn position_of(&self, date: &str) -> Option<usize> {
        self.dates.iter().position(|entry| entry == date)
    }

    pub fn contains(&self, date: &str) -> bool {
        self.position_of(date).is_some()
    }

    /// `latest_date` when it is listed, otherwise the first (newest) date.
    pub fn initial_date(&self) -> Option<&str> {
        self.latest_date
            .as_deref()
            .filter(|latest| self.contains(latest))
            .or_else(|| self.dates.first().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DaySummary {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub up_count: u64,
    #[serde(default)]
    pub down_count: u64,
    #[serde(default)]
    pub flat_count: u64,
    #[serde(default)]
    pub avg_change: Option<f64>,
    #[serde(default)]
    pub market_counts: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketBreakdown {
    pub code: String,
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StockRow {
    #[serde(default)]
    pub security_code: String,
    #[serde(default)]
    pub security_name: String,
    #[serde(default)]
    pub market_group: String,
    #[serde(default)]
    pub market_label: String,
    #[serde(default)]
    pub change_rate: Option<f64>,
    #[serde(default)]
    pub detail_link: Option<String>,
    #[serde(default)]
    pub quote_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_market_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_type_code: Option<String>,
}

/// `days/{date}.json`: the full snapshot for one trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DayRecord {
    pub date: String,
    #[serde(default)]
    pub source_file: Option<String>,
    #[serde(default)]
    pub summary: DaySummary,
    #[serde(default)]
    pub market_breakdown: Vec<MarketBreakdown>,
    #[serde(default)]
    pub stocks: Vec<StockRow>,
    #[serde(default)]
    pub top_gainers: Vec<StockRow>,
    #[serde(default)]
    pub top_losers: Vec<StockRow>,
}

/// Display label for an upstream market group code.
pub fn market_label(code: &str) -> &'static str {
    match code {
        "HS" => "沪市",
        "KCB" => "科创板",
        "SZ" => "深市",
        "BJ" => "京市",
        "KZZ" => "可转债",
        _ => "其他",
    }
}
