use crate::models::{DayRecord, StockRow};

pub const ALL_MARKETS: &str = "ALL";

/// `"ALL"` followed by each distinct breakdown code in first-appearance order.
pub fn filter_codes(day: &DayRecord) -> Vec<String> {
    let mut codes = vec![ALL_MARKETS.to_string()];
    for entry in &day.market_breakdown {
        if !codes.iter().any(|code| code == &entry.code) {
            codes.push(entry.code.clone());
        }
    }
    codes
}

pub fn is_valid_filter(day: &DayRecord, filter: &str) -> bool {
    filter == ALL_MARKETS || day.market_breakdown.iter().any(|entry| entry.code == filter)
}

pub fn filter_stocks<'a>(day: &'a DayRecord, filter: &str) -> Vec<&'a StockRow> {
    day.stocks
        .iter()
        .filter(|row| filter == ALL_MARKETS || row.market_group == filter)
        .collect()
}
