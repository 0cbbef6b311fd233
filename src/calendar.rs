//! Year → month → dates partition of the manifest.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CalendarIndex {
    years: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl CalendarIndex {
    /// Partitions `dates` on their `YYYY-MM` prefix, keeping first-appearance order
    /// inside each bucket.
    pub fn build(dates: &[String]) -> Self {
        let mut years: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        for date in dates {
            let (year, month) = year_month(date);
            years
                .entry(year.to_string())
                .or_default()
                .entry(month.to_string())
                .or_default()
                .push(date.clone());
        }
        Self { years }
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Years, newest first.
    pub fn years(&self) -> Vec<&str> {
        self.years.keys().rev().map(String::as_str).collect()
    }

    /// Months of `year`, newest first.
    pub fn months(&self, year: &str) -> Vec<&str> {
        self.years
            .get(year)
            .map(|months| months.keys().rev().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn dates(&self, year: &str, month: &str) -> &[String] {
        self.years
            .get(year)
            .and_then(|months| months.get(month))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.years
            .values()
            .flat_map(|months| months.values())
            .map(Vec::len)
            .sum()
    }

    /// Date to show for the bucket `(year, month)`: `current` when it belongs to the
    /// bucket, otherwise the bucket's first date.
    pub fn resolve<'a>(&'a self, year: &str, month: &str, current: Option<&'a str>) -> Option<&'a str> {
        let bucket = self.dates(year, month);
        match current {
            Some(date) if bucket.iter().any(|entry| entry == date) => Some(date),
            _ => bucket.first().map(String::as_str),
        }
    }
}

/// Splits `YYYY-MM-DD` into `("YYYY", "MM")`. Malformed dates still land in a bucket.
pub fn year_month(date: &str) -> (&str, &str) {
    let mut parts = date.splitn(3, '-');
    let year = parts.next().unwrap_or_default();
    let month = parts.next().unwrap_or_default();
    (year, month)
}
