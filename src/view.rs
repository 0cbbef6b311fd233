//! Pure derivation of everything the page shows from the session state.

use serde::Serialize;

use crate::calendar::year_month;
use crate::format::{fmt_count, fmt_generated_at, fmt_percent, ChangeTone};
use crate::market_filter::{filter_codes, filter_stocks, ALL_MARKETS};
use crate::models::{market_label, DayRecord, StockRow};
use crate::navigation::NavTargets;
use crate::session::{DashboardSession, SessionStatus};
use crate::sparkline::{build_sparkline, Sparkline};

pub const NO_DATA_MESSAGE: &str = "No snapshot data is available yet.";
pub const EMPTY_FILTER_MESSAGE: &str = "No stocks for this market filter.";
pub const LOADING_MESSAGE: &str = "Loading…";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    Loading,
    NoData,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub status: ViewStatus,
    /// Replaces the table when the page has nothing else to show.
    pub message: Option<String>,
    pub hero: HeroView,
    pub metrics: Vec<MetricView>,
    pub market_bars: Vec<BarView>,
    pub filters: Vec<FilterButton>,
    pub table: TableView,
    pub top_gainers: Vec<RankEntry>,
    pub top_losers: Vec<RankEntry>,
    pub calendar: CalendarControls,
    pub date_pills: Vec<DatePill>,
    pub nav: NavTargets,
    pub sparkline: Sparkline,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HeroView {
    pub date: Option<String>,
    pub generated_at: String,
    pub total_days: usize,
    pub total_rows: Option<u64>,
    pub source_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricView {
    pub label: &'static str,
    pub value: String,
    pub tone: ChangeTone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarView {
    pub code: String,
    pub label: String,
    pub count: u64,
    pub width_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterButton {
    pub code: String,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TableView {
    pub rows: Vec<StockRowView>,
    pub placeholder: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockRowView {
    pub security_code: String,
    pub security_name: String,
    pub market_label: String,
    pub change: String,
    pub tone: ChangeTone,
    pub detail_link: Option<String>,
    pub quote_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankEntry {
    pub rank: usize,
    pub security_code: String,
    pub security_name: String,
    pub change: String,
    pub tone: ChangeTone,
    pub detail_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CalendarControls {
    pub years: Vec<SelectOption>,
    pub months: Vec<SelectOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatePill {
    pub date: String,
    pub label: String,
    pub active: bool,
}

impl DashboardView {
    fn placeholder(status: ViewStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            hero: HeroView::default(),
            metrics: Vec::new(),
            market_bars: Vec::new(),
            filters: Vec::new(),
            table: TableView::default(),
            top_gainers: Vec::new(),
            top_losers: Vec::new(),
            calendar: CalendarControls::default(),
            date_pills: Vec::new(),
            nav: NavTargets::default(),
            sparkline: build_sparkline(&[], None),
        }
    }
}

pub fn derive_view(session: &DashboardSession) -> DashboardView {
    let manifest = match (session.status(), session.manifest()) {
        (SessionStatus::Loading, _) => {
            return DashboardView::placeholder(ViewStatus::Loading, Some(LOADING_MESSAGE.to_string()))
        }
        (SessionStatus::Failed(message), _) => {
            return DashboardView::placeholder(ViewStatus::Failed, Some(message.clone()))
        }
        (SessionStatus::NoData, _) | (SessionStatus::Ready, None) => {
            return DashboardView::placeholder(ViewStatus::NoData, Some(NO_DATA_MESSAGE.to_string()))
        }
        (SessionStatus::Ready, Some(manifest)) => manifest,
    };

    let current = session.current_date();
    let day = session.day_data();

    // The hero describes the record on screen; controls follow the latest request.
    let hero = HeroView {
        date: session.shown_date().or(current).map(str::to_string),
        generated_at: fmt_generated_at(manifest.generated_at_utc.as_deref()),
        total_days: manifest.dates.len(),
        total_rows: manifest.total_rows,
        source_file: day.and_then(|d| d.source_file.clone()),
    };

    DashboardView {
        status: ViewStatus::Ready,
        message: None,
        hero,
        metrics: day.map(derive_metrics).unwrap_or_default(),
        market_bars: day.map(derive_bars).unwrap_or_default(),
        filters: day
            .map(|d| derive_filters(d, session.market_filter()))
            .unwrap_or_default(),
        table: derive_table(day, session.market_filter(), session.day_error()),
        top_gainers: day.map(|d| derive_ranks(&d.top_gainers)).unwrap_or_default(),
        top_losers: day.map(|d| derive_ranks(&d.top_losers)).unwrap_or_default(),
        calendar: derive_calendar(session),
        date_pills: derive_date_pills(session),
        nav: NavTargets::around(manifest, current),
        sparkline: build_sparkline(session.trend_series(), current),
    }
}

fn derive_metrics(day: &DayRecord) -> Vec<MetricView> {
    let summary = &day.summary;
    vec![
        MetricView {
            label: "Listed",
            value: fmt_count(summary.total_count),
            tone: ChangeTone::Flat,
        },
        MetricView {
            label: "Up",
            value: fmt_count(summary.up_count),
            tone: ChangeTone::Up,
        },
        MetricView {
            label: "Down",
            value: fmt_count(summary.down_count),
            tone: ChangeTone::Down,
        },
        MetricView {
            label: "Flat",
            value: fmt_count(summary.flat_count),
            tone: ChangeTone::Flat,
        },
        MetricView {
            label: "Avg change",
            value: fmt_percent(summary.avg_change),
            tone: ChangeTone::of(summary.avg_change),
        },
    ]
}

fn derive_bars(day: &DayRecord) -> Vec<BarView> {
    let max = day
        .market_breakdown
        .iter()
        .map(|entry| entry.count)
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    day.market_breakdown
        .iter()
        .map(|entry| BarView {
            code: entry.code.clone(),
            label: label_or_default(&entry.label, &entry.code),
            count: entry.count,
            width_pct: entry.count as f64 / max * 100.0,
        })
        .collect()
}

fn derive_filters(day: &DayRecord, active: &str) -> Vec<FilterButton> {
    filter_codes(day)
        .into_iter()
        .map(|code| {
            let label = if code == ALL_MARKETS {
                "All".to_string()
            } else {
                day.market_breakdown
                    .iter()
                    .find(|entry| entry.code == code)
                    .map(|entry| label_or_default(&entry.label, &code))
                    .unwrap_or_else(|| market_label(&code).to_string())
            };
            FilterButton {
                active: code == active,
                code,
                label,
            }
        })
        .collect()
}

fn derive_table(day: Option<&DayRecord>, filter: &str, error: Option<&str>) -> TableView {
    if let Some(message) = error {
        return TableView {
            rows: Vec::new(),
            placeholder: None,
            error: Some(message.to_string()),
        };
    }

    let Some(day) = day else {
        return TableView {
            rows: Vec::new(),
            placeholder: Some(LOADING_MESSAGE.to_string()),
            error: None,
        };
    };

    let rows: Vec<StockRowView> = filter_stocks(day, filter)
        .into_iter()
        .map(stock_row_view)
        .collect();
    let placeholder = rows
        .is_empty()
        .then(|| EMPTY_FILTER_MESSAGE.to_string());

    TableView {
        rows,
        placeholder,
        error: None,
    }
}

fn stock_row_view(row: &StockRow) -> StockRowView {
    StockRowView {
        security_code: row.security_code.clone(),
        security_name: row.security_name.clone(),
        market_label: label_or_default(&row.market_label, &row.market_group),
        change: fmt_percent(row.change_rate),
        tone: ChangeTone::of(row.change_rate),
        detail_link: row.detail_link.clone(),
        quote_link: row.quote_link.clone(),
    }
}

fn derive_ranks(rows: &[StockRow]) -> Vec<RankEntry> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| RankEntry {
            rank: idx + 1,
            security_code: row.security_code.clone(),
            security_name: row.security_name.clone(),
            change: fmt_percent(row.change_rate),
            tone: ChangeTone::of(row.change_rate),
            detail_link: row.detail_link.clone(),
        })
        .collect()
}

fn derive_calendar(session: &DashboardSession) -> CalendarControls {
    let calendar = session.calendar();
    let Some((year, month)) = session.current_date().map(year_month) else {
        return CalendarControls::default();
    };

    CalendarControls {
        years: calendar
            .years()
            .into_iter()
            .map(|value| SelectOption {
                selected: value == year,
                value: value.to_string(),
            })
            .collect(),
        months: calendar
            .months(year)
            .into_iter()
            .map(|value| SelectOption {
                selected: value == month,
                value: value.to_string(),
            })
            .collect(),
    }
}

fn derive_date_pills(session: &DashboardSession) -> Vec<DatePill> {
    let Some(current) = session.current_date() else {
        return Vec::new();
    };
    let (year, month) = year_month(current);

    session
        .calendar()
        .dates(year, month)
        .iter()
        .map(|date| DatePill {
            label: date.get(5..).unwrap_or(date).to_string(),
            active: date == current,
            date: date.clone(),
        })
        .collect()
}

fn label_or_default(label: &str, code: &str) -> String {
    if label.trim().is_empty() {
        market_label(code).to_string()
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::models::{DaySummary, IndexManifest, MarketBreakdown};
    use crate::sparkline::TrendPoint;

    fn stock(code: &str, market: &str, change: Option<f64>) -> StockRow {
        StockRow {
            security_code: code.to_string(),
            security_name: format!("name-{code}"),
            market_group: market.to_string(),
            market_label: market_label(market).to_string(),
            change_rate: change,
            detail_link: Some(format!("https://data.eastmoney.com/stock/lhb,2025-03-04,{code}.html")),
            ..StockRow::default()
        }
    }

    fn day(date: &str) -> DayRecord {
        DayRecord {
            date: date.to_string(),
            source_file: Some("lhb_overview_20250304.csv".to_string()),
            summary: DaySummary {
                total_count: 3,
                up_count: 2,
                down_count: 1,
                flat_count: 0,
                avg_change: Some(1.5),
                ..DaySummary::default()
            },
            market_breakdown: vec![
                MarketBreakdown {
                    code: "HS".to_string(),
                    label: "沪市".to_string(),
                    count: 2,
                },
                MarketBreakdown {
                    code: "SZ".to_string(),
                    label: String::new(),
                    count: 1,
                },
            ],
            stocks: vec![
                stock("600000", "HS", Some(9.98)),
                stock("000001", "SZ", Some(-3.2)),
                stock("600519", "HS", Some(0.0)),
            ],
            top_gainers: vec![stock("600000", "HS", Some(9.98))],
            top_losers: vec![stock("000001", "SZ", Some(-3.2))],
        }
    }

    fn loaded_session() -> DashboardSession {
        let mut session = DashboardSession::new();
        let target = session
            .apply_manifest(IndexManifest {
                dates: vec![
                    "2025-03-04".to_string(),
                    "2025-03-03".to_string(),
                    "2025-02-28".to_string(),
                ],
                latest_date: Some("2025-03-04".to_string()),
                generated_at_utc: Some("2025-03-04T08:00:00+00:00".to_string()),
                total_rows: Some(42),
                ..IndexManifest::default()
            })
            .expect("target date");
        session.set_trend_series(vec![
            TrendPoint {
                date: "2025-03-03".to_string(),
                total_count: 10,
            },
            TrendPoint {
                date: "2025-03-04".to_string(),
                total_count: 3,
            },
        ]);
        let ticket = session.begin_day_load(target);
        session.finish_day_load(&ticket, Ok(day("2025-03-04")));
        session
    }

    #[test]
    fn loading_session_only_shows_message() {
        let view = derive_view(&DashboardSession::new());
        assert_eq!(view.status, ViewStatus::Loading);
        assert!(view.table.rows.is_empty());
        assert!(view.sparkline.points.is_empty());
    }

    #[test]
    fn empty_manifest_renders_no_data() {
        let mut session = DashboardSession::new();
        session.apply_manifest(IndexManifest::default());
        let view = derive_view(&session);
        assert_eq!(view.status, ViewStatus::NoData);
        assert_eq!(view.message.as_deref(), Some(NO_DATA_MESSAGE));
        assert!(view.date_pills.is_empty());
    }

    #[test]
    fn failed_session_populates_nothing_else() {
        let mut session = loaded_session();
        session.fail("Failed to load dashboard index: boom");
        let view = derive_view(&session);
        assert_eq!(view.status, ViewStatus::Failed);
        assert_eq!(view.message.as_deref(), Some("Failed to load dashboard index: boom"));
        assert!(view.metrics.is_empty());
        assert!(view.filters.is_empty());
        assert!(view.calendar.years.is_empty());
    }

    #[test]
    fn ready_view_derives_every_panel() {
        let view = derive_view(&loaded_session());

        assert_eq!(view.status, ViewStatus::Ready);
        assert_eq!(view.hero.date.as_deref(), Some("2025-03-04"));
        assert_eq!(view.hero.generated_at, "2025-03-04 08:00 UTC");
        assert_eq!(view.hero.total_days, 3);
        assert_eq!(view.hero.total_rows, Some(42));

        assert_eq!(view.metrics.len(), 5);
        assert_eq!(view.metrics[4].value, "+1.50%");

        assert_eq!(view.market_bars[0].width_pct, 100.0);
        assert_eq!(view.market_bars[1].width_pct, 50.0);
        assert_eq!(view.market_bars[1].label, "深市");

        let filters: Vec<(&str, bool)> = view
            .filters
            .iter()
            .map(|f| (f.code.as_str(), f.active))
            .collect();
        assert_eq!(filters, vec![("ALL", true), ("HS", false), ("SZ", false)]);

        assert_eq!(view.table.rows.len(), 3);
        assert_eq!(view.table.rows[0].change, "+9.98%");
        assert_eq!(view.table.rows[2].change, "0.00%");
        assert_eq!(view.table.rows[1].tone, ChangeTone::Down);

        assert_eq!(view.top_gainers[0].rank, 1);
        assert_eq!(view.top_losers[0].change, "-3.20%");

        assert_eq!(view.calendar.years.len(), 1);
        assert!(view.calendar.years[0].selected);
        assert_eq!(
            view.calendar
                .months
                .iter()
                .map(|m| (m.value.as_str(), m.selected))
                .collect::<Vec<_>>(),
            vec![("03", true), ("02", false)]
        );

        assert_eq!(view.date_pills.len(), 2);
        assert_eq!(view.date_pills[0].label, "03-04");
        assert!(view.date_pills[0].active);

        assert!(view.nav.next_disabled());
        assert_eq!(view.nav.prev.as_deref(), Some("2025-03-03"));

        assert_eq!(
            view.sparkline.highlighted().map(|p| p.date.as_str()),
            Some("2025-03-04")
        );
    }

    #[test]
    fn filter_with_no_rows_renders_placeholder() {
        let mut session = loaded_session();
        let mut record = day("2025-03-03");
        record.stocks.retain(|row| row.market_group == "HS");
        let ticket = session.begin_day_load("2025-03-03");
        session.finish_day_load(&ticket, Ok(record));
        session.select_filter("SZ").expect("SZ is in the breakdown");

        let view = derive_view(&session);
        assert!(view.table.rows.is_empty());
        assert_eq!(view.table.placeholder.as_deref(), Some(EMPTY_FILTER_MESSAGE));
        assert!(view.filters.iter().any(|f| f.code == "SZ" && f.active));
    }

    #[test]
    fn day_error_replaces_table_but_keeps_controls() {
        let mut session = loaded_session();
        let ticket = session.begin_day_load("2025-03-03");
        session.finish_day_load(
            &ticket,
            Err(DashboardError::NotFound {
                resource: "days/2025-03-03.json".to_string(),
            }),
        );

        let view = derive_view(&session);
        assert!(view.table.error.as_deref().unwrap_or_default().contains("2025-03-03"));
        assert!(view.table.rows.is_empty());
        assert_eq!(view.hero.date.as_deref(), Some("2025-03-04"));
        assert_eq!(view.date_pills.len(), 2);
        assert_eq!(view.sparkline.points.len(), 2);
    }

    #[test]
    fn pending_selection_moves_controls_but_not_the_record() {
        let mut session = loaded_session();
        session.begin_day_load("2025-03-03");

        let view = derive_view(&session);
        assert_eq!(view.hero.date.as_deref(), Some("2025-03-04"));
        assert_eq!(view.nav.prev.as_deref(), Some("2025-02-28"));
        assert!(view
            .date_pills
            .iter()
            .any(|pill| pill.date == "2025-03-03" && pill.active));
    }
}
