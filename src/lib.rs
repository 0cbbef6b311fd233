//! LHB daily dashboard.
//!
//! Loads the pre-generated `index.json` / `days/{date}.json` snapshot files, keeps
//! one dashboard session consistent across date, calendar and market-filter
//! changes, and renders it as an HTML page.

mod calendar;
mod config;
mod controller;
mod dashboard;
mod error;
mod format;
mod market_filter;
mod models;
mod navigation;
mod observability;
mod session;
mod source;
mod sparkline;
mod view;

pub use calendar::{year_month, CalendarIndex};
pub use config::{
    ConfigError, DashboardConfig, DataLocation, DEFAULT_BIND_ADDR, DEFAULT_DATA_DIR,
    DEFAULT_HTTP_TIMEOUT_MS,
};
pub use controller::{DashboardController, InitOutcome};
pub use dashboard::{dashboard_router, render_dashboard_html, TABLE_HEADERS};
pub use error::DashboardError;
pub use format::{fmt_count, fmt_generated_at, fmt_percent, ChangeTone};
pub use market_filter::{filter_codes, filter_stocks, is_valid_filter, ALL_MARKETS};
pub use models::{market_label, DayRecord, DaySummary, IndexManifest, MarketBreakdown, StockRow};
pub use navigation::{NavTargets, StepDirection};
pub use observability::{
    init_logging, log_app_bind, log_app_start, log_init_finished, log_source_selected,
    logging_config_from_env, LogFormat, LoggingConfig, LoggingInitError,
};
pub use session::{DashboardSession, DayLoadOutcome, DayLoadTicket, SessionStatus};
pub use source::{
    day_path, DashboardDataSource, DirDataSource, HttpDataSource, InMemoryDataSource,
    SourceFuture, INDEX_PATH,
};
pub use sparkline::{
    assemble_trend, build_sparkline, sample_trend_dates, Sparkline, SparklinePoint, TrendPoint,
    SPARKLINE_HEIGHT, SPARKLINE_WIDTH, TREND_DAYS,
};
pub use view::{
    derive_view, BarView, CalendarControls, DashboardView, DatePill, FilterButton, HeroView,
    MetricView, RankEntry, SelectOption, StockRowView, TableView, ViewStatus,
    EMPTY_FILTER_MESSAGE, LOADING_MESSAGE, NO_DATA_MESSAGE,
};
