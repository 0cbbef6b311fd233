//! Session state of one dashboard and the transitions that mutate it.
//!
//! Nothing here performs IO: loads are split into [`DashboardSession::begin_day_load`]
//! and [`DashboardSession::finish_day_load`] so the caller can fetch in between
//! without holding the state. A finished load only applies when its ticket still
//! carries the latest token.
//!
//! `current_date` is the latest requested date and moves as soon as a load begins;
//! `day_data` only changes on success. A failed load moves `current_date` back to
//! the date of the record still on screen.

use crate::calendar::{year_month, CalendarIndex};
use crate::error::DashboardError;
use crate::market_filter::{is_valid_filter, ALL_MARKETS};
use crate::models::{DayRecord, IndexManifest};
use crate::navigation::{NavTargets, StepDirection};
use crate::sparkline::TrendPoint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    NoData,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayLoadTicket {
    pub token: u64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayLoadOutcome {
    Applied,
    /// Nothing to load: the target is already shown or the control is disabled.
    Unchanged,
    /// A newer load was issued while this one was in flight.
    Stale,
    Failed(DashboardError),
}

#[derive(Debug, Clone)]
pub struct DashboardSession {
    manifest: Option<IndexManifest>,
    calendar: CalendarIndex,
    current_date: Option<String>,
    market_filter: String,
    day_data: Option<DayRecord>,
    shown_date: Option<String>,
    day_error: Option<String>,
    load_token: u64,
    pending: bool,
    trend_series: Vec<TrendPoint>,
    status: SessionStatus,
}

impl Default for DashboardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardSession {
    pub fn new() -> Self {
        Self {
            manifest: None,
            calendar: CalendarIndex::default(),
            current_date: None,
            market_filter: ALL_MARKETS.to_string(),
            day_data: None,
            shown_date: None,
            day_error: None,
            load_token: 0,
            pending: false,
            trend_series: Vec::new(),
            status: SessionStatus::Loading,
        }
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn manifest(&self) -> Option<&IndexManifest> {
        self.manifest.as_ref()
    }

    pub fn calendar(&self) -> &CalendarIndex {
        &self.calendar
    }

    pub fn current_date(&self) -> Option<&str> {
        self.current_date.as_deref()
    }

    pub fn market_filter(&self) -> &str {
        &self.market_filter
    }

    pub fn day_data(&self) -> Option<&DayRecord> {
        self.day_data.as_ref()
    }

    /// Date of the record in `day_data`.
    pub fn shown_date(&self) -> Option<&str> {
        self.shown_date.as_deref()
    }

    /// True while the latest issued load has not finished.
    pub fn is_loading(&self) -> bool {
        self.pending
    }

    pub fn day_error(&self) -> Option<&str> {
        self.day_error.as_deref()
    }

    pub fn load_token(&self) -> u64 {
        self.load_token
    }

    pub fn trend_series(&self) -> &[TrendPoint] {
        &self.trend_series
    }

    /// Installs a freshly fetched manifest and returns the date that must be loaded,
    /// or `None` when the manifest lists no dates. The caller passes the date to
    /// [`Self::begin_day_load`]; `current_date` is not touched here.
    ///
    /// A previously selected date survives when it is still listed. Otherwise the
    /// first date of its year/month bucket is used, and failing that the latest date.
    /// A shown record whose date is no longer listed is dropped.
    pub fn apply_manifest(&mut self, manifest: IndexManifest) -> Option<String> {
        self.invalidate_loads();
        self.calendar = CalendarIndex::build(&manifest.dates);
        self.day_error = None;

        if manifest.is_empty() {
            self.manifest = Some(manifest);
            self.current_date = None;
            self.clear_day();
            self.trend_series.clear();
            self.status = SessionStatus::NoData;
            return None;
        }

        let unlisted = self
            .shown_date
            .as_deref()
            .is_some_and(|shown| !manifest.contains(shown));
        if unlisted {
            self.clear_day();
        }

        let reconciled = self.current_date.as_deref().and_then(|date| {
            let (year, month) = year_month(date);
            self.calendar.resolve(year, month, Some(date))
        });
        let target = reconciled
            .or_else(|| manifest.initial_date())
            .map(str::to_string);

        self.manifest = Some(manifest);
        self.status = SessionStatus::Ready;
        target
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.invalidate_loads();
        self.status = SessionStatus::Failed(message.into());
    }

    pub fn set_trend_series(&mut self, series: Vec<TrendPoint>) {
        self.trend_series = series;
    }

    /// Issues the newest token and makes `date` the current selection.
    pub fn begin_day_load(&mut self, date: impl Into<String>) -> DayLoadTicket {
        let date = date.into();
        self.load_token = self.load_token.wrapping_add(1);
        self.pending = true;
        self.current_date = Some(date.clone());
        DayLoadTicket {
            token: self.load_token,
            date,
        }
    }

    pub fn is_current(&self, ticket: &DayLoadTicket) -> bool {
        ticket.token == self.load_token
    }

    pub fn finish_day_load(
        &mut self,
        ticket: &DayLoadTicket,
        result: Result<DayRecord, DashboardError>,
    ) -> DayLoadOutcome {
        if !self.is_current(ticket) {
            return DayLoadOutcome::Stale;
        }

        self.pending = false;
        match result {
            Ok(record) => {
                self.market_filter = ALL_MARKETS.to_string();
                self.day_data = Some(record);
                self.shown_date = Some(ticket.date.clone());
                self.current_date = Some(ticket.date.clone());
                self.day_error = None;
                DayLoadOutcome::Applied
            }
            Err(err) => {
                // With nothing on screen the failed date stays selected to anchor the controls.
                if self.shown_date.is_some() {
                    self.current_date = self.shown_date.clone();
                }
                self.day_error = Some(format!("Failed to load {}: {err}", ticket.date));
                DayLoadOutcome::Failed(err)
            }
        }
    }

    fn invalidate_loads(&mut self) {
        self.load_token = self.load_token.wrapping_add(1);
        self.pending = false;
    }

    fn clear_day(&mut self) {
        self.day_data = None;
        self.shown_date = None;
        self.market_filter = ALL_MARKETS.to_string();
    }

    /// Filters the shown record. Dismisses an inline day error, since the table
    /// is re-rendered from the record the filter applies to.
    pub fn select_filter(&mut self, code: &str) -> Result<(), DashboardError> {
        let day = self
            .day_data
            .as_ref()
            .ok_or(DashboardError::NotReady("no day record loaded"))?;
        if !is_valid_filter(day, code) {
            return Err(DashboardError::UnknownMarket(code.to_string()));
        }
        self.market_filter = code.to_string();
        self.day_error = None;
        Ok(())
    }

    fn ready_manifest(&self) -> Result<&IndexManifest, DashboardError> {
        match (&self.status, &self.manifest) {
            (SessionStatus::Ready, Some(manifest)) => Ok(manifest),
            _ => Err(DashboardError::NotReady("no snapshot dates loaded")),
        }
    }

    /// `Some(date)` when `date` is listed and is not already the latest request.
    pub fn date_target(&self, date: &str) -> Result<Option<String>, DashboardError> {
        let manifest = self.ready_manifest()?;
        if !manifest.contains(date) {
            return Err(DashboardError::UnknownDate(date.to_string()));
        }
        Ok(self.changed(date))
    }

    pub fn step_target(&self, direction: StepDirection) -> Result<Option<String>, DashboardError> {
        let manifest = self.ready_manifest()?;
        let nav = NavTargets::around(manifest, self.current_date());
        Ok(match direction {
            StepDirection::Prev => nav.prev,
            StepDirection::Next => nav.next,
        })
    }

    /// Keeps the current month when `year` has it, otherwise the year's newest month.
    pub fn year_target(&self, year: &str) -> Result<Option<String>, DashboardError> {
        self.ready_manifest()?;
        let months = self.calendar.months(year);
        let current_month = self.current_date().map(|date| year_month(date).1);
        let month = current_month
            .filter(|month| months.contains(month))
            .or_else(|| months.first().copied())
            .ok_or_else(|| DashboardError::UnknownYear(year.to_string()))?;
        Ok(self
            .calendar
            .resolve(year, month, self.current_date())
            .and_then(|date| self.changed(date)))
    }

    pub fn month_target(&self, month: &str) -> Result<Option<String>, DashboardError> {
        self.ready_manifest()?;
        let year = self
            .current_date()
            .map(|date| year_month(date).0)
            .ok_or(DashboardError::NotReady("no date selected"))?;
        let date = self
            .calendar
            .resolve(year, month, self.current_date())
            .ok_or_else(|| DashboardError::UnknownMonth(month.to_string()))?;
        Ok(self.changed(date))
    }

    /// A date is skipped only when it is the latest request and that request is
    /// either still in flight or settled on screen without an error.
    fn changed(&self, date: &str) -> Option<String> {
        let settled = self.shown_date() == Some(date) && self.day_error.is_none();
        let already_requested = self.current_date() == Some(date) && (self.pending || settled);
        (!already_requested).then(|| date.to_string())
    }
}
