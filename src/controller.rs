//! Async driver around [`DashboardSession`]: fetches outside the state lock and
//! funnels every user action through the day loader.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::DashboardError;
use crate::navigation::StepDirection;
use crate::session::{DashboardSession, DayLoadOutcome, DayLoadTicket};
use crate::source::DashboardDataSource;
use crate::sparkline::{assemble_trend, sample_trend_dates, TrendPoint, TREND_DAYS};
use crate::view::{derive_view, DashboardView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    NoData,
    Loaded(DayLoadOutcome),
}

#[derive(Clone)]
pub struct DashboardController {
    session: Arc<Mutex<DashboardSession>>,
    source: Arc<dyn DashboardDataSource>,
    trend_days: usize,
}

impl DashboardController {
    pub fn new(source: Arc<dyn DashboardDataSource>) -> Self {
        Self::with_trend_days(source, TREND_DAYS)
    }

    pub fn with_trend_days(source: Arc<dyn DashboardDataSource>, trend_days: usize) -> Self {
        Self {
            session: Arc::new(Mutex::new(DashboardSession::new())),
            source,
            trend_days,
        }
    }

    /// Fetches the manifest, the trend series and the initial day. Only a manifest
    /// failure is returned as an error; it leaves the session in the failed state.
    pub async fn initialize(&self) -> Result<InitOutcome, DashboardError> {
        let manifest = match self.source.fetch_index().await {
            Ok(manifest) => manifest,
            Err(err) => {
                error!(
                    component = "controller",
                    event = "index.load.error",
                    source = %self.source.describe(),
                    error = %err
                );
                self.session
                    .lock()
                    .await
                    .fail(format!("Failed to load dashboard index: {err}"));
                return Err(err);
            }
        };

        let date_count = manifest.dates.len();
        // The initial ticket is issued under the same lock, so any selection made
        // while the trend is fetched supersedes it.
        let (ticket, trend_dates) = {
            let mut session = self.session.lock().await;
            let trend_dates = sample_trend_dates(&manifest, self.trend_days);
            let ticket = session
                .apply_manifest(manifest)
                .map(|date| session.begin_day_load(date));
            (ticket, trend_dates)
        };

        let Some(ticket) = ticket else {
            info!(component = "controller", event = "index.load.empty");
            return Ok(InitOutcome::NoData);
        };
        info!(
            component = "controller",
            event = "index.load.finish",
            date_count,
            initial_date = %ticket.date
        );

        let (series, outcome) =
            tokio::join!(self.fetch_trend(trend_dates), self.run_day_load(ticket));
        self.session.lock().await.set_trend_series(series);

        Ok(InitOutcome::Loaded(outcome))
    }

    /// Full reinitialisation, equivalent to reloading the page.
    pub async fn reload(&self) -> Result<InitOutcome, DashboardError> {
        self.initialize().await
    }

    pub async fn load_day(&self, date: String) -> DayLoadOutcome {
        let ticket = self.session.lock().await.begin_day_load(date);
        self.run_day_load(ticket).await
    }

    async fn run_day_load(&self, ticket: DayLoadTicket) -> DayLoadOutcome {
        debug!(
            component = "controller",
            event = "day.load.start",
            date = %ticket.date,
            token = ticket.token
        );

        let result = self.source.fetch_day(&ticket.date).await;
        let outcome = self.session.lock().await.finish_day_load(&ticket, result);

        match &outcome {
            DayLoadOutcome::Applied => info!(
                component = "controller",
                event = "day.load.applied",
                date = %ticket.date,
                token = ticket.token
            ),
            DayLoadOutcome::Stale => debug!(
                component = "controller",
                event = "day.load.stale",
                date = %ticket.date,
                token = ticket.token
            ),
            DayLoadOutcome::Failed(err) => warn!(
                component = "controller",
                event = "day.load.error",
                date = %ticket.date,
                token = ticket.token,
                error = %err
            ),
            DayLoadOutcome::Unchanged => {}
        }
        outcome
    }

    pub async fn select_date(&self, date: &str) -> Result<DayLoadOutcome, DashboardError> {
        let target = self.session.lock().await.date_target(date)?;
        Ok(self.load_target(target).await)
    }

    pub async fn step(&self, direction: StepDirection) -> Result<DayLoadOutcome, DashboardError> {
        let target = self.session.lock().await.step_target(direction)?;
        if target.is_none() {
            debug!(
                component = "controller",
                event = "nav.step.disabled",
                direction = direction.as_str()
            );
        }
        Ok(self.load_target(target).await)
    }

    pub async fn select_year(&self, year: &str) -> Result<DayLoadOutcome, DashboardError> {
        let target = self.session.lock().await.year_target(year)?;
        Ok(self.load_target(target).await)
    }

    pub async fn select_month(&self, month: &str) -> Result<DayLoadOutcome, DashboardError> {
        let target = self.session.lock().await.month_target(month)?;
        Ok(self.load_target(target).await)
    }

    pub async fn select_filter(&self, code: &str) -> Result<(), DashboardError> {
        self.session.lock().await.select_filter(code)
    }

    pub async fn view(&self) -> DashboardView {
        derive_view(&*self.session.lock().await)
    }

    /// Snapshot of the session, mostly for assertions.
    pub async fn session(&self) -> DashboardSession {
        self.session.lock().await.clone()
    }

    async fn load_target(&self, target: Option<String>) -> DayLoadOutcome {
        match target {
            Some(date) => self.load_day(date).await,
            None => DayLoadOutcome::Unchanged,
        }
    }

    /// Fans out one fetch per date and joins them in input order. Failed days count as zero.
    async fn fetch_trend(&self, dates: Vec<String>) -> Vec<TrendPoint> {
        let handles: Vec<_> = dates
            .into_iter()
            .map(|date| {
                let source = Arc::clone(&self.source);
                let task_date = date.clone();
                let handle = tokio::spawn(async move {
                    source
                        .fetch_day(&task_date)
                        .await
                        .map(|day| day.summary.total_count)
                });
                (date, handle)
            })
            .collect();

        let mut fetched = Vec::with_capacity(handles.len());
        for (date, handle) in handles {
            let outcome = match handle.await {
                Ok(result) => result.map_err(|err| err.to_string()),
                Err(join_err) => Err(join_err.to_string()),
            };
            if let Err(message) = &outcome {
                warn!(
                    component = "controller",
                    event = "trend.point.degraded",
                    date = %date,
                    error = %message
                );
            }
            fetched.push((date, outcome));
        }

        assemble_trend(fetched)
    }
}
