//! Trend series sampling and sparkline geometry.

use serde::{Deserialize, Serialize};

use crate::models::IndexManifest;

pub const TREND_DAYS: usize = 12;
pub const SPARKLINE_WIDTH: f64 = 320.0;
pub const SPARKLINE_HEIGHT: f64 = 72.0;
const SPARKLINE_PAD: f64 = 6.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SparklinePoint {
    pub date: String,
    pub total_count: u64,
    pub x: f64,
    pub y: f64,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sparkline {
    pub width: f64,
    pub height: f64,
    pub points: Vec<SparklinePoint>,
    /// SVG path through all points; empty when there are none.
    pub path: String,
}

impl Sparkline {
    pub fn highlighted(&self) -> Option<&SparklinePoint> {
        self.points.iter().find(|point| point.highlighted)
    }
}

/// Most recent `limit` manifest dates, newest first (fetch order).
pub fn sample_trend_dates(manifest: &IndexManifest, limit: usize) -> Vec<String> {
    manifest.dates.iter().take(limit).cloned().collect()
}

/// Turns per-date fetch results (newest first) into a chronological series,
/// counting failed fetches as zero.
pub fn assemble_trend<E>(fetched: Vec<(String, Result<u64, E>)>) -> Vec<TrendPoint> {
    let mut series: Vec<TrendPoint> = fetched
        .into_iter()
        .map(|(date, outcome)| TrendPoint {
            date,
            total_count: outcome.unwrap_or(0),
        })
        .collect();
    series.reverse();
    series
}

pub fn build_sparkline(series: &[TrendPoint], current_date: Option<&str>) -> Sparkline {
    let inner_w = SPARKLINE_WIDTH - 2.0 * SPARKLINE_PAD;
    let inner_h = SPARKLINE_HEIGHT - 2.0 * SPARKLINE_PAD;

    let counts = series.iter().map(|point| point.total_count as f64);
    let lo = counts.clone().fold(0.0_f64, f64::min);
    let hi = counts.fold(1.0_f64, f64::max);
    let span = (hi - lo).max(1.0);

    let step = if series.len() > 1 {
        inner_w / (series.len() - 1) as f64
    } else {
        0.0
    };

    let highlight_idx = current_date
        .and_then(|date| series.iter().position(|point| point.date == date))
        .or_else(|| series.len().checked_sub(1));

    let points: Vec<SparklinePoint> = series
        .iter()
        .enumerate()
        .map(|(idx, point)| {
            let x = if series.len() > 1 {
                SPARKLINE_PAD + step * idx as f64
            } else {
                SPARKLINE_WIDTH / 2.0
            };
            let ratio = (point.total_count as f64 - lo) / span;
            let y = SPARKLINE_PAD + (1.0 - ratio) * inner_h;
            SparklinePoint {
                date: point.date.clone(),
                total_count: point.total_count,
                x,
                y,
                highlighted: Some(idx) == highlight_idx,
            }
        })
        .collect();

    let path = points
        .iter()
        .enumerate()
        .map(|(idx, point)| {
            let cmd = if idx == 0 { 'M' } else { 'L' };
            format!("{cmd}{:.1} {:.1}", point.x, point.y)
        })
        .collect::<Vec<_>>()
        .join(" ");

    Sparkline {
        width: SPARKLINE_WIDTH,
        height: SPARKLINE_HEIGHT,
        points,
        path,
    }
}
