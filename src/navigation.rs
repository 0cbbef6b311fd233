use serde::Serialize;

use crate::models::IndexManifest;

/// Step targets around the current date. `dates` is newest first, so "prev"
/// (older) is the next index and "next" (newer) the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NavTargets {
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl NavTargets {
    pub fn around(manifest: &IndexManifest, current: Option<&str>) -> Self {
        let Some(idx) = current.and_then(|date| manifest.position_of(date)) else {
            return Self::default();
        };

        Self {
            prev: manifest.dates.get(idx + 1).cloned(),
            next: idx
                .checked_sub(1)
                .and_then(|newer| manifest.dates.get(newer))
                .cloned(),
        }
    }

    pub fn prev_disabled(&self) -> bool {
        self.prev.is_none()
    }

    pub fn next_disabled(&self) -> bool {
        self.next.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Prev,
    Next,
}

impl StepDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prev => "prev",
            Self::Next => "next",
        }
    }
}
