use chrono::{DateTime, Utc};
use serde::Serialize;

/// Signed percentage with two decimals. Only strictly positive values get a `+`.
pub fn fmt_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            if v > 0.0 {
                format!("+{v:.2}%")
            } else if v == 0.0 {
                // also folds -0.0
                "0.00%".to_string()
            } else {
                format!("{v:.2}%")
            }
        }
        _ => "-".to_string(),
    }
}

pub fn fmt_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `2025-03-04T08:00:00+00:00` → `2025-03-04 08:00 UTC`; unparseable input is shown as-is.
pub fn fmt_generated_at(raw: Option<&str>) -> String {
    match raw {
        Some(text) => DateTime::parse_from_rfc3339(text)
            .map(|ts| {
                ts.with_timezone(&Utc)
                    .format("%Y-%m-%d %H:%M UTC")
                    .to_string()
            })
            .unwrap_or_else(|_| text.to_string()),
        None => "-".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTone {
    Up,
    Down,
    Flat,
}

impl ChangeTone {
    pub fn of(value: Option<f64>) -> Self {
        match value {
            Some(v) if v > 0.0 => Self::Up,
            Some(v) if v < 0.0 => Self::Down,
            _ => Self::Flat,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Up => "tone-up",
            Self::Down => "tone-down",
            Self::Flat => "tone-flat",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_sign_only_for_positive_values() {
        assert_eq!(fmt_percent(Some(1.5)), "+1.50%");
        assert_eq!(fmt_percent(Some(-2.0)), "-2.00%");
        assert_eq!(fmt_percent(Some(0.0)), "0.00%");
        assert_eq!(fmt_percent(Some(-0.0)), "0.00%");
        assert_eq!(fmt_percent(None), "-");
        assert_eq!(fmt_percent(Some(f64::NAN)), "-");
    }

    #[test]
    fn percent_rounds_to_two_decimals() {
        assert_eq!(fmt_percent(Some(9.996)), "+10.00%");
        assert_eq!(fmt_percent(Some(-10.014)), "-10.01%");
    }

    #[test]
    fn counts_get_thousands_separators() {
        assert_eq!(fmt_count(0), "0");
        assert_eq!(fmt_count(999), "999");
        assert_eq!(fmt_count(1_000), "1,000");
        assert_eq!(fmt_count(1_234_567), "1,234,567");
    }

    #[test]
    fn generated_at_is_normalised_to_utc() {
        assert_eq!(
            fmt_generated_at(Some("2025-03-04T16:30:00+08:00")),
            "2025-03-04 08:30 UTC"
        );
        assert_eq!(fmt_generated_at(Some("yesterday")), "yesterday");
        assert_eq!(fmt_generated_at(None), "-");
    }

    #[test]
    fn tone_follows_sign() {
        assert_eq!(ChangeTone::of(Some(0.1)), ChangeTone::Up);
        assert_eq!(ChangeTone::of(Some(-0.1)), ChangeTone::Down);
        assert_eq!(ChangeTone::of(Some(0.0)), ChangeTone::Flat);
        assert_eq!(ChangeTone::of(None), ChangeTone::Flat);
    }
}
