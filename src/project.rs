//! Presentation facts derived from a raw [`ProjectRecord`].
//!
//! Every derivation is pure. Unknown status tokens and unparseable dates
//! produce `None` so the caller can drop the marker instead of failing.

use crate::models::{ProjectRecord, ProjectStatus};
use chrono::{DateTime, Locale, NaiveDate, TimeZone, Utc};

pub const DATE_LOCALE: Locale = Locale::es_ES;
const LONG_DATE_FORMAT: &str = "%-d de %B de %Y";

impl ProjectStatus {
    pub fn style_key(self) -> &'static str {
        match self {
            Self::InProgress => "status-progress",
            Self::Completed => "status-completed",
            Self::Paused => "status-paused",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::InProgress => "En Progreso",
            Self::Completed => "Completado",
            Self::Paused => "Pausado",
        }
    }
}

impl ProjectRecord {
    pub fn status_category(&self) -> Option<ProjectStatus> {
        ProjectStatus::parse(&self.status)
    }

    pub fn status_style_key(&self) -> Option<&'static str> {
        self.status_category().map(ProjectStatus::style_key)
    }

    pub fn status_label(&self) -> Option<&'static str> {
        self.status_category().map(ProjectStatus::label)
    }

    /// Calendar date of the last update. Accepts a plain ISO date or a full
    /// RFC 3339 timestamp.
    pub fn updated_on(&self) -> Option<NaiveDate> {
        let raw = self.last_updated.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|value| value.date_naive()))
    }

    /// Long-form date in the fixed display locale, e.g. `20 de febrero de 2025`.
    pub fn formatted_date(&self) -> Option<String> {
        let midnight = self.updated_on()?.and_hms_opt(0, 0, 0)?;
        let datetime = Utc.from_utc_datetime(&midnight);
        Some(datetime.format_localized(LONG_DATE_FORMAT, DATE_LOCALE).to_string())
    }

    pub fn matches_search(&self, needle_lowercase: &str) -> bool {
        needle_lowercase.is_empty() || self.name.to_lowercase().contains(needle_lowercase)
    }
}
