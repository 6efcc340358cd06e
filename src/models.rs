use serde::{Deserialize, Serialize};
use std::fmt;

/// One project as delivered by the data source.
///
/// Both the Spanish field names of the legacy feed and their English
/// equivalents are accepted. `status` and `last_updated` stay raw so that
/// unknown tokens and unparseable dates survive the load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: u64,
    #[serde(alias = "nombre", default)]
    pub name: String,
    #[serde(alias = "estado", default)]
    pub status: String,
    #[serde(alias = "fechaActualizacion", default)]
    pub last_updated: String,
    #[serde(alias = "tecnologias", default)]
    pub technologies: Vec<String>,
    #[serde(alias = "descripcion", default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    InProgress,
    Completed,
    Paused,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [Self::InProgress, Self::Completed, Self::Paused];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Paused => "paused",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "in-progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "paused" => Some(Self::Paused),
            _ => None,
        }
    }
}

/// Active status filter. Serialized as `all` or a status token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Only(ProjectStatus),
}

impl StatusFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(status) => status.as_str(),
        }
    }

    /// Unknown tokens resolve to `All`.
    pub fn from_token(value: &str) -> Self {
        ProjectStatus::parse(value.trim()).map(Self::Only).unwrap_or(Self::All)
    }

    pub fn matches(self, record: &ProjectRecord) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => record.status == status.as_str(),
        }
    }
}

impl From<String> for StatusFilter {
    fn from(value: String) -> Self {
        Self::from_token(&value)
    }
}

impl From<StatusFilter> for String {
    fn from(value: StatusFilter) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    UpdatedDesc,
    NameAsc,
    StatusAsc,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UpdatedDesc => "updated-desc",
            Self::NameAsc => "name-asc",
            Self::StatusAsc => "status-asc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    pub filter: StatusFilter,
    pub search_text: String,
    pub sort_key: SortKey,
    pub page: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            filter: StatusFilter::All,
            search_text: String::new(),
            sort_key: SortKey::UpdatedDesc,
            page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleResult {
    pub items: Vec<ProjectRecord>,
    pub total_count: usize,
    pub total_pages: usize,
    pub page: usize,
}

impl Default for VisibleResult {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            total_pages: 0,
            page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub filter: StatusFilter,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCard {
    pub id: u64,
    pub name: String,
    pub status_label: Option<String>,
    pub status_style: Option<String>,
    pub formatted_date: String,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageButton {
    pub number: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationView {
    pub current_page: usize,
    pub total_pages: usize,
    pub previous_disabled: bool,
    pub next_disabled: bool,
    pub pages: Vec<PageButton>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub filter: StatusFilter,
    pub search_text: String,
    pub sort_key: SortKey,
    pub total_count: usize,
    pub status_counts: Vec<StatusCount>,
    pub cards: Vec<ProjectCard>,
    pub pagination: PaginationView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetailView {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub status_label: Option<String>,
    pub status_style: Option<String>,
    pub last_updated: String,
    pub formatted_date: String,
    pub technologies: Vec<String>,
    pub description: String,
}

/// User intents raised by the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DashboardIntent {
    FilterSelected { filter: StatusFilter },
    SearchChanged { text: String },
    SortChanged { key: SortKey },
    PageSelected { page: usize },
    CardSelected { id: u64 },
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum DashboardEvent {
    ViewUpdated(DashboardView),
    DetailOpened(ProjectDetailView),
}

#[cfg(test)]
mod tests {
    use super::{DashboardIntent, ProjectRecord, ProjectStatus, SortKey, StatusFilter};

    #[test]
    fn record_accepts_spanish_field_names() {
        let raw = r#"{
            "id": 3,
            "nombre": "App de Gestión",
            "estado": "paused",
            "fechaActualizacion": "2025-02-10",
            "tecnologias": ["Flutter", "Firebase"],
            "descripcion": "Gestión de inventario"
        }"#;
        let record: ProjectRecord = serde_json::from_str(raw).expect("parse record");
        assert_eq!(record.name, "App de Gestión");
        assert_eq!(record.status, "paused");
        assert_eq!(record.last_updated, "2025-02-10");
        assert_eq!(record.technologies, vec!["Flutter", "Firebase"]);
    }

    #[test]
    fn record_defaults_missing_optional_fields() {
        let record: ProjectRecord =
            serde_json::from_str(r#"{"id": 1, "name": "Solo", "status": "archived"}"#).expect("parse record");
        assert!(record.technologies.is_empty());
        assert!(record.description.is_empty());
        assert!(record.last_updated.is_empty());
        assert_eq!(record.status, "archived");
    }

    #[test]
    fn status_filter_tokens_round_trip_and_unknown_is_all() {
        assert_eq!(StatusFilter::from_token("paused"), StatusFilter::Only(ProjectStatus::Paused));
        assert_eq!(StatusFilter::from_token("all"), StatusFilter::All);
        assert_eq!(StatusFilter::from_token("bogus"), StatusFilter::All);
        assert_eq!(
            serde_json::to_string(&StatusFilter::Only(ProjectStatus::InProgress)).expect("serialize"),
            "\"in-progress\""
        );
    }

    #[test]
    fn intents_use_tagged_json() {
        let intent: DashboardIntent =
            serde_json::from_str(r#"{"type":"sortChanged","key":"name-asc"}"#).expect("parse intent");
        assert_eq!(intent, DashboardIntent::SortChanged { key: SortKey::NameAsc });

        let intent: DashboardIntent =
            serde_json::from_str(r#"{"type":"filterSelected","filter":"completed"}"#).expect("parse intent");
        assert_eq!(
            intent,
            DashboardIntent::FilterSelected {
                filter: StatusFilter::Only(ProjectStatus::Completed)
            }
        );
    }
}
