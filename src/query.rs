use crate::db::{PreferenceStore, STATUS_FILTER_KEY};
use crate::errors::{AppError, AppResult};
use crate::models::{ProjectRecord, ProjectStatus, QueryState, SortKey, StatusCount, StatusFilter, VisibleResult};
use icu_collator::options::CollatorOptions;
use icu_collator::{Collator, CollatorBorrowed};
use icu_locale_core::locale;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

static NAME_COLLATOR: OnceLock<Option<CollatorBorrowed<'static>>> = OnceLock::new();

pub const PAGE_SIZE: usize = 10;

/// Owns the loaded collection and the transient query state, and derives the
/// visible page from them.
pub struct ProjectQueryEngine {
    projects: Vec<ProjectRecord>,
    state: QueryState,
    last: VisibleResult,
    preferences: Arc<dyn PreferenceStore>,
}

impl ProjectQueryEngine {
    /// Starts with an empty collection. The status filter is restored from the
    /// preference store; everything else takes its default.
    pub fn new(preferences: Arc<dyn PreferenceStore>) -> Self {
        let filter = restore_filter(preferences.as_ref());
        let mut engine = Self {
            projects: Vec::new(),
            state: QueryState {
                filter,
                ..QueryState::default()
            },
            last: VisibleResult::default(),
            preferences,
        };
        engine.refresh();
        engine
    }

    pub fn with_projects(preferences: Arc<dyn PreferenceStore>, projects: Vec<ProjectRecord>) -> Self {
        let mut engine = Self::new(preferences);
        engine.replace_collection(projects);
        engine
    }

    pub fn replace_collection(&mut self, projects: Vec<ProjectRecord>) -> &VisibleResult {
        for project_id in duplicate_ids(&projects) {
            tracing::warn!(project_id, "duplicate project id in collection");
        }
        tracing::info!(count = projects.len(), "project collection installed");
        self.projects = projects;
        self.refresh()
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn visible(&self) -> &VisibleResult {
        &self.last
    }

    pub fn set_filter(&mut self, filter: StatusFilter) -> &VisibleResult {
        self.state.filter = filter;
        if let Err(error) = self.preferences.set_preference(STATUS_FILTER_KEY, filter.as_str()) {
            tracing::warn!(error = %error, filter = %filter, "failed to persist status filter");
        }
        self.state.page = 1;
        self.refresh()
    }

    /// Stored verbatim; case folding happens at query time. The page is kept,
    /// and the next recompute clamps it into range.
    pub fn set_search_text(&mut self, text: impl Into<String>) -> &VisibleResult {
        self.state.search_text = text.into();
        self.refresh()
    }

    pub fn set_sort_key(&mut self, key: SortKey) -> &VisibleResult {
        self.state.sort_key = key;
        self.refresh()
    }

    /// Applies `page` only when it is valid for the current result. Returns
    /// whether the page changed.
    pub fn set_page(&mut self, page: usize) -> bool {
        if page == 0 || page > self.last.total_pages {
            tracing::debug!(page, total_pages = self.last.total_pages, "ignoring out-of-range page");
            return false;
        }
        self.state.page = page;
        self.refresh();
        true
    }

    pub fn recompute(&self) -> VisibleResult {
        run_query(&self.projects, &self.state)
    }

    /// First record carrying `id`.
    pub fn find_project(&self, id: u64) -> AppResult<&ProjectRecord> {
        self.projects
            .iter()
            .find(|project| project.id == id)
            .ok_or_else(|| AppError::NotFound(format!("No project with id {}", id)))
    }

    /// Size of the collection under each filter, ignoring search text.
    pub fn status_counts(&self) -> Vec<StatusCount> {
        let mut counts = vec![StatusCount {
            filter: StatusFilter::All,
            count: self.projects.len(),
        }];
        for status in ProjectStatus::ALL {
            let filter = StatusFilter::Only(status);
            counts.push(StatusCount {
                filter,
                count: self.projects.iter().filter(|project| filter.matches(project)).count(),
            });
        }
        counts
    }

    fn refresh(&mut self) -> &VisibleResult {
        let result = self.recompute();
        tracing::debug!(
            filter = %self.state.filter,
            search = %self.state.search_text,
            sort = self.state.sort_key.as_str(),
            page = result.page,
            total_count = result.total_count,
            total_pages = result.total_pages,
            "recomputed visible projects"
        );
        self.state.page = result.page;
        self.last = result;
        &self.last
    }
}

fn restore_filter(preferences: &dyn PreferenceStore) -> StatusFilter {
    match preferences.get_preference(STATUS_FILTER_KEY) {
        Ok(Some(token)) => StatusFilter::from_token(&token),
        Ok(None) => StatusFilter::All,
        Err(error) => {
            tracing::warn!(error = %error, "failed to read persisted status filter");
            StatusFilter::All
        }
    }
}

/// Filter, search, sort and paginate, in that order.
pub fn run_query(projects: &[ProjectRecord], state: &QueryState) -> VisibleResult {
    let filtered = filter_projects(projects, state.filter);
    let mut matching = search_projects(filtered, &state.search_text);
    sort_projects(&mut matching, state.sort_key);
    paginate(matching, state.page)
}

/// Ids that appear more than once, each reported once, in first-seen order.
pub fn duplicate_ids(projects: &[ProjectRecord]) -> Vec<u64> {
    let mut seen = HashSet::with_capacity(projects.len());
    let mut reported = HashSet::new();
    projects
        .iter()
        .filter(|project| !seen.insert(project.id) && reported.insert(project.id))
        .map(|project| project.id)
        .collect()
}

pub fn filter_projects(projects: &[ProjectRecord], filter: StatusFilter) -> Vec<ProjectRecord> {
    projects
        .iter()
        .filter(|project| filter.matches(project))
        .cloned()
        .collect()
}

pub fn search_projects(mut projects: Vec<ProjectRecord>, text: &str) -> Vec<ProjectRecord> {
    let needle = text.to_lowercase();
    if !needle.is_empty() {
        projects.retain(|project| project.matches_search(&needle));
    }
    projects
}

/// Stable sort; equal keys keep their relative order.
pub fn sort_projects(projects: &mut [ProjectRecord], key: SortKey) {
    match key {
        SortKey::UpdatedDesc => projects.sort_by(|a, b| b.updated_on().cmp(&a.updated_on())),
        SortKey::NameAsc => match name_collator() {
            Some(collator) => projects.sort_by(|a, b| collator.compare(&a.name, &b.name)),
            None => projects.sort_by(|a, b| fallback_name_order(&a.name, &b.name)),
        },
        SortKey::StatusAsc => projects.sort_by(|a, b| a.status.cmp(&b.status)),
    }
}

/// Slices out `page` (clamped into `[1, total_pages]`). An empty input has
/// zero pages and an empty page 1.
pub fn paginate(items: Vec<ProjectRecord>, page: usize) -> VisibleResult {
    let total_count = items.len();
    let total_pages = total_count.div_ceil(PAGE_SIZE);
    let page = if total_pages == 0 { 1 } else { page.clamp(1, total_pages) };
    let offset = (page - 1) * PAGE_SIZE;

    let items: Vec<ProjectRecord> = items.into_iter().skip(offset).take(PAGE_SIZE).collect();

    VisibleResult {
        items,
        total_count,
        total_pages,
        page,
    }
}

/// Built on first use; a construction failure is logged once.
fn name_collator() -> Option<&'static CollatorBorrowed<'static>> {
    NAME_COLLATOR
        .get_or_init(|| match Collator::try_new(locale!("es").into(), CollatorOptions::default()) {
            Ok(collator) => Some(collator),
            Err(error) => {
                tracing::warn!(error = %error, "collator unavailable, falling back to case-folded name order");
                None
            }
        })
        .as_ref()
}

fn fallback_name_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}
