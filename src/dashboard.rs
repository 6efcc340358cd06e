use crate::db::PreferenceStore;
use crate::models::{DashboardEvent, DashboardIntent, DashboardView};
use crate::query::ProjectQueryEngine;
use crate::render::{render_dashboard, render_detail};
use crate::source::{load_or_empty, ProjectSource};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct Dashboard {
    engine: ProjectQueryEngine,
}

impl Dashboard {
    pub fn new(preferences: Arc<dyn PreferenceStore>) -> Self {
        Self {
            engine: ProjectQueryEngine::new(preferences),
        }
    }

    pub fn from_engine(engine: ProjectQueryEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ProjectQueryEngine {
        &self.engine
    }

    /// One-shot load. Until it resolves the collection is empty; a failed load
    /// leaves it empty.
    pub async fn load<S: ProjectSource>(&mut self, source: &S) -> DashboardView {
        let projects = load_or_empty(source).await;
        self.engine.replace_collection(projects);
        self.view()
    }

    pub fn view(&self) -> DashboardView {
        render_dashboard(self.engine.state(), self.engine.visible(), self.engine.status_counts())
    }

    /// Applies one intent. Returns `None` when nothing changed: a stale page
    /// button or a card id that no longer exists.
    pub fn handle(&mut self, intent: DashboardIntent) -> Option<DashboardEvent> {
        match intent {
            DashboardIntent::FilterSelected { filter } => {
                self.engine.set_filter(filter);
            }
            DashboardIntent::SearchChanged { text } => {
                self.engine.set_search_text(text);
            }
            DashboardIntent::SortChanged { key } => {
                self.engine.set_sort_key(key);
            }
            DashboardIntent::PageSelected { page } => {
                if !self.engine.set_page(page) {
                    return None;
                }
            }
            DashboardIntent::CardSelected { id } => {
                return match self.engine.find_project(id) {
                    Ok(project) => Some(DashboardEvent::DetailOpened(render_detail(project))),
                    Err(error) => {
                        tracing::debug!(project_id = id, error = %error, "card refers to unknown project");
                        None
                    }
                };
            }
            DashboardIntent::Refresh => {}
        }
        Some(DashboardEvent::ViewUpdated(self.view()))
    }
}

/// Consumes intents one at a time until the intent channel closes or the
/// event receiver goes away, then hands the dashboard back.
pub fn spawn_dispatcher(
    mut dashboard: Dashboard,
    mut intents: mpsc::Receiver<DashboardIntent>,
    events: mpsc::Sender<DashboardEvent>,
) -> JoinHandle<Dashboard> {
    tokio::spawn(async move {
        while let Some(intent) = intents.recv().await {
            tracing::debug!(intent = ?intent, "dispatching intent");
            let Some(event) = dashboard.handle(intent) else {
                continue;
            };
            if events.send(event).await.is_err() {
                tracing::info!("event receiver closed, stopping dispatcher");
                break;
            }
        }
        dashboard
    })
}
