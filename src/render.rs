use crate::models::{
    DashboardView, PageButton, PaginationView, ProjectCard, ProjectDetailView, ProjectRecord, QueryState, StatusCount,
    VisibleResult,
};

pub fn render_dashboard(state: &QueryState, result: &VisibleResult, status_counts: Vec<StatusCount>) -> DashboardView {
    DashboardView {
        filter: state.filter,
        search_text: state.search_text.clone(),
        sort_key: state.sort_key,
        total_count: result.total_count,
        status_counts,
        cards: result.items.iter().map(render_card).collect(),
        pagination: render_pagination(result),
    }
}

pub fn render_card(project: &ProjectRecord) -> ProjectCard {
    ProjectCard {
        id: project.id,
        name: project.name.clone(),
        status_label: project.status_label().map(ToString::to_string),
        status_style: project.status_style_key().map(ToString::to_string),
        formatted_date: project.formatted_date().unwrap_or_default(),
        technologies: project.technologies.clone(),
    }
}

/// Previous/next are disabled at the range edges, and on both sides when
/// there are no pages at all.
pub fn render_pagination(result: &VisibleResult) -> PaginationView {
    let total_pages = result.total_pages;
    let current_page = result.page;
    PaginationView {
        current_page,
        total_pages,
        previous_disabled: total_pages == 0 || current_page <= 1,
        next_disabled: total_pages == 0 || current_page >= total_pages,
        pages: (1..=total_pages)
            .map(|number| PageButton {
                number,
                active: number == current_page,
            })
            .collect(),
    }
}

pub fn render_detail(project: &ProjectRecord) -> ProjectDetailView {
    ProjectDetailView {
        id: project.id,
        name: project.name.clone(),
        status: project.status.clone(),
        status_label: project.status_label().map(ToString::to_string),
        status_style: project.status_style_key().map(ToString::to_string),
        last_updated: project.last_updated.clone(),
        formatted_date: project.formatted_date().unwrap_or_default(),
        technologies: project.technologies.clone(),
        description: project.description.clone(),
    }
}
