use crate::errors::{AppError, AppResult};
use crate::models::ProjectRecord;
use serde_json::Value;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Where the project collection comes from.
pub trait ProjectSource {
    fn fetch(&self) -> impl Future<Output = AppResult<Vec<ProjectRecord>>> + Send;
}

/// Reads a JSON array of project records from disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProjectSource for JsonFileSource {
    async fn fetch(&self) -> AppResult<Vec<ProjectRecord>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|error| AppError::Load(format!("{}: {}", self.path.display(), error)))?;
        parse_projects(&raw)
    }
}

/// Entries that do not deserialize are skipped; only a document that is not
/// a JSON array fails.
pub fn parse_projects(raw: &str) -> AppResult<Vec<ProjectRecord>> {
    let document: Value = serde_json::from_str(raw).map_err(|error| AppError::Load(error.to_string()))?;
    let Value::Array(entries) = document else {
        return Err(AppError::Load("expected a JSON array of projects".to_string()));
    };

    let mut projects = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<ProjectRecord>(entry) {
            Ok(project) => projects.push(project),
            Err(error) => {
                tracing::warn!(index, error = %error, "skipping malformed project entry");
            }
        }
    }
    Ok(projects)
}

/// Never fails: a broken source is logged and yields an empty collection.
pub async fn load_or_empty<S: ProjectSource>(source: &S) -> Vec<ProjectRecord> {
    match source.fetch().await {
        Ok(projects) => projects,
        Err(error) => {
            tracing::error!(error = %error, "failed to load projects, continuing with an empty collection");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{load_or_empty, parse_projects, JsonFileSource, ProjectSource};
    use crate::errors::AppError;

    #[test]
    fn skips_malformed_entries() {
        let raw = r#"[
            {"id": 1, "nombre": "Uno", "estado": "completed", "fechaActualizacion": "2025-01-01"},
            {"nombre": "sin id"},
            "not an object",
            {"id": 2, "name": "Two", "status": "paused", "lastUpdated": "2025-01-02"}
        ]"#;
        let projects = parse_projects(raw).expect("parse");
        let ids: Vec<u64> = projects.iter().map(|project| project.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn rejects_non_array_document() {
        assert!(matches!(parse_projects(r#"{"id": 1}"#), Err(AppError::Load(_))));
        assert!(matches!(parse_projects("not json"), Err(AppError::Load(_))));
    }

    #[tokio::test]
    async fn reads_projects_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("projects.json");
        std::fs::write(&path, r#"[{"id": 5, "name": "Five", "status": "in-progress"}]"#).expect("write");

        let source = JsonFileSource::new(&path);
        assert_eq!(source.path(), path.as_path());
        let projects = source.fetch().await.expect("fetch");
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Five");
    }

    #[tokio::test]
    async fn missing_file_degrades_to_empty_collection() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = JsonFileSource::new(dir.path().join("absent.json"));
        assert!(matches!(source.fetch().await, Err(AppError::Load(_))));
        assert!(load_or_empty(&source).await.is_empty());
    }
}
