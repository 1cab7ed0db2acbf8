//! Project persistence.
//!
//! All projects live in a single JSON document (the web client keeps the
//! same document in local storage under `wordflow_data`). The store holds it
//! in memory and writes it back after every change.
//!
//! Loading is lenient per project: one malformed entry is dropped with a
//! warning instead of discarding the whole document. Whenever the file on
//! disk could not be taken over intact, it is copied to `<file>.bak` before
//! the first write replaces it.

use crate::model::{FlowGraph, Project};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name used when the store lives on disk.
pub const DEFAULT_FILE_NAME: &str = "wordflow_data.json";

/// Suffix for exported project files.
pub const EXPORT_EXTENSION: &str = ".wordflow.json";

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while loading or saving projects.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Imported data lacks a required field.
    #[error("invalid project data: missing `{0}`")]
    InvalidProject(&'static str),

    #[error("project not found: {0}")]
    NotFound(String),
}

// ─── Stored document ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    pub show_mini_map: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            show_mini_map: true,
        }
    }
}

/// The whole persisted document. Missing fields fall back to the defaults,
/// so an empty object still yields the sample project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreData {
    pub projects: Vec<Project>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_project_id: Option<String>,
    pub settings: Settings,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            projects: vec![Project::sample()],
            current_project_id: None,
            settings: Settings::default(),
        }
    }
}

// ─── Store ───────────────────────────────────────────────────────────────

/// File-backed project collection.
pub struct ProjectStore {
    path: PathBuf,
    data: StoreData,
    /// The file on disk holds data that `data` does not; copy it aside
    /// before overwriting.
    backup_pending: bool,
}

impl ProjectStore {
    /// Open the store at `path`. A missing file yields the default document
    /// (with the sample project); nothing is written until the first change.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (data, backup_pending) = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Map<String, Value>>(&text) {
                Ok(doc) => load_document(doc, &path),
                Err(e) => {
                    log::error!("failed to parse {}: {e}; using defaults", path.display());
                    (StoreData::default(), true)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("no project store at {}; starting fresh", path.display());
                (StoreData::default(), false)
            }
            Err(e) => {
                log::error!("failed to read {}: {e}; using defaults", path.display());
                (StoreData::default(), true)
            }
        };
        Self {
            path,
            data,
            backup_pending,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the previous file is kept when it could not be loaded intact.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".bak");
        PathBuf::from(name)
    }

    pub fn data(&self) -> &StoreData {
        &self.data
    }

    pub fn projects(&self) -> &[Project] {
        &self.data.projects
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.data.projects.iter().find(|p| p.id == id)
    }

    /// Insert or replace `project` (matched by id), bumping `updated_at`.
    pub fn save_project(&mut self, mut project: Project) -> Result<()> {
        project.updated_at = Utc::now();
        match self.data.projects.iter_mut().find(|p| p.id == project.id) {
            Some(slot) => *slot = project,
            None => self.data.projects.push(project),
        }
        self.persist()
    }

    /// Create and save a new project with a welcome node.
    pub fn create_project(&mut self, name: &str, description: &str) -> Result<&Project> {
        let project = Project::new(generate_project_id(), name, description);
        let id = project.id.clone();
        self.save_project(project)?;
        log::info!("created project `{name}` ({id})");
        self.get(&id).ok_or(StoreError::NotFound(id))
    }

    /// Delete a project; clears the current-project pointer if it pointed
    /// at it. Returns whether anything was removed.
    pub fn delete_project(&mut self, id: &str) -> Result<bool> {
        let before = self.data.projects.len();
        self.data.projects.retain(|p| p.id != id);
        let removed = self.data.projects.len() != before;
        if self.data.current_project_id.as_deref() == Some(id) {
            self.data.current_project_id = None;
        }
        self.persist()?;
        Ok(removed)
    }

    pub fn set_current(&mut self, id: &str) -> Result<()> {
        self.data.current_project_id = Some(id.to_string());
        self.persist()
    }

    pub fn current(&self) -> Option<&Project> {
        self.data
            .current_project_id
            .as_deref()
            .and_then(|id| self.get(id))
    }

    /// Replace a project's graph.
    pub fn update_flow(&mut self, id: &str, flow: FlowGraph) -> Result<()> {
        let mut project = self
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        project.flow_data = flow.without_selection();
        self.save_project(project)
    }

    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        self.data.settings = settings;
        self.persist()
    }

    /// Pretty-printed JSON of one project.
    pub fn export_project(&self, id: &str) -> Result<String> {
        let project = self
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(serde_json::to_string_pretty(project)?)
    }

    /// Import a project from JSON. The project gets a fresh id so it never
    /// collides with an existing one; `createdAt` is kept and `updatedAt`
    /// set to now.
    pub fn import_project(&mut self, json: &str) -> Result<&Project> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        for field in ["id", "name", "flowData"] {
            let present = value
                .get(field)
                .is_some_and(|v| !v.is_null() && v.as_str() != Some(""));
            if !present {
                return Err(StoreError::InvalidProject(field));
            }
        }

        let id = generate_project_id();
        let now = serde_json::to_value(Utc::now())?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("id".to_string(), serde_json::Value::String(id.clone()));
            obj.entry("createdAt").or_insert_with(|| now.clone());
            obj.insert("updatedAt".to_string(), now);
        }

        let project: Project = serde_json::from_value(value)?;
        log::info!("imported project `{}` as {id}", project.name);
        self.save_project(project)?;
        self.get(&id).ok_or(StoreError::NotFound(id))
    }

    /// Write the document atomically (temp file + rename).
    fn persist(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        if self.backup_pending {
            let backup = self.backup_path();
            fs::copy(&self.path, &backup)?;
            log::warn!("kept previous project store as {}", backup.display());
            self.backup_pending = false;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(&self.data)?)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("saved {} projects to {}", self.data.projects.len(), self.path.display());
        Ok(())
    }
}

/// Build the document field by field so a bad project or settings block
/// only costs that entry. The flag reports whether anything was dropped.
fn load_document(mut doc: Map<String, Value>, path: &Path) -> (StoreData, bool) {
    let mut lossy = false;

    let projects = match doc.remove("projects") {
        None => vec![Project::sample()],
        Some(Value::Array(entries)) => {
            let total = entries.len();
            let projects: Vec<Project> = entries
                .into_iter()
                .enumerate()
                .filter_map(|(i, entry)| match serde_json::from_value(entry) {
                    Ok(project) => Some(project),
                    Err(e) => {
                        log::warn!("skipping project #{i} in {}: {e}", path.display());
                        None
                    }
                })
                .collect();
            lossy |= projects.len() != total;
            projects
        }
        Some(other) => {
            log::warn!("`projects` in {} is not a list: {other}", path.display());
            lossy = true;
            Vec::new()
        }
    };

    let settings = match doc.remove("settings") {
        None => Settings::default(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            log::warn!("resetting unreadable settings in {}: {e}", path.display());
            lossy = true;
            Settings::default()
        }),
    };

    let current_project_id = doc
        .get("currentProjectId")
        .and_then(Value::as_str)
        .map(str::to_string);

    let data = StoreData {
        projects,
        current_project_id,
        settings,
    };
    (data, lossy)
}

/// `project_<millis>_<9 alphanumerics>`.
pub fn generate_project_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("project_{}_{}", Utc::now().timestamp_millis(), &suffix[..9])
}

/// File name for an exported project: characters that are unsafe in file
/// names become `-`.
pub fn export_file_name(project_name: &str) -> String {
    let safe: String = project_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' => '-',
            c => c,
        })
        .collect();
    format!("{safe}{EXPORT_EXTENSION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_file_name_sanitizes() {
        assert_eq!(export_file_name("a/b:c?"), "a-b-c-.wordflow.json");
        assert_eq!(export_file_name("Plain"), "Plain.wordflow.json");
    }

    #[test]
    fn project_ids_have_expected_shape() {
        let id = generate_project_id();
        let parts: Vec<_> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "project");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn empty_document_gets_defaults() {
        let data: StoreData = serde_json::from_str("{}").unwrap();
        assert_eq!(data.projects.len(), 1);
        assert_eq!(data.projects[0].id, "sample_project_001");
        assert!(data.settings.show_mini_map);
        assert_eq!(data.settings.theme, Theme::Light);
    }
}
