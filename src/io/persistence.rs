use std::io;
use std::path::PathBuf;

use serde_json::Value;

use crate::io::kv_store::{KeyValueStore, StorageError};
use crate::model::{Editor, EditorPreference, Project};

pub const PROJECTS_KEY: &str = "SavedProjects";
pub const SELECTED_EDITOR_KEY: &str = "SelectedEditor";
pub const CUSTOM_COMMAND_KEY: &str = "CustomEditorCommand";

/// Why a project snapshot could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Nothing has been saved yet (first run)
    #[error("no saved projects")]
    NotFound,
    #[error("saved projects are unreadable: {0}")]
    Corrupt(String),
}

/// Everything that is persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub projects: Vec<Project>,
    pub preference: EditorPreference,
}

/// Load/save of the project list and editor preference. No business logic.
pub struct Persistence {
    store: Box<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Persistence {
            store: Box::new(store),
        }
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Load projects and preference together.
    pub fn load(&self) -> Result<Snapshot, LoadError> {
        let projects = self.load_projects()?;
        Ok(Snapshot {
            projects,
            preference: self.load_preference(),
        })
    }

    pub fn load_projects(&self) -> Result<Vec<Project>, LoadError> {
        let value = self
            .store
            .get(PROJECTS_KEY)
            .map_err(|e| LoadError::Corrupt(e.to_string()))?
            .ok_or(LoadError::NotFound)?;
        decode_projects(value).map_err(|e| LoadError::Corrupt(e.to_string()))
    }

    /// Absent, unknown, or unreadable entries fall back to the defaults.
    pub fn load_preference(&self) -> EditorPreference {
        let selected = match self.store.get(SELECTED_EDITOR_KEY) {
            Ok(Some(Value::String(tag))) => Editor::parse_tag(&tag).unwrap_or_default(),
            _ => Editor::default(),
        };
        let custom_command = match self.store.get(CUSTOM_COMMAND_KEY) {
            Ok(Some(Value::String(cmd))) => cmd,
            _ => String::new(),
        };
        EditorPreference {
            selected,
            custom_command,
        }
    }

    /// Write every key.
    pub fn save(&mut self, projects: &[Project], preference: &EditorPreference) -> Result<(), StorageError> {
        self.save_projects(projects)?;
        self.save_selected_editor(preference.selected)?;
        self.save_custom_command(&preference.custom_command)
    }

    pub fn save_projects(&mut self, projects: &[Project]) -> Result<(), StorageError> {
        let value = encode_projects(projects)?;
        self.store.set(PROJECTS_KEY, value)
    }

    pub fn save_selected_editor(&mut self, editor: Editor) -> Result<(), StorageError> {
        self.store
            .set(SELECTED_EDITOR_KEY, Value::String(editor.tag().to_string()))
    }

    pub fn save_custom_command(&mut self, command: &str) -> Result<(), StorageError> {
        self.store
            .set(CUSTOM_COMMAND_KEY, Value::String(command.to_string()))
    }

    /// Copy an unreadable backing document aside.
    pub fn backup(&self) -> io::Result<Option<PathBuf>> {
        self.store.backup()
    }
}

pub fn encode_projects(projects: &[Project]) -> Result<Value, serde_json::Error> {
    serde_json::to_value(projects)
}

/// Decode a project list. Also accepts the list encoded as a JSON string,
/// the way an opaque data blob is stored.
pub fn decode_projects(value: Value) -> Result<Vec<Project>, serde_json::Error> {
    match value {
        Value::String(text) => serde_json::from_str(&text),
        other => serde_json::from_value(other),
    }
}
