use crate::io::event_log::{EventCategory, EventEntry, EventLog};
use crate::io::persistence::{LoadError, Persistence};
use crate::model::{Editor, EditorPreference, Project, ProjectId, Repository, RepositoryId};
use crate::ops::notify::{ChangeNotifier, Subscription};

/// The single in-memory source of truth for projects and the editor
/// preference.
///
/// Every mutator updates memory, writes through to storage, then publishes a
/// change notification. Storage failures are logged, never returned: memory
/// stays authoritative for the running process. Inputs are trusted; callers
/// validate first (see [`crate::ops::validate`]).
pub struct ProjectStore {
    projects: Vec<Project>,
    preference: EditorPreference,
    persistence: Persistence,
    notifier: ChangeNotifier,
    log: EventLog,
}

impl ProjectStore {
    /// Load the persisted snapshot.
    ///
    /// - nothing saved yet: seed with [`Project::sample`] and save it
    /// - unreadable snapshot: back it up, start with no projects
    pub fn open(persistence: Persistence, log: EventLog) -> Self {
        let preference = persistence.load_preference();
        let mut store = ProjectStore {
            projects: Vec::new(),
            preference,
            persistence,
            notifier: ChangeNotifier::new(),
            log,
        };

        match store.persistence.load_projects() {
            Ok(projects) => store.projects = projects,
            Err(LoadError::NotFound) => {
                store.projects = vec![Project::sample()];
                store.persist_projects();
            }
            Err(LoadError::Corrupt(reason)) => {
                let mut entry = EventEntry::new(EventCategory::Load, "saved projects unreadable, starting empty")
                    .field("Store", store.persistence.location())
                    .body(reason);
                match store.persistence.backup() {
                    Ok(Some(bak)) => entry = entry.field("Backup", bak.display()),
                    Ok(None) => {}
                    Err(e) => entry = entry.field("Backup failed", e),
                }
                store.log.record(entry);
            }
        }
        store
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Find a project by exact name or id string
    pub fn find_project(&self, key: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.matches(key))
    }

    pub fn preference(&self) -> &EditorPreference {
        &self.preference
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn location(&self) -> String {
        self.persistence.location()
    }

    /// Observe changes. See [`ChangeNotifier`].
    pub fn subscribe(&mut self) -> Subscription {
        self.notifier.subscribe()
    }

    // -----------------------------------------------------------------------
    // Project mutators
    // -----------------------------------------------------------------------

    /// Append a project. No uniqueness check.
    pub fn add_project(&mut self, project: Project) {
        self.projects.push(project);
        self.projects_changed();
    }

    /// Replace the project with the same id, keeping its position.
    /// Does nothing if the id is unknown.
    pub fn update_project(&mut self, project: Project) {
        let Some(slot) = self.projects.iter_mut().find(|p| p.id == project.id) else {
            return;
        };
        *slot = project;
        self.projects_changed();
    }

    /// Remove every project with this id. Saves and notifies even when
    /// nothing matched.
    pub fn delete_project(&mut self, id: ProjectId) {
        self.projects.retain(|p| p.id != id);
        self.projects_changed();
    }

    // -----------------------------------------------------------------------
    // Repository mutators
    // -----------------------------------------------------------------------

    /// Append a repository to a project. Does nothing if the project is unknown.
    pub fn add_repository(&mut self, repository: Repository, project_id: ProjectId) {
        let Some(project) = self.projects.iter_mut().find(|p| p.id == project_id) else {
            return;
        };
        project.repositories.push(repository);
        self.projects_changed();
    }

    /// Remove every repository with this id from a project. Does nothing if
    /// the project is unknown.
    pub fn delete_repository(&mut self, repository_id: RepositoryId, project_id: ProjectId) {
        let Some(project) = self.projects.iter_mut().find(|p| p.id == project_id) else {
            return;
        };
        project.repositories.retain(|r| r.id != repository_id);
        self.projects_changed();
    }

    // -----------------------------------------------------------------------
    // Preference mutators
    // -----------------------------------------------------------------------

    pub fn update_selected_editor(&mut self, editor: Editor) {
        self.preference.selected = editor;
        if let Err(e) = self.persistence.save_selected_editor(editor) {
            self.log_save_failure("could not save selected editor", e);
        }
        self.notifier.publish();
    }

    pub fn update_custom_editor_command(&mut self, command: impl Into<String>) {
        self.preference.custom_command = command.into();
        if let Err(e) = self
            .persistence
            .save_custom_command(&self.preference.custom_command)
        {
            self.log_save_failure("could not save custom editor command", e);
        }
        self.notifier.publish();
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn projects_changed(&mut self) {
        self.persist_projects();
        self.notifier.publish();
    }

    fn persist_projects(&mut self) {
        if let Err(e) = self.persistence.save_projects(&self.projects) {
            self.log_save_failure("could not save projects", e);
        }
    }

    fn log_save_failure(&self, description: &str, error: impl std::fmt::Display) {
        self.log.record(
            EventEntry::new(EventCategory::Persist, description)
                .field("Store", self.persistence.location())
                .body(error.to_string()),
        );
    }
}
