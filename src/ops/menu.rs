use crate::model::{Project, ProjectId, RepositoryId};

/// Suffix shown after a repository whose folder is gone
pub const MISSING_PATH_SUFFIX: &str = "(Path not found)";

/// Placeholder row for a project with no repositories
pub const EMPTY_PROJECT_LABEL: &str = "No repositories";

/// One line of the project menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuRow {
    Project {
        id: ProjectId,
        name: String,
    },
    Repository {
        project_id: ProjectId,
        id: RepositoryId,
        name: String,
        description: String,
        path: String,
        /// False when the folder no longer exists; such rows cannot launch
        launchable: bool,
    },
    Empty,
}

impl MenuRow {
    pub fn is_launchable(&self) -> bool {
        matches!(self, MenuRow::Repository { launchable: true, .. })
    }

    /// Text shown for the row, without indentation
    pub fn label(&self) -> String {
        match self {
            MenuRow::Project { name, .. } => name.clone(),
            MenuRow::Repository {
                name, launchable, ..
            } => {
                if *launchable {
                    name.clone()
                } else {
                    format!("{} {}", name, MISSING_PATH_SUFFIX)
                }
            }
            MenuRow::Empty => EMPTY_PROJECT_LABEL.to_string(),
        }
    }
}

/// Flatten projects into menu rows, in stored order. Path validity is
/// checked here, once per build.
pub fn build_menu(projects: &[Project]) -> Vec<MenuRow> {
    let mut rows = Vec::new();
    for project in projects {
        rows.push(MenuRow::Project {
            id: project.id,
            name: project.name.clone(),
        });
        if project.repositories.is_empty() {
            rows.push(MenuRow::Empty);
            continue;
        }
        for repo in &project.repositories {
            rows.push(MenuRow::Repository {
                project_id: project.id,
                id: repo.id,
                name: repo.name.clone(),
                description: repo.description.clone(),
                path: repo.path.clone(),
                launchable: repo.is_valid_path(),
            });
        }
    }
    rows
}
