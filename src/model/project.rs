use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random id
            pub fn new() -> Self {
                $name(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.hyphenated())
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map($name)
            }
        }
    };
}

id_type!(
    /// Opaque identity of a project, unique within the store
    ProjectId
);
id_type!(
    /// Opaque identity of a repository, unique within its owning project
    RepositoryId
);

/// A tracked folder on disk. Identity is the id, not the name or path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: RepositoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub path: String,
}

impl Repository {
    pub fn new(name: impl Into<String>, description: impl Into<String>, path: impl Into<String>) -> Self {
        Repository {
            id: RepositoryId::new(),
            name: name.into(),
            description: description.into(),
            path: path.into(),
        }
    }

    /// Whether the path currently exists. Recomputed on every call.
    pub fn is_valid_path(&self) -> bool {
        Path::new(&self.path).exists()
    }

    /// Match by exact name or by id string
    pub fn matches(&self, key: &str) -> bool {
        self.name == key || self.id.to_string().eq_ignore_ascii_case(key)
    }
}

/// A named, ordered group of repositories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Project {
            id: ProjectId::new(),
            name: name.into(),
            repositories: Vec::new(),
        }
    }

    pub fn with_repositories(mut self, repositories: Vec<Repository>) -> Self {
        self.repositories = repositories;
        self
    }

    /// Match by exact name or by id string
    pub fn matches(&self, key: &str) -> bool {
        self.name == key || self.id.to_string().eq_ignore_ascii_case(key)
    }

    pub fn repository(&self, id: RepositoryId) -> Option<&Repository> {
        self.repositories.iter().find(|r| r.id == id)
    }

    /// Find a repository by name or id string
    pub fn find_repository(&self, key: &str) -> Option<&Repository> {
        self.repositories.iter().find(|r| r.matches(key))
    }

    /// Replace the repository with the same id in place.
    /// Returns false if no repository has that id.
    pub fn replace_repository(&mut self, repository: Repository) -> bool {
        match self.repositories.iter_mut().find(|r| r.id == repository.id) {
            Some(slot) => {
                *slot = repository;
                true
            }
            None => false,
        }
    }

    /// The first-run seed: one project holding two placeholder repositories.
    pub fn sample() -> Self {
        Project::new("Sample Project").with_repositories(vec![
            Repository::new(
                "Frontend",
                "React frontend application",
                "/Users/sample/projects/frontend",
            ),
            Repository::new("Backend", "Node.js API server", "/Users/sample/projects/backend"),
        ])
    }
}

/// Last path component of a folder, used as the default repository name.
pub fn folder_name(path: &str) -> Option<String> {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sample_has_two_repositories() {
        let sample = Project::sample();
        assert_eq!(sample.name, "Sample Project");
        let names: Vec<&str> = sample.repositories.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Frontend", "Backend"]);
        assert_ne!(sample.repositories[0].id, sample.repositories[1].id);
    }

    #[test]
    fn valid_path_tracks_the_filesystem() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("repo");
        let repo = Repository::new("repo", "", dir.to_string_lossy());
        assert!(!repo.is_valid_path());

        std::fs::create_dir(&dir).unwrap();
        assert!(repo.is_valid_path());

        std::fs::remove_dir(&dir).unwrap();
        assert!(!repo.is_valid_path());
    }

    #[test]
    fn matches_by_name_or_id() {
        let project = Project::sample();
        let id = project.id.to_string();
        assert!(project.matches("Sample Project"));
        assert!(project.matches(&id));
        assert!(project.matches(&id.to_uppercase()));
        assert!(!project.matches("sample project"));
    }

    #[test]
    fn replace_repository_keeps_position() {
        let mut project = Project::sample();
        let mut edited = project.repositories[0].clone();
        edited.name = "Web".into();
        assert!(project.replace_repository(edited.clone()));
        assert_eq!(project.repositories[0], edited);
        assert_eq!(project.repositories[1].name, "Backend");

        assert!(!project.replace_repository(Repository::new("x", "", "/x")));
        assert_eq!(project.repositories.len(), 2);
    }

    #[test]
    fn missing_description_defaults_to_empty() {
        let json = r#"{"id":"6F9619FF-8B86-D011-B42D-00CF4FC964FF","name":"api","path":"/srv/api"}"#;
        let repo: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.description, "");
        assert_eq!(repo.id.to_string(), "6f9619ff-8b86-d011-b42d-00cf4fc964ff");
    }

    #[test]
    fn folder_name_uses_last_component() {
        assert_eq!(folder_name("/home/me/code/api"), Some("api".into()));
        assert_eq!(folder_name("/home/me/code/api/"), Some("api".into()));
        assert_eq!(folder_name("/"), None);
    }
}
