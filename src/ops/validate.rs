use crate::model::{Project, Repository, folder_name};

/// A user-facing rejection of form input. Front ends check input before
/// calling a store mutator; the store itself never rejects anything.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Project name cannot be empty")]
    EmptyProjectName,
    #[error("A project with this name already exists")]
    DuplicateProjectName,
    #[error("Repository name cannot be empty")]
    EmptyRepositoryName,
    #[error("Please select a folder path")]
    MissingPath,
    #[error("A repository with this name already exists in this project")]
    DuplicateRepositoryName,
    #[error("This folder path is already added to this project")]
    DuplicatePath,
}

/// Build a new, empty project after checking the name against `existing`.
pub fn new_project(name: &str, existing: &[Project]) -> Result<Project, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyProjectName);
    }
    if existing.iter().any(|p| p.name == name) {
        return Err(ValidationError::DuplicateProjectName);
    }
    Ok(Project::new(name))
}

/// Rename a project. Duplicate names are allowed here; only creation
/// checks them.
pub fn renamed_project(project: &Project, name: &str) -> Result<Project, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyProjectName);
    }
    let mut renamed = project.clone();
    renamed.name = name.to_string();
    Ok(renamed)
}

/// Build a repository for `project`. A missing name falls back to the
/// folder name.
pub fn new_repository(
    project: &Project,
    name: Option<&str>,
    description: &str,
    path: &str,
) -> Result<Repository, ValidationError> {
    let (name, path) = check_repository_fields(project, None, name, path)?;
    Ok(Repository::new(name, description, path))
}

/// Apply edits to `original`, keeping its id. Checks ignore `original` itself.
pub fn edited_repository(
    project: &Project,
    original: &Repository,
    name: &str,
    description: &str,
    path: &str,
) -> Result<Repository, ValidationError> {
    let (name, path) = check_repository_fields(project, Some(original), Some(name), path)?;
    Ok(Repository {
        id: original.id,
        name,
        description: description.to_string(),
        path,
    })
}

fn check_repository_fields(
    project: &Project,
    editing: Option<&Repository>,
    name: Option<&str>,
    path: &str,
) -> Result<(String, String), ValidationError> {
    let name = match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        Some(_) => return Err(ValidationError::EmptyRepositoryName),
        None if path.is_empty() => return Err(ValidationError::MissingPath),
        None => folder_name(path).ok_or(ValidationError::EmptyRepositoryName)?,
    };
    if path.is_empty() {
        return Err(ValidationError::MissingPath);
    }

    let others = move || {
        project
            .repositories
            .iter()
            .filter(move |r| editing.is_none_or(|e| e.id != r.id))
    };
    if others().any(|r| r.name == name) {
        return Err(ValidationError::DuplicateRepositoryName);
    }
    if others().any(|r| r.path == path) {
        return Err(ValidationError::DuplicatePath);
    }
    Ok((name, path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_with(repos: &[(&str, &str)]) -> Project {
        Project::new("Web").with_repositories(
            repos
                .iter()
                .map(|(name, path)| Repository::new(*name, "", *path))
                .collect(),
        )
    }

    #[test]
    fn project_name_is_trimmed_and_required() {
        assert_eq!(new_project("  Tools ", &[]).unwrap().name, "Tools");
        assert_eq!(new_project("   ", &[]), Err(ValidationError::EmptyProjectName));
    }

    #[test]
    fn duplicate_project_name_rejected_at_creation() {
        let existing = vec![Project::new("X")];
        assert_eq!(
            new_project("X", &existing),
            Err(ValidationError::DuplicateProjectName)
        );
        // Case-sensitive
        assert!(new_project("x", &existing).is_ok());
    }

    #[test]
    fn rename_allows_duplicates() {
        let a = Project::new("A");
        let renamed = renamed_project(&a, "B ").unwrap();
        assert_eq!(renamed.id, a.id);
        assert_eq!(renamed.name, "B");
        assert_eq!(renamed_project(&a, ""), Err(ValidationError::EmptyProjectName));
    }

    #[test]
    fn repository_requires_name_and_path() {
        let project = project_with(&[]);
        assert_eq!(
            new_repository(&project, Some("api"), "", ""),
            Err(ValidationError::MissingPath)
        );
        assert_eq!(
            new_repository(&project, Some("  "), "", "/srv/api"),
            Err(ValidationError::EmptyRepositoryName)
        );
    }

    #[test]
    fn empty_name_reported_before_missing_path() {
        let project = project_with(&[]);
        assert_eq!(
            new_repository(&project, Some("  "), "", ""),
            Err(ValidationError::EmptyRepositoryName)
        );
        assert_eq!(
            new_repository(&project, None, "", ""),
            Err(ValidationError::MissingPath)
        );
    }

    #[test]
    fn duplicate_name_wins_over_earlier_duplicate_path() {
        let project = project_with(&[("one", "/srv/shared"), ("api", "/srv/api")]);
        assert_eq!(
            new_repository(&project, Some("api"), "", "/srv/shared"),
            Err(ValidationError::DuplicateRepositoryName)
        );
        let one = &project.repositories[0];
        assert_eq!(
            edited_repository(&project, one, "api", "", "/srv/api"),
            Err(ValidationError::DuplicateRepositoryName)
        );
    }

    #[test]
    fn repository_name_defaults_to_folder() {
        let project = project_with(&[]);
        let repo = new_repository(&project, None, "desc", "/srv/api").unwrap();
        assert_eq!(repo.name, "api");
        assert_eq!(repo.description, "desc");
        assert_eq!(repo.path, "/srv/api");
    }

    #[test]
    fn repository_dedup_is_project_scoped() {
        let web = project_with(&[("Frontend", "/a/frontend")]);
        let mobile = project_with(&[("Frontend", "/b/frontend")]);
        // Another project's name and path do not count
        assert!(new_repository(&mobile, Some("Backend"), "", "/a/frontend").is_ok());
        assert!(new_repository(&project_with(&[]), Some("Frontend"), "", "/a/frontend").is_ok());

        assert_eq!(
            new_repository(&web, Some("Frontend"), "", "/elsewhere"),
            Err(ValidationError::DuplicateRepositoryName)
        );
        assert_eq!(
            new_repository(&web, Some("Web"), "", "/a/frontend"),
            Err(ValidationError::DuplicatePath)
        );
    }

    #[test]
    fn edit_ignores_the_repository_being_edited() {
        let project = project_with(&[("api", "/srv/api"), ("web", "/srv/web")]);
        let api = &project.repositories[0];

        let same = edited_repository(&project, api, "api", "now described", "/srv/api").unwrap();
        assert_eq!(same.id, api.id);
        assert_eq!(same.description, "now described");

        assert_eq!(
            edited_repository(&project, api, "web", "", "/srv/api"),
            Err(ValidationError::DuplicateRepositoryName)
        );
        assert_eq!(
            edited_repository(&project, api, "api", "", "/srv/web"),
            Err(ValidationError::DuplicatePath)
        );
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            ValidationError::DuplicatePath.to_string(),
            "This folder path is already added to this project"
        );
    }
}
