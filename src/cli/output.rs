use serde::Serialize;

use crate::model::{EditorCategory, EditorPreference, Project, Repository};
use crate::ops::editor_registry::EditorRegistry;
use crate::ops::host::Host;
use crate::ops::menu::MenuRow;
use crate::util::path::abbreviate_path;
use crate::util::unicode::{display_width, pad_to_width};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ProjectJson {
    pub id: String,
    pub name: String,
    pub repositories: Vec<RepositoryJson>,
}

#[derive(Serialize)]
pub struct RepositoryJson {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub path: String,
    pub valid_path: bool,
}

#[derive(Serialize)]
pub struct EditorJson {
    pub tag: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<&'static str>,
    pub available: bool,
    pub selected: bool,
}

#[derive(Serialize)]
pub struct EditorListJson {
    pub selected: &'static str,
    pub custom_command: String,
    pub editors: Vec<EditorJson>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn repository_to_json(repo: &Repository) -> RepositoryJson {
    RepositoryJson {
        id: repo.id.to_string(),
        name: repo.name.clone(),
        description: repo.description.clone(),
        path: repo.path.clone(),
        valid_path: repo.is_valid_path(),
    }
}

pub fn project_to_json(project: &Project) -> ProjectJson {
    ProjectJson {
        id: project.id.to_string(),
        name: project.name.clone(),
        repositories: project.repositories.iter().map(repository_to_json).collect(),
    }
}

pub fn editors_to_json(preference: &EditorPreference, host: &dyn Host) -> EditorListJson {
    let editors = EditorRegistry::all_editors()
        .iter()
        .map(|e| EditorJson {
            tag: e.editor.tag(),
            name: e.display_name,
            category: e.category.display_name(),
            command: e.command,
            available: EditorRegistry::is_available(e.editor, host),
            selected: e.editor == preference.selected,
        })
        .collect();
    EditorListJson {
        selected: preference.selected.tag(),
        custom_command: preference.custom_command.clone(),
        editors,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format the menu as indented text: projects flush left, their
/// repositories (or a placeholder) beneath.
pub fn format_menu(rows: &[MenuRow]) -> Vec<String> {
    let name_w = rows
        .iter()
        .filter(|r| matches!(r, MenuRow::Repository { .. }))
        .map(|r| display_width(&r.label()))
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    for row in rows {
        match row {
            MenuRow::Project { .. } => {
                if !lines.is_empty() {
                    lines.push(String::new());
                }
                lines.push(row.label());
            }
            MenuRow::Repository { path, .. } => {
                lines.push(format!(
                    "  {}  {}",
                    pad_to_width(&row.label(), name_w),
                    abbreviate_path(path)
                ));
            }
            MenuRow::Empty => lines.push(format!("  {}", row.label())),
        }
    }
    lines
}

/// Format the editor catalog grouped by category. `*` marks the current
/// selection, `-` an editor that is not installed; a selected editor that
/// is missing shows both.
pub fn format_editor_listing(preference: &EditorPreference, host: &dyn Host) -> Vec<String> {
    let mut lines = Vec::new();
    for category in EditorCategory::ALL {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("{}:", category.display_name()));
        for entry in EditorRegistry::editors_in(category) {
            let selected = if entry.editor == preference.selected { '*' } else { ' ' };
            let missing = if EditorRegistry::is_available(entry.editor, host) { ' ' } else { '-' };
            lines.push(format!(
                "  {}{} {:<10} {:<20} {}",
                selected,
                missing,
                entry.editor.tag(),
                entry.display_name,
                entry.description
            ));
        }
    }
    if preference.selected.is_custom() {
        lines.push(String::new());
        let command = if preference.custom_command.trim().is_empty() {
            "(not set)"
        } else {
            preference.custom_command.as_str()
        };
        lines.push(format!("custom command: {}", command));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Editor;
    use crate::ops::launcher::tests::FakeHost;
    use crate::ops::menu::build_menu;
    use insta::assert_snapshot;

    #[test]
    fn menu_text() {
        let projects = vec![
            Project::new("Web").with_repositories(vec![
                Repository::new("site", "", "/repodock/missing/site"),
                Repository::new("api", "", "/repodock/missing/api"),
            ]),
            Project::new("Empty"),
        ];
        assert_snapshot!(format_menu(&build_menu(&projects)).join("\n"), @r"
        Web
          site (Path not found)  /repodock/missing/site
          api (Path not found)   /repodock/missing/api

        Empty
          No repositories
        ");
    }

    #[test]
    fn editor_listing_marks_selection_and_missing() {
        let host = FakeHost::default().with_app("dev.zed.Zed");
        let pref = EditorPreference {
            selected: Editor::Zed,
            custom_command: String::new(),
        };
        let lines = format_editor_listing(&pref, &host);
        assert_eq!(lines[0], "Code Editors:");
        assert!(lines.iter().any(|l| l.starts_with("  *  zed ")));
        assert!(lines.iter().any(|l| l.starts_with("   - vscode ")));
        // Custom is always available
        assert!(lines.iter().any(|l| l.starts_with("     custom ")));
        assert!(!lines.iter().any(|l| l.starts_with("custom command")));
    }

    #[test]
    fn selected_but_missing_editor_shows_both_markers() {
        let host = FakeHost::default();
        let lines = format_editor_listing(&EditorPreference::default(), &host);
        assert!(lines.iter().any(|l| l.starts_with("  *- vscode ")));
    }

    #[test]
    fn custom_selection_shows_command() {
        let host = FakeHost::default();
        let pref = EditorPreference {
            selected: Editor::Custom,
            custom_command: String::new(),
        };
        let lines = format_editor_listing(&pref, &host);
        assert_eq!(lines.last().unwrap(), "custom command: (not set)");
    }

    #[test]
    fn editor_json_shape() {
        let host = FakeHost::default().with_app("com.microsoft.VSCode");
        let json = serde_json::to_value(editors_to_json(&EditorPreference::default(), &host)).unwrap();
        assert_eq!(json["selected"], "vscode");
        assert_eq!(json["editors"][0]["available"], true);
        assert_eq!(json["editors"][0]["selected"], true);
        assert_eq!(json["editors"][1]["available"], false);
        assert!(json["editors"][10].get("command").is_none());
    }

    #[test]
    fn repository_json_skips_empty_description() {
        let json = serde_json::to_value(repository_to_json(&Repository::new("a", "", "/x"))).unwrap();
        assert!(json.get("description").is_none());
        assert_eq!(json["valid_path"], false);
    }
}
