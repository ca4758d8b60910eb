use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A known editor, or `Custom` for a user-supplied command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Editor {
    #[default]
    Vscode,
    Cursor,
    Windsurf,
    Zed,
    Sublime,
    Nova,
    Bbedit,
    Intellij,
    Webstorm,
    Pycharm,
    Xcode,
    Custom,
}

impl Editor {
    /// Every tag, in catalog order
    pub const ALL: [Editor; 12] = [
        Editor::Vscode,
        Editor::Cursor,
        Editor::Windsurf,
        Editor::Zed,
        Editor::Sublime,
        Editor::Nova,
        Editor::Bbedit,
        Editor::Intellij,
        Editor::Webstorm,
        Editor::Pycharm,
        Editor::Xcode,
        Editor::Custom,
    ];

    /// The persisted string tag
    pub fn tag(self) -> &'static str {
        match self {
            Editor::Vscode => "vscode",
            Editor::Cursor => "cursor",
            Editor::Windsurf => "windsurf",
            Editor::Zed => "zed",
            Editor::Sublime => "sublime",
            Editor::Nova => "nova",
            Editor::Bbedit => "bbedit",
            Editor::Intellij => "intellij",
            Editor::Webstorm => "webstorm",
            Editor::Pycharm => "pycharm",
            Editor::Xcode => "xcode",
            Editor::Custom => "custom",
        }
    }

    pub fn parse_tag(s: &str) -> Option<Self> {
        Editor::ALL
            .into_iter()
            .find(|e| e.tag().eq_ignore_ascii_case(s.trim()))
    }

    pub fn is_custom(self) -> bool {
        self == Editor::Custom
    }
}

impl fmt::Display for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Editor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Editor::parse_tag(s).ok_or_else(|| {
            let tags: Vec<&str> = Editor::ALL.iter().map(|e| e.tag()).collect();
            format!("unknown editor '{}' (expected one of: {})", s, tags.join(", "))
        })
    }
}

/// Grouping used when presenting the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorCategory {
    General,
    Jetbrains,
    Apple,
    Custom,
}

impl EditorCategory {
    pub const ALL: [EditorCategory; 4] = [
        EditorCategory::General,
        EditorCategory::Jetbrains,
        EditorCategory::Apple,
        EditorCategory::Custom,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            EditorCategory::General => "Code Editors",
            EditorCategory::Jetbrains => "JetBrains IDEs",
            EditorCategory::Apple => "Apple",
            EditorCategory::Custom => "Custom",
        }
    }
}

/// Static catalog entry describing how to reach an editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorEntry {
    pub editor: Editor,
    pub display_name: &'static str,
    /// Platform application identifier (bundle id / desktop file id)
    pub application_id: &'static str,
    /// Command-line companion, if the editor ships one
    pub command: Option<&'static str>,
    pub category: EditorCategory,
    pub description: &'static str,
}

/// The user's editor choice. `custom_command` only matters when
/// `selected` is [`Editor::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditorPreference {
    pub selected: Editor,
    pub custom_command: String,
}
