use crate::model::{Editor, EditorCategory, EditorEntry};
use crate::ops::host::Host;

const fn entry(
    editor: Editor,
    display_name: &'static str,
    application_id: &'static str,
    command: Option<&'static str>,
    category: EditorCategory,
    description: &'static str,
) -> EditorEntry {
    EditorEntry {
        editor,
        display_name,
        application_id,
        command,
        category,
        description,
    }
}

/// Catalog order matches [`Editor::ALL`].
static CATALOG: [EditorEntry; 12] = [
    entry(
        Editor::Vscode,
        "Visual Studio Code",
        "com.microsoft.VSCode",
        Some("code"),
        EditorCategory::General,
        "Microsoft's extensible code editor",
    ),
    entry(
        Editor::Cursor,
        "Cursor",
        "com.todesktop.230313mzl4w4u92",
        Some("cursor"),
        EditorCategory::General,
        "AI-first fork of VS Code",
    ),
    entry(
        Editor::Windsurf,
        "Windsurf",
        "com.exafunction.windsurf",
        Some("windsurf"),
        EditorCategory::General,
        "Agentic editor from Codeium",
    ),
    entry(
        Editor::Zed,
        "Zed",
        "dev.zed.Zed",
        Some("zed"),
        EditorCategory::General,
        "High-performance collaborative editor",
    ),
    entry(
        Editor::Sublime,
        "Sublime Text",
        "com.sublimetext.4",
        Some("subl"),
        EditorCategory::General,
        "Fast, lightweight text editor",
    ),
    entry(
        Editor::Nova,
        "Nova",
        "com.panic.Nova",
        Some("nova"),
        EditorCategory::General,
        "Native Mac code editor by Panic",
    ),
    entry(
        Editor::Bbedit,
        "BBEdit",
        "com.barebones.bbedit",
        Some("bbedit"),
        EditorCategory::General,
        "Long-standing Mac text editor",
    ),
    entry(
        Editor::Intellij,
        "IntelliJ IDEA",
        "com.jetbrains.intellij",
        Some("idea"),
        EditorCategory::Jetbrains,
        "Java and Kotlin IDE",
    ),
    entry(
        Editor::Webstorm,
        "WebStorm",
        "com.jetbrains.WebStorm",
        Some("webstorm"),
        EditorCategory::Jetbrains,
        "JavaScript and TypeScript IDE",
    ),
    entry(
        Editor::Pycharm,
        "PyCharm",
        "com.jetbrains.pycharm",
        Some("pycharm"),
        EditorCategory::Jetbrains,
        "Python IDE",
    ),
    entry(
        Editor::Xcode,
        "Xcode",
        "com.apple.dt.Xcode",
        None,
        EditorCategory::Apple,
        "Apple's IDE for its platforms",
    ),
    entry(
        Editor::Custom,
        "Custom Command",
        "",
        None,
        EditorCategory::Custom,
        "Any command that accepts a folder path",
    ),
];

/// Static catalog of known editors plus availability checks.
pub struct EditorRegistry;

impl EditorRegistry {
    /// Every entry, in stable catalog order
    pub fn all_editors() -> &'static [EditorEntry] {
        &CATALOG
    }

    pub fn entry(editor: Editor) -> &'static EditorEntry {
        // CATALOG is indexed in Editor::ALL order
        let index = Editor::ALL
            .iter()
            .position(|e| *e == editor)
            .unwrap_or_default();
        &CATALOG[index]
    }

    pub fn editors_in(category: EditorCategory) -> impl Iterator<Item = &'static EditorEntry> {
        CATALOG.iter().filter(move |e| e.category == category)
    }

    /// Informational only: the launcher never consults this.
    /// `Custom` is always available.
    pub fn is_available(editor: Editor, host: &dyn Host) -> bool {
        if editor.is_custom() {
            return true;
        }
        host.resolve_application(Self::entry(editor).application_id)
            .is_some()
    }
}
