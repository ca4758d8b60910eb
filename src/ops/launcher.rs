use std::fmt;
use std::io;
use std::path::Path;

use crate::io::event_log::{EventCategory, EventEntry, EventLog};
use crate::model::{EditorPreference, Repository};
use crate::ops::editor_registry::EditorRegistry;
use crate::ops::host::Host;

/// One way of getting a folder in front of the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Open the folder with the editor's installed application
    Application,
    /// Run the editor's command-line tool (or the custom command)
    CommandLine,
    /// Reveal the folder in the file browser
    FileBrowser,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Application => write!(f, "application"),
            Strategy::CommandLine => write!(f, "command line"),
            Strategy::FileBrowser => write!(f, "file browser"),
        }
    }
}

/// Tried in order; the first success ends the chain.
const STRATEGIES: [Strategy; 3] = [
    Strategy::Application,
    Strategy::CommandLine,
    Strategy::FileBrowser,
];

/// Why a single strategy did not open the folder
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("{editor} is not installed")]
    NotInstalled { editor: &'static str },
    #[error("could not open with {editor}: {source}")]
    OpenFailed {
        editor: &'static str,
        source: io::Error,
    },
    #[error("could not run '{command}': {source}")]
    SpawnFailed { command: String, source: io::Error },
    #[error("could not open file browser: {source}")]
    BrowserFailed { source: io::Error },
}

enum Attempt {
    Opened,
    Skipped,
    Failed(LaunchError),
}

/// Opens repositories in the preferred editor, degrading to the command
/// line and then the file browser. Never fails from the caller's view;
/// each fallthrough is written to the event log.
pub struct EditorLauncher<'a> {
    host: &'a dyn Host,
    log: &'a EventLog,
}

impl<'a> EditorLauncher<'a> {
    pub fn new(host: &'a dyn Host, log: &'a EventLog) -> Self {
        EditorLauncher { host, log }
    }

    pub fn launch_editor(&self, repository: &Repository, preference: &EditorPreference) {
        self.run_chain(repository, preference);
    }

    /// Returns the strategy that ended the chain.
    pub(crate) fn run_chain(&self, repository: &Repository, preference: &EditorPreference) -> Strategy {
        let path = Path::new(&repository.path);
        STRATEGIES
            .into_iter()
            .find(|&strategy| match self.attempt(strategy, path, preference) {
                Attempt::Opened => true,
                Attempt::Skipped => false,
                Attempt::Failed(err) => {
                    self.log_failure(strategy, repository, preference, &err);
                    // Nothing comes after the file browser
                    strategy == Strategy::FileBrowser
                }
            })
            .unwrap_or(Strategy::FileBrowser)
    }

    fn attempt(&self, strategy: Strategy, path: &Path, preference: &EditorPreference) -> Attempt {
        match strategy {
            Strategy::Application => self.try_application(path, preference),
            Strategy::CommandLine => self.try_command_line(path, preference),
            Strategy::FileBrowser => match self.host.open_in_file_browser(path) {
                Ok(()) => Attempt::Opened,
                Err(source) => Attempt::Failed(LaunchError::BrowserFailed { source }),
            },
        }
    }

    fn try_application(&self, path: &Path, preference: &EditorPreference) -> Attempt {
        if preference.selected.is_custom() {
            return Attempt::Skipped;
        }
        let entry = EditorRegistry::entry(preference.selected);
        let Some(app) = self.host.resolve_application(entry.application_id) else {
            return Attempt::Failed(LaunchError::NotInstalled {
                editor: entry.display_name,
            });
        };
        match self
            .host
            .open_with_application(entry.application_id, &app, path)
        {
            Ok(()) => Attempt::Opened,
            Err(source) => Attempt::Failed(LaunchError::OpenFailed {
                editor: entry.display_name,
                source,
            }),
        }
    }

    fn try_command_line(&self, path: &Path, preference: &EditorPreference) -> Attempt {
        let Some((program, mut args)) = command_for(preference) else {
            return Attempt::Skipped;
        };
        args.push(path.to_string_lossy().to_string());
        match self.host.spawn_command(&program, &args) {
            Ok(()) => Attempt::Opened,
            Err(source) => Attempt::Failed(LaunchError::SpawnFailed {
                command: program,
                source,
            }),
        }
    }

    fn log_failure(
        &self,
        strategy: Strategy,
        repository: &Repository,
        preference: &EditorPreference,
        err: &LaunchError,
    ) {
        self.log.record(
            EventEntry::new(EventCategory::Launch, format!("{} launch failed", strategy))
                .field("Repository", &repository.name)
                .field("Path", &repository.path)
                .field(
                    "Editor",
                    EditorRegistry::entry(preference.selected).display_name,
                )
                .body(err.to_string()),
        );
    }
}

/// Program and leading arguments for the command-line strategy.
/// A custom command is split on whitespace and the repository path is
/// appended as the last argument, so `hx --vsplit` runs
/// `hx --vsplit <path>`. Quoting is not supported. `None` when there is
/// nothing to run.
pub fn command_for(preference: &EditorPreference) -> Option<(String, Vec<String>)> {
    if preference.selected.is_custom() {
        let mut parts = preference.custom_command.split_whitespace();
        let program = parts.next()?.to_string();
        return Some((program, parts.map(str::to_string).collect()));
    }
    EditorRegistry::entry(preference.selected)
        .command
        .map(|c| (c.to_string(), Vec::new()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::io::event_log::read_entries;
    use crate::model::Editor;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Records every host call; configurable failures.
    #[derive(Default)]
    pub struct FakeHost {
        installed: HashSet<String>,
        open_fails: bool,
        spawnable: HashSet<String>,
        browser_fails: bool,
        pub calls: RefCell<Vec<String>>,
    }

    impl FakeHost {
        pub fn with_app(mut self, id: &str) -> Self {
            self.installed.insert(id.to_string());
            self
        }

        pub fn with_program(mut self, program: &str) -> Self {
            self.spawnable.insert(program.to_string());
            self
        }

        pub fn failing_open(mut self) -> Self {
            self.open_fails = true;
            self
        }

        pub fn failing_browser(mut self) -> Self {
            self.browser_fails = true;
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl Host for FakeHost {
        fn resolve_application(&self, application_id: &str) -> Option<PathBuf> {
            self.calls
                .borrow_mut()
                .push(format!("resolve {}", application_id));
            self.installed
                .contains(application_id)
                .then(|| PathBuf::from(format!("/Applications/{}.app", application_id)))
        }

        fn open_with_application(&self, application_id: &str, _app: &Path, path: &Path) -> io::Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("open {} {}", application_id, path.display()));
            if self.open_fails {
                Err(io::Error::other("launch refused"))
            } else {
                Ok(())
            }
        }

        fn spawn_command(&self, program: &str, args: &[String]) -> io::Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("spawn {} {}", program, args.join(" ")));
            if self.spawnable.contains(program) {
                Ok(())
            } else {
                Err(io::Error::from(io::ErrorKind::NotFound))
            }
        }

        fn open_in_file_browser(&self, path: &Path) -> io::Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("browse {}", path.display()));
            if self.browser_fails {
                Err(io::Error::other("no file browser"))
            } else {
                Ok(())
            }
        }
    }

    fn repo() -> Repository {
        Repository::new("api", "", "/srv/api")
    }

    fn pref(selected: Editor, custom: &str) -> EditorPreference {
        EditorPreference {
            selected,
            custom_command: custom.to_string(),
        }
    }

    fn run(host: &FakeHost, preference: &EditorPreference) -> Strategy {
        let log = EventLog::stderr();
        EditorLauncher::new(host, &log).run_chain(&repo(), preference)
    }

    #[test]
    fn installed_app_wins() {
        let host = FakeHost::default().with_app("dev.zed.Zed").with_program("zed");
        assert_eq!(run(&host, &pref(Editor::Zed, "")), Strategy::Application);
        assert_eq!(
            host.calls(),
            vec!["resolve dev.zed.Zed", "open dev.zed.Zed /srv/api"]
        );
    }

    #[test]
    fn missing_app_falls_back_to_cli() {
        let host = FakeHost::default().with_program("code");
        assert_eq!(run(&host, &pref(Editor::Vscode, "")), Strategy::CommandLine);
        assert_eq!(
            host.calls(),
            vec!["resolve com.microsoft.VSCode", "spawn code /srv/api"]
        );
    }

    #[test]
    fn open_failure_falls_back_to_cli() {
        let host = FakeHost::default()
            .with_app("com.microsoft.VSCode")
            .failing_open()
            .with_program("code");
        assert_eq!(run(&host, &pref(Editor::Vscode, "")), Strategy::CommandLine);
    }

    #[test]
    fn app_and_cli_failures_reach_file_browser() {
        let host = FakeHost::default();
        assert_eq!(run(&host, &pref(Editor::Cursor, "")), Strategy::FileBrowser);
        assert_eq!(
            host.calls(),
            vec![
                "resolve com.todesktop.230313mzl4w4u92",
                "spawn cursor /srv/api",
                "browse /srv/api",
            ]
        );
    }

    #[test]
    fn editor_without_cli_skips_to_file_browser() {
        let host = FakeHost::default();
        assert_eq!(run(&host, &pref(Editor::Xcode, "")), Strategy::FileBrowser);
        assert_eq!(
            host.calls(),
            vec!["resolve com.apple.dt.Xcode", "browse /srv/api"]
        );
    }

    #[test]
    fn custom_never_tries_an_application() {
        let host = FakeHost::default().with_program("hx");
        assert_eq!(run(&host, &pref(Editor::Custom, "hx")), Strategy::CommandLine);
        assert_eq!(host.calls(), vec!["spawn hx /srv/api"]);
    }

    #[test]
    fn empty_custom_command_goes_straight_to_browser() {
        let host = FakeHost::default();
        assert_eq!(run(&host, &pref(Editor::Custom, "   ")), Strategy::FileBrowser);
        assert_eq!(host.calls(), vec!["browse /srv/api"]);
    }

    #[test]
    fn custom_command_keeps_leading_arguments() {
        let host = FakeHost::default().with_program("code");
        run(&host, &pref(Editor::Custom, "code --new-window"));
        assert_eq!(host.calls(), vec!["spawn code --new-window /srv/api"]);
    }

    #[test]
    fn failing_browser_is_still_terminal() {
        let host = FakeHost::default().failing_browser();
        assert_eq!(run(&host, &pref(Editor::Custom, "")), Strategy::FileBrowser);
    }

    #[test]
    fn each_fallthrough_is_logged() {
        let tmp = TempDir::new().unwrap();
        let log = EventLog::at(tmp.path().join("events.log"));
        let host = FakeHost::default();
        EditorLauncher::new(&host, &log).launch_editor(&repo(), &pref(Editor::Zed, ""));

        let entries = read_entries(log.path().unwrap(), None, None);
        let descriptions: Vec<&str> = entries.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec!["command line launch failed", "application launch failed"]
        );
        assert_eq!(entries[1].body, "Zed is not installed");
        assert!(entries.iter().all(|e| e.category == EventCategory::Launch));
    }

    #[test]
    fn command_for_each_kind() {
        assert_eq!(
            command_for(&pref(Editor::Sublime, "ignored")),
            Some(("subl".to_string(), vec![]))
        );
        assert_eq!(command_for(&pref(Editor::Xcode, "")), None);
        assert_eq!(command_for(&pref(Editor::Custom, "")), None);
        assert_eq!(
            command_for(&pref(Editor::Custom, " emacsclient -n ")),
            Some(("emacsclient".to_string(), vec!["-n".to_string()]))
        );
    }
}
