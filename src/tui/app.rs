use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::cli::handlers::Context;
use crate::model::{AppConfig, Editor, EditorPreference, ProjectId, RepositoryId};
use crate::ops::editor_registry::EditorRegistry;
use crate::ops::host::Host;
use crate::ops::launcher::EditorLauncher;
use crate::ops::menu::{MenuRow, build_menu};
use crate::ops::notify::Subscription;
use crate::ops::store::ProjectStore;

use super::input;
use super::render;
use super::theme::Theme;

/// Main application state
pub struct App {
    /// Flattened menu, rebuilt when the store changes
    pub rows: Vec<MenuRow>,
    /// Index into `rows`; always a launchable row, or None if there are none
    pub cursor: Option<usize>,
    /// First visible row
    pub scroll_offset: usize,
    /// Copy of the store's preference as of the last rebuild
    pub preference: EditorPreference,
    pub theme: Theme,
    pub show_key_hints: bool,
    /// One-line feedback shown in the status row
    pub message: Option<String>,
    pub should_quit: bool,
    changes: Subscription,
}

impl App {
    pub fn new(store: &mut ProjectStore, config: &AppConfig) -> Self {
        let changes = store.subscribe();
        let mut app = App {
            rows: Vec::new(),
            cursor: None,
            scroll_offset: 0,
            preference: store.preference().clone(),
            theme: Theme::from_config(&config.ui),
            show_key_hints: config.ui.show_key_hints,
            message: None,
            should_quit: false,
            changes,
        };
        app.rebuild(store);
        app
    }

    /// Rebuild the menu if the store published a change since the last
    /// call. Returns whether a rebuild happened.
    pub fn refresh_if_changed(&mut self, store: &ProjectStore) -> bool {
        if !self.changes.take() {
            return false;
        }
        self.rebuild(store);
        true
    }

    fn rebuild(&mut self, store: &ProjectStore) {
        let previous = self.selected_ids();
        let previous_index = self.cursor.unwrap_or(0);

        self.rows = build_menu(store.projects());
        self.preference = store.preference().clone();

        // Stay on the same repository if it is still launchable
        let same = previous.and_then(|(pid, rid)| {
            self.rows.iter().position(|r| {
                r.is_launchable()
                    && matches!(r, MenuRow::Repository { project_id, id, .. } if *project_id == pid && *id == rid)
            })
        });
        self.cursor = same
            .or_else(|| self.launchable_from(previous_index))
            .or_else(|| self.launchable_from(0));
    }

    fn launchable_from(&self, start: usize) -> Option<usize> {
        (start..self.rows.len()).find(|&i| self.rows[i].is_launchable())
    }

    /// Project and repository ids under the cursor
    pub fn selected_ids(&self) -> Option<(ProjectId, RepositoryId)> {
        match self.rows.get(self.cursor?)? {
            MenuRow::Repository { project_id, id, .. } => Some((*project_id, *id)),
            _ => None,
        }
    }

    pub fn move_down(&mut self) {
        let Some(cursor) = self.cursor else { return };
        if let Some(next) = self.launchable_from(cursor + 1) {
            self.cursor = Some(next);
        }
    }

    pub fn move_up(&mut self) {
        let Some(cursor) = self.cursor else { return };
        if let Some(prev) = (0..cursor).rev().find(|&i| self.rows[i].is_launchable()) {
            self.cursor = Some(prev);
        }
    }

    pub fn move_to_first(&mut self) {
        if let Some(first) = self.launchable_from(0) {
            self.cursor = Some(first);
        }
    }

    pub fn move_to_last(&mut self) {
        if let Some(last) = (0..self.rows.len()).rev().find(|&i| self.rows[i].is_launchable()) {
            self.cursor = Some(last);
        }
    }

    /// Open the selected repository. The folder is re-checked first since
    /// it may have vanished after the menu was built.
    pub fn launch_selected(&mut self, store: &ProjectStore, host: &dyn Host) {
        let Some((project_id, repo_id)) = self.selected_ids() else {
            return;
        };
        let Some(repo) = store
            .project(project_id)
            .and_then(|p| p.repository(repo_id))
        else {
            return;
        };
        if !repo.is_valid_path() {
            self.message = Some(format!("Path not found: {}", repo.path));
            return;
        }
        EditorLauncher::new(host, store.log()).launch_editor(repo, store.preference());
        self.message = Some(format!(
            "Opening {} in {}",
            repo.name,
            EditorRegistry::entry(store.preference().selected).display_name
        ));
    }

    /// Step the selected editor through the catalog. The menu picks up the
    /// change on the next refresh.
    pub fn cycle_editor(&mut self, store: &mut ProjectStore, forward: bool) {
        let current = store.preference().selected;
        let index = Editor::ALL
            .iter()
            .position(|e| *e == current)
            .unwrap_or_default();
        let len = Editor::ALL.len();
        let next = if forward {
            Editor::ALL[(index + 1) % len]
        } else {
            Editor::ALL[(index + len - 1) % len]
        };
        store.update_selected_editor(next);
        self.message = Some(format!("Editor: {}", EditorRegistry::entry(next).display_name));
    }
}

/// Run the TUI application
pub fn run(ctx: &mut Context) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(&mut ctx.store, &ctx.config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, ctx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    ctx: &mut Context,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Changes made during the previous key land here, outside the mutation
        app.refresh_if_changed(&ctx.store);
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, ctx, key);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
