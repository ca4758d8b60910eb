use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::event_log::{self, EventLog};
use crate::io::kv_store::JsonFileStore;
use crate::io::persistence::Persistence;
use crate::model::{AppConfig, Editor, Project, Repository};
use crate::ops::host::SystemHost;
use crate::ops::launcher::EditorLauncher;
use crate::ops::menu::build_menu;
use crate::ops::store::ProjectStore;
use crate::ops::validate;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Everything a command needs, built from the config directory.
pub struct Context {
    pub config_dir: PathBuf,
    pub config: AppConfig,
    pub store: ProjectStore,
    pub host: SystemHost,
}

impl Context {
    /// Read config, then open the store (seeding it on first use).
    pub fn open(store_override: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let config_dir = config_io::config_dir();
        let config = config_io::read_config(&config_dir)?;
        let store_file = config_io::store_path(&config_dir, &config, store_override.map(Path::new));
        let log = EventLog::at(event_log::event_log_path(&config_dir));
        let store = ProjectStore::open(Persistence::new(JsonFileStore::new(store_file)), log);
        let host = SystemHost::new(config.launcher.file_browser.clone());
        Ok(Context {
            config_dir,
            config,
            store,
            host,
        })
    }

    fn launcher(&self) -> EditorLauncher<'_> {
        EditorLauncher::new(&self.host, self.store.log())
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let Some(cmd) = cli.command else {
        let mut ctx = Context::open(cli.store.as_deref())?;
        return crate::tui::run(&mut ctx);
    };

    // The event log lives beside the config; no store needed
    if let Commands::Log(args) = cmd {
        return cmd_log(args, json);
    }

    let mut ctx = Context::open(cli.store.as_deref())?;
    match cmd {
        Commands::List => cmd_list(&ctx, json),
        Commands::Project(args) => match args.action {
            ProjectAction::Add(a) => cmd_project_add(&mut ctx, a),
            ProjectAction::Rename(a) => cmd_project_rename(&mut ctx, a),
            ProjectAction::Remove(a) => cmd_project_remove(&mut ctx, a),
        },
        Commands::Repo(args) => match args.action {
            RepoAction::Add(a) => cmd_repo_add(&mut ctx, a),
            RepoAction::Edit(a) => cmd_repo_edit(&mut ctx, a),
            RepoAction::Remove(a) => cmd_repo_remove(&mut ctx, a),
        },
        Commands::Open(args) => cmd_open(&ctx, args),
        Commands::Editor(args) => match args.action {
            None | Some(EditorAction::List) => cmd_editor_list(&ctx, json),
            Some(EditorAction::Set(a)) => cmd_editor_set(&mut ctx, a),
            Some(EditorAction::Command(a)) => cmd_editor_command(&mut ctx, a),
        },
        Commands::Log(_) => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn find_project<'a>(ctx: &'a Context, key: &str) -> Result<&'a Project, Box<dyn std::error::Error>> {
    ctx.store
        .find_project(key)
        .ok_or_else(|| format!("project not found: {}", key).into())
}

fn find_repository<'a>(project: &'a Project, key: &str) -> Result<&'a Repository, Box<dyn std::error::Error>> {
    project
        .find_repository(key)
        .ok_or_else(|| format!("repository not found in {}: {}", project.name, key).into())
}

/// Resolve a user-supplied folder against the working directory. Empty
/// input stays empty so validation can reject it.
fn absolute_path(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    if path.trim().is_empty() {
        return Ok(String::new());
    }
    let expanded = config_io::expand_home(path);
    let abs = std::path::absolute(&expanded)
        .map_err(|e| format!("cannot resolve path '{}': {}", path, e))?;
    Ok(abs.to_string_lossy().to_string())
}

/// Accept RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC).
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid timestamp '{}' (expected ISO-8601)", s))?;
    Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context, json: bool) -> CmdResult {
    let projects = ctx.store.projects();
    if json {
        let items: Vec<ProjectJson> = projects.iter().map(project_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No projects yet.");
        println!();
        println!("Run `dock project add <name>` to create one.");
        return Ok(());
    }
    for line in format_menu(&build_menu(projects)) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_editor_list(ctx: &Context, json: bool) -> CmdResult {
    let preference = ctx.store.preference();
    if json {
        let listing = editors_to_json(preference, &ctx.host);
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }
    for line in format_editor_listing(preference, &ctx.host) {
        println!("{}", line);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Project commands
// ---------------------------------------------------------------------------

fn cmd_project_add(ctx: &mut Context, args: ProjectAddArgs) -> CmdResult {
    let project = validate::new_project(&args.name, ctx.store.projects())?;
    println!("Added project: {}", project.name);
    ctx.store.add_project(project);
    Ok(())
}

fn cmd_project_rename(ctx: &mut Context, args: ProjectRenameArgs) -> CmdResult {
    let project = find_project(ctx, &args.project)?;
    let renamed = validate::renamed_project(project, &args.name)?;
    println!("Renamed: {} -> {}", project.name, renamed.name);
    ctx.store.update_project(renamed);
    Ok(())
}

fn cmd_project_remove(ctx: &mut Context, args: ProjectRemoveArgs) -> CmdResult {
    let project = find_project(ctx, &args.project)?;
    let (id, name, count) = (project.id, project.name.clone(), project.repositories.len());
    ctx.store.delete_project(id);
    println!("Removed project: {} ({} repositories)", name, count);
    Ok(())
}

// ---------------------------------------------------------------------------
// Repository commands
// ---------------------------------------------------------------------------

fn cmd_repo_add(ctx: &mut Context, args: RepoAddArgs) -> CmdResult {
    let project = find_project(ctx, &args.project)?;
    let path = absolute_path(&args.path)?;
    let repo = validate::new_repository(project, args.name.as_deref(), &args.description, &path)?;
    let project_id = project.id;
    println!("Added: {} ({})", repo.name, repo.path);
    ctx.store.add_repository(repo, project_id);
    Ok(())
}

fn cmd_repo_edit(ctx: &mut Context, args: RepoEditArgs) -> CmdResult {
    let project = find_project(ctx, &args.project)?;
    let original = find_repository(project, &args.repo)?;

    let path = match &args.path {
        Some(p) => absolute_path(p)?,
        None => original.path.clone(),
    };
    let edited = validate::edited_repository(
        project,
        original,
        args.name.as_deref().unwrap_or(&original.name),
        args.description.as_deref().unwrap_or(&original.description),
        &path,
    )?;

    let mut updated = project.clone();
    updated.replace_repository(edited);
    println!("Updated: {}", args.repo);
    ctx.store.update_project(updated);
    Ok(())
}

fn cmd_repo_remove(ctx: &mut Context, args: RepoRemoveArgs) -> CmdResult {
    let project = find_project(ctx, &args.project)?;
    let repo = find_repository(project, &args.repo)?;
    let (project_id, repo_id) = (project.id, repo.id);
    println!("Removed: {}", repo.name);
    ctx.store.delete_repository(repo_id, project_id);
    Ok(())
}

fn cmd_open(ctx: &Context, args: OpenArgs) -> CmdResult {
    let project = find_project(ctx, &args.project)?;
    let repo = find_repository(project, &args.repo)?;
    if !repo.is_valid_path() {
        return Err(format!("path not found: {}", repo.path).into());
    }
    println!("Opening {} ({})", repo.name, ctx.store.preference().selected);
    ctx.launcher().launch_editor(repo, ctx.store.preference());
    Ok(())
}

// ---------------------------------------------------------------------------
// Editor preference
// ---------------------------------------------------------------------------

fn cmd_editor_set(ctx: &mut Context, args: EditorSetArgs) -> CmdResult {
    let editor: Editor = args.editor.parse()?;
    ctx.store.update_selected_editor(editor);
    println!("Editor: {}", editor);
    if editor.is_custom() && ctx.store.preference().custom_command.trim().is_empty() {
        println!("Set the command with `dock editor command <TEXT>`.");
    }
    Ok(())
}

fn cmd_editor_command(ctx: &mut Context, args: EditorCommandArgs) -> CmdResult {
    let command = args.command.trim().to_string();
    ctx.store.update_custom_editor_command(command.clone());
    if command.is_empty() {
        println!("Custom command cleared");
    } else {
        println!("Custom command: {}", command);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

fn cmd_log(args: LogCmd, json: bool) -> CmdResult {
    let path = event_log::event_log_path(&config_io::config_dir());
    match args.action {
        Some(LogAction::Path) => {
            println!("{}", path.display());
            Ok(())
        }
        Some(LogAction::Prune(a)) => {
            let before = a.before.as_deref().map(parse_timestamp).transpose()?;
            let removed = event_log::prune(&path, before, a.all)?;
            println!("Pruned {} entries", removed);
            Ok(())
        }
        None => {
            let since = args.since.as_deref().map(parse_timestamp).transpose()?;
            let entries = event_log::read_entries(&path, Some(args.limit.unwrap_or(10)), since);
            if json {
                let items: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
                println!("{}", serde_json::to_string_pretty(&items)?);
                return Ok(());
            }
            if entries.is_empty() {
                println!("No events logged.");
                return Ok(());
            }
            for entry in &entries {
                print!("{}", entry.to_display_markdown());
            }
            Ok(())
        }
    }
}
