use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dock", about = concat!("[=] repodock v", env!("CARGO_PKG_VERSION"), " - your repositories, one keystroke away"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different store file
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List projects and their repositories
    List,
    /// Add, rename or remove projects
    Project(ProjectCmd),
    /// Add, edit or remove repositories
    Repo(RepoCmd),
    /// Open a repository in the selected editor
    Open(OpenArgs),
    /// Show or change the editor preference
    Editor(EditorCmd),
    /// View or manage the event log
    Log(LogCmd),
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProjectCmd {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create an empty project
    Add(ProjectAddArgs),
    /// Rename a project
    Rename(ProjectRenameArgs),
    /// Remove a project and all its repositories
    Remove(ProjectRemoveArgs),
}

#[derive(Args)]
pub struct ProjectAddArgs {
    /// Project name
    pub name: String,
}

#[derive(Args)]
pub struct ProjectRenameArgs {
    /// Project name or id
    pub project: String,
    /// New name
    pub name: String,
}

#[derive(Args)]
pub struct ProjectRemoveArgs {
    /// Project name or id
    pub project: String,
}

// ---------------------------------------------------------------------------
// Repositories
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RepoCmd {
    #[command(subcommand)]
    pub action: RepoAction,
}

#[derive(Subcommand)]
pub enum RepoAction {
    /// Add a folder to a project
    Add(RepoAddArgs),
    /// Change a repository's name, description or path
    Edit(RepoEditArgs),
    /// Remove a repository from a project
    Remove(RepoRemoveArgs),
}

#[derive(Args)]
pub struct RepoAddArgs {
    /// Project name or id
    pub project: String,
    /// Folder path
    pub path: String,
    /// Display name (default: the folder name)
    #[arg(long)]
    pub name: Option<String>,
    /// One-line description
    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Args)]
pub struct RepoEditArgs {
    /// Project name or id
    pub project: String,
    /// Repository name or id
    pub repo: String,
    /// New name
    #[arg(long)]
    pub name: Option<String>,
    /// New description
    #[arg(long)]
    pub description: Option<String>,
    /// New folder path
    #[arg(long)]
    pub path: Option<String>,
}

#[derive(Args)]
pub struct RepoRemoveArgs {
    /// Project name or id
    pub project: String,
    /// Repository name or id
    pub repo: String,
}

#[derive(Args)]
pub struct OpenArgs {
    /// Project name or id
    pub project: String,
    /// Repository name or id
    pub repo: String,
}

// ---------------------------------------------------------------------------
// Editor preference
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct EditorCmd {
    #[command(subcommand)]
    pub action: Option<EditorAction>,
}

#[derive(Subcommand)]
pub enum EditorAction {
    /// List editors by category (default)
    List,
    /// Select the editor used to open repositories
    Set(EditorSetArgs),
    /// Set the command run when the custom editor is selected
    Command(EditorCommandArgs),
}

#[derive(Args)]
pub struct EditorSetArgs {
    /// Editor tag (see `dock editor list`)
    pub editor: String,
}

#[derive(Args)]
pub struct EditorCommandArgs {
    /// Command line; the folder path is appended as the last argument
    pub command: String,
}

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct LogCmd {
    #[command(subcommand)]
    pub action: Option<LogAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Show entries after this timestamp (ISO-8601)
    #[arg(long)]
    pub since: Option<String>,
}

#[derive(Subcommand)]
pub enum LogAction {
    /// Remove old entries
    Prune(LogPruneArgs),
    /// Print the absolute path to the event log
    Path,
}

#[derive(Args)]
pub struct LogPruneArgs {
    /// Remove entries older than this timestamp (default: 30 days ago)
    #[arg(long)]
    pub before: Option<String>,
    /// Remove all entries
    #[arg(long)]
    pub all: bool,
}
