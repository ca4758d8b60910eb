use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Everything the launcher needs from the host OS. Tests swap in a
/// recording fake so the strategy chain runs without spawning anything.
pub trait Host {
    /// Locate an installed application by its identifier.
    fn resolve_application(&self, application_id: &str) -> Option<PathBuf>;

    /// Ask the OS to open `path` with a resolved application.
    fn open_with_application(&self, application_id: &str, app: &Path, path: &Path) -> io::Result<()>;

    /// Start `program` with `args`. Must not wait for it to exit.
    fn spawn_command(&self, program: &str, args: &[String]) -> io::Result<()>;

    /// Show `path` in the default file browser.
    fn open_in_file_browser(&self, path: &Path) -> io::Result<()>;
}

/// The real operating system.
#[derive(Debug, Clone, Default)]
pub struct SystemHost {
    /// Program used by [`Host::open_in_file_browser`]; platform default if unset
    pub file_browser: Option<String>,
}

impl SystemHost {
    pub fn new(file_browser: Option<String>) -> Self {
        SystemHost { file_browser }
    }

    fn file_browser_program(&self) -> &str {
        if let Some(program) = self.file_browser.as_deref() {
            return program;
        }
        if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(target_os = "windows") {
            "explorer"
        } else {
            "xdg-open"
        }
    }
}

impl Host for SystemHost {
    fn resolve_application(&self, application_id: &str) -> Option<PathBuf> {
        if application_id.is_empty() {
            return None;
        }
        resolve_platform_application(application_id)
    }

    fn open_with_application(&self, application_id: &str, app: &Path, path: &Path) -> io::Result<()> {
        let mut cmd = if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg("-b").arg(application_id).arg(path);
            cmd
        } else {
            // gtk-launch takes the desktop file id, not its path
            let desktop_id = app
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| format!("{}.desktop", application_id));
            let mut cmd = Command::new("gtk-launch");
            cmd.arg(desktop_id).arg(path);
            cmd
        };
        run_to_completion(&mut cmd)
    }

    fn spawn_command(&self, program: &str, args: &[String]) -> io::Result<()> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        spawn_detached(&mut cmd)
    }

    fn open_in_file_browser(&self, path: &Path) -> io::Result<()> {
        let mut cmd = Command::new(self.file_browser_program());
        cmd.arg(path);
        spawn_detached(&mut cmd)
    }
}

/// Spawn with null stdio and reap the child on a background thread so it
/// never lingers as a zombie.
fn spawn_detached(cmd: &mut Command) -> io::Result<()> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    std::thread::spawn(move || {
        let _ = child.wait();
    });
    Ok(())
}

/// For short-lived helpers (`open -b`, `gtk-launch`) whose exit status is the
/// answer to "did the launch request succeed".
fn run_to_completion(cmd: &mut Command) -> io::Result<()> {
    let status = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("launch request exited with {}", status)))
    }
}

#[cfg(target_os = "macos")]
fn resolve_platform_application(application_id: &str) -> Option<PathBuf> {
    let query = format!("kMDItemCFBundleIdentifier == '{}'", application_id);
    let output = Command::new("mdfind")
        .arg(query)
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(PathBuf::from)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn resolve_platform_application(application_id: &str) -> Option<PathBuf> {
    let file_name = format!("{}.desktop", application_id);
    xdg_application_dirs()
        .into_iter()
        .map(|dir| dir.join(&file_name))
        .find(|candidate| candidate.is_file())
}

#[cfg(not(unix))]
fn resolve_platform_application(_application_id: &str) -> Option<PathBuf> {
    None
}

/// `applications/` under XDG_DATA_HOME and each XDG_DATA_DIRS entry
#[cfg(all(unix, not(target_os = "macos")))]
fn xdg_application_dirs() -> Vec<PathBuf> {
    let data_home = std::env::var("XDG_DATA_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| crate::io::config_io::home_dir().join(".local/share"));
    let data_dirs = std::env::var("XDG_DATA_DIRS")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "/usr/local/share:/usr/share".to_string());

    std::iter::once(data_home)
        .chain(std::env::split_paths(&data_dirs))
        .map(|d| d.join("applications"))
        .collect()
}
