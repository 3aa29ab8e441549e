use nix::unistd::{User, gethostname, getuid};
use std::collections::HashMap;
use std::env as stdenv;
use std::path::{Path, PathBuf};

/// Session state shared by the prompt and the process launcher.
///
/// The environment contains:
/// - `vars`: environment variables that will be visible to executed commands.
/// - `current_dir`: the working directory for command execution.
/// - `user` and `host`: identity shown in the prompt.
///
/// Note: fields are public to keep construction in tests trivial.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// Login name of the operator.
    pub user: String,
    /// Host name up to the first dot.
    pub host: String,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// Variables come from `std::env::vars()` and the directory from
    /// `std::env::current_dir()`. The user name is `$USER` (or `$LOGNAME`),
    /// falling back to the password database entry of the real uid.
    pub fn new() -> Self {
        let vars: HashMap<String, String> = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let user = login_name(&vars);
        Self {
            vars,
            current_dir,
            user,
            host: short_host_name(),
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Prompt shown while no statement is pending: `[user@host dir]$ `.
    pub fn prompt(&self) -> String {
        format!(
            "[{}@{} {}]$ ",
            self.user,
            self.host,
            dir_name(&self.current_dir)
        )
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn login_name(vars: &HashMap<String, String>) -> String {
    vars.get("USER")
        .or_else(|| vars.get("LOGNAME"))
        .filter(|name| !name.is_empty())
        .cloned()
        .or_else(|| {
            User::from_uid(getuid())
                .ok()
                .flatten()
                .map(|user| user.name)
        })
        .unwrap_or_else(|| getuid().to_string())
}

fn short_host_name() -> String {
    let host = gethostname()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match host.split('.').next() {
        Some(short) if !short.is_empty() => short.to_string(),
        _ => "localhost".to_string(),
    }
}

/// Last component of `dir`; the root directory is shown as `/`.
fn dir_name(dir: &Path) -> String {
    match dir.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => dir.to_string_lossy().into_owned(),
    }
}
