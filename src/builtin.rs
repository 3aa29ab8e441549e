use crate::command::{ExitCode, SUCCESS, USAGE_ERROR};
use crate::env::Environment;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process. They exist only for the things a
/// child process cannot do on behalf of the session.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd".
    fn name() -> &'static str;

    /// Executes the command against the session environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

/// Run `argv` as a builtin if its name matches one.
///
/// Returns `None` when no builtin has that name. Errors raised by the builtin
/// are reported on stderr and turned into status 1.
pub(crate) fn try_run(argv: &[String], env: &mut Environment) -> Option<ExitCode> {
    let (name, args) = argv.split_first()?;
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let mut stdout = std::io::stdout();
    run_as::<Cd>(name, &args, &mut stdout, env)
}

fn run_as<T: BuiltinCommand>(
    name: &str,
    args: &[&str],
    stdout: &mut dyn Write,
    env: &mut Environment,
) -> Option<ExitCode> {
    if name != T::name() {
        return None;
    }
    let code = match T::from_args(&[name], args) {
        Ok(cmd) => match cmd.execute(stdout, env) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("tinysh: {e:#}");
                1
            }
        },
        Err(EarlyExit { output, status }) => {
            let _ = stdout.write_all(output.as_bytes());
            if status.is_err() { USAGE_ERROR } else { SUCCESS }
        }
    };
    Some(code)
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the directory specified by the HOME environment variable.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory. Defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let target = match &self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => match env.get_var("HOME") {
                Some(home) => PathBuf::from(home),
                None => return Err(anyhow::anyhow!("cd: no target and HOME not set")),
            },
        };

        let new_dir = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };

        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: can't canonicalize {}", new_dir.display()))?;

        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
        env.current_dir = canonical;
        Ok(SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env as stdenv;
    use std::sync::{Mutex, MutexGuard};

    static CURRENT_DIR_LOCK: Mutex<()> = Mutex::new(());

    // Changing the process directory races with other tests doing the same.
    fn lock_current_dir() -> MutexGuard<'static, ()> {
        CURRENT_DIR_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn env_at(dir: PathBuf) -> Environment {
        Environment {
            vars: HashMap::new(),
            current_dir: dir,
            user: "tester".to_string(),
            host: "localhost".to_string(),
        }
    }

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_cd_to_absolute_path() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let canonical_temp = fs::canonicalize(temp.path()).unwrap();

        let mut env = env_at(orig.clone());
        let cmd = Cd {
            target: Some(canonical_temp.to_string_lossy().to_string()),
        };
        let res = cmd.execute(&mut Vec::new(), &mut env);

        assert_eq!(res.unwrap(), 0);
        assert_eq!(env.current_dir, canonical_temp);
        assert_eq!(fs::canonicalize(stdenv::current_dir().unwrap()).unwrap(), canonical_temp);

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
    }

    #[test]
    fn test_cd_relative_to_session_dir() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let canonical_temp = fs::canonicalize(temp.path()).unwrap();
        fs::create_dir(canonical_temp.join("inner")).unwrap();

        let mut env = env_at(canonical_temp.clone());
        let code = try_run(&argv(&["cd", "inner"]), &mut env);

        assert_eq!(code, Some(0));
        assert_eq!(env.current_dir, canonical_temp.join("inner"));

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
    }

    #[test]
    fn test_cd_to_home_when_none() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let canonical_temp = fs::canonicalize(temp.path()).unwrap();

        let mut env = env_at(orig.clone());
        env.set_var("HOME", canonical_temp.to_string_lossy().to_string());

        let cmd = Cd { target: None };
        assert!(cmd.execute(&mut Vec::new(), &mut env).is_ok());
        assert_eq!(env.current_dir, canonical_temp);

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
    }

    #[test]
    fn test_cd_nonexistent_path_fails_with_status_1() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();

        let mut env = env_at(orig.clone());
        let name = format!("nonexistent_dir_for_cd_test_{}", std::process::id());
        let code = try_run(&argv(&["cd", &name]), &mut env);

        assert_eq!(code, Some(1));
        assert_eq!(env.current_dir, orig);
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[test]
    fn unknown_names_are_not_builtins() {
        let mut env = env_at(PathBuf::from("/"));
        assert_eq!(try_run(&argv(&["ls", "-l"]), &mut env), None);
        assert_eq!(try_run(&[], &mut env), None);
    }

    #[test]
    fn too_many_arguments_is_a_usage_error() {
        let mut env = env_at(PathBuf::from("/"));
        let mut out = Vec::new();
        let code = run_as::<Cd>("cd", &["a", "b"], &mut out, &mut env);
        assert_eq!(code, Some(USAGE_ERROR));
        assert!(!out.is_empty());
    }
}
