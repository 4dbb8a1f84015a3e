//! The invocation record for one wrapped run.
//!
//! An [`Invocation`] names the executable, its ordered arguments, the working
//! directory and any extra environment. It is assembled once with builder
//! methods and handed to [`crate::pty::run`], which never alters it. Argument
//! semantics belong entirely to the external program: nothing here inspects
//! or rewrites an argument.

use std::ffi::OsStr;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use portable_pty::CommandBuilder;

use crate::error::LaunchError;

/// One external-process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    env: Vec<(String, String)>,
}

impl Invocation {
    /// Creates an invocation of `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
        }
    }

    /// Appends arguments, preserving their order.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the child's working directory.
    #[must_use]
    pub fn cwd(mut self, dir: Option<PathBuf>) -> Self {
        self.cwd = dir;
        self
    }

    /// Adds environment variables on top of the inherited environment.
    #[must_use]
    pub fn envs<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.env.extend(vars);
        self
    }

    /// The program as supplied by the caller.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments in the order they will reach the child.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Requested working directory, if any.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Extra environment variables.
    #[must_use]
    pub fn env(&self) -> &[(String, String)] {
        &self.env
    }

    /// Resolves the program to an absolute path of an executable file.
    ///
    /// A program containing a path separator is taken relative to the
    /// current directory; a bare name is looked up in `PATH`.
    ///
    /// # Errors
    ///
    /// Returns `LaunchError::NotFound` when nothing matches and
    /// `LaunchError::NotExecutable` when the only match lacks execute
    /// permission or is not a regular file.
    pub fn resolve_program(&self) -> Result<PathBuf, LaunchError> {
        let program = &self.program;
        if program.as_os_str().is_empty() {
            return Err(LaunchError::NotFound {
                program: program.clone(),
            });
        }

        if program.components().count() > 1 || program.is_absolute() {
            let candidate = std::path::absolute(program).unwrap_or_else(|_| program.clone());
            return match probe(&candidate) {
                Probe::Executable => Ok(candidate),
                Probe::NotExecutable => Err(LaunchError::NotExecutable { path: candidate }),
                Probe::Missing => Err(LaunchError::NotFound {
                    program: program.clone(),
                }),
            };
        }

        search_path(program.as_os_str(), std::env::var_os("PATH").as_deref())
    }

    /// Verifies the requested working directory exists.
    ///
    /// # Errors
    ///
    /// Returns `LaunchError::WorkingDirectory` if it is missing or not a
    /// directory.
    pub fn check_working_dir(&self) -> Result<(), LaunchError> {
        match &self.cwd {
            Some(dir) if !dir.is_dir() => Err(LaunchError::WorkingDirectory { path: dir.clone() }),
            _ => Ok(()),
        }
    }

    /// Builds the pty command for an already-resolved program path.
    ///
    /// The working directory falls back to the wrapper's own, because
    /// `portable-pty` would otherwise start the child in `$HOME`.
    #[must_use]
    pub fn command_builder(&self, program: &Path) -> CommandBuilder {
        let mut cmd = CommandBuilder::new(program);
        cmd.args(&self.args);

        if let Some(dir) = self.cwd.clone().or_else(|| std::env::current_dir().ok()) {
            cmd.cwd(dir);
        }

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        cmd
    }

    /// Shell-quoted rendition of the command line, for logs and `--dry-run`.
    #[must_use]
    pub fn describe(&self) -> String {
        let program = self.program.to_string_lossy();
        let words = std::iter::once(program.as_ref()).chain(self.args.iter().map(String::as_str));
        shlex::try_join(words).unwrap_or_else(|_| format!("{program} {:?}", self.args))
    }
}

enum Probe {
    Executable,
    NotExecutable,
    Missing,
}

fn probe(path: &Path) -> Probe {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.permissions().mode() & 0o111 != 0 => Probe::Executable,
        Ok(_) => Probe::NotExecutable,
        Err(_) => Probe::Missing,
    }
}

fn search_path(name: &OsStr, path_var: Option<&OsStr>) -> Result<PathBuf, LaunchError> {
    let mut not_executable = None;

    if let Some(path_var) = path_var {
        for dir in std::env::split_paths(path_var) {
            if dir.as_os_str().is_empty() {
                continue;
            }
            let candidate = dir.join(name);
            match probe(&candidate) {
                Probe::Executable => return Ok(candidate),
                Probe::NotExecutable if candidate.is_file() => {
                    not_executable.get_or_insert(candidate);
                }
                Probe::NotExecutable | Probe::Missing => {}
            }
        }
    }

    match not_executable {
        Some(path) => Err(LaunchError::NotExecutable { path }),
        None => Err(LaunchError::NotFound {
            program: PathBuf::from(name),
        }),
    }
}
