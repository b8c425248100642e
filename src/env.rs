use std::collections::HashMap;
use std::env as stdenv;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// The process environment handed to every launched program.
///
/// The environment contains:
/// - `vars`: environment variables visible to launched programs, including `PATH`.
///   Names and values are kept as `OsString`, so variables that are not valid
///   UTF-8 are passed through unchanged.
/// - `current_dir`: the working directory launched programs start in.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<OsString, OsString>,
    /// The working directory for launched programs.
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// This copies variables from `std::env::vars_os()` and initializes `current_dir`
    /// from `std::env::current_dir()`.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_vars(stdenv::vars_os(), current_dir)
    }

    /// Build an environment from explicit variables and working directory.
    pub fn with_vars<I, K, V>(vars: I, current_dir: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            current_dir: current_dir.into(),
        }
    }

    /// Get the value of an environment variable from `self.vars`.
    pub fn get_var(&self, key: &str) -> Option<OsString> {
        self.vars.get(OsStr::new(key)).cloned()
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<OsString>, val: impl Into<OsString>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Directories searched for programs, as a `PATH`-style list.
    ///
    /// Empty when `vars` has no `PATH`, so only explicit paths can be launched.
    pub fn search_paths(&self) -> OsString {
        self.get_var("PATH").unwrap_or_default()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    #[test]
    fn test_env_set_and_get_var() {
        let mut env = Environment::with_vars(Vec::<(OsString, OsString)>::new(), "/");

        // initially absent
        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);

        env.set_var("KEY", "VALUE");

        assert_eq!(env.get_var("KEY"), Some(OsString::from("VALUE")));
    }

    #[test]
    fn test_env_reads_from_process_env() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
    }

    #[test]
    fn test_search_paths_prefers_own_vars() {
        let mut env = Environment::new();
        env.set_var("PATH", "/opt/minish/bin");
        assert_eq!(env.search_paths(), "/opt/minish/bin");
    }

    #[test]
    fn test_process_env_is_not_consulted() {
        // HOME is set in the process but not in this environment.
        let env = Environment::with_vars([("ONLY", "this")], "/");
        assert_eq!(env.get_var("HOME"), None);
        assert!(env.search_paths().is_empty());
    }

    #[test]
    fn test_non_utf8_variables_are_kept() {
        let raw = OsString::from_vec(b"\xff\xfe".to_vec());
        let env = Environment::with_vars(
            [
                (OsString::from("MINISH_RAW"), raw.clone()),
                (OsString::from("PATH"), OsString::from("/bin")),
            ],
            "/",
        );
        assert_eq!(env.get_var("MINISH_RAW"), Some(raw));
        assert_eq!(env.search_paths(), "/bin");
    }
}
