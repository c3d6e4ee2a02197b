use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Context carries the environment that credential providers and configs read from.
///
/// Library code never touches `std::env` directly, so a context built with
/// [`StaticEnv`] makes loading fully reproducible. A fresh context reads nothing until
/// an env is installed with [`Context::with_env`].
///
/// ```
/// use awssign_core::{Context, OsEnv, StaticEnv};
///
/// let process = Context::new().with_env(OsEnv);
/// let fixed = Context::new().with_env(StaticEnv::from_iter([("AWS_REGION", "us-east-1")]));
/// assert_eq!(fixed.env_var("AWS_REGION").as_deref(), Some("us-east-1"));
/// ```
#[derive(Clone, Debug)]
pub struct Context {
    env: Arc<dyn Env>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a context backed by [`NoopEnv`].
    pub fn new() -> Self {
        Self {
            env: Arc::new(NoopEnv),
        }
    }

    /// Install the env to read from.
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Read a variable. Empty values are reported as unset.
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.var(key).filter(|v| !v.is_empty())
    }

    /// Snapshot of every variable of the env.
    pub fn env_vars(&self) -> HashMap<String, String> {
        self.env.vars()
    }
}

/// Env is the source of environment variables.
pub trait Env: Debug + Send + Sync + 'static {
    /// Get a variable, `None` if it's absent or not valid utf-8.
    fn var(&self, key: &str) -> Option<String>;

    /// Get all variables.
    fn vars(&self) -> HashMap<String, String>;
}

/// OsEnv reads the variables of the current process.
#[derive(Debug, Copy, Clone, Default)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key)?.into_string().ok()
    }

    fn vars(&self) -> HashMap<String, String> {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }
}

/// StaticEnv serves a fixed set of variables, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    envs: HashMap<String, String>,
}

impl StaticEnv {
    /// Set a variable.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticEnv {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            envs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Env for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.envs.get(key).cloned()
    }

    fn vars(&self) -> HashMap<String, String> {
        self.envs.clone()
    }
}

/// NoopEnv has no variable at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnv;

impl Env for NoopEnv {
    fn var(&self, _: &str) -> Option<String> {
        None
    }

    fn vars(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}
