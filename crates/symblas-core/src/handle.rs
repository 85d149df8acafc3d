//! Execution context shared by every kernel call.
//!
//! A `Handle` carries the call-independent state: scalar pointer mode,
//! numerics-check level, the parallel dispatch threshold and an optional
//! dedicated rayon pool. It is cheap to clone and holds no per-call state.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{BlasError, CheckNumerics, PointerMode, Result};

/// Environment variable overriding [`HandleConfig::pointer_mode`].
pub const ENV_POINTER_MODE: &str = "SYMBLAS_POINTER_MODE";
/// Environment variable overriding [`HandleConfig::check_numerics`].
pub const ENV_CHECK_NUMERICS: &str = "SYMBLAS_CHECK_NUMERICS";
/// Environment variable overriding [`HandleConfig::num_threads`].
pub const ENV_NUM_THREADS: &str = "SYMBLAS_NUM_THREADS";

/// Below this many work items (n² · batch_count) launches run on the calling thread.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1 << 14;

/// Serializable handle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleConfig {
    pub pointer_mode: PointerMode,
    pub check_numerics: CheckNumerics,
    /// Size of a dedicated thread pool; `None` uses the global rayon pool.
    pub num_threads: Option<usize>,
    pub parallel_threshold: usize,
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            pointer_mode: PointerMode::Host,
            check_numerics: CheckNumerics::NONE,
            num_threads: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl HandleConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| BlasError::Config(format!("invalid handle config: {e}")))
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| BlasError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Defaults overlaid with the `SYMBLAS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` (usually the process environment).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(mode) = lookup(ENV_POINTER_MODE) {
            self.pointer_mode = mode.parse()?;
        }
        if let Some(level) = lookup(ENV_CHECK_NUMERICS) {
            self.check_numerics = level.parse()?;
        }
        if let Some(threads) = lookup(ENV_NUM_THREADS) {
            let threads: usize = threads
                .trim()
                .parse()
                .map_err(|_| BlasError::Config(format!("{ENV_NUM_THREADS}: expected a count, got '{threads}'")))?;
            self.num_threads = (threads > 0).then_some(threads);
        }
        Ok(self)
    }
}

/// Execution context for kernel calls.
#[derive(Clone)]
pub struct Handle {
    pointer_mode: PointerMode,
    check_numerics: CheckNumerics,
    parallel_threshold: usize,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl Handle {
    /// Host pointer mode, no numerics checks, global rayon pool.
    pub fn new() -> Self {
        Self {
            pointer_mode: PointerMode::Host,
            check_numerics: CheckNumerics::NONE,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            pool: None,
        }
    }

    pub fn with_config(config: &HandleConfig) -> Result<Self> {
        let pool = match config.num_threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("symblas-{i}"))
                    .build()
                    .map_err(|e| BlasError::Config(format!("thread pool: {e}")))?;
                Some(Arc::new(pool))
            }
            None => None,
        };
        tracing::debug!(
            pointer_mode = %config.pointer_mode,
            check_numerics = config.check_numerics.bits(),
            num_threads = ?config.num_threads,
            "created handle"
        );
        Ok(Self {
            pointer_mode: config.pointer_mode,
            check_numerics: config.check_numerics,
            parallel_threshold: config.parallel_threshold,
            pool,
        })
    }

    /// Handle configured from the `SYMBLAS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::with_config(&HandleConfig::from_env()?)
    }

    pub fn pointer_mode(&self) -> PointerMode {
        self.pointer_mode
    }

    pub fn set_pointer_mode(&mut self, mode: PointerMode) {
        self.pointer_mode = mode;
    }

    pub fn check_numerics(&self) -> CheckNumerics {
        self.check_numerics
    }

    pub fn set_check_numerics(&mut self, mode: CheckNumerics) {
        self.check_numerics = mode;
    }

    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    pub fn set_parallel_threshold(&mut self, threshold: usize) {
        self.parallel_threshold = threshold;
    }

    /// Whether a launch over `work` items should fan out to the pool.
    pub fn is_parallel(&self, work: usize) -> bool {
        work >= self.parallel_threshold
    }

    /// Worker threads available to launches on this handle.
    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Run `f` inside this handle's pool (or directly on the global pool).
    pub fn install<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("pointer_mode", &self.pointer_mode)
            .field("check_numerics", &self.check_numerics)
            .field("parallel_threshold", &self.parallel_threshold)
            .field("dedicated_pool", &self.pool.is_some())
            .finish()
    }
}
