//! SDK 作用域：环境检测器与版本信号，以及进程级全局作用域。
//!
//! SDK scope: the environment detector and version signal a guard reads.
//!
//! The free functions in this module and [`guard::evaluate`](crate::guard::evaluate)
//! use a lazily created process-wide scope configured from the environment
//! (`MINI_APPS_ENV`, `MINI_APPS_VERSION`). Embedders and tests that need
//! isolation create their own [`Scope`].

use crate::config::SdkConfig;
use crate::env::{Environment, EnvironmentDetector, EnvVarDetector, FixedEnvironment};
use crate::guard::{self, GuardContext, GuardError};
use crate::signals::VersionSignal;
use crate::version::Version;
use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

static GLOBAL_SCOPE: Lazy<Scope> = Lazy::new(|| {
    let config = SdkConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!("ignoring invalid SDK environment configuration: {}", e);
        SdkConfig::default()
    });
    Scope::from_config(&config)
});

/// A point-in-time view of the signals a scope exposes to the guard chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeSnapshot {
    pub environment: Environment,
    pub detector: String,
    pub version: Option<Version>,
}

/// Environment detector plus version signal.
pub struct Scope {
    detector: ArcSwap<Box<dyn EnvironmentDetector>>,
    version: VersionSignal,
}

impl Scope {
    /// A fresh, uninitialized scope using `detector`.
    pub fn new<D>(detector: D) -> Self
    where
        D: EnvironmentDetector + 'static,
    {
        Self {
            detector: ArcSwap::from_pointee(Box::new(detector) as Box<dyn EnvironmentDetector>),
            version: VersionSignal::new(),
        }
    }

    /// Build a scope from configuration.
    ///
    /// A configured environment pins the detector; otherwise `MINI_APPS_ENV`
    /// is read on every detection. A configured version initializes the SDK.
    pub fn from_config(config: &SdkConfig) -> Self {
        let scope = match config.environment {
            Some(env) => Self::new(FixedEnvironment(env)),
            None => Self::new(EnvVarDetector::default()),
        };
        if let Some(version) = &config.version {
            scope.init(version.clone());
        }
        scope
    }

    /// The process-wide scope.
    pub fn global() -> &'static Scope {
        &GLOBAL_SCOPE
    }

    /// Ask the current detector where we are running.
    pub fn environment(&self) -> Environment {
        self.detector.load().detect()
    }

    /// Replace the environment detector.
    pub fn set_detector<D>(&self, detector: D)
    where
        D: EnvironmentDetector + 'static,
    {
        tracing::debug!(detector = detector.name(), "environment detector replaced");
        self.detector
            .store(Arc::new(Box::new(detector) as Box<dyn EnvironmentDetector>));
    }

    /// Pin the detector to a fixed environment.
    pub fn set_environment(&self, env: Environment) {
        self.set_detector(FixedEnvironment(env));
    }

    pub(crate) fn detector_handle(&self) -> Arc<Box<dyn EnvironmentDetector>> {
        self.detector.load_full()
    }

    pub(crate) fn restore_detector(&self, handle: Arc<Box<dyn EnvironmentDetector>>) {
        self.detector.store(handle);
    }

    pub fn version_signal(&self) -> &VersionSignal {
        &self.version
    }

    /// Record the negotiated platform version. May be called again to
    /// re-initialize.
    pub fn init(&self, version: Version) {
        tracing::debug!(version = %version, "SDK initialized");
        self.version.set(version);
    }

    pub fn is_initialized(&self) -> bool {
        self.version.is_set()
    }

    /// Return to the uninitialized state.
    pub fn reset(&self) {
        self.version.reset();
    }

    /// Capability predicate: the SDK is initialized with a version of at
    /// least `min_version`.
    pub fn is_supported(&self, min_version: &Version) -> bool {
        self.version
            .signal()
            .with(|current| guard::version_satisfies(current.as_ref(), min_version))
    }

    /// Run the guard chain for `context` in this scope.
    pub fn evaluate(&self, context: &GuardContext) -> Result<(), GuardError> {
        guard::evaluate_in(self, context)
    }

    pub fn snapshot(&self) -> ScopeSnapshot {
        let detector = self.detector.load();
        ScopeSnapshot {
            environment: detector.detect(),
            detector: detector.name().to_string(),
            version: self.version.get(),
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new(EnvVarDetector::default())
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("Scope")
            .field("environment", &snapshot.environment)
            .field("detector", &snapshot.detector)
            .field("version", &snapshot.version)
            .finish()
    }
}

/// Initialize the global scope with the negotiated platform version.
pub fn init(version: Version) {
    Scope::global().init(version);
}

/// Replace the global scope's environment detector.
pub fn set_env_detector<D>(detector: D)
where
    D: EnvironmentDetector + 'static,
{
    Scope::global().set_detector(detector);
}

/// The global scope's version signal.
pub fn version_signal() -> &'static VersionSignal {
    Scope::global().version_signal()
}
