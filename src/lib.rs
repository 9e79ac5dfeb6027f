//! Mini Apps 守卫库：平台调用前置条件守卫链与版本能力检查。
//!
//! # mini-apps-guard
//!
//! Precondition guard chain and capability checks for Mini Apps platform
//! SDK calls.
//!
//! ## Overview
//!
//! Every platform-feature call in the SDK must pass a fixed, ordered chain
//! of checks before it runs: it must be made inside a Mini App, after the
//! SDK has been initialized, on a platform version that supports it, and,
//! for component methods, while the component is mounted. A violation
//! produces a [`GuardError`] with a stable kind and a deterministic message.
//!
//! ## Quick Start
//!
//! ```rust
//! use mini_apps_guard::{CallSite, Environment, FixedEnvironment, GuardContext, GuardedFn,
//!     MountSignal, Scope, Version, VersionRequirement};
//! use mini_apps_guard::error_code::GuardErrorKind;
//!
//! let scope = Scope::new(FixedEnvironment(Environment::MiniApp));
//! let mounted = MountSignal::new();
//! let expand = GuardedFn::new(
//!     GuardContext::versioned(
//!         CallSite::method("Viewport", "expand"),
//!         VersionRequirement::new(Version::parse("6.1")?).with_mount_signal(mounted.clone()),
//!     ),
//!     |_: ()| "expanded",
//! )
//! .in_scope(&scope);
//!
//! assert_eq!(expand.call(()).unwrap_err().kind(), GuardErrorKind::NotInitialized);
//!
//! scope.init(Version::parse("6.1")?);
//! mounted.mount();
//! assert_eq!(expand.call(())?, "expanded");
//! # Ok::<(), mini_apps_guard::Error>(())
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`guard`] | Guard chain evaluator, contexts, guarded functions |
//! | [`version`] | Version parsing and numeric comparison |
//! | [`signals`] | Observable version and mount cells |
//! | [`env`] | Execution environment detection |
//! | [`scope`] | Detector + version signal bundle and the global scope |
//! | [`config`] | Configuration from env vars, YAML or JSON |
//! | [`error_code`] | Stable guard failure kinds and codes |
//! | [`testing`] | Safety harness for guarded operations |

pub mod config;
pub mod env;
pub mod error_code;
pub mod guard;
pub mod scope;
pub mod signals;
pub mod testing;
pub mod version;

// Re-export main types for convenience
pub use config::SdkConfig;
pub use env::{Environment, EnvironmentDetector, FixedEnvironment};
pub use error_code::GuardErrorKind;
pub use guard::{
    evaluate, is_supported, CallSite, GuardContext, GuardError, GuardedFn, VersionRequirement,
};
pub use scope::{init, set_env_detector, version_signal, Scope};
pub use signals::{MountSignal, Signal, VersionSignal};
pub use version::{compare_versions, Version};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
