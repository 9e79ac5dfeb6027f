//! 守卫链模块：按固定顺序检查环境、初始化、版本与挂载状态。
//!
//! Guard chain: the ordered preconditions every platform-feature call must
//! pass before it runs.
//!
//! # Guard Chain
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! | Step | Check          | Applies to            | Failure            |
//! |------|----------------|-----------------------|--------------------|
//! | 1    | Environment    | every call            | `ERR_UNKNOWN_ENV`     |
//! | 2    | Initialization | every call            | `ERR_NOT_INITIALIZED` |
//! | 3    | Version        | versioned calls       | `ERR_NOT_SUPPORTED`   |
//! | 4    | Mount          | calls with a mount signal | `ERR_NOT_MOUNTED` |
//!
//! Environment comes first because the other signals mean nothing outside a
//! Mini App; the mount check comes last so it never masks a more
//! fundamental problem.
//!
//! ## Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`GuardContext`] | What a call site requires (basic or versioned) |
//! | [`CallSite`] | Method and optional component name used in messages |
//! | [`VersionRequirement`] | Minimum version plus optional [`MountSignal`](crate::signals::MountSignal) |
//! | [`GuardError`] | Typed failure with stable kind and formatted message |
//! | [`GuardedFn`] | An operation wrapped with its guard |
//! | [`is_supported`] | Capability predicate for version-gated calls |
//!
//! ## Example
//!
//! ```rust
//! use mini_apps_guard::env::{Environment, FixedEnvironment};
//! use mini_apps_guard::error_code::GuardErrorKind;
//! use mini_apps_guard::guard::{CallSite, GuardContext, VersionRequirement};
//! use mini_apps_guard::scope::Scope;
//! use mini_apps_guard::signals::MountSignal;
//! use mini_apps_guard::version::Version;
//!
//! let scope = Scope::new(FixedEnvironment(Environment::MiniApp));
//! let mounted = MountSignal::new();
//! let ctx = GuardContext::versioned(
//!     CallSite::method("Bar", "foo"),
//!     VersionRequirement::new(Version::parse("6.1").unwrap()).with_mount_signal(mounted.clone()),
//! );
//!
//! let err = scope.evaluate(&ctx).unwrap_err();
//! assert_eq!(err.kind(), GuardErrorKind::NotInitialized);
//!
//! scope.init(Version::parse("6.1").unwrap());
//! mounted.mount();
//! assert!(scope.evaluate(&ctx).is_ok());
//! ```

mod capability;
mod context;
mod error;
mod function;

pub use capability::{is_supported, version_satisfies};
pub use context::{CallSite, GuardContext, VersionRequirement};
pub use error::GuardError;
pub use function::GuardedFn;

use crate::scope::Scope;
use tracing::{debug, trace};

/// Run the guard chain for `context` against `scope`.
///
/// Reads the detector, the version signal and the mount signal (if any);
/// never writes to any of them.
pub fn evaluate_in(scope: &Scope, context: &GuardContext) -> Result<(), GuardError> {
    let result = run_checks(scope, context);
    match &result {
        Ok(()) => trace!(call = %context.call_site(), "guard passed"),
        Err(e) => debug!(call = %context.call_site(), code = e.code(), "guard rejected call"),
    }
    result
}

/// Run the guard chain for `context` against the global scope.
pub fn evaluate(context: &GuardContext) -> Result<(), GuardError> {
    evaluate_in(Scope::global(), context)
}

fn run_checks(scope: &Scope, context: &GuardContext) -> Result<(), GuardError> {
    let site = context.call_site();

    if !scope.environment().is_mini_app() {
        return Err(GuardError::unknown_env(site));
    }

    let Some(current) = scope.version_signal().get() else {
        return Err(GuardError::not_initialized(site));
    };

    if let Some(requirement) = context.requirement() {
        if !version_satisfies(Some(&current), requirement.min_version()) {
            return Err(GuardError::not_supported(site, &current));
        }
        if let Some(mounted) = requirement.mount_signal() {
            if !mounted.get() {
                return Err(GuardError::not_mounted(site));
            }
        }
    }

    Ok(())
}
