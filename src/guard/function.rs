//! Operations wrapped with their guard

use super::context::GuardContext;
use super::error::GuardError;
use crate::scope::Scope;
use std::fmt;

/// An SDK operation that only runs once its guard chain passes.
///
/// Calling it evaluates the guard against its scope first; a rejection is
/// returned unchanged and the operation is not invoked.
///
/// ```rust
/// use mini_apps_guard::env::{Environment, FixedEnvironment};
/// use mini_apps_guard::guard::{CallSite, GuardContext, GuardedFn, VersionRequirement};
/// use mini_apps_guard::scope::Scope;
/// use mini_apps_guard::version::Version;
///
/// let scope = Scope::new(FixedEnvironment(Environment::MiniApp));
/// let share = GuardedFn::new(
///     GuardContext::versioned(
///         CallSite::function("shareStory"),
///         VersionRequirement::new(Version::parse("7.8").unwrap()),
///     ),
///     |url: &str| format!("shared {url}"),
/// )
/// .in_scope(&scope);
///
/// assert_eq!(share.is_supported(), Some(false));
/// scope.init(Version::parse("7.8").unwrap());
/// assert_eq!(share.call("https://t.me").unwrap(), "shared https://t.me");
/// ```
pub struct GuardedFn<'s, F> {
    context: GuardContext,
    scope: &'s Scope,
    op: F,
}

impl<F> GuardedFn<'static, F> {
    /// Guard `op` with `context`, evaluated against the global scope.
    pub fn new(context: GuardContext, op: F) -> Self {
        Self {
            context,
            scope: Scope::global(),
            op,
        }
    }
}

impl<'s, F> GuardedFn<'s, F> {
    /// Evaluate the guard against `scope` instead.
    pub fn in_scope<'a>(self, scope: &'a Scope) -> GuardedFn<'a, F> {
        GuardedFn {
            context: self.context,
            scope,
            op: self.op,
        }
    }

    pub fn context(&self) -> &GuardContext {
        &self.context
    }

    pub fn scope(&self) -> &'s Scope {
        self.scope
    }

    /// Run the guard chain without invoking the operation.
    pub fn check(&self) -> Result<(), GuardError> {
        self.scope.evaluate(&self.context)
    }

    /// Capability predicate for version-gated operations.
    ///
    /// `None` when the operation has no minimum version and therefore
    /// nothing to ask about.
    pub fn is_supported(&self) -> Option<bool> {
        self.context
            .min_version()
            .map(|min| self.scope.is_supported(min))
    }

    /// Guard, then invoke the operation.
    pub fn call<A, R>(&self, args: A) -> Result<R, GuardError>
    where
        F: Fn(A) -> R,
    {
        self.check()?;
        Ok((self.op)(args))
    }

    /// Guard, then invoke a fallible operation.
    pub fn try_call<A, R>(&self, args: A) -> crate::Result<R>
    where
        F: Fn(A) -> crate::Result<R>,
    {
        self.check()?;
        (self.op)(args)
    }
}

impl<F> fmt::Debug for GuardedFn<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedFn")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Environment, FixedEnvironment};
    use crate::error_code::GuardErrorKind;
    use crate::guard::{CallSite, VersionRequirement};
    use crate::signals::MountSignal;
    use crate::version::Version;
    use crate::{Error, ErrorContext};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_rejected_call_does_not_run_operation() {
        let scope = Scope::new(FixedEnvironment(Environment::Server));
        let calls = AtomicUsize::new(0);
        let f = GuardedFn::new(GuardContext::basic(CallSite::function("init")), |_: ()| {
            calls.fetch_add(1, Ordering::SeqCst);
        })
        .in_scope(&scope);

        let err = f.call(()).unwrap_err();
        assert_eq!(err.kind(), GuardErrorKind::UnknownEnv);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_accepted_call_runs_operation() {
        let scope = Scope::new(FixedEnvironment(Environment::MiniApp));
        scope.init(Version::parse("6.0").unwrap());
        let double = GuardedFn::new(GuardContext::basic(CallSite::function("double")), |x: i32| x * 2)
            .in_scope(&scope);
        assert_eq!(double.call(21).unwrap(), 42);
    }

    #[test]
    fn test_is_supported_only_for_versioned() {
        let scope = Scope::new(FixedEnvironment(Environment::MiniApp));
        let basic = GuardedFn::new(GuardContext::basic(CallSite::function("a")), |_: ()| ())
            .in_scope(&scope);
        assert_eq!(basic.is_supported(), None);

        let mounted = MountSignal::new();
        let versioned = GuardedFn::new(
            GuardContext::versioned(
                CallSite::method("Bar", "foo"),
                VersionRequirement::new(Version::parse("6.1").unwrap())
                    .with_mount_signal(mounted.clone()),
            ),
            |_: ()| (),
        )
        .in_scope(&scope);
        assert_eq!(versioned.is_supported(), Some(false));
        scope.init(Version::parse("6.1").unwrap());
        // Mount state does not affect the predicate.
        assert_eq!(versioned.is_supported(), Some(true));
        assert_eq!(versioned.check().unwrap_err().kind(), GuardErrorKind::NotMounted);
    }

    #[test]
    fn test_try_call_lifts_guard_error() {
        let scope = Scope::new(FixedEnvironment(Environment::MiniApp));
        let f = GuardedFn::new(GuardContext::basic(CallSite::function("load")), |ok: bool| {
            if ok {
                Ok(1u8)
            } else {
                Err(Error::configuration_with_context("boom", ErrorContext::new()))
            }
        })
        .in_scope(&scope);

        let err = f.try_call(true).unwrap_err();
        assert_eq!(err.as_guard().unwrap().kind(), GuardErrorKind::NotInitialized);

        scope.init(Version::parse("6.0").unwrap());
        assert_eq!(f.try_call(true).unwrap(), 1);
        assert!(matches!(f.try_call(false), Err(Error::Configuration { .. })));
    }
}
