//! Safety harness for guarded operations.
//!
//! [`SafetyCheck`] walks a guarded call through every rung of the guard
//! chain by driving its scope's detector, version signal and mount signal,
//! and records whether the call failed (or stopped failing) exactly where
//! it should. Scope and mount state are restored when the run finishes.
//!
//! ```rust
//! use mini_apps_guard::guard::{CallSite, GuardContext, GuardedFn, VersionRequirement};
//! use mini_apps_guard::scope::Scope;
//! use mini_apps_guard::signals::MountSignal;
//! use mini_apps_guard::testing::SafetyCheck;
//! use mini_apps_guard::version::Version;
//!
//! let scope = Scope::default();
//! let mounted = MountSignal::new();
//! let show = GuardedFn::new(
//!     GuardContext::versioned(
//!         CallSite::method("BackButton", "show"),
//!         VersionRequirement::new(Version::parse("6.1").unwrap()).with_mount_signal(mounted),
//!     ),
//!     |_: ()| (),
//! )
//! .in_scope(&scope);
//!
//! let report = SafetyCheck::for_guarded(&show).run();
//! assert!(report.is_passed(), "{report}");
//! ```

use crate::env::{Environment, EnvironmentDetector};
use crate::error_code::GuardErrorKind;
use crate::guard::{GuardContext, GuardError, GuardedFn};
use crate::scope::Scope;
use crate::signals::MountSignal;
use crate::version::Version;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// What a step expects from the guarded call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "expect", rename_all = "snake_case")]
pub enum Expectation {
    /// Fail with exactly this error.
    Fails { code: String, message: String },
    /// Must not fail with this kind (any other outcome is fine).
    NotKind { code: String },
    /// Succeed.
    Passes,
    /// `is_supported()` returns this value.
    Supported { value: bool },
}

/// Observed result of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Observed {
    Passed,
    Failed { code: String, message: String },
    Supported { value: bool },
}

impl From<&Result<(), GuardError>> for Observed {
    fn from(result: &Result<(), GuardError>) -> Self {
        match result {
            Ok(()) => Observed::Passed,
            Err(e) => Observed::Failed {
                code: e.code().to_string(),
                message: e.message().to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SafetyStep {
    pub name: String,
    pub expected: Expectation,
    pub observed: Observed,
    pub passed: bool,
}

/// Outcome of a [`SafetyCheck`] run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SafetyReport {
    pub call: String,
    pub steps: Vec<SafetyStep>,
}

impl SafetyReport {
    pub fn is_passed(&self) -> bool {
        self.steps.iter().all(|s| s.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &SafetyStep> {
        self.steps.iter().filter(|s| !s.passed)
    }

    pub fn step(&self, name: &str) -> Option<&SafetyStep> {
        self.steps.iter().find(|s| s.name == name)
    }
}

impl fmt::Display for SafetyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "safety report for {}:", self.call)?;
        for step in &self.steps {
            let mark = if step.passed { "ok" } else { "FAILED" };
            writeln!(f, "  [{}] {}", mark, step.name)?;
            if !step.passed {
                writeln!(f, "      expected: {:?}", step.expected)?;
                writeln!(f, "      observed: {:?}", step.observed)?;
            }
        }
        Ok(())
    }
}

type Probe<'a> = Box<dyn Fn() -> Result<(), GuardError> + 'a>;

/// Drives a guarded call through the whole precondition ladder.
pub struct SafetyCheck<'a> {
    scope: &'a Scope,
    context: GuardContext,
    probe: Probe<'a>,
}

impl<'a> SafetyCheck<'a> {
    /// Check `context` directly against `scope`.
    pub fn new(scope: &'a Scope, context: GuardContext) -> Self {
        let probe_context = context.clone();
        Self {
            scope,
            context,
            probe: Box::new(move || scope.evaluate(&probe_context)),
        }
    }

    /// Check a guarded operation without invoking its body.
    pub fn for_guarded<F>(guarded: &'a GuardedFn<'a, F>) -> Self {
        Self {
            scope: guarded.scope(),
            context: guarded.context().clone(),
            probe: Box::new(move || guarded.check()),
        }
    }

    /// Use `probe` to invoke the call, e.g. a closure calling the real
    /// operation with fixed arguments.
    pub fn with_probe<P>(mut self, probe: P) -> Self
    where
        P: Fn() -> Result<(), GuardError> + 'a,
    {
        self.probe = Box::new(probe);
        self
    }

    /// Run every applicable step, then restore scope and mount state.
    pub fn run(&self) -> SafetyReport {
        let _restore = RestoreState::capture(self.scope, self.context.mount_signal());
        let mut report = SafetyReport {
            call: self.context.call_site().to_string(),
            steps: Vec::new(),
        };
        self.run_steps(&mut report);
        report
    }

    fn run_steps(&self, report: &mut SafetyReport) {
        let site = self.context.call_site();
        let scope = self.scope;
        let version = scope.version_signal();

        // Outside Mini Apps, even with every other requirement met.
        scope.reset();
        if let Some(m) = self.context.mount_signal() {
            m.mount();
        }
        scope.set_environment(Environment::UnknownBrowser);
        self.expect_error(report, "unknown_env_outside_mini_apps", GuardError::unknown_env(site));
        scope.set_environment(Environment::MiniApp);
        self.expect_not(report, "no_unknown_env_inside_mini_apps", GuardErrorKind::UnknownEnv);

        scope.set_environment(Environment::Server);
        self.expect_error(report, "unknown_env_on_server", GuardError::unknown_env(site));

        scope.set_environment(Environment::MiniApp);
        if let Some(m) = self.context.mount_signal() {
            m.unmount();
        }
        version.reset();
        self.expect_error(report, "not_initialized", GuardError::not_initialized(site));
        version.set(Version::new(10, 0));
        self.expect_not(report, "initialized", GuardErrorKind::NotInitialized);

        let Some(min) = self.context.min_version().cloned() else {
            return;
        };

        if let Some(prev) = min.previous() {
            version.set(prev.clone());
            self.expect_error(
                report,
                "not_supported_below_min_version",
                GuardError::not_supported(site, &prev),
            );
        }
        version.set(min.clone());
        self.expect_not(report, "supported_at_min_version", GuardErrorKind::NotSupported);

        if let Some(m) = self.context.mount_signal() {
            m.unmount();
            self.expect_error(report, "not_mounted", GuardError::not_mounted(site));
            m.mount();
            self.expect_passes(report, "passes_when_mounted");
        }

        self.check_is_supported(report, &min);
    }

    fn check_is_supported(&self, report: &mut SafetyReport, min: &Version) {
        let version = self.scope.version_signal();

        version.reset();
        self.expect_supported(report, "is_supported_false_when_uninitialized", min, false);
        if let Some(prev) = min.previous() {
            version.set(prev);
            self.expect_supported(report, "is_supported_false_below_min_version", min, false);
        }
        version.set(min.clone());
        self.expect_supported(report, "is_supported_true_at_min_version", min, true);
        version.set(Version::new(min.major().saturating_add(1), 0));
        self.expect_supported(report, "is_supported_true_above_min_version", min, true);
    }

    fn expect_error(&self, report: &mut SafetyReport, name: &str, expected: GuardError) {
        let result = (self.probe)();
        let passed = result.as_ref().err() == Some(&expected);
        report.steps.push(SafetyStep {
            name: name.to_string(),
            expected: Expectation::Fails {
                code: expected.code().to_string(),
                message: expected.message().to_string(),
            },
            observed: Observed::from(&result),
            passed,
        });
    }

    fn expect_not(&self, report: &mut SafetyReport, name: &str, kind: GuardErrorKind) {
        let result = (self.probe)();
        let passed = !matches!(&result, Err(e) if e.kind() == kind);
        report.steps.push(SafetyStep {
            name: name.to_string(),
            expected: Expectation::NotKind {
                code: kind.code().to_string(),
            },
            observed: Observed::from(&result),
            passed,
        });
    }

    fn expect_passes(&self, report: &mut SafetyReport, name: &str) {
        let result = (self.probe)();
        report.steps.push(SafetyStep {
            name: name.to_string(),
            expected: Expectation::Passes,
            observed: Observed::from(&result),
            passed: result.is_ok(),
        });
    }

    fn expect_supported(&self, report: &mut SafetyReport, name: &str, min: &Version, value: bool) {
        let actual = self.scope.is_supported(min);
        report.steps.push(SafetyStep {
            name: name.to_string(),
            expected: Expectation::Supported { value },
            observed: Observed::Supported { value: actual },
            passed: actual == value,
        });
    }
}

/// Puts a scope and mount signal back the way it found them, even when a
/// probe panics mid-run.
struct RestoreState<'a> {
    scope: &'a Scope,
    detector: Arc<Box<dyn EnvironmentDetector>>,
    version: Option<Version>,
    mount: Option<(MountSignal, bool)>,
}

impl<'a> RestoreState<'a> {
    fn capture(scope: &'a Scope, mount: Option<&MountSignal>) -> Self {
        Self {
            scope,
            detector: scope.detector_handle(),
            version: scope.version_signal().get(),
            mount: mount.map(|m| (m.clone(), m.get())),
        }
    }
}

impl Drop for RestoreState<'_> {
    fn drop(&mut self) {
        self.scope.restore_detector(Arc::clone(&self.detector));
        match self.version.take() {
            Some(v) => self.scope.version_signal().set(v),
            None => self.scope.version_signal().reset(),
        }
        if let Some((signal, was)) = &self.mount {
            signal.set(*was);
        }
    }
}
