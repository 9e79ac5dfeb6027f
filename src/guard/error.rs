//! Guard failure type

use super::context::CallSite;
use crate::error_code::GuardErrorKind;
use crate::version::Version;

/// A rejected guarded call.
///
/// `Display` yields the full message, e.g.
/// `Unable to call the Bar.foo() method: it can't be called outside Mini Apps`.
/// Match on [`kind`](Self::kind) rather than on the text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct GuardError {
    kind: GuardErrorKind,
    message: String,
    call_site: CallSite,
}

impl GuardError {
    fn with_reason(kind: GuardErrorKind, site: &CallSite, reason: String) -> Self {
        Self {
            kind,
            message: format!("{} {}", site.error_prefix(), reason),
            call_site: site.clone(),
        }
    }

    pub fn unknown_env(site: &CallSite) -> Self {
        Self::with_reason(
            GuardErrorKind::UnknownEnv,
            site,
            "it can't be called outside Mini Apps".to_string(),
        )
    }

    pub fn not_initialized(site: &CallSite) -> Self {
        Self::with_reason(
            GuardErrorKind::NotInitialized,
            site,
            "the SDK was not initialized. Use the SDK init() function".to_string(),
        )
    }

    pub fn not_supported(site: &CallSite, current: &Version) -> Self {
        Self::with_reason(
            GuardErrorKind::NotSupported,
            site,
            format!("it is unsupported in Mini Apps version {}", current),
        )
    }

    /// A call site without a component names the generic `component` owner.
    pub fn not_mounted(site: &CallSite) -> Self {
        Self::with_reason(
            GuardErrorKind::NotMounted,
            site,
            format!(
                "the component is not mounted. Use the {}.mount() method",
                site.component().unwrap_or("component")
            ),
        )
    }

    pub fn kind(&self) -> GuardErrorKind {
        self.kind
    }

    /// Canonical `ERR_*` code of the kind.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn call_site(&self) -> &CallSite {
        &self.call_site
    }
}
