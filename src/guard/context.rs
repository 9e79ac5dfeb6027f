//! Guard configuration for a single call site

use crate::signals::MountSignal;
use crate::version::Version;
use std::fmt;

/// Name of the guarded operation and, for component methods, its owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSite {
    method: String,
    component: Option<String>,
}

impl CallSite {
    /// A free SDK function, e.g. `init()`.
    pub fn function(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            component: None,
        }
    }

    /// A method on an SDK component, e.g. `BackButton.show()`.
    pub fn method(component: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            component: Some(component.into()),
        }
    }

    pub fn method_name(&self) -> &str {
        &self.method
    }

    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }

    /// `"method"` for component methods, `"function"` otherwise.
    pub fn qualifier(&self) -> &'static str {
        if self.component.is_some() {
            "method"
        } else {
            "function"
        }
    }

    /// Common prefix of every guard failure message for this call site,
    /// e.g. `Unable to call the Bar.foo() method:`.
    pub fn error_prefix(&self) -> String {
        format!("Unable to call the {}() {}:", self, self.qualifier())
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.component {
            Some(component) => write!(f, "{}.{}", component, self.method),
            None => f.write_str(&self.method),
        }
    }
}

/// Minimum platform version for a call, plus the optional mount state of
/// the component that owns it.
#[derive(Debug, Clone)]
pub struct VersionRequirement {
    min_version: Version,
    mounted: Option<MountSignal>,
}

impl VersionRequirement {
    pub fn new(min_version: Version) -> Self {
        Self {
            min_version,
            mounted: None,
        }
    }

    /// Also require the component behind `signal` to be mounted.
    pub fn with_mount_signal(mut self, signal: MountSignal) -> Self {
        self.mounted = Some(signal);
        self
    }

    pub fn min_version(&self) -> &Version {
        &self.min_version
    }

    pub fn mount_signal(&self) -> Option<&MountSignal> {
        self.mounted.as_ref()
    }
}

/// What a guarded call site requires before it may run.
///
/// `Basic` sites only need a Mini Apps environment and an initialized SDK.
/// `Versioned` sites additionally need a minimum platform version and may
/// need their component mounted.
#[derive(Debug, Clone)]
pub enum GuardContext {
    Basic(CallSite),
    Versioned(CallSite, VersionRequirement),
}

impl GuardContext {
    pub fn basic(site: CallSite) -> Self {
        Self::Basic(site)
    }

    pub fn versioned(site: CallSite, requirement: VersionRequirement) -> Self {
        Self::Versioned(site, requirement)
    }

    pub fn call_site(&self) -> &CallSite {
        match self {
            Self::Basic(site) | Self::Versioned(site, _) => site,
        }
    }

    pub fn requirement(&self) -> Option<&VersionRequirement> {
        match self {
            Self::Basic(_) => None,
            Self::Versioned(_, req) => Some(req),
        }
    }

    pub fn min_version(&self) -> Option<&Version> {
        self.requirement().map(VersionRequirement::min_version)
    }

    pub fn mount_signal(&self) -> Option<&MountSignal> {
        self.requirement().and_then(VersionRequirement::mount_signal)
    }
}
