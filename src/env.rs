//! Execution environment detection.
//!
//! Guarded calls are only allowed inside a Mini App. How the host is
//! recognised is up to the [`EnvironmentDetector`] plugged into a
//! [`Scope`](crate::scope::Scope); this module ships a fixed detector, an
//! env-var detector and a marker-based detector.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the environment variable read by [`EnvVarDetector`].
pub const ENV_VAR: &str = "MINI_APPS_ENV";

/// Where the SDK is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Inside a Mini Apps host client.
    MiniApp,
    /// A host-less, server-side context.
    Server,
    /// A browser-like context with no Mini Apps host bridge.
    UnknownBrowser,
}

impl Environment {
    pub fn is_mini_app(&self) -> bool {
        matches!(self, Self::MiniApp)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MiniApp => "mini_app",
            Self::Server => "server",
            Self::UnknownBrowser => "unknown_browser",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown environment '{0}' (expected one of: mini_app, server, unknown_browser)")]
pub struct ParseEnvironmentError(pub String);

impl FromStr for Environment {
    type Err = ParseEnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "mini_app" | "miniapp" => Ok(Self::MiniApp),
            "server" => Ok(Self::Server),
            "unknown_browser" | "browser" => Ok(Self::UnknownBrowser),
            _ => Err(ParseEnvironmentError(s.to_string())),
        }
    }
}

/// Reports the current execution environment.
///
/// Implementations must be cheap, side-effect free and infallible.
pub trait EnvironmentDetector: Send + Sync {
    fn detect(&self) -> Environment;

    /// Short label used in logs.
    fn name(&self) -> &str {
        "custom"
    }
}

/// Always reports the same environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedEnvironment(pub Environment);

impl EnvironmentDetector for FixedEnvironment {
    fn detect(&self) -> Environment {
        self.0
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Reads the environment from a process environment variable.
///
/// A missing or unrecognised value reads as [`Environment::Server`].
#[derive(Debug, Clone)]
pub struct EnvVarDetector {
    var: String,
}

impl EnvVarDetector {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvVarDetector {
    fn default() -> Self {
        Self::new(ENV_VAR)
    }
}

impl EnvironmentDetector for EnvVarDetector {
    fn detect(&self) -> Environment {
        std::env::var(&self.var)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Environment::Server)
    }

    fn name(&self) -> &str {
        "env_var"
    }
}

type Probe = Box<dyn Fn() -> bool + Send + Sync>;

/// Tri-state detection from two ambient markers.
///
/// - host bridge marker present: [`Environment::MiniApp`]
/// - browser context without the marker: [`Environment::UnknownBrowser`]
/// - neither: [`Environment::Server`]
pub struct HostBridgeDetector {
    has_bridge: Probe,
    has_browser: Probe,
}

impl HostBridgeDetector {
    pub fn new<B, W>(has_bridge: B, has_browser: W) -> Self
    where
        B: Fn() -> bool + Send + Sync + 'static,
        W: Fn() -> bool + Send + Sync + 'static,
    {
        Self {
            has_bridge: Box::new(has_bridge),
            has_browser: Box::new(has_browser),
        }
    }
}

impl EnvironmentDetector for HostBridgeDetector {
    fn detect(&self) -> Environment {
        if (self.has_bridge)() {
            Environment::MiniApp
        } else if (self.has_browser)() {
            Environment::UnknownBrowser
        } else {
            Environment::Server
        }
    }

    fn name(&self) -> &str {
        "host_bridge"
    }
}

impl fmt::Debug for HostBridgeDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostBridgeDetector")
            .field("detected", &self.detect())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_parse_environment() {
        assert_eq!("mini_app".parse::<Environment>().unwrap(), Environment::MiniApp);
        assert_eq!("Mini-App".parse::<Environment>().unwrap(), Environment::MiniApp);
        assert_eq!(" SERVER ".parse::<Environment>().unwrap(), Environment::Server);
        assert_eq!(
            "unknown-browser".parse::<Environment>().unwrap(),
            Environment::UnknownBrowser
        );
        assert!("desktop".parse::<Environment>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for env in [Environment::MiniApp, Environment::Server, Environment::UnknownBrowser] {
            assert_eq!(env.to_string().parse::<Environment>().unwrap(), env);
        }
    }

    #[test]
    fn test_only_mini_app_is_mini_app() {
        assert!(Environment::MiniApp.is_mini_app());
        assert!(!Environment::Server.is_mini_app());
        assert!(!Environment::UnknownBrowser.is_mini_app());
    }

    #[test]
    fn test_fixed_detector() {
        assert_eq!(FixedEnvironment(Environment::UnknownBrowser).detect(), Environment::UnknownBrowser);
    }

    #[test]
    fn test_env_var_detector() {
        // Unique variable name so parallel tests don't interfere.
        let var = "MINI_APPS_GUARD_TEST_ENV_DETECTOR";
        let detector = EnvVarDetector::new(var);

        std::env::remove_var(var);
        assert_eq!(detector.detect(), Environment::Server);

        std::env::set_var(var, "mini_app");
        assert_eq!(detector.detect(), Environment::MiniApp);

        std::env::set_var(var, "garbage");
        assert_eq!(detector.detect(), Environment::Server);

        std::env::remove_var(var);
    }

    #[test]
    fn test_host_bridge_detector_states() {
        let bridge = Arc::new(AtomicBool::new(false));
        let browser = Arc::new(AtomicBool::new(false));
        let (b, w) = (Arc::clone(&bridge), Arc::clone(&browser));
        let detector = HostBridgeDetector::new(
            move || b.load(Ordering::SeqCst),
            move || w.load(Ordering::SeqCst),
        );

        assert_eq!(detector.detect(), Environment::Server);

        browser.store(true, Ordering::SeqCst);
        assert_eq!(detector.detect(), Environment::UnknownBrowser);

        bridge.store(true, Ordering::SeqCst);
        assert_eq!(detector.detect(), Environment::MiniApp);
    }
}
