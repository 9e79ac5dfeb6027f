//! 守卫错误码：定义 4 个稳定的 ERR_* 错误码及其优先级。
//!
//! Guard error codes: the four stable failure kinds a guarded call can produce.
//!
//! Each kind carries a canonical `ERR_*` code string that callers and tests
//! can match on without parsing the human-readable message.
//!
//! ## Precedence
//!
//! | Rank | Kind             | Code                  | Trigger                     |
//! |------|------------------|-----------------------|-----------------------------|
//! | 0    | `UnknownEnv`     | `ERR_UNKNOWN_ENV`     | not running inside Mini Apps |
//! | 1    | `NotInitialized` | `ERR_NOT_INITIALIZED` | version signal unset        |
//! | 2    | `NotSupported`   | `ERR_NOT_SUPPORTED`   | current version < minimum   |
//! | 3    | `NotMounted`     | `ERR_NOT_MOUNTED`     | component not mounted       |
//!
//! ## Example
//!
//! ```rust
//! use mini_apps_guard::error_code::GuardErrorKind;
//!
//! let kind = GuardErrorKind::from_code("ERR_NOT_SUPPORTED").unwrap();
//! assert_eq!(kind, GuardErrorKind::NotSupported);
//! assert_eq!(kind.code(), "ERR_NOT_SUPPORTED");
//! assert!(GuardErrorKind::UnknownEnv < kind);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure kind produced by the guard chain.
///
/// Variants are declared in evaluation order, so the derived `Ord` matches
/// the precedence of the checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardErrorKind {
    /// The call was made outside a Mini App (server or plain browser).
    UnknownEnv,
    /// The SDK has not been initialized; no platform version is known.
    NotInitialized,
    /// The current platform version is below the call's minimum version.
    NotSupported,
    /// The owning component has not been mounted.
    NotMounted,
}

impl GuardErrorKind {
    /// All kinds in evaluation order.
    pub const ALL: [GuardErrorKind; 4] = [
        Self::UnknownEnv,
        Self::NotInitialized,
        Self::NotSupported,
        Self::NotMounted,
    ];

    /// Returns the canonical code string (e.g., `"ERR_UNKNOWN_ENV"`).
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownEnv => "ERR_UNKNOWN_ENV",
            Self::NotInitialized => "ERR_NOT_INITIALIZED",
            Self::NotSupported => "ERR_NOT_SUPPORTED",
            Self::NotMounted => "ERR_NOT_MOUNTED",
        }
    }

    /// Returns the snake_case name (e.g., `"not_mounted"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::UnknownEnv => "unknown_env",
            Self::NotInitialized => "not_initialized",
            Self::NotSupported => "not_supported",
            Self::NotMounted => "not_mounted",
        }
    }

    /// Position of the check that produces this kind in the guard chain.
    #[inline]
    pub fn precedence(&self) -> u8 {
        match self {
            Self::UnknownEnv => 0,
            Self::NotInitialized => 1,
            Self::NotSupported => 2,
            Self::NotMounted => 3,
        }
    }

    /// Parses a canonical code string back into a kind.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }
}

impl fmt::Display for GuardErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
