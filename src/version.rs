//! Dotted platform version strings and their numeric ordering.
//!
//! Only the first two segments (major, minor) take part in comparisons; a
//! missing minor segment counts as `0`. Comparison is always numeric, so
//! `"10"` orders after `"6.1"`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

static VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)*$").expect("version pattern is valid"));

/// Version parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("Version string is empty")]
    Empty,

    #[error("Invalid version '{input}': expected dot-separated non-negative integers (e.g. \"6.1\")")]
    InvalidFormat { input: String },

    #[error("Version segment out of range in '{input}'")]
    SegmentOverflow { input: String },
}

/// The significant digits of one version segment.
///
/// Absent or non-numeric segments read as `"0"`; leading zeros are dropped so
/// segments of any length compare numerically by length, then digit by digit.
fn segment_digits(segment: Option<&str>) -> &str {
    match segment {
        Some(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            let digits = s.trim_start_matches('0');
            if digits.is_empty() {
                "0"
            } else {
                digits
            }
        }
        _ => "0",
    }
}

fn compare_segments(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Compare two dotted version strings numerically by major, then minor.
///
/// `Ordering::Less`/`Equal`/`Greater` correspond to `-1`/`0`/`1`.
///
/// ```rust
/// use mini_apps_guard::version::compare_versions;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare_versions("10", "6.1"), Ordering::Greater);
/// assert_eq!(compare_versions("6.1", "6.1.4"), Ordering::Equal);
/// assert_eq!(compare_versions("6.0", "6.1"), Ordering::Less);
/// ```
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut a = a.trim().split('.');
    let mut b = b.trim().split('.');
    let major = compare_segments(segment_digits(a.next()), segment_digits(b.next()));
    major.then_with(|| compare_segments(segment_digits(a.next()), segment_digits(b.next())))
}

/// A validated platform version.
///
/// Keeps the caller's original text for display; equality, ordering and
/// hashing look only at `(major, minor)`, so `6.1` and `6.1.0` are equal.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    major: u64,
    minor: u64,
}

impl Version {
    /// Parse a strict version string.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }
        if !VERSION_PATTERN.is_match(trimmed) {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let mut numbers = Vec::with_capacity(2);
        for segment in trimmed.split('.').take(2) {
            let n = segment
                .parse::<u64>()
                .map_err(|_| VersionError::SegmentOverflow {
                    input: input.to_string(),
                })?;
            numbers.push(n);
        }

        Ok(Self {
            raw: trimmed.to_string(),
            major: numbers[0],
            minor: numbers.get(1).copied().unwrap_or(0),
        })
    }

    /// Build a version from its two comparable segments.
    pub fn new(major: u64, minor: u64) -> Self {
        Self {
            raw: format!("{}.{}", major, minor),
            major,
            minor,
        }
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    /// The version text as it was supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this version is at least `min`.
    pub fn satisfies(&self, min: &Version) -> bool {
        self >= min
    }

    /// The version immediately preceding this one, assuming minor segments
    /// range over `0..=99`.
    ///
    /// `6.1` yields `6.0`, `6.0` yields `5.99`, and `0.0` has no predecessor.
    /// The `0..=99` range is a convention of the platform's published
    /// versions, not a general property of dotted versions: minors above 99
    /// still decrement normally, but a wrap always lands on `.99`.
    pub fn previous(&self) -> Option<Version> {
        match (self.major, self.minor) {
            (0, 0) => None,
            (major, 0) => Some(Version::new(major - 1, 99)),
            (major, minor) => Some(Version::new(major, minor - 1)),
        }
    }

    fn key(&self) -> (u64, u64) {
        (self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl TryFrom<&str> for Version {
    type Error = VersionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Version::parse(value)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // YAML hands over `10` as an integer and `7.10` as the float `7.1`.
        let value = serde_json::Value::deserialize(deserializer)?;
        let text = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) if n.is_f64() => {
                return Err(serde::de::Error::custom(format!(
                    "version {} is a number; write it as a quoted string such as \"7.10\" so the minor segment is kept",
                    n
                )))
            }
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected version string, found {}",
                    other
                )))
            }
        };
        Version::parse(&text).map_err(serde::de::Error::custom)
    }
}
