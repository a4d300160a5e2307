/*!
 * Backend Configuration
 *
 * Names the native backends and records which ones the build selected
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Native lock backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    /// Critical-section style (reentrant, exclusive only)
    CriticalSection,
    /// POSIX pthread mutex / rwlock
    #[cfg(unix)]
    Pthread,
    /// parking_lot raw locks (portable)
    ParkingLot,
}

/// Backend name did not match any known backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown lock backend '{0}'")]
pub struct ParseBackendError(pub String);

impl BackendType {
    /// Stable name, matches `RawExclusive::name` / `RawShared::name`
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CriticalSection => "critical_section",
            #[cfg(unix)]
            Self::Pthread => "pthread",
            Self::ParkingLot => "parking_lot",
        }
    }

    /// Whether the backend offers reader/writer acquisition
    pub const fn supports_shared(self) -> bool {
        !matches!(self, Self::CriticalSection)
    }

    /// Every backend compiled into this build
    pub fn available() -> &'static [BackendType] {
        #[cfg(unix)]
        {
            &[Self::CriticalSection, Self::Pthread, Self::ParkingLot]
        }
        #[cfg(not(unix))]
        {
            &[Self::CriticalSection, Self::ParkingLot]
        }
    }

    /// Backend behind `ExclusiveLock` when no type parameter is given
    pub const fn default_exclusive() -> Self {
        if cfg!(feature = "parking-lot") {
            return Self::ParkingLot;
        }
        #[cfg(windows)]
        {
            Self::CriticalSection
        }
        #[cfg(unix)]
        {
            Self::Pthread
        }
        #[cfg(not(any(unix, windows)))]
        {
            Self::ParkingLot
        }
    }

    /// Backend behind `ReadWriteLock` when no type parameter is given
    pub const fn default_shared() -> Self {
        if cfg!(feature = "parking-lot") {
            return Self::ParkingLot;
        }
        #[cfg(unix)]
        {
            Self::Pthread
        }
        #[cfg(not(unix))]
        {
            Self::ParkingLot
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendType {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "critical_section" | "cs" => Ok(Self::CriticalSection),
            #[cfg(unix)]
            "pthread" | "posix" => Ok(Self::Pthread),
            "parking_lot" | "parking" => Ok(Self::ParkingLot),
            _ => Err(ParseBackendError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("critical_section".parse(), Ok(BackendType::CriticalSection));
        assert_eq!("Parking-Lot".parse(), Ok(BackendType::ParkingLot));
        assert!("spin".parse::<BackendType>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for backend in BackendType::available() {
            assert_eq!(backend.to_string().parse(), Ok(*backend));
        }
    }

    #[test]
    fn test_critical_section_is_exclusive_only() {
        assert!(!BackendType::CriticalSection.supports_shared());
        assert!(BackendType::ParkingLot.supports_shared());
    }

    #[test]
    fn test_defaults_are_available() {
        assert!(BackendType::available().contains(&BackendType::default_exclusive()));
        assert!(BackendType::default_shared().supports_shared());
    }
}
