// src/units.rs

//! Units of measure and life cycle phases
//!
//! Units are kept as short symbolic strings (`kg`, `m3`, `m2`, ...) the way
//! process data sets deliver them. Only a handful are known by name; any
//! other symbol is carried through verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{AsRefStr, Display, EnumString};

/// Maximum length of a unit symbol
pub const MAX_UNIT_LEN: usize = 10;

/// A unit of measure
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Unit(String);

impl Unit {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn kg() -> Self {
        Self::new("kg")
    }

    pub fn m() -> Self {
        Self::new("m")
    }

    pub fn m2() -> Self {
        Self::new("m2")
    }

    pub fn m3() -> Self {
        Self::new("m3")
    }

    pub fn piece() -> Self {
        Self::new("Stück")
    }

    pub fn kwh() -> Self {
        Self::new("kWh")
    }

    pub fn mj() -> Self {
        Self::new("MJ")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Area units allow the surface of an element to be read from its quantity
    pub fn is_area(&self) -> bool {
        self.0 == "m2"
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Unit {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Life cycle phase an LCA process is attributed to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LifeCyclePhase {
    Production,
    Maintenance,
    /// Operational energy demand of the building
    Operation,
    EndOfLife,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_unit_basics() {
        assert_eq!(Unit::kg().as_str(), "kg");
        assert_eq!(Unit::from("m3"), Unit::m3());
        assert!(Unit::m2().is_area());
        assert!(!Unit::m3().is_area());
        assert_eq!(format!("{}", Unit::piece()), "Stück");
    }

    #[test]
    fn test_phase_round_trip() {
        assert_eq!(LifeCyclePhase::EndOfLife.as_ref(), "end_of_life");
        assert_eq!(
            LifeCyclePhase::from_str("operation").unwrap(),
            LifeCyclePhase::Operation
        );
        assert!(LifeCyclePhase::from_str("usage").is_err());
    }
}
