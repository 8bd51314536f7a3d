use std::fmt;

use serde::{Serialize, Serializer};

/// 1-indexed row sequence number, rendered as `EVT` + 7 zero-padded digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EVT{:07}", self.0)
    }
}

impl Serialize for EventId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Simplified bounding-box approximation of the major crustal plates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TectonicPlate {
    Antarctic,
    Pacific,
    Eurasian,
    #[serde(rename = "North American")]
    NorthAmerican,
    #[serde(rename = "South American")]
    SouthAmerican,
    #[serde(rename = "Indo-Australian")]
    IndoAustralian,
    Other,
}

impl TectonicPlate {
    pub const ALL: [TectonicPlate; 7] = [
        TectonicPlate::Antarctic,
        TectonicPlate::Pacific,
        TectonicPlate::Eurasian,
        TectonicPlate::NorthAmerican,
        TectonicPlate::SouthAmerican,
        TectonicPlate::IndoAustralian,
        TectonicPlate::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TectonicPlate::Antarctic => "Antarctic",
            TectonicPlate::Pacific => "Pacific",
            TectonicPlate::Eurasian => "Eurasian",
            TectonicPlate::NorthAmerican => "North American",
            TectonicPlate::SouthAmerican => "South American",
            TectonicPlate::IndoAustralian => "Indo-Australian",
            TectonicPlate::Other => "Other",
        }
    }
}

/// Severity bucket derived from magnitude alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AlertLevel {
    Green,
    Yellow,
    Orange,
    Red,
}

impl AlertLevel {
    pub const ALL: [AlertLevel; 4] =
        [AlertLevel::Green, AlertLevel::Yellow, AlertLevel::Orange, AlertLevel::Red];

    pub fn label(self) -> &'static str {
        match self {
            AlertLevel::Green => "Green",
            AlertLevel::Yellow => "Yellow",
            AlertLevel::Orange => "Orange",
            AlertLevel::Red => "Red",
        }
    }
}

/// Coarse latitude band label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Region {
    Oceania,
    #[serde(rename = "South America")]
    SouthAmerica,
    Africa,
    Asia,
    Europe,
}

impl Region {
    pub const ALL: [Region; 5] =
        [Region::Oceania, Region::SouthAmerica, Region::Africa, Region::Asia, Region::Europe];

    pub fn label(self) -> &'static str {
        match self {
            Region::Oceania => "Oceania",
            Region::SouthAmerica => "South America",
            Region::Africa => "Africa",
            Region::Asia => "Asia",
            Region::Europe => "Europe",
        }
    }
}

macro_rules! display_via_label {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_via_label!(TectonicPlate, AlertLevel, Region);
