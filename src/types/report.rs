//! Fault report entries and defect categories

use serde::{Deserialize, Serialize};

use super::{DeviationSet, MonitoredFeature};

/// One flagged sensor from the fault detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultReportEntry {
    pub sensor: String,
    /// "Fault detected in <sensor>: <labels>"
    pub message: String,
    /// Features whose relative deviation exceeded the threshold, in
    /// [`MonitoredFeature::ALL`] order
    pub deviant: Vec<MonitoredFeature>,
    /// Pairs for all monitored features, whichever triggered
    pub deviation: DeviationSet,
}

/// Likely defect behind a flagged sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefectCategory {
    /// Kurtosis rule
    MisalignmentOrGearToothCrack,
    /// Crest factor rule
    EccentricityOrLocalDefect,
    /// RMS rule
    UnbalanceOrLooseness,
    /// Flagged, but no rule matched
    #[default]
    Unknown,
}

impl DefectCategory {
    pub fn is_classified(self) -> bool {
        self != Self::Unknown
    }
}

impl std::fmt::Display for DefectCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MisalignmentOrGearToothCrack => write!(f, "Misalignment / Gear Tooth Crack"),
            Self::EccentricityOrLocalDefect => write!(f, "Eccentricity or Local Defect"),
            Self::UnbalanceOrLooseness => write!(f, "Unbalance or Looseness"),
            Self::Unknown => write!(f, "Defect Unknown"),
        }
    }
}

/// Interpreter output for one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretedEntry {
    pub sensor: String,
    pub category: DefectCategory,
    pub message: String,
    pub deviation: DeviationSet,
}
