//! Engraver device models
//!
//! The discriminants match the engine's `EpilogMachine` enumeration and are
//! passed across the C boundary unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::os::raw::c_int;
use std::str::FromStr;

/// Laser engraver model understood by the print engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
#[allow(non_camel_case_types)]
pub enum DeviceModel {
    Pro24 = 0,
    Pro32,
    Pro36,
    Pro48,
    Edge12,
    Edge24,
    Edge36,
    Maker12,
    Maker24,
    Maker36,
    G100_4x4,
    G100_6x6,
    G2,
    Fusion32M2,
    Fusion40M2,
    Fusion32,
    Fusion32Fibermark,
    Fusion40,
    Fibermark24,
    Fibermark24S2,
    Zing16,
    Zing24,
    Helix24,
    Mini18,
    Mini24,
    Ext36,
}

impl DeviceModel {
    /// Every model, in engine enumeration order
    pub const ALL: [DeviceModel; 26] = [
        Self::Pro24,
        Self::Pro32,
        Self::Pro36,
        Self::Pro48,
        Self::Edge12,
        Self::Edge24,
        Self::Edge36,
        Self::Maker12,
        Self::Maker24,
        Self::Maker36,
        Self::G100_4x4,
        Self::G100_6x6,
        Self::G2,
        Self::Fusion32M2,
        Self::Fusion40M2,
        Self::Fusion32,
        Self::Fusion32Fibermark,
        Self::Fusion40,
        Self::Fibermark24,
        Self::Fibermark24S2,
        Self::Zing16,
        Self::Zing24,
        Self::Helix24,
        Self::Mini18,
        Self::Mini24,
        Self::Ext36,
    ];

    /// Value passed to the engine for this model
    pub fn as_raw(self) -> c_int {
        self as c_int
    }

    /// Catalogue key used in configuration files, e.g. `fusionpro24`
    pub fn catalogue_key(self) -> &'static str {
        match self {
            Self::Pro24 => "fusionpro24",
            Self::Pro32 => "fusionpro32",
            Self::Pro36 => "fusionpro36",
            Self::Pro48 => "fusionpro48",
            Self::Edge12 => "fusionedge12",
            Self::Edge24 => "fusionedge24",
            Self::Edge36 => "fusionedge36",
            Self::Maker12 => "fusionmaker12",
            Self::Maker24 => "fusionmaker24",
            Self::Maker36 => "fusionmaker36",
            Self::G100_4x4 => "g100_4x4",
            Self::G100_6x6 => "g100_6x6",
            Self::G2 => "g2",
            Self::Fusion32M2 => "fusion32m2",
            Self::Fusion40M2 => "fusion40m2",
            Self::Fusion32 => "fusion32",
            Self::Fusion32Fibermark => "fusion32fibermark",
            Self::Fusion40 => "fusion40",
            Self::Fibermark24 => "fibermark24",
            Self::Fibermark24S2 => "fibermark24s2",
            Self::Zing16 => "zing16",
            Self::Zing24 => "zing24",
            Self::Helix24 => "helix24",
            Self::Mini18 => "mini18",
            Self::Mini24 => "mini24",
            Self::Ext36 => "ext36",
        }
    }

    fn variant_name(self) -> &'static str {
        match self {
            Self::Pro24 => "Pro24",
            Self::Pro32 => "Pro32",
            Self::Pro36 => "Pro36",
            Self::Pro48 => "Pro48",
            Self::Edge12 => "Edge12",
            Self::Edge24 => "Edge24",
            Self::Edge36 => "Edge36",
            Self::Maker12 => "Maker12",
            Self::Maker24 => "Maker24",
            Self::Maker36 => "Maker36",
            Self::G100_4x4 => "G100_4x4",
            Self::G100_6x6 => "G100_6x6",
            Self::G2 => "G2",
            Self::Fusion32M2 => "Fusion32M2",
            Self::Fusion40M2 => "Fusion40M2",
            Self::Fusion32 => "Fusion32",
            Self::Fusion32Fibermark => "Fusion32Fibermark",
            Self::Fusion40 => "Fusion40",
            Self::Fibermark24 => "Fibermark24",
            Self::Fibermark24S2 => "Fibermark24S2",
            Self::Zing16 => "Zing16",
            Self::Zing24 => "Zing24",
            Self::Helix24 => "Helix24",
            Self::Mini18 => "Mini18",
            Self::Mini24 => "Mini24",
            Self::Ext36 => "Ext36",
        }
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.variant_name())
    }
}

impl FromStr for DeviceModel {
    type Err = String;

    /// Accepts catalogue keys (`fusionmaker24`, `G100 4x4`) and variant
    /// names (`Maker24`), ignoring case, spaces and underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        if wanted.is_empty() {
            return Err("Device model name is empty".to_string());
        }
        Self::ALL
            .iter()
            .copied()
            .find(|m| normalize(m.catalogue_key()) == wanted)
            .or_else(|| {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|m| normalize(m.variant_name()) == wanted)
            })
            .ok_or_else(|| format!("Unknown device model: {}", s))
    }
}
