//! Machine settings descriptor.
//!
//! The engine reads a JSON document naming the job, the firmware target and an
//! ordered list of processes. Each process selects the drawing paths it applies
//! to with a colour filter on their stroke.

use lamicoid_core::SerializeError;
use serde::{Deserialize, Serialize};

use crate::model::Color;

/// Firmware version written when none is configured.
pub const DEFAULT_FIRMWARE_VERSION: &str = "1.0.9.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaserType {
    #[default]
    Co2,
    Fiber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngraveDirection {
    #[default]
    Down,
    Up,
}

/// Which paint of a path a colour filter matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFilterType {
    Stroke,
    Fill,
}

/// Selects drawing paths by colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_of", rename = "color_filter")]
pub struct ColorFilter {
    pub colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_filter_type: Option<ColorFilterType>,
}

impl ColorFilter {
    pub fn new(colors: &[Color]) -> Self {
        Self {
            colors: colors.iter().map(|c| c.as_str().to_string()).collect(),
            color_filter_type: None,
        }
    }

    pub fn stroke(colors: &[Color]) -> Self {
        Self {
            color_filter_type: Some(ColorFilterType::Stroke),
            ..Self::new(colors)
        }
    }

    pub fn matches(&self, color: &str) -> bool {
        self.colors.iter().any(|c| c.eq_ignore_ascii_case(color))
    }
}

/// Raster engraving of the selected paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngraveProcess {
    pub name: String,
    pub speed: f64,
    pub power: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    pub resolution: u32,
    pub dithering: String,
    pub engrave_direction: EngraveDirection,
    pub unidirectional: bool,
    pub precision_sync: bool,
    pub laser_type: LaserType,
    pub air_assist: bool,
    pub cycles: u32,
    pub offset: f64,
    pub filter: ColorFilter,
}

impl Default for EngraveProcess {
    fn default() -> Self {
        Self {
            name: "P1_Engrave_Custom_Text".to_string(),
            speed: 70.0,
            power: 50.0,
            frequency: None,
            resolution: 300,
            dithering: "none".to_string(),
            engrave_direction: EngraveDirection::Down,
            unidirectional: false,
            precision_sync: false,
            laser_type: LaserType::Co2,
            air_assist: false,
            cycles: 1,
            offset: 0.0,
            filter: ColorFilter::new(&[Color::engrave()]),
        }
    }
}

/// Vector cutting along the selected paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorProcess {
    pub name: String,
    pub speed: f64,
    pub power: f64,
    pub frequency: f64,
    pub laser_type: LaserType,
    pub air_assist: bool,
    pub cycles: u32,
    pub offset: f64,
    pub beziers: bool,
    pub vector_sorting: String,
    pub filter: ColorFilter,
}

impl Default for VectorProcess {
    fn default() -> Self {
        Self {
            name: "P2_Cut_Lamicoid_Outline".to_string(),
            speed: 10.0,
            power: 90.0,
            frequency: 50.0,
            laser_type: LaserType::Co2,
            air_assist: false,
            cycles: 1,
            offset: 0.0,
            beziers: true,
            vector_sorting: "inside_out".to_string(),
            filter: ColorFilter::stroke(&[Color::cut()]),
        }
    }
}

/// One step of the job, applied in list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_of")]
pub enum Process {
    #[serde(rename = "engrave_process")]
    Engrave(EngraveProcess),
    #[serde(rename = "vector_process")]
    Vector(VectorProcess),
}

impl Process {
    pub fn name(&self) -> &str {
        match self {
            Self::Engrave(p) => &p.name,
            Self::Vector(p) => &p.name,
        }
    }

    pub fn filter(&self) -> &ColorFilter {
        match self {
            Self::Engrave(p) => &p.filter,
            Self::Vector(p) => &p.filter,
        }
    }

    /// True for a vector process that picks up the cut outline colour.
    pub fn cuts_outline(&self) -> bool {
        matches!(self, Self::Vector(p) if p.filter.matches(Color::CUT))
    }

    fn validate(&self) -> Result<(), SerializeError> {
        let check = |parameter: &'static str, value: f64, min: f64, max: f64| {
            if (min..=max).contains(&value) {
                Ok(())
            } else {
                Err(SerializeError::ParameterOutOfRange {
                    process: self.name().to_string(),
                    parameter,
                    value,
                    min,
                    max,
                })
            }
        };

        let (speed, power, frequency, cycles) = match self {
            Self::Engrave(p) => (p.speed, p.power, p.frequency, p.cycles),
            Self::Vector(p) => (p.speed, p.power, Some(p.frequency), p.cycles),
        };
        check("speed", speed, 0.0, 100.0)?;
        check("power", power, 0.0, 100.0)?;
        if let Some(frequency) = frequency {
            check("frequency", frequency, 1.0, 100.0)?;
        }
        check("cycles", f64::from(cycles), 1.0, 100.0)?;

        if self.filter().colors.is_empty() {
            return Err(SerializeError::EmptyFilter {
                process: self.name().to_string(),
            });
        }
        Ok(())
    }
}

/// The complete settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSettings {
    pub job_name: String,
    pub firmware_version: String,
    pub autofocus: String,
    pub copies: u32,
    pub processes: Vec<Process>,
}

impl JobSettings {
    pub fn new(
        job_name: impl Into<String>,
        firmware_version: impl Into<String>,
        processes: Vec<Process>,
    ) -> Self {
        Self {
            job_name: job_name.into(),
            firmware_version: firmware_version.into(),
            autofocus: "off".to_string(),
            copies: 1,
            processes,
        }
    }

    /// Settings for a label: an optional engrave pass for the text, then the
    /// outline cut.
    pub fn for_lamicoid(
        job_name: impl Into<String>,
        firmware_version: impl Into<String>,
        engrave: Option<EngraveProcess>,
        cut: VectorProcess,
    ) -> Self {
        let mut processes = Vec::with_capacity(2);
        if let Some(engrave) = engrave {
            processes.push(Process::Engrave(engrave));
        }
        processes.push(Process::Vector(cut));
        Self::new(job_name, firmware_version, processes)
    }

    pub fn validate(&self) -> Result<(), SerializeError> {
        if self.job_name.trim().is_empty() {
            return Err(SerializeError::EmptyJobName);
        }
        if self.processes.is_empty() {
            return Err(SerializeError::NoProcesses);
        }
        for process in &self.processes {
            process.validate()?;
        }
        if !self.processes.iter().any(Process::cuts_outline) {
            return Err(SerializeError::MissingCutProcess);
        }
        Ok(())
    }

    /// Validates and encodes the document.
    pub fn to_json(&self) -> Result<String, SerializeError> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self).map_err(|e| SerializeError::Encoding {
            reason: e.to_string(),
        })?;
        tracing::debug!(
            "Serialized settings for job '{}' with {} processes",
            self.job_name,
            self.processes.len()
        );
        Ok(json)
    }
}

/// Serializes a settings document for `processes`, in the given order.
pub fn serialize_settings(
    job_name: &str,
    firmware_version: &str,
    processes: &[Process],
) -> Result<String, SerializeError> {
    JobSettings::new(job_name, firmware_version, processes.to_vec()).to_json()
}
