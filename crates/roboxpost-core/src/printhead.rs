//! Print-head profiles for the supported Robox head variants.
//!
//! Two head layouts are recognized: the dual-independent-nozzle head and
//! the single-nozzle dual-material ("quick-fill") head. Each maps the two
//! logical tools to its own extrusion-axis letters, nozzle diameters, and
//! valve chamber volumes. The set is closed: lookups are pure matches over
//! enum pairs and unrecognized names fail at construction time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::line::CommandLine;
use crate::volume::round_to;

/// Recognized print-head models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Model {
    /// Dual independent nozzles.
    #[serde(rename = "cel_robox_dual")]
    Dual,
    /// Single nozzle, dual material.
    #[serde(rename = "cel_robox_quickfill")]
    QuickFill,
}

impl Model {
    /// The profile name as the slicing host spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Dual => "cel_robox_dual",
            Model::QuickFill => "cel_robox_quickfill",
        }
    }
}

impl FromStr for Model {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cel_robox_dual" => Ok(Model::Dual),
            "cel_robox_quickfill" => Ok(Model::QuickFill),
            other => Err(ProfileError::UnknownModel(other.to_string())),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical extruder identifiers, two per model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    /// Primary extruder.
    T0,
    /// Secondary extruder.
    T1,
}

impl Tool {
    /// The tool token as it appears in the G-code stream.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::T0 => "T0",
            Tool::T1 => "T1",
        }
    }
}

impl FromStr for Tool {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "T0" => Ok(Tool::T0),
            "T1" => Ok(Tool::T1),
            other => Err(ProfileError::UnknownTool(other.to_string())),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static per-model, per-tool print-head parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Printhead {
    model: Model,
}

impl Printhead {
    /// Create a profile for the given model.
    pub fn new(model: Model) -> Self {
        Self { model }
    }

    /// The model this profile describes.
    pub fn model(&self) -> Model {
        self.model
    }

    /// Axis letter the firmware expects in place of the generic `E` field.
    pub fn extrusion_letter(&self, tool: Tool) -> char {
        match (self.model, tool) {
            (Model::Dual, Tool::T0) => 'D',
            (Model::Dual, Tool::T1) => 'E',
            (Model::QuickFill, _) => 'E',
        }
    }

    /// Nozzle diameter for the tool.
    pub fn nozzle_diameter(&self, tool: Tool) -> f64 {
        match (self.model, tool) {
            (Model::Dual, _) => 0.4,
            (Model::QuickFill, Tool::T0) => 0.8,
            (Model::QuickFill, Tool::T1) => 0.3,
        }
    }

    /// Valve chamber volume for the tool.
    pub fn valve_volume(&self, tool: Tool) -> f64 {
        match (self.model, tool) {
            (Model::Dual, _) => 0.3,
            (Model::QuickFill, Tool::T0) => 0.6,
            (Model::QuickFill, Tool::T1) => 0.3,
        }
    }

    /// Synthesize the fixed-feed-rate move that opens the valve and primes
    /// the nozzle: `G1 B1 F150 E<0.75 x nozzle diameter>`.
    pub fn valve_open_fill_command(&self, tool: Tool) -> CommandLine {
        let fill = round_to(0.75 * self.nozzle_diameter(tool), 3);
        let mut line = CommandLine::parse(&format!("G1 B1 F150 E{}", fill));
        line.add_comment(&format!(
            "open valve and fill the nozzle {} with filament",
            tool
        ));
        line.tool = Some(tool);
        line
    }

    /// Valve opening fraction for a taper step: `1 - remaining/chamber`,
    /// rounded to 2 decimals. An exact-zero result is normalized to
    /// positive zero so the rendered token is `B0`, never `B-0`.
    pub fn valve_opening(&self, tool: Tool, remaining_volume: f64) -> f64 {
        let value = round_to(1.0 - remaining_volume / self.valve_volume(tool), 2);
        if value == 0.0 {
            0.0
        } else {
            value
        }
    }
}
