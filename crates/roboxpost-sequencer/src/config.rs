//! Sequencer configuration as handed over by the host plugin layer.

use serde::{Deserialize, Serialize};

use roboxpost_core::Model;

/// Settings for one sequencer instance.
///
/// The host passes these as a JSON blob; an unrecognized model name fails
/// deserialization, so a sequencer can never be built against an unknown
/// print head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Print-head profile to sequence for.
    pub model: Model,
    /// Whether retractions trigger the gradual valve-close taper. When
    /// false the valve is treated as always open and only the extrusion
    /// letters are retargeted.
    #[serde(default)]
    pub close_valve: bool,
}

impl SequencerConfig {
    /// Create a configuration.
    pub fn new(model: Model, close_valve: bool) -> Self {
        Self { model, close_valve }
    }
}
