//! # RoboxPost Sequencer
//!
//! The stateful engine of RoboxPost: a two-pass transform that rewrites a
//! sliced G-code document for a Robox print head.
//!
//! - **Pass 1** resolves the active tool for every line (genuine
//!   position-0 tool changes versus spurious mid-line tokens) and rewrites
//!   temperature setpoints for the secondary extruder.
//! - **Pass 2** runs the valve state machine: retargets extrusion-axis
//!   letters per tool, inserts a valve-open-fill move before the first
//!   extrusion after a close, and replaces every retraction with a gradual
//!   valve-close taper spread over the preceding motion lines, splitting a
//!   segment geometrically when it would over-shoot the valve's chamber
//!   volume.
//!
//! All run state is scoped to one [`Sequencer::execute`] call; a
//! [`Sequencer`] can be shared across runs and the core profile/volume
//! models are read-only.

pub mod config;
pub mod sequencer;

pub use config::SequencerConfig;
pub use sequencer::Sequencer;
