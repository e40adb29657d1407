//! # RoboxPost Core
//!
//! Core building blocks for the RoboxPost G-code valve sequencer:
//!
//! - **Line Model** ([`line::CommandLine`]): one raw G-code line as an
//!   ordered token sequence plus trailing comment, with lossless rendering
//!   and token surgery.
//! - **Print-Head Profile** ([`printhead::Printhead`]): static per-model,
//!   per-tool parameters for the two supported Robox head variants.
//! - **Volume Model** ([`volume`]): filament length to dispensed volume
//!   conversion and geometric segment splitting for the valve taper.
//!
//! All of this is pure and stateless per call; the stateful two-pass
//! transform lives in the `roboxpost-sequencer` crate.

pub mod error;
pub mod line;
pub mod printhead;
pub mod volume;

pub use error::{Error, ProfileError, ProfileResult, SplitError, SplitResult};
pub use line::{CommandLine, ValveState};
pub use printhead::{Model, Printhead, Tool};
pub use volume::{split_segment_by_coefficient, volume_from_length, FILAMENT_DIAMETER};
