//! # RoboxPost
//!
//! A G-code valve sequencer for CEL Robox dual-nozzle and quick-fill print
//! heads. RoboxPost rewrites the command stream produced by a slicing
//! engine so that the single physical valve gating the two filament paths
//! is opened and closed at the right points, tool-change and temperature
//! commands are translated into the head's vocabulary, and retractions are
//! replaced by a gradual valve-close taper spread over the preceding
//! motion segments.
//!
//! ## Architecture
//!
//! RoboxPost is organized as a workspace with two crates:
//!
//! 1. **roboxpost-core** - Line model, print-head profiles, volume math
//! 2. **roboxpost-sequencer** - The stateful two-pass transform
//!
//! ## Usage
//!
//! ```rust
//! use roboxpost::{Sequencer, SequencerConfig, Model};
//!
//! let sequencer = Sequencer::new(SequencerConfig::new(Model::Dual, true));
//! let output = sequencer.execute("G1 X10 Y0 E5\nG1 X20 Y0 E5");
//! let document = format!("{}{}", sequencer.header(), output);
//! assert!(document.starts_with("; Selected robox profile: cel_robox_dual"));
//! ```

pub use roboxpost_core::{
    split_segment_by_coefficient, volume_from_length, CommandLine, Error, Model, Printhead,
    ProfileError, ProfileResult, SplitError, SplitResult, Tool, ValveState, FILAMENT_DIAMETER,
};

pub use roboxpost_sequencer::{Sequencer, SequencerConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
