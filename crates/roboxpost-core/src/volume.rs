//! Filament volume math and motion-segment splitting.
//!
//! Dispensed filament is modeled as a cylinder of fixed 1.75 diameter, so
//! an extrusion length converts directly into a volume. Segment splitting
//! reassigns the trailing portion of a motion segment to valve-taper duty
//! while preserving motion continuity.

use std::f64::consts::PI;

use crate::error::{SplitError, SplitResult};
use crate::line::CommandLine;

/// Fixed filament cross-section diameter.
pub const FILAMENT_DIAMETER: f64 = 1.75;

/// Volume dispensed by extruding `length` units of filament.
pub fn volume_from_length(length: f64) -> f64 {
    let radius = FILAMENT_DIAMETER / 2.0;
    radius * radius * PI * length
}

/// Round to a fixed number of decimal places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Build the motion line that splits the segment between `line_a` and
/// `line_b` at fraction `1 - coefficient` of the distance from A to B.
///
/// The emitted `G1 X.. Y.. E..` covers the leading part of the segment with
/// `coefficient` of the original extrusion; the trailing part is left to
/// the caller's valve taper. X/Y are rounded to 3 decimals, E to 4.
///
/// Fails when either endpoint lacks an X or Y numeral; such lines are not
/// motion lines and must not anchor an interpolation.
pub fn split_segment_by_coefficient(
    line_a: &CommandLine,
    line_b: &CommandLine,
    extrusion: f64,
    coefficient: f64,
) -> SplitResult<CommandLine> {
    let xa = line_a
        .numeric_value("X")
        .ok_or(SplitError::MissingField { axis: 'X' })?;
    let ya = line_a
        .numeric_value("Y")
        .ok_or(SplitError::MissingField { axis: 'Y' })?;
    let xb = line_b
        .numeric_value("X")
        .ok_or(SplitError::MissingField { axis: 'X' })?;
    let yb = line_b
        .numeric_value("Y")
        .ok_or(SplitError::MissingField { axis: 'Y' })?;

    let t = 1.0 - coefficient;
    let x = round_to(xa + (xb - xa) * t, 3);
    let y = round_to(ya + (yb - ya) * t, 3);
    let e = round_to(extrusion * coefficient, 4);

    let mut line = CommandLine::parse(&format!("G1 X{} Y{} E{}", x, y, e));
    line.add_comment("split result before valve closing");
    Ok(line)
}
