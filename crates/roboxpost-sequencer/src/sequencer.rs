//! The stateful two-pass valve sequencer.
//!
//! Pass 1 resolves the active tool for every line and rewrites temperature
//! setpoints for the secondary extruder. Pass 2 runs the valve state
//! machine: it retargets extrusion letters per tool, inserts the
//! valve-open-fill move before the first extrusion after a close, and
//! replaces each retraction with a gradual valve-close taper spread over
//! the preceding motion lines.

use std::str::FromStr;

use tracing::{debug, warn};

use roboxpost_core::{
    split_segment_by_coefficient, volume_from_length, CommandLine, Model, Printhead,
    ProfileResult, Tool, ValveState,
};

use crate::config::SequencerConfig;

/// Temperature-setpoint commands whose `S` field becomes `T` for the
/// secondary extruder.
const TEMPERATURE_COMMANDS: [&str; 3] = ["M103", "M104", "M109"];

/// Marker in a retraction's comment that exempts it from the valve taper.
const IGNORE_MARKER: &str = "_ignore";

/// Most recent motion lines examined to distribute one taper.
const LOOK_BACK_LINES: usize = 10;

/// Two-pass G-code transform for one print-head profile.
///
/// The sequencer itself holds only the immutable profile and the
/// close-valve flag; all run state (selected tool, valve state, output
/// buffer) is scoped to a single [`Sequencer::execute`] call, so one
/// instance can be shared across runs.
#[derive(Debug, Clone)]
pub struct Sequencer {
    printhead: Printhead,
    close_valve: bool,
}

impl Sequencer {
    /// Create a sequencer from a validated configuration.
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            printhead: Printhead::new(config.model),
            close_valve: config.close_valve,
        }
    }

    /// Create a sequencer from the profile name the host hands over.
    /// Unrecognized names fail construction.
    pub fn from_model_name(model_name: &str, close_valve: bool) -> ProfileResult<Self> {
        let model = Model::from_str(model_name)?;
        Ok(Self::new(SequencerConfig::new(model, close_valve)))
    }

    /// Two-line comment block identifying the run, intended to be prefixed
    /// to the output by the caller.
    pub fn header(&self) -> String {
        format!(
            "; Selected robox profile: {}, close valve \"{}\"\n; version {}\n",
            self.printhead.model(),
            self.close_valve,
            env!("CARGO_PKG_VERSION")
        )
    }

    /// Transform a complete document and render it back to text.
    pub fn execute(&self, data: &str) -> String {
        let lines = self.sequence(data);
        let rendered: Vec<String> = lines.iter().map(CommandLine::render).collect();
        rendered.join("\n")
    }

    /// Transform a complete document, returning the structured line
    /// sequence with tool and valve tags attached.
    pub fn sequence(&self, data: &str) -> Vec<CommandLine> {
        let mut lines: Vec<CommandLine> = data.lines().map(CommandLine::parse).collect();
        self.resolve_tools(&mut lines);
        self.apply_valve_routines(lines)
    }

    /// Pass 1: attribute a tool to every line, strip spurious mid-line tool
    /// tokens, and rewrite temperature setpoints for the secondary extruder.
    fn resolve_tools(&self, lines: &mut [CommandLine]) {
        let mut selected: Option<Tool> = None;
        for line in lines.iter_mut() {
            let mut change = claim_tool(line, Tool::T0);
            if change.is_none() {
                change = claim_tool(line, Tool::T1);
            }
            if let Some(tool) = change {
                debug!(%tool, "tool change");
                selected = Some(tool);
            }
            if line.tool.is_none() {
                line.tool = selected;
            }

            let is_temperature = line
                .command_type()
                .is_some_and(|first| TEMPERATURE_COMMANDS.contains(&first));
            if is_temperature && line.tool == Some(Tool::T1) {
                if let Some(index) = line.index_of_prefix("S") {
                    if index > 0 {
                        let setpoint = format!("T{}", &line.tokens()[index][1..]);
                        line.replace_at(index, setpoint);
                    }
                }
            }
        }
    }

    /// Pass 2: valve state machine and extrusion retargeting, appending
    /// into the output buffer that doubles as the taper look-back window.
    fn apply_valve_routines(&self, lines: Vec<CommandLine>) -> Vec<CommandLine> {
        let mut output: Vec<CommandLine> = Vec::with_capacity(lines.len());
        let mut tracked: Option<Tool> = None;
        let mut valve = ValveState::Undefined;

        for mut line in lines {
            if line.command_type() == Some("G1") {
                if line.tool != tracked {
                    debug!(from = ?tracked, to = ?line.tool, "tool boundary, valve forced closed");
                    valve = ValveState::Closed;
                }
                tracked = line.tool;
                let tool = line.tool.unwrap_or(Tool::T0);

                match extrusion_value(&line, 'E') {
                    Some(e)
                        if self.close_valve
                            && e < 0.0
                            && !line.comment().contains(IGNORE_MARKER) =>
                    {
                        // The retraction is fully consumed by the taper
                        // routine and never emitted.
                        self.close_valve_routine(&mut output, tool);
                        valve = ValveState::Closed;
                        let mut end =
                            CommandLine::comment_only(" valve routine end, retraction removed");
                        end.tool = Some(tool);
                        end.valve_tag = valve;
                        output.push(end);
                        continue;
                    }
                    Some(e) => {
                        if self.close_valve {
                            if e >= 0.0
                                && matches!(valve, ValveState::Closed | ValveState::Undefined)
                            {
                                // First extrusion since closing.
                                valve = ValveState::Opened;
                                let mut fill = self.printhead.valve_open_fill_command(tool);
                                fill.valve_tag = valve;
                                output.push(fill);
                                line.add_comment("added valve opening before");
                            }
                        } else {
                            valve = ValveState::Opened;
                        }
                        self.retarget_extrusion(&mut line, tool);
                    }
                    None => {}
                }
            }
            line.valve_tag = valve;
            output.push(line);
        }
        output
    }

    /// Rewrite the extrusion token's letter to the tool's extrusion axis.
    fn retarget_extrusion(&self, line: &mut CommandLine, tool: Tool) {
        let letter = self.printhead.extrusion_letter(tool);
        if let Some(index) = line.index_of_prefix("E") {
            let retargeted = format!("{}{}", letter, &line.tokens()[index][1..]);
            line.replace_at(index, retargeted);
        }
    }

    /// Taper the valve closed over the most recent motion lines.
    ///
    /// Walks the output buffer backward collecting up to 10 lines that
    /// carry both X and Y fields; the last-collected line only anchors the
    /// interpolation of its predecessor. Each processed line loses its
    /// extrusion token and gains a `B<fraction>` valve token; the one line
    /// that would over-shoot the chamber volume is split geometrically
    /// first so the valve closes over exactly the chamber's worth of
    /// motion.
    fn close_valve_routine(&self, output: &mut Vec<CommandLine>, tool: Tool) {
        let letter = self.printhead.extrusion_letter(tool);
        let collected: Vec<usize> = output
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, line)| {
                line.numeric_value("X").is_some() && line.numeric_value("Y").is_some()
            })
            .take(LOOK_BACK_LINES)
            .map(|(index, _)| index)
            .collect();

        let mut remaining = self.printhead.valve_volume(tool);

        for pair in collected.windows(2) {
            let (mut index, anchor) = (pair[0], pair[1]);

            let Some(extrusion) = extrusion_value(&output[index], letter) else {
                output[index].add_comment("no extrusion valve routine");
                continue;
            };
            let volume = volume_from_length(extrusion);

            if remaining - volume < 0.0 {
                // This line dispenses more than the chamber has left to
                // close over; split it and taper only the trailing part.
                output[index]
                    .add_comment(&format!("extrusion {}, volume {:.4}", extrusion, volume));
                let coefficient = remaining / volume;
                match split_segment_by_coefficient(
                    &output[index],
                    &output[anchor],
                    extrusion,
                    coefficient,
                ) {
                    Ok(mut split) => {
                        self.retarget_extrusion(&mut split, tool);
                        split.tool = Some(tool);
                        output.insert(index, split);
                        index += 1;
                    }
                    Err(err) => {
                        warn!(%err, "skipping split before valve closing");
                    }
                }
            }

            if let Some(token_index) = output[index].index_of_prefix(&letter.to_string()) {
                output[index].remove_at(token_index);
                output[index].add_comment(&format!("removed {}{}", letter, extrusion));
            }
            let fraction = self.printhead.valve_opening(tool, remaining);
            output[index].append_token(format!("B{}", fraction));
            output[index].add_comment("valve routine");

            remaining -= volume;
            if remaining < 0.0 {
                break;
            }
        }
    }
}

/// Genuine or spurious tool token handling for one line.
///
/// A tool token at position 0 is a real tool change and is returned; a
/// token anywhere else is removed and only tags the line. Either way the
/// line is attributed to the tool.
fn claim_tool(line: &mut CommandLine, tool: Tool) -> Option<Tool> {
    let index = line.index_of(tool.as_str())?;
    if index == 0 {
        line.tool = Some(tool);
        Some(tool)
    } else {
        line.remove_at(index);
        line.add_comment(&format!("removed {}", tool));
        line.tool = Some(tool);
        None
    }
}

/// Extrusion value of a line, `None` when the field is absent or sits at
/// token position 0 (which would be the command word itself).
fn extrusion_value(line: &CommandLine, letter: char) -> Option<f64> {
    let prefix = letter.to_string();
    match line.index_of_prefix(&prefix) {
        Some(index) if index > 0 => line.numeric_value(&prefix),
        _ => None,
    }
}
