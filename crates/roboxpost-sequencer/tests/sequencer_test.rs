use roboxpost_core::{Model, Tool, ValveState};
use roboxpost_sequencer::{Sequencer, SequencerConfig};

fn dual(close_valve: bool) -> Sequencer {
    Sequencer::new(SequencerConfig::new(Model::Dual, close_valve))
}

fn quickfill(close_valve: bool) -> Sequencer {
    Sequencer::new(SequencerConfig::new(Model::QuickFill, close_valve))
}

#[test]
fn test_retraction_taper_with_segment_split() {
    // Chamber volume (0.3) is far smaller than the volume of 5 units of
    // filament, so the most recent motion line must be split and the
    // retraction itself must vanish.
    let output = dual(true).execute("G1 X10 Y0 E5\nG1 X20 Y0 E5\nG1 X20 Y0 E-5");
    let expected = "\
G1 B1 F150 E0.3; open valve and fill the nozzle T0 with filament
G1 X10 Y0 D5; added valve opening before
G1 X10.249 Y0 D0.1247; split result before valve closing
G1 X20 Y0 B0; extrusion 5, volume 12.0264 removed D5 valve routine
; valve routine end, retraction removed";
    assert_eq!(output, expected);
    assert!(!output.contains("E-5"));
    assert!(!output.contains("D-5"));
}

#[test]
fn test_taper_spreads_over_multiple_lines() {
    let input = "\
G1 X0 Y0 E0.05
G1 X10 Y0 E0.05
G1 X20 Y0 E0.05
G1 X30 Y0 E0.05
G1 F1500 E-2";
    let output = dual(true).execute(input);
    let expected = "\
G1 B1 F150 E0.3; open valve and fill the nozzle T0 with filament
G1 X0 Y0 D0.05; added valve opening before
G1 X4.945 Y0 D0.0247; split result before valve closing
G1 X10 Y0 B0.8; extrusion 0.05, volume 0.1203 removed D0.05 valve routine
G1 X20 Y0 B0.4; removed D0.05 valve routine
G1 X30 Y0 B0; removed D0.05 valve routine
; valve routine end, retraction removed";
    assert_eq!(output, expected);
}

#[test]
fn test_taper_valve_fractions_decrease_toward_retraction() {
    // In travel order the valve opening must shrink monotonically: the
    // oldest tapered line is the most open, the newest fully closed.
    let input = "\
G1 X0 Y0 E0.05
G1 X10 Y0 E0.05
G1 X20 Y0 E0.05
G1 X30 Y0 E0.05
G1 F1500 E-2";
    let lines = dual(true).sequence(input);
    let fractions: Vec<f64> = lines
        .iter()
        .filter_map(|line| line.numeric_value("B"))
        .filter(|b| *b != 1.0)
        .collect();
    assert_eq!(fractions, vec![0.8, 0.4, 0.0]);
}

#[test]
fn test_travel_moves_in_window_are_annotated_and_skipped() {
    let input = "\
G1 X0 Y0 E0.05
G0 X5 Y5
G1 X10 Y0 E0.05
G1 E-1 F1500";
    let output = dual(true).execute(input);
    let expected = "\
G1 B1 F150 E0.3; open valve and fill the nozzle T0 with filament
G1 X0 Y0 D0.05; added valve opening before
G0 X5 Y5; no extrusion valve routine
G1 X10 Y0 B0; removed D0.05 valve routine
; valve routine end, retraction removed";
    assert_eq!(output, expected);
}

#[test]
fn test_look_back_window_is_bounded() {
    // 15 motion lines before the retraction; at most 10 are collected and
    // at most 9 are eligible for taper work, and the tiny per-line volume
    // never exhausts the chamber, so exactly 9 B tokens appear.
    let mut input = String::new();
    for i in 0..15 {
        input.push_str(&format!("G1 X{} Y0 E0.001\n", i));
    }
    input.push_str("G1 F1500 E-1");
    let output = dual(true).execute(&input);
    let taper_steps = output.matches("valve routine\n").count()
        + usize::from(output.ends_with("valve routine"));
    let b_tokens = output.matches(" B0").count();
    assert_eq!(taper_steps, 9);
    assert_eq!(b_tokens, 9);
    // The oldest lines stay untouched: X0..X4 outside the window plus X5,
    // which is collected as the interpolation anchor only.
    assert!(output.contains("G1 X0 Y0 D0.001\n"));
    assert!(output.contains("G1 X5 Y0 D0.001\n"));
    assert!(!output.contains("G1 X6 Y0 D0.001"));
}

#[test]
fn test_ignore_marker_exempts_retraction() {
    let output = dual(true).execute("G1 X10 Y0 E5\nG1 F1500 E-2 ;_ignore");
    let expected = "\
G1 B1 F150 E0.3; open valve and fill the nozzle T0 with filament
G1 X10 Y0 D5; added valve opening before
G1 F1500 D-2;_ignore";
    assert_eq!(output, expected);
}

#[test]
fn test_tool_persistence_across_lines() {
    let input = "T1\nG1 X0 Y0 E1\nM104 S200\nT0\nG1 X5 Y5 E1\nG0 X9 Y9";
    let lines = dual(false).sequence(input);
    assert_eq!(lines[0].tool, Some(Tool::T1));
    assert_eq!(lines[1].tool, Some(Tool::T1));
    assert_eq!(lines[2].tool, Some(Tool::T1));
    assert_eq!(lines[3].tool, Some(Tool::T0));
    assert_eq!(lines[4].tool, Some(Tool::T0));
    assert_eq!(lines[5].tool, Some(Tool::T0));
}

#[test]
fn test_mid_line_tool_token_removed_without_changing_selection() {
    let input = "T0\nG1 T1 X0 Y0 E1\nG1 X5 Y5 E1";
    let lines = dual(false).sequence(input);
    // The spurious T1 tags its own line only.
    assert_eq!(lines[1].tool, Some(Tool::T1));
    assert_eq!(lines[1].render(), "G1 X0 Y0 E1; removed T1");
    // The selected tool is still T0 for the following line.
    assert_eq!(lines[2].tool, Some(Tool::T0));
    assert_eq!(lines[2].render(), "G1 X5 Y5 D1");
}

#[test]
fn test_tool_change_forces_valve_reopen() {
    let input = "T0\nG1 X0 Y0 E1\nT1\nG1 X5 Y5 E1";
    let output = quickfill(true).execute(input);
    let expected = "\
T0
G1 B1 F150 E0.6; open valve and fill the nozzle T0 with filament
G1 X0 Y0 E1; added valve opening before
T1
G1 B1 F150 E0.225; open valve and fill the nozzle T1 with filament
G1 X5 Y5 E1; added valve opening before";
    assert_eq!(output, expected);
}

#[test]
fn test_temperature_rewrite_for_secondary_extruder() {
    let input = "T1\nM104 S210\nM109 S215\nM103 S0\nT0\nM104 S190";
    let output = quickfill(false).execute(input);
    let expected = "T1\nM104 T210\nM109 T215\nM103 T0\nT0\nM104 S190";
    assert_eq!(output, expected);
}

#[test]
fn test_valve_monotonic_within_tool_run() {
    let input = "\
G1 X0 Y0 E0.05
G1 X10 Y0 E0.05
G1 F1500 E-1
G1 X20 Y0 E0.05
G1 X30 Y0 E0.05";
    let lines = dual(true).sequence(input);
    let mut transitions = Vec::new();
    let mut last = None;
    for line in &lines {
        if last != Some(line.valve_tag) {
            transitions.push(line.valve_tag);
            last = Some(line.valve_tag);
        }
    }
    // Opened on first extrusion, Closed only by the taper, then Opened
    // again; never any other transition.
    assert_eq!(
        transitions,
        vec![ValveState::Opened, ValveState::Closed, ValveState::Opened]
    );
}

#[test]
fn test_no_negative_extrusion_survives() {
    let input = "\
G1 X0 Y0 E0.4
G1 X10 Y0 E0.4
G1 F1500 E-0.8
G0 X20 Y20
G1 X21 Y20 E0.4
G1 X22 Y20 E-1.2";
    let lines = dual(true).sequence(input);
    for line in &lines {
        for letter in ['D', 'E'] {
            if let Some(value) = line.numeric_value(&letter.to_string()) {
                assert!(
                    value >= 0.0,
                    "negative extrusion survived: {}",
                    line.render()
                );
            }
        }
    }
    assert_eq!(
        lines
            .iter()
            .filter(|l| l.comment().contains("valve routine end"))
            .count(),
        2
    );
}

#[test]
fn test_comment_and_blank_lines_pass_through() {
    let input = ";LAYER:0\nG1 X0 Y0 E1\n;TIME_ELAPSED:12.3";
    let lines = quickfill(true).sequence(input);
    assert_eq!(lines[0].render(), ";LAYER:0");
    assert_eq!(lines[3].render(), ";TIME_ELAPSED:12.3");
}

#[test]
fn test_header_block() {
    let sequencer = quickfill(false);
    let header = sequencer.header();
    assert!(header.starts_with(
        "; Selected robox profile: cel_robox_quickfill, close valve \"false\"\n; version "
    ));
    assert!(header.ends_with('\n'));
    assert_eq!(header.lines().count(), 2);
}
