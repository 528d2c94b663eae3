//! Integration tests for threshold resolution and the design rule check.

use pcbforge::rules::parse_rule_value;
use pcbforge::{
    check_board, Board, DrcError, DrcThresholds, Point, Ruleset, Violation, TOP_COPPER,
};

fn pad_pair(gap_x: f64) -> Board {
    let mut board = Board::new("pads", 20.0, 20.0);
    if let Ok(a) = board.add_component("U1", "CHIP", Point::new(0.0, 0.0), 0.0) {
        a.add_pad("1", 0.0, 0.0, 1.0, 1.0);
    }
    if let Ok(b) = board.add_component("U2", "CHIP", Point::new(gap_x, 0.0), 0.0) {
        b.add_pad("1", 0.0, 0.0, 1.0, 1.0);
    }
    board
}

/// Overlapping pads on different components report the negative clearance.
#[test]
fn overlapping_pads_fail_clearance() {
    let board = pad_pair(0.6);
    let result = board.design_rule_check(Some(0.15), Some(0.7));
    assert_eq!(
        result,
        Err(DrcError::Violations(vec![
            "Pad clearance between U1:1 and U2:1 is -0.400mm; minimum 0.7mm".to_string()
        ]))
    );
}

/// A 0.1 mm trace fails at 0.15 mm and passes at 0.1 mm.
#[test]
fn trace_width_threshold_is_exclusive() {
    let mut board = Board::new("width", 20.0, 20.0);
    board.set_layer_stack([TOP_COPPER]);
    assert!(board
        .trace(Point::new(0.0, 0.0), Point::new(10.0, 0.0), TOP_COPPER, 0.1)
        .is_ok());

    let strict = check_board(&board, &DrcThresholds::new(0.15, 0.15));
    assert_eq!(strict.len(), 1);
    assert!(matches!(
        strict.first(),
        Some(Violation::TraceWidth { path: false, .. })
    ));
    assert!(board.design_rule_check(Some(0.1), None).is_ok());
}

/// Trace paths name themselves in their message.
#[test]
fn trace_path_message() {
    let mut board = Board::new("path", 20.0, 20.0);
    board.set_layer_stack([TOP_COPPER]);
    assert!(board
        .trace_path([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)], TOP_COPPER, 0.05)
        .is_ok());
    let messages: Vec<String> = check_board(&board, &DrcThresholds::default())
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        messages,
        vec!["Trace path on GTL width 0.05mm below minimum 0.15mm"]
    );
}

/// Swapping placement order swaps the names but not the measurement.
#[test]
fn clearance_is_symmetric() {
    let forward = pad_pair(1.1);
    let mut reverse = Board::new("pads", 20.0, 20.0);
    if let Ok(b) = reverse.add_component("U2", "CHIP", Point::new(1.1, 0.0), 0.0) {
        b.add_pad("1", 0.0, 0.0, 1.0, 1.0);
    }
    if let Ok(a) = reverse.add_component("U1", "CHIP", Point::new(0.0, 0.0), 0.0) {
        a.add_pad("1", 0.0, 0.0, 1.0, 1.0);
    }

    let thresholds = DrcThresholds::new(0.15, 0.5);
    let measured = |board: &Board| -> Vec<f64> {
        check_board(board, &thresholds)
            .iter()
            .filter_map(|v| match v {
                Violation::PadClearance { clearance, .. } => Some(*clearance),
                _ => None,
            })
            .collect()
    };
    let a = measured(&forward);
    let b = measured(&reverse);
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);
    assert!(a.iter().zip(&b).all(|(x, y)| (x - y).abs() < 1e-12));
}

/// Unknown tiers fall back to 0.15 mm for width and clearance.
#[test]
fn unknown_tier_uses_fallback_thresholds() {
    let board = pad_pair(1.12).with_service("Hobbyist");
    let thresholds = board.thresholds(None, None);
    assert!((thresholds.min_clearance - 0.15).abs() < f64::EPSILON);
    assert!(thresholds.extra.is_empty());
    assert!(board.design_rule_check(None, None).is_err());
}

/// Sentinel strings disable the rule they configure.
#[test]
fn user_preference_disables_rule() {
    assert!(parse_rule_value("user preference").abs() < f64::EPSILON);

    let mut rules = Ruleset::default();
    rules.insert("Custom", "Minimum track Width", "0.2mm");
    rules.insert("Custom", "Minimum Clearance", "0.2mm");
    rules.insert("Custom", "Minimum Via Diameter", "User Preference");
    rules.insert("Custom", "Minimum Through Hole", "0.3mm");

    let mut board = Board::new("vias", 20.0, 20.0)
        .with_ruleset(rules)
        .with_service("Custom");
    board.add_via(Point::new(5.0, 5.0), "GTL", "GBL", 0.2, 0.25);

    let thresholds = board.thresholds(None, None);
    assert_eq!(thresholds.extra.min_via_diameter, None);
    assert_eq!(
        board.design_rule_check(None, None),
        Err(DrcError::Violations(vec![
            "Via at (5.000, 5.000) drill 0.25mm below minimum through hole 0.3mm".to_string()
        ]))
    );
}

/// Running the check twice gives the same ordered result.
#[test]
fn check_is_deterministic() {
    let mut board = pad_pair(0.2);
    if let Some(u1) = board.component_mut("U1") {
        u1.add_pad("2", 0.5, 0.0, 1.0, 1.0);
    }
    board.set_layer_stack([TOP_COPPER]);
    assert!(board
        .trace(Point::new(0.0, 5.0), Point::new(5.0, 5.0), TOP_COPPER, 0.05)
        .is_ok());

    let thresholds = DrcThresholds::new(0.15, 0.15);
    let first = check_board(&board, &thresholds);
    let second = check_board(&board, &thresholds);
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
    assert!(matches!(first.first(), Some(Violation::TraceWidth { .. })));
}
