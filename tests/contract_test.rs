// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Protocol misuse fails fast, without corrupting the grid.

use knitout_cells::{Bed, Direction, Machine, MachineError, Needle};

fn needle(token: &str) -> Needle {
    token.parse().unwrap()
}

/// Stitching with a carrier that was never brought in aborts instead of
/// silently creating a floating yarn.
#[test]
fn test_knit_without_in_is_fatal() {
    let mut machine = Machine::new();
    machine.set_carriers(&["A"]).unwrap();

    let result = machine.knit(Direction::Right, needle("f0"), &["A"]);
    assert_eq!(
        result,
        Err(MachineError::CarrierNotIn {
            name: "A".to_string()
        })
    );
    // Nothing was placed.
    assert_eq!(machine.top_row(), 0);
    assert!(machine.lane(Bed::Front).range().is_none());
    assert!(machine.crossings().is_empty());
}

#[test]
fn test_unknown_carrier_rejected() {
    let mut machine = Machine::new();
    machine.set_carriers(&["A"]).unwrap();
    assert!(matches!(
        machine.carrier_in(&["Z"]),
        Err(MachineError::UnknownCarrier { .. })
    ));
    assert!(matches!(
        machine.knit(Direction::Right, needle("f0"), &["Z"]),
        Err(MachineError::UnknownCarrier { .. })
    ));
}

#[test]
fn test_duplicate_carrier_in_one_operation() {
    let mut machine = Machine::new();
    machine.set_carriers(&["A"]).unwrap();
    machine.carrier_in(&["A"]).unwrap();
    assert!(matches!(
        machine.knit(Direction::Right, needle("f0"), &["A", "A"]),
        Err(MachineError::DuplicateCarrier { .. })
    ));
}

#[test]
fn test_out_requires_in() {
    let mut machine = Machine::new();
    machine.set_carriers(&["A"]).unwrap();
    assert!(matches!(
        machine.carrier_out(&["A"]),
        Err(MachineError::CarrierNotIn { .. })
    ));
}

#[test]
fn test_needle_grammar_is_strict() {
    for bad in ["", "f", "g1", "f1s", "fs+", "f++1", "F1", " f1"] {
        let result: Result<Needle, _> = bad.parse();
        assert!(
            matches!(result, Err(MachineError::InvalidNeedle { .. })),
            "token {:?} should be rejected",
            bad
        );
    }
    for good in ["f0", "b10", "fs-2", "bs+7"] {
        assert!(good.parse::<Needle>().is_ok(), "token {:?} should parse", good);
    }
}

#[test]
fn test_racking_values_are_strict() {
    let mut machine = Machine::new();
    for bad in [0.5, -0.5, 1.85, 2.2] {
        assert!(matches!(
            machine.rack(bad),
            Err(MachineError::InvalidRacking { .. })
        ));
    }
    for good in [0.0, 3.0, -4.0, 0.25, 5.25, -1.75] {
        machine.rack(good).unwrap();
    }
}

/// An error leaves the carrier states untouched: the failed instruction is
/// not partially applied to the carrier table.
#[test]
fn test_failed_stitch_leaves_carriers_parked() {
    let mut machine = Machine::new();
    machine.set_carriers(&["A", "B"]).unwrap();
    machine.carrier_in(&["A"]).unwrap();
    machine.knit(Direction::Right, needle("f0"), &["A"]).unwrap();
    let parked_before = machine.carrier_named("A").unwrap().state;

    // B is not in, so this whole stitch is rejected.
    assert!(machine
        .knit(Direction::Left, needle("f0"), &["A", "B"])
        .is_err());
    assert_eq!(machine.carrier_named("A").unwrap().state, parked_before);
}
