// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Racked and quarter-pitch carrier bridging.

mod common;

use knitout_cells::{
    Bed, CrossPort, Crossing, CrossingKind, Direction, LoopPort, Machine, Needle, Side,
    StitchKind, YarnPort,
};

fn needle(token: &str) -> Needle {
    token.parse().unwrap()
}

fn yarn_port(cross: &Crossing, front: bool) -> YarnPort {
    let end = if front { &cross.front } else { &cross.back };
    match end.port {
        CrossPort::Yarn(p) => p,
        CrossPort::Loop(_) => panic!("expected a yarn crossing port"),
    }
}

/// At racking 1, a back-bed stitch bridges the carrier from the racked
/// front transit column to the back yarn column.
#[test]
fn test_racked_bridge() {
    let mut machine = Machine::new();
    machine.set_carriers(&["A"]).unwrap();
    machine.rack(1.0).unwrap();
    machine.carrier_in(&["A"]).unwrap();
    machine.knit(Direction::Right, needle("f0"), &["A"]).unwrap();
    machine.knit(Direction::Right, needle("b1"), &["A"]).unwrap();

    let a = machine.carrier_named("A").unwrap().id;

    // One outbound bridge, one return bridge, newest first.
    assert_eq!(machine.crossings().len(), 2);
    let outbound = &machine.crossings()[1];
    assert_eq!(outbound.kind, CrossingKind::Yarn);
    // Back yarn column 1 corresponds to front column 3 at racking 1.
    assert_eq!(outbound.front.index, 3);
    assert_eq!(outbound.back.index, 1);
    assert_eq!(outbound.carriers, vec![a]);
    // Integer racking uses the outer port pair, on the direction's side.
    assert_eq!(yarn_port(outbound, true), YarnPort::OutRight);
    assert_eq!(yarn_port(outbound, false), YarnPort::InRight);

    // The back stitch consumed nothing and holds only the new loop.
    let face = machine.lane(Bed::Back).top(2).unwrap().as_loop().unwrap();
    assert_eq!(face.kind, StitchKind::Knit);
    assert!(face.port(LoopPort::Down).is_empty());
    assert_eq!(face.port(LoopPort::Up), &[a]);
    assert_eq!(face.port(LoopPort::Left), &[a]);
    assert_eq!(face.port(LoopPort::Right), &[a]);

    common::check_all(&machine);
}

/// The quarter pitch selects the inner `X`/`O` port pair, and the two side
/// assignments of each bridge are complementary.
#[test]
fn test_quarter_pitch_bridge() {
    let mut machine = Machine::new();
    machine.set_carriers(&["A"]).unwrap();
    machine.rack(0.25).unwrap();
    machine.carrier_in(&["A"]).unwrap();
    machine.knit(Direction::Right, needle("f0"), &["A"]).unwrap();
    machine.knit(Direction::Right, needle("b0"), &["A"]).unwrap();

    assert_eq!(machine.crossings().len(), 2);
    let outbound = &machine.crossings()[1];
    let homeward = &machine.crossings()[0];

    // Inner (quarter-pitch) lanes, not the integer x/o pair.
    assert_eq!(yarn_port(outbound, true), YarnPort::OutInnerRight);
    assert_eq!(yarn_port(outbound, false), YarnPort::InInnerLeft);
    assert!(yarn_port(outbound, true).is_inner());

    // Front "before" side is the complement of the back side.
    assert_eq!(yarn_port(outbound, true).side(), Side::Right);
    assert_eq!(
        yarn_port(outbound, true).side(),
        yarn_port(outbound, false).side().flip()
    );

    // The return bridge mirrors the outbound one.
    assert_eq!(yarn_port(homeward, false), YarnPort::OutInnerLeft);
    assert_eq!(yarn_port(homeward, true), YarnPort::InInnerRight);
    assert_eq!(
        yarn_port(homeward, true).side(),
        yarn_port(homeward, false).side().flip()
    );

    common::check_all(&machine);
}

/// Negative racking shifts the correspondence the other way.
#[test]
fn test_negative_racking_bridge() {
    let mut machine = Machine::new();
    machine.set_carriers(&["A"]).unwrap();
    machine.rack(-2.0).unwrap();
    machine.carrier_in(&["A"]).unwrap();
    machine.knit(Direction::Right, needle("f0"), &["A"]).unwrap();
    machine.knit(Direction::Right, needle("b2"), &["A"]).unwrap();

    let outbound = &machine.crossings()[1];
    // Back yarn column 3 corresponds to front column 3 - 4 = -1.
    assert_eq!(outbound.back.index, 3);
    assert_eq!(outbound.front.index, -1);
    common::check_all(&machine);
}

/// Racking changes between stitches do not disturb parked yarn: the parked
/// column was resolved when the carrier parked.
#[test]
fn test_racking_change_after_parking() {
    let mut machine = Machine::new();
    machine.set_carriers(&["A"]).unwrap();
    machine.carrier_in(&["A"]).unwrap();
    machine.knit(Direction::Right, needle("b0"), &["A"]).unwrap();
    machine.rack(2.0).unwrap();
    machine.knit(Direction::Right, needle("f1"), &["A"]).unwrap();
    machine.carrier_out(&["A"]).unwrap();

    common::check_all(&machine);
}
