// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Shared invariant checks for integration tests.
//!
//! These walk the finished grid through the public read-only surface and
//! assert the properties every valid run must uphold, whatever the
//! instruction stream was.

use knitout_cells::{Bed, Cell, LoopPort, Machine};

/// Stack monotonicity: every column's cells are strictly ordered by row.
pub fn check_stack_monotonicity(machine: &Machine) {
    for bed in Bed::ALL {
        for (index, column) in machine.lane(bed).iter() {
            for pair in column.windows(2) {
                assert!(
                    pair[0].y() < pair[1].y(),
                    "stack order violated at {}{}: rows {} then {}",
                    bed,
                    index,
                    pair[0].y(),
                    pair[1].y()
                );
            }
        }
    }
}

/// Path contiguity: whatever leaves a cell upward is exactly what the cell
/// above it consumes from below, with no row gap in between.
pub fn check_path_contiguity(machine: &Machine) {
    for bed in Bed::ALL {
        for (index, column) in machine.lane(bed).iter() {
            for pair in column.windows(2) {
                match (&pair[0], &pair[1]) {
                    (Cell::Loop(below), Cell::Loop(above)) => {
                        let ups = below.port(LoopPort::Up);
                        let downs = above.port(LoopPort::Down);
                        if ups.is_empty() && downs.is_empty() {
                            continue;
                        }
                        assert_eq!(
                            ups,
                            downs,
                            "loop path broken at {}{} between rows {} and {}",
                            bed,
                            index,
                            below.y(),
                            above.y()
                        );
                        assert_eq!(below.y() + 1, above.y(), "loop path gap at {}{}", bed, index);
                    }
                    (Cell::Yarn(below), Cell::Yarn(above)) => {
                        let mut ups = below.up_members();
                        let mut downs = above.down_members();
                        ups.sort();
                        downs.sort();
                        if ups.is_empty() && downs.is_empty() {
                            continue;
                        }
                        assert_eq!(
                            ups,
                            downs,
                            "yarn path broken at {}{} between rows {} and {}",
                            bed,
                            index,
                            below.y(),
                            above.y()
                        );
                        assert_eq!(below.y() + 1, above.y(), "yarn path gap at {}{}", bed, index);
                    }
                    _ => panic!("mixed cell variants in column {}{}", bed, index),
                }
            }
        }
    }
}

/// Crossing planarity: the list is row-descending, and crossings sharing a
/// row are strictly ordered the same way on both lanes.
pub fn check_crossing_planarity(machine: &Machine) {
    let crossings = machine.crossings();
    for pair in crossings.windows(2) {
        assert!(
            pair[0].row() >= pair[1].row(),
            "crossing list not row-descending"
        );
    }
    for (i, a) in crossings.iter().enumerate() {
        for b in &crossings[i + 1..] {
            if a.row() == b.row() {
                assert!(
                    a.compatible_with(b),
                    "intersecting crossings share row {}",
                    a.row()
                );
            }
        }
    }
}

pub fn check_all(machine: &Machine) {
    check_stack_monotonicity(machine);
    check_path_contiguity(machine);
    check_crossing_planarity(machine);
}
