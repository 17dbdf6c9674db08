// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Property test: the engine invariants hold for arbitrary valid streams.

mod common;

use knitout_cells::{Bed, Direction, Machine, Needle};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any sequence of knit/tuck/miss over both beds keeps every column
    /// strictly row-ordered, every loop and yarn path contiguous, and the
    /// crossing list planar.
    #[test]
    fn invariants_hold_for_random_streams(
        ops in prop::collection::vec(
            (0u8..3, any::<bool>(), 0i32..5, any::<bool>()),
            1..40,
        )
    ) {
        let mut machine = Machine::new();
        machine.set_carriers(&["A"]).unwrap();
        machine.carrier_in(&["A"]).unwrap();

        for (op, rightward, number, back) in ops {
            let d = if rightward { Direction::Right } else { Direction::Left };
            let bed = if back { Bed::Back } else { Bed::Front };
            let n = Needle::new(bed, number);
            let result = match op {
                0 => machine.knit(d, n, &["A"]),
                1 => machine.tuck(d, n, &["A"]),
                _ => machine.miss(d, n, &["A"]),
            };
            prop_assert!(result.is_ok(), "valid stitch failed: {:?}", result);
        }

        common::check_all(&machine);
    }

    /// Racking between stitches never breaks the invariants either.
    #[test]
    fn invariants_hold_across_rackings(
        steps in prop::collection::vec((-2i32..3, 0i32..4, any::<bool>()), 1..20)
    ) {
        let mut machine = Machine::new();
        machine.set_carriers(&["A"]).unwrap();
        machine.carrier_in(&["A"]).unwrap();

        for (racking, number, back) in steps {
            machine.rack(racking as f64).unwrap();
            let bed = if back { Bed::Back } else { Bed::Front };
            let result = machine.knit(Direction::Right, Needle::new(bed, number), &["A"]);
            prop_assert!(result.is_ok(), "racked knit failed: {:?}", result);
        }

        common::check_all(&machine);
    }
}
