// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The carrier router.
//!
//! Moves carriers from wherever they are parked to the yarn column just
//! before a target needle, producing the float and turn cells that realize
//! the motion, and bridges the yarn between beds when the target is on the
//! back family.
//!
//! # Routing model
//!
//! All inter-stitch yarn transit happens on the front bed. A sweep walks
//! the intervening front-lane columns toward the target — left-to-right for
//! carriers parked left of it, then right-to-left for those parked right of
//! it — emitting one float cell per column (a loop-miss on needle columns,
//! a yarn cell on yarn columns) that passes every open non-moving loop and
//! yarn straight through and picks up each moving carrier at its parked
//! column. The moving set stays sorted by carrier ordinal (plating order).
//! A final turning cell at the target column redirects each mover onto the
//! up port on its arrival side and starts any not-yet-introduced carrier.
//!
//! # Bed bridges
//!
//! For a back-family needle the transit target is the front-lane column
//! that corresponds to the back yarn column under the current racking
//! (`yb + 2R`), and a bridge pair carries the yarn across: a front cell
//! crossing out, a back cell crossing in, packaged with one crossing
//! record. At integer racking the bridge is vertical and uses the outer
//! `x`/`o` ports on the direction's side. At quarter pitch the back bed
//! sits half a column to the right of the transit column, so the outbound
//! bridge always leaves on the inner right lane (`X+`) and arrives on the
//! inner left lane (`O-`), flipping the back-bed "before" side for `+`
//! stitches; the return bridge after the stitch is the mirror image.
//!
//! After any stitch, `finish_after` re-parks the carriers just after the
//! needle; for back-family stitches it first bridges the yarn home to the
//! front bed, so a parked carrier's yarn always tops out on a front-lane
//! column.

use log::debug;

use crate::cell::{Cell, CrossPort, Crossing, CrossingEnd, CrossingKind, LoopCell, LoopPort, StitchKind, YarnCell, YarnPort};
use crate::machine::carriers::{CarrierId, CarrierState, ParkSide, Parking};
use crate::machine::errors::MachineError;
use crate::machine::stacking::BatchCell;
use crate::machine::Machine;
use crate::notation::{Bed, Direction, Needle, Side};

impl Machine {
    /// The front-lane column a carrier must reach to stitch `n` in
    /// direction `d`: the yarn-before column itself for front-family
    /// needles, its racked front correspondent for back-family needles.
    pub(crate) fn front_transit_column(&self, d: Direction, n: Needle) -> i32 {
        let yb = n.yarn_before(d);
        if n.bed.is_front_family() {
            yb
        } else {
            yb + self.racking().column_shift()
        }
    }

    /// Move every carrier in `cs` to just before needle `n` in direction
    /// `d`, ready to stitch. Carriers must be in (`Ready` or parked).
    pub(crate) fn bring_carriers(
        &mut self,
        d: Direction,
        n: Needle,
        cs: &[CarrierId],
    ) -> Result<(), MachineError> {
        if cs.is_empty() {
            return Ok(());
        }
        let target = self.front_transit_column(d, n);

        let mut starts: Vec<CarrierId> = Vec::new();
        let mut parked: Vec<(CarrierId, i32)> = Vec::new();
        for &id in cs {
            let carrier = &self.carriers()[id.as_usize()];
            match carrier.state {
                CarrierState::Out => {
                    return Err(MachineError::CarrierNotIn {
                        name: carrier.name.clone(),
                    });
                }
                CarrierState::Ready => starts.push(id),
                CarrierState::Parked(p) => parked.push((id, p.column)),
            }
        }
        debug!("bringing carriers to front column {} for {}{}", target, d, n);

        let mut batch: Vec<BatchCell> = Vec::new();
        let arriving_left = self.sweep(&mut batch, &parked, target, Direction::Right)?;
        let arriving_right = self.sweep(&mut batch, &parked, target, Direction::Left)?;

        if !(arriving_left.is_empty() && arriving_right.is_empty() && starts.is_empty()) {
            let mut turn = YarnCell::new();
            for &c in &arriving_left {
                turn.add_segment(c, Some(YarnPort::Left), Some(YarnPort::UpLeft));
            }
            for &c in &arriving_right {
                turn.add_segment(c, Some(YarnPort::Right), Some(YarnPort::UpRight));
            }
            for &c in &starts {
                turn.add_segment(c, None, Some(YarnPort::up(d.side())));
            }
            self.pass_through_open(Bed::Front, target, &mut turn);
            batch.push(BatchCell::at(target, Cell::Yarn(turn)));
        }
        if !batch.is_empty() {
            self.add_cells(Bed::Front, batch, None)?;
        }

        if n.bed.is_back_family() {
            self.bridge_to_back(d, n, cs, target)?;
        }

        for &id in cs {
            self.carriers_mut()[id.as_usize()].state = CarrierState::Parked(Parking {
                side: ParkSide::Before,
                direction: d,
                needle: n,
                column: target,
            });
        }
        Ok(())
    }

    /// One sweep pass toward the target, collecting the carriers that
    /// arrive at the target column from this side (ordinal-sorted).
    fn sweep(
        &self,
        batch: &mut Vec<BatchCell>,
        parked: &[(CarrierId, i32)],
        target: i32,
        toward: Direction,
    ) -> Result<Vec<CarrierId>, MachineError> {
        let movers: Vec<(CarrierId, i32)> = parked
            .iter()
            .copied()
            .filter(|&(_, col)| match toward {
                Direction::Right => col < target,
                Direction::Left => col > target,
            })
            .collect();
        if movers.is_empty() {
            return Ok(Vec::new());
        }

        let (entry, exit) = match toward {
            Direction::Right => (YarnPort::Left, YarnPort::Right),
            Direction::Left => (YarnPort::Right, YarnPort::Left),
        };
        let (loop_entry, loop_exit) = match toward {
            Direction::Right => (LoopPort::Left, LoopPort::Right),
            Direction::Left => (LoopPort::Right, LoopPort::Left),
        };
        let columns: Vec<i32> = match toward {
            Direction::Right => {
                let lo = movers.iter().map(|m| m.1).min().unwrap();
                (lo..target).collect()
            }
            Direction::Left => {
                let hi = movers.iter().map(|m| m.1).max().unwrap();
                ((target + 1)..=hi).rev().collect()
            }
        };

        let mut moving: Vec<CarrierId> = Vec::new();
        for i in columns {
            let mut pickups: Vec<CarrierId> =
                movers.iter().filter(|m| m.1 == i).map(|m| m.0).collect();
            pickups.sort();
            if moving.is_empty() && pickups.is_empty() {
                continue;
            }
            if i.rem_euclid(2) == 0 {
                // Needle column: float the moving yarn past it, passing the
                // open loop stack straight through.
                debug_assert!(pickups.is_empty(), "carriers park on yarn columns");
                let mut float = LoopCell::new(StitchKind::Miss);
                for &c in &moving {
                    float.add(loop_entry, c);
                    float.add(loop_exit, c);
                }
                if let Some(top) = self.grid().lane(Bed::Front).top(i).and_then(|c| c.as_loop()) {
                    for &lc in top.port(LoopPort::Up) {
                        float.add(LoopPort::Down, lc);
                        float.add(LoopPort::Up, lc);
                    }
                }
                batch.push(BatchCell::at(i, Cell::Loop(float)));
            } else {
                let mut float = YarnCell::new();
                for &c in &moving {
                    float.add_segment(c, Some(entry), Some(exit));
                }
                for &c in &pickups {
                    let side = self.up_side_of(Bed::Front, i, c)?;
                    float.add_segment(c, Some(YarnPort::down(side)), Some(exit));
                }
                self.pass_through_open(Bed::Front, i, &mut float);
                batch.push(BatchCell::at(i, Cell::Yarn(float)));
            }
            moving.extend(pickups);
            moving.sort();
        }
        Ok(moving)
    }

    /// Carry every carrier in `cs` from the front transit column across to
    /// the back yarn-before column, with its crossing record.
    fn bridge_to_back(
        &mut self,
        d: Direction,
        n: Needle,
        cs: &[CarrierId],
        target: i32,
    ) -> Result<(), MachineError> {
        let yb = n.yarn_before(d);
        let back_lane = n.bed.yarn_lane();
        let (out_port, in_port, back_side) = if self.racking().is_quarter() {
            (YarnPort::OutInnerRight, YarnPort::InInnerLeft, Side::Left)
        } else {
            let s = d.side();
            (YarnPort::out(s), YarnPort::cross_in(s), s)
        };

        let mut front = YarnCell::new();
        for &c in cs {
            let side = self.up_side_of(Bed::Front, target, c)?;
            front.add_segment(c, Some(YarnPort::down(side)), Some(out_port));
        }
        self.pass_through_open(Bed::Front, target, &mut front);

        let mut back = YarnCell::new();
        for &c in cs {
            back.add_segment(c, Some(in_port), Some(YarnPort::up(back_side)));
        }
        self.pass_through_open(back_lane, yb, &mut back);

        let cross = Crossing::new(
            CrossingKind::Yarn,
            CrossingEnd::new(Bed::Front, target, CrossPort::Yarn(out_port)),
            CrossingEnd::new(back_lane, yb, CrossPort::Yarn(in_port)),
            cs.to_vec(),
        );
        self.add_cells(
            back_lane,
            vec![
                BatchCell::on(Bed::Front, target, Cell::Yarn(front)),
                BatchCell::at(yb, Cell::Yarn(back)),
            ],
            Some(cross),
        )
    }

    /// The single-column turn that redirects each carrier from the top of
    /// the yarn-before column toward the needle, passing everything else
    /// through.
    pub(crate) fn turn_before_cell(
        &self,
        d: Direction,
        n: Needle,
        cs: &[CarrierId],
    ) -> Result<Option<BatchCell>, MachineError> {
        if cs.is_empty() {
            return Ok(None);
        }
        let lane = n.bed.yarn_lane();
        let col = n.yarn_before(d);
        let mut turn = YarnCell::new();
        for &c in cs {
            let side = self.up_side_of(lane, col, c)?;
            turn.add_segment(c, Some(YarnPort::down(side)), Some(YarnPort::side_port(d.side())));
        }
        self.pass_through_open(lane, col, &mut turn);
        Ok(Some(BatchCell::on(lane, col, Cell::Yarn(turn))))
    }

    /// The turn that catches each carrier leaving the needle and sends it
    /// up the yarn-after column.
    pub(crate) fn turn_after_cell(&self, d: Direction, n: Needle, cs: &[CarrierId]) -> Option<BatchCell> {
        if cs.is_empty() {
            return None;
        }
        let lane = n.bed.yarn_lane();
        let col = n.yarn_after(d);
        let side = d.side().flip();
        let mut turn = YarnCell::new();
        for &c in cs {
            turn.add_segment(c, Some(YarnPort::side_port(side)), Some(YarnPort::up(side)));
        }
        self.pass_through_open(lane, col, &mut turn);
        Some(BatchCell::on(lane, col, Cell::Yarn(turn)))
    }

    /// Re-park every carrier after its stitch; for back-family stitches,
    /// first bridge the yarn home to the front bed.
    pub(crate) fn finish_after(
        &mut self,
        d: Direction,
        n: Needle,
        cs: &[CarrierId],
    ) -> Result<(), MachineError> {
        if cs.is_empty() {
            return Ok(());
        }
        let ya = n.yarn_after(d);
        let column = if n.bed.is_front_family() {
            ya
        } else {
            let fa = ya + self.racking().column_shift();
            self.bridge_to_front(d, n, cs, ya, fa)?;
            fa
        };
        for &id in cs {
            self.carriers_mut()[id.as_usize()].state = CarrierState::Parked(Parking {
                side: ParkSide::After,
                direction: d,
                needle: n,
                column,
            });
        }
        Ok(())
    }

    /// The return bridge: mirror of `bridge_to_back`.
    fn bridge_to_front(
        &mut self,
        d: Direction,
        n: Needle,
        cs: &[CarrierId],
        ya: i32,
        fa: i32,
    ) -> Result<(), MachineError> {
        let back_lane = n.bed.yarn_lane();
        let (out_port, in_port, front_side) = if self.racking().is_quarter() {
            (YarnPort::OutInnerLeft, YarnPort::InInnerRight, Side::Right)
        } else {
            let s = d.side().flip();
            (YarnPort::out(s), YarnPort::cross_in(s), s)
        };

        let mut back = YarnCell::new();
        for &c in cs {
            let side = self.up_side_of(back_lane, ya, c)?;
            back.add_segment(c, Some(YarnPort::down(side)), Some(out_port));
        }
        self.pass_through_open(back_lane, ya, &mut back);

        let mut front = YarnCell::new();
        for &c in cs {
            front.add_segment(c, Some(in_port), Some(YarnPort::up(front_side)));
        }
        self.pass_through_open(Bed::Front, fa, &mut front);

        let cross = Crossing::new(
            CrossingKind::Yarn,
            CrossingEnd::new(Bed::Front, fa, CrossPort::Yarn(in_port)),
            CrossingEnd::new(back_lane, ya, CrossPort::Yarn(out_port)),
            cs.to_vec(),
        );
        self.add_cells(
            back_lane,
            vec![
                BatchCell::at(ya, Cell::Yarn(back)),
                BatchCell::on(Bed::Front, fa, Cell::Yarn(front)),
            ],
            Some(cross),
        )
    }

    /// Which side of `index`'s top cell a carrier's yarn currently exits
    /// up from.
    fn up_side_of(&self, lane: Bed, index: i32, id: CarrierId) -> Result<Side, MachineError> {
        if let Some(cell) = self.grid().lane(lane).top(index).and_then(|c| c.as_yarn()) {
            if cell.port(YarnPort::UpLeft).contains(&id) {
                return Ok(Side::Left);
            }
            if cell.port(YarnPort::UpRight).contains(&id) {
                return Ok(Side::Right);
            }
        }
        Err(MachineError::BrokenYarnPath {
            bed: lane,
            index,
            row: self.top_row(),
        })
    }

    /// Pass every open yarn at `(lane, index)` not already consumed by
    /// `cell` straight through it, on its own side.
    fn pass_through_open(&self, lane: Bed, index: i32, cell: &mut YarnCell) {
        let Some(top) = self.grid().lane(lane).top(index).and_then(|c| c.as_yarn()) else {
            return;
        };
        let mut consumed = cell.down_members();
        for (c, side) in top.up_members() {
            if let Some(pos) = consumed.iter().position(|&m| m == (c, side)) {
                consumed.swap_remove(pos);
            } else {
                cell.add_segment(c, Some(YarnPort::down(side)), Some(YarnPort::up(side)));
            }
        }
    }
}
