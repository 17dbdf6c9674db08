// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The stacking/merge engine.
//!
//! `add_cells` places a batch of cells destined for "the current top row".
//! The batch is placed at the lowest row that is legal for *all* of its
//! cells simultaneously:
//!
//! 1. If a crossing accompanies the batch, the row is raised past every
//!    recorded crossing whose projected endpoints are not strictly ordered
//!    the same way on both lanes — two such crossings on one row would
//!    intersect in a planar rendering, which is disallowed by construction.
//! 2. Each destination column's current top raises the row further: to the
//!    top's row if the new cell can absorb it, one past otherwise.
//! 3. Every column whose top then sits more than one row below the batch
//!    row is bridged with synthetic float cells (loop-miss on needle
//!    columns, pass-through yarn cells on yarn columns), keeping every open
//!    loop and yarn path contiguous row by row. An open path that does not
//!    match exactly what the new cell expects from below is a fatal
//!    contract violation.
//! 4. A column top sitting exactly at the batch row is absorbed into the
//!    new cell (yarn cells only; stitch events are atomic).
//!
//! The result is "compact but never corrupt": consecutive operations merge
//! into one output row whenever legal, and can never leave a gap or a
//! dangling path behind.

use log::{debug, trace};

use crate::cell::{Cell, CrossPort, Crossing, CrossingEnd, LoopCell, LoopPort, StitchKind, YarnCell, YarnPort};
use crate::machine::carriers::CarrierId;
use crate::machine::errors::MachineError;
use crate::machine::Machine;
use crate::notation::{Bed, Side};

/// One batch entry: a cell headed for `index` on `bed` (or the batch's
/// default bed when `bed` is `None`).
#[derive(Debug)]
pub(crate) struct BatchCell {
    pub bed: Option<Bed>,
    pub index: i32,
    pub cell: Cell,
}

impl BatchCell {
    /// A cell on the batch's default bed.
    pub(crate) fn at(index: i32, cell: Cell) -> BatchCell {
        BatchCell {
            bed: None,
            index,
            cell,
        }
    }

    /// A cell with an explicit bed override.
    pub(crate) fn on(bed: Bed, index: i32, cell: Cell) -> BatchCell {
        BatchCell {
            bed: Some(bed),
            index,
            cell,
        }
    }
}

impl Machine {
    /// Place a batch of cells at the minimal legal row, bridging gaps and
    /// absorbing where legal, and record the accompanying crossing.
    pub(crate) fn add_cells(
        &mut self,
        bed: Bed,
        batch: Vec<BatchCell>,
        crossing: Option<Crossing>,
    ) -> Result<(), MachineError> {
        let mut y = self.top_row();

        // Planarity: raise past any recorded crossing this one would
        // intersect. The list is row-descending, so the scan stops at the
        // first entry below the candidate row.
        if let Some(cross) = &crossing {
            for existing in self.crossings() {
                if existing.row() < y {
                    break;
                }
                if !cross.compatible_with(existing) {
                    debug!(
                        "crossing raised to row {} to avoid intersection",
                        existing.row() + 1
                    );
                    y = existing.row() + 1;
                }
            }
        }

        // Minimal row legal for every column in the batch.
        for bc in &batch {
            let lane = bc.bed.unwrap_or(bed);
            if let Some(top) = self.grid().lane(lane).top(bc.index) {
                if top.y() >= y {
                    y = top.y();
                    if !bc.cell.can_absorb(top) {
                        y = top.y() + 1;
                    }
                }
            }
        }

        if let Some(cross) = &crossing {
            check_crossing_balance(bed, &batch, cross)?;
        }

        for bc in batch {
            let lane = bc.bed.unwrap_or(bed);
            trace!("placing cell at {}{} row {}", lane, bc.index, y);
            match bc.cell {
                Cell::Loop(cell) => self.place_loop_cell(lane, bc.index, cell, y)?,
                Cell::Yarn(cell) => self.place_yarn_cell(lane, bc.index, cell, y)?,
            }
        }

        self.set_top_row(y);

        if let Some(mut cross) = crossing {
            cross.set_row(y);
            cross.set_styles(self.style_snapshot());
            // Prepend: rows never decrease, so this keeps the list sorted
            // descending.
            self.crossings_mut().insert(0, cross);
        }
        Ok(())
    }

    fn place_loop_cell(
        &mut self,
        lane: Bed,
        index: i32,
        mut cell: LoopCell,
        y: u32,
    ) -> Result<(), MachineError> {
        let styles = self.style_snapshot();
        let broken = |row| MachineError::BrokenLoopPath {
            bed: lane,
            index,
            row,
        };
        let column = self.grid_mut().lane_mut(lane).column_mut(index);

        let expected: Vec<CarrierId> = cell.port(LoopPort::Down).to_vec();
        if expected.is_empty() {
            if let Some(top) = column.last() {
                let open = top.as_loop().map_or(true, |t| !t.port(LoopPort::Up).is_empty());
                if open {
                    return Err(broken(y));
                }
            }
        } else {
            let below_ok = matches!(
                column.last().and_then(|c| c.as_loop()),
                Some(top) if top.port(LoopPort::Up) == expected.as_slice()
            );
            if !below_ok {
                return Err(broken(y));
            }
            // Bridge the gap, passing the open loop stack straight through.
            loop {
                let (below_y, below_styles) = match column.last() {
                    Some(top) if top.y() + 1 < y => (top.y(), top.styles().cloned()),
                    _ => break,
                };
                let mut filler = LoopCell::new(StitchKind::Miss);
                for &c in &expected {
                    filler.add(LoopPort::Down, c);
                    filler.add(LoopPort::Up, c);
                }
                filler.set_y(below_y + 1);
                if let Some(s) = below_styles {
                    filler.set_styles(s);
                }
                column.push(Cell::Loop(filler));
            }
        }

        // Stitch events are atomic: never absorbed, so the row below must
        // already be clear of this one.
        debug_assert!(column.last().map_or(true, |t| t.y() < y), "loop cell stack collision");
        cell.set_y(y);
        cell.set_styles(styles);
        column.push(Cell::Loop(cell));
        Ok(())
    }

    fn place_yarn_cell(
        &mut self,
        lane: Bed,
        index: i32,
        mut cell: YarnCell,
        y: u32,
    ) -> Result<(), MachineError> {
        let styles = self.style_snapshot();
        let broken = |row| MachineError::BrokenYarnPath {
            bed: lane,
            index,
            row,
        };
        let column = self.grid_mut().lane_mut(lane).column_mut(index);

        let expected = cell.down_members();
        if expected.is_empty() {
            if let Some(top) = column.last() {
                let open = top.as_yarn().map_or(true, |t| !t.up_members().is_empty());
                if open {
                    return Err(broken(y));
                }
            }
        } else {
            let below_ok = matches!(
                column.last().and_then(|c| c.as_yarn()),
                Some(top) if same_members(&top.up_members(), &expected)
            );
            if !below_ok {
                return Err(broken(y));
            }
            // Bridge the gap, passing every open yarn straight through on
            // its own side.
            loop {
                let (below_y, members, below_styles) = match column.last() {
                    Some(top) if top.y() + 1 < y => {
                        let members = top.as_yarn().map(|t| t.up_members()).unwrap_or_default();
                        (top.y(), members, top.styles().cloned())
                    }
                    _ => break,
                };
                let mut filler = YarnCell::new();
                for (c, side) in members {
                    filler.add_segment(c, Some(YarnPort::down(side)), Some(YarnPort::up(side)));
                }
                filler.set_y(below_y + 1);
                if let Some(s) = below_styles {
                    filler.set_styles(s);
                }
                column.push(Cell::Yarn(filler));
            }
        }

        cell.set_y(y);
        cell.set_styles(styles);

        // A top sitting exactly at the batch row is absorbed and replaced.
        if column.last().map_or(false, |t| t.y() == y) {
            match column.pop() {
                Some(Cell::Yarn(below)) => {
                    cell = cell.absorbing(below)?;
                }
                _ => unreachable!("yarn cell stacked level with a loop cell"),
            }
        }
        column.push(Cell::Yarn(cell));
        Ok(())
    }
}

/// Order-insensitive comparison of open-yarn memberships.
fn same_members(a: &[(CarrierId, Side)], b: &[(CarrierId, Side)]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a: Vec<_> = a.to_vec();
    let mut b: Vec<_> = b.to_vec();
    a.sort();
    b.sort();
    a == b
}

/// A crossing must carry exactly its carrier list on both endpoint ports.
fn check_crossing_balance(
    bed: Bed,
    batch: &[BatchCell],
    cross: &Crossing,
) -> Result<(), MachineError> {
    for end in [&cross.front, &cross.back] {
        let lane = end.bed;
        let unbalanced = || MachineError::UnbalancedCrossing {
            bed: lane,
            index: end.index,
        };
        let cell = batch
            .iter()
            .find(|bc| bc.bed.unwrap_or(bed) == lane && bc.index == end.index)
            .ok_or_else(unbalanced)?;
        let carried = endpoint_port_list(&cell.cell, end).ok_or_else(unbalanced)?;
        if carried != cross.carriers.as_slice() {
            return Err(unbalanced());
        }
    }
    Ok(())
}

fn endpoint_port_list<'a>(cell: &'a Cell, end: &CrossingEnd) -> Option<&'a [CarrierId]> {
    match (cell, end.port) {
        (Cell::Loop(c), CrossPort::Loop(p)) => Some(c.port(p)),
        (Cell::Yarn(c), CrossPort::Yarn(p)) => Some(c.port(p)),
        _ => None,
    }
}
