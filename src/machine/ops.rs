// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The operation builders: knit, tuck, miss, split.
//!
//! Each builder constructs the loop cell(s) for its stitch, delegates
//! carrier movement to the router, and submits everything to the stacking
//! engine. Knit, tuck and miss share one sequence: route the carriers in,
//! turn them toward the needle, place the face, turn them back up, re-park.
//!
//! Loop-ordering rules (physical stacking order of loops on a needle):
//! a tuck or split target on the *back* bed lists pre-existing loops before
//! the newly arriving ones; on the *front* bed, after them.

use log::debug;

use crate::cell::{Cell, CrossPort, Crossing, CrossingEnd, CrossingKind, LoopCell, LoopPort, StitchKind};
use crate::machine::carriers::CarrierId;
use crate::machine::errors::MachineError;
use crate::machine::stacking::BatchCell;
use crate::machine::Machine;
use crate::notation::{Direction, Needle};

impl Machine {
    /// Knit at `n`: consume every loop queued there and produce one new
    /// loop per carrier.
    pub fn knit(&mut self, d: Direction, n: Needle, carriers: &[&str]) -> Result<(), MachineError> {
        let cs = self.stitch_carriers(n, carriers)?;
        debug!("knit {} {} {:?}", d, n, carriers);

        let mut face = LoopCell::new(StitchKind::Knit);
        for c in self.queued_loops(n) {
            face.add(LoopPort::Down, c);
        }
        for &c in &cs {
            face.add(yarn_in_port(d), c);
            face.add(LoopPort::Up, c);
            face.add(yarn_out_port(d), c);
        }
        self.knit_tuck(d, n, &cs, face)
    }

    /// Tuck at `n`: like knit, but the old loops stay alive alongside the
    /// new ones.
    pub fn tuck(&mut self, d: Direction, n: Needle, carriers: &[&str]) -> Result<(), MachineError> {
        let cs = self.stitch_carriers(n, carriers)?;
        debug!("tuck {} {} {:?}", d, n, carriers);

        let mut face = LoopCell::new(StitchKind::Tuck);
        let old_loops = self.queued_loops(n);
        let add_old = |face: &mut LoopCell| {
            for &c in &old_loops {
                face.add(LoopPort::Down, c);
                face.add(LoopPort::Up, c);
            }
        };

        if n.bed.is_back_family() {
            add_old(&mut face);
        }
        for &c in &cs {
            face.add(yarn_in_port(d), c);
            face.add(LoopPort::Up, c);
            face.add(yarn_out_port(d), c);
        }
        if n.bed.is_front_family() {
            add_old(&mut face);
        }
        self.knit_tuck(d, n, &cs, face)
    }

    /// Miss at `n`: pass the existing loops straight through and float the
    /// carriers' yarn across the needle. Reuses the full knit/tuck
    /// sequencing even though no loop is produced.
    pub fn miss(&mut self, d: Direction, n: Needle, carriers: &[&str]) -> Result<(), MachineError> {
        let cs = self.stitch_carriers(n, carriers)?;
        debug!("miss {} {} {:?}", d, n, carriers);

        let mut face = LoopCell::new(StitchKind::Miss);
        for c in self.queued_loops(n) {
            face.add(LoopPort::Down, c);
            face.add(LoopPort::Up, c);
        }
        for &c in &cs {
            face.add(yarn_in_port(d), c);
            face.add(yarn_out_port(d), c);
        }
        self.knit_tuck(d, n, &cs, face)
    }

    /// Split from `n` to `n2`: move the loops at `n` across the beds into
    /// `n2`, and (when carriers are given) knit a fresh loop into `n` on
    /// the way. Without carriers this is a plain transfer.
    pub fn split(
        &mut self,
        d: Direction,
        n: Needle,
        n2: Needle,
        carriers: &[&str],
    ) -> Result<(), MachineError> {
        let cs = self.resolve_carriers(carriers)?;
        debug!("split {} {} -> {} {:?}", d, n, n2, carriers);

        if n.bed.is_front_family() == n2.bed.is_front_family() {
            return Err(MachineError::SameSideTransfer { from: n, to: n2 });
        }
        if self.racking().is_quarter() {
            return Err(MachineError::QuarterPitchTransfer { from: n, to: n2 });
        }
        let (front_n, back_n) = if n.bed.is_front_family() { (n, n2) } else { (n2, n) };
        if front_n.number != back_n.number + self.racking().base() {
            return Err(MachineError::MisalignedTransfer {
                from: n,
                to: n2,
                racking: self.racking(),
            });
        }

        self.bring_carriers(d, n, &cs)?;

        let mut source = LoopCell::new(if cs.is_empty() {
            StitchKind::TransferSource
        } else {
            StitchKind::SplitSource
        });
        for &c in &cs {
            source.add(yarn_in_port(d), c);
            source.add(LoopPort::Up, c);
            source.add(yarn_out_port(d), c);
        }

        let mut target = LoopCell::new(if cs.is_empty() {
            StitchKind::TransferTarget
        } else {
            StitchKind::SplitTarget
        });
        let moved = self.queued_loops(n);
        let prior = self.queued_loops(n2);
        let add_prior = |target: &mut LoopCell| {
            for &c in &prior {
                target.add(LoopPort::Down, c);
                target.add(LoopPort::Up, c);
            }
        };

        if n2.bed.is_back_family() {
            add_prior(&mut target);
        }
        for &c in &moved {
            source.add(LoopPort::Down, c);
            source.add(LoopPort::CrossOut, c);
            target.add(LoopPort::CrossIn, c);
            target.add(LoopPort::Up, c);
        }
        if n2.bed.is_front_family() {
            add_prior(&mut target);
        }

        let cross = Crossing::new(
            if cs.is_empty() {
                CrossingKind::Transfer
            } else {
                CrossingKind::Split
            },
            CrossingEnd::new(n.bed, n.index(), CrossPort::Loop(LoopPort::CrossOut)),
            CrossingEnd::new(n2.bed, n2.index(), CrossPort::Loop(LoopPort::CrossIn)),
            moved,
        );

        let mut batch = Vec::new();
        if let Some(turn) = self.turn_before_cell(d, n, &cs)? {
            batch.push(turn);
        }
        batch.push(BatchCell::at(n.index(), Cell::Loop(source)));
        batch.push(BatchCell::on(n2.bed, n2.index(), Cell::Loop(target)));
        if let Some(turn) = self.turn_after_cell(d, n, &cs) {
            batch.push(turn);
        }
        self.add_cells(n.bed, batch, Some(cross))?;
        self.finish_after(d, n, &cs)
    }

    /// The shared stitch sequence: route carriers in, turn before, place
    /// the face, turn after, re-park.
    fn knit_tuck(
        &mut self,
        d: Direction,
        n: Needle,
        cs: &[CarrierId],
        face: LoopCell,
    ) -> Result<(), MachineError> {
        self.bring_carriers(d, n, cs)?;

        let mut batch = Vec::new();
        if let Some(turn) = self.turn_before_cell(d, n, cs)? {
            batch.push(turn);
        }
        batch.push(BatchCell::at(n.index(), Cell::Loop(face)));
        if let Some(turn) = self.turn_after_cell(d, n, cs) {
            batch.push(turn);
        }
        self.add_cells(n.bed, batch, None)?;
        self.finish_after(d, n, cs)
    }

    /// Resolve and validate the carrier set for a knit/tuck/miss at `n`.
    fn stitch_carriers(
        &self,
        n: Needle,
        carriers: &[&str],
    ) -> Result<Vec<CarrierId>, MachineError> {
        if n.bed.is_slider() {
            return Err(MachineError::SliderStitch { needle: n });
        }
        self.resolve_carriers(carriers)
    }

    /// The loops currently queued at a needle, in stacking order.
    fn queued_loops(&self, n: Needle) -> Vec<CarrierId> {
        self.grid()
            .lane(n.bed)
            .top(n.index())
            .and_then(|c| c.as_loop())
            .map(|c| c.port(LoopPort::Up).to_vec())
            .unwrap_or_default()
    }
}

/// The side port a carrier's yarn enters a face through.
fn yarn_in_port(d: Direction) -> LoopPort {
    match d {
        Direction::Right => LoopPort::Left,
        Direction::Left => LoopPort::Right,
    }
}

/// The side port a carrier's yarn leaves a face through.
fn yarn_out_port(d: Direction) -> LoopPort {
    match d {
        Direction::Right => LoopPort::Right,
        Direction::Left => LoopPort::Left,
    }
}
