// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Loop cells: stitch events on needle columns.
//!
//! A loop cell records one stitch-class event at a needle position — a knit,
//! tuck, miss/float, or one side of a split/transfer. Stitch operations are
//! atomic: a loop cell is never absorbed into the cell beneath it and never
//! absorbs anything itself.

use std::sync::Arc;

use crate::cell::ports::LoopPort;
use crate::machine::carriers::CarrierId;
use crate::machine::styles::StyleMap;

/// The kind of stitch event a loop cell records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StitchKind {
    Knit,
    Tuck,
    /// A float: loops and/or yarn pass straight through.
    Miss,
    /// Source needle of a split (carriers present).
    SplitSource,
    /// Target needle of a split.
    SplitTarget,
    /// Source needle of a plain (carrierless) transfer.
    TransferSource,
    /// Target needle of a plain transfer.
    TransferTarget,
}

impl StitchKind {
    /// One-character descriptor, as drawn by the raster dump.
    pub fn glyph(self) -> char {
        match self {
            StitchKind::Knit => '∩',
            StitchKind::Tuck => '∧',
            StitchKind::Miss => '┄',
            StitchKind::SplitSource => '┰',
            StitchKind::SplitTarget => '┸',
            StitchKind::TransferSource => '╻',
            StitchKind::TransferTarget => '╹',
        }
    }
}

/// A stitch event at one (lane, needle column, row) slot.
///
/// Ports hold carrier identifiers in order; for the `Up` port of a needle
/// column the order is the physical stacking order of loops on the needle.
#[derive(Debug, Clone)]
pub struct LoopCell {
    pub kind: StitchKind,
    y: u32,
    styles: Option<Arc<StyleMap>>,
    ports: [Vec<CarrierId>; LoopPort::COUNT],
}

impl LoopCell {
    pub fn new(kind: StitchKind) -> LoopCell {
        LoopCell {
            kind,
            y: 0,
            styles: None,
            ports: std::array::from_fn(|_| Vec::new()),
        }
    }

    /// Append a carrier to a port, preserving caller-supplied order.
    pub(crate) fn add(&mut self, port: LoopPort, carrier: CarrierId) {
        self.ports[port.idx()].push(carrier);
    }

    /// The carriers attached to a port, in stacking order.
    pub fn port(&self, port: LoopPort) -> &[CarrierId] {
        &self.ports[port.idx()]
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub(crate) fn set_y(&mut self, y: u32) {
        self.y = y;
    }

    /// The style table snapshot current when this cell was placed.
    pub fn styles(&self) -> Option<&Arc<StyleMap>> {
        self.styles.as_ref()
    }

    pub(crate) fn set_styles(&mut self, styles: Arc<StyleMap>) {
        self.styles = Some(styles);
    }

    /// Descriptor character for the raster dump.
    pub fn glyph(&self) -> char {
        self.kind.glyph()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ports_start_empty() {
        let cell = LoopCell::new(StitchKind::Knit);
        for port in [
            LoopPort::Down,
            LoopPort::Up,
            LoopPort::Left,
            LoopPort::Right,
            LoopPort::CrossOut,
            LoopPort::CrossIn,
        ] {
            assert!(cell.port(port).is_empty());
        }
    }

    #[test]
    fn test_add_preserves_order() {
        let mut cell = LoopCell::new(StitchKind::Tuck);
        cell.add(LoopPort::Up, CarrierId::new(2));
        cell.add(LoopPort::Up, CarrierId::new(0));
        let ups: Vec<usize> = cell.port(LoopPort::Up).iter().map(|c| c.as_usize()).collect();
        assert_eq!(ups, vec![2, 0]);
    }
}
