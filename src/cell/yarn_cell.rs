// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Yarn cells: pure yarn routing on the odd (inter-needle) columns.
//!
//! A yarn cell produces no loops; it only routes carrier yarn — turns,
//! floats, starts, cuts, and cross-bed bridges. The explicit segment list is
//! the source of truth for how each carrier traverses the cell; the per-port
//! carrier lists are a derived index kept consistent with it.
//!
//! # Absorption
//!
//! When the stacking engine places a yarn cell at the same row as the cell
//! currently topping its column, the new cell *absorbs* the old one: every
//! segment of the new cell that enters from below is fused with the old
//! cell's segment that exited above for the same carrier and side, and the
//! old cell's remaining segments are carried over. Absorption is modeled as
//! a functional merge — two cells in, one cell out — so the reconciliation
//! requirement (every below-entry finds its counterpart) is this function's
//! contract rather than an assertion buried in array surgery.
//!
//! A cell may only be absorbed while it is *pure vertical*: using no side or
//! crossing ports. Anything that has already turned, crossed beds, or picked
//! up yarn laterally is a committed row and stays one.

use std::sync::Arc;

use crate::cell::ports::YarnPort;
use crate::machine::carriers::CarrierId;
use crate::machine::errors::MachineError;
use crate::machine::styles::StyleMap;
use crate::notation::Side;

/// One carrier's path through a yarn cell.
///
/// `from`/`to` of `None` mean the yarn starts (carrier introduced here) or
/// ends (carrier taken out) inside this cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YarnSegment {
    pub carrier: CarrierId,
    pub from: Option<YarnPort>,
    pub to: Option<YarnPort>,
}

/// A yarn-routing cell at one (lane, yarn column, row) slot.
#[derive(Debug, Clone)]
pub struct YarnCell {
    y: u32,
    styles: Option<Arc<StyleMap>>,
    segments: Vec<YarnSegment>,
    ports: [Vec<CarrierId>; YarnPort::COUNT],
}

impl YarnCell {
    pub fn new() -> YarnCell {
        YarnCell {
            y: 0,
            styles: None,
            segments: Vec::new(),
            ports: std::array::from_fn(|_| Vec::new()),
        }
    }

    /// Append a segment and index it on its two ports.
    ///
    /// Callers pre-sort by carrier ordinal when several carriers share a
    /// port; the lists preserve insertion order (plating order).
    pub(crate) fn add_segment(
        &mut self,
        carrier: CarrierId,
        from: Option<YarnPort>,
        to: Option<YarnPort>,
    ) {
        if let Some(p) = from {
            self.ports[p.idx()].push(carrier);
        }
        if let Some(p) = to {
            self.ports[p.idx()].push(carrier);
        }
        self.segments.push(YarnSegment { carrier, from, to });
    }

    /// The carriers attached to a port, in plating order.
    pub fn port(&self, port: YarnPort) -> &[CarrierId] {
        &self.ports[port.idx()]
    }

    /// Every carrier path through this cell, in insertion order.
    pub fn segments(&self) -> &[YarnSegment] {
        &self.segments
    }

    /// Carriers leaving through the top, with the side they leave on.
    pub fn up_members(&self) -> Vec<(CarrierId, Side)> {
        self.vertical_members(|p| p.is_up())
    }

    /// Carriers entering from below, with the side they enter on.
    pub fn down_members(&self) -> Vec<(CarrierId, Side)> {
        self.vertical_members(|p| p.is_down())
    }

    fn vertical_members(&self, select: fn(YarnPort) -> bool) -> Vec<(CarrierId, Side)> {
        let mut members = Vec::new();
        for seg in &self.segments {
            for port in [seg.from, seg.to].into_iter().flatten() {
                if select(port) {
                    members.push((seg.carrier, port.side()));
                }
            }
        }
        members
    }

    /// True when any side or crossing port is in use. Such a cell is a
    /// committed row: it can no longer be absorbed.
    pub fn has_side_or_crossing_ports(&self) -> bool {
        self.segments.iter().any(|seg| {
            [seg.from, seg.to]
                .into_iter()
                .flatten()
                .any(|p| !p.is_vertical())
        })
    }

    /// Whether this (new) cell may absorb `below`, the current column top.
    pub fn can_absorb(&self, below: &YarnCell) -> bool {
        !below.has_side_or_crossing_ports()
    }

    /// Merge `below` into this cell, producing the combined cell.
    ///
    /// Every segment of `self` entering from below must find a counterpart
    /// segment of `below` exiting above with the same carrier on the same
    /// side; the pair fuses into one segment whose origin is the
    /// continuation further below. All of `below`'s unmatched segments are
    /// appended, and the port index is rebuilt from the merged segment list
    /// in order.
    pub(crate) fn absorbing(mut self, below: YarnCell) -> Result<YarnCell, MachineError> {
        let mut below_segments: Vec<Option<YarnSegment>> =
            below.segments.into_iter().map(Some).collect();

        for seg in &mut self.segments {
            let Some(from) = seg.from else { continue };
            if !from.is_down() {
                continue;
            }
            let matched = below_segments.iter_mut().find(|slot| {
                matches!(
                    slot,
                    Some(b) if b.carrier == seg.carrier
                        && matches!(b.to, Some(p) if p.is_up() && p.side() == from.side())
                )
            });
            match matched {
                Some(slot) => {
                    seg.from = slot.take().and_then(|b| b.from);
                }
                None => {
                    return Err(MachineError::UnmatchedSegment {
                        carrier: seg.carrier.as_usize(),
                    });
                }
            }
        }

        // Yarn that reached `below`'s top untouched by this cell continues
        // straight through to the merged cell's top.
        self.segments.extend(below_segments.into_iter().flatten());
        self.rebuild_ports();
        Ok(self)
    }

    fn rebuild_ports(&mut self) {
        for list in &mut self.ports {
            list.clear();
        }
        for i in 0..self.segments.len() {
            let YarnSegment { carrier, from, to } = self.segments[i];
            if let Some(p) = from {
                self.ports[p.idx()].push(carrier);
            }
            if let Some(p) = to {
                self.ports[p.idx()].push(carrier);
            }
        }
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

    /// Remove a carrier's terminating up-port exit (carrier taken out).
    ///
    /// The segment keeps its origin but now ends inside this cell.
    pub(crate) fn cut_up(&mut self, carrier: CarrierId) -> bool {
        let seg = self.segments.iter_mut().find(|s| {
            s.carrier == carrier && s.to.map_or(false, |p| p.is_up())
        });
        match seg {
            Some(seg) => {
                seg.to = None;
                self.rebuild_ports();
                true
            }
            None => false,
        }
    }

    /// Descriptor character for the raster dump: box-drawing selected by
    /// which of the left/right/down/up port groups are occupied.
    pub fn glyph(&self) -> char {
        const CHARS: [char; 16] = [
            ' ', '╴', '╶', '─', '╷', '╮', '╭', '┬', '╵', '╯', '╰', '┴', '│', '┤', '├', '┼',
        ];
        let mut bits = 0;
        if !self.port(YarnPort::Left).is_empty() {
            bits |= 1;
        }
        if !self.port(YarnPort::Right).is_empty() {
            bits |= 2;
        }
        if !self.port(YarnPort::DownLeft).is_empty() || !self.port(YarnPort::DownRight).is_empty()
        {
            bits |= 4;
        }
        if !self.port(YarnPort::UpLeft).is_empty() || !self.port(YarnPort::UpRight).is_empty() {
            bits |= 8;
        }
        CHARS[bits]
    }
}

impl Default for YarnCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: usize) -> CarrierId {
        CarrierId::new(n)
    }

    #[test]
    fn test_segments_index_ports() {
        let mut cell = YarnCell::new();
        cell.add_segment(id(0), Some(YarnPort::Left), Some(YarnPort::UpLeft));
        cell.add_segment(id(1), None, Some(YarnPort::UpRight));

        assert_eq!(cell.port(YarnPort::Left), &[id(0)]);
        assert_eq!(cell.port(YarnPort::UpLeft), &[id(0)]);
        assert_eq!(cell.port(YarnPort::UpRight), &[id(1)]);
        assert_eq!(cell.up_members(), vec![(id(0), Side::Left), (id(1), Side::Right)]);
        assert!(cell.down_members().is_empty());
    }

    #[test]
    fn test_pure_vertical_detection() {
        let mut pass = YarnCell::new();
        pass.add_segment(id(0), Some(YarnPort::DownLeft), Some(YarnPort::UpLeft));
        assert!(!pass.has_side_or_crossing_ports());

        let mut turn = YarnCell::new();
        turn.add_segment(id(0), Some(YarnPort::DownLeft), Some(YarnPort::Right));
        assert!(turn.has_side_or_crossing_ports());

        assert!(turn.can_absorb(&pass));
        assert!(!pass.can_absorb(&turn));
    }

    #[test]
    fn test_absorb_fuses_matching_segments() {
        // Below: a yarn start exiting up-right.
        let mut below = YarnCell::new();
        below.add_segment(id(0), None, Some(YarnPort::UpRight));

        // Above: consumes it from below-right and turns right.
        let mut above = YarnCell::new();
        above.add_segment(id(0), Some(YarnPort::DownRight), Some(YarnPort::Right));

        let merged = above.absorbing(below).unwrap();
        assert_eq!(merged.segments().len(), 1);
        assert_eq!(merged.segments()[0].from, None);
        assert_eq!(merged.segments()[0].to, Some(YarnPort::Right));
        assert!(merged.port(YarnPort::DownRight).is_empty());
        assert!(merged.port(YarnPort::UpRight).is_empty());
    }

    #[test]
    fn test_absorb_carries_untouched_segments() {
        // Below: carrier 0 passes through, carrier 1 was cut here.
        let mut below = YarnCell::new();
        below.add_segment(id(0), Some(YarnPort::DownLeft), Some(YarnPort::UpLeft));
        below.add_segment(id(1), Some(YarnPort::DownRight), None);

        // Above: only consumes carrier 0.
        let mut above = YarnCell::new();
        above.add_segment(id(0), Some(YarnPort::DownLeft), Some(YarnPort::Left));

        let merged = above.absorbing(below).unwrap();
        assert_eq!(merged.segments().len(), 2);
        assert_eq!(merged.segments()[0].from, Some(YarnPort::DownLeft));
        assert_eq!(merged.segments()[0].to, Some(YarnPort::Left));
        assert_eq!(merged.segments()[1].carrier, id(1));
        assert_eq!(merged.port(YarnPort::DownRight), &[id(1)]);
    }

    #[test]
    fn test_absorb_unmatched_is_fatal() {
        let below = YarnCell::new();
        let mut above = YarnCell::new();
        above.add_segment(id(0), Some(YarnPort::DownLeft), Some(YarnPort::UpLeft));

        assert!(matches!(
            above.absorbing(below),
            Err(MachineError::UnmatchedSegment { carrier: 0 })
        ));
    }

    #[test]
    fn test_cut_up() {
        let mut cell = YarnCell::new();
        cell.add_segment(id(0), Some(YarnPort::Left), Some(YarnPort::UpLeft));
        assert!(cell.cut_up(id(0)));
        assert!(cell.port(YarnPort::UpLeft).is_empty());
        assert_eq!(cell.segments()[0].to, None);
        assert!(!cell.cut_up(id(0)));
    }

    #[test]
    fn test_glyph_bits() {
        let mut cell = YarnCell::new();
        cell.add_segment(id(0), Some(YarnPort::Left), Some(YarnPort::Right));
        assert_eq!(cell.glyph(), '─');

        let mut cell = YarnCell::new();
        cell.add_segment(id(0), Some(YarnPort::DownLeft), Some(YarnPort::UpLeft));
        assert_eq!(cell.glyph(), '│');

        let mut cell = YarnCell::new();
        cell.add_segment(id(0), Some(YarnPort::Right), Some(YarnPort::UpRight));
        assert_eq!(cell.glyph(), '╰');
    }
}
