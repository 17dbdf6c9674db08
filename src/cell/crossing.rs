// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Cross-bed crossing records.
//!
//! Every yarn or loop transit between the front and back bed families is
//! recorded as a crossing: the two endpoint (bed, column, port) triples, the
//! carriers involved, and the row it was placed at. The machine keeps the
//! crossing list ordered by row, descending.
//!
//! Two crossings may share a row only if their projected endpoints are
//! strictly ordered the same way on both lanes; anything else would force
//! the drawn lines to intersect in a planar rendering, so the stacking
//! engine raises the row of the incoming crossing past the conflict. The
//! projection is a fractional x per lane: the column index plus the lateral
//! offset of the port used (inner quarter-pitch lanes at ±0.25, outer lanes
//! at ±0.5, loop crossings at the column center).

use std::sync::Arc;

use crate::cell::ports::{LoopPort, YarnPort};
use crate::machine::carriers::CarrierId;
use crate::machine::styles::StyleMap;
use crate::notation::Bed;

/// What kind of object crosses between the beds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingKind {
    /// Carrier yarn bridged between beds by the router.
    Yarn,
    /// Loops moved by a plain (carrierless) transfer.
    Transfer,
    /// Loops moved by a split.
    Split,
}

/// The port a crossing attaches to on one of its endpoint cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossPort {
    Loop(LoopPort),
    Yarn(YarnPort),
}

impl CrossPort {
    /// Lateral offset of the attachment point from the column center.
    pub fn offset(self) -> f64 {
        match self {
            CrossPort::Loop(_) => 0.0,
            CrossPort::Yarn(p) => p.offset(),
        }
    }

    /// Crossings must attach to crossing-class ports.
    pub(crate) fn is_crossing(self) -> bool {
        match self {
            CrossPort::Loop(p) => matches!(p, LoopPort::CrossOut | LoopPort::CrossIn),
            CrossPort::Yarn(p) => p.is_crossing(),
        }
    }
}

/// One endpoint of a crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingEnd {
    pub bed: Bed,
    pub index: i32,
    pub port: CrossPort,
}

impl CrossingEnd {
    pub fn new(bed: Bed, index: i32, port: CrossPort) -> CrossingEnd {
        CrossingEnd { bed, index, port }
    }

    /// The projected lateral position of this endpoint on its lane.
    pub fn x(&self) -> f64 {
        self.index as f64 + self.port.offset()
    }
}

/// A recorded yarn-or-loop transit between the bed families at one row.
#[derive(Debug, Clone)]
pub struct Crossing {
    pub kind: CrossingKind,
    /// Endpoint on the front bed family.
    pub front: CrossingEnd,
    /// Endpoint on the back bed family.
    pub back: CrossingEnd,
    /// The carriers (yarn or loop owners) crossing, in plating order.
    pub carriers: Vec<CarrierId>,
    row: u32,
    styles: Option<Arc<StyleMap>>,
}

impl Crossing {
    /// Build a crossing from its two endpoints, in either order.
    ///
    /// The endpoints must lie on opposite bed families and attach to
    /// crossing-class ports; the operation builders construct them that way.
    pub(crate) fn new(
        kind: CrossingKind,
        a: CrossingEnd,
        b: CrossingEnd,
        carriers: Vec<CarrierId>,
    ) -> Crossing {
        debug_assert!(
            a.bed.is_front_family() != b.bed.is_front_family(),
            "crossing endpoints must be on opposite bed families"
        );
        debug_assert!(a.port.is_crossing() && b.port.is_crossing());
        let (front, back) = if a.bed.is_front_family() { (a, b) } else { (b, a) };
        Crossing {
            kind,
            front,
            back,
            carriers,
            row: 0,
            styles: None,
        }
    }

    /// The row this crossing was placed at.
    pub fn row(&self) -> u32 {
        self.row
    }

    pub(crate) fn set_row(&mut self, row: u32) {
        self.row = row;
    }

    /// The style table snapshot current when this crossing was placed.
    pub fn styles(&self) -> Option<&Arc<StyleMap>> {
        self.styles.as_ref()
    }

    pub(crate) fn set_styles(&mut self, styles: Arc<StyleMap>) {
        self.styles = Some(styles);
    }

    /// True when this crossing and `other` may share a row: their projected
    /// endpoints are strictly ordered the same way on both lanes.
    pub fn compatible_with(&self, other: &Crossing) -> bool {
        let (f1, b1) = (self.front.x(), self.back.x());
        let (f2, b2) = (other.front.x(), other.back.x());
        (f1 < f2 && b1 < b2) || (f1 > f2 && b1 > b2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yarn_end(bed: Bed, index: i32, port: YarnPort) -> CrossingEnd {
        CrossingEnd::new(bed, index, CrossPort::Yarn(port))
    }

    fn cross(front_index: i32, back_index: i32) -> Crossing {
        Crossing::new(
            CrossingKind::Yarn,
            yarn_end(Bed::Front, front_index, YarnPort::OutRight),
            yarn_end(Bed::Back, back_index, YarnPort::InRight),
            vec![CarrierId::new(0)],
        )
    }

    #[test]
    fn test_endpoints_normalized() {
        let c = Crossing::new(
            CrossingKind::Transfer,
            CrossingEnd::new(Bed::Back, 2, CrossPort::Loop(LoopPort::CrossOut)),
            CrossingEnd::new(Bed::Front, 4, CrossPort::Loop(LoopPort::CrossIn)),
            vec![],
        );
        assert_eq!(c.front.bed, Bed::Front);
        assert_eq!(c.front.index, 4);
        assert_eq!(c.back.bed, Bed::Back);
    }

    #[test]
    fn test_same_order_crossings_are_compatible() {
        let a = cross(1, 3);
        let b = cross(5, 7);
        assert!(a.compatible_with(&b));
        assert!(b.compatible_with(&a));
    }

    #[test]
    fn test_inverted_crossings_conflict() {
        let a = cross(1, 7);
        let b = cross(5, 3);
        assert!(!a.compatible_with(&b));
    }

    #[test]
    fn test_shared_endpoint_conflicts() {
        // Equal on one lane, ordered on the other: not strictly same-order.
        let a = cross(1, 3);
        let b = cross(1, 7);
        assert!(!a.compatible_with(&b));
    }

    #[test]
    fn test_port_offsets_disambiguate_same_column() {
        // Two quarter-pitch crossings out of the same front column, one per
        // inner lane, headed to back columns on matching sides.
        let a = Crossing::new(
            CrossingKind::Yarn,
            yarn_end(Bed::Front, 1, YarnPort::OutInnerLeft),
            yarn_end(Bed::Back, -1, YarnPort::InInnerRight),
            vec![CarrierId::new(0)],
        );
        let b = Crossing::new(
            CrossingKind::Yarn,
            yarn_end(Bed::Front, 1, YarnPort::OutInnerRight),
            yarn_end(Bed::Back, 1, YarnPort::InInnerLeft),
            vec![CarrierId::new(1)],
        );
        assert!(a.compatible_with(&b));
    }
}
