// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Named cell ports.
//!
//! Every cell is a small port graph: a fixed set of named attachment points,
//! each holding an ordered list of carrier identifiers. Port names are enums
//! rather than strings, so a mistyped port is a compile error instead of a
//! runtime assertion.
//!
//! Loop cells use the six classic ports (`v ^ - + x o`). Yarn cells need a
//! fuller set to support quarter-pitch routing: their vertical ports are
//! sided (`v-`/`v+`, `^-`/`^+`) and their crossing ports come in an outer
//! (integer racking, `x`/`o`) and an inner (quarter pitch, `X`/`O`) lane on
//! each side.
//!
//! Port direction convention: `x`-family ports carry yarn *out toward the
//! other bed*, `o`-family ports receive yarn *arriving from the other bed*,
//! on whichever bed the cell sits.

use strum_macros::EnumIter;

use crate::notation::Side;

/// Ports of a loop cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum LoopPort {
    /// `v`: loop arriving from below.
    Down,
    /// `^`: loop departing above.
    Up,
    /// `-`: yarn arriving/leaving on the left.
    Left,
    /// `+`: yarn arriving/leaving on the right.
    Right,
    /// `x`: loop crossing out toward the other bed.
    CrossOut,
    /// `o`: loop crossing in from the other bed.
    CrossIn,
}

impl LoopPort {
    pub(crate) const COUNT: usize = 6;

    pub(crate) const fn idx(self) -> usize {
        self as usize
    }

    /// The port name as drawn in cell diagrams.
    pub fn glyph(self) -> &'static str {
        match self {
            LoopPort::Down => "v",
            LoopPort::Up => "^",
            LoopPort::Left => "-",
            LoopPort::Right => "+",
            LoopPort::CrossOut => "x",
            LoopPort::CrossIn => "o",
        }
    }
}

/// Ports of a yarn cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum YarnPort {
    /// `^-`: yarn departing up on the left side.
    UpLeft,
    /// `^+`: yarn departing up on the right side.
    UpRight,
    /// `-`: yarn arriving/leaving left.
    Left,
    /// `+`: yarn arriving/leaving right.
    Right,
    /// `x-`: crossing out toward the other bed, outer left lane.
    OutLeft,
    /// `X-`: crossing out, inner (quarter-pitch) left lane.
    OutInnerLeft,
    /// `X+`: crossing out, inner (quarter-pitch) right lane.
    OutInnerRight,
    /// `x+`: crossing out, outer right lane.
    OutRight,
    /// `o-`: crossing in from the other bed, outer left lane.
    InLeft,
    /// `O-`: crossing in, inner (quarter-pitch) left lane.
    InInnerLeft,
    /// `O+`: crossing in, inner (quarter-pitch) right lane.
    InInnerRight,
    /// `o+`: crossing in, outer right lane.
    InRight,
    /// `v-`: yarn arriving from below on the left side.
    DownLeft,
    /// `v+`: yarn arriving from below on the right side.
    DownRight,
}

impl YarnPort {
    pub(crate) const COUNT: usize = 14;

    pub(crate) const fn idx(self) -> usize {
        self as usize
    }

    /// The up port on the given side.
    pub fn up(side: Side) -> YarnPort {
        match side {
            Side::Left => YarnPort::UpLeft,
            Side::Right => YarnPort::UpRight,
        }
    }

    /// The down port on the given side.
    pub fn down(side: Side) -> YarnPort {
        match side {
            Side::Left => YarnPort::DownLeft,
            Side::Right => YarnPort::DownRight,
        }
    }

    /// The horizontal port on the given side.
    pub fn side_port(side: Side) -> YarnPort {
        match side {
            Side::Left => YarnPort::Left,
            Side::Right => YarnPort::Right,
        }
    }

    /// Outer (integer-racking) crossing-out port on the given side.
    pub fn out(side: Side) -> YarnPort {
        match side {
            Side::Left => YarnPort::OutLeft,
            Side::Right => YarnPort::OutRight,
        }
    }

    /// Outer (integer-racking) crossing-in port on the given side.
    pub fn cross_in(side: Side) -> YarnPort {
        match side {
            Side::Left => YarnPort::InLeft,
            Side::Right => YarnPort::InRight,
        }
    }

    /// True for `^-`/`^+`.
    pub fn is_up(self) -> bool {
        matches!(self, YarnPort::UpLeft | YarnPort::UpRight)
    }

    /// True for `v-`/`v+`.
    pub fn is_down(self) -> bool {
        matches!(self, YarnPort::DownLeft | YarnPort::DownRight)
    }

    /// True for the up and down ports, which absorption reconciles.
    pub fn is_vertical(self) -> bool {
        self.is_up() || self.is_down()
    }

    /// True for the eight cross-bed ports.
    pub fn is_crossing(self) -> bool {
        matches!(
            self,
            YarnPort::OutLeft
                | YarnPort::OutInnerLeft
                | YarnPort::OutInnerRight
                | YarnPort::OutRight
                | YarnPort::InLeft
                | YarnPort::InInnerLeft
                | YarnPort::InInnerRight
                | YarnPort::InRight
        )
    }

    /// True for the inner (quarter-pitch) crossing lanes.
    pub fn is_inner(self) -> bool {
        matches!(
            self,
            YarnPort::OutInnerLeft
                | YarnPort::OutInnerRight
                | YarnPort::InInnerLeft
                | YarnPort::InInnerRight
        )
    }

    /// The lateral side this port sits on.
    pub fn side(self) -> Side {
        match self {
            YarnPort::UpLeft
            | YarnPort::Left
            | YarnPort::OutLeft
            | YarnPort::OutInnerLeft
            | YarnPort::InLeft
            | YarnPort::InInnerLeft
            | YarnPort::DownLeft => Side::Left,
            YarnPort::UpRight
            | YarnPort::Right
            | YarnPort::OutRight
            | YarnPort::OutInnerRight
            | YarnPort::InRight
            | YarnPort::InInnerRight
            | YarnPort::DownRight => Side::Right,
        }
    }

    /// Lateral offset of a crossing port from the cell's column center, in
    /// column units. Inner lanes attach at ±0.25, outer lanes at ±0.5.
    /// Used to project crossings for the planarity check.
    pub fn offset(self) -> f64 {
        match self {
            YarnPort::OutLeft | YarnPort::InLeft => -0.5,
            YarnPort::OutInnerLeft | YarnPort::InInnerLeft => -0.25,
            YarnPort::OutInnerRight | YarnPort::InInnerRight => 0.25,
            YarnPort::OutRight | YarnPort::InRight => 0.5,
            _ => 0.0,
        }
    }

    /// The port name as drawn in cell diagrams.
    pub fn glyph(self) -> &'static str {
        match self {
            YarnPort::UpLeft => "^-",
            YarnPort::UpRight => "^+",
            YarnPort::Left => "-",
            YarnPort::Right => "+",
            YarnPort::OutLeft => "x-",
            YarnPort::OutInnerLeft => "X-",
            YarnPort::OutInnerRight => "X+",
            YarnPort::OutRight => "x+",
            YarnPort::InLeft => "o-",
            YarnPort::InInnerLeft => "O-",
            YarnPort::InInnerRight => "O+",
            YarnPort::InRight => "o+",
            YarnPort::DownLeft => "v-",
            YarnPort::DownRight => "v+",
        }
    }
}
