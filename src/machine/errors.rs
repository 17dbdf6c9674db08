// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error types for the machine engine.
//!
//! Three failure classes share one type: protocol violations (the caller
//! drove a carrier or needle token wrongly), topology violations (a computed
//! placement would break path contiguity or balance), and unsupported
//! configurations (cross-bed work at a racking the model cannot express).
//! All are raised immediately and halt the instruction; no violation is
//! repaired in place, because every invariant is load-bearing for later
//! placements.

use std::fmt;
use strum_macros::EnumCount as EnumCountMacro;

use crate::notation::{Bed, Needle, Racking};

/// Errors raised while replaying the instruction stream.
#[derive(Debug, Clone, PartialEq, EnumCountMacro)]
pub enum MachineError {
    /// `set_carriers` was called a second time.
    CarriersAlreadySet,

    /// An operation named a carrier that was never declared.
    UnknownCarrier { name: String },

    /// The same carrier appears twice in one operation's carrier list.
    DuplicateCarrier { name: String },

    /// `in`/`inhook` on a carrier that is already in.
    CarrierAlreadyIn { name: String },

    /// A stitch or `out` on a carrier that was never brought in.
    CarrierNotIn { name: String },

    /// A needle token failed the `^([fb]s?)([-+]?\d+)$` grammar.
    InvalidNeedle { token: String },

    /// A racking value that is neither an integer nor integer + 0.25.
    InvalidRacking { value: f64 },

    /// Knit/tuck/miss aimed at a slider lane (sliders only hold and
    /// transfer).
    SliderStitch { needle: Needle },

    /// Split/transfer endpoints on the same bed family.
    SameSideTransfer { from: Needle, to: Needle },

    /// Split/transfer endpoints that do not line up under the current
    /// racking.
    MisalignedTransfer {
        from: Needle,
        to: Needle,
        racking: Racking,
    },

    /// Split/transfer attempted while the quarter pitch is engaged.
    QuarterPitchTransfer { from: Needle, to: Needle },

    /// A needle column's open loops do not match what the new cell expects
    /// from below.
    BrokenLoopPath { bed: Bed, index: i32, row: u32 },

    /// A yarn column's open yarns do not match what the new cell expects
    /// from below.
    BrokenYarnPath { bed: Bed, index: i32, row: u32 },

    /// Absorption found a below-entering segment with no counterpart
    /// exiting the cell underneath (carrier given by ordinal).
    UnmatchedSegment { carrier: usize },

    /// A crossing's endpoint port does not carry exactly the crossing's
    /// carrier list.
    UnbalancedCrossing { bed: Bed, index: i32 },
}

impl fmt::Display for MachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineError::CarriersAlreadySet => {
                write!(f, "Carriers may only be set once")
            }
            MachineError::UnknownCarrier { name } => {
                write!(f, "Unknown carrier '{}'", name)
            }
            MachineError::DuplicateCarrier { name } => {
                write!(f, "Carrier '{}' listed twice in one operation", name)
            }
            MachineError::CarrierAlreadyIn { name } => {
                write!(f, "Carrier '{}' is already in", name)
            }
            MachineError::CarrierNotIn { name } => {
                write!(f, "Carrier '{}' is not in", name)
            }
            MachineError::InvalidNeedle { token } => {
                write!(f, "Invalid needle token '{}'", token)
            }
            MachineError::InvalidRacking { value } => {
                write!(
                    f,
                    "Invalid racking {} (must be an integer or integer + 0.25)",
                    value
                )
            }
            MachineError::SliderStitch { needle } => {
                write!(f, "Cannot stitch on slider needle {}", needle)
            }
            MachineError::SameSideTransfer { from, to } => {
                write!(f, "Transfer {} -> {} stays on one bed family", from, to)
            }
            MachineError::MisalignedTransfer { from, to, racking } => {
                write!(
                    f,
                    "Transfer {} -> {} is not aligned at racking {}",
                    from, to, racking
                )
            }
            MachineError::QuarterPitchTransfer { from, to } => {
                write!(
                    f,
                    "Transfer {} -> {} unsupported at quarter pitch",
                    from, to
                )
            }
            MachineError::BrokenLoopPath { bed, index, row } => {
                write!(
                    f,
                    "Loop path broken at {}{} row {}: loops out must exactly match loops in",
                    bed, index, row
                )
            }
            MachineError::BrokenYarnPath { bed, index, row } => {
                write!(
                    f,
                    "Yarn path broken at {}{} row {}: yarns out must exactly match yarns in",
                    bed, index, row
                )
            }
            MachineError::UnmatchedSegment { carrier } => {
                write!(
                    f,
                    "Absorbed segment for carrier {} has no continuation below",
                    carrier
                )
            }
            MachineError::UnbalancedCrossing { bed, index } => {
                write!(
                    f,
                    "Crossing at {}{} does not carry the same yarns on both sides",
                    bed, index
                )
            }
        }
    }
}

impl std::error::Error for MachineError {}
