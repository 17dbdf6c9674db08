// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Racking: the lateral offset between the two beds.
//!
//! Legal rackings are an integer number of needles, or an integer plus a
//! quarter pitch. At racking `R`, back needle `m` is aligned with front
//! needle `m + R`; in grid-column units (two columns per needle) the
//! back-to-front shift is `2R`. The quarter pitch offsets the back bed a
//! further half column to the right, so that back needles sit between front
//! needle pairs instead of across from single front needles.

use std::fmt;

use crate::machine::errors::MachineError;

/// A validated racking value: `base` needles plus an optional quarter pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Racking {
    base: i32,
    quarter: bool,
}

impl Racking {
    /// Aligned racking zero, the initial state of the machine.
    pub const ZERO: Racking = Racking {
        base: 0,
        quarter: false,
    };

    /// Validate a raw racking value.
    ///
    /// Accepts exactly the values `k` and `k + 0.25` for integer `k`;
    /// everything else (half pitch, arbitrary fractions, non-finite values)
    /// is a protocol violation.
    pub fn try_from_value(value: f64) -> Result<Racking, MachineError> {
        if !value.is_finite() || value < i32::MIN as f64 || value > i32::MAX as f64 {
            return Err(MachineError::InvalidRacking { value });
        }
        let base = value.floor();
        let fraction = value - base;
        if fraction != 0.0 && fraction != 0.25 {
            return Err(MachineError::InvalidRacking { value });
        }
        Ok(Racking {
            base: base as i32,
            quarter: fraction == 0.25,
        })
    }

    /// Whole-needle part of the racking.
    pub fn base(self) -> i32 {
        self.base
    }

    /// True when the quarter pitch is engaged.
    pub fn is_quarter(self) -> bool {
        self.quarter
    }

    /// Back-to-front column shift: a back-lane column `i` sits at front-lane
    /// position `i + column_shift()` (plus half a column under quarter
    /// pitch).
    pub fn column_shift(self) -> i32 {
        2 * self.base
    }

    /// The racking as the raw value it was set from.
    pub fn value(self) -> f64 {
        self.base as f64 + if self.quarter { 0.25 } else { 0.0 }
    }
}

impl fmt::Display for Racking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quarter {
            write!(f, "{}.25", self.base)
        } else {
            write!(f, "{}", self.base)
        }
    }
}
