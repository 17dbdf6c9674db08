// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Needle tokens and column index arithmetic.
//!
//! Needle names match `^([fb]s?)([-+]?\d+)$` — bed letter, optional `s` for
//! the slider lane, signed needle number. This grammar is part of the input
//! protocol and must be preserved bit-exactly.
//!
//! The grid interleaves needle and yarn columns: a needle with number `m`
//! occupies column `2m` (always even), and the yarn gaps on either side of
//! it occupy the odd columns `2m - 1` and `2m + 1`. "Before" and "after" a
//! needle are relative to the carriage direction.

use std::fmt;
use std::str::FromStr;

use crate::machine::errors::MachineError;
use crate::notation::{Bed, Direction};

/// A parsed needle name: a bed lane plus a signed needle number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Needle {
    pub bed: Bed,
    pub number: i32,
}

impl Needle {
    pub fn new(bed: Bed, number: i32) -> Needle {
        Needle { bed, number }
    }

    /// Grid column of this needle (always even).
    pub fn index(self) -> i32 {
        2 * self.number
    }

    /// Yarn column just before this needle for a stitch in direction `d`.
    pub fn yarn_before(self, d: Direction) -> i32 {
        match d {
            Direction::Right => self.index() - 1,
            Direction::Left => self.index() + 1,
        }
    }

    /// Yarn column just after this needle for a stitch in direction `d`.
    pub fn yarn_after(self, d: Direction) -> i32 {
        match d {
            Direction::Right => self.index() + 1,
            Direction::Left => self.index() - 1,
        }
    }

    /// The needle one position higher on the same lane.
    pub fn next(self) -> Needle {
        Needle::new(self.bed, self.number + 1)
    }

    /// The needle one position lower on the same lane.
    pub fn previous(self) -> Needle {
        Needle::new(self.bed, self.number - 1)
    }
}

impl FromStr for Needle {
    type Err = MachineError;

    fn from_str(token: &str) -> Result<Needle, MachineError> {
        let invalid = || MachineError::InvalidNeedle {
            token: token.to_string(),
        };

        if !(token.starts_with('f') || token.starts_with('b')) {
            return Err(invalid());
        }
        let bed_len = if token[1..].starts_with('s') { 2 } else { 1 };
        let bed = Bed::from_token(&token[..bed_len]).ok_or_else(invalid)?;

        let digits = &token[bed_len..];
        let unsigned = digits
            .strip_prefix('-')
            .or_else(|| digits.strip_prefix('+'))
            .unwrap_or(digits);
        if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let number: i32 = digits.parse().map_err(|_| invalid())?;
        Ok(Needle::new(bed, number))
    }
}

impl fmt::Display for Needle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.bed, self.number)
    }
}
