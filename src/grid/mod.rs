// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Grid storage: one sparse column store per bed lane.

pub mod columns;

pub use columns::{Column, Columns};

use crate::notation::Bed;

/// The four-lane cell grid.
#[derive(Debug, Default)]
pub struct Grid {
    lanes: [Columns; 4],
}

impl Grid {
    pub fn new() -> Grid {
        Grid::default()
    }

    /// The column store for one lane.
    pub fn lane(&self, bed: Bed) -> &Columns {
        &self.lanes[bed.lane_index()]
    }

    pub(crate) fn lane_mut(&mut self, bed: Bed) -> &mut Columns {
        &mut self.lanes[bed.lane_index()]
    }
}
