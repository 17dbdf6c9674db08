// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The machine engine.
//!
//! [`Machine`] owns all run state — the four-lane cell grid, the carrier
//! table, the crossing list, the current racking and top row, and the style
//! table — and exposes the typed instruction surface the stream parser
//! drives plus the read-only surface renderers consume.
//!
//! # Processing model
//!
//! Single-threaded and synchronous: each instruction fully completes
//! (including all nested `add_cells` calls) before the next begins, because
//! row placement and crossing-order decisions depend on all prior state.
//! A multi-threaded host must serialize dispatch through the `&mut self`
//! receiver. There is no cancellation and no internal retry: a malformed
//! stream fails fast with a [`MachineError`] and the caller discards the
//! (possibly inconsistent) partial grid.
//!
//! Submodules, leaf-first: `carriers` (the carrier table), `styles`
//! (copy-on-write style snapshots), `stacking` (the `add_cells` merge
//! engine), `router` (carrier movement and bed bridges), `ops` (the
//! knit/tuck/split/miss builders).

pub mod carriers;
pub mod errors;
pub mod ops;
pub mod router;
pub mod stacking;
pub mod styles;

pub use errors::MachineError;

use std::sync::Arc;

use log::{debug, info};

use crate::cell::{Cell, Crossing};
use crate::grid::{Columns, Grid};
use crate::machine::carriers::{Carrier, CarrierId, CarrierState};
use crate::machine::styles::{default_carrier_style, Style, StyleMap};
use crate::notation::{Bed, Racking};

/// The cell machine: replays an instruction stream into a validated
/// topological record of loops and yarn.
#[derive(Debug)]
pub struct Machine {
    grid: Grid,
    carriers: Vec<Carrier>,
    crossings: Vec<Crossing>,
    top_row: u32,
    racking: Racking,
    styles: Arc<StyleMap>,
    default_styles: Arc<StyleMap>,
    last_stitch: Option<(f64, f64)>,
}

impl Machine {
    pub fn new() -> Machine {
        Machine {
            grid: Grid::new(),
            carriers: Vec::new(),
            crossings: Vec::new(),
            top_row: 0,
            racking: Racking::ZERO,
            styles: Arc::new(StyleMap::new()),
            default_styles: Arc::new(StyleMap::new()),
            last_stitch: None,
        }
    }

    // ----- instruction surface (non-stitch) -----

    /// Declare the carrier set, front to back. May only be called once;
    /// also installs the default rainbow style for each carrier.
    pub fn set_carriers(&mut self, names: &[&str]) -> Result<(), MachineError> {
        if !self.carriers.is_empty() {
            return Err(MachineError::CarriersAlreadySet);
        }
        let mut styles = StyleMap::new();
        for (ordinal, name) in names.iter().enumerate() {
            if names[..ordinal].contains(name) {
                return Err(MachineError::DuplicateCarrier {
                    name: name.to_string(),
                });
            }
            self.carriers
                .push(Carrier::new(name.to_string(), CarrierId::new(ordinal)));
            styles.insert(name.to_string(), default_carrier_style(ordinal));
        }
        self.styles = Arc::new(styles);
        self.default_styles = self.styles.clone();
        info!("carriers set: {:?}", names);
        Ok(())
    }

    /// `in`: announce carriers; their yarn starts at first use.
    pub fn carrier_in(&mut self, names: &[&str]) -> Result<(), MachineError> {
        for name in names {
            let id = self.carrier_id(name)?;
            let carrier = &mut self.carriers[id.as_usize()];
            if carrier.state != CarrierState::Out {
                return Err(MachineError::CarrierAlreadyIn {
                    name: name.to_string(),
                });
            }
            carrier.state = CarrierState::Ready;
        }
        Ok(())
    }

    /// `inhook`: the yarn-inserting hook makes no topological difference.
    pub fn carrier_in_hook(&mut self, names: &[&str]) -> Result<(), MachineError> {
        self.carrier_in(names)
    }

    /// `releasehook`: no topological effect.
    pub fn release_hook(&mut self, _names: &[&str]) -> Result<(), MachineError> {
        Ok(())
    }

    /// `out`: terminate each carrier's yarn at the top of its parked column
    /// and return the carrier to the not-introduced state.
    pub fn carrier_out(&mut self, names: &[&str]) -> Result<(), MachineError> {
        for name in names {
            let id = self.carrier_id(name)?;
            match self.carriers[id.as_usize()].state {
                CarrierState::Out => {
                    return Err(MachineError::CarrierNotIn {
                        name: name.to_string(),
                    });
                }
                CarrierState::Ready => {}
                CarrierState::Parked(parking) => {
                    self.cut_parked_yarn(id, parking.column)?;
                }
            }
            self.carriers[id.as_usize()].state = CarrierState::Out;
            debug!("carrier {} out", name);
        }
        Ok(())
    }

    /// `outhook`: the hook makes no topological difference.
    pub fn carrier_out_hook(&mut self, names: &[&str]) -> Result<(), MachineError> {
        self.carrier_out(names)
    }

    /// Set the racking for all subsequent needle correspondence and carrier
    /// routing.
    pub fn rack(&mut self, value: f64) -> Result<(), MachineError> {
        self.racking = Racking::try_from_value(value)?;
        debug!("racking set to {}", self.racking);
        Ok(())
    }

    /// `stitch`: recorded, inert in the topology model.
    pub fn stitch(&mut self, leading: f64, stitch: f64) {
        self.last_stitch = Some((leading, stitch));
    }

    /// `pause`: no-op.
    pub fn pause(&mut self) {}

    /// `x-vis-color`: associate a display color with a carrier set.
    ///
    /// Copy-on-write: the current style table is snapshotted before the
    /// update, so cells created earlier keep referencing the styles active
    /// at their creation time. `"auto"` restores the default style for the
    /// key, or removes it if there is none.
    pub fn set_visual_color(&mut self, color: &str, carrier_names: &[&str]) {
        let key = carrier_names.join(" ");
        let mut styles: StyleMap = (*self.styles).clone();
        if color == "auto" {
            match self.default_styles.get(&key) {
                Some(style) => styles.insert(key, style.clone()),
                None => styles.remove(&key),
            };
        } else {
            styles.insert(
                key,
                Style {
                    color: color.to_string(),
                },
            );
        }
        self.styles = Arc::new(styles);
    }

    // ----- read-only surface -----

    /// The row at which the most recent batch of cells was placed.
    pub fn top_row(&self) -> u32 {
        self.top_row
    }

    /// The current racking.
    pub fn racking(&self) -> Racking {
        self.racking
    }

    /// The most recent `stitch` setting, if any.
    pub fn last_stitch(&self) -> Option<(f64, f64)> {
        self.last_stitch
    }

    /// The column store for one bed lane.
    pub fn lane(&self, bed: Bed) -> &Columns {
        self.grid.lane(bed)
    }

    /// All crossings, ordered by row descending.
    pub fn crossings(&self) -> &[Crossing] {
        &self.crossings
    }

    /// All carriers, front to back.
    pub fn carriers(&self) -> &[Carrier] {
        &self.carriers
    }

    /// Look up a carrier by name.
    pub fn carrier_named(&self, name: &str) -> Option<&Carrier> {
        self.carriers.iter().find(|c| c.name == name)
    }

    /// Render the grid as an ASCII raster, one block per non-empty lane
    /// (joined left to right with `" | "`), rows top-down. A debugging aid.
    pub fn dump(&self) -> String {
        let mut min_index = i32::MAX;
        let mut max_index = i32::MIN;
        for bed in Bed::ALL {
            if let Some((min, max)) = self.grid.lane(bed).range() {
                min_index = min_index.min(min);
                max_index = max_index.max(max);
            }
        }
        if min_index > max_index {
            return String::new();
        }

        let width = (max_index - min_index + 1) as usize;
        let height = self.top_row as usize + 1;
        let mut blocks: Vec<Vec<String>> = Vec::new();
        for bed in Bed::ALL {
            let lane = self.grid.lane(bed);
            if lane.range().is_none() {
                continue;
            }
            let mut raster = vec![' '; width * height];
            for (index, column) in lane.iter() {
                for cell in column {
                    let x = (index - min_index) as usize;
                    raster[cell.y() as usize * width + x] = cell.glyph();
                }
            }
            let rows: Vec<String> = (0..height)
                .rev()
                .map(|y| raster[y * width..(y + 1) * width].iter().collect())
                .collect();
            blocks.push(rows);
        }

        (0..height)
            .map(|row| {
                blocks
                    .iter()
                    .map(|block| block[row].as_str())
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ----- internal helpers -----

    pub(crate) fn carrier_id(&self, name: &str) -> Result<CarrierId, MachineError> {
        self.carrier_named(name)
            .map(|c| c.id)
            .ok_or_else(|| MachineError::UnknownCarrier {
                name: name.to_string(),
            })
    }

    /// Resolve an operation's carrier names to ids, rejecting duplicates,
    /// sorted by ordinal (plating order).
    pub(crate) fn resolve_carriers(&self, names: &[&str]) -> Result<Vec<CarrierId>, MachineError> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let id = self.carrier_id(name)?;
            if ids.contains(&id) {
                return Err(MachineError::DuplicateCarrier {
                    name: name.to_string(),
                });
            }
            ids.push(id);
        }
        ids.sort();
        Ok(ids)
    }

    pub(crate) fn carriers_mut(&mut self) -> &mut Vec<Carrier> {
        &mut self.carriers
    }

    pub(crate) fn grid(&self) -> &Grid {
        &self.grid
    }

    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub(crate) fn crossings_mut(&mut self) -> &mut Vec<Crossing> {
        &mut self.crossings
    }

    pub(crate) fn set_top_row(&mut self, row: u32) {
        self.top_row = row;
    }

    pub(crate) fn style_snapshot(&self) -> Arc<StyleMap> {
        self.styles.clone()
    }

    /// Remove a carrier's yarn end from the cell topping its parked column.
    fn cut_parked_yarn(&mut self, id: CarrierId, column: i32) -> Result<(), MachineError> {
        let top = self
            .grid
            .lane_mut(Bed::Front)
            .column_mut(column)
            .last_mut();
        let broken = |row| MachineError::BrokenYarnPath {
            bed: Bed::Front,
            index: column,
            row,
        };
        match top {
            Some(Cell::Yarn(cell)) => {
                let row = cell.y();
                if cell.cut_up(id) {
                    Ok(())
                } else {
                    Err(broken(row))
                }
            }
            _ => Err(broken(self.top_row)),
        }
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
