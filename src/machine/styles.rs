// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Display styles for carrier sets.
//!
//! The engine treats styles as opaque: every cell and crossing captures a
//! reference to the style table current at its creation, and the table is
//! copied before each mutation (`x-vis-color`), so earlier cells keep
//! pointing at the styles that were active when they were made.
//!
//! `set_carriers` seeds one default style per carrier from a rainbow of
//! full-saturation colors.

use std::collections::HashMap;

/// A display style associated with a carrier-set key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    /// CSS-style `#rrggbb` color.
    pub color: String,
}

/// Carrier-set key (space-joined carrier names) to style.
pub type StyleMap = HashMap<String, Style>;

/// The default style for the carrier with the given ordinal: a rainbow
/// around full-saturation colors, assuming about ten carriers.
pub(crate) fn default_carrier_style(ordinal: usize) -> Style {
    let hue = (((ordinal as f64 * 5.5) % 10.0).floor() + 0.5) / 10.0 * 6.0;
    let (r, g, b) = if hue < 1.0 {
        (1.0, hue, 0.0)
    } else if hue < 2.0 {
        (1.0 - (hue - 1.0), 1.0, 0.0)
    } else if hue < 3.0 {
        (0.0, 1.0, hue - 2.0)
    } else if hue < 4.0 {
        (0.0, 1.0 - (hue - 3.0), 1.0)
    } else if hue < 5.0 {
        (hue - 4.0, 0.0, 1.0)
    } else {
        (1.0, 0.0, 1.0 - (hue - 5.0))
    };

    fn h2(f: f64) -> String {
        let val = ((f * 255.0).round() as i32).clamp(0, 255);
        format!("{:02x}", val)
    }

    Style {
        color: format!("#{}{}{}", h2(r), h2(g), h2(b)),
    }
}
