// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Bed lanes.
//!
//! The simulated machine has two needle beds plus a slider lane parallel to
//! each, giving four grid lanes in total. Yarn cells only ever live on the
//! two main lanes; slider lanes hold loop cells (transfer parking) only.

use std::fmt;

/// One of the four grid lanes.
///
/// Textual forms follow the needle token grammar: `f`, `fs`, `b`, `bs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bed {
    Front,
    FrontSliders,
    Back,
    BackSliders,
}

impl Bed {
    /// All four lanes, in storage order.
    pub const ALL: [Bed; 4] = [Bed::Front, Bed::FrontSliders, Bed::Back, Bed::BackSliders];

    /// Parse a bed token (`f`, `fs`, `b`, `bs`).
    pub fn from_token(token: &str) -> Option<Bed> {
        match token {
            "f" => Some(Bed::Front),
            "fs" => Some(Bed::FrontSliders),
            "b" => Some(Bed::Back),
            "bs" => Some(Bed::BackSliders),
            _ => None,
        }
    }

    /// The bed token as written in needle names.
    pub fn token(self) -> &'static str {
        match self {
            Bed::Front => "f",
            Bed::FrontSliders => "fs",
            Bed::Back => "b",
            Bed::BackSliders => "bs",
        }
    }

    /// Storage index of this lane (see `grid::Grid`).
    pub(crate) fn lane_index(self) -> usize {
        match self {
            Bed::Front => 0,
            Bed::FrontSliders => 1,
            Bed::Back => 2,
            Bed::BackSliders => 3,
        }
    }

    /// True for the slider lanes.
    pub fn is_slider(self) -> bool {
        matches!(self, Bed::FrontSliders | Bed::BackSliders)
    }

    /// True for the front bed and its sliders.
    pub fn is_front_family(self) -> bool {
        matches!(self, Bed::Front | Bed::FrontSliders)
    }

    /// True for the back bed and its sliders.
    pub fn is_back_family(self) -> bool {
        !self.is_front_family()
    }

    /// The main lane that carries yarn cells for this family.
    ///
    /// Carrier transit, turns and bridges always run on `Front` or `Back`;
    /// slider lanes never hold yarn cells.
    pub fn yarn_lane(self) -> Bed {
        if self.is_front_family() {
            Bed::Front
        } else {
            Bed::Back
        }
    }
}

impl fmt::Display for Bed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bed_tokens_round_trip() {
        for bed in Bed::ALL {
            assert_eq!(Bed::from_token(bed.token()), Some(bed));
        }
        assert_eq!(Bed::from_token("x"), None);
        assert_eq!(Bed::from_token("fb"), None);
    }

    #[test]
    fn test_bed_families() {
        assert!(Bed::Front.is_front_family());
        assert!(Bed::FrontSliders.is_front_family());
        assert!(Bed::Back.is_back_family());
        assert!(Bed::BackSliders.is_back_family());
        assert!(!Bed::Front.is_slider());
        assert!(Bed::BackSliders.is_slider());
    }

    #[test]
    fn test_yarn_lane() {
        assert_eq!(Bed::FrontSliders.yarn_lane(), Bed::Front);
        assert_eq!(Bed::BackSliders.yarn_lane(), Bed::Back);
        assert_eq!(Bed::Front.yarn_lane(), Bed::Front);
    }
}
