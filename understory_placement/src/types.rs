// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placement vocabulary: sides, cross-axis alignment, and side preferences.

use core::fmt;

/// A side of the highlighted region that the helper can be placed against.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Side {
    /// Helper sits to the left of the mask.
    Left,
    /// Helper sits above the mask.
    Top,
    /// Helper sits to the right of the mask.
    Right,
    /// Helper sits below the mask.
    Bottom,
}

impl Side {
    /// All four sides, in declaration order.
    pub const ALL: [Self; 4] = [Self::Left, Self::Top, Self::Right, Self::Bottom];

    /// The fixed fallback order tried when `self` is preferred but cannot fit.
    ///
    /// The opposite side comes first, then the two sides of the other axis.
    ///
    /// ```rust
    /// use understory_placement::Side;
    ///
    /// assert_eq!(Side::Left.fallbacks(), [Side::Right, Side::Bottom, Side::Top]);
    /// assert_eq!(Side::Top.fallbacks(), [Side::Bottom, Side::Left, Side::Right]);
    /// ```
    pub const fn fallbacks(self) -> [Self; 3] {
        match self {
            Self::Left => [Self::Right, Self::Bottom, Self::Top],
            Self::Right => [Self::Left, Self::Bottom, Self::Top],
            Self::Top => [Self::Bottom, Self::Left, Self::Right],
            Self::Bottom => [Self::Top, Self::Left, Self::Right],
        }
    }

    /// Returns `true` for [`Side::Left`] and [`Side::Right`].
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Lower-case name, suitable for a styling attribute on the helper.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alignment of the helper along the mask edge it is placed against.
///
/// For [`Side::Left`]/[`Side::Right`] placements this is vertical alignment;
/// for [`Side::Top`]/[`Side::Bottom`] it is horizontal.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Align {
    /// Align with the top (or left) edge of the mask.
    #[default]
    Start,
    /// Center on the mask.
    Center,
    /// Align with the bottom (or right) edge of the mask.
    End,
}

impl Align {
    /// Lower-case name, suitable for a styling attribute on the helper.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Center => "center",
            Self::End => "end",
        }
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side(s) a step would like its helper on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SidePreference {
    /// One preferred side; if it cannot fit, [`Side::fallbacks`] are tried in order.
    Single(Side),
    /// An explicit candidate order; the first side that fits wins.
    Ordered([Side; 4]),
}

impl Default for SidePreference {
    fn default() -> Self {
        Self::Single(Side::Left)
    }
}

impl From<Side> for SidePreference {
    fn from(side: Side) -> Self {
        Self::Single(side)
    }
}

impl From<[Side; 4]> for SidePreference {
    fn from(order: [Side; 4]) -> Self {
        Self::Ordered(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallbacks_never_repeat_the_preferred_side() {
        for side in Side::ALL {
            let fallbacks = side.fallbacks();
            assert!(!fallbacks.contains(&side), "{side} falls back to itself");
            for other in Side::ALL.iter().filter(|s| **s != side) {
                assert!(fallbacks.contains(other), "{side} never tries {other}");
            }
        }
    }

    #[test]
    fn names_are_lower_case() {
        assert_eq!(Side::Bottom.as_str(), "bottom");
        assert_eq!(Align::Center.as_str(), "center");
        assert_eq!(alloc::format!("{}", Side::Right), "right");
    }

    #[test]
    fn default_preference_is_left() {
        assert_eq!(SidePreference::default(), SidePreference::Single(Side::Left));
        assert_eq!(Align::default(), Align::Start);
    }
}
