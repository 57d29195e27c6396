// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tour configuration and its validation.

use alloc::vec::Vec;

use understory_placement::PlacementParams;

use crate::host::{MutationOptions, ScrollBehavior, TargetRef};
use crate::step::Step;

/// A subtree the tour watches for structural changes.
///
/// A single target, a list of targets, or a list of `(target, options)` pairs
/// all map onto a list of these.
#[derive(Clone, Debug, PartialEq)]
pub struct MutationWatch<E> {
    /// Root of the watched subtree. Selectors that match nothing at mount time
    /// are skipped.
    pub target: TargetRef<E>,
    /// What counts as a change.
    pub options: MutationOptions,
}

impl<E> MutationWatch<E> {
    /// Watch direct children of `target`.
    pub fn new(target: impl Into<TargetRef<E>>) -> Self {
        Self {
            target: target.into(),
            options: MutationOptions::CHILD_LIST,
        }
    }

    /// Extend the watch to every descendant.
    #[must_use]
    pub fn subtree(mut self) -> Self {
        self.options |= MutationOptions::SUBTREE;
        self
    }
}

impl<E> From<(TargetRef<E>, MutationOptions)> for MutationWatch<E> {
    fn from((target, options): (TargetRef<E>, MutationOptions)) -> Self {
        Self { target, options }
    }
}

/// Engine configuration.
///
/// Fill it with struct-update syntax:
///
/// ```rust
/// use understory_tour::{MutationWatch, TourConfig};
///
/// let config: TourConfig<u32> = TourConfig {
///     wait_for_element: true,
///     mutation_watches: vec![MutationWatch::new("#app").subtree()],
///     ..TourConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TourConfig<E> {
    /// Index of the first active step. Clamped to the step list.
    pub start_at: usize,
    /// Padding between the target's rectangle and the mask.
    pub mask_padding: f64,
    /// Corner radius of the mask, forwarded to renderers.
    pub mask_radius: f64,
    /// Gap between the mask and the helper.
    pub mask_helper_distance: f64,
    /// Minimum gap between the helper and the viewport edges.
    pub screen_helper_distance: f64,
    /// Behavior of engine-initiated scrolls unless a call overrides it.
    pub scroll_behavior: ScrollBehavior,
    /// Re-sync focus when the viewport resizes.
    pub resize_listener: bool,
    /// Re-sync focus when the viewport or the step's container scrolls.
    pub scroll_listener: bool,
    /// Keep reporting the last resolvable index until a newly requested
    /// step's element exists.
    pub wait_for_element: bool,
    /// Subtrees to watch. Empty disables mutation tracking, and selectors are
    /// then re-queried on every access.
    pub mutation_watches: Vec<MutationWatch<E>>,
}

impl<E> Default for TourConfig<E> {
    fn default() -> Self {
        Self {
            start_at: 0,
            mask_padding: 5.0,
            mask_radius: 5.0,
            mask_helper_distance: 10.0,
            screen_helper_distance: 10.0,
            scroll_behavior: ScrollBehavior::Instant,
            resize_listener: true,
            scroll_listener: true,
            wait_for_element: false,
            mutation_watches: Vec::new(),
        }
    }
}

impl<E> TourConfig<E> {
    /// Check that every length is finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_length("mask_padding", self.mask_padding)?;
        check_length("mask_radius", self.mask_radius)?;
        check_length("mask_helper_distance", self.mask_helper_distance)?;
        check_length("screen_helper_distance", self.screen_helper_distance)
    }

    /// Distances handed to the placement algorithm.
    pub fn placement_params(&self) -> PlacementParams {
        PlacementParams {
            mask_helper_distance: self.mask_helper_distance,
            screen_helper_distance: self.screen_helper_distance,
        }
    }
}

/// Check the per-step intersection overrides.
pub(crate) fn validate_steps<E, D>(steps: &[Step<E, D>]) -> Result<(), ConfigError> {
    for (index, step) in steps.iter().enumerate() {
        if let Some(value) = step.intersection.threshold
            && !(0.0..=1.0).contains(&value)
        {
            return Err(ConfigError::ThresholdOutOfRange { index, value });
        }
    }
    Ok(())
}

fn check_length(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        Err(ConfigError::NonFinite { field, value })
    } else if value < 0.0 {
        Err(ConfigError::Negative { field, value })
    } else {
        Ok(())
    }
}

/// Rejected configuration.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A length was NaN or infinite.
    #[error("`{field}` must be finite, got {value}")]
    NonFinite {
        /// Offending field.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
    /// A length was negative.
    #[error("`{field}` must not be negative, got {value}")]
    Negative {
        /// Offending field.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
    /// A step's intersection threshold was outside `[0, 1]`.
    #[error("step {index} has intersection threshold {value}, expected a value in [0, 1]")]
    ThresholdOutOfRange {
        /// Index of the offending step.
        index: usize,
        /// Offending value.
        value: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn defaults_validate() {
        assert_eq!(TourConfig::<u32>::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_lengths() {
        let config = TourConfig::<u32> {
            mask_padding: -1.0,
            ..TourConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Negative {
                field: "mask_padding",
                value: -1.0
            })
        );

        let config = TourConfig::<u32> {
            screen_helper_distance: f64::INFINITY,
            ..TourConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::NonFinite { field: "screen_helper_distance", .. }));
        assert_eq!(
            err.to_string(),
            "`screen_helper_distance` must be finite, got inf"
        );
    }

    #[test]
    fn rejects_out_of_range_step_threshold() {
        let mut step: Step<u32> = Step::new("#a");
        step.intersection.threshold = Some(1.5);
        let steps = [Step::new("#ok"), step];
        assert_eq!(
            validate_steps(&steps),
            Err(ConfigError::ThresholdOutOfRange {
                index: 1,
                value: 1.5
            })
        );
    }

    #[test]
    fn watch_builders() {
        let watch: MutationWatch<u32> = MutationWatch::new("#root").subtree();
        assert_eq!(
            watch.options,
            MutationOptions::CHILD_LIST | MutationOptions::SUBTREE
        );
        let pair: MutationWatch<u32> =
            (TargetRef::selector("#list"), MutationOptions::CHILD_LIST).into();
        assert_eq!(pair.options, MutationOptions::CHILD_LIST);
    }
}
