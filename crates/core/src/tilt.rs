//! Pointer position to 3D tilt transform.
//!
//! A pointer sample relative to the tracked element maps to a rotation about
//! both screen axes. The centre of the element is flat; the edges swing by
//! half of `max_tilt` in each direction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::TiltConfig;
use crate::error::CoreError;

/// A rotation axis that can be pinned to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Parses `"x"` or `"y"`; anything else means no axis is disabled.
    pub fn from_name_or_none(name: &str) -> Option<Axis> {
        match name.parse() {
            Ok(axis) => Some(axis),
            Err(e) => {
                log::warn!("{e}, leaving both axes enabled");
                None
            }
        }
    }
}

impl FromStr for Axis {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "x" | "X" => Ok(Axis::X),
            "y" | "Y" => Ok(Axis::Y),
            other => Err(CoreError::UnknownAxis(other.to_string())),
        }
    }
}

/// Client-space rectangle of the tracked element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Pointer offset inside the tracked element, plus the element size.
///
/// Captured per pointer-move and overwritten by the next one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PointerSample {
    /// All zeros; produces a flat transform.
    pub const NEUTRAL: PointerSample = PointerSample {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Converts client coordinates to an offset within `bounds`.
    ///
    /// Missing bounds (an unmounted element) give [`PointerSample::NEUTRAL`].
    pub fn relative_to(client_x: f64, client_y: f64, bounds: Option<Bounds>) -> Self {
        match bounds {
            Some(b) => Self {
                x: client_x - b.left,
                y: client_y - b.top,
                width: b.width,
                height: b.height,
            },
            None => Self::NEUTRAL,
        }
    }

    /// True when the sample cannot be normalised.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
            || !self.x.is_finite()
            || !self.y.is_finite()
    }
}

/// Rotation in degrees about the screen X axis (pitch) and Y axis (yaw).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TiltAngles {
    pub rotate_x: f64,
    pub rotate_y: f64,
}

impl TiltAngles {
    /// Angles for `sample`, rounded to hundredths of a degree.
    ///
    /// `rotate_x = max·(y/h) − max/2` and `rotate_y = max/2 − max·(x/w)`.
    /// A degenerate sample yields zero on both axes.
    pub fn from_sample(sample: &PointerSample, config: &TiltConfig) -> Self {
        if sample.is_degenerate() {
            return Self::default();
        }
        let max = config.max_tilt;
        let rotate_x = max * (sample.y / sample.height) - max / 2.0;
        let rotate_y = max / 2.0 - max * (sample.x / sample.width);
        Self {
            rotate_x: match config.disable_axis {
                Some(Axis::X) => 0.0,
                _ => hundredths(rotate_x),
            },
            rotate_y: match config.disable_axis {
                Some(Axis::Y) => 0.0,
                _ => hundredths(rotate_y),
            },
        }
    }
}

/// Rounds to two decimals; `+ 0.0` folds a negative zero into zero.
fn hundredths(v: f64) -> f64 {
    (v * 100.0).round() / 100.0 + 0.0
}

/// A CSS transform for the tracked element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub perspective: f64,
    pub angles: TiltAngles,
    pub scale: f64,
}

impl Transform {
    /// The tracking transform for `sample`.
    pub fn tilted(sample: &PointerSample, config: &TiltConfig) -> Self {
        Self {
            perspective: config.perspective,
            angles: TiltAngles::from_sample(sample, config),
            scale: config.scale,
        }
    }

    /// Zero rotation and unit scale at the configured perspective.
    pub fn neutral(config: &TiltConfig) -> Self {
        Self {
            perspective: config.perspective,
            angles: TiltAngles::default(),
            scale: 1.0,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.angles == TiltAngles::default() && self.scale == 1.0
    }

    /// CSS `transform` property value.
    pub fn css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.scale;
        write!(
            f,
            "perspective({}px) rotateX({:.2}deg) rotateY({:.2}deg) scale3d({s}, {s}, {s})",
            self.perspective, self.angles.rotate_x, self.angles.rotate_y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f64, y: f64) -> PointerSample {
        PointerSample {
            x,
            y,
            width: 200.0,
            height: 100.0,
        }
    }

    fn config() -> TiltConfig {
        TiltConfig::default()
    }

    #[test]
    fn centre_is_flat() {
        let a = TiltAngles::from_sample(&sample(100.0, 50.0), &config());
        assert_eq!(a, TiltAngles { rotate_x: 0.0, rotate_y: 0.0 });
    }

    #[test]
    fn top_left_corner_tilts_half_max_each_way() {
        let a = TiltAngles::from_sample(&sample(0.0, 0.0), &config());
        assert_eq!(a.rotate_x, -10.0);
        assert_eq!(a.rotate_y, 10.0);
    }

    #[test]
    fn bottom_right_corner_mirrors_top_left() {
        let a = TiltAngles::from_sample(&sample(200.0, 100.0), &config());
        assert_eq!(a.rotate_x, 10.0);
        assert_eq!(a.rotate_y, -10.0);
    }

    #[test]
    fn angles_are_rounded_to_hundredths() {
        let a = TiltAngles::from_sample(&sample(0.0, 100.0 / 3.0), &config());
        assert_eq!(a.rotate_x, -3.33);
    }

    #[test]
    fn disabled_x_axis_pins_rotate_x() {
        let cfg = TiltConfig {
            disable_axis: Some(Axis::X),
            ..config()
        };
        for (x, y) in [(0.0, 0.0), (200.0, 100.0), (13.0, 87.0)] {
            let a = TiltAngles::from_sample(&sample(x, y), &cfg);
            assert_eq!(a.rotate_x, 0.0);
        }
        assert_eq!(TiltAngles::from_sample(&sample(0.0, 0.0), &cfg).rotate_y, 10.0);
    }

    #[test]
    fn disabled_y_axis_pins_rotate_y() {
        let cfg = TiltConfig {
            disable_axis: Some(Axis::Y),
            ..config()
        };
        let a = TiltAngles::from_sample(&sample(0.0, 0.0), &cfg);
        assert_eq!(a.rotate_y, 0.0);
        assert_eq!(a.rotate_x, -10.0);
    }

    #[test]
    fn zero_bounds_give_zero_angles() {
        let a = TiltAngles::from_sample(
            &PointerSample {
                x: 10.0,
                y: 10.0,
                width: 0.0,
                height: 0.0,
            },
            &config(),
        );
        assert_eq!(a, TiltAngles::default());
    }

    #[test]
    fn unmounted_element_yields_neutral_sample() {
        assert_eq!(
            PointerSample::relative_to(40.0, 50.0, None),
            PointerSample::NEUTRAL
        );
    }

    #[test]
    fn relative_to_subtracts_bounds_origin() {
        let b = Bounds {
            left: 10.0,
            top: 20.0,
            width: 300.0,
            height: 300.0,
        };
        let s = PointerSample::relative_to(110.0, 220.0, Some(b));
        assert_eq!(s, PointerSample { x: 100.0, y: 200.0, width: 300.0, height: 300.0 });
    }

    #[test]
    fn tilted_css_matches_browser_syntax() {
        let cfg = TiltConfig {
            scale: 1.1,
            ..config()
        };
        let t = Transform::tilted(&sample(0.0, 0.0), &cfg);
        assert_eq!(
            t.css(),
            "perspective(1000px) rotateX(-10.00deg) rotateY(10.00deg) scale3d(1.1, 1.1, 1.1)"
        );
    }

    #[test]
    fn neutral_css_is_flat_unit_scale() {
        let t = Transform::neutral(&TiltConfig { scale: 1.5, ..config() });
        assert!(t.is_neutral());
        assert_eq!(
            t.css(),
            "perspective(1000px) rotateX(0.00deg) rotateY(0.00deg) scale3d(1, 1, 1)"
        );
    }

    #[test]
    fn centre_css_has_no_negative_zero() {
        let t = Transform::tilted(&sample(100.0, 50.0), &config());
        assert!(!t.css().contains("-0.00"), "{}", t.css());
    }

    #[test]
    fn axis_parsing() {
        assert_eq!("x".parse::<Axis>().unwrap(), Axis::X);
        assert_eq!("Y".parse::<Axis>().unwrap(), Axis::Y);
        assert!(matches!("z".parse::<Axis>(), Err(CoreError::UnknownAxis(_))));
        assert_eq!(Axis::from_name_or_none("none"), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn angles_bounded_by_half_max_inside_element(
                fx in 0.0_f64..=1.0,
                fy in 0.0_f64..=1.0,
                w in 1.0_f64..2000.0,
                h in 1.0_f64..2000.0,
                max in 0.0_f64..90.0,
            ) {
                let cfg = TiltConfig { max_tilt: max, ..TiltConfig::default() };
                let s = PointerSample { x: fx * w, y: fy * h, width: w, height: h };
                let a = TiltAngles::from_sample(&s, &cfg);
                let limit = max / 2.0 + 0.005;
                prop_assert!(a.rotate_x.abs() <= limit, "rotate_x {} > {limit}", a.rotate_x);
                prop_assert!(a.rotate_y.abs() <= limit, "rotate_y {} > {limit}", a.rotate_y);
            }

            #[test]
            fn disabled_x_always_zero(
                x in -500.0_f64..500.0,
                y in -500.0_f64..500.0,
            ) {
                let cfg = TiltConfig { disable_axis: Some(Axis::X), ..TiltConfig::default() };
                let s = PointerSample { x, y, width: 320.0, height: 320.0 };
                prop_assert_eq!(TiltAngles::from_sample(&s, &cfg).rotate_x, 0.0);
            }
        }
    }
}
