//! Easing functions for the fill animation.
//!
//! An easing function maps the normalized iteration fraction of an animation
//! run onto an interpolation factor. The factor is not bounded to `[0, 1]`,
//! so curves like [`EasingFunction::EaseOutBack`] overshoot the target before
//! settling on it.
//!
//! Every named curve can also be looked up by the camelCase name used in
//! configuration files and query strings:
//!
//! ```
//! use imagefill::animation::EasingFunction;
//!
//! let easing: EasingFunction = "easeInOutCubic".parse().unwrap();
//! assert_eq!(easing.evaluate(0.5), 0.5);
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::Error;

/// Easing function that controls the fill curve
#[derive(Clone, Default)]
pub enum EasingFunction {
    /// Constant speed
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInQuint,
    /// Smooth deceleration, the default curve
    #[default]
    EaseOutQuint,
    EaseInOutQuint,
    EaseOutExpo,
    /// Decelerates past the target and settles back onto it
    EaseOutBack,
    /// CSS cubic-bezier curve (x1, y1, x2, y2)
    CubicBezier(f32, f32, f32, f32),
    /// Custom easing function
    Custom(Arc<dyn Fn(f32) -> f32 + Send + Sync>),
}

/// Names accepted by [`EasingFunction::from_str`], in declaration order.
pub const EASING_NAMES: &[&str] = &[
    "linear",
    "easeInQuad",
    "easeOutQuad",
    "easeInOutQuad",
    "easeInCubic",
    "easeOutCubic",
    "easeInOutCubic",
    "easeInQuart",
    "easeOutQuart",
    "easeInOutQuart",
    "easeInQuint",
    "easeOutQuint",
    "easeInOutQuint",
    "easeOutExpo",
    "easeOutBack",
];

impl EasingFunction {
    /// Evaluate the curve at `t`.
    ///
    /// `t` is normally in `[0, 1]`; the result may leave that range for
    /// overshooting curves.
    pub fn evaluate(&self, t: f32) -> f32 {
        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseInQuad => t * t,
            EasingFunction::EaseOutQuad => t * (2.0 - t),
            EasingFunction::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            EasingFunction::EaseInCubic => t * t * t,
            EasingFunction::EaseOutCubic => (t - 1.0).powi(3) + 1.0,
            EasingFunction::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
                }
            }
            EasingFunction::EaseInQuart => t.powi(4),
            EasingFunction::EaseOutQuart => 1.0 - (t - 1.0).powi(4),
            EasingFunction::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - 8.0 * (t - 1.0).powi(4)
                }
            }
            EasingFunction::EaseInQuint => t.powi(5),
            EasingFunction::EaseOutQuint => 1.0 + (t - 1.0).powi(5),
            EasingFunction::EaseInOutQuint => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 + 16.0 * (t - 1.0).powi(5)
                }
            }
            EasingFunction::EaseOutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            EasingFunction::EaseOutBack => ease_out_back(t),
            EasingFunction::CubicBezier(x1, y1, x2, y2) => cubic_bezier(t, *x1, *y1, *x2, *y2),
            EasingFunction::Custom(f) => f(t),
        }
    }

    /// Create a custom easing function from a closure
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f32) -> f32 + Send + Sync + 'static,
    {
        EasingFunction::Custom(Arc::new(f))
    }

    /// The lookup name of a named curve, `None` for bezier and custom curves.
    pub fn name(&self) -> Option<&'static str> {
        let index = match self {
            EasingFunction::Linear => 0,
            EasingFunction::EaseInQuad => 1,
            EasingFunction::EaseOutQuad => 2,
            EasingFunction::EaseInOutQuad => 3,
            EasingFunction::EaseInCubic => 4,
            EasingFunction::EaseOutCubic => 5,
            EasingFunction::EaseInOutCubic => 6,
            EasingFunction::EaseInQuart => 7,
            EasingFunction::EaseOutQuart => 8,
            EasingFunction::EaseInOutQuart => 9,
            EasingFunction::EaseInQuint => 10,
            EasingFunction::EaseOutQuint => 11,
            EasingFunction::EaseInOutQuint => 12,
            EasingFunction::EaseOutExpo => 13,
            EasingFunction::EaseOutBack => 14,
            EasingFunction::CubicBezier(..) | EasingFunction::Custom(_) => return None,
        };
        Some(EASING_NAMES[index])
    }
}

impl FromStr for EasingFunction {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let easing = match name {
            "linear" => EasingFunction::Linear,
            "easeInQuad" => EasingFunction::EaseInQuad,
            "easeOutQuad" => EasingFunction::EaseOutQuad,
            "easeInOutQuad" => EasingFunction::EaseInOutQuad,
            "easeInCubic" => EasingFunction::EaseInCubic,
            "easeOutCubic" => EasingFunction::EaseOutCubic,
            "easeInOutCubic" => EasingFunction::EaseInOutCubic,
            "easeInQuart" => EasingFunction::EaseInQuart,
            "easeOutQuart" => EasingFunction::EaseOutQuart,
            "easeInOutQuart" => EasingFunction::EaseInOutQuart,
            "easeInQuint" => EasingFunction::EaseInQuint,
            "easeOutQuint" => EasingFunction::EaseOutQuint,
            "easeInOutQuint" => EasingFunction::EaseInOutQuint,
            "easeOutExpo" => EasingFunction::EaseOutExpo,
            "easeOutBack" => EasingFunction::EaseOutBack,
            other => return Err(Error::UnknownEasing(other.to_string())),
        };
        Ok(easing)
    }
}

impl fmt::Debug for EasingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EasingFunction::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "CubicBezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
            EasingFunction::Custom(_) => write!(f, "Custom"),
            named => write!(f, "{}", named.name().unwrap_or("unnamed")),
        }
    }
}

fn ease_out_back(t: f32) -> f32 {
    const C1: f32 = 1.70158;
    const C3: f32 = C1 + 1.0;
    let u = t - 1.0;
    1.0 + C3 * u.powi(3) + C1 * u.powi(2)
}

/// Cubic bezier curve evaluation
/// Simplified implementation assuming x1, x2 are in [0, 1]
fn cubic_bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    // Newton-Raphson for the curve parameter whose x equals t
    let mut current_t = t;
    for _ in 0..8 {
        let current_x = bezier_component(current_t, x1, x2);
        let current_slope = bezier_slope(current_t, x1, x2);
        if current_slope.abs() < 1e-6 {
            break;
        }
        current_t -= (current_x - t) / current_slope;
    }
    bezier_component(current_t, y1, y2)
}

fn bezier_component(t: f32, p1: f32, p2: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t2 * p2 + t3
}

fn bezier_slope(t: f32, p1: f32, p2: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_named_curve_hits_endpoints() {
        for name in EASING_NAMES {
            let easing: EasingFunction = name.parse().unwrap();
            assert!(easing.evaluate(0.0).abs() < 1e-6, "{} at 0", name);
            assert_eq!(easing.evaluate(1.0), 1.0, "{} at 1", name);
            assert_eq!(easing.name(), Some(*name));
        }
    }

    #[test]
    fn test_ease_out_quint_decelerates() {
        let result = EasingFunction::EaseOutQuint.evaluate(0.5);
        assert!(result > 0.5); // Should be faster at start
    }

    #[test]
    fn test_ease_in_quad() {
        let result = EasingFunction::EaseInQuad.evaluate(0.5);
        assert!(result < 0.5); // Should be slower at start
    }

    #[test]
    fn test_ease_out_back_overshoots() {
        let peak = (1..100)
            .map(|i| EasingFunction::EaseOutBack.evaluate(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_unknown_name() {
        let err = "bounceSideways".parse::<EasingFunction>().unwrap_err();
        assert!(matches!(err, Error::UnknownEasing(name) if name == "bounceSideways"));
    }

    #[test]
    fn test_cubic_bezier_linear_control_points() {
        let easing = EasingFunction::CubicBezier(0.25, 0.25, 0.75, 0.75);
        assert!((easing.evaluate(0.3) - 0.3).abs() < 1e-4);
        assert_eq!(easing.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_custom() {
        let easing = EasingFunction::custom(|t| t * 2.0);
        assert_eq!(easing.evaluate(0.25), 0.5);
        assert_eq!(format!("{:?}", easing), "Custom");
    }
}
