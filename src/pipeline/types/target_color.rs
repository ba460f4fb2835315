use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::Color;

/// The color being tracked and how far a pixel may stray from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetColor {
    color: Color,
    tolerance: f32,
}

impl TargetColor {
    /// Tolerance is clamped to [0, 1].
    pub fn new(color: Color, tolerance: f32) -> Self {
        let tolerance = if tolerance.is_nan() {
            0.0
        } else {
            tolerance.clamp(0.0, 1.0)
        };
        Self { color, tolerance }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn level(&self) -> ToleranceLevel {
        ToleranceLevel::from_tolerance(self.tolerance)
    }
}

impl Default for TargetColor {
    fn default() -> Self {
        Self::new(Color::RED, 0.2)
    }
}

/// Human-facing description of a tolerance value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToleranceLevel {
    VeryStrict,
    Strict,
    Normal,
    Permissive,
    VeryPermissive,
}

impl ToleranceLevel {
    pub fn from_tolerance(tolerance: f32) -> Self {
        if tolerance > 0.4 {
            ToleranceLevel::VeryPermissive
        } else if tolerance > 0.3 {
            ToleranceLevel::Permissive
        } else if tolerance > 0.2 {
            ToleranceLevel::Normal
        } else if tolerance > 0.1 {
            ToleranceLevel::Strict
        } else {
            ToleranceLevel::VeryStrict
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToleranceLevel::VeryStrict => "Very strict",
            ToleranceLevel::Strict => "Strict",
            ToleranceLevel::Normal => "Normal",
            ToleranceLevel::Permissive => "Permissive",
            ToleranceLevel::VeryPermissive => "Very permissive",
        }
    }
}

impl fmt::Display for ToleranceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_is_clamped() {
        assert_eq!(TargetColor::new(Color::RED, 1.7).tolerance(), 1.0);
        assert_eq!(TargetColor::new(Color::RED, -0.2).tolerance(), 0.0);
        assert_eq!(TargetColor::new(Color::RED, f32::NAN).tolerance(), 0.0);
    }

    #[test]
    fn levels_use_exclusive_lower_edges() {
        assert_eq!(ToleranceLevel::from_tolerance(0.1), ToleranceLevel::VeryStrict);
        assert_eq!(ToleranceLevel::from_tolerance(0.2), ToleranceLevel::Strict);
        assert_eq!(ToleranceLevel::from_tolerance(0.25), ToleranceLevel::Normal);
        assert_eq!(ToleranceLevel::from_tolerance(0.35), ToleranceLevel::Permissive);
        assert_eq!(ToleranceLevel::from_tolerance(0.75), ToleranceLevel::VeryPermissive);
        assert_eq!(TargetColor::default().level().to_string(), "Strict");
    }
}
