//! Tessellation parameters handed to the CAD kernel

use serde::{Deserialize, Serialize};

/// Target unit for output geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearUnit {
    #[default]
    Millimeter,
    Centimeter,
    Meter,
    Inch,
    Foot,
}

impl LinearUnit {
    pub const ALL: [LinearUnit; 5] = [
        LinearUnit::Millimeter,
        LinearUnit::Centimeter,
        LinearUnit::Meter,
        LinearUnit::Inch,
        LinearUnit::Foot,
    ];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            LinearUnit::Millimeter => "millimeter",
            LinearUnit::Centimeter => "centimeter",
            LinearUnit::Meter => "meter",
            LinearUnit::Inch => "inch",
            LinearUnit::Foot => "foot",
        }
    }
}

/// How `linear_deflection` is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeflectionType {
    /// Chordal tolerance in output units
    AbsoluteValue,
    /// Chordal tolerance as a fraction of the shape's bounding box
    #[default]
    BoundingBoxRatio,
}

impl DeflectionType {
    pub fn name(&self) -> &'static str {
        match self {
            DeflectionType::AbsoluteValue => "absolute",
            DeflectionType::BoundingBoxRatio => "bounding box ratio",
        }
    }
}

/// Tessellation configuration, serialized with the kernel's camelCase keys
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TessellationParams {
    pub linear_unit: LinearUnit,
    pub linear_deflection_type: DeflectionType,
    /// Chordal deflection magnitude
    pub linear_deflection: f64,
    /// Maximum angular deviation between facets in radians
    pub angular_deflection: f64,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            linear_unit: LinearUnit::Millimeter,
            linear_deflection_type: DeflectionType::BoundingBoxRatio,
            linear_deflection: 0.001,
            angular_deflection: 0.5,
        }
    }
}

impl TessellationParams {
    /// Copy with non-positive or non-finite tolerances replaced by defaults
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let positive = |v: f64, fallback: f64| {
            if v.is_finite() && v > 0.0 { v } else { fallback }
        };
        Self {
            linear_deflection: positive(self.linear_deflection, defaults.linear_deflection),
            angular_deflection: positive(self.angular_deflection, defaults.angular_deflection)
                .min(std::f64::consts::PI),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_key_names() {
        let json = serde_json::to_value(TessellationParams::default()).unwrap();
        assert_eq!(json["linearUnit"], "millimeter");
        assert_eq!(json["linearDeflectionType"], "bounding_box_ratio");
        assert_eq!(json["linearDeflection"], 0.001);
        assert_eq!(json["angularDeflection"], 0.5);
    }

    #[test]
    fn test_partial_params_use_defaults() {
        let params: TessellationParams =
            serde_json::from_str(r#"{ "linearDeflectionType": "absolute_value" }"#).unwrap();
        assert_eq!(params.linear_deflection_type, DeflectionType::AbsoluteValue);
        assert_eq!(params.linear_unit, LinearUnit::Millimeter);
    }

    #[test]
    fn test_sanitized() {
        let params = TessellationParams {
            linear_deflection: -1.0,
            angular_deflection: 10.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(params.linear_deflection, 0.001);
        assert_eq!(params.angular_deflection, std::f64::consts::PI);
    }
}
