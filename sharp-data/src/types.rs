//! Core value types produced by the vertex decoder.
//!
//! Coordinates keep the numeric kind they were stored with in the PLY file,
//! so an integer column prints as an integer and a float column as a float.

use std::fmt;

/// A single decoded property value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    /// Any of the signed or unsigned integer property types.
    Int(i64),
    /// float32 or float64, widened to f64.
    Float(f64),
}

impl ScalarValue {
    /// Numeric value as f64 (used for color coefficients).
    pub fn as_f64(self) -> f64 {
        match self {
            ScalarValue::Int(v) => v as f64,
            ScalarValue::Float(v) => v,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ScalarValue::Int(v) => write!(f, "{v}"),
            // Whole floats keep a fractional part so they never read as integers.
            ScalarValue::Float(v) if v.is_finite() && v.trunc() == v => write!(f, "{v:.1}"),
            ScalarValue::Float(v) => write!(f, "{v}"),
        }
    }
}

/// A colored point ready to be written as one XYZ line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// x, y, z as decoded from the file.
    pub position: [ScalarValue; 3],
    /// RGB color, 0-255 per channel.
    pub color: [u8; 3],
}

impl Point {
    /// Color used when the file carries no DC coefficients.
    pub const DEFAULT_COLOR: [u8; 3] = [128, 128, 128];

    /// Create a new point with position and color.
    pub fn new(position: [ScalarValue; 3], color: [u8; 3]) -> Self {
        Self { position, color }
    }

    /// Create a mid-gray point at the given position.
    pub fn gray(position: [ScalarValue; 3]) -> Self {
        Self {
            position,
            color: Self::DEFAULT_COLOR,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.position;
        let [r, g, b] = self.color;
        write!(f, "{x} {y} {z} {r} {g} {b}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_float_keeps_fraction() {
        assert_eq!(ScalarValue::Float(1.0).to_string(), "1.0");
        assert_eq!(ScalarValue::Float(-3.0).to_string(), "-3.0");
        assert_eq!(ScalarValue::Float(0.0).to_string(), "0.0");
    }

    #[test]
    fn test_fractional_float_uses_shortest_form() {
        assert_eq!(ScalarValue::Float(0.25).to_string(), "0.25");
        // float32 values are widened before printing
        assert_eq!(
            ScalarValue::Float(0.1f32 as f64).to_string(),
            "0.10000000149011612"
        );
    }

    #[test]
    fn test_integer_has_no_fraction() {
        assert_eq!(ScalarValue::Int(-7).to_string(), "-7");
        assert_eq!(ScalarValue::Int(4_294_967_295).to_string(), "4294967295");
    }

    #[test]
    fn test_point_line() {
        let p = Point::new(
            [
                ScalarValue::Float(1.0),
                ScalarValue::Float(2.5),
                ScalarValue::Int(3),
            ],
            [127, 0, 255],
        );
        assert_eq!(p.to_string(), "1.0 2.5 3 127 0 255");
    }

    #[test]
    fn test_gray_point() {
        let p = Point::gray([ScalarValue::Int(0); 3]);
        assert_eq!(p.color, [128, 128, 128]);
    }
}
