//! Screen geometry shared by the gaze pipeline and the pointer commands.

use std::fmt;

/// A position in screen coordinates.
///
/// Coordinates stay fractional until they reach the synthetic input
/// backend, so interpolated paths keep their spacing even when the segment
/// is shorter than the number of samples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Point `step / steps` of the way along the segment to `to`.
    ///
    /// Parametric, so vertical and horizontal segments need no special case.
    /// The delta is scaled before dividing, keeping whole-pixel steps exact.
    pub fn lerp(&self, to: Point, step: usize, steps: usize) -> Point {
        let steps = steps.max(1) as f64;
        let step = step as f64;
        Point {
            x: self.x + (to.x - self.x) * step / steps,
            y: self.y + (to.y - self.y) * step / steps,
        }
    }

    /// Whole-pixel coordinates for the OS backend.
    pub fn to_pixels(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}:{:.0}", self.x, self.y)
    }
}

/// Size of the visible display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBounds {
    pub width: f64,
    pub height: f64,
}

impl DisplayBounds {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Clamp a point to the display plus a fixed overshoot margin.
    ///
    /// Anything left of / above the display lands exactly on `-tolerance`,
    /// anything beyond it on `dimension + tolerance`.
    pub fn clamp(&self, point: Point, tolerance: f64) -> Point {
        Point {
            x: clamp_axis(point.x, self.width, tolerance),
            y: clamp_axis(point.y, self.height, tolerance),
        }
    }
}

impl Default for DisplayBounds {
    fn default() -> Self {
        Self::new(1920.0, 1080.0)
    }
}

fn clamp_axis(value: f64, dimension: f64, tolerance: f64) -> f64 {
    if value < 0.0 {
        -tolerance
    } else if value > dimension {
        dimension + tolerance
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_vertical_segment() {
        let a = Point::new(50.0, 0.0);
        let b = Point::new(50.0, 200.0);
        assert_eq!(a.lerp(b, 1, 4), Point::new(50.0, 50.0));
        assert_eq!(a.lerp(b, 4, 4), b);
        assert_eq!(a.lerp(b, 0, 4), a);
    }

    #[test]
    fn test_clamp_inside_is_identity() {
        let bounds = DisplayBounds::new(800.0, 600.0);
        let p = Point::new(400.0, 300.0);
        assert_eq!(bounds.clamp(p, 10.0), p);
        // Edges are still inside
        assert_eq!(bounds.clamp(Point::new(0.0, 600.0), 10.0), Point::new(0.0, 600.0));
    }

    #[test]
    fn test_clamp_overshoot() {
        let bounds = DisplayBounds::new(800.0, 600.0);
        assert_eq!(
            bounds.clamp(Point::new(-300.0, 5000.0), 10.0),
            Point::new(-10.0, 610.0)
        );
        assert_eq!(
            bounds.clamp(Point::new(801.0, -0.5), 10.0),
            Point::new(810.0, -10.0)
        );
    }

    #[test]
    fn test_to_pixels_rounds() {
        assert_eq!(Point::new(3.6, -2.4).to_pixels(), (4, -2));
    }
}
