/// A position in overlay coordinates (CSS pixels, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Angle of the segment from this point to `other`, in radians
    pub fn angle_to(&self, other: Point) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Offset (dx, dy) from this point to `other`
    pub fn delta_to(&self, other: Point) -> (f64, f64) {
        (other.x - self.x, other.y - self.y)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Rotate around `center` by `angle` radians (clockwise on screen)
    pub fn rotated_around(&self, center: Point, angle: f64) -> Self {
        let (sin_a, cos_a) = angle.sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Self::new(
            center.x + dx * cos_a - dy * sin_a,
            center.y + dx * sin_a + dy * cos_a,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_and_angle() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_to(b), 5.0);
        assert!((Point::new(0.0, 0.0).angle_to(Point::new(0.0, 1.0)) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_round_trip() {
        let center = Point::new(10.0, 10.0);
        let p = Point::new(20.0, 10.0);
        let quarter = p.rotated_around(center, std::f64::consts::FRAC_PI_2);
        assert!((quarter.x - 10.0).abs() < 1e-9);
        assert!((quarter.y - 20.0).abs() < 1e-9);

        let back = quarter.rotated_around(center, -std::f64::consts::FRAC_PI_2);
        assert!((back.x - p.x).abs() < 1e-9);
        assert!((back.y - p.y).abs() < 1e-9);
    }
}
