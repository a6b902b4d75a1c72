use nalgebra::{Matrix3, Vector3};
use serde::Serialize;

/// Width and height of an image in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Affine rotation about `center` by `angle_degrees`, stored as a 3x3 matrix.
///
/// Positive angles turn the image counter-clockwise as displayed (y axis
/// pointing down). The matrix maps source coordinates to destination
/// coordinates.
pub fn rotation_matrix(center: (f64, f64), angle_degrees: f64, scale: f64) -> Matrix3<f64> {
    let theta = angle_degrees.to_radians();
    let alpha = scale * theta.cos();
    let beta = scale * theta.sin();
    let (cx, cy) = center;

    Matrix3::new(
        alpha, beta, (1.0 - alpha) * cx - beta * cy,
        -beta, alpha, beta * cx + (1.0 - alpha) * cy,
        0.0, 0.0, 1.0,
    )
}

/// Size of the canvas that holds a `width` x `height` image after applying
/// the rotation part of `matrix`. Fractional sizes are truncated.
pub fn rotated_canvas(matrix: &Matrix3<f64>, width: u32, height: u32) -> Size {
    let cos = matrix[(0, 0)].abs();
    let sin = matrix[(0, 1)].abs();
    let (w, h) = (width as f64, height as f64);

    Size::new((h * sin + w * cos) as u32, (h * cos + w * sin) as u32)
}

/// Transform a point using the affine matrix
pub fn transform_point(matrix: &Matrix3<f64>, x: f64, y: f64) -> (f64, f64) {
    let p = Vector3::new(x, y, 1.0);
    let result = matrix * p;
    (result.x / result.z, result.y / result.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rotation_is_identity() {
        let matrix = rotation_matrix((50.0, 40.0), 0.0, 1.0);
        let (x, y) = transform_point(&matrix, 12.0, 34.0);
        assert!((x - 12.0).abs() < 1e-9);
        assert!((y - 34.0).abs() < 1e-9);
        assert_eq!(rotated_canvas(&matrix, 100, 80), Size::new(100, 80));
    }

    #[test]
    fn test_rotation_keeps_center_fixed() {
        let matrix = rotation_matrix((50.0, 40.0), 33.0, 1.0);
        let (x, y) = transform_point(&matrix, 50.0, 40.0);
        assert!((x - 50.0).abs() < 1e-9);
        assert!((y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_positive_angle_turns_counter_clockwise_on_screen() {
        // A point to the right of the center moves up (smaller y).
        let matrix = rotation_matrix((0.0, 0.0), 90.0, 1.0);
        let (x, y) = transform_point(&matrix, 10.0, 0.0);
        assert!(x.abs() < 1e-9);
        assert!((y + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotated_canvas_quarter_turn_swaps_sides() {
        let matrix = rotation_matrix((0.0, 0.0), 90.0, 1.0);
        let size = rotated_canvas(&matrix, 800, 600);
        // cos(90°) is not exactly zero, so allow truncation either way.
        assert!(size.width == 600 || size.width == 599);
        assert!(size.height == 800 || size.height == 799);
    }

    #[test]
    fn test_rotated_canvas_grows_for_small_angle() {
        let matrix = rotation_matrix((400.0, 300.0), 10.0, 1.0);
        let size = rotated_canvas(&matrix, 800, 600);
        assert_eq!(size, Size::new(892, 729));
    }
}
