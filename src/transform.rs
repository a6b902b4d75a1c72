use image::{Rgb, RgbImage};
use nalgebra::Matrix3;
use tracing::debug;

use crate::error::{OperationResult, ProcessError};
use crate::geometry::{rotated_canvas, rotation_matrix, transform_point, Size};

/// An image rotated onto an enlarged canvas
#[derive(Debug)]
pub struct Rotated {
    pub image: RgbImage,
    pub size: Size,
}

/// Cubic interpolation kernel (Catmull-Rom)
fn cubic_weight(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;

    [
        -0.5 * t3 + t2 - 0.5 * t,
        1.5 * t3 - 2.5 * t2 + 1.0,
        -1.5 * t3 + 2.0 * t2 + 0.5 * t,
        0.5 * t3 - 0.5 * t2,
    ]
}

/// Bicubic interpolation at a given position.
///
/// Taps outside the image are clamped to the nearest edge pixel, so samples
/// beyond the border replicate it.
fn bicubic_interpolate(img: &RgbImage, x: f64, y: f64) -> Rgb<u8> {
    let (width, height) = img.dimensions();
    let x_floor = x.floor();
    let y_floor = y.floor();

    let wx = cubic_weight(x - x_floor);
    let wy = cubic_weight(y - y_floor);
    let (x_base, y_base) = (x_floor as i64, y_floor as i64);

    let mut result = [0.0; 3];

    for (j, weight_y) in wy.iter().enumerate() {
        let py = (y_base + j as i64 - 1).clamp(0, height as i64 - 1) as u32;
        for (i, weight_x) in wx.iter().enumerate() {
            let px = (x_base + i as i64 - 1).clamp(0, width as i64 - 1) as u32;
            let pixel = img.get_pixel(px, py);

            let weight = weight_x * weight_y;
            for c in 0..3 {
                result[c] += pixel[c] as f64 * weight;
            }
        }
    }

    Rgb(result.map(|v| v.round().clamp(0.0, 255.0) as u8))
}

/// Resample `img` through the forward affine `matrix` into a canvas of `size`.
///
/// Each output pixel is mapped back into the source with the inverse matrix.
pub fn warp_affine(
    img: &RgbImage,
    forward_matrix: &Matrix3<f64>,
    size: Size,
) -> OperationResult<RgbImage> {
    let (src_width, src_height) = img.dimensions();
    if src_width == 0 || src_height == 0 || size.width == 0 || size.height == 0 {
        return Err(ProcessError::Internal(format!(
            "cannot warp {}x{} image onto {}x{} canvas",
            src_width, src_height, size.width, size.height
        )));
    }

    let inverse_matrix = forward_matrix.try_inverse().ok_or_else(|| {
        ProcessError::Internal("transform matrix is not invertible".to_string())
    })?;

    let mut output = RgbImage::new(size.width, size.height);

    for out_y in 0..size.height {
        for out_x in 0..size.width {
            let (src_x, src_y) = transform_point(&inverse_matrix, out_x as f64, out_y as f64);
            output.put_pixel(out_x, out_y, bicubic_interpolate(img, src_x, src_y));
        }
    }

    Ok(output)
}

/// Rotate `img` by `angle_degrees` about its center onto a canvas large
/// enough that no corner is clipped.
pub fn rotate_expanded(img: &RgbImage, angle_degrees: f64) -> OperationResult<Rotated> {
    let (width, height) = img.dimensions();
    let center = ((width / 2) as f64, (height / 2) as f64);

    let mut matrix = rotation_matrix(center, angle_degrees, 1.0);
    let size = rotated_canvas(&matrix, width, height);

    // Shift so the old center lands on the new canvas center.
    matrix[(0, 2)] += size.width as f64 / 2.0 - center.0;
    matrix[(1, 2)] += size.height as f64 / 2.0 - center.1;

    debug!(
        angle_degrees,
        from_width = width,
        from_height = height,
        to_width = size.width,
        to_height = size.height,
        "Rotating onto expanded canvas"
    );

    let image = warp_affine(img, &matrix, size)?;
    Ok(Rotated { image, size })
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    #[test]
    fn test_cubic_weights_sum_to_one() {
        for t in [0.0, 0.25, 0.5, 0.9] {
            let sum: f64 = cubic_weight(t).iter().sum();
            assert!((sum - 1.0).abs() < 1e-12);
        }
        assert_eq!(cubic_weight(0.0), [0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_identity_warp_preserves_pixels() {
        let mut img = RgbImage::from_pixel(20, 16, Rgb([10, 200, 30]));
        draw_filled_rect_mut(&mut img, Rect::at(4, 3).of_size(6, 5), Rgb([250, 0, 90]));

        let result = warp_affine(&img, &Matrix3::identity(), Size::new(20, 16)).unwrap();
        assert_eq!(result, img);
    }

    #[test]
    fn test_zero_angle_keeps_size_and_pixels() {
        // Even sides so the canvas center coincides with the integer center.
        let mut img = RgbImage::from_pixel(32, 22, Rgb([255, 255, 255]));
        draw_filled_rect_mut(&mut img, Rect::at(5, 5).of_size(10, 4), Rgb([0, 0, 0]));

        let rotated = rotate_expanded(&img, 0.0).unwrap();
        assert_eq!(rotated.size, Size::new(32, 22));
        assert_eq!(rotated.image, img);
    }

    #[test]
    fn test_rotation_expands_canvas() {
        let img = RgbImage::from_pixel(800, 600, Rgb([255, 255, 255]));
        let rotated = rotate_expanded(&img, 10.0).unwrap();

        assert_eq!(rotated.size, Size::new(892, 729));
        assert_eq!(rotated.image.dimensions(), (892, 729));
    }

    #[test]
    fn test_borders_replicate_edge_pixels() {
        // A uniform image stays uniform: no black fill appears in the corners.
        let img = RgbImage::from_pixel(60, 40, Rgb([120, 130, 140]));
        let rotated = rotate_expanded(&img, -25.0).unwrap();

        assert!(rotated.image.width() > 60);
        assert!(rotated.image.pixels().all(|p| *p == Rgb([120, 130, 140])));
    }

    #[test]
    fn test_center_content_stays_centered() {
        let mut img = RgbImage::from_pixel(101, 81, Rgb([255, 255, 255]));
        draw_filled_rect_mut(&mut img, Rect::at(45, 35).of_size(11, 11), Rgb([0, 0, 0]));

        let rotated = rotate_expanded(&img, 30.0).unwrap();
        let (w, h) = rotated.image.dimensions();
        let center = rotated.image.get_pixel(w / 2, h / 2);
        assert!(center[0] < 20, "center pixel was {:?}", center);
    }

    #[test]
    fn test_empty_canvas_is_an_internal_error() {
        let img = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        let err = warp_affine(&img, &Matrix3::identity(), Size::new(0, 4)).unwrap_err();
        assert!(matches!(err, ProcessError::Internal(_)));
    }
}
