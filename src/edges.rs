use image::{DynamicImage, GrayImage};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;

/// Parameters for turning an image into a Canny edge map.
///
/// imageproc's Canny always uses a 3x3 Sobel aperture, so only the
/// hysteresis thresholds and the optional pre-blur are configurable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeConfig {
    pub low_threshold: f32,
    pub high_threshold: f32,
    /// Gaussian sigma applied before edge detection, if any.
    pub blur_sigma: Option<f32>,
}

/// Edge settings for skew estimation: no pre-blur.
pub const SKEW_EDGES: EdgeConfig = EdgeConfig {
    low_threshold: 50.0,
    high_threshold: 150.0,
    blur_sigma: None,
};

/// Edge settings for corner detection: 5x5 Gaussian smoothing first.
///
/// A 5x5 kernel with automatic sigma works out to sigma = 0.3 * (5 / 2 - 1) + 0.8.
pub const CORNER_EDGES: EdgeConfig = EdgeConfig {
    low_threshold: 75.0,
    high_threshold: 200.0,
    blur_sigma: Some(1.1),
};

/// Convert an image to grayscale and run Canny edge detection on it.
///
/// The returned map has the same dimensions as `img`; edge pixels are 255,
/// everything else 0.
pub fn extract_edges(img: &DynamicImage, config: &EdgeConfig) -> GrayImage {
    let gray = img.to_luma8();
    edges_from_gray(&gray, config)
}

/// Run the configured blur and Canny detection on an already grayscale image.
pub fn edges_from_gray(gray: &GrayImage, config: &EdgeConfig) -> GrayImage {
    match config.blur_sigma {
        Some(sigma) => {
            let blurred = gaussian_blur_f32(gray, sigma);
            canny(&blurred, config.low_threshold, config.high_threshold)
        }
        None => canny(gray, config.low_threshold, config.high_threshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    #[test]
    fn test_blank_image_has_no_edges() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([255, 255, 255])));
        let edges = extract_edges(&img, &SKEW_EDGES);
        assert_eq!(edges.dimensions(), (64, 48));
        assert!(edges.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_step_edge_detected_on_both_paths() {
        let mut gray = GrayImage::from_pixel(80, 60, Luma([255]));
        draw_filled_rect_mut(&mut gray, Rect::at(20, 15).of_size(40, 30), Luma([0]));

        for config in [SKEW_EDGES, CORNER_EDGES] {
            let edges = edges_from_gray(&gray, &config);
            assert_eq!(edges.dimensions(), gray.dimensions());
            let count = edges.pixels().filter(|p| p[0] > 0).count();
            assert!(count > 100, "expected an edge outline, got {} pixels", count);
        }
    }

    #[test]
    fn test_paths_keep_distinct_settings() {
        assert_ne!(SKEW_EDGES, CORNER_EDGES);
        assert!(SKEW_EDGES.blur_sigma.is_none());
        assert!(CORNER_EDGES.blur_sigma.is_some());
    }
}
