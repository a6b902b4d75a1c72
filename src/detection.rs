use image::GrayImage;
use imageproc::hough::{detect_lines, LineDetectionOptions, PolarLine};
use tracing::debug;

/// Tunables for Hough-based skew estimation.
///
/// The accumulator resolution is fixed by imageproc at 1 pixel and 1 degree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkewConfig {
    /// Minimum accumulator votes for a line to be reported.
    pub vote_threshold: u32,
    /// Non-maximum suppression radius in the accumulator.
    pub suppression_radius: u32,
    /// Only this many of the strongest lines are considered.
    pub max_candidates: usize,
    /// Candidate angles must lie strictly inside (-limit, limit).
    pub angle_limit_degrees: f64,
    /// A median at or below this magnitude needs no correction.
    pub min_correction_degrees: f64,
}

pub const SKEW_DETECTION: SkewConfig = SkewConfig {
    vote_threshold: 200,
    suppression_radius: 1,
    max_candidates: 10,
    angle_limit_degrees: 45.0,
    min_correction_degrees: 0.0,
};

impl Default for SkewConfig {
    fn default() -> Self {
        SKEW_DETECTION
    }
}

/// A Hough line together with how many edge pixels lie along it
#[derive(Debug)]
struct LineCandidate {
    line: PolarLine,
    support: usize,
}

/// Deviation of a Hough line from horizontal, in degrees.
///
/// The normal angle is measured from the x axis, so horizontal lines have a
/// normal at 90° and map to 0.
pub fn polar_to_skew_degrees(line: &PolarLine) -> f64 {
    line.angle_in_degrees as f64 - 90.0
}

/// Count edge pixels within one pixel of the line
fn line_support(edges: &GrayImage, line: &PolarLine) -> usize {
    let (width, height) = edges.dimensions();
    let theta = (line.angle_in_degrees as f64).to_radians();
    let r = line.r as f64;

    let cos_t = theta.cos();
    let sin_t = theta.sin();

    let is_edge = |x: i64, y: i64| {
        x >= 0
            && y >= 0
            && x < width as i64
            && y < height as i64
            && edges.get_pixel(x as u32, y as u32)[0] > 0
    };

    let mut count = 0;

    if sin_t.abs() > cos_t.abs() {
        // More horizontal line - iterate over x
        for x in 0..width as i64 {
            let y = ((r - x as f64 * cos_t) / sin_t).round() as i64;
            if (y - 1..=y + 1).any(|yy| is_edge(x, yy)) {
                count += 1;
            }
        }
    } else {
        // More vertical line - iterate over y
        for y in 0..height as i64 {
            let x = ((r - y as f64 * sin_t) / cos_t).round() as i64;
            if (x - 1..=x + 1).any(|xx| is_edge(xx, y)) {
                count += 1;
            }
        }
    }

    count
}

/// Run the Hough transform and return lines strongest first.
///
/// imageproc reports lines in accumulator order, so they are re-ranked by edge
/// support. The sort is stable: equally supported lines keep detector order.
fn ranked_lines(edges: &GrayImage, config: &SkewConfig) -> Vec<LineCandidate> {
    let options = LineDetectionOptions {
        vote_threshold: config.vote_threshold,
        suppression_radius: config.suppression_radius,
    };

    let mut candidates: Vec<LineCandidate> = detect_lines(edges, options)
        .into_iter()
        .map(|line| {
            let support = line_support(edges, &line);
            LineCandidate { line, support }
        })
        .collect();

    candidates.sort_by(|a, b| b.support.cmp(&a.support));
    candidates
}

/// Skew angles of the strongest lines in an edge map, before range filtering.
pub fn candidate_angles(edges: &GrayImage, config: &SkewConfig) -> Vec<f64> {
    let candidates = ranked_lines(edges, config);
    debug!(line_count = candidates.len(), "Hough lines detected");

    candidates
        .iter()
        .take(config.max_candidates)
        .map(|c| polar_to_skew_degrees(&c.line))
        .collect()
}

/// Keep the angles strictly inside (-limit, limit).
pub fn filter_angles(angles: &[f64], limit_degrees: f64) -> Vec<f64> {
    angles
        .iter()
        .copied()
        .filter(|a| -limit_degrees < *a && *a < limit_degrees)
        .collect()
}

/// Median of a set of angles; the mean of the two middle values for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Estimate the global skew of an edge map in degrees.
///
/// Returns `None` when no line survives filtering, or when the estimate is
/// too small to warrant a rotation.
pub fn estimate_skew(edges: &GrayImage, config: &SkewConfig) -> Option<f64> {
    let angles = candidate_angles(edges, config);
    let surviving = filter_angles(&angles, config.angle_limit_degrees);

    debug!(
        candidates = angles.len(),
        surviving = surviving.len(),
        "Filtered line angles"
    );

    let Some(skew) = median(&surviving) else {
        debug!("No line within the accepted angle range");
        return None;
    };

    if skew.abs() <= config.min_correction_degrees {
        debug!(skew, "Skew below correction threshold");
        return None;
    }

    debug!(skew, "Estimated skew angle");
    Some(skew)
}
