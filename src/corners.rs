use image::GrayImage;
use imageproc::contours::find_contours;
use imageproc::geometry::{approximate_polygon_dp, arc_length, contour_area};
use imageproc::point::Point;
use serde::Serialize;
use tracing::debug;

/// Tunables for contour-based document outline detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerConfig {
    /// How many of the largest contours are tested.
    pub max_contours: usize,
    /// Polygon simplification tolerance as a fraction of contour perimeter.
    pub epsilon_fraction: f64,
}

pub const CORNER_DETECTION: CornerConfig = CornerConfig {
    max_contours: 5,
    epsilon_fraction: 0.02,
};

impl Default for CornerConfig {
    fn default() -> Self {
        CORNER_DETECTION
    }
}

/// Four `(x, y)` vertices of a document outline, in contour order.
///
/// Winding direction and starting vertex are not normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Corners(pub [(i32, i32); 4]);

impl Corners {
    pub fn points(&self) -> &[(i32, i32); 4] {
        &self.0
    }

    fn from_polygon(polygon: &[Point<i32>]) -> Option<Self> {
        match polygon {
            [a, b, c, d] => Some(Self([(a.x, a.y), (b.x, b.y), (c.x, c.y), (d.x, d.y)])),
            _ => None,
        }
    }
}

/// Look for a quadrilateral among the largest contours of an edge map.
///
/// Every border (outer and hole) is a candidate regardless of nesting. The
/// candidates are ranked by enclosed area, and the first one that simplifies
/// to exactly four vertices wins. Equal areas keep the order in which the
/// contours were traced. Contours too small to enclose anything (fewer than
/// three points, or zero perimeter) are skipped before simplification.
pub fn find_document_corners(edges: &GrayImage, config: &CornerConfig) -> Option<Corners> {
    let contours = find_contours::<i32>(edges);
    debug!(contour_count = contours.len(), "Contours traced");

    let mut ranked: Vec<(f64, Vec<Point<i32>>)> = contours
        .into_iter()
        .map(|contour| (contour_area(&contour.points).abs(), contour.points))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    for (rank, (area, points)) in ranked.iter().take(config.max_contours).enumerate() {
        if points.len() < 3 {
            debug!(rank, points = points.len(), "Skipping degenerate contour");
            continue;
        }

        let perimeter = arc_length(points, true);
        let epsilon = config.epsilon_fraction * perimeter;
        if epsilon <= 0.0 {
            debug!(rank, perimeter, "Skipping contour with no extent");
            continue;
        }

        let polygon = approximate_polygon_dp(points, epsilon, true);

        debug!(
            rank,
            area,
            perimeter,
            vertices = polygon.len(),
            "Simplified contour"
        );

        if let Some(corners) = Corners::from_polygon(&polygon) {
            return Some(corners);
        }
    }

    None
}
