use std::path::Path;

use image::DynamicImage;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::corners::{find_document_corners, CornerConfig, Corners, CORNER_DETECTION};
use crate::detection::{estimate_skew, SkewConfig, SKEW_DETECTION};
use crate::edges::{extract_edges, EdgeConfig, CORNER_EDGES, SKEW_EDGES};
use crate::error::{OperationResult, ProcessError};
use crate::geometry::Size;
use crate::transform::rotate_expanded;

/// Note attached to results that needed no rotation.
pub const NO_ALIGNMENT_NOTE: &str = "No significant alignment needed";

/// Settings for the deskew pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignConfig {
    pub edges: EdgeConfig,
    pub skew: SkewConfig,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            edges: SKEW_EDGES,
            skew: SKEW_DETECTION,
        }
    }
}

/// Settings for the corner detection pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornersConfig {
    pub edges: EdgeConfig,
    pub corners: CornerConfig,
}

impl Default for CornersConfig {
    fn default() -> Self {
        Self {
            edges: CORNER_EDGES,
            corners: CORNER_DETECTION,
        }
    }
}

/// Metadata describing one alignment run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkewResult {
    pub rotation_angle: f64,
    pub original_size: Size,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_size: Option<Size>,
    #[serde(rename = "message", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SkewResult {
    fn rotated(angle: f64, original_size: Size, new_size: Size) -> Self {
        Self {
            rotation_angle: angle,
            original_size,
            new_size: Some(new_size),
            note: None,
        }
    }

    fn unchanged(original_size: Size) -> Self {
        Self {
            rotation_angle: 0.0,
            original_size,
            new_size: None,
            note: Some(NO_ALIGNMENT_NOTE.to_string()),
        }
    }

    /// True when no rotation was applied.
    pub fn is_noop(&self) -> bool {
        self.new_size.is_none()
    }
}

fn load_image(path: &Path) -> OperationResult<DynamicImage> {
    image::open(path).map_err(|source| ProcessError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Deskew an in-memory image.
///
/// Returns the image to emit and its metadata. The emitted image is always
/// 8-bit RGB; when no correction applies it holds the input pixels unchanged.
pub fn align_image(
    img: DynamicImage,
    config: &AlignConfig,
) -> OperationResult<(DynamicImage, SkewResult)> {
    let original_size = Size::new(img.width(), img.height());
    let edges = extract_edges(&img, &config.edges);
    let rgb = img.to_rgb8();

    let Some(angle) = estimate_skew(&edges, &config.skew) else {
        info!("No skew correction needed");
        return Ok((DynamicImage::ImageRgb8(rgb), SkewResult::unchanged(original_size)));
    };

    let rotated = rotate_expanded(&rgb, angle)?;
    info!(
        angle,
        width = rotated.size.width,
        height = rotated.size.height,
        "Image deskewed"
    );

    let result = SkewResult::rotated(angle, original_size, rotated.size);
    Ok((DynamicImage::ImageRgb8(rotated.image), result))
}

/// Read the image at `input`, deskew it with default settings and write the
/// result to `output`.
///
/// The output is written even when no rotation is needed.
pub fn align(input: impl AsRef<Path>, output: impl AsRef<Path>) -> OperationResult<SkewResult> {
    align_with(input, output, &AlignConfig::default())
}

#[instrument(skip_all, fields(input = %input.as_ref().display(), output = %output.as_ref().display()))]
pub fn align_with(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &AlignConfig,
) -> OperationResult<SkewResult> {
    let output = output.as_ref();

    let img = load_image(input.as_ref()).inspect_err(|err| warn!(%err, "Could not read input"))?;
    let (aligned, result) = align_image(img, config)?;

    aligned
        .save(output)
        .map_err(|source| ProcessError::ImageSave {
            path: output.to_path_buf(),
            source,
        })
        .inspect_err(|err| warn!(%err, "Could not write output"))?;

    Ok(result)
}

/// Locate the document outline in an in-memory image.
pub fn detect_corners(img: &DynamicImage, config: &CornersConfig) -> OperationResult<Corners> {
    let edges = extract_edges(img, &config.edges);
    find_document_corners(&edges, &config.corners).ok_or(ProcessError::CornersNotFound)
}

/// Read the image at `input` and find the four corners of the document in it.
pub fn detect_document_corners(input: impl AsRef<Path>) -> OperationResult<Corners> {
    detect_document_corners_with(input, &CornersConfig::default())
}

#[instrument(skip_all, fields(input = %input.as_ref().display()))]
pub fn detect_document_corners_with(
    input: impl AsRef<Path>,
    config: &CornersConfig,
) -> OperationResult<Corners> {
    let img = load_image(input.as_ref()).inspect_err(|err| warn!(%err, "Could not read input"))?;

    match detect_corners(&img, config) {
        Ok(corners) => {
            info!(corners = ?corners.points(), "Document corners found");
            Ok(corners)
        }
        Err(err) => {
            warn!(%err, "Corner detection failed");
            Err(err)
        }
    }
}
